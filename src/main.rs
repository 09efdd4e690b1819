use clap::Parser;
use tagcache::cli::commands::SimulateOptions;
use tagcache::cli::{Cli, Commands};
use tagcache::types::config::Config;
use tagcache::TagCacheResult;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> TagCacheResult<()> {
    let cli = Cli::parse();

    // Load configuration first (no logging yet)
    let config = Config::load_or_default(&cli.config).unwrap_or_else(|e| {
        eprintln!("Aviso: configuração inválida ({}), usando padrão.", e);
        Config::default_config()
    });

    // CLI flags take precedence over config
    let log_level = if cli.quiet {
        "error".to_string()
    } else if cli.verbose {
        "debug".to_string()
    } else {
        config.general.log_level.clone()
    };

    let filter = EnvFilter::from_default_env().add_directive(
        format!("tagcache={}", log_level)
            .parse()
            .unwrap_or_else(|_| "tagcache=info".parse().expect("fallback directive is valid")),
    );

    if config.general.log_format == "json" {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    tracing::debug!("Configuration loaded from: {}", cli.config.display());

    match cli.command {
        Commands::Init { path } => {
            tagcache::cli::commands::init(path).await?;
        }
        Commands::Config => {
            tagcache::cli::commands::config_cmd(&cli.config).await?;
        }
        Commands::Show => {
            tagcache::cli::commands::show(&config).await?;
        }
        Commands::Render {
            classes,
            tag,
            no_defaults,
            content,
        } => {
            tagcache::cli::commands::render(classes, &tag, &content, !no_defaults, &config).await?;
        }
        Commands::Simulate {
            keys,
            hot,
            shrink_to,
            json,
        } => {
            let options = SimulateOptions {
                keys,
                hot,
                shrink_to,
                quiet: json || cli.quiet,
            };
            tagcache::cli::commands::simulate(options, json, &config).await?;
        }
        Commands::Version => {
            tagcache::cli::commands::version();
        }
    }

    Ok(())
}
