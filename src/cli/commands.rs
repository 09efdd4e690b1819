//! Implementação dos comandos CLI do tagcache.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::cache::CacheStats;
use crate::tags::TagFunctionCaches;
use crate::types::config::Config;
use crate::{TagCacheError, TagCacheResult};

/// Initializes configuration in the specified directory.
pub async fn init(path: Option<PathBuf>) -> TagCacheResult<()> {
    let target_dir = path.unwrap_or_else(|| PathBuf::from("."));

    if !target_dir.exists() {
        std::fs::create_dir_all(&target_dir)?;
        tracing::info!("Directory created: {}", target_dir.display());
    }

    let config_path = target_dir.join("tagcache.toml");

    if config_path.exists() {
        println!("Configuration already exists at: {}", config_path.display());
        println!("Use 'tagcache config' to modify.");
        return Ok(());
    }

    let config = Config::default_config();
    config.save(&config_path)?;

    println!("tagcache initialized successfully!");
    println!("Configuration created at: {}", config_path.display());
    println!();
    println!("Next steps:");
    println!("  1. Adjust the capacity: tagcache config");
    println!("  2. Try a workload: tagcache simulate --shrink-to 20");

    Ok(())
}

/// Configura opções interativamente.
pub async fn config_cmd(config_path: &Path) -> TagCacheResult<()> {
    use super::interactive::{run_interactive_config, show_config_summary};

    if config_path.exists() {
        let config = Config::load(config_path)?;
        show_config_summary(&config);
    }

    run_interactive_config(config_path)
}

/// Mostra a configuração efetiva em TOML.
pub async fn show(config: &Config) -> TagCacheResult<()> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

/// Mostra versão.
pub fn version() {
    println!("tagcache {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Cache de funções de tag HTML com redução diferida");
}

/// Renderiza uma tag com as funções de classe em cache.
pub async fn render(
    classes: Vec<String>,
    tag: &str,
    content: &[String],
    include_defaults: bool,
    config: &Config,
) -> TagCacheResult<()> {
    let caches = TagFunctionCaches::from_config(&config.cache)?;
    let classes: Arc<[String]> = classes.into();
    let functions = caches.class_tag_functions(&classes, include_defaults);

    let chunks: Vec<&str> = content.iter().map(String::as_str).collect();
    let html = functions
        .render(tag, &chunks)
        .ok_or_else(|| TagCacheError::other(format!("Tag '{}' desconhecida", tag)))?;

    println!("{}", html);
    Ok(())
}

/// Parâmetros da simulação.
#[derive(Debug, Clone)]
pub struct SimulateOptions {
    /// Número de listas de classes distintas.
    pub keys: usize,
    /// Quantas das primeiras chaves são usadas duas vezes.
    pub hot: usize,
    /// Nova capacidade aplicada ao fim da carga.
    pub shrink_to: Option<usize>,
    /// Esconde a barra de progresso.
    pub quiet: bool,
}

/// Resultado da simulação.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub keys: usize,
    pub hot: usize,
    pub capacity: usize,
    pub size_after_load: usize,
    pub shrink_to: Option<usize>,
    pub size_before_reduction: usize,
    pub size_after_reduction: usize,
    pub stats: Vec<CacheStats>,
}

/// Executa a carga sintética no cache de classes.
pub async fn run_simulation(
    options: &SimulateOptions,
    config: &Config,
) -> TagCacheResult<SimulationReport> {
    let caches = TagFunctionCaches::from_config(&config.cache)?;

    let progress = if options.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(options.keys as u64)
    };
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} chaves")
            .map_err(|e| TagCacheError::other(e.to_string()))?
            .progress_chars("=> "),
    );

    for i in 0..options.keys {
        let classes: Arc<[String]> = Arc::from(vec![format!("class-{}", i)]);
        caches.class_tag_functions(&classes, true);
        if i < options.hot {
            caches.class_tag_functions(&classes, true);
        }
        progress.inc(1);

        // Dá chance às reduções agendadas durante a carga.
        if i % 64 == 63 {
            tokio::task::yield_now().await;
        }
    }
    progress.finish_and_clear();

    settle(&caches).await;
    let size_after_load = caches.classes_cache_size();

    let mut size_before_reduction = size_after_load;
    if let Some(capacity) = options.shrink_to {
        tracing::info!(capacity, "aplicando nova capacidade");
        caches.set_capacity(capacity);
        // A nova capacidade só vale quando a passagem agendada rodar.
        size_before_reduction = caches.classes_cache_size();
        settle(&caches).await;
    }
    let size_after_reduction = caches.classes_cache_size();

    Ok(SimulationReport {
        keys: options.keys,
        hot: options.hot,
        capacity: config.cache.capacity,
        size_after_load,
        shrink_to: options.shrink_to,
        size_before_reduction,
        size_after_reduction,
        stats: caches.stats(),
    })
}

/// Executa a simulação e imprime o relatório.
pub async fn simulate(options: SimulateOptions, json: bool, config: &Config) -> TagCacheResult<()> {
    let report = run_simulation(&options, config).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Simulação concluída\n");
    println!("  Chaves:            {} ({} usadas duas vezes)", report.keys, report.hot);
    println!("  Capacidade:        {}", report.capacity);
    println!("  Tamanho pós-carga: {}", report.size_after_load);
    if let Some(capacity) = report.shrink_to {
        println!("  Nova capacidade:   {}", capacity);
        println!(
            "  Tamanho:           {} → {}",
            report.size_before_reduction, report.size_after_reduction
        );
    }
    println!();
    for stats in &report.stats {
        println!(
            "  [{}] tamanho={} hits={} misses={} reduções={} removidas={} taxa={:.1}%",
            stats.label,
            stats.size,
            stats.hits,
            stats.misses,
            stats.reductions,
            stats.evicted,
            stats.hit_rate() * 100.0
        );
    }

    Ok(())
}

/// Espera as reduções pendentes rodarem.
async fn settle(caches: &TagFunctionCaches) {
    let wait = async {
        while caches.is_reduction_pending() {
            tokio::task::yield_now().await;
        }
    };
    if tokio::time::timeout(Duration::from_secs(1), wait)
        .await
        .is_err()
    {
        tracing::warn!("redução ainda pendente após 1s");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::config::SchedulerKind;

    fn options(keys: usize, hot: usize, shrink_to: Option<usize>) -> SimulateOptions {
        SimulateOptions {
            keys,
            hot,
            shrink_to,
            quiet: true,
        }
    }

    #[tokio::test]
    async fn test_simulation_shrink() {
        let config = Config::default_config();
        let report = run_simulation(&options(100, 10, Some(20)), &config)
            .await
            .unwrap();

        assert_eq!(report.size_after_load, 100);
        assert_eq!(report.size_before_reduction, 100);
        // 10 usadas duas vezes <= floor(20 * 0.6)
        assert_eq!(report.size_after_reduction, 10);
    }

    #[tokio::test]
    async fn test_simulation_inline_scheduler() {
        let mut config = Config::default_config();
        config.cache.scheduler = SchedulerKind::Inline;
        config.cache.capacity = 10;

        let report = run_simulation(&options(11, 0, None), &config)
            .await
            .unwrap();

        assert_eq!(report.size_after_load, 0);
        assert_eq!(report.stats[1].reductions, 1);
    }
}
