//! Configuração interativa do tagcache.
//!
//! Este módulo implementa a configuração interativa usando dialoguer.

use std::path::Path;

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

use crate::types::config::{Config, SchedulerKind, LOG_FORMATS, LOG_LEVELS};
use crate::TagCacheResult;

/// Executa a configuração interativa.
pub fn run_interactive_config(config_path: &Path) -> TagCacheResult<()> {
    let theme = ColorfulTheme::default();

    println!("\n🔧 Configuração Interativa do tagcache\n");

    // Carrega config existente ou cria nova
    let mut config = if config_path.exists() {
        Config::load(config_path)?
    } else {
        println!("Criando nova configuração...\n");
        Config::default_config()
    };

    loop {
        let options = vec![
            "Configurações Gerais",
            "Cache",
            "Salvar e Sair",
            "Sair sem Salvar",
        ];

        let selection = Select::with_theme(&theme)
            .with_prompt("O que deseja configurar?")
            .items(&options)
            .default(0)
            .interact()?;

        match selection {
            0 => configure_general(&theme, &mut config)?,
            1 => configure_cache(&theme, &mut config)?,
            2 => {
                config.save(config_path)?;
                println!("\n✓ Configuração salva em: {}\n", config_path.display());
                break;
            }
            3 => {
                if Confirm::with_theme(&theme)
                    .with_prompt("Deseja realmente sair sem salvar?")
                    .default(false)
                    .interact()?
                {
                    println!("\nSaindo sem salvar.\n");
                    break;
                }
            }
            _ => {}
        }
    }

    Ok(())
}

/// Configura opções gerais.
fn configure_general(theme: &ColorfulTheme, config: &mut Config) -> TagCacheResult<()> {
    println!("\n📋 Configurações Gerais\n");

    let log_levels = LOG_LEVELS;
    let current_idx = log_levels
        .iter()
        .position(|&l| l == config.general.log_level)
        .unwrap_or(2);

    let log_level_idx = Select::with_theme(theme)
        .with_prompt("Nível de log")
        .items(&log_levels)
        .default(current_idx)
        .interact()?;

    config.general.log_level = log_levels[log_level_idx].to_string();

    let log_formats = LOG_FORMATS;
    let current_format_idx = log_formats
        .iter()
        .position(|&f| f == config.general.log_format)
        .unwrap_or(0);

    let log_format_idx = Select::with_theme(theme)
        .with_prompt("Formato de log")
        .items(&log_formats)
        .default(current_format_idx)
        .interact()?;

    config.general.log_format = log_formats[log_format_idx].to_string();

    println!("\n✓ Configurações gerais atualizadas.\n");
    Ok(())
}

/// Configura o cache.
fn configure_cache(theme: &ColorfulTheme, config: &mut Config) -> TagCacheResult<()> {
    println!("\n💾 Configuração do Cache\n");

    let capacity: usize = Input::with_theme(theme)
        .with_prompt("Capacidade (0 desabilita o cache)")
        .default(config.cache.capacity)
        .interact_text()?;

    config.cache.capacity = capacity;

    let schedulers = [SchedulerKind::Tokio, SchedulerKind::Inline];
    let labels = vec![
        "tokio (redução em task separada)",
        "inline (redução logo após a inserção)",
    ];
    let current_idx = schedulers
        .iter()
        .position(|&s| s == config.cache.scheduler)
        .unwrap_or(0);

    let scheduler_idx = Select::with_theme(theme)
        .with_prompt("Agendador de redução")
        .items(&labels)
        .default(current_idx)
        .interact()?;

    config.cache.scheduler = schedulers[scheduler_idx];

    println!("\n✓ Cache configurado.\n");
    Ok(())
}

/// Mostra resumo da configuração.
pub fn show_config_summary(config: &Config) {
    println!("\n📊 Resumo da Configuração\n");
    println!("┌─────────────────────────────────────────┐");
    println!("│ Geral                                   │");
    println!("├─────────────────────────────────────────┤");
    println!("│ Log level: {:<28} │", config.general.log_level);
    println!("│ Log format: {:<27} │", config.general.log_format);
    println!("├─────────────────────────────────────────┤");
    println!("│ Cache                                   │");
    println!("├─────────────────────────────────────────┤");
    if config.cache.capacity == 0 {
        println!("│ Capacidade: {:<27} │", "desabilitado");
    } else {
        println!("│ Capacidade: {:<27} │", config.cache.capacity);
    }
    println!("│ Agendador: {:<28} │", config.cache.scheduler.to_string());
    println!("└─────────────────────────────────────────┘\n");
}
