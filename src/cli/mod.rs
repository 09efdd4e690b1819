//! Interface de linha de comando do tagcache.

pub mod commands;
pub mod interactive;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// tagcache - Cache de funções de tag HTML com redução diferida.
#[derive(Parser, Debug)]
#[command(name = "tagcache")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Arquivo de configuração.
    #[arg(short, long, default_value = "tagcache.toml")]
    pub config: PathBuf,

    /// Modo verbose.
    #[arg(short, long)]
    pub verbose: bool,

    /// Modo silencioso.
    #[arg(short, long)]
    pub quiet: bool,

    /// Comando a executar.
    #[command(subcommand)]
    pub command: Commands,
}

/// Comandos disponíveis.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inicializa configuração no diretório atual.
    Init {
        /// Diretório de destino (padrão: diretório atual).
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Configura opções interativamente.
    Config,

    /// Mostra a configuração efetiva.
    Show,

    /// Renderiza uma tag usando as funções de classe em cache.
    Render {
        /// Classes (separadas por vírgula).
        #[arg(long, value_delimiter = ',')]
        classes: Vec<String>,

        /// Tag a renderizar (classe, elemento ou atributo).
        #[arg(short, long)]
        tag: String,

        /// Não inclui as funções padrão de HTML/SVG.
        #[arg(long)]
        no_defaults: bool,

        /// Trechos de conteúdo.
        content: Vec<String>,
    },

    /// Executa uma carga sintética e mostra o efeito das reduções.
    Simulate {
        /// Número de listas de classes distintas.
        #[arg(short, long, default_value_t = 200)]
        keys: usize,

        /// Quantas das primeiras chaves são usadas duas vezes.
        #[arg(long, default_value_t = 20)]
        hot: usize,

        /// Nova capacidade aplicada ao fim da carga.
        #[arg(long)]
        shrink_to: Option<usize>,

        /// Saída em JSON.
        #[arg(long)]
        json: bool,
    },

    /// Mostra versão.
    Version,
}
