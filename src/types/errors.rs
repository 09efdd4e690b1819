//! Tipos de erro do tagcache.
//!
//! O cache em si não define erros: falhas do produtor são genéricas e
//! propagadas sem alteração. Estes erros cobrem apenas as bordas
//! (configuração, IO, agendamento).

use thiserror::Error;

/// Tipo de resultado padrão do tagcache.
pub type TagCacheResult<T> = Result<T, TagCacheError>;

/// Erros possíveis no tagcache.
#[derive(Error, Debug)]
pub enum TagCacheError {
    #[error("Erro de configuração: {0}")]
    Config(String),

    #[error("Erro de IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro ao parsear TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Erro ao serializar TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Erro de JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Capacidade inválida: {0} (deve ser >= 0)")]
    InvalidCapacity(i64),

    #[error("Agendador '{0}' indisponível: {1}")]
    SchedulerUnavailable(String, String),

    #[cfg(feature = "cli")]
    #[error("Erro no prompt interativo: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("{0}")]
    Other(String),
}

impl TagCacheError {
    /// Cria um erro genérico.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Cria um erro de configuração.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}
