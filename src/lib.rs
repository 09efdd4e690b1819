//! # tagcache
//!
//! Cache de memoização para funções de tag HTML.
//!
//! Chamadas repetidas com a mesma chave devolvem a mesma tabela de funções,
//! sem reconstruí-la. O cache tem capacidade flexível: quando passa do
//! limite, uma redução diferida descarta entradas usadas uma única vez e
//! mantém as mais recentes até 60% da capacidade.
//!
//! ## Módulos
//!
//! - [`cache`] - Cache genérico com redução diferida
//! - [`tags`] - Funções de tag e as duas instâncias de cache
//! - [`cli`] - Interface de linha de comando
//! - [`types`] - Configuração e erros

pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod tags;
pub mod types;

pub use types::config::Config;
pub use types::errors::{TagCacheError, TagCacheResult};
