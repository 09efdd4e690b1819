//! Tipos compartilhados: configuração e erros.

pub mod config;
pub mod errors;
