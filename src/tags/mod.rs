//! Funções de tag HTML e os caches que as memoizam.
//!
//! - [`functions`] - Tabelas de funções (elementos, atributos, classes)
//! - [`text`] - Codificação de entidades e extração de atributos
//! - [`TagFunctionCaches`] - Cache por objeto e cache por lista de classes

mod caches;
pub mod functions;
pub mod text;

pub use caches::{TagFunctionCaches, WrappedValues};
pub use functions::{default_tag_functions, TagFunction, TagFunctions};
