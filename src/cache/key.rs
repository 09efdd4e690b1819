//! Chaves comparadas por identidade.
//!
//! Chaves comparadas por valor não precisam de nada especial: qualquer tipo
//! `Hash + Eq + Clone` serve direto como `K` de [`MemoCache`](super::MemoCache).
//! Para chaves comparadas por identidade usa-se [`IdentityKey`], que compara
//! o endereço do `Arc` e ignora o conteúdo.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// Chave que compara pelo endereço da alocação do `Arc`.
///
/// A entrada guarda um clone do `Arc`, então o endereço não pode ser
/// reutilizado por outro objeto enquanto a entrada existir.
pub struct IdentityKey<T: ?Sized>(Arc<T>);

/// Chave para objetos arbitrários (cache de `wrap_values`).
pub type ObjectKey = IdentityKey<dyn Any + Send + Sync>;

/// Chave para listas de classes (cache de classes).
pub type ClassListKey = IdentityKey<[String]>;

impl<T: ?Sized> IdentityKey<T> {
    /// Cria a chave a partir de um `Arc` existente.
    pub fn new(value: Arc<T>) -> Self {
        Self(value)
    }

    /// Referência ao `Arc` original.
    pub fn as_arc(&self) -> &Arc<T> {
        &self.0
    }

    fn address(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl<T: Any + Send + Sync> IdentityKey<T> {
    /// Converte para [`ObjectKey`] preservando o endereço.
    pub fn erase(value: &Arc<T>) -> ObjectKey {
        let erased: Arc<dyn Any + Send + Sync> = value.clone();
        IdentityKey(erased)
    }
}

impl<T: ?Sized> Clone for IdentityKey<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: ?Sized> PartialEq for IdentityKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl<T: ?Sized> Eq for IdentityKey<T> {}

impl<T: ?Sized> Hash for IdentityKey<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state);
    }
}

impl<T: ?Sized> Deref for IdentityKey<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: ?Sized> From<Arc<T>> for IdentityKey<T> {
    fn from(value: Arc<T>) -> Self {
        Self(value)
    }
}

impl<T: ?Sized> fmt::Debug for IdentityKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityKey({:#x})", self.address())
    }
}
