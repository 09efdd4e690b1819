//! Capacidade compartilhada entre instâncias de cache.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::{TagCacheError, TagCacheResult};

/// Capacidade padrão de cada cache.
pub const DEFAULT_CAPACITY: usize = 100;

/// Cache que reage a mudanças de capacidade.
pub(crate) trait Reducible: Send + Sync {
    fn label(&self) -> &str;

    fn maybe_schedule_reduction(&self);
}

/// Configuração de capacidade lida por todos os caches registrados.
///
/// Alterar a capacidade agenda uma redução em cada cache vivo que estiver
/// acima do novo limite. O tamanho só muda quando a passagem roda.
pub struct CapacityConfig {
    capacity: AtomicUsize,
    caches: Mutex<Vec<Weak<dyn Reducible>>>,
}

impl CapacityConfig {
    /// Cria uma configuração compartilhável.
    pub fn shared(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            capacity: AtomicUsize::new(capacity),
            caches: Mutex::new(Vec::new()),
        })
    }

    /// Capacidade atual.
    pub fn get(&self) -> usize {
        self.capacity.load(Ordering::SeqCst)
    }

    /// Capacidade 0 desliga o cache.
    pub fn is_disabled(&self) -> bool {
        self.get() == 0
    }

    /// Atualiza a capacidade e notifica os caches vivos.
    pub fn set(&self, capacity: usize) {
        let previous = self.capacity.swap(capacity, Ordering::SeqCst);
        tracing::debug!(previous, capacity, "capacidade alterada");

        for cache in self.live_caches() {
            tracing::trace!(cache = cache.label(), "verificando redução");
            cache.maybe_schedule_reduction();
        }
    }

    /// Variante que valida valores vindos de fontes sem sinal garantido.
    pub fn try_set(&self, capacity: i64) -> TagCacheResult<()> {
        let capacity =
            usize::try_from(capacity).map_err(|_| TagCacheError::InvalidCapacity(capacity))?;
        self.set(capacity);
        Ok(())
    }

    /// Número de caches ainda vivos registrados.
    pub fn registered(&self) -> usize {
        self.live_caches().len()
    }

    pub(crate) fn register(&self, cache: Weak<dyn Reducible>) {
        self.caches.lock().push(cache);
    }

    fn live_caches(&self) -> Vec<Arc<dyn Reducible>> {
        let mut caches = self.caches.lock();
        caches.retain(|weak| weak.strong_count() > 0);
        caches.iter().filter_map(Weak::upgrade).collect()
    }
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            capacity: AtomicUsize::new(DEFAULT_CAPACITY),
            caches: Mutex::new(Vec::new()),
        }
    }
}

impl std::fmt::Debug for CapacityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapacityConfig")
            .field("capacity", &self.get())
            .finish()
    }
}
