//! Fonte de tempo para `last_used_at`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Relógio monotônico usado para marcar o último acesso de cada entrada.
pub trait Clock: Send + Sync {
    /// Leitura atual.
    fn now(&self) -> Instant;
}

/// Relógio do sistema.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Relógio controlado manualmente, útil em testes de recência.
///
/// Cada leitura devolve `origem + deslocamento`; o deslocamento só muda via
/// [`ManualClock::set_millis`] ou [`ManualClock::advance`].
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset_ms: AtomicU64,
}

impl ManualClock {
    /// Cria um relógio parado na origem.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset_ms: AtomicU64::new(0),
        }
    }

    /// Posiciona o relógio em `millis` após a origem.
    pub fn set_millis(&self, millis: u64) {
        self.offset_ms.store(millis, Ordering::SeqCst);
    }

    /// Avança o relógio.
    pub fn advance(&self, by: Duration) {
        self.offset_ms
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
    }
}
