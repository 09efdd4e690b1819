//! Cache de memoização com redução diferida.
//!
//! Este módulo implementa um cache de capacidade flexível para tabelas de
//! funções derivadas por chave. Inserções nunca removem nada na hora: quando o
//! cache passa da capacidade, uma única passagem de redução é agendada e roda
//! depois, descartando entradas usadas uma só vez e as menos recentes.

mod capacity;
mod clock;
mod key;
mod memo;
mod scheduler;

pub use capacity::{CapacityConfig, DEFAULT_CAPACITY};
pub use clock::{Clock, ManualClock, SystemClock};
pub use key::{ClassListKey, IdentityKey, ObjectKey};
pub use memo::{retention_target, CacheStats, MemoCache, ReductionOutcome};
pub use scheduler::{
    DeferredHandle, DeferredScheduler, DeferredTask, InlineScheduler, ManualScheduler,
    TokioScheduler,
};
