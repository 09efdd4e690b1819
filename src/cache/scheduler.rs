//! Agendamento diferido das passagens de redução.
//!
//! A redução nunca roda dentro de `get_or_create`: ela é enfileirada e executa
//! na próxima oportunidade do agendador. Cada agendamento devolve um
//! [`DeferredHandle`] que permite cancelar a tarefa antes que ela rode.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;

use crate::{TagCacheError, TagCacheResult};

/// Tarefa diferida, executada no máximo uma vez.
pub type DeferredTask = Box<dyn FnOnce() + Send + 'static>;

/// Capacidade de adiar trabalho para depois da chamada síncrona atual.
pub trait DeferredScheduler: Send + Sync {
    /// Nome do agendador (para logs).
    fn name(&self) -> &str;

    /// Enfileira `task`. A tarefa não roda se o handle for cancelado antes.
    fn defer(&self, task: DeferredTask) -> DeferredHandle;
}

/// Handle de cancelamento de uma tarefa diferida.
#[derive(Debug, Clone, Default)]
pub struct DeferredHandle {
    cancelled: Arc<AtomicBool>,
    started: Arc<AtomicBool>,
    abort: Option<AbortHandle>,
}

impl DeferredHandle {
    fn new() -> Self {
        Self::default()
    }

    fn with_abort(mut self, abort: AbortHandle) -> Self {
        self.abort = Some(abort);
        self
    }

    /// Cancela a tarefa. Não tem efeito se ela já rodou.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(abort) = &self.abort {
            abort.abort();
        }
    }

    /// Verifica se o handle foi cancelado.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// A tarefa terminou sem nunca ter rodado e sem ter sido cancelada.
    ///
    /// Acontece quando o runtime tokio já foi desligado: a task é descartada
    /// no próprio `spawn`.
    pub fn is_lost(&self) -> bool {
        !self.is_cancelled()
            && !self.started.load(Ordering::SeqCst)
            && self.abort.as_ref().is_some_and(AbortHandle::is_finished)
    }

    fn guard(&self, task: DeferredTask) -> DeferredTask {
        let cancelled = Arc::clone(&self.cancelled);
        let started = Arc::clone(&self.started);
        Box::new(move || {
            started.store(true, Ordering::SeqCst);
            if !cancelled.load(Ordering::SeqCst) {
                task();
            }
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tokio
// ═══════════════════════════════════════════════════════════════════════════

/// Roda a tarefa numa task tokio, depois de ceder a vez uma vez.
///
/// Se o runtime for desligado, as tarefas seguintes são descartadas e os
/// handles ficam [`DeferredHandle::is_lost`].
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    /// Cria o agendador sobre um runtime existente.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Usa o runtime em que a chamada está rodando.
    pub fn current() -> TagCacheResult<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| TagCacheError::SchedulerUnavailable("tokio".to_string(), e.to_string()))
    }
}

impl DeferredScheduler for TokioScheduler {
    fn name(&self) -> &str {
        "tokio"
    }

    fn defer(&self, task: DeferredTask) -> DeferredHandle {
        let handle = DeferredHandle::new();
        let task = handle.guard(task);
        let join = self.handle.spawn(async move {
            tokio::task::yield_now().await;
            task();
        });
        handle.with_abort(join.abort_handle())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Manual
// ═══════════════════════════════════════════════════════════════════════════

/// Guarda as tarefas até que [`ManualScheduler::run_pending`] seja chamado.
///
/// Serve para testes e para hosts que possuem o próprio laço de eventos.
#[derive(Default)]
pub struct ManualScheduler {
    queue: Mutex<VecDeque<(DeferredHandle, DeferredTask)>>,
}

impl ManualScheduler {
    /// Cria um agendador vazio.
    pub fn new() -> Self {
        Self::default()
    }

    /// Número de tarefas enfileiradas e não canceladas.
    pub fn pending(&self) -> usize {
        self.queue
            .lock()
            .iter()
            .filter(|(handle, _)| !handle.is_cancelled())
            .count()
    }

    /// Executa tarefas até a fila esvaziar, inclusive as enfileiradas
    /// durante a execução. Retorna quantas rodaram.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            // A fila não pode ficar travada enquanto a tarefa roda.
            let next = self.queue.lock().pop_front();
            let Some((handle, task)) = next else {
                break;
            };
            if handle.is_cancelled() {
                continue;
            }
            task();
            ran += 1;
        }
        ran
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("queued", &self.queue.lock().len())
            .finish()
    }
}

impl DeferredScheduler for ManualScheduler {
    fn name(&self) -> &str {
        "manual"
    }

    fn defer(&self, task: DeferredTask) -> DeferredHandle {
        let handle = DeferredHandle::new();
        let task = handle.guard(task);
        self.queue.lock().push_back((handle.clone(), task));
        handle
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Inline
// ═══════════════════════════════════════════════════════════════════════════

/// Executa a tarefa imediatamente, na própria chamada a `defer`.
///
/// O cache só agenda depois de soltar seu lock, então a passagem roda logo
/// após a inserção que a disparou.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineScheduler;

impl DeferredScheduler for InlineScheduler {
    fn name(&self) -> &str {
        "inline"
    }

    fn defer(&self, task: DeferredTask) -> DeferredHandle {
        task();
        DeferredHandle::new()
    }
}
