//! Cache de memoização com redução diferida.

use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Weak};
use std::time::Instant;

use parking_lot::Mutex;
use serde::Serialize;

use super::capacity::{CapacityConfig, Reducible};
use super::clock::{Clock, SystemClock};
use super::scheduler::{DeferredHandle, DeferredScheduler};

/// Fração da capacidade mantida após uma redução.
///
/// `floor(capacity * 0.6)`, calculado em inteiros.
pub fn retention_target(capacity: usize) -> usize {
    capacity / 5 * 3 + capacity % 5 * 3 / 5
}

struct Entry<V> {
    payload: Arc<V>,
    used_count: u64,
    last_used_at: Instant,
}

impl<V> Entry<V> {
    fn touch(&mut self, now: Instant) -> Arc<V> {
        self.used_count += 1;
        self.last_used_at = now;
        Arc::clone(&self.payload)
    }
}

struct PendingReduction {
    epoch: u64,
    handle: Option<DeferredHandle>,
}

struct State<K, V> {
    entries: HashMap<K, Entry<V>>,
    pending: Option<PendingReduction>,
    next_epoch: u64,
    hits: u64,
    misses: u64,
    reductions: u64,
    evicted: u64,
}

impl<K, V> State<K, V> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            pending: None,
            next_epoch: 0,
            hits: 0,
            misses: 0,
            reductions: 0,
            evicted: 0,
        }
    }

    /// Há passagem agendada que ainda pode rodar.
    fn has_live_pending(&self) -> bool {
        match &self.pending {
            Some(PendingReduction {
                handle: Some(handle),
                ..
            }) => !handle.is_lost(),
            Some(_) => true,
            None => false,
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(PendingReduction {
            handle: Some(handle),
            ..
        }) = self.pending.take()
        {
            handle.cancel();
        }
    }
}

/// Resultado de uma passagem de redução.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReductionOutcome {
    /// Capacidade 0: todas as entradas foram descartadas.
    Disabled { evicted: usize },

    /// O cache já estava dentro da capacidade.
    WithinCapacity,

    /// Entradas usadas uma vez ou menos recentes foram descartadas.
    Reduced {
        before: usize,
        after: usize,
        target: usize,
    },
}

/// Estatísticas do cache.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Nome do cache.
    pub label: String,

    /// Número atual de entradas.
    pub size: usize,

    /// Capacidade configurada.
    pub capacity: usize,

    /// Número de acertos (cache hits).
    pub hits: u64,

    /// Número de erros (cache misses).
    pub misses: u64,

    /// Passagens de redução que removeram entradas.
    pub reductions: u64,

    /// Total de entradas removidas por redução.
    pub evicted: u64,
}

impl CacheStats {
    /// Calcula a taxa de acerto.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct Shared<K, V> {
    label: String,
    state: Mutex<State<K, V>>,
    capacity: Arc<CapacityConfig>,
    scheduler: Arc<dyn DeferredScheduler>,
    clock: Arc<dyn Clock>,
    this: Weak<Shared<K, V>>,
}

/// Cache de memoização com capacidade flexível.
///
/// Cada chave guarda um payload produzido sob demanda, junto com o número de
/// usos e o instante do último uso. A capacidade é um limite suave: o cache
/// pode passar dela até que a redução agendada rode. A redução descarta
/// entradas usadas uma única vez e, se ainda houver excesso, mantém as mais
/// recentes até 60% da capacidade.
///
/// `K` define a igualdade das chaves: tipos `Hash + Eq` comparam por valor,
/// [`IdentityKey`](super::IdentityKey) compara por identidade.
pub struct MemoCache<K, V> {
    shared: Arc<Shared<K, V>>,
}

impl<K, V> MemoCache<K, V>
where
    K: Hash + Eq + Send + 'static,
    V: Send + Sync + 'static,
{
    /// Cria um novo cache.
    ///
    /// # Argumentos
    /// - `label`: Nome usado em logs e estatísticas
    /// - `capacity`: Capacidade compartilhada
    /// - `scheduler`: Onde as reduções rodam
    pub fn new(
        label: impl Into<String>,
        capacity: Arc<CapacityConfig>,
        scheduler: Arc<dyn DeferredScheduler>,
    ) -> Self {
        Self::with_clock(label, capacity, scheduler, Arc::new(SystemClock))
    }

    /// Cria um cache com relógio customizado.
    pub fn with_clock(
        label: impl Into<String>,
        capacity: Arc<CapacityConfig>,
        scheduler: Arc<dyn DeferredScheduler>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let shared = Arc::new_cyclic(|this| Shared {
            label: label.into(),
            state: Mutex::new(State::new()),
            capacity: Arc::clone(&capacity),
            scheduler,
            clock,
            this: this.clone(),
        });
        let weak: Weak<dyn Reducible> = Arc::downgrade(&shared) as Weak<dyn Reducible>;
        capacity.register(weak);
        Self { shared }
    }

    /// Busca `key` ou cria o payload com `producer`.
    pub fn get_or_create<F>(&self, key: K, producer: F) -> Arc<V>
    where
        F: FnOnce() -> V,
    {
        match self.try_get_or_create(key, || Ok::<V, Infallible>(producer())) {
            Ok(payload) => payload,
            Err(never) => match never {},
        }
    }

    /// Igual a [`get_or_create`](Self::get_or_create), para payloads já
    /// compartilhados.
    pub fn get_or_create_shared<F>(&self, key: K, producer: F) -> Arc<V>
    where
        F: FnOnce() -> Arc<V>,
    {
        match self.get_or_insert_with(key, || Ok::<Arc<V>, Infallible>(producer())) {
            Ok(payload) => payload,
            Err(never) => match never {},
        }
    }

    /// Variante falível: um erro do produtor é devolvido sem alterar o cache.
    pub fn try_get_or_create<F, E>(&self, key: K, producer: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        self.get_or_insert_with(key, || producer().map(Arc::new))
    }

    fn get_or_insert_with<F, E>(&self, key: K, producer: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<Arc<V>, E>,
    {
        if self.shared.capacity.is_disabled() {
            return producer();
        }

        if let Some(payload) = self.shared.lookup(&key) {
            return Ok(payload);
        }

        // O produtor roda fora do lock; pode consultar outros caches.
        let payload = producer()?;
        let (payload, inserted) = self.shared.insert(key, payload);
        if inserted {
            self.shared.schedule();
        }
        Ok(payload)
    }

    /// Executa a redução agora, cancelando qualquer passagem agendada.
    pub fn reduce_now(&self) -> ReductionOutcome {
        let mut state = self.shared.state.lock();
        state.cancel_pending();
        self.shared.reduce(&mut state)
    }

    /// Cancela a redução pendente e remove todas as entradas.
    pub fn clear(&self) {
        let mut state = self.shared.state.lock();
        state.cancel_pending();
        state.entries.clear();
        tracing::debug!(cache = %self.shared.label, "cache limpo");
    }
}

impl<K, V> MemoCache<K, V> {
    /// Número atual de entradas.
    pub fn len(&self) -> usize {
        self.shared.state.lock().entries.len()
    }

    /// Verifica se o cache está vazio.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Verifica se há uma redução agendada e ainda não executada.
    pub fn is_reduction_pending(&self) -> bool {
        self.shared.state.lock().has_live_pending()
    }

    /// Nome do cache.
    pub fn label(&self) -> &str {
        &self.shared.label
    }

    /// Configuração de capacidade usada por este cache.
    pub fn capacity(&self) -> &Arc<CapacityConfig> {
        &self.shared.capacity
    }

    /// Retorna estatísticas do cache.
    pub fn stats(&self) -> CacheStats {
        let state = self.shared.state.lock();
        CacheStats {
            label: self.shared.label.clone(),
            size: state.entries.len(),
            capacity: self.shared.capacity.get(),
            hits: state.hits,
            misses: state.misses,
            reductions: state.reductions,
            evicted: state.evicted,
        }
    }
}

impl<K, V> Clone for MemoCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<K, V> fmt::Debug for MemoCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoCache")
            .field("label", &self.shared.label)
            .field("size", &self.len())
            .field("capacity", &self.shared.capacity.get())
            .field("scheduler", &self.shared.scheduler.name())
            .finish()
    }
}

impl<K, V> Shared<K, V>
where
    K: Hash + Eq + Send + 'static,
    V: Send + Sync + 'static,
{
    fn lookup(&self, key: &K) -> Option<Arc<V>> {
        let now = self.clock.now();
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let payload = state.entries.get_mut(key)?.touch(now);
        state.hits += 1;
        Some(payload)
    }

    /// Insere o payload, a menos que outra chamada tenha inserido a mesma
    /// chave enquanto o produtor rodava. Nesse caso vale o payload guardado
    /// e a chamada conta como acerto.
    ///
    /// O miss só é contado aqui: um produtor que falha não deixa rastro.
    fn insert(&self, key: K, payload: Arc<V>) -> (Arc<V>, bool) {
        use std::collections::hash_map::Entry as MapEntry;

        let now = self.clock.now();
        let mut guard = self.state.lock();
        let state = &mut *guard;
        match state.entries.entry(key) {
            MapEntry::Occupied(mut occupied) => {
                state.hits += 1;
                (occupied.get_mut().touch(now), false)
            }
            MapEntry::Vacant(vacant) => {
                vacant.insert(Entry {
                    payload: Arc::clone(&payload),
                    used_count: 1,
                    last_used_at: now,
                });
                state.misses += 1;
                (payload, true)
            }
        }
    }

    fn schedule(&self) {
        let epoch = {
            let mut state = self.state.lock();
            if state.entries.len() <= self.capacity.get() || state.has_live_pending() {
                return;
            }
            if state.pending.take().is_some() {
                tracing::warn!(cache = %self.label, "redução anterior descartada pelo agendador");
            }
            let epoch = state.next_epoch;
            state.next_epoch += 1;
            state.pending = Some(PendingReduction {
                epoch,
                handle: None,
            });
            epoch
        };

        tracing::debug!(
            cache = %self.label,
            epoch,
            scheduler = self.scheduler.name(),
            "redução agendada"
        );

        let this = self.this.clone();
        let handle = self.scheduler.defer(Box::new(move || {
            if let Some(shared) = this.upgrade() {
                shared.run_scheduled(epoch);
            }
        }));

        // Agendadores síncronos já rodaram a passagem; o epoch não confere.
        let mut state = self.state.lock();
        if let Some(pending) = state.pending.as_mut().filter(|p| p.epoch == epoch) {
            pending.handle = Some(handle);
        }
    }

    fn run_scheduled(&self, epoch: u64) {
        let mut state = self.state.lock();
        if state.pending.as_ref().map(|p| p.epoch) != Some(epoch) {
            tracing::trace!(cache = %self.label, epoch, "redução obsoleta ignorada");
            return;
        }
        state.pending = None;
        self.reduce(&mut state);
    }

    fn reduce(&self, state: &mut State<K, V>) -> ReductionOutcome {
        let capacity = self.capacity.get();
        let before = state.entries.len();

        if capacity == 0 {
            state.entries.clear();
            state.evicted += before as u64;
            tracing::debug!(cache = %self.label, evicted = before, "cache desabilitado");
            return ReductionOutcome::Disabled { evicted: before };
        }

        if before <= capacity {
            return ReductionOutcome::WithinCapacity;
        }

        let target = retention_target(capacity);
        let mut retained: Vec<(K, Entry<V>)> = state
            .entries
            .drain()
            .filter(|(_, entry)| entry.used_count > 1)
            .collect();

        if retained.len() > target {
            retained.sort_by(|(_, a), (_, b)| b.last_used_at.cmp(&a.last_used_at));
            retained.truncate(target);
        }

        state.entries = retained.into_iter().collect();
        let after = state.entries.len();
        state.reductions += 1;
        state.evicted += (before - after) as u64;

        tracing::debug!(
            cache = %self.label,
            before,
            after,
            capacity,
            target,
            "cache reduzido"
        );

        ReductionOutcome::Reduced {
            before,
            after,
            target,
        }
    }
}

impl<K, V> Reducible for Shared<K, V>
where
    K: Hash + Eq + Send + 'static,
    V: Send + Sync + 'static,
{
    fn label(&self) -> &str {
        &self.label
    }

    fn maybe_schedule_reduction(&self) {
        self.schedule();
    }
}
