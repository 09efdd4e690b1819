//! As duas instâncias de cache de funções de tag.

use std::any::Any;
use std::sync::Arc;

use crate::cache::{
    CacheStats, CapacityConfig, ClassListKey, DeferredScheduler, IdentityKey, InlineScheduler,
    MemoCache, ObjectKey, TokioScheduler,
};
use crate::types::config::{CacheConfig, SchedulerKind};
use crate::TagCacheResult;

use super::functions::{create_class_tag_functions_uncached, default_tag_functions, TagFunctions};
use super::text::entity_encode;

/// Valores do chamador junto com as funções de tag resolvidas para eles.
#[derive(Debug, Clone)]
pub struct WrappedValues<T> {
    values: Arc<T>,
    tags: Arc<TagFunctions>,
}

impl<T> WrappedValues<T> {
    /// Valores originais.
    pub fn values(&self) -> &Arc<T> {
        &self.values
    }

    /// Funções de tag associadas.
    pub fn tag_functions(&self) -> &Arc<TagFunctions> {
        &self.tags
    }

    /// Renderiza uma tag.
    pub fn render(&self, tag: &str, chunks: &[&str]) -> Option<String> {
        self.tags.render(tag, chunks)
    }

    /// Projeta um campo textual dos valores, codificando entidades.
    pub fn encoded<F>(&self, field: F) -> String
    where
        F: FnOnce(&T) -> &str,
    {
        entity_encode(field(&self.values))
    }
}

/// Caches de funções de tag: um por identidade de objeto, outro por
/// identidade de lista de classes. Compartilham a mesma capacidade.
#[derive(Debug, Clone)]
pub struct TagFunctionCaches {
    capacity: Arc<CapacityConfig>,
    wrap: MemoCache<ObjectKey, TagFunctions>,
    classes: MemoCache<ClassListKey, TagFunctions>,
}

impl TagFunctionCaches {
    /// Cria os dois caches sobre a capacidade e o agendador dados.
    pub fn new(capacity: Arc<CapacityConfig>, scheduler: Arc<dyn DeferredScheduler>) -> Self {
        Self {
            wrap: MemoCache::new("wrap", Arc::clone(&capacity), Arc::clone(&scheduler)),
            classes: MemoCache::new("classes", Arc::clone(&capacity), scheduler),
            capacity,
        }
    }

    /// Cria os caches a partir da configuração.
    ///
    /// O agendador tokio exige um runtime ativo.
    pub fn from_config(config: &CacheConfig) -> TagCacheResult<Self> {
        let scheduler: Arc<dyn DeferredScheduler> = match config.scheduler {
            SchedulerKind::Tokio => Arc::new(TokioScheduler::current()?),
            SchedulerKind::Inline => Arc::new(InlineScheduler),
        };
        tracing::debug!(
            capacity = config.capacity,
            scheduler = %config.scheduler,
            "caches de funções de tag criados"
        );
        Ok(Self::new(CapacityConfig::shared(config.capacity), scheduler))
    }

    /// Funções de classe para `class_names`, em cache pela identidade da
    /// lista.
    ///
    /// `include_defaults` só é considerado quando a lista ainda não está no
    /// cache.
    pub fn class_tag_functions(
        &self,
        class_names: &Arc<[String]>,
        include_defaults: bool,
    ) -> Arc<TagFunctions> {
        let key = IdentityKey::new(Arc::clone(class_names));
        self.classes.get_or_create(key, || {
            let functions = create_class_tag_functions_uncached(class_names);
            if include_defaults {
                functions.with_fallback(default_tag_functions())
            } else {
                functions
            }
        })
    }

    /// Associa funções de tag a `values`, em cache pela identidade do objeto.
    pub fn wrap_values<T>(
        &self,
        values: &Arc<T>,
        class_names: Option<&Arc<[String]>>,
        include_defaults: bool,
    ) -> WrappedValues<T>
    where
        T: Any + Send + Sync,
    {
        let tags = self
            .wrap
            .get_or_create_shared(IdentityKey::erase(values), || match class_names {
                Some(class_names) => self.class_tag_functions(class_names, include_defaults),
                None => default_tag_functions(),
            });
        WrappedValues {
            values: Arc::clone(values),
            tags,
        }
    }

    /// Altera a capacidade dos dois caches.
    pub fn set_capacity(&self, capacity: usize) {
        self.capacity.set(capacity);
    }

    /// Capacidade atual.
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Limpa os dois caches e cancela reduções pendentes.
    pub fn clear(&self) {
        self.wrap.clear();
        self.classes.clear();
    }

    /// Verifica se algum dos caches tem redução pendente.
    pub fn is_reduction_pending(&self) -> bool {
        self.wrap.is_reduction_pending() || self.classes.is_reduction_pending()
    }

    /// Tamanho do cache de objetos.
    pub fn wrap_cache_size(&self) -> usize {
        self.wrap.len()
    }

    /// Tamanho do cache de classes.
    pub fn classes_cache_size(&self) -> usize {
        self.classes.len()
    }

    /// Estatísticas dos dois caches.
    pub fn stats(&self) -> Vec<CacheStats> {
        vec![self.wrap.stats(), self.classes.stats()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualScheduler;

    fn caches() -> (TagFunctionCaches, Arc<ManualScheduler>) {
        let scheduler = Arc::new(ManualScheduler::new());
        let caches = TagFunctionCaches::new(CapacityConfig::shared(100), scheduler.clone());
        (caches, scheduler)
    }

    fn classes(names: &[&str]) -> Arc<[String]> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_class_tag_functions_cached_by_identity() {
        let (caches, _) = caches();
        let list = classes(&["c"]);

        let first = caches.class_tag_functions(&list, true);
        let second = caches.class_tag_functions(&list, true);
        let other = caches.class_tag_functions(&classes(&["c"]), true);

        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(caches.classes_cache_size(), 2);
        assert_eq!(caches.wrap_cache_size(), 0);
        assert_eq!(
            first.render("c", &["123"]).unwrap(),
            r#"<span class="c">123</span>"#
        );
    }

    #[test]
    fn test_include_defaults_fixed_by_first_call() {
        let (caches, _) = caches();
        let list = classes(&["c"]);

        let without = caches.class_tag_functions(&list, false);
        assert!(!without.contains("li"));

        let again = caches.class_tag_functions(&list, true);
        assert!(Arc::ptr_eq(&without, &again));
        assert!(!again.contains("li"));
    }

    #[test]
    fn test_wrap_values_defaults() {
        let (caches, _) = caches();
        let values = Arc::new(String::from("John & Jane"));

        let wrapped = caches.wrap_values(&values, None, true);

        assert_eq!(wrapped.render("li", &["content"]).unwrap(), "<li>content</li>");
        assert_eq!(wrapped.encoded(|v| v.as_str()), "John &amp; Jane");
        assert!(Arc::ptr_eq(wrapped.tag_functions(), &default_tag_functions()));
        assert_eq!(caches.wrap_cache_size(), 1);
        assert_eq!(caches.classes_cache_size(), 0);
    }

    #[test]
    fn test_wrap_values_with_classes_populates_both() {
        let (caches, _) = caches();
        let values = Arc::new(47u32);
        let list = classes(&["highlight"]);

        let first = caches.wrap_values(&values, Some(&list), true);
        let second = caches.wrap_values(&values, None, true);

        assert!(Arc::ptr_eq(first.tag_functions(), second.tag_functions()));
        assert_eq!(
            second.render("highlight", &["x"]).unwrap(),
            r#"<span class="highlight">x</span>"#
        );
        assert_eq!(caches.wrap_cache_size(), 1);
        assert_eq!(caches.classes_cache_size(), 1);
    }

    #[test]
    fn test_clear_both() {
        let (caches, scheduler) = caches();
        caches.set_capacity(1);
        for _ in 0..3 {
            caches.class_tag_functions(&classes(&["a"]), true);
            caches.wrap_values(&Arc::new(()), None, true);
        }
        assert!(caches.is_reduction_pending());

        caches.clear();

        assert_eq!(caches.wrap_cache_size(), 0);
        assert_eq!(caches.classes_cache_size(), 0);
        assert!(!caches.is_reduction_pending());
        assert_eq!(scheduler.run_pending(), 0);
    }

    #[test]
    fn test_from_config_inline() {
        let config = CacheConfig {
            capacity: 2,
            scheduler: SchedulerKind::Inline,
        };
        let caches = TagFunctionCaches::from_config(&config).unwrap();
        for _ in 0..3 {
            caches.class_tag_functions(&classes(&["a"]), true);
        }
        // Redução inline: tudo usado uma vez foi descartado.
        assert_eq!(caches.classes_cache_size(), 0);
        assert_eq!(caches.capacity(), 2);
    }

    #[test]
    fn test_from_config_tokio_requires_runtime() {
        let config = CacheConfig::default();
        assert!(TagFunctionCaches::from_config(&config).is_err());
    }
}
