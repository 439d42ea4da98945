//! Dependency injection for command handlers.
//!
//! Commands declare [`Injection`]s — named runtime dependencies resolved at
//! dispatch time from a [`ProviderRegistry`]. A registry holds directly
//! provided values (or getters re-invoked on every resolution) and chains
//! to the registries of composed commanders, so one dispatch loop can serve
//! command sets from several modules.
//!
//! Provided values are type-erased (`Arc<dyn Any + Send + Sync>`); handlers
//! recover them through the typed accessors on [`Injected`].

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::{CommandError, Result};

/// A type-erased provided value.
pub type DynValue = Arc<dyn Any + Send + Sync>;

/// A provider entry: a stored value, or a getter invoked fresh on every
/// resolution (for values that change between dispatches, like a terminal
/// width).
#[derive(Clone)]
pub enum Provided {
    /// A value stored as-is.
    Value(DynValue),
    /// A getter re-invoked on every resolution.
    Getter(Arc<dyn Fn() -> DynValue + Send + Sync>),
}

impl Provided {
    /// Wraps a value.
    pub fn value<T: Send + Sync + 'static>(value: T) -> Self {
        Provided::Value(Arc::new(value))
    }

    /// Wraps a getter.
    pub fn getter<T: Send + Sync + 'static>(
        getter: impl Fn() -> T + Send + Sync + 'static,
    ) -> Self {
        Provided::Getter(Arc::new(move || Arc::new(getter()) as DynValue))
    }

    fn resolve(&self) -> DynValue {
        match self {
            Provided::Value(value) => value.clone(),
            Provided::Getter(getter) => getter(),
        }
    }

    /// Identity comparison: true when both entries refer to the same
    /// stored value or the same getter.
    fn same(&self, other: &Provided) -> bool {
        match (self, other) {
            (Provided::Value(a), Provided::Value(b)) => Arc::ptr_eq(a, b),
            (Provided::Getter(a), Provided::Getter(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Provided {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provided::Value(_) => f.write_str("Provided::Value"),
            Provided::Getter(_) => f.write_str("Provided::Getter"),
        }
    }
}

/// A named dependency a command requests at dispatch time.
#[derive(Debug, Clone)]
pub struct Injection {
    /// Provider key to resolve.
    pub key: String,
    /// Parameter name the value is bound to in the handler's view.
    pub bind_as: String,
    /// Gather every offered value instead of taking the first.
    pub collect: bool,
    /// Fallback when no provider offers a value.
    pub default: Option<Provided>,
}

/// Starts an injection declaration for the given key, bound under the same
/// name unless [`Injection::bind_as`] renames it.
pub fn require(key: impl Into<String>) -> Injection {
    let key = key.into();
    Injection {
        bind_as: key.clone(),
        key,
        collect: false,
        default: None,
    }
}

impl Injection {
    /// Binds the resolved value under a different parameter name.
    pub fn bind_as(mut self, name: impl Into<String>) -> Self {
        self.bind_as = name.into();
        self
    }

    /// Gathers all values offered for the key, in provider order.
    pub fn collect(mut self) -> Self {
        self.collect = true;
        self
    }

    /// Uses the given value when no provider offers one.
    pub fn default_value<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.default = Some(Provided::value(value));
        self
    }
}

#[derive(Default)]
struct RegistryInner {
    values: HashMap<String, Provided>,
    children: Vec<ProviderRegistry>,
}

/// A layered provider map.
///
/// Resolution yields the registry's own value first (getters invoked
/// fresh), then every value offered by chained child registries, in
/// composition order.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl ProviderRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Provides a value under `key` for the lifetime of the returned scope
    /// guard. Dropping the guard restores whatever the key held before,
    /// unless a later provision already replaced this one.
    #[must_use = "dropping the guard immediately removes the provided value"]
    pub fn provide<T: Send + Sync + 'static>(&self, key: impl Into<String>, value: T) -> ScopedProvider {
        self.install(key.into(), Provided::value(value))
    }

    /// Provides a getter invoked fresh on every resolution.
    #[must_use = "dropping the guard immediately removes the provided value"]
    pub fn provide_getter<T: Send + Sync + 'static>(
        &self,
        key: impl Into<String>,
        getter: impl Fn() -> T + Send + Sync + 'static,
    ) -> ScopedProvider {
        self.install(key.into(), Provided::getter(getter))
    }

    fn install(&self, key: String, provided: Provided) -> ScopedProvider {
        let previous = {
            let mut inner = self.inner.lock().expect("provider registry poisoned");
            inner.values.insert(key.clone(), provided.clone())
        };
        ScopedProvider {
            registry: self.clone(),
            key,
            installed: provided,
            previous,
            armed: true,
        }
    }

    /// Chains a child registry consulted after this one.
    pub fn chain(&self, child: ProviderRegistry) {
        let mut inner = self.inner.lock().expect("provider registry poisoned");
        inner.children.push(child);
    }

    /// Resolves every value offered for `key`, in provider order.
    pub fn require(&self, key: &str) -> Vec<DynValue> {
        let (own, children) = {
            let inner = self.inner.lock().expect("provider registry poisoned");
            (inner.values.get(key).cloned(), inner.children.clone())
        };

        let mut values = Vec::new();
        if let Some(provided) = own {
            values.push(provided.resolve());
        }
        for child in children {
            values.extend(child.require(key));
        }
        values
    }

    /// Resolves the first value offered for `key`.
    pub fn first(&self, key: &str) -> Option<DynValue> {
        self.require(key).into_iter().next()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProviderRegistry")
    }
}

/// Scope guard returned by [`ProviderRegistry::provide`].
///
/// On drop, restores the entry the key held before this provision — but
/// only while this provision is still current, so a nested scope's cleanup
/// never clobbers an outer re-provision.
#[must_use]
pub struct ScopedProvider {
    registry: ProviderRegistry,
    key: String,
    installed: Provided,
    previous: Option<Provided>,
    armed: bool,
}

impl ScopedProvider {
    /// Disarms the guard so the value stays provided for the registry's
    /// lifetime.
    pub fn persist(mut self) {
        self.armed = false;
    }
}

impl Drop for ScopedProvider {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = self
            .registry
            .inner
            .lock()
            .expect("provider registry poisoned");
        let current_is_ours = inner
            .values
            .get(&self.key)
            .is_some_and(|current| current.same(&self.installed));
        if !current_is_ours {
            return;
        }
        match self.previous.take() {
            Some(previous) => {
                inner.values.insert(self.key.clone(), previous);
            }
            None => {
                inner.values.remove(&self.key);
            }
        }
    }
}

/// A value resolved for one injection.
#[derive(Clone)]
pub enum InjectedValue {
    /// The first offered value.
    One(DynValue),
    /// Every offered value, in provider order.
    Many(Vec<DynValue>),
}

/// The resolved dependencies handed to a command handler, keyed by the
/// injection's bind name.
#[derive(Default)]
pub struct Injected {
    values: HashMap<String, InjectedValue>,
}

impl Injected {
    /// Returns the value bound under `name`, downcast to `T`. For a
    /// collected injection this is the first element.
    pub fn get<T: Send + Sync + 'static>(&self, name: &str) -> Option<Arc<T>> {
        match self.values.get(name)? {
            InjectedValue::One(value) => value.clone().downcast::<T>().ok(),
            InjectedValue::Many(values) => values.first()?.clone().downcast::<T>().ok(),
        }
    }

    /// Returns every collected value bound under `name`, downcast to `T`.
    /// Values of other types are skipped.
    pub fn all<T: Send + Sync + 'static>(&self, name: &str) -> Vec<Arc<T>> {
        match self.values.get(name) {
            Some(InjectedValue::Many(values)) => values
                .iter()
                .filter_map(|value| value.clone().downcast::<T>().ok())
                .collect(),
            Some(InjectedValue::One(value)) => {
                value.clone().downcast::<T>().ok().into_iter().collect()
            }
            None => Vec::new(),
        }
    }
}

impl fmt::Debug for Injected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injected")
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Resolves a command's injection list against a resolver function.
///
/// `resolve` receives the source key and returns every value offered for
/// it. A non-collecting injection with no offered value falls back to its
/// default; without one, resolution fails with an injection error naming
/// the key and the parameter it was bound to.
pub fn build_injected(
    injections: &[Injection],
    resolve: impl Fn(&str) -> Vec<DynValue>,
) -> Result<Injected> {
    let mut injected = Injected::default();
    for injection in injections {
        let values = resolve(&injection.key);
        debug!(
            key = %injection.key,
            offered = values.len(),
            collect = injection.collect,
            "resolving injection"
        );
        let resolved = if injection.collect {
            InjectedValue::Many(values)
        } else {
            match values.into_iter().next() {
                Some(value) => InjectedValue::One(value),
                None => match &injection.default {
                    Some(default) => InjectedValue::One(match default {
                        Provided::Value(value) => value.clone(),
                        Provided::Getter(getter) => getter(),
                    }),
                    None => {
                        return Err(CommandError::injection(&injection.key, &injection.bind_as))
                    }
                },
            }
        };
        injected.values.insert(injection.bind_as.clone(), resolved);
    }
    Ok(injected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_provide_and_require() {
        let registry = ProviderRegistry::new();
        registry.provide("width", 80u16).persist();
        let values = registry.require("width");
        assert_eq!(values.len(), 1);
        assert_eq!(*values[0].clone().downcast::<u16>().unwrap(), 80);
    }

    #[test]
    fn test_missing_key_yields_nothing() {
        let registry = ProviderRegistry::new();
        assert!(registry.require("nothing").is_empty());
    }

    #[test]
    fn test_getter_invoked_fresh_each_resolution() {
        let registry = ProviderRegistry::new();
        let counter = Arc::new(AtomicU32::new(0));
        let shared = counter.clone();
        registry
            .provide_getter("tick", move || shared.fetch_add(1, Ordering::SeqCst))
            .persist();

        let first = registry.first("tick").unwrap();
        let second = registry.first("tick").unwrap();
        assert_eq!(*first.downcast::<u32>().unwrap(), 0);
        assert_eq!(*second.downcast::<u32>().unwrap(), 1);
    }

    #[test]
    fn test_scope_exit_removes_value() {
        let registry = ProviderRegistry::new();
        {
            let _guard = registry.provide("k", "A".to_owned());
            assert_eq!(registry.require("k").len(), 1);
        }
        assert!(registry.require("k").is_empty());
    }

    #[test]
    fn test_nested_scope_restores_outer_value() {
        let registry = ProviderRegistry::new();
        let _outer = registry.provide("k", "A".to_owned());
        {
            let _inner = registry.provide("k", "B".to_owned());
            let current = registry.first("k").unwrap();
            assert_eq!(*current.downcast::<String>().unwrap(), "B");
        }
        // B's exit must not remove A
        let current = registry.first("k").unwrap();
        assert_eq!(*current.downcast::<String>().unwrap(), "A");
    }

    #[test]
    fn test_stale_guard_does_not_clobber_reprovision() {
        let registry = ProviderRegistry::new();
        let first = registry.provide("k", "A".to_owned());
        let _second = registry.provide("k", "B".to_owned());
        // the first guard's value is no longer current; dropping it must
        // leave the re-provision in place
        drop(first);
        let current = registry.first("k").unwrap();
        assert_eq!(*current.downcast::<String>().unwrap(), "B");
    }

    #[test]
    fn test_chained_children_contribute_values() {
        let root = ProviderRegistry::new();
        let child = ProviderRegistry::new();
        root.provide("k", "root".to_owned()).persist();
        child.provide("k", "child".to_owned()).persist();
        root.chain(child);

        let values: Vec<String> = root
            .require("k")
            .into_iter()
            .map(|value| (*value.downcast::<String>().unwrap()).clone())
            .collect();
        assert_eq!(values, vec!["root".to_owned(), "child".to_owned()]);
    }

    #[test]
    fn test_build_injected_first_value() {
        let registry = ProviderRegistry::new();
        registry.provide("members", vec!["a".to_owned()]).persist();
        let injections = vec![require("members").bind_as("names")];
        let injected = build_injected(&injections, |key| registry.require(key)).unwrap();
        let names = injected.get::<Vec<String>>("names").unwrap();
        assert_eq!(*names, vec!["a".to_owned()]);
    }

    #[test]
    fn test_build_injected_collect_gathers_all() {
        let root = ProviderRegistry::new();
        let child = ProviderRegistry::new();
        root.provide("n", 1u8).persist();
        child.provide("n", 2u8).persist();
        root.chain(child);

        let injections = vec![require("n").collect()];
        let injected = build_injected(&injections, |key| root.require(key)).unwrap();
        let values: Vec<u8> = injected.all::<u8>("n").iter().map(|v| **v).collect();
        assert_eq!(values, vec![1, 2]);
    }

    #[test]
    fn test_build_injected_collect_tolerates_empty() {
        let injections = vec![require("n").collect()];
        let injected = build_injected(&injections, |_| Vec::new()).unwrap();
        assert!(injected.all::<u8>("n").is_empty());
    }

    #[test]
    fn test_build_injected_default_value() {
        let injections = vec![require("output_width").default_value(80u16)];
        let injected = build_injected(&injections, |_| Vec::new()).unwrap();
        assert_eq!(*injected.get::<u16>("output_width").unwrap(), 80);
    }

    #[test]
    fn test_build_injected_missing_key_fails() {
        let injections = vec![require("missing").bind_as("param")];
        let err = build_injected(&injections, |_| Vec::new()).unwrap_err();
        assert_eq!(
            err.code.as_deref(),
            Some(crate::error::code::MISSING_DEPENDENCY)
        );
        assert!(err.to_string().contains("missing"));
        assert!(err.to_string().contains("param"));
    }
}
