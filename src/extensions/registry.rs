//! Applied-extension set.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::Extension;

/// Either a builtin name or an extension value.
#[derive(Clone)]
pub enum ExtensionRef {
    Builtin(String),
    Custom(Arc<dyn Extension>),
}

impl fmt::Debug for ExtensionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(name) => f.debug_tuple("Builtin").field(name).finish(),
            Self::Custom(ext) => f.debug_tuple("Custom").field(&ext.name()).finish(),
        }
    }
}

impl From<&str> for ExtensionRef {
    fn from(name: &str) -> Self {
        Self::Builtin(name.to_string())
    }
}

impl From<String> for ExtensionRef {
    fn from(name: String) -> Self {
        Self::Builtin(name)
    }
}

impl From<Arc<dyn Extension>> for ExtensionRef {
    fn from(ext: Arc<dyn Extension>) -> Self {
        Self::Custom(ext)
    }
}

impl<T: Extension> From<Arc<T>> for ExtensionRef {
    fn from(ext: Arc<T>) -> Self {
        Self::Custom(ext)
    }
}

/// Extensions applied to a server, in registration order.
///
/// Connections take a snapshot at accept time, so later registrations only
/// reach connections accepted afterwards.
#[derive(Default)]
pub struct ExtensionRegistry {
    applied: Vec<Arc<dyn Extension>>,
    /// Names claimed by an `apply` still in progress.
    pending: HashSet<&'static str>,
    snapshot: Arc<[Arc<dyn Extension>]>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.applied.iter().any(|ext| ext.name() == name)
    }

    /// Claim `name` ahead of applying it. Returns `false` if it is already
    /// applied or claimed.
    pub fn reserve(&mut self, name: &'static str) -> bool {
        !self.contains(name) && self.pending.insert(name)
    }

    /// Drop a claim whose `apply` failed.
    pub fn release(&mut self, name: &str) {
        self.pending.remove(name);
    }

    /// Record an applied extension. Returns `false` if its name is taken.
    pub fn insert(&mut self, ext: Arc<dyn Extension>) -> bool {
        self.pending.remove(ext.name());
        if self.contains(ext.name()) {
            return false;
        }
        self.applied.push(ext);
        self.snapshot = self.applied.iter().cloned().collect();
        true
    }

    /// Extensions to attach to a new connection.
    pub fn snapshot(&self) -> Arc<[Arc<dyn Extension>]> {
        Arc::clone(&self.snapshot)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.applied.iter().map(|ext| ext.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.applied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerResult;
    use crate::extensions::{Context, Event, Nickname, Ping};

    struct Anonymous;

    impl Extension for Anonymous {
        fn handle(&self, _: &mut Context<'_>, _: &Event<'_>) -> HandlerResult {
            Ok(())
        }
    }

    #[test]
    fn insert_dedupes_by_name_and_keeps_order() {
        let mut registry = ExtensionRegistry::new();
        assert!(registry.insert(Arc::new(Ping)));
        assert!(registry.insert(Arc::new(Nickname)));
        assert!(!registry.insert(Arc::new(Ping)));
        assert!(registry.insert(Arc::new(Anonymous)));
        assert!(!registry.insert(Arc::new(Anonymous)));

        assert_eq!(registry.len(), 3);
        assert_eq!(&registry.names()[..2], &["ping", "nickname"]);
    }

    #[test]
    fn snapshot_is_frozen_at_take_time() {
        let mut registry = ExtensionRegistry::new();
        registry.insert(Arc::new(Ping));
        let before = registry.snapshot();
        registry.insert(Arc::new(Nickname));
        assert_eq!(before.len(), 1);
        assert_eq!(registry.snapshot().len(), 2);
    }

    #[test]
    fn reserved_name_is_taken_until_released() {
        let mut registry = ExtensionRegistry::new();
        assert!(registry.reserve("ping"));
        assert!(!registry.reserve("ping"));

        registry.release("ping");
        assert!(registry.reserve("ping"));
        assert!(registry.insert(Arc::new(Ping)));
        assert!(!registry.reserve("ping"));
    }

    #[test]
    fn values_of_one_type_share_an_identity() {
        struct Named(&'static str);

        impl Extension for Named {
            fn name(&self) -> &'static str {
                self.0
            }

            fn handle(&self, _: &mut Context<'_>, _: &Event<'_>) -> HandlerResult {
                Ok(())
            }
        }

        let mut registry = ExtensionRegistry::new();
        assert!(registry.insert(Arc::new(Anonymous)));
        assert!(!registry.insert(Arc::new(Anonymous)));
        assert!(registry.insert(Arc::new(Named("first"))));
        assert!(registry.insert(Arc::new(Named("second"))));
        assert_eq!(registry.len(), 3);
    }
}
