//! Source-labelled property collection.
//!
//! Every layer that contributes configuration records its properties here,
//! so diagnostics can answer "which source set this key" even after layers
//! have been merged.

use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use serde::Serialize;

/// One property value together with the source layer that supplied it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyWithSource {
    pub source: String,
    pub key: String,
    pub value: String,
}

/// Append-only record of every property each source contributed.
///
/// Writers serialize on a mutex, copy the current snapshot, append, and
/// publish the new one. Readers load the current snapshot without taking
/// any lock, so a reader never blocks a writer and vice versa.
#[derive(Debug, Default)]
pub struct PropertySourceCollector {
    snapshot: ArcSwap<Vec<PropertyWithSource>>,
    writer: Mutex<()>,
}

impl PropertySourceCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every `(key, value)` pair under the given source label.
    ///
    /// Pairs are appended in iteration order; nothing is deduplicated. A
    /// key recorded by two sources appears twice, once per source.
    pub fn add_properties<I>(&self, source: &str, pairs: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let _guard = self.writer.lock().expect("collector writer lock poisoned");
        let current = self.snapshot.load();
        let mut next = Vec::with_capacity(current.len());
        next.extend(current.iter().cloned());
        for (key, value) in pairs {
            next.push(PropertyWithSource {
                source: source.to_string(),
                key,
                value,
            });
        }
        self.snapshot.store(Arc::new(next));
    }

    /// Current snapshot of every recorded property, in insertion order.
    pub fn all_properties(&self) -> Arc<Vec<PropertyWithSource>> {
        self.snapshot.load_full()
    }

    /// Properties grouped by source, preserving first-seen source order
    /// and insertion order within each source.
    pub fn properties_by_source(&self) -> Vec<(String, Vec<PropertyWithSource>)> {
        let snapshot = self.snapshot.load();
        let mut groups: Vec<(String, Vec<PropertyWithSource>)> = Vec::new();
        for prop in snapshot.iter() {
            match groups.iter_mut().find(|(source, _)| *source == prop.source) {
                Some((_, props)) => props.push(prop.clone()),
                None => groups.push((prop.source.clone(), vec![prop.clone()])),
            }
        }
        groups
    }

    pub fn len(&self) -> usize {
        self.snapshot.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.load().is_empty()
    }
}
