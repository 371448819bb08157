//! Read-only views over published entries for the export layer.
//!
//! A `SnapshotView` borrows the registry, so it cannot outlive it and the
//! registry cannot change while a view is held. Dropping a view touches
//! neither the registry nor the referents.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::activity::{Activity, ValidityInterval};
use crate::entry::PublishedEntry;
use crate::policy::PublicationPolicy;

/// Non-owning enumeration of published entries, in publication order.
#[derive(Debug, Clone)]
pub struct SnapshotView<'a> {
    entries: Vec<&'a PublishedEntry>,
}

impl<'a> SnapshotView<'a> {
    pub(crate) fn new(entries: Vec<&'a PublishedEntry>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a PublishedEntry> + '_ {
        self.entries.iter().copied()
    }

    /// Finds an entry by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&'a PublishedEntry> {
        self.entries.iter().copied().find(|e| e.name() == name)
    }

    /// Serializable export records, one per entry.
    ///
    /// Borrowed referents that were dropped without being unpublished are
    /// still listed, with `alive` set to false.
    #[must_use]
    pub fn summaries(&self) -> Vec<EntrySummary> {
        self.entries
            .iter()
            .map(|e| {
                let alive = e.handle().is_alive();
                if !alive {
                    warn!(object = e.name(), "published object was dropped while still registered");
                }
                EntrySummary {
                    name: e.name().to_string(),
                    class_name: e.class_name().to_string(),
                    policy: e.policy(),
                    owned: e.handle().is_owned(),
                    alive,
                    task_name: e.task_name().to_string(),
                    detector_name: e.detector_name().to_string(),
                    metadata: e
                        .metadata()
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect(),
                    activity: e.activity().clone(),
                    validity: e.validity(),
                    published_at: e.published_at(),
                }
            })
            .collect()
    }
}

impl<'a> IntoIterator for SnapshotView<'a> {
    type Item = &'a PublishedEntry;
    type IntoIter = std::vec::IntoIter<&'a PublishedEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Export record for one published entry.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntrySummary {
    pub name: String,
    pub class_name: String,
    pub policy: PublicationPolicy,
    pub owned: bool,
    pub alive: bool,
    pub task_name: String,
    pub detector_name: String,
    /// Sorted by key so exports are deterministic.
    pub metadata: BTreeMap<String, String>,
    pub activity: Activity,
    pub validity: ValidityInterval,
    pub published_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tracing_test::traced_test;

    use super::*;
    use crate::object::{ObjectHandle, Publishable};
    use crate::registry::PublicationRegistry;

    struct Histo(&'static str);

    impl Publishable for Histo {
        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_view_does_not_own() {
        let mut registry = PublicationRegistry::default();
        let content = Arc::new(Histo("content"));
        registry
            .start_publishing(Some(ObjectHandle::borrowed(&content)), PublicationPolicy::Forever)
            .unwrap();
        registry
            .start_publishing(Some(ObjectHandle::owned(Histo("histo"))), PublicationPolicy::Forever)
            .unwrap();

        let view = registry.snapshot_view();
        assert_eq!(view.len(), 2);
        assert!(view.find("content").is_some());
        assert!(view.find("histo").is_some());
        assert_eq!(Arc::strong_count(&content), 1);
        drop(view);

        assert!(registry.get_monitor_object("content").is_ok());
        assert!(registry.get_monitor_object("histo").is_ok());
    }

    #[test]
    fn test_view_preserves_publication_order() {
        let mut registry = PublicationRegistry::default();
        for name in ["c", "a", "b"] {
            registry
                .start_publishing(Some(ObjectHandle::owned(Histo(name))), PublicationPolicy::Once)
                .unwrap();
        }
        let names: Vec<&str> = registry.snapshot_view().into_iter().map(PublishedEntry::name).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_empty_view() {
        let registry = PublicationRegistry::default();
        let view = registry.snapshot_view();
        assert!(view.is_empty());
        assert!(view.summaries().is_empty());
    }

    #[test]
    fn test_summaries_serialize() {
        let mut registry = PublicationRegistry::default();
        registry
            .start_publishing(Some(ObjectHandle::owned(Histo("histo"))), PublicationPolicy::ThroughStop)
            .unwrap();
        registry.set_display_hint("histo", "logy").unwrap();
        registry.set_default_draw_options("histo", "colz").unwrap();

        let summaries = registry.snapshot_view().summaries();
        assert_eq!(summaries.len(), 1);
        let summary = &summaries[0];
        assert!(summary.owned);
        assert!(summary.alive);
        assert_eq!(summary.policy, PublicationPolicy::ThroughStop);

        let json = serde_json::to_value(summary).unwrap();
        assert_eq!(json["name"], "histo");
        assert_eq!(json["policy"], "through_stop");
        assert_eq!(json["metadata"]["drawOptions"], "colz");
        assert_eq!(json["metadata"]["displayHints"], "logy");
    }

    #[test]
    #[traced_test]
    fn test_summaries_flag_dropped_referent() {
        let mut registry = PublicationRegistry::default();
        let gone = Arc::new(Histo("gone"));
        registry
            .start_publishing(Some(ObjectHandle::borrowed(&gone)), PublicationPolicy::Forever)
            .unwrap();
        drop(gone);

        let summaries = registry.snapshot_view().summaries();
        assert!(!summaries[0].alive);
        assert!(logs_contain("dropped while still registered"));
    }
}
