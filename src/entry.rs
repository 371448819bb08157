//! Published entries: one per name in a registry.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::activity::{Activity, ValidityInterval};
use crate::identity::IdentityToken;
use crate::object::ObjectHandle;
use crate::policy::PublicationPolicy;

/// Metadata key holding default draw options.
pub const DRAW_OPTIONS_KEY: &str = "drawOptions";

/// Metadata key holding display hints.
pub const DISPLAY_HINTS_KEY: &str = "displayHints";

/// A published object together with its bookkeeping.
#[derive(Debug)]
pub struct PublishedEntry {
    handle: ObjectHandle,
    policy: PublicationPolicy,
    metadata: HashMap<String, String>,
    task_name: String,
    task_class: String,
    detector_name: String,
    activity: Activity,
    validity: ValidityInterval,
    published_at: DateTime<Utc>,
}

impl PublishedEntry {
    pub(crate) fn new(
        handle: ObjectHandle,
        policy: PublicationPolicy,
        task_name: &str,
        task_class: &str,
        detector_name: &str,
        activity: Activity,
    ) -> Self {
        Self {
            handle,
            policy,
            metadata: HashMap::new(),
            task_name: task_name.to_string(),
            task_class: task_class.to_string(),
            detector_name: detector_name.to_string(),
            activity,
            validity: ValidityInterval::unset(),
            published_at: Utc::now(),
        }
    }

    /// Name the entry is published under.
    #[must_use]
    pub fn name(&self) -> &str {
        self.handle.name()
    }

    #[must_use]
    pub fn class_name(&self) -> &str {
        self.handle.class_name()
    }

    /// Identity token of the referent.
    #[must_use]
    pub const fn identity(&self) -> IdentityToken {
        self.handle.identity()
    }

    #[must_use]
    pub const fn handle(&self) -> &ObjectHandle {
        &self.handle
    }

    #[must_use]
    pub const fn policy(&self) -> PublicationPolicy {
        self.policy
    }

    /// All metadata pairs.
    #[must_use]
    pub const fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    /// Looks up one metadata value.
    #[must_use]
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn draw_options(&self) -> Option<&str> {
        self.metadata_value(DRAW_OPTIONS_KEY)
    }

    #[must_use]
    pub fn display_hints(&self) -> Option<&str> {
        self.metadata_value(DISPLAY_HINTS_KEY)
    }

    pub(crate) fn upsert_metadata(&mut self, key: &str, value: &str) {
        self.metadata.insert(key.to_string(), value.to_string());
    }

    #[must_use]
    pub fn task_name(&self) -> &str {
        &self.task_name
    }

    #[must_use]
    pub fn task_class(&self) -> &str {
        &self.task_class
    }

    #[must_use]
    pub fn detector_name(&self) -> &str {
        &self.detector_name
    }

    #[must_use]
    pub const fn activity(&self) -> &Activity {
        &self.activity
    }

    pub(crate) fn set_activity(&mut self, activity: Activity) {
        self.activity = activity;
    }

    #[must_use]
    pub const fn validity(&self) -> ValidityInterval {
        self.validity
    }

    pub(crate) fn set_validity(&mut self, validity: ValidityInterval) {
        self.validity = validity;
    }

    pub(crate) fn update_validity(&mut self, time: u64) {
        self.validity.update(time);
    }

    /// When the entry was created.
    #[must_use]
    pub const fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::object::Publishable;

    struct Label(&'static str);

    impl Publishable for Label {
        fn name(&self) -> &str {
            self.0
        }
    }

    fn entry(name: &'static str) -> PublishedEntry {
        PublishedEntry::new(
            ObjectHandle::owned(Label(name)),
            PublicationPolicy::Forever,
            "task",
            "TaskClass",
            "TST",
            Activity::default(),
        )
    }

    #[test]
    fn test_metadata_last_write_wins() {
        let mut e = entry("histo");
        e.upsert_metadata("k", "v1");
        e.upsert_metadata("k", "v2");
        assert_eq!(e.metadata().len(), 1);
        assert_eq!(e.metadata_value("k"), Some("v2"));
    }

    #[test]
    fn test_reserved_keys() {
        let mut e = entry("histo");
        assert_eq!(e.draw_options(), None);
        assert_eq!(e.display_hints(), None);
        e.upsert_metadata(DRAW_OPTIONS_KEY, "colz");
        e.upsert_metadata(DISPLAY_HINTS_KEY, "logx");
        assert_eq!(e.draw_options(), Some("colz"));
        assert_eq!(e.display_hints(), Some("logx"));
    }

    #[test]
    fn test_entry_records_task_context() {
        let e = entry("content");
        assert_eq!(e.name(), "content");
        assert_eq!(e.task_name(), "task");
        assert_eq!(e.task_class(), "TaskClass");
        assert_eq!(e.detector_name(), "TST");
        assert!(!e.validity().is_valid());
    }

    #[test]
    fn test_borrowed_entry_identity() {
        let obj = Arc::new(Label("content"));
        let e = PublishedEntry::new(
            ObjectHandle::borrowed(&obj),
            PublicationPolicy::Once,
            "task",
            "",
            "TST",
            Activity::default(),
        );
        assert_eq!(e.identity(), IdentityToken::of(&obj));
        assert_eq!(e.policy(), PublicationPolicy::Once);
    }
}
