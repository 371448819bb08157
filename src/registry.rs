//! The per-task publication registry.
//!
//! Entries are keyed by the name captured from the referent at publish
//! time. A secondary index maps identity tokens to names so that objects
//! can be unpublished by identity without touching the referent, which may
//! already be gone.
//!
//! Mutating operations take `&mut self`; a task that shares its registry
//! across threads wraps the whole registry in a mutex.

use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::activity::{Activity, ValidityInterval, ValidityTime};
use crate::config::RegistryConfig;
use crate::entry::{PublishedEntry, DISPLAY_HINTS_KEY, DRAW_OPTIONS_KEY};
use crate::error::{ObjectKey, RegistryError, RegistryResult};
use crate::identity::IdentityToken;
use crate::object::ObjectHandle;
use crate::policy::{LifecycleEvent, PublicationPolicy};
use crate::snapshot::SnapshotView;

/// Name-unique registry of objects a monitoring task publishes.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use mopub::{ObjectHandle, Publishable, PublicationPolicy, PublicationRegistry};
///
/// struct Histo(String);
///
/// impl Publishable for Histo {
///     fn name(&self) -> &str {
///         &self.0
///     }
/// }
///
/// let mut registry = PublicationRegistry::default();
/// let histo = Arc::new(Histo("hits".to_string()));
///
/// registry.start_publishing(Some(ObjectHandle::borrowed(&histo)), PublicationPolicy::Once)?;
/// registry.set_default_draw_options("hits", "colz")?;
/// assert_eq!(registry.snapshot_view().len(), 1);
///
/// // End of cycle: objects published once are retired.
/// registry.stop_publishing_policy(PublicationPolicy::Once);
/// assert!(!registry.is_being_published("hits"));
/// # Ok::<(), mopub::RegistryError>(())
/// ```
#[derive(Debug)]
pub struct PublicationRegistry {
    config: RegistryConfig,
    entries: IndexMap<String, PublishedEntry>,
    by_identity: HashMap<IdentityToken, String>,
    activity: Activity,
}

impl Default for PublicationRegistry {
    fn default() -> Self {
        Self::with_valid_config(RegistryConfig::default())
    }
}

impl PublicationRegistry {
    /// Creates an empty registry for the task described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Config` if `config` fails validation.
    pub fn new(config: RegistryConfig) -> RegistryResult<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: RegistryConfig) -> Self {
        debug!(
            task = %config.task_name,
            detector = %config.detector_name,
            parallel_task_id = config.parallel_task_id,
            "creating publication registry"
        );
        Self {
            config,
            entries: IndexMap::new(),
            by_identity: HashMap::new(),
            activity: Activity::default(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &RegistryConfig {
        &self.config
    }

    #[must_use]
    pub fn task_name(&self) -> &str {
        &self.config.task_name
    }

    #[must_use]
    pub fn task_class(&self) -> &str {
        &self.config.task_class
    }

    #[must_use]
    pub fn detector_name(&self) -> &str {
        &self.config.detector_name
    }

    #[must_use]
    pub const fn parallel_task_id(&self) -> u32 {
        self.config.parallel_task_id
    }

    /// Starts publishing the object behind `handle` under its own name.
    ///
    /// An existing entry under the same name is replaced by a fresh one; its
    /// metadata is not carried over. An owned referent of the replaced entry
    /// is released, a borrowed one is left alone. A referent already
    /// published under a different name is moved to its current name.
    /// `None` is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::CapacityExceeded` if a new name would grow the
    /// registry past the configured `max_objects`. Replacements never fail.
    pub fn start_publishing(
        &mut self,
        handle: Option<ObjectHandle>,
        policy: PublicationPolicy,
    ) -> RegistryResult<()> {
        let Some(handle) = handle else {
            trace!(task = %self.config.task_name, "start_publishing called without an object");
            return Ok(());
        };

        let name = handle.name().to_string();
        let identity = handle.identity();

        let renamed_from = self
            .by_identity
            .get(&identity)
            .filter(|previous| **previous != name)
            .cloned();
        let replacing = self.entries.contains_key(&name);

        // A rename frees the slot it takes, so only genuinely new objects count.
        if !replacing && renamed_from.is_none() {
            if let Some(limit) = self.config.max_objects {
                if self.entries.len() >= limit {
                    return Err(RegistryError::CapacityExceeded { limit });
                }
            }
        }

        if let Some(previous) = renamed_from {
            debug!(
                task = %self.config.task_name,
                from = %previous,
                to = %name,
                "object re-published under a new name"
            );
            self.remove_entry(&previous);
        }

        // The old referent is released before the new entry goes in.
        if replacing {
            drop(self.remove_entry(&name));
        }

        let entry = PublishedEntry::new(
            handle,
            policy,
            &self.config.task_name,
            &self.config.task_class,
            &self.config.detector_name,
            self.activity.clone(),
        );
        self.by_identity.insert(identity, name.clone());
        debug!(
            task = %self.config.task_name,
            object = %name,
            %policy,
            owned = entry.handle().is_owned(),
            replaced = replacing,
            "start publishing"
        );
        self.entries.insert(name, entry);
        Ok(())
    }

    /// Returns true if an entry exists under `name`.
    #[must_use]
    pub fn is_being_published(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the entry published under `name`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::ObjectNotFound` if there is none.
    pub fn get_monitor_object(&self, name: &str) -> RegistryResult<&PublishedEntry> {
        self.entries
            .get(name)
            .ok_or_else(|| RegistryError::not_found(name))
    }

    /// Returns the entry at `index` in publication order.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::ObjectNotFound` if `index` is out of range.
    pub fn get_monitor_object_at(&self, index: usize) -> RegistryResult<&PublishedEntry> {
        self.entries
            .get_index(index)
            .map(|(_, entry)| entry)
            .ok_or(RegistryError::ObjectNotFound(ObjectKey::Index(index)))
    }

    /// Looks up an entry by identity without touching the referent.
    #[must_use]
    pub fn find_by_identity(&self, identity: IdentityToken) -> Option<&PublishedEntry> {
        self.by_identity
            .get(&identity)
            .and_then(|name| self.entries.get(name))
    }

    /// Stops publishing the entry under `name`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::ObjectNotFound` if there is none.
    pub fn stop_publishing(&mut self, name: &str) -> RegistryResult<()> {
        if self.remove_entry(name).is_none() {
            return Err(RegistryError::not_found(name));
        }
        debug!(task = %self.config.task_name, object = %name, "stop publishing");
        Ok(())
    }

    /// Stops publishing the entry whose referent has `identity`.
    ///
    /// Only the token is compared, so this works after the referent has been
    /// dropped. `None` is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::ObjectNotFound` if no entry has `identity`.
    pub fn stop_publishing_object(&mut self, identity: Option<IdentityToken>) -> RegistryResult<()> {
        let Some(identity) = identity else {
            trace!(task = %self.config.task_name, "stop_publishing_object called without an object");
            return Ok(());
        };
        let name = self
            .by_identity
            .get(&identity)
            .cloned()
            .ok_or(RegistryError::ObjectNotFound(ObjectKey::Identity(identity)))?;
        self.remove_entry(&name);
        debug!(task = %self.config.task_name, object = %name, %identity, "stop publishing by identity");
        Ok(())
    }

    /// Stops publishing every entry with `policy`. Returns how many were removed.
    pub fn stop_publishing_policy(&mut self, policy: PublicationPolicy) -> usize {
        let before = self.entries.len();
        let by_identity = &mut self.by_identity;
        self.entries.retain(|name, entry| {
            if entry.policy() == policy {
                if by_identity.get(&entry.identity()) == Some(name) {
                    by_identity.remove(&entry.identity());
                }
                false
            } else {
                true
            }
        });
        let removed = before - self.entries.len();
        debug!(task = %self.config.task_name, %policy, removed, "policy sweep");
        removed
    }

    /// Stops publishing everything. Returns how many entries were removed.
    pub fn stop_publishing_all(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        self.by_identity.clear();
        debug!(task = %self.config.task_name, removed, "stop publishing all");
        removed
    }

    /// Runs the sweep a lifecycle event calls for. Returns how many entries were removed.
    pub fn apply_lifecycle(&mut self, event: LifecycleEvent) -> usize {
        match event.retires() {
            Some(policy) => self.stop_publishing_policy(policy),
            None => {
                trace!(task = %self.config.task_name, ?event, "lifecycle event retires nothing");
                0
            }
        }
    }

    /// Number of published entries.
    #[must_use]
    pub fn number_published_objects(&self) -> usize {
        self.entries.len()
    }

    /// Adds or overwrites a metadata pair on the entry under `name`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::ObjectNotFound` if there is no such entry.
    pub fn add_metadata(&mut self, name: &str, key: &str, value: &str) -> RegistryResult<()> {
        let entry = self
            .entries
            .get_mut(name)
            .ok_or_else(|| RegistryError::not_found(name))?;
        entry.upsert_metadata(key, value);
        trace!(task = %self.config.task_name, object = %name, key, value, "metadata set");
        Ok(())
    }

    /// Same as [`add_metadata`](Self::add_metadata).
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::ObjectNotFound` if there is no such entry.
    pub fn add_or_update_metadata(&mut self, name: &str, key: &str, value: &str) -> RegistryResult<()> {
        self.add_metadata(name, key, value)
    }

    /// Adds metadata to the entry whose referent has `identity`. `None` is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::ObjectNotFound` if no entry has `identity`.
    pub fn add_metadata_for(
        &mut self,
        identity: Option<IdentityToken>,
        key: &str,
        value: &str,
    ) -> RegistryResult<()> {
        let Some(identity) = identity else {
            trace!(task = %self.config.task_name, key, "metadata for absent object ignored");
            return Ok(());
        };
        let name = self
            .by_identity
            .get(&identity)
            .cloned()
            .ok_or(RegistryError::ObjectNotFound(ObjectKey::Identity(identity)))?;
        self.add_metadata(&name, key, value)
    }

    /// Sets the default draw options of the entry under `name`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::ObjectNotFound` if there is no such entry.
    pub fn set_default_draw_options(&mut self, name: &str, options: &str) -> RegistryResult<()> {
        self.add_metadata(name, DRAW_OPTIONS_KEY, options)
    }

    /// Identity-addressed [`set_default_draw_options`](Self::set_default_draw_options).
    /// `None` is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::ObjectNotFound` if no entry has `identity`.
    pub fn set_default_draw_options_for(
        &mut self,
        identity: Option<IdentityToken>,
        options: &str,
    ) -> RegistryResult<()> {
        self.add_metadata_for(identity, DRAW_OPTIONS_KEY, options)
    }

    /// Sets display hints (`logx`, `gridy`, ...) of the entry under `name`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::ObjectNotFound` if there is no such entry.
    pub fn set_display_hint(&mut self, name: &str, hints: &str) -> RegistryResult<()> {
        self.add_metadata(name, DISPLAY_HINTS_KEY, hints)
    }

    /// Identity-addressed [`set_display_hint`](Self::set_display_hint). `None` is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::ObjectNotFound` if no entry has `identity`.
    pub fn set_display_hint_for(
        &mut self,
        identity: Option<IdentityToken>,
        hints: &str,
    ) -> RegistryResult<()> {
        self.add_metadata_for(identity, DISPLAY_HINTS_KEY, hints)
    }

    /// Read-only view of all entries for export.
    #[must_use]
    pub fn snapshot_view(&self) -> SnapshotView<'_> {
        SnapshotView::new(self.entries.values().collect())
    }

    #[must_use]
    pub const fn activity(&self) -> &Activity {
        &self.activity
    }

    /// Sets the current activity and stamps it onto every entry.
    /// Entries published later inherit it.
    pub fn set_activity(&mut self, activity: Activity) {
        debug!(
            task = %self.config.task_name,
            run = activity.run_number,
            entries = self.entries.len(),
            "activity set"
        );
        for entry in self.entries.values_mut() {
            entry.set_activity(activity.clone());
        }
        self.activity = activity;
    }

    /// Overwrites the validity of every entry.
    pub fn set_validity(&mut self, validity: ValidityInterval) {
        for entry in self.entries.values_mut() {
            entry.set_validity(validity);
        }
    }

    /// Extends the validity of every entry to include `time`.
    pub fn update_validity(&mut self, time: ValidityTime) {
        for entry in self.entries.values_mut() {
            entry.update_validity(time);
        }
    }

    pub fn set_moving_windows_list(&mut self, names: Vec<String>) {
        self.config.moving_windows = names;
    }

    #[must_use]
    pub fn moving_windows_list(&self) -> &[String] {
        &self.config.moving_windows
    }

    fn remove_entry(&mut self, name: &str) -> Option<PublishedEntry> {
        let entry = self.entries.shift_remove(name)?;
        if self.by_identity.get(&entry.identity()).map(String::as_str) == Some(name) {
            self.by_identity.remove(&entry.identity());
        }
        Some(entry)
    }
}
