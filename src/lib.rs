//! # mopub - Publication registry for monitor objects
//!
//! Every monitoring task keeps one `PublicationRegistry`: the set of
//! artifacts (histograms, summary objects, ...) it wants exported, and the
//! rules for when each one stops being exported.
//!
//! ## Core Concepts
//!
//! - **Publishable**: anything with a stable name can be published
//! - **ObjectHandle**: the registry's handle on a referent, either owned or borrowed
//! - **IdentityToken**: compares referents by address without dereferencing them
//! - **PublicationPolicy**: `Once`, `ThroughStop` or `Forever`; decides which sweep retires an entry
//! - **SnapshotView**: read-only, non-owning view handed to the export layer
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use mopub::{
//!     IdentityToken, LifecycleEvent, ObjectHandle, Publishable, PublicationPolicy,
//!     PublicationRegistry, RegistryConfig,
//! };
//!
//! struct Histo {
//!     name: String,
//! }
//!
//! impl Publishable for Histo {
//!     fn name(&self) -> &str {
//!         &self.name
//!     }
//! }
//!
//! let mut registry = PublicationRegistry::new(RegistryConfig::for_task("RawDataQcTask"))?;
//!
//! // The task keeps this one alive itself.
//! let inputs = Arc::new(Histo { name: "inputs".to_string() });
//! registry.start_publishing(Some(ObjectHandle::borrowed(&inputs)), PublicationPolicy::ThroughStop)?;
//!
//! // This one is handed over to the registry.
//! registry.start_publishing(
//!     Some(ObjectHandle::owned(Histo { name: "ratios".to_string() })),
//!     PublicationPolicy::Once,
//! )?;
//! registry.set_display_hint("ratios", "logy")?;
//!
//! assert_eq!(registry.apply_lifecycle(LifecycleEvent::EndOfCycle), 1);
//!
//! // Unpublishing by identity works even after the referent is gone.
//! let token = IdentityToken::of(&inputs);
//! drop(inputs);
//! registry.stop_publishing_object(Some(token))?;
//! assert_eq!(registry.number_published_objects(), 0);
//! # Ok::<(), mopub::RegistryError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod activity;
pub mod config;
pub mod entry;
pub mod error;
pub mod identity;
pub mod object;
pub mod policy;
pub mod registry;
pub mod snapshot;

// Re-export primary types at crate root for convenience
pub use activity::{Activity, ValidityInterval, ValidityTime};
pub use config::RegistryConfig;
pub use entry::{PublishedEntry, DISPLAY_HINTS_KEY, DRAW_OPTIONS_KEY};
pub use error::{ConfigError, ObjectKey, RegistryError, RegistryResult};
pub use identity::IdentityToken;
pub use object::{ObjectHandle, Ownership, Publishable};
pub use policy::{LifecycleEvent, PublicationPolicy};
pub use registry::PublicationRegistry;
pub use snapshot::{EntrySummary, SnapshotView};
