//! Publishable objects and the handles the registry keeps for them.
//!
//! The registry does not care what kind of artifact it publishes. Anything
//! that can report a stable name can be published, either handed over
//! (`Owned`) or referenced while the producer keeps it alive (`Borrowed`).

use std::fmt;
use std::sync::{Arc, Weak};

use crate::identity::IdentityToken;

/// Capability required from anything that can be published.
pub trait Publishable: Send + Sync {
    /// Externally visible name, used as the registry key.
    fn name(&self) -> &str;

    /// Kind of artifact, exported alongside the object.
    fn class_name(&self) -> &str {
        "unknown"
    }
}

/// Who keeps the referent alive.
pub enum Ownership {
    /// The registry holds the only strong reference; removal releases it.
    Owned(Arc<dyn Publishable>),
    /// The producer owns the referent; the registry only observes it.
    Borrowed(Weak<dyn Publishable>),
}

impl Ownership {
    /// Returns true if the registry owns the referent.
    #[must_use]
    pub const fn is_owned(&self) -> bool {
        matches!(self, Self::Owned(_))
    }
}

/// Handle to a published referent.
///
/// Name, class and identity are read from the referent exactly once, when
/// the handle is built. Nothing stored here needs the referent to still
/// exist.
pub struct ObjectHandle {
    identity: IdentityToken,
    name: String,
    class_name: String,
    ownership: Ownership,
}

impl ObjectHandle {
    /// Hands `object` over to the registry.
    #[must_use]
    pub fn owned<T: Publishable + 'static>(object: T) -> Self {
        let strong: Arc<dyn Publishable> = Arc::new(object);
        Self::capture(&strong, Ownership::Owned(Arc::clone(&strong)))
    }

    /// References an object the caller keeps alive.
    #[must_use]
    pub fn borrowed<T: Publishable + 'static>(object: &Arc<T>) -> Self {
        let strong: Arc<dyn Publishable> = Arc::clone(object) as Arc<dyn Publishable>;
        let weak = Arc::downgrade(&strong);
        Self::capture(&strong, Ownership::Borrowed(weak))
    }

    fn capture(strong: &Arc<dyn Publishable>, ownership: Ownership) -> Self {
        Self {
            identity: IdentityToken::of(strong),
            name: strong.name().to_string(),
            class_name: strong.class_name().to_string(),
            ownership,
        }
    }

    /// Identity captured at construction.
    #[must_use]
    pub const fn identity(&self) -> IdentityToken {
        self.identity
    }

    /// Name captured at construction.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Class name captured at construction.
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Ownership variant.
    #[must_use]
    pub const fn ownership(&self) -> &Ownership {
        &self.ownership
    }

    /// Returns true if the registry owns the referent.
    #[must_use]
    pub const fn is_owned(&self) -> bool {
        self.ownership.is_owned()
    }

    /// Returns true if the referent still exists.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        match &self.ownership {
            Ownership::Owned(_) => true,
            Ownership::Borrowed(weak) => weak.strong_count() > 0,
        }
    }

    /// Temporary access to the referent; `None` once a borrowed referent is gone.
    #[must_use]
    pub fn object(&self) -> Option<Arc<dyn Publishable>> {
        match &self.ownership {
            Ownership::Owned(strong) => Some(Arc::clone(strong)),
            Ownership::Borrowed(weak) => weak.upgrade(),
        }
    }
}

impl fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectHandle")
            .field("identity", &self.identity)
            .field("name", &self.name)
            .field("class_name", &self.class_name)
            .field("owned", &self.is_owned())
            .field("alive", &self.is_alive())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Histo {
        name: String,
    }

    impl Publishable for Histo {
        fn name(&self) -> &str {
            &self.name
        }

        fn class_name(&self) -> &str {
            "TH1F"
        }
    }

    struct Label(&'static str);

    impl Publishable for Label {
        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_borrowed_handle_captures_identity() {
        let h = Arc::new(Histo { name: "histo".to_string() });
        let handle = ObjectHandle::borrowed(&h);
        assert_eq!(handle.identity(), IdentityToken::of(&h));
        assert_eq!(handle.name(), "histo");
        assert_eq!(handle.class_name(), "TH1F");
        assert!(!handle.is_owned());
    }

    #[test]
    fn test_borrowed_handle_outlives_referent() {
        let h = Arc::new(Histo { name: "histo".to_string() });
        let handle = ObjectHandle::borrowed(&h);
        assert!(handle.is_alive());
        drop(h);
        assert!(!handle.is_alive());
        assert!(handle.object().is_none());
        assert_eq!(handle.name(), "histo");
    }

    #[test]
    fn test_borrowed_handle_does_not_extend_lifetime() {
        let h = Arc::new(Label("content"));
        let _handle = ObjectHandle::borrowed(&h);
        assert_eq!(Arc::strong_count(&h), 1);
    }

    #[test]
    fn test_owned_handle_keeps_referent() {
        let handle = ObjectHandle::owned(Label("content"));
        assert!(handle.is_owned());
        assert!(handle.is_alive());
        assert_eq!(handle.class_name(), "unknown");
        let obj = handle.object().unwrap();
        assert_eq!(obj.name(), "content");
    }
}
