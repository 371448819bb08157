//! Identity tokens for published objects.
//!
//! A token is the address of the referent's allocation, captured once when
//! the handle is built. It is only ever compared and hashed, never turned
//! back into a pointer, so a token stays valid to use after the referent it
//! was taken from has been dropped.

use std::fmt;
use std::sync::Arc;

/// Opaque, copyable identity of a published object.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use mopub::IdentityToken;
///
/// let a = Arc::new(1u32);
/// let b = Arc::new(1u32);
/// assert_eq!(IdentityToken::of(&a), IdentityToken::of(&Arc::clone(&a)));
/// assert_ne!(IdentityToken::of(&a), IdentityToken::of(&b));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityToken(usize);

impl IdentityToken {
    /// Identity of the allocation behind `object`.
    #[must_use]
    pub fn of<T: ?Sized>(object: &Arc<T>) -> Self {
        Self(Arc::as_ptr(object).cast::<()>() as usize)
    }

    /// Wraps a caller-supplied stable id.
    #[must_use]
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    /// Returns the raw token value.
    #[must_use]
    pub const fn as_raw(&self) -> usize {
        self.0
    }
}

impl fmt::Display for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_survives_drop() {
        let obj = Arc::new(String::from("content"));
        let token = IdentityToken::of(&obj);
        drop(obj);
        assert_eq!(token, IdentityToken::from_raw(token.as_raw()));
    }

    #[test]
    fn test_token_ignores_unsizing() {
        let obj: Arc<String> = Arc::new(String::from("histo"));
        let erased: Arc<dyn fmt::Debug + Send + Sync> = obj.clone();
        assert_eq!(IdentityToken::of(&obj), IdentityToken::of(&erased));
    }

    #[test]
    fn test_token_display_is_hex() {
        let token = IdentityToken::from_raw(255);
        assert_eq!(format!("{token}"), "0xff");
    }
}
