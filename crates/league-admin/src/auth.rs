//! The authentication signal that gates every write.
//!
//! Identity, sessions and credentials live outside this crate. The admin
//! service only asks one question before a write: is the caller signed
//! in?

use std::sync::atomic::{AtomicBool, Ordering};

/// Answers whether the current caller may write.
pub trait Authenticator: Send + Sync {
    /// Whether the caller is authenticated.
    fn is_authenticated(&self) -> bool;
}

/// A fixed answer. Used by the CLI, where the operator has database
/// credentials, and in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticAuth(pub bool);

impl Authenticator for StaticAuth {
    fn is_authenticated(&self) -> bool {
        self.0
    }
}

/// A signal that can be flipped as the session signs in and out.
#[derive(Debug, Default)]
pub struct SessionAuth {
    signed_in: AtomicBool,
}

impl SessionAuth {
    /// Start signed out.
    pub const fn new() -> Self {
        Self {
            signed_in: AtomicBool::new(false),
        }
    }

    /// Record a sign-in or sign-out.
    pub fn set_signed_in(&self, signed_in: bool) {
        self.signed_in.store(signed_in, Ordering::Release);
        tracing::info!(signed_in, "Session authentication changed");
    }
}

impl Authenticator for SessionAuth {
    fn is_authenticated(&self) -> bool {
        self.signed_in.load(Ordering::Acquire)
    }
}
