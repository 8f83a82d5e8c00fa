//! Request-scoped authorization context.
//!
//! A [`RequestContext`] is created when a request (or nested security
//! transaction) begins and discarded when it ends. It is always passed as an
//! explicit parameter; there is no thread-local or global current-request
//! state anywhere in Cardloom.

use cardloom_core::UserId;
use std::cell::Cell;

/// Authenticated identity driving all authorization checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    /// The user this principal authenticates.
    pub user: UserId,
    /// Administrators satisfy every condition tree unconditionally.
    pub is_admin: bool,
}

/// Per-request scratch data for authorization.
///
/// `in_security_tx` guards against infinite recursion: a condition predicate
/// may load another protected resource, which would trigger another check.
/// While the flag is set, nested evaluations are bypassed. The flag is a
/// plain non-blocking cell, never a lock, so nested gate calls cannot
/// deadlock.
#[derive(Debug)]
pub struct RequestContext {
    principal: Option<Principal>,
    in_security_tx: Cell<bool>,
}

impl RequestContext {
    /// Context for an anonymous (unauthenticated) request.
    pub fn anonymous() -> Self {
        Self {
            principal: None,
            in_security_tx: Cell::new(false),
        }
    }

    /// Context for a regular authenticated user.
    pub fn for_user(user: UserId) -> Self {
        Self {
            principal: Some(Principal {
                user,
                is_admin: false,
            }),
            in_security_tx: Cell::new(false),
        }
    }

    /// Context for an administrator.
    pub fn for_admin(user: UserId) -> Self {
        Self {
            principal: Some(Principal {
                user,
                is_admin: true,
            }),
            in_security_tx: Cell::new(false),
        }
    }

    /// The current principal, if any.
    pub fn principal(&self) -> Option<Principal> {
        self.principal
    }

    /// Whether the current principal is an administrator.
    pub fn is_admin(&self) -> bool {
        self.principal.map(|p| p.is_admin).unwrap_or(false)
    }

    /// Whether an authorization check is already running on this context.
    pub fn in_security_tx(&self) -> bool {
        self.in_security_tx.get()
    }

    /// Enter a security transaction, returning a guard that restores the
    /// previous flag value when dropped, including on unwinding: the flag
    /// equals its pre-check value after every check even if a predicate
    /// panics.
    pub fn enter_security_tx(&self) -> SecurityTxGuard<'_> {
        let previous = self.in_security_tx.replace(true);
        SecurityTxGuard {
            flag: &self.in_security_tx,
            previous,
        }
    }
}

/// RAII guard restoring the re-entrancy flag on drop.
#[derive(Debug)]
pub struct SecurityTxGuard<'a> {
    flag: &'a Cell<bool>,
    previous: bool,
}

impl Drop for SecurityTxGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}
