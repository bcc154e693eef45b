//! Explicit per-unit-of-work state.
//!
//! A [`Context`] is passed by reference through every dispatch. It carries
//! the active fault plan and the request-scoped fixture memo. Nothing is
//! shared between sibling contexts. A child created with [`Context::child`]
//! sees its parent's faults, one level only, unless it sets or clears its
//! own.

use crate::fault::FaultPlan;
use crate::response::Response;
use crate::scoped_cache::{ScopeGuard, ScopedCache};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, Clone, Default)]
enum FaultSlot {
    /// Never touched: fall back to the parent.
    #[default]
    Inherit,
    /// Explicitly cleared: no faults, no fallback.
    Cleared,
    Active(Arc<FaultPlan>),
}

#[derive(Default)]
struct Frame {
    faults: RwLock<FaultSlot>,
    cache: ScopedCache<String, Response>,
    parent: Option<Arc<Frame>>,
}

impl Frame {
    fn slot(&self) -> FaultSlot {
        self.faults
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// State for one logical unit of work.
#[derive(Clone, Default)]
pub struct Context {
    frame: Arc<Frame>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context for delegated work (e.g. a prefetch) that falls
    /// back to this context's faults.
    pub fn child(&self) -> Self {
        Self {
            frame: Arc::new(Frame {
                parent: Some(Arc::clone(&self.frame)),
                ..Frame::default()
            }),
        }
    }

    pub fn has_parent(&self) -> bool {
        self.frame.parent.is_some()
    }

    pub fn set_faults(&self, plan: FaultPlan) {
        *self
            .frame
            .faults
            .write()
            .unwrap_or_else(PoisonError::into_inner) = FaultSlot::Active(Arc::new(plan));
    }

    /// Removes faults from this context without re-enabling the parent fallback.
    pub fn clear_faults(&self) {
        *self
            .frame
            .faults
            .write()
            .unwrap_or_else(PoisonError::into_inner) = FaultSlot::Cleared;
    }

    /// The fault plan in effect: this context's own, else its parent's own.
    pub fn faults(&self) -> Option<Arc<FaultPlan>> {
        match self.frame.slot() {
            FaultSlot::Active(plan) => Some(plan),
            FaultSlot::Cleared => None,
            FaultSlot::Inherit => match self.frame.parent.as_ref().map(|p| p.slot()) {
                Some(FaultSlot::Active(plan)) => Some(plan),
                _ => None,
            },
        }
    }

    /// The request-scoped memo used by fixture backends.
    pub fn local_cache(&self) -> &ScopedCache<String, Response> {
        &self.frame.cache
    }

    /// Opens a request-scoped cache scope for this context.
    pub fn enter_local_cache(&self) -> ScopeGuard<'_, String, Response> {
        self.frame.cache.enter()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("faults", &self.frame.slot())
            .field("has_parent", &self.has_parent())
            .field("cached_entries", &self.frame.cache.len())
            .finish()
    }
}
