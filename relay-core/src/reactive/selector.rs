//! Selector Implementation
//!
//! A Selector derives a value tuple from state through a fixed set of
//! projections and remembers the last tuple it produced.
//!
//! # How Selectors Work
//!
//! 1. Every evaluation runs all projections against the given state.
//!
//! 2. The fresh tuple is compared, position by position, with the cached one
//!    using [`Identity::same`].
//!
//! 3. If every position is the same, the cached tuple is returned and the
//!    version stays put.
//!
//! 4. Otherwise the fresh tuple replaces the cache and the version advances
//!    by exactly one. This is a "recomputation".
//!
//! Callers detect change by comparing the [`Version`] stamp of an evaluation
//! with the last one they saw, instead of comparing values themselves.
//!
//! # Thread Safety
//!
//! The selector itself runs projections without holding its cache lock; only
//! the compare-and-replace is locked. A [`Responder`](super::Responder) does
//! hold its own lock across the whole evaluation, so calls to the same
//! responder wait for each other, slow projections included.

use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use super::identity::Identity;
use super::projection::Projections;

/// Counter for generating unique selector IDs.
static SELECTOR_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a new unique selector ID.
fn next_selector_id() -> u64 {
    SELECTOR_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Version stamp of a selector's cached tuple.
///
/// Equal stamps from the same selector mean the derived tuple did not change
/// in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version(u64);

impl Version {
    /// The stamp before any recomputation, and after a reset.
    pub const INITIAL: Self = Self(0);

    /// Number of recomputations this stamp represents.
    pub fn get(self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// The result of evaluating a selector.
#[derive(Debug, Clone)]
pub struct Evaluation<V> {
    /// The derived tuple.
    pub values: V,

    /// Version of the cache after this evaluation.
    pub version: Version,
}

struct Cache<V> {
    values: Option<V>,
    version: Version,
}

/// A memoizing selector over a tuple of projections.
pub struct Selector<S, P>
where
    P: Projections<S>,
{
    /// Unique identifier for this selector.
    id: u64,

    projections: P,

    cache: Mutex<Cache<P::Values>>,

    _state: PhantomData<fn(&S)>,
}

impl<S, P> Selector<S, P>
where
    P: Projections<S>,
{
    /// Create a selector. Nothing is computed until the first evaluation.
    pub fn new(projections: P) -> Self {
        Self {
            id: next_selector_id(),
            projections,
            cache: Mutex::new(Cache {
                values: None,
                version: Version::INITIAL,
            }),
            _state: PhantomData,
        }
    }

    /// Get the selector's unique ID.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Derive the tuple for `state`, recomputing if any position changed.
    pub fn evaluate(&self, state: &S) -> Evaluation<P::Values> {
        let fresh = self.projections.project(state);

        let mut cache = self.cache.lock();
        if let Some(cached) = &cache.values {
            if cached.same(&fresh) {
                return Evaluation {
                    values: cached.clone(),
                    version: cache.version,
                };
            }
        }

        cache.version = cache.version.next();
        cache.values = Some(fresh.clone());
        Evaluation {
            values: fresh,
            version: cache.version,
        }
    }

    /// The current version without evaluating.
    pub fn version(&self) -> Version {
        self.cache.lock().version
    }

    /// Number of recomputations since creation or the last reset.
    pub fn recomputations(&self) -> u64 {
        self.version().get()
    }

    /// Reset the recomputation counter and forget the cached tuple.
    ///
    /// The next evaluation always counts as a recomputation.
    pub fn reset_recomputations(&self) {
        let mut cache = self.cache.lock();
        cache.values = None;
        cache.version = Version::INITIAL;
    }

    /// Check if the selector has a cached tuple.
    pub fn has_value(&self) -> bool {
        self.cache.lock().values.is_some()
    }
}

impl<S, P> fmt::Debug for Selector<S, P>
where
    P: Projections<S>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector")
            .field("id", &self.id)
            .field("version", &self.version())
            .field("has_value", &self.has_value())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Arc;

    #[derive(Clone)]
    struct State {
        value: &'static str,
        items: Arc<Vec<u32>>,
    }

    fn state(value: &'static str) -> State {
        State {
            value,
            items: Arc::new(Vec::new()),
        }
    }

    #[test]
    fn selector_computes_on_first_evaluation() {
        let selector = Selector::new((|s: &State| s.value,));

        assert!(!selector.has_value());
        assert_eq!(selector.recomputations(), 0);

        let eval = selector.evaluate(&state("sad"));
        assert_eq!(eval.values, ("sad",));
        assert_eq!(eval.version.get(), 1);
        assert!(selector.has_value());
    }

    #[test]
    fn selector_keeps_version_when_values_unchanged() {
        let selector = Selector::new((|s: &State| s.value,));

        let first = selector.evaluate(&state("sad"));
        let second = selector.evaluate(&state("sad"));
        let third = selector.evaluate(&state("sad"));

        assert_eq!(first.version, second.version);
        assert_eq!(second.version, third.version);
        assert_eq!(selector.recomputations(), 1);
    }

    #[test]
    fn selector_advances_once_per_change() {
        let selector = Selector::new((|s: &State| s.value,));

        selector.evaluate(&state("sad"));
        selector.evaluate(&state("happy"));
        selector.evaluate(&state("happy"));
        selector.evaluate(&state("sad"));

        assert_eq!(selector.recomputations(), 3);
    }

    #[test]
    fn selector_compares_shared_values_by_pointer() {
        let selector = Selector::new((|s: &State| s.items.clone(),));

        let shared = state("x");
        selector.evaluate(&shared);
        selector.evaluate(&shared.clone());
        assert_eq!(selector.recomputations(), 1);

        // Equal contents, fresh allocation
        selector.evaluate(&state("x"));
        assert_eq!(selector.recomputations(), 2);
    }

    #[test]
    fn selector_compares_shared_text_by_value() {
        let selector = Selector::new((|s: &State| -> Arc<str> { Arc::from(s.value) },));

        // Every evaluation allocates, but equal text is not a change
        selector.evaluate(&state("sad"));
        selector.evaluate(&state("sad"));
        assert_eq!(selector.recomputations(), 1);

        selector.evaluate(&state("happy"));
        assert_eq!(selector.recomputations(), 2);
    }

    #[test]
    fn selector_runs_projections_every_evaluation() {
        let calls = Arc::new(AtomicI32::new(0));
        let calls_clone = calls.clone();

        let selector = Selector::new((move |s: &State| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            s.value
        },));

        selector.evaluate(&state("sad"));
        selector.evaluate(&state("sad"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn reset_forgets_cache() {
        let selector = Selector::new((|s: &State| s.value,));

        selector.evaluate(&state("sad"));
        selector.evaluate(&state("happy"));
        assert_eq!(selector.recomputations(), 2);

        selector.reset_recomputations();
        assert_eq!(selector.recomputations(), 0);
        assert!(!selector.has_value());

        // Same values as before the reset still count as a recomputation
        let eval = selector.evaluate(&state("happy"));
        assert_eq!(eval.version.get(), 1);
    }

    #[test]
    fn selector_ids_are_unique() {
        let a = Selector::<State, _>::new((|s: &State| s.value,));
        let b = Selector::<State, _>::new((|s: &State| s.value,));
        assert_ne!(a.id(), b.id());
    }
}
