//! Projections and effect producers.
//!
//! A responder derives an ordered tuple of values from the full state, one
//! projection per position, and hands that tuple to its producer spread as
//! positional arguments. Both sides are expressed as traits implemented for
//! closures of arity 1 through 8:
//!
//! ```rust,ignore
//! let projections = (|s: &State| s.user_id, |s: &State| s.filter.clone());
//! let produce = |user_id: u64, filter: Arc<Filter>| Effect::pending(fetch(user_id, filter));
//! ```
//!
//! Closure arguments need explicit types: the traits are not `Fn` bounds, so
//! the compiler cannot infer a closure signature from them.

use super::effect::Effect;
use super::identity::Identity;

/// An ordered set of projections from state `S` to a value tuple.
pub trait Projections<S>: Send + Sync + 'static {
    /// The derived tuple, one element per projection.
    type Values: Identity + Clone + Send + 'static;

    /// Apply every projection to `state`, in order.
    fn project(&self, state: &S) -> Self::Values;
}

/// A function from a value tuple to an effect.
pub trait Produce<Values, T, R>: Send + Sync + 'static {
    /// Invoke the producer with `values` spread as positional arguments.
    fn produce(&self, values: Values) -> Effect<T, R>;
}

macro_rules! impl_for_arity {
    ($($proj:ident : $val:ident : $idx:tt),+) => {
        impl<S, $($proj, $val),+> Projections<S> for ($($proj,)+)
        where
            $(
                $proj: Fn(&S) -> $val + Send + Sync + 'static,
                $val: Identity + Clone + Send + 'static,
            )+
        {
            type Values = ($($val,)+);

            #[inline]
            fn project(&self, state: &S) -> Self::Values {
                ($((self.$idx)(state),)+)
            }
        }

        impl<Func, T, R, $($val),+> Produce<($($val,)+), T, R> for Func
        where
            Func: Fn($($val),+) -> Effect<T, R> + Send + Sync + 'static,
        {
            #[allow(non_snake_case)]
            #[inline]
            fn produce(&self, values: ($($val,)+)) -> Effect<T, R> {
                let ($($val,)+) = values;
                (self)($($val),+)
            }
        }
    };
}

impl_for_arity!(P0: V0: 0);
impl_for_arity!(P0: V0: 0, P1: V1: 1);
impl_for_arity!(P0: V0: 0, P1: V1: 1, P2: V2: 2);
impl_for_arity!(P0: V0: 0, P1: V1: 1, P2: V2: 2, P3: V3: 3);
impl_for_arity!(P0: V0: 0, P1: V1: 1, P2: V2: 2, P3: V3: 3, P4: V4: 4);
impl_for_arity!(P0: V0: 0, P1: V1: 1, P2: V2: 2, P3: V3: 3, P4: V4: 4, P5: V5: 5);
impl_for_arity!(P0: V0: 0, P1: V1: 1, P2: V2: 2, P3: V3: 3, P4: V4: 4, P5: V5: 5, P6: V6: 6);
impl_for_arity!(
    P0: V0: 0, P1: V1: 1, P2: V2: 2, P3: V3: 3, P4: V4: 4, P5: V5: 5, P6: V6: 6, P7: V7: 7
);
