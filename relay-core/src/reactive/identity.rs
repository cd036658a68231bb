//! Strict equality for derived values.
//!
//! A selector decides whether its derived tuple changed by comparing each
//! position with [`Identity::same`]. Primitives compare by value, shared
//! values compare by pointer. Composite values have no impl on purpose: wrap
//! them in an [`Arc`] so that "unchanged" means "the same allocation".
//!
//! A projection that builds a fresh `Arc` on every call therefore reports a
//! change on every call. Text is the exception: `Arc<str>` compares by
//! value, like `String` and `&'static str`.

use std::sync::Arc;

/// Strict (not deep) equality.
pub trait Identity {
    /// Returns true when `other` is the same value in the strict sense.
    fn same(&self, other: &Self) -> bool;
}

macro_rules! identity_by_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Identity for $ty {
                #[inline]
                fn same(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

identity_by_value!(
    (), bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize,
    f32, f64, &'static str, String,
);

impl<T> Identity for Arc<T> {
    #[inline]
    fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl<T> Identity for Arc<[T]> {
    #[inline]
    fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl Identity for Arc<str> {
    #[inline]
    fn same(&self, other: &Self) -> bool {
        **self == **other
    }
}

impl<T: Identity> Identity for Option<T> {
    fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.same(b),
            (None, None) => true,
            _ => false,
        }
    }
}

macro_rules! identity_for_tuple {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: Identity),+> Identity for ($($name,)+) {
            fn same(&self, other: &Self) -> bool {
                $(self.$idx.same(&other.$idx))&&+
            }
        }
    };
}

identity_for_tuple!(A: 0);
identity_for_tuple!(A: 0, B: 1);
identity_for_tuple!(A: 0, B: 1, C: 2);
identity_for_tuple!(A: 0, B: 1, C: 2, D: 3);
identity_for_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4);
identity_for_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
identity_for_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
identity_for_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);
