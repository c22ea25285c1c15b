//! Abstract storage operations.
//!
//! Each operation is a thin wrapper carrying its payload, so a storage backend
//! declares what it supports by implementing [`Handler`] for the operation.

use std::marker::PhantomData;

use crate::Handler;

/// Operation persisting a new value.
#[derive(Clone, Copy, Debug)]
pub struct Insert<T>(pub T);

/// Operation overwriting (or conditionally transitioning) a stored value.
#[derive(Clone, Copy, Debug)]
pub struct Update<T>(pub T);

/// Operation reading a value.
#[derive(Clone, Copy, Debug)]
pub struct Select<T>(pub T);

/// Operation acquiring an exclusive lock on a value until the end of the
/// current transaction.
#[derive(Clone, Copy, Debug)]
pub struct Lock<T>(pub T);

/// Operation beginning a transaction.
#[derive(Clone, Copy, Debug)]
pub struct Transact;

/// Handle of a [`Transact`]ed storage.
pub type Transacted<T> = <T as Handler<Transact>>::Ok;

/// Operation committing a transaction.
///
/// A transaction dropped without being committed is discarded.
#[derive(Clone, Copy, Debug)]
pub struct Commit;

/// Selector of `W` by `B`.
#[derive(Clone, Copy, Debug)]
pub struct By<W, B> {
    /// Type of the selected value.
    _what: PhantomData<W>,

    /// Value to select by.
    by: B,
}

impl<W, B> By<W, B> {
    /// Creates a new [`By`] selector out of the provided value.
    #[must_use]
    pub fn new(by: B) -> Self {
        Self {
            _what: PhantomData,
            by,
        }
    }

    /// Consumes this [`By`] returning the value it selects by.
    #[must_use]
    pub fn into_inner(self) -> B {
        self.by
    }
}
