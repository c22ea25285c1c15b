//! In-memory [`Database`] implementation.
//!
//! Transactions are serialized: a [`Tx`] holds the whole [`State`] locked
//! until it's committed or dropped, working on a staged copy of it.

pub mod client;
mod impls;

use std::future::Future;

use derive_more::{Deref, Display, Error as StdError};
use tracerr::Traced;

use crate::{
    domain::{Sale, Vehicle},
    infra::database,
};
#[cfg(doc)]
use crate::infra::Database;

pub use self::client::{NonTx, Tx};

/// In-memory [`Database`] client.
#[derive(Clone, Debug, Default, Deref)]
pub struct Memory<T = NonTx>(T);

impl Memory {
    /// Creates a new empty [`Memory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Data stored in a [`Memory`] database.
#[derive(Clone, Debug, Default)]
pub struct State {
    /// Stored [`Vehicle`]s in their creation order.
    pub vehicles: Vec<Vehicle>,

    /// Stored [`Sale`]s in their creation order.
    pub sales: Vec<Sale>,
}

/// Memory database [`Error`].
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// [`Tx`] is used after being committed.
    #[display("Transaction is already committed")]
    Committed,

    /// Stored value violates the unique `constraint`.
    #[display("Unique constraint `{constraint}` is violated")]
    UniqueViolation {
        /// Name of the violated constraint.
        constraint: &'static str,
    },
}

impl Error {
    /// Checks if the error is a unique violation of the specified constraint.
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        match self {
            Self::UniqueViolation { constraint: c } => {
                constraint.is_none_or(|expected| expected == *c)
            }
            Self::Committed => false,
        }
    }
}

/// Access to a [`State`] of a [`Memory`] database.
pub trait Connection {
    /// Reads the current [`State`] with the provided function.
    ///
    /// # Errors
    ///
    /// If the [`State`] cannot be accessed.
    fn read<R>(
        &self,
        f: impl FnOnce(&State) -> R,
    ) -> impl Future<Output = Result<R, Traced<database::Error>>>;

    /// Modifies the current [`State`] with the provided function.
    ///
    /// The function must leave the [`State`] untouched if it fails.
    ///
    /// # Errors
    ///
    /// If the [`State`] cannot be accessed, or the provided function fails.
    fn write<R>(
        &self,
        f: impl FnOnce(&mut State) -> Result<R, Error>,
    ) -> impl Future<Output = Result<R, Traced<database::Error>>>;
}
