//! [`Sale`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf, Money};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{user, vehicle};

/// Completed purchase of a [`Vehicle`].
///
/// [`Sale`]s are append-only: once recorded, they're never changed.
///
/// [`Vehicle`]: crate::domain::Vehicle
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Sale {
    /// ID of this [`Sale`].
    pub id: Id,

    /// ID of the sold [`Vehicle`].
    ///
    /// [`Vehicle`]: crate::domain::Vehicle
    pub vehicle_id: vehicle::Id,

    /// ID of the user who bought the [`Vehicle`].
    ///
    /// [`Vehicle`]: crate::domain::Vehicle
    pub buyer_id: user::Id,

    /// Price of the [`Vehicle`] at the moment of this [`Sale`].
    ///
    /// [`Vehicle`]: crate::domain::Vehicle
    pub price: Money,

    /// [`DateTime`] when this [`Sale`] happened.
    pub sold_at: SaleDateTime,
}

/// ID of a [`Sale`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// [`DateTime`] when a [`Sale`] happened.
pub type SaleDateTime = DateTimeOf<(Sale, unit::Sale)>;
