//! [`Query`] collection related to the multiple [`Sale`]s.

use common::operations::By;

use crate::domain::Sale;
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all the [`Sale`]s in the order they happened.
pub type List = DatabaseQuery<By<Vec<Sale>, ()>>;
