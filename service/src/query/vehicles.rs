//! [`Query`] collection related to the multiple [`Vehicle`]s.

use common::operations::By;

use crate::{domain::Vehicle, read};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a list of [`Vehicle`]s ordered by price.
pub type List = DatabaseQuery<By<Vec<Vehicle>, read::vehicle::list::Filter>>;
