//! [`Vehicle`]-related read definitions.

use derive_more::Deref;

#[cfg(doc)]
use crate::domain::Vehicle;

/// Indicator whether a [`Vehicle`] is sold or not.
#[derive(Clone, Copy, Debug, Deref, Eq, Hash, PartialEq)]
pub struct IsSold(pub bool);

impl PartialEq<bool> for IsSold {
    fn eq(&self, other: &bool) -> bool {
        self.0 == *other
    }
}

pub mod list {
    //! [`Vehicle`] list definitions.
    //!
    //! Lists are always ordered by price ascending, with equally priced
    //! [`Vehicle`]s kept in the order they were created.

    use crate::domain::Vehicle;

    use super::IsSold;

    /// Filter of a [`Vehicle`] list.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct Filter {
        /// Sale status to filter by.
        ///
        /// [`None`] means [`Vehicle`]s of any status.
        pub is_sold: Option<IsSold>,
    }

    impl Filter {
        /// Checks whether the provided [`Vehicle`] passes this [`Filter`].
        #[must_use]
        pub fn matches(&self, vehicle: &Vehicle) -> bool {
            self.is_sold.is_none_or(|s| s == vehicle.is_sold())
        }
    }
}
