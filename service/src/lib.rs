//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;

use smart_default::SmartDefault;

use crate::domain::user;
#[cfg(doc)]
use crate::infra::Database;

pub use self::{command::Command, query::Query};

/// [`Service`] configuration.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// [`Policy`] of privileged operations.
    pub policy: Policy,
}

/// Rules deciding which user [`user::Role`]s may perform privileged
/// operations.
#[derive(Clone, Debug, SmartDefault)]
pub struct Policy {
    /// [`user::Role`] allowed to create new [`Vehicle`]s.
    ///
    /// [`Vehicle`]: domain::Vehicle
    #[default(user::Role::admin())]
    pub creator_role: user::Role,

    /// [`user::Role`] allowed to buy [`Vehicle`]s.
    ///
    /// [`None`] means that any authenticated user may buy.
    ///
    /// [`Vehicle`]: domain::Vehicle
    pub buyer_role: Option<user::Role>,
}

impl Policy {
    /// Checks whether a user of the provided [`user::Role`] may create new
    /// [`Vehicle`]s.
    ///
    /// [`Vehicle`]: domain::Vehicle
    #[must_use]
    pub fn may_create(&self, role: Option<&user::Role>) -> bool {
        role == Some(&self.creator_role)
    }

    /// Checks whether a user of the provided [`user::Role`] may buy
    /// [`Vehicle`]s.
    ///
    /// [`Vehicle`]: domain::Vehicle
    #[must_use]
    pub fn may_buy(&self, role: Option<&user::Role>) -> bool {
        self.buyer_role.as_ref().is_none_or(|r| role == Some(r))
    }
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,
}

impl<Db> Service<Db> {
    /// Creates a new [`Service`] with the provided parameters.
    #[must_use]
    pub fn new(config: Config, database: Db) -> Self {
        Self { config, database }
    }

    /// Returns [`Config`] of this [`Service`].
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }
}

#[cfg(test)]
mod spec {
    use crate::domain::user;

    use super::Policy;

    #[test]
    fn only_admins_create_by_default() {
        let policy = Policy::default();
        let admin = user::Role::new("ADMIN").unwrap();
        let client = user::Role::new("CLIENT").unwrap();

        assert!(policy.may_create(Some(&admin)));
        assert!(!policy.may_create(Some(&client)));
        assert!(!policy.may_create(None));
    }

    #[test]
    fn anyone_buys_by_default() {
        let policy = Policy::default();

        assert!(policy.may_buy(None));
        assert!(policy.may_buy(user::Role::new("CLIENT").as_ref()));
    }

    #[test]
    fn restricts_buyers_when_configured() {
        let policy = Policy {
            buyer_role: user::Role::new("CLIENT"),
            ..Policy::default()
        };

        assert!(policy.may_buy(user::Role::new("CLIENT").as_ref()));
        assert!(!policy.may_buy(user::Role::new("ADMIN").as_ref()));
        assert!(!policy.may_buy(None));
    }
}
