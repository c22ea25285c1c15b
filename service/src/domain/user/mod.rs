//! User definitions.
//!
//! Users are managed outside of this service: it only sees the identity and
//! the role of an already authenticated caller.

use derive_more::{AsRef, Display, FromStr};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};

/// ID of a user.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Id(String);

impl Id {
    /// Creates a new [`Id`] if the given `id` is valid.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        Self::check(&id).then_some(Self(id))
    }

    /// Checks whether the given `id` is a valid [`Id`].
    fn check(id: impl AsRef<str>) -> bool {
        let id = id.as_ref();
        id.trim() == id && !id.is_empty() && id.len() <= 512
    }
}

impl FromStr for Id {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid user `Id`")
    }
}

/// Role of a user, granting privileges.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct Role(String);

impl Role {
    /// Creates the [`Role`] of administrators.
    #[must_use]
    pub fn admin() -> Self {
        Self("ADMIN".into())
    }

    /// Creates a new [`Role`] if the given `role` is valid.
    #[must_use]
    pub fn new(role: impl Into<String>) -> Option<Self> {
        let role = role.into();
        Self::check(&role).then_some(Self(role))
    }

    /// Checks whether the given `role` is a valid [`Role`].
    fn check(role: impl AsRef<str>) -> bool {
        let role = role.as_ref();
        role.trim() == role && !role.is_empty() && role.len() <= 64
    }
}

impl FromStr for Role {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid user `Role`")
    }
}

#[cfg(test)]
mod spec {
    use super::{Id, Role};

    #[test]
    fn validates_id() {
        assert!(Id::new("user-1").is_some());
        assert!(Id::new("").is_none());
        assert!(Id::new(" user-1").is_none());
        assert!("user-1".parse::<Id>().is_ok());
    }

    #[test]
    fn validates_role() {
        assert!(Role::new("ADMIN").is_some());
        assert!(Role::new("").is_none());
        assert!(Role::new("ADMIN\n").is_none());
    }
}
