//! Infrastructure layer.

pub mod database;

pub use self::database::{memory, Database, Memory};
#[cfg(feature = "postgres")]
pub use self::database::{postgres, Postgres, Storage};
