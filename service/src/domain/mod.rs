//! Domain definitions.

pub mod sale;
pub mod user;
pub mod vehicle;

pub use self::{sale::Sale, vehicle::Vehicle};
