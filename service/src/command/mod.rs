//! [`Command`] definition.

pub mod buy_vehicle;
pub mod create_vehicle;
pub mod update_vehicle;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    buy_vehicle::BuyVehicle, create_vehicle::CreateVehicle,
    update_vehicle::UpdateVehicle,
};
