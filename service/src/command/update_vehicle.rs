//! [`Command`] for updating attributes of an existing [`Vehicle`].

use common::operations::{By, Commit, Lock, Select, Transact, Transacted, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{vehicle, Vehicle},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating attributes of an existing [`Vehicle`].
///
/// Only the attributes present in the [`vehicle::Patch`] are changed.
#[derive(Clone, Debug)]
pub struct UpdateVehicle {
    /// ID of the [`Vehicle`] to be updated.
    pub vehicle_id: vehicle::Id,

    /// Changes to be applied.
    pub patch: vehicle::Patch,
}

impl<Db> Command<UpdateVehicle> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Vehicle, vehicle::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Vehicle>, vehicle::Id>>,
            Ok = Option<Vehicle>,
            Err = Traced<database::Error>,
        > + Database<Update<Vehicle>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Vehicle;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateVehicle) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateVehicle { vehicle_id, patch } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid lost updates.
        tx.execute(Lock(By::new(vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut vehicle = tx
            .execute(Select(By::<Option<Vehicle>, _>::new(vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::VehicleNotExists(vehicle_id))
            .map_err(tracerr::wrap!())?;

        if !vehicle.apply(patch) {
            return Ok(vehicle);
        }

        tx.execute(Update(vehicle.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(vehicle)
    }
}

/// Error of [`UpdateVehicle`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Vehicle`] with the provided ID does not exist.
    #[display("`Vehicle(id: {_0})` does not exist")]
    VehicleNotExists(#[error(not(source))] vehicle::Id),
}

#[cfg(test)]
mod spec {
    use common::Money;

    use crate::{
        command::create_vehicle,
        domain::vehicle,
        infra::Memory,
        Command as _, Config, Service,
    };

    use super::{ExecutionError, UpdateVehicle};

    #[tokio::test]
    async fn changes_only_present_attributes() {
        let svc = Service::new(Config::default(), Memory::new());
        let created = svc
            .execute(create_vehicle::spec::create_vehicle(50_000))
            .await
            .unwrap();

        let updated = svc
            .execute(UpdateVehicle {
                vehicle_id: created.id,
                patch: vehicle::Patch {
                    brand: vehicle::Brand::new("X"),
                    ..vehicle::Patch::default()
                },
            })
            .await
            .unwrap();

        assert_eq!(updated.brand.to_string(), "X");
        assert_eq!(updated.model, created.model);
        assert_eq!(updated.year, created.year);
        assert_eq!(updated.color, created.color);
        assert_eq!(updated.price, created.price);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);

        let stored = svc
            .execute(crate::query::vehicle::ById::by(created.id))
            .await
            .unwrap();
        assert_eq!(stored, Some(updated));
    }

    #[tokio::test]
    async fn keeps_vehicle_untouched_without_changes() {
        let svc = Service::new(Config::default(), Memory::new());
        let created = svc
            .execute(create_vehicle::spec::create_vehicle(50_000))
            .await
            .unwrap();

        let updated = svc
            .execute(UpdateVehicle {
                vehicle_id: created.id,
                patch: vehicle::Patch {
                    price: Money::new(50_000.into()),
                    ..vehicle::Patch::default()
                },
            })
            .await
            .unwrap();

        assert_eq!(updated, created);
    }

    #[tokio::test]
    async fn fails_on_unknown_vehicle() {
        let svc = Service::new(Config::default(), Memory::new());
        let id = vehicle::Id::new();

        let err = svc
            .execute(UpdateVehicle {
                vehicle_id: id,
                patch: vehicle::Patch::default(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::VehicleNotExists(i) if *i == id,
        ));
    }
}
