//! [`Command`] for creating a new [`Vehicle`].

use common::{operations::Insert, DateTime, Money};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{user, vehicle, Vehicle},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Vehicle`].
#[derive(Clone, Debug)]
pub struct CreateVehicle {
    /// [`vehicle::Brand`] of a new [`Vehicle`].
    pub brand: vehicle::Brand,

    /// [`vehicle::Model`] of a new [`Vehicle`].
    pub model: vehicle::Model,

    /// [`vehicle::Year`] of a new [`Vehicle`].
    pub year: vehicle::Year,

    /// [`vehicle::Color`] of a new [`Vehicle`].
    pub color: vehicle::Color,

    /// Price of a new [`Vehicle`].
    pub price: Money,

    /// [`user::Role`] of the user creating the [`Vehicle`], if any.
    pub initiator_role: Option<user::Role>,
}

impl<Db> Command<CreateVehicle> for Service<Db>
where
    Db: Database<Insert<Vehicle>, Err = Traced<database::Error>>,
{
    type Ok = Vehicle;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateVehicle) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateVehicle {
            brand,
            model,
            year,
            color,
            price,
            initiator_role,
        } = cmd;

        if !self.config().policy.may_create(initiator_role.as_ref()) {
            return Err(tracerr::new!(E::PermissionDenied));
        }

        let now = DateTime::now();
        let vehicle = Vehicle {
            id: vehicle::Id::new(),
            brand,
            model,
            year,
            color,
            price,
            sold_at: None,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };

        self.database()
            .execute(Insert(vehicle.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(vehicle)
    }
}

/// Error of [`CreateVehicle`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// User is not permitted to create [`Vehicle`]s.
    #[display("Not permitted to create a `Vehicle`")]
    PermissionDenied,
}

#[cfg(test)]
pub(crate) mod spec {
    use common::{
        operations::{By, Select},
        Money,
    };

    use crate::{
        domain::{user, vehicle, Vehicle},
        infra::{Database as _, Memory},
        Command as _, Config, Service,
    };

    use super::{CreateVehicle, ExecutionError};

    /// Builds a [`CreateVehicle`] command issued by an admin.
    pub(crate) fn create_vehicle(price: u32) -> CreateVehicle {
        CreateVehicle {
            brand: vehicle::Brand::new("Ford").unwrap(),
            model: vehicle::Model::new("Ka").unwrap(),
            year: vehicle::Year::new(2022).unwrap(),
            color: vehicle::Color::new("Preto").unwrap(),
            price: Money::new(price.into()).unwrap(),
            initiator_role: Some(user::Role::admin()),
        }
    }

    #[tokio::test]
    async fn creates_vehicle_for_sale() {
        let svc = Service::new(Config::default(), Memory::new());

        let vehicle = svc.execute(create_vehicle(50_000)).await.unwrap();

        assert_eq!(vehicle.brand.to_string(), "Ford");
        assert_eq!(vehicle.model.to_string(), "Ka");
        assert_eq!(u16::from(vehicle.year), 2022);
        assert_eq!(vehicle.color.to_string(), "Preto");
        assert_eq!(vehicle.price, Money::new(50_000.into()).unwrap());
        assert!(!vehicle.is_sold());
        assert_eq!(vehicle.created_at, vehicle.updated_at.coerce());

        let stored = svc
            .database()
            .execute(Select(By::<Option<Vehicle>, _>::new(vehicle.id)))
            .await
            .unwrap();
        assert_eq!(stored, Some(vehicle));
    }

    #[tokio::test]
    async fn denies_unprivileged_creators() {
        let svc = Service::new(Config::default(), Memory::new());

        for role in [None, user::Role::new("CLIENT")] {
            let err = svc
                .execute(CreateVehicle {
                    initiator_role: role,
                    ..create_vehicle(50_000)
                })
                .await
                .unwrap_err();

            assert!(matches!(err.as_ref(), ExecutionError::PermissionDenied));
        }
    }
}
