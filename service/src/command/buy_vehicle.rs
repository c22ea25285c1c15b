//! [`Command`] for buying a [`Vehicle`].

use common::{
    operations::{
        By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
    },
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{sale, user, vehicle, Sale, Vehicle},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for buying a [`Vehicle`].
///
/// Records a new [`Sale`] with a snapshot of the current [`Vehicle`] price and
/// marks the [`Vehicle`] as sold at the same moment. Both changes happen in a
/// single transaction, so a [`Vehicle`] is never sold twice.
#[derive(Clone, Debug)]
pub struct BuyVehicle {
    /// ID of the [`Vehicle`] to be bought.
    pub vehicle_id: vehicle::Id,

    /// ID of the user buying the [`Vehicle`].
    pub buyer_id: user::Id,

    /// [`user::Role`] of the user buying the [`Vehicle`], if any.
    pub buyer_role: Option<user::Role>,
}

impl<Db> Command<BuyVehicle> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Vehicle>, vehicle::Id>>,
            Ok = Option<Vehicle>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Vehicle, vehicle::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Vehicle>, vehicle::Id>>,
            Ok = Option<Vehicle>,
            Err = Traced<database::Error>,
        > + Database<Insert<Sale>, Err = Traced<database::Error>>
        + Database<
            Update<vehicle::SoldTransition>,
            Ok = Option<Vehicle>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Vehicle;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: BuyVehicle) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let BuyVehicle {
            vehicle_id,
            buyer_id,
            buyer_role,
        } = cmd;

        if !self.config().policy.may_buy(buyer_role.as_ref()) {
            return Err(tracerr::new!(E::PermissionDenied));
        }

        // Fast path, not requiring a transaction.
        let vehicle = self
            .database()
            .execute(Select(By::<Option<Vehicle>, _>::new(vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::VehicleNotExists(vehicle_id))
            .map_err(tracerr::wrap!())?;
        if vehicle.is_sold() {
            return Err(tracerr::new!(E::VehicleAlreadySold(vehicle_id)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent purchases of the same `Vehicle`.
        tx.execute(Lock(By::new(vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let vehicle = tx
            .execute(Select(By::<Option<Vehicle>, _>::new(vehicle_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::VehicleNotExists(vehicle_id))
            .map_err(tracerr::wrap!())?;
        if vehicle.is_sold() {
            return Err(tracerr::new!(E::VehicleAlreadySold(vehicle_id)));
        }

        let sold_at = DateTime::now();
        let sale = Sale {
            id: sale::Id::new(),
            vehicle_id,
            buyer_id,
            price: vehicle.price,
            sold_at: sold_at.coerce(),
        };

        tx.execute(Insert(sale.clone()))
            .await
            .map_err(|e| {
                // Another `Sale` of this `Vehicle` is recorded concurrently.
                if e.as_ref()
                    .is_unique_violation(Some(database::SALES_VEHICLE_ID_KEY))
                {
                    return tracerr::new!(E::VehicleAlreadySold(vehicle_id));
                }
                tracerr::map_from(e)
            })
            .map_err(tracerr::wrap!())
            .map(drop)?;

        // Any failure before `Commit` drops `tx`, rolling the `Sale` back.
        let vehicle = tx
            .execute(Update(vehicle::SoldTransition {
                id: vehicle_id,
                sold_at: sold_at.coerce(),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            // Sold concurrently.
            .ok_or(E::VehicleAlreadySold(vehicle_id))
            .map_err(tracerr::wrap!())?;

        // Whether a failed `Commit` has persisted the `Sale` is unknown, so
        // its ID is reported for reconciliation.
        tx.execute(Commit)
            .await
            .map_err(|e| {
                log::error!(
                    "failed to commit `Sale(id: {})` of \
                     `Vehicle(id: {vehicle_id})`: {e}",
                    sale.id,
                );
                tracerr::new!(E::SaleNotReconciled(sale.id))
            })
            .map(drop)?;

        log::debug!(
            "`Vehicle(id: {vehicle_id})` is sold by `Sale(id: {})` to \
             `User(id: {})` for {}",
            sale.id,
            sale.buyer_id,
            sale.price,
        );

        Ok(vehicle)
    }
}

/// Error of [`BuyVehicle`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// User is not permitted to buy [`Vehicle`]s.
    #[display("Not permitted to buy a `Vehicle`")]
    PermissionDenied,

    /// Committing the [`Sale`] failed, so it may be persisted without the
    /// [`Vehicle`] being marked as sold.
    #[display("`Sale(id: {_0})` is not reconciled with its `Vehicle`")]
    SaleNotReconciled(#[error(not(source))] sale::Id),

    /// [`Vehicle`] is sold already.
    #[display("`Vehicle(id: {_0})` is already sold")]
    VehicleAlreadySold(#[error(not(source))] vehicle::Id),

    /// [`Vehicle`] with the provided ID does not exist.
    #[display("`Vehicle(id: {_0})` does not exist")]
    VehicleNotExists(#[error(not(source))] vehicle::Id),
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Commit, Insert, Lock, Select, Transact, Update},
        Money,
    };
    use futures::future;
    use tracerr::Traced;

    use crate::{
        command::{create_vehicle, UpdateVehicle},
        domain::{user, vehicle, Sale, Vehicle},
        infra::{database, memory, Database, Memory},
        query, Command as _, Config, Policy, Service,
    };

    use super::{BuyVehicle, ExecutionError};

    /// Operation a [`Faulty`] storage fails.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    enum Fault {
        Insert,
        SoldTransition,
        Commit,
    }

    /// [`Memory`] storage failing the operation of its [`Fault`].
    #[derive(Clone, Debug)]
    struct Faulty<T = memory::NonTx> {
        db: Memory<T>,
        fault: Fault,
    }

    impl<T> Faulty<T> {
        /// Fails if this [`Faulty`] storage is set to fail the `op`.
        fn check(&self, op: Fault) -> Result<(), Traced<database::Error>> {
            if self.fault == op {
                return Err(tracerr::new!(database::Error::from(
                    memory::Error::Committed
                )));
            }
            Ok(())
        }
    }

    impl Database<Transact> for Faulty {
        type Ok = Faulty<memory::Tx>;
        type Err = Traced<database::Error>;

        async fn execute(&self, op: Transact) -> Result<Self::Ok, Self::Err> {
            Ok(Faulty {
                db: self.db.execute(op).await?,
                fault: self.fault,
            })
        }
    }

    impl<T> Database<Select<By<Option<Vehicle>, vehicle::Id>>> for Faulty<T>
    where
        T: memory::Connection,
    {
        type Ok = Option<Vehicle>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            op: Select<By<Option<Vehicle>, vehicle::Id>>,
        ) -> Result<Self::Ok, Self::Err> {
            self.db.execute(op).await
        }
    }

    impl Database<Lock<By<Vehicle, vehicle::Id>>> for Faulty<memory::Tx> {
        type Ok = ();
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            op: Lock<By<Vehicle, vehicle::Id>>,
        ) -> Result<Self::Ok, Self::Err> {
            self.db.execute(op).await
        }
    }

    impl Database<Insert<Sale>> for Faulty<memory::Tx> {
        type Ok = ();
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            op: Insert<Sale>,
        ) -> Result<Self::Ok, Self::Err> {
            self.check(Fault::Insert)?;
            self.db.execute(op).await
        }
    }

    impl Database<Update<vehicle::SoldTransition>> for Faulty<memory::Tx> {
        type Ok = Option<Vehicle>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            op: Update<vehicle::SoldTransition>,
        ) -> Result<Self::Ok, Self::Err> {
            self.check(Fault::SoldTransition)?;
            self.db.execute(op).await
        }
    }

    impl Database<Commit> for Faulty<memory::Tx> {
        type Ok = ();
        type Err = Traced<database::Error>;

        async fn execute(&self, op: Commit) -> Result<Self::Ok, Self::Err> {
            self.check(Fault::Commit)?;
            self.db.execute(op).await
        }
    }

    /// Tries to buy a new [`Vehicle`] via storage failing on the `fault`.
    ///
    /// Returns the [`Service`] over the underlying storage, the ID of the
    /// [`Vehicle`] and the purchase error.
    async fn buy_failing(
        fault: Fault,
    ) -> (Service<Memory>, vehicle::Id, Traced<ExecutionError>) {
        let db = Memory::new();
        let svc = Service::new(Config::default(), db.clone());
        let vehicle = created(&svc, 50_000).await;

        let faulty = Service::new(Config::default(), Faulty { db, fault });
        let err = faulty
            .execute(buy(vehicle.id, "user-1"))
            .await
            .unwrap_err();

        (svc, vehicle.id, err)
    }

    async fn created(svc: &Service<Memory>, price: u32) -> Vehicle {
        svc.execute(create_vehicle::spec::create_vehicle(price))
            .await
            .unwrap()
    }

    fn buy(vehicle_id: vehicle::Id, buyer: &str) -> BuyVehicle {
        BuyVehicle {
            vehicle_id,
            buyer_id: user::Id::new(buyer).unwrap(),
            buyer_role: None,
        }
    }

    #[tokio::test]
    async fn sells_vehicle_and_records_sale() {
        let svc = Service::new(Config::default(), Memory::new());
        let vehicle = created(&svc, 50_000).await;

        let sold = svc.execute(buy(vehicle.id, "user-1")).await.unwrap();

        let sold_at = sold.sold_at.unwrap();
        assert_eq!(sold.updated_at, sold_at.coerce());
        let sales = svc.execute(query::sales::List::by(())).await.unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].vehicle_id, vehicle.id);
        assert_eq!(sales[0].buyer_id.to_string(), "user-1");
        assert_eq!(sales[0].price, Money::new(50_000.into()).unwrap());
        assert_eq!(sales[0].sold_at, sold_at.coerce());
    }

    #[tokio::test]
    async fn sells_only_once() {
        let svc = Service::new(Config::default(), Memory::new());
        let vehicle = created(&svc, 50_000).await;

        let first = svc.execute(buy(vehicle.id, "user-1")).await.unwrap();
        let err = svc.execute(buy(vehicle.id, "user-2")).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::VehicleAlreadySold(id) if *id == vehicle.id,
        ));
        let stored = svc
            .execute(query::vehicle::ById::by(vehicle.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.sold_at, first.sold_at);
        let sales = svc.execute(query::sales::List::by(())).await.unwrap();
        assert_eq!(sales.len(), 1);
    }

    #[tokio::test]
    async fn sells_only_once_concurrently() {
        let svc = Service::new(Config::default(), Memory::new());
        let vehicle = created(&svc, 50_000).await;

        let results = future::join_all((0..10).map(|n| {
            let svc = svc.clone();
            async move {
                svc.execute(buy(vehicle.id, &format!("user-{n}"))).await
            }
        }))
        .await;

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results.iter().filter_map(|r| r.as_ref().err()).all(|e| {
            matches!(e.as_ref(), ExecutionError::VehicleAlreadySold(_))
        }));
        let sales = svc.execute(query::sales::List::by(())).await.unwrap();
        assert_eq!(sales.len(), 1);
    }

    #[tokio::test]
    async fn keeps_sale_price_after_price_change() {
        let svc = Service::new(Config::default(), Memory::new());
        let vehicle = created(&svc, 50_000).await;
        _ = svc.execute(buy(vehicle.id, "user-1")).await.unwrap();

        let updated = svc
            .execute(UpdateVehicle {
                vehicle_id: vehicle.id,
                patch: vehicle::Patch {
                    price: Money::new(60_000.into()),
                    ..vehicle::Patch::default()
                },
            })
            .await
            .unwrap();

        assert_eq!(updated.price, Money::new(60_000.into()).unwrap());
        assert!(updated.is_sold());
        let sales = svc.execute(query::sales::List::by(())).await.unwrap();
        assert_eq!(sales[0].price, Money::new(50_000.into()).unwrap());
    }

    #[tokio::test]
    async fn fails_on_unknown_vehicle() {
        let svc = Service::new(Config::default(), Memory::new());
        let id = vehicle::Id::new();

        let err = svc.execute(buy(id, "user-1")).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::VehicleNotExists(i) if *i == id,
        ));
        let sales = svc.execute(query::sales::List::by(())).await.unwrap();
        assert!(sales.is_empty());
    }

    #[tokio::test]
    async fn denies_buyers_of_other_roles() {
        let config = Config {
            policy: Policy {
                buyer_role: user::Role::new("CLIENT"),
                ..Policy::default()
            },
        };
        let svc = Service::new(config, Memory::new());
        let vehicle = created(&svc, 50_000).await;

        let err = svc.execute(buy(vehicle.id, "user-1")).await.unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::PermissionDenied));

        let sold = svc
            .execute(BuyVehicle {
                buyer_role: user::Role::new("CLIENT"),
                ..buy(vehicle.id, "user-1")
            })
            .await
            .unwrap();
        assert!(sold.is_sold());
    }

    #[tokio::test]
    async fn keeps_vehicle_for_sale_if_sale_is_not_recorded() {
        let (svc, id, err) = buy_failing(Fault::Insert).await;

        assert!(matches!(err.as_ref(), ExecutionError::Db(_)));
        let vehicle = svc
            .execute(query::vehicle::ById::by(id))
            .await
            .unwrap()
            .unwrap();
        assert!(!vehicle.is_sold());
        let sales = svc.execute(query::sales::List::by(())).await.unwrap();
        assert!(sales.is_empty());
    }

    #[tokio::test]
    async fn rolls_back_sale_if_vehicle_is_not_marked_sold() {
        let (svc, id, err) = buy_failing(Fault::SoldTransition).await;

        assert!(matches!(err.as_ref(), ExecutionError::Db(_)));
        let vehicle = svc
            .execute(query::vehicle::ById::by(id))
            .await
            .unwrap()
            .unwrap();
        assert!(!vehicle.is_sold());
        let sales = svc.execute(query::sales::List::by(())).await.unwrap();
        assert!(sales.is_empty());
    }

    #[tokio::test]
    async fn reports_sale_for_reconciliation_if_commit_fails() {
        let (_, _, err) = buy_failing(Fault::Commit).await;

        assert!(matches!(
            err.as_ref(),
            ExecutionError::SaleNotReconciled(_),
        ));
    }
}
