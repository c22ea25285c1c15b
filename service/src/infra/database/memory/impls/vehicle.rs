//! [`Vehicle`]-related [`Database`] implementations.

use common::operations::{By, Insert, Lock, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{vehicle, Vehicle},
    infra::{
        database::{
            self,
            memory::{self, Connection, Memory},
        },
        Database,
    },
    read,
};

impl<C> Database<Select<By<Option<Vehicle>, vehicle::Id>>> for Memory<C>
where
    C: Connection,
{
    type Ok = Option<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Vehicle>, vehicle::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.read(|s| s.vehicles.iter().find(|v| v.id == id).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<Vec<Vehicle>, read::vehicle::list::Filter>>>
    for Memory<C>
where
    C: Connection,
{
    type Ok = Vec<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Vehicle>, read::vehicle::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let mut vehicles = self
            .read(|s| {
                s.vehicles
                    .iter()
                    .filter(|v| filter.matches(v))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .await
            .map_err(tracerr::wrap!())?;
        // Stable, so equally priced `Vehicle`s keep their creation order.
        vehicles.sort_by(|a, b| a.price.cmp(&b.price));
        Ok(vehicles)
    }
}

impl<C> Database<Insert<Vehicle>> for Memory<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(vehicle): Insert<Vehicle>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| {
            if s.vehicles.iter().any(|v| v.id == vehicle.id) {
                return Err(memory::Error::UniqueViolation {
                    constraint: "vehicles_pkey",
                });
            }
            s.vehicles.push(vehicle);
            Ok(())
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

/// Writes the editable attributes of a [`Vehicle`].
///
/// `sold_at` and `created_at` are never overwritten: the former is changed by
/// [`vehicle::SoldTransition`] only.
impl<C> Database<Update<Vehicle>> for Memory<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(vehicle): Update<Vehicle>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| {
            if let Some(stored) =
                s.vehicles.iter_mut().find(|v| v.id == vehicle.id)
            {
                *stored = Vehicle {
                    sold_at: stored.sold_at,
                    created_at: stored.created_at,
                    ..vehicle
                };
            }
            Ok(())
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<vehicle::SoldTransition>> for Memory<C>
where
    C: Connection,
{
    type Ok = Option<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(transition): Update<vehicle::SoldTransition>,
    ) -> Result<Self::Ok, Self::Err> {
        let vehicle::SoldTransition { id, sold_at } = transition;
        self.write(|s| {
            Ok(s.vehicles
                .iter_mut()
                .find(|v| v.id == id && !v.is_sold())
                .map(|v| {
                    v.sold_at = Some(sold_at);
                    v.updated_at = sold_at.coerce();
                    v.clone()
                }))
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

/// No-op, as [`Memory`] transactions are serialized already.
impl<C> Database<Lock<By<Vehicle, vehicle::Id>>> for Memory<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Vehicle, vehicle::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Insert, Select, Update},
        DateTime, Money,
    };

    use crate::{
        domain::{vehicle, Vehicle},
        infra::{database::Memory, Database as _},
        read::vehicle::{list::Filter, IsSold},
    };

    async fn search(db: &Memory, is_sold: Option<bool>) -> Vec<Vehicle> {
        db.execute(Select(By::new(Filter {
            is_sold: is_sold.map(IsSold),
        })))
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn sorts_by_price_keeping_creation_order() {
        let db = Memory::new();
        let first = vehicle::spec::vehicle(70_000);
        let second = vehicle::spec::vehicle(50_000);
        let third = vehicle::spec::vehicle(70_000);
        for v in [&first, &second, &third] {
            db.execute(Insert(v.clone())).await.unwrap();
        }

        let ids = search(&db, None)
            .await
            .into_iter()
            .map(|v| v.id)
            .collect::<Vec<_>>();

        assert_eq!(ids, [second.id, first.id, third.id]);
    }

    #[tokio::test]
    async fn filters_by_sale_status() {
        let db = Memory::new();
        let for_sale = vehicle::spec::vehicle(50_000);
        let sold = vehicle::spec::vehicle(40_000);
        db.execute(Insert(for_sale.clone())).await.unwrap();
        db.execute(Insert(sold.clone())).await.unwrap();
        _ = db
            .execute(Update(vehicle::SoldTransition {
                id: sold.id,
                sold_at: DateTime::now().coerce(),
            }))
            .await
            .unwrap()
            .unwrap();

        let ids = |vs: Vec<Vehicle>| -> Vec<vehicle::Id> {
            vs.into_iter().map(|v| v.id).collect()
        };
        assert_eq!(ids(search(&db, Some(true)).await), vec![sold.id]);
        assert_eq!(ids(search(&db, Some(false)).await), vec![for_sale.id]);
        assert_eq!(
            ids(search(&db, None).await),
            vec![sold.id, for_sale.id],
        );
    }

    #[tokio::test]
    async fn sells_only_once() {
        let db = Memory::new();
        let v = vehicle::spec::vehicle(50_000);
        db.execute(Insert(v.clone())).await.unwrap();

        let sold_at = DateTime::now().coerce();
        let sold = db
            .execute(Update(vehicle::SoldTransition { id: v.id, sold_at }))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sold.sold_at, Some(sold_at));

        let again = db
            .execute(Update(vehicle::SoldTransition {
                id: v.id,
                sold_at: DateTime::now().coerce(),
            }))
            .await
            .unwrap();
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn update_keeps_sale_status() {
        let db = Memory::new();
        let v = vehicle::spec::vehicle(50_000);
        db.execute(Insert(v.clone())).await.unwrap();
        let sold = db
            .execute(Update(vehicle::SoldTransition {
                id: v.id,
                sold_at: DateTime::now().coerce(),
            }))
            .await
            .unwrap()
            .unwrap();

        // Stale copy read before the sale.
        let mut stale = v;
        stale.price = Money::new(60_000.into()).unwrap();
        db.execute(Update(stale)).await.unwrap();

        let stored = db
            .execute(Select(By::<Option<Vehicle>, _>::new(sold.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.sold_at, sold.sold_at);
        assert_eq!(stored.price, Money::new(60_000.into()).unwrap());
    }
}
