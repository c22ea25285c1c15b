//! [`Sale`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::Sale,
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Vec<Sale>, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Sale>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Sale>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT id, vehicle_id, user_id, price, sold_at \
            FROM sales \
            ORDER BY seq ASC";
        Ok(self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| Sale {
                id: row.get("id"),
                vehicle_id: row.get("vehicle_id"),
                buyer_id: row.get("user_id"),
                price: row.get("price"),
                sold_at: row.get("sold_at"),
            })
            .collect())
    }
}

/// Records a new [`Sale`].
///
/// Fails with a unique violation of the `sales_vehicle_id_key` constraint if
/// the [`Vehicle`] has been sold already.
///
/// [`Vehicle`]: crate::domain::Vehicle
impl<C> Database<Insert<Sale>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(sale): Insert<Sale>,
    ) -> Result<Self::Ok, Self::Err> {
        let Sale {
            id,
            vehicle_id,
            buyer_id,
            price,
            sold_at,
        } = sale;

        const SQL: &str = "\
            INSERT INTO sales (\
                id, vehicle_id, user_id, price, sold_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::VARCHAR, $4::NUMERIC, \
                $5::TIMESTAMPTZ \
            )";
        self.exec(SQL, &[&id, &vehicle_id, &buyer_id, &price, &sold_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
