//! [`Vehicle`]-related [`Database`] implementations.

use common::operations::{By, Insert, Lock, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{vehicle, Vehicle},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of a [`Vehicle`] row, in the order [`from_row()`] expects them.
const COLUMNS: &str = "\
    id, brand, model, year, color, price, sold_at, created_at, updated_at";

/// Decodes a [`Vehicle`] from the provided [`Row`] of [`COLUMNS`].
fn from_row(row: &Row) -> Vehicle {
    Vehicle {
        id: row.get("id"),
        brand: row.get("brand"),
        model: row.get("model"),
        year: row.get("year"),
        color: row.get("color"),
        price: row.get("price"),
        sold_at: row.get("sold_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C> Database<Select<By<Option<Vehicle>, vehicle::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Vehicle>, vehicle::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: vehicle::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM vehicles \
             WHERE id = $1::UUID \
             LIMIT 1",
        );
        Ok(self
            .query_opt(sql.as_str(), &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Vec<Vehicle>, read::vehicle::list::Filter>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Vehicle>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Vehicle>, read::vehicle::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::vehicle::list::Filter { is_sold } = by.into_inner();
        let is_sold = is_sold.map(|s| *s);

        // `seq` keeps equally priced `Vehicle`s in their creation order.
        let sql = format!(
            "SELECT {COLUMNS} \
             FROM vehicles \
             WHERE $1::BOOL IS NULL \
                OR (sold_at IS NOT NULL) = $1::BOOL \
             ORDER BY price ASC, seq ASC",
        );
        Ok(self
            .query(sql.as_str(), &[&is_sold])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Vehicle>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(vehicle): Insert<Vehicle>,
    ) -> Result<Self::Ok, Self::Err> {
        let Vehicle {
            id,
            brand,
            model,
            year,
            color,
            price,
            sold_at,
            created_at,
            updated_at,
        } = vehicle;

        const SQL: &str = "\
            INSERT INTO vehicles (\
                id, brand, model, year, color, price, \
                sold_at, created_at, updated_at \
            ) VALUES (\
                $1::UUID, $2::VARCHAR, $3::VARCHAR, $4::INT4, $5::VARCHAR, \
                $6::NUMERIC, \
                $7::TIMESTAMPTZ, $8::TIMESTAMPTZ, $9::TIMESTAMPTZ \
            )";
        self.exec(
            SQL,
            &[
                &id,
                &brand,
                &model,
                &year,
                &color,
                &price,
                &sold_at,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

/// Writes the editable attributes of a [`Vehicle`].
///
/// `sold_at` and `created_at` are never overwritten: the former is changed by
/// [`vehicle::SoldTransition`] only.
impl<C> Database<Update<Vehicle>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(vehicle): Update<Vehicle>,
    ) -> Result<Self::Ok, Self::Err> {
        let Vehicle {
            id,
            brand,
            model,
            year,
            color,
            price,
            sold_at: _,
            created_at: _,
            updated_at,
        } = vehicle;

        const SQL: &str = "\
            UPDATE vehicles \
            SET brand = $2::VARCHAR, \
                model = $3::VARCHAR, \
                year = $4::INT4, \
                color = $5::VARCHAR, \
                price = $6::NUMERIC, \
                updated_at = $7::TIMESTAMPTZ \
            WHERE id = $1::UUID";
        self.exec(
            SQL,
            &[&id, &brand, &model, &year, &color, &price, &updated_at],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<vehicle::SoldTransition>> for Postgres<C>
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

        let sql = format!(
            "UPDATE vehicles \
             SET sold_at = $2::TIMESTAMPTZ, \
                 updated_at = $2::TIMESTAMPTZ \
             WHERE id = $1::UUID \
               AND sold_at IS NULL \
             RETURNING {COLUMNS}",
        );
        Ok(self
            .query_opt(sql.as_str(), &[&id, &sold_at])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Lock<By<Vehicle, vehicle::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Vehicle, vehicle::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: vehicle::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM vehicles \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
