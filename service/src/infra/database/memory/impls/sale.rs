//! [`Sale`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::Sale,
    infra::{
        database::{
            self,
            memory::{self, Connection, Memory},
        },
        Database,
    },
};

impl<C> Database<Select<By<Vec<Sale>, ()>>> for Memory<C>
where
    C: Connection,
{
    type Ok = Vec<Sale>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Sale>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.read(|s| s.sales.clone())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Insert<Sale>> for Memory<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(sale): Insert<Sale>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|s| {
            if s.sales.iter().any(|e| e.vehicle_id == sale.vehicle_id) {
                return Err(memory::Error::UniqueViolation {
                    constraint: database::SALES_VEHICLE_ID_KEY,
                });
            }
            s.sales.push(sale);
            Ok(())
        })
        .await
        .map_err(tracerr::wrap!())
    }
}
