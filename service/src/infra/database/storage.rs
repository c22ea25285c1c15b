//! [`Storage`] definitions.

use common::operations::{By, Commit, Insert, Lock, Select, Transact, Update};
use tracerr::Traced;

use crate::{
    domain::{vehicle, Sale, Vehicle},
    infra::{
        database::{self, Memory, Postgres},
        Database,
    },
    read,
};

/// [`Database`] backend chosen at runtime.
#[derive(Clone, Debug)]
pub enum Storage<M = Memory, P = Postgres> {
    /// [`Memory`] backend.
    Memory(M),

    /// [`Postgres`] backend.
    Postgres(P),
}

impl<M, P> Database<Transact> for Storage<M, P>
where
    M: Database<Transact, Err = Traced<database::Error>>,
    P: Database<Transact, Err = Traced<database::Error>>,
{
    type Ok = Storage<M::Ok, P::Ok>;
    type Err = Traced<database::Error>;

    async fn execute(&self, op: Transact) -> Result<Self::Ok, Self::Err> {
        match self {
            Self::Memory(db) => db.execute(op).await.map(Storage::Memory),
            Self::Postgres(db) => db.execute(op).await.map(Storage::Postgres),
        }
        .map_err(tracerr::wrap!())
    }
}

/// Implements [`Database`] operations for [`Storage`] by delegating them to
/// the chosen backend.
macro_rules! delegate {
    ($($op:ty),* $(,)?) => {$(
        impl<M, P> Database<$op> for Storage<M, P>
        where
            M: Database<$op, Err = Traced<database::Error>>,
            P: Database<
                $op,
                Ok = <M as Database<$op>>::Ok,
                Err = Traced<database::Error>,
            >,
        {
            type Ok = <M as Database<$op>>::Ok;
            type Err = Traced<database::Error>;

            async fn execute(&self, op: $op) -> Result<Self::Ok, Self::Err> {
                match self {
                    Self::Memory(db) => db.execute(op).await,
                    Self::Postgres(db) => db.execute(op).await,
                }
                .map_err(tracerr::wrap!())
            }
        }
    )*};
}

delegate!(
    Commit,
    Insert<Sale>,
    Insert<Vehicle>,
    Lock<By<Vehicle, vehicle::Id>>,
    Select<By<Option<Vehicle>, vehicle::Id>>,
    Select<By<Vec<Sale>, ()>>,
    Select<By<Vec<Vehicle>, read::vehicle::list::Filter>>,
    Update<Vehicle>,
    Update<vehicle::SoldTransition>,
);
