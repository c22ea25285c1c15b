//! [`Database`] implementations.

mod sale;
mod vehicle;

use common::operations::{Commit, Transact};
use tracerr::Traced;

use crate::infra::{database, Database};

use super::{Memory, NonTx, Tx};

impl Database<Transact> for Memory<NonTx> {
    type Ok = Memory<Tx>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(Memory(self.0.begin().await))
    }
}

impl Database<Transact> for Memory<Tx> {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        self.commit().await.map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Commit, Insert, Select, Transact};

    use crate::{
        domain::{vehicle, Vehicle},
        infra::{database::Memory, Database as _},
    };

    async fn count(db: &Memory) -> usize {
        db.execute(Select(By::<Vec<Vehicle>, _>::new(Default::default())))
            .await
            .unwrap()
            .len()
    }

    #[tokio::test]
    async fn publishes_changes_on_commit() {
        let db = Memory::new();

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Insert(vehicle::spec::vehicle(50_000)))
            .await
            .unwrap();
        tx.execute(Commit).await.unwrap();

        assert_eq!(count(&db).await, 1);
    }

    #[tokio::test]
    async fn discards_changes_without_commit() {
        let db = Memory::new();

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Insert(vehicle::spec::vehicle(50_000)))
            .await
            .unwrap();
        drop(tx);

        assert_eq!(count(&db).await, 0);
    }

    #[tokio::test]
    async fn rejects_usage_after_commit() {
        let db = Memory::new();

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Commit).await.unwrap();

        assert!(tx.execute(Commit).await.is_err());
        assert!(tx
            .execute(Insert(vehicle::spec::vehicle(50_000)))
            .await
            .is_err());
    }
}
