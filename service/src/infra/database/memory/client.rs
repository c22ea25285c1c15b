//! Memory database client definitions.

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracerr::Traced;

use crate::infra::database::{
    self,
    memory::{self, Connection, State},
};

/// Non-transactional memory database client.
#[derive(Clone, Debug, Default)]
pub struct NonTx {
    /// Published [`State`], shared by all the clones of this client.
    state: Arc<Mutex<State>>,
}

impl NonTx {
    /// Begins a new [`Tx`], waiting for the currently running one to finish.
    pub(crate) async fn begin(&self) -> Tx {
        let published = Arc::clone(&self.state).lock_owned().await;
        let staged = published.clone();
        Tx {
            inner: Arc::new(Mutex::new(Some(Staged { published, staged }))),
        }
    }
}

impl Connection for NonTx {
    async fn read<R>(
        &self,
        f: impl FnOnce(&State) -> R,
    ) -> Result<R, Traced<database::Error>> {
        Ok(f(&*self.state.lock().await))
    }

    async fn write<R>(
        &self,
        f: impl FnOnce(&mut State) -> Result<R, memory::Error>,
    ) -> Result<R, Traced<database::Error>> {
        let mut state = self.state.lock().await;
        f(&mut state)
            .map_err(tracerr::from_and_wrap!(=> memory::Error))
            .map_err(tracerr::map_from)
    }
}

/// Transactional memory database client.
///
/// Changes are made to a staged copy of the [`State`], which replaces the
/// published one on [`Tx::commit()`]. Dropping the last clone of an
/// uncommitted [`Tx`] discards the changes.
#[derive(Clone, Debug)]
pub struct Tx {
    /// Staged changes, or [`None`] once committed.
    inner: Arc<Mutex<Option<Staged>>>,
}

/// Staged changes of a [`Tx`].
#[derive(Debug)]
struct Staged {
    /// Lock of the published [`State`], held for the whole [`Tx`].
    published: OwnedMutexGuard<State>,

    /// [`State`] modified by the [`Tx`].
    staged: State,
}

impl Tx {
    /// Publishes the changes made in this [`Tx`].
    ///
    /// # Errors
    ///
    /// If this [`Tx`] is committed already.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        let Staged {
            mut published,
            staged,
        } = self
            .inner
            .lock()
            .await
            .take()
            .ok_or_else(|| tracerr::new!(memory::Error::Committed))
            .map_err(tracerr::map_from)?;
        *published = staged;
        Ok(())
    }
}

impl Connection for Tx {
    async fn read<R>(
        &self,
        f: impl FnOnce(&State) -> R,
    ) -> Result<R, Traced<database::Error>> {
        let inner = self.inner.lock().await;
        let Staged { staged, .. } = inner
            .as_ref()
            .ok_or_else(|| tracerr::new!(memory::Error::Committed))
            .map_err(tracerr::map_from)?;
        Ok(f(staged))
    }

    async fn write<R>(
        &self,
        f: impl FnOnce(&mut State) -> Result<R, memory::Error>,
    ) -> Result<R, Traced<database::Error>> {
        let mut inner = self.inner.lock().await;
        let Staged { staged, .. } = inner
            .as_mut()
            .ok_or_else(|| tracerr::new!(memory::Error::Committed))
            .map_err(tracerr::map_from)?;
        f(staged)
            .map_err(tracerr::from_and_wrap!(=> memory::Error))
            .map_err(tracerr::map_from)
    }
}
