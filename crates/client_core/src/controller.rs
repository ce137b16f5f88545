use shared::{
    domain::Record,
    resource::{validate_title, Resource},
};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::{
    error::{MutationError, MutationKind},
    list_state::ListState,
    remote::{DraftOf, IdOf, RecordOf, RemoteStore, TitlePatch},
};

/// A local edit waiting on its remote call.
///
/// Holds the list as it was just before the edit. Dropped via [`commit`]
/// once the store confirms, or consumed by [`rollback`] to put the list back.
///
/// [`commit`]: PendingMutation::commit
/// [`rollback`]: PendingMutation::rollback
#[derive(Debug)]
pub struct PendingMutation<T: Record> {
    kind: MutationKind,
    prior_snapshot: ListState<T>,
    target_id: Option<T::Id>,
}

impl<T: Record> PendingMutation<T> {
    pub fn begin(kind: MutationKind, current: &ListState<T>, target_id: Option<T::Id>) -> Self {
        Self {
            kind,
            prior_snapshot: current.clone(),
            target_id,
        }
    }

    pub fn kind(&self) -> MutationKind {
        self.kind
    }

    pub fn target_id(&self) -> Option<&T::Id> {
        self.target_id.as_ref()
    }

    pub fn prior_snapshot(&self) -> &ListState<T> {
        &self.prior_snapshot
    }

    pub fn commit(self) {
        debug!(kind = %self.kind, target = ?self.target_id, "mutation committed");
    }

    pub fn rollback(self, state: &mut ListState<T>) {
        warn!(kind = %self.kind, target = ?self.target_id, "rolling back optimistic edit");
        *state = self.prior_snapshot;
    }
}

/// Applies list edits locally first and reconciles them with a remote store.
///
/// The controller keeps no list of its own: callers pass the view's
/// `RwLock<ListState<_>>` to every call. The lock is held only while the
/// list is snapshotted, edited or restored, never across the remote call.
///
/// Each call snapshots the list when it starts. Two calls in flight at once
/// therefore restore their own snapshots on failure, and a rollback can undo
/// the other call's optimistic edit. Callers that allow concurrent edits from
/// the same view must serialize them per id.
pub struct OptimisticController<S: RemoteStore> {
    store: S,
}

impl<S: RemoteStore> OptimisticController<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Replaces the list with a fresh store listing. Returns the row count.
    pub async fn reload(&self, state: &RwLock<ListState<RecordOf<S>>>) -> Result<usize, MutationError> {
        match self.store.list().await {
            Ok(records) => {
                let next = ListState::from_snapshot(records);
                let count = next.len();
                *state.write().await = next;
                debug!(count, "list reloaded");
                Ok(count)
            }
            Err(err) => {
                warn!(error = %err, "list reload failed");
                Err(MutationError::LoadFailed {
                    message: format!("{err:#}"),
                })
            }
        }
    }

    /// Inserts through the store, then prepends the confirmed record.
    ///
    /// Nothing is shown before the store answers because the id is only
    /// known afterwards. Invalid drafts never reach the store.
    pub async fn create(
        &self,
        state: &RwLock<ListState<RecordOf<S>>>,
        draft: DraftOf<S>,
    ) -> Result<RecordOf<S>, MutationError> {
        let draft = <S::Resource as Resource>::validate_draft(&draft)?;

        match self.store.create(&draft).await {
            Ok(record) => {
                let mut guard = state.write().await;
                *guard = guard.prepend(record.clone());
                debug!(id = %record.id(), "record created");
                Ok(record)
            }
            Err(err) => {
                warn!(error = %err, "create failed");
                Err(MutationError::remote(MutationKind::Create, None, &err))
            }
        }
    }

    /// Retitles `id` locally, then remotely; restores the prior list if the
    /// store refuses. On success the store's echo replaces the local copy.
    pub async fn update(
        &self,
        state: &RwLock<ListState<RecordOf<S>>>,
        id: &IdOf<S>,
        title: &str,
    ) -> Result<RecordOf<S>, MutationError> {
        let title = validate_title(<S::Resource as Resource>::TITLE_FIELD, title)?;

        let pending = {
            let mut guard = state.write().await;
            let pending = PendingMutation::begin(MutationKind::Update, &guard, Some(id.clone()));
            *guard = guard.update_title_by_id(id, &title);
            pending
        };

        match self.store.update(id, &TitlePatch::new(title)).await {
            Ok(record) => {
                let mut guard = state.write().await;
                *guard = guard.replace_by_id(&record);
                pending.commit();
                Ok(record)
            }
            Err(err) => {
                let mut guard = state.write().await;
                pending.rollback(&mut guard);
                Err(MutationError::remote(
                    MutationKind::Update,
                    Some(id.to_string()),
                    &err,
                ))
            }
        }
    }

    /// Drops `id` locally, then remotely; restores the prior list if the
    /// store refuses.
    pub async fn delete(
        &self,
        state: &RwLock<ListState<RecordOf<S>>>,
        id: &IdOf<S>,
    ) -> Result<(), MutationError> {
        let pending = {
            let mut guard = state.write().await;
            let pending = PendingMutation::begin(MutationKind::Delete, &guard, Some(id.clone()));
            *guard = guard.remove_by_id(id);
            pending
        };

        match self.store.remove(id).await {
            Ok(()) => {
                pending.commit();
                Ok(())
            }
            Err(err) => {
                let mut guard = state.write().await;
                pending.rollback(&mut guard);
                Err(MutationError::remote(
                    MutationKind::Delete,
                    Some(id.to_string()),
                    &err,
                ))
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
