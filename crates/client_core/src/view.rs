use tokio::sync::{Mutex, RwLock};

use crate::{
    controller::OptimisticController,
    error::MutationError,
    list_state::ListState,
    remote::{DraftOf, IdOf, RecordOf, RemoteStore},
};

/// What a list screen holds: the rows it renders, the controller that edits
/// them, and the message of the last failed action.
pub struct ResourceView<S: RemoteStore> {
    controller: OptimisticController<S>,
    list: RwLock<ListState<RecordOf<S>>>,
    last_error: Mutex<Option<String>>,
}

impl<S: RemoteStore> ResourceView<S> {
    pub fn new(store: S) -> Self {
        Self {
            controller: OptimisticController::new(store),
            list: RwLock::new(ListState::new()),
            last_error: Mutex::new(None),
        }
    }

    pub async fn snapshot(&self) -> ListState<RecordOf<S>> {
        self.list.read().await.clone()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.last_error.lock().await.clone()
    }

    pub async fn reload(&self) -> Result<usize, MutationError> {
        self.begin_action().await;
        let result = self.controller.reload(&self.list).await;
        self.record_outcome(result).await
    }

    pub async fn create(&self, draft: DraftOf<S>) -> Result<RecordOf<S>, MutationError> {
        self.begin_action().await;
        let result = self.controller.create(&self.list, draft).await;
        self.record_outcome(result).await
    }

    pub async fn rename(&self, id: &IdOf<S>, title: &str) -> Result<RecordOf<S>, MutationError> {
        self.begin_action().await;
        let result = self.controller.update(&self.list, id, title).await;
        self.record_outcome(result).await
    }

    pub async fn delete(&self, id: &IdOf<S>) -> Result<(), MutationError> {
        self.begin_action().await;
        let result = self.controller.delete(&self.list, id).await;
        self.record_outcome(result).await
    }

    async fn begin_action(&self) {
        *self.last_error.lock().await = None;
    }

    async fn record_outcome<T>(
        &self,
        result: Result<T, MutationError>,
    ) -> Result<T, MutationError> {
        if let Err(err) = &result {
            *self.last_error.lock().await = Some(err.message());
        }
        result
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
