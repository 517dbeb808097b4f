use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use super::checklist::ChecklistState;
use super::dto::{ShoppingListView, ViewStatus, FAILED_MESSAGE};
use super::fetch::ShoppingListError;
use super::services::ShoppingList;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no shopping list is open")]
    NoList,

    #[error("ingredient {0} is not on the shopping list")]
    UnknownItem(i64),
}

/// Identifies one generation request; stale once the session epoch moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationToken {
    user_id: Uuid,
    epoch: u64,
}

impl GenerationToken {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// A generation in flight. Dropping it before [`Generation::finish`]
/// (a client hanging up mid-request) fails it, so the view cannot stay
/// pending.
#[must_use]
pub struct Generation<'a> {
    sessions: &'a ShoppingSessions,
    token: GenerationToken,
    finished: bool,
}

impl Generation<'_> {
    pub fn token(&self) -> GenerationToken {
        self.token
    }

    /// Publishes the outcome. Returns false if the generation was stale.
    pub fn finish(mut self, outcome: Result<ShoppingList, ShoppingListError>) -> bool {
        self.finished = true;
        self.sessions.complete(self.token, outcome)
    }
}

impl Drop for Generation<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.sessions.abandon(self.token);
        }
    }
}

#[derive(Debug, Default)]
enum Stage {
    #[default]
    Idle,
    Pending,
    Ready(ShoppingList),
    Failed,
}

#[derive(Debug, Default)]
struct Session {
    epoch: u64,
    stage: Stage,
    checklist: ChecklistState,
}

impl Session {
    fn view(&self) -> ShoppingListView {
        match &self.stage {
            Stage::Idle => ShoppingListView::without_list(ViewStatus::Idle, None),
            Stage::Pending => ShoppingListView::without_list(ViewStatus::Pending, None),
            Stage::Failed => {
                ShoppingListView::without_list(ViewStatus::Failed, Some(FAILED_MESSAGE))
            }
            Stage::Ready(list) => ShoppingListView::from_list(list, &self.checklist),
        }
    }
}

/// Per-user shopping-list views and their checklists.
///
/// Entries are never removed so epochs stay monotonic for the process
/// lifetime.
#[derive(Clone, Default)]
pub struct ShoppingSessions {
    inner: Arc<Mutex<HashMap<Uuid, Session>>>,
}

impl ShoppingSessions {
    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Session>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Starts a generation, superseding any still in flight.
    pub fn begin(&self, user_id: Uuid) -> GenerationToken {
        let mut sessions = self.lock();
        let session = sessions.entry(user_id).or_default();
        session.epoch += 1;
        session.stage = Stage::Pending;
        GenerationToken {
            user_id,
            epoch: session.epoch,
        }
    }

    /// Like [`begin`](Self::begin), but fails the generation if the returned
    /// guard is dropped unfinished.
    pub fn start(&self, user_id: Uuid) -> Generation<'_> {
        Generation {
            sessions: self,
            token: self.begin(user_id),
            finished: false,
        }
    }

    /// Publishes a finished generation. Returns false if it was stale.
    pub fn complete(
        &self,
        token: GenerationToken,
        outcome: Result<ShoppingList, ShoppingListError>,
    ) -> bool {
        let mut sessions = self.lock();
        let session = sessions.entry(token.user_id).or_default();
        if session.epoch != token.epoch {
            debug!(
                user_id = %token.user_id,
                stale = token.epoch,
                current = session.epoch,
                "discarding stale shopping list"
            );
            return false;
        }
        session.stage = match outcome {
            Ok(list) => Stage::Ready(list),
            Err(_) => Stage::Failed,
        };
        session.checklist = ChecklistState::new();
        true
    }

    fn abandon(&self, token: GenerationToken) {
        let mut sessions = self.lock();
        let Some(session) = sessions.get_mut(&token.user_id) else {
            return;
        };
        if session.epoch == token.epoch && matches!(session.stage, Stage::Pending) {
            warn!(user_id = %token.user_id, epoch = token.epoch, "shopping list generation abandoned");
            session.stage = Stage::Failed;
            session.checklist = ChecklistState::new();
        }
    }

    /// Drops the current view and invalidates in-flight generations.
    pub fn close(&self, user_id: Uuid) {
        let mut sessions = self.lock();
        let session = sessions.entry(user_id).or_default();
        session.epoch += 1;
        session.stage = Stage::Idle;
        session.checklist.clear_all();
    }

    pub fn view(&self, user_id: Uuid) -> ShoppingListView {
        self.lock()
            .get(&user_id)
            .map(Session::view)
            .unwrap_or_else(|| ShoppingListView::without_list(ViewStatus::Idle, None))
    }

    pub fn toggle(&self, user_id: Uuid, ingredient_id: i64) -> Result<ShoppingListView, SessionError> {
        let mut sessions = self.lock();
        let session = sessions.get_mut(&user_id).ok_or(SessionError::NoList)?;
        let Stage::Ready(list) = &session.stage else {
            return Err(SessionError::NoList);
        };
        if !list.contains(ingredient_id) {
            return Err(SessionError::UnknownItem(ingredient_id));
        }
        session.checklist.toggle(ingredient_id);
        Ok(session.view())
    }

    pub fn clear_checked(&self, user_id: Uuid) -> Result<ShoppingListView, SessionError> {
        let mut sessions = self.lock();
        let session = sessions.get_mut(&user_id).ok_or(SessionError::NoList)?;
        if !matches!(session.stage, Stage::Ready(_)) {
            return Err(SessionError::NoList);
        }
        session.checklist.clear_all();
        Ok(session.view())
    }
}
