use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::oneshot;

use crate::error::FetchError;
use crate::view::{BulkActionHandler, CollectionSource};

type Reply<R> = Result<Vec<R>, FetchError>;

/// Source whose responses are controlled by the test.
///
/// Each call to [`push_pending`](Self::push_pending) queues one fetch that
/// resolves when the returned sender fires. With no queued replies a fetch
/// resolves immediately with the fallback.
pub struct ScriptedSource<R> {
    replies: Mutex<VecDeque<oneshot::Receiver<Reply<R>>>>,
    fallback: Mutex<Reply<R>>,
    calls: AtomicUsize,
}

impl<R> ScriptedSource<R> {
    pub fn new(items: Vec<R>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(Ok(items)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: FetchError) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(Err(error)),
            calls: AtomicUsize::new(0),
        }
    }

    /// Queue a fetch that resolves when the sender fires.
    pub fn push_pending(&self) -> oneshot::Sender<Reply<R>> {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().push_back(rx);
        tx
    }

    pub fn set_fallback(&self, reply: Reply<R>) {
        *self.fallback.lock() = reply;
    }

    /// Number of fetches started so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<R: Clone + Send + Sync> CollectionSource<R> for ScriptedSource<R> {
    async fn fetch_collection(&self) -> Result<Vec<R>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let queued = self.replies.lock().pop_front();
        let Some(reply) = queued else {
            return self.fallback.lock().clone();
        };
        reply
            .await
            .unwrap_or_else(|_| Err(FetchError::new("scripted reply dropped")))
    }
}

/// Bulk action handler recording every call.
pub struct RecordingHandler<Id> {
    calls: Mutex<Vec<(String, Vec<Id>)>>,
    failure: Option<String>,
}

impl<Id> Default for RecordingHandler<Id> {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: None,
        }
    }
}

impl<Id: Clone> RecordingHandler<Id> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handler that records the call and then fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: Some(message.into()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Vec<Id>)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl<Id: Clone + Send + Sync> BulkActionHandler<Id> for RecordingHandler<Id> {
    async fn handle(&self, action: &str, ids: &[Id]) -> anyhow::Result<()> {
        self.calls.lock().push((action.to_string(), ids.to_vec()));
        match &self.failure {
            Some(message) => anyhow::bail!("{action} failed: {message}"),
            None => Ok(()),
        }
    }
}
