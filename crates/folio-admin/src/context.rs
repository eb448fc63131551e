//! AdminContext — override state for one page session.
//!
//! Mount protocol:
//! 1. seed overrides from the local cache, synchronously
//! 2. mark the session `loaded` (hosts keep content hidden until then)
//! 3. fetch the authoritative map from the remote in the background and
//!    replace the overrides wholesale when it arrives
//! 4. poll the unlock cookie on a fixed interval until unmounted
//!
//! Writes are optimistic: the local map and cache change immediately and
//! the remote call runs in the background. Remote calls are applied in the
//! order the writes were made, so a later write always lands after an
//! earlier one. A failed remote write is logged and the local value stays.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::task::{Context, Poll};
use std::time::Duration;

use folio_core::ContentMap;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::cache::LocalCache;
use crate::cookie::UnlockProbe;
use crate::remote::{ContentRemote, RemoteError};
use crate::source::{ContentEditor, ContentSource};

/// Client-side session state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminSession {
    pub is_admin: bool,
    pub overrides: ContentMap,
    pub loaded: bool,
}

/// Handle to the override state. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct AdminContext {
    inner: Arc<Inner>,
}

struct Inner {
    session: RwLock<AdminSession>,
    cache: Arc<dyn LocalCache>,
    remote: Arc<dyn ContentRemote>,
    probe: Arc<dyn UnlockProbe>,
    poll_interval: Duration,
    shutdown: watch::Sender<bool>,
    synced: watch::Sender<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    /// Completion signal of the most recently queued remote write.
    write_tail: Mutex<Option<oneshot::Receiver<()>>>,
}

impl Inner {
    fn read(&self) -> RwLockReadGuard<'_, AdminSession> {
        self.session.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, AdminSession> {
        self.session.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Re-check the unlock cookie and apply the locked/unlocked transition.
    fn sync_admin(&self) -> bool {
        let unlocked = self.probe.is_unlocked();
        let mut session = self.write();
        if session.is_admin != unlocked {
            info!(unlocked, "admin mode changed");
            session.is_admin = unlocked;
        }
        unlocked
    }
}

impl AdminContext {
    pub fn new(
        cache: Arc<dyn LocalCache>,
        remote: Arc<dyn ContentRemote>,
        probe: Arc<dyn UnlockProbe>,
        poll_interval: Duration,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        let (synced, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                session: RwLock::new(AdminSession::default()),
                cache,
                remote,
                probe,
                poll_interval,
                shutdown,
                synced,
                tasks: Mutex::new(Vec::new()),
                write_tail: Mutex::new(None),
            }),
        }
    }

    /// Seed from the cache, then start the remote refresh and cookie poller.
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount(&self) {
        let cached = self.inner.cache.load();
        {
            let mut session = self.inner.write();
            if !cached.is_empty() {
                debug!(count = cached.len(), "seeded overrides from local cache");
                session.overrides = cached;
            }
            session.loaded = true;
        }
        self.inner.sync_admin();

        self.inner.shutdown.send_replace(false);
        self.inner.synced.send_replace(false);

        let ctx = self.clone();
        let refresh = tokio::spawn(async move {
            ctx.refresh().await;
            ctx.inner.synced.send_replace(true);
        });
        let poll = tokio::spawn(poll_unlock(
            Arc::clone(&self.inner),
            self.inner.shutdown.subscribe(),
        ));

        let mut tasks = self.inner.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.push(refresh);
        tasks.push(poll);
        info!("admin context mounted");
    }

    /// Stop the poller and any pending refresh.
    pub fn unmount(&self) {
        let _ = self.inner.shutdown.send(true);
        let handles: Vec<_> = self
            .inner
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for handle in handles {
            handle.abort();
        }
        self.inner.write().loaded = false;
        info!("admin context unmounted");
    }

    /// Replace the overrides with the remote's map. Returns false (and keeps
    /// the current overrides) if the remote could not be reached.
    pub async fn refresh(&self) -> bool {
        match self.inner.remote.get_all().await {
            Ok(fresh) => {
                debug!(count = fresh.len(), "overrides refreshed from remote");
                self.inner.write().overrides = fresh.clone();
                self.inner.cache.store(&fresh);
                true
            }
            Err(e) => {
                warn!(error = %e, "override refresh failed, keeping cached content");
                false
            }
        }
    }

    /// Resolves once the refresh started by [`mount`](Self::mount) has finished.
    pub async fn wait_synced(&self) {
        let mut rx = self.inner.synced.subscribe();
        let _ = rx.wait_for(|done| *done).await;
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.read().loaded
    }

    pub fn session(&self) -> AdminSession {
        self.inner.read().clone()
    }

    /// Set an override. The new value is visible to `get_content` before
    /// this returns; the returned handle resolves when the remote write
    /// finishes.
    pub fn set_content(&self, key: &str, value: &str) -> PendingWrite {
        let snapshot = {
            let mut session = self.inner.write();
            session
                .overrides
                .insert(key.to_string(), value.to_string());
            session.overrides.clone()
        };
        self.inner.cache.store(&snapshot);

        self.enqueue(WriteOp::Set {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    /// Remove an override, locally at once and remotely in the background.
    pub fn delete_content(&self, key: &str) -> PendingWrite {
        let snapshot = {
            let mut session = self.inner.write();
            session.overrides.remove(key);
            session.overrides.clone()
        };
        self.inner.cache.store(&snapshot);

        self.enqueue(WriteOp::Delete {
            key: key.to_string(),
        })
    }

    /// Run a remote write once every earlier one has finished.
    fn enqueue(&self, op: WriteOp) -> PendingWrite {
        let (done, done_rx) = oneshot::channel();
        let previous = self
            .inner
            .write_tail
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(done_rx);
        let remote = Arc::clone(&self.inner.remote);
        PendingWrite::spawn(async move {
            if let Some(previous) = previous {
                // A dropped sender means the earlier write was aborted; go ahead.
                let _ = previous.await;
            }
            let result = op.apply(remote.as_ref()).await;
            let _ = done.send(());
            result
        })
    }
}

enum WriteOp {
    Set { key: String, value: String },
    Delete { key: String },
}

impl WriteOp {
    async fn apply(self, remote: &dyn ContentRemote) -> Result<(), RemoteError> {
        match self {
            WriteOp::Set { key, value } => remote.set(&key, &value).await.inspect_err(|e| {
                warn!(%key, error = %e, "remote content write failed, keeping local value");
            }),
            WriteOp::Delete { key } => remote.delete(&key).await.inspect_err(|e| {
                warn!(%key, error = %e, "remote content delete failed, keeping local state");
            }),
        }
    }
}

impl ContentEditor for AdminContext {
    fn set_content(&self, key: &str, value: &str) -> PendingWrite {
        AdminContext::set_content(self, key, value)
    }

    fn delete_content(&self, key: &str) -> PendingWrite {
        AdminContext::delete_content(self, key)
    }
}

impl ContentSource for AdminContext {
    fn get_content(&self, key: &str, fallback: &str) -> String {
        self.inner
            .read()
            .overrides
            .get(key)
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    }

    fn is_admin(&self) -> bool {
        self.inner.read().is_admin
    }
}

async fn poll_unlock(inner: Arc<Inner>, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(inner.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                inner.sync_admin();
            }
            _ = shutdown.changed() => break,
        }
    }
    debug!("unlock poller stopped");
}

/// An in-flight remote write. Awaiting it yields the remote outcome;
/// dropping it does not cancel the write.
pub struct PendingWrite {
    state: WriteState,
}

enum WriteState {
    Spawned(JoinHandle<Result<(), RemoteError>>),
    Ready(Option<Result<(), RemoteError>>),
}

impl PendingWrite {
    fn spawn<F>(fut: F) -> Self
    where
        F: Future<Output = Result<(), RemoteError>> + Send + 'static,
    {
        Self {
            state: WriteState::Spawned(tokio::spawn(fut)),
        }
    }

    /// A write that has already completed.
    pub fn ready(result: Result<(), RemoteError>) -> Self {
        Self {
            state: WriteState::Ready(Some(result)),
        }
    }
}

impl Future for PendingWrite {
    type Output = Result<(), RemoteError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().state {
            WriteState::Spawned(handle) => Pin::new(handle)
                .poll(cx)
                .map(|joined| joined.unwrap_or_else(|e| Err(RemoteError::Task(e.to_string())))),
            WriteState::Ready(result) => Poll::Ready(
                result
                    .take()
                    .unwrap_or_else(|| Err(RemoteError::Task("write polled after completion".into()))),
            ),
        }
    }
}
