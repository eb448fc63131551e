//! folio-admin — the in-page content-editing runtime.
//!
//! The [`AdminContext`] is the single source of truth for a page session:
//! whether the viewer is in edit mode and the resolved value of every
//! overridable content key. It is an explicit handle passed to whatever
//! renders content; nothing here is a process global.
//!
//! - [`editor`]: the same write capability applied directly to a local store
//! - [`cache`]: the local persisted override slot read before first paint
//! - [`remote`]: the content API the context writes through to
//! - [`cookie`]: the unlock cookie whose presence means "admin"
//! - [`gesture`]: hidden keyboard-chord and tap-sequence unlock detectors
//! - [`reorder`]: stored-order reconciliation and drag reordering

pub mod cache;
pub mod context;
pub mod cookie;
pub mod editor;
pub mod gesture;
pub mod remote;
pub mod reorder;
pub mod source;

pub use cache::{FileCache, LocalCache, MemoryCache};
pub use context::{AdminContext, AdminSession, PendingWrite};
pub use cookie::{CookieJar, UnlockProbe};
pub use editor::StoreEditor;
pub use gesture::{ChordDetector, TapDetector, chord_keys};
pub use remote::{ContentRemote, HttpRemote, RemoteError, StoreRemote};
pub use reorder::{ReorderList, move_key, reconcile};
pub use source::{ContentEditor, ContentSource, Snapshot};
