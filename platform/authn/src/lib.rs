//! Client-side authentication state.
//!
//! [`storage`] is the durable key/value area the client persists into;
//! [`session`] owns the current identity on top of it.

pub mod session;
pub mod storage;

pub use session::{RESULT_KEY, Session, SessionError, SessionStore, TOKEN_KEY, USER_KEY};
pub use storage::{Change, FileStore, KeyValueStore, MemoryStore, StorageError};
