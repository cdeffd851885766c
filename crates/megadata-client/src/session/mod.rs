//! Session persistence and change notification

mod storage;
mod store;

pub use storage::{FileSessionStorage, MemorySessionStorage, SessionStorage};
pub use store::SessionStore;
