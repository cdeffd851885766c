//! Domain events

mod session_event;

pub use session_event::{SessionEvent, SessionIdentity};
