//! # megadata-core
//!
//! Domain layer containing entities, value objects, the screen access guard
//! and the attendance sheet state machine.
//! This crate has zero dependencies on infrastructure (HTTP, storage, runtime).

pub mod access;
pub mod attendance;
pub mod entities;
pub mod error;
pub mod events;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use access::{GuardDecision, RedirectReason, RouteConstraint, Screen};
pub use attendance::{
    AttendanceLedger, AttendanceStats, Confirmation, LedgerEntry, MemberStats, PresenceState,
};
pub use entities::{AttendanceRecord, Member, NewMember, RoleBreakdown, Session, UserAccount};
pub use error::DomainError;
pub use events::{SessionEvent, SessionIdentity};
pub use value_objects::{MemberId, RecordId, RecordIdParseError, Role, UserId};
