//! Value objects - immutable types that represent domain concepts

mod record_id;
mod role;

pub use record_id::{MemberId, MemberKind, RecordId, RecordIdParseError, UserId, UserKind};
pub use role::Role;
