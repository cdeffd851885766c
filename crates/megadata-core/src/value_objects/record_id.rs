//! Backend record identifiers
//!
//! The backend hands out integer primary keys but is not consistent about
//! sending them as JSON numbers or strings, so both are accepted on input.
//! On output they are always numbers.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// Integer identifier tagged with the kind of record it points at
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId<K> {
    value: i64,
    kind: PhantomData<fn() -> K>,
}

/// Tag for church members registered by a berger
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MemberKind {}

/// Tag for login accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UserKind {}

/// Identifier of a church member
pub type MemberId = RecordId<MemberKind>;

/// Identifier of a login account
pub type UserId = RecordId<UserKind>;

impl<K> RecordId<K> {
    /// Create an identifier from a raw backend key
    #[inline]
    pub const fn new(value: i64) -> Self {
        Self {
            value,
            kind: PhantomData,
        }
    }

    /// Get the raw backend key
    #[inline]
    pub const fn into_inner(self) -> i64 {
        self.value
    }

    /// Backend keys start at 1; zero means "never assigned"
    #[inline]
    pub const fn is_assigned(&self) -> bool {
        self.value > 0
    }

    /// Parse from string representation
    pub fn parse(s: &str) -> Result<Self, RecordIdParseError> {
        s.trim()
            .parse::<i64>()
            .map(Self::new)
            .map_err(|_| RecordIdParseError::InvalidFormat(s.to_string()))
    }
}

// Manual impls: the derive would require `K: Clone`/`K: Default`.
impl<K> Clone for RecordId<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for RecordId<K> {}

impl<K> Default for RecordId<K> {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Error when parsing an identifier from a string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordIdParseError {
    #[error("invalid identifier: {0}")]
    InvalidFormat(String),
}

impl<K> fmt::Display for RecordId<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<K> From<i64> for RecordId<K> {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl<K> std::str::FromStr for RecordId<K> {
    type Err = RecordIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<K> Serialize for RecordId<K> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.value)
    }
}

// Deserialize from string or number
impl<'de, K> Deserialize<'de> for RecordId<K> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct RecordIdVisitor<K>(PhantomData<fn() -> K>);

        impl<K> Visitor<'_> for RecordIdVisitor<K> {
            type Value = RecordId<K>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer record identifier")
            }

            fn visit_i64<E>(self, value: i64) -> Result<RecordId<K>, E>
            where
                E: de::Error,
            {
                Ok(RecordId::new(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<RecordId<K>, E>
            where
                E: de::Error,
            {
                i64::try_from(value)
                    .map(RecordId::new)
                    .map_err(|_| de::Error::custom("identifier out of range"))
            }

            fn visit_str<E>(self, value: &str) -> Result<RecordId<K>, E>
            where
                E: de::Error,
            {
                RecordId::parse(value).map_err(|_| de::Error::custom("invalid identifier string"))
            }
        }

        deserializer.deserialize_any(RecordIdVisitor(PhantomData))
    }
}
