// Shared identifiers and small helpers used across crest crates.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid id: {0}")]
    InvalidId(String),
}

/// Unique identifier for a persisted score record.
///
/// ```
/// use crest_common::ScoreId;
/// use std::str::FromStr;
///
/// let id = ScoreId::new();
/// let parsed = ScoreId::from_str(&id.to_string()).expect("parse");
/// assert_eq!(id, parsed);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ScoreId(Uuid);

impl ScoreId {
    // Generated once at record creation, immutable afterwards.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ScoreId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ScoreId {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        // Preserve the original input for clearer error messages.
        let uuid = Uuid::parse_str(input).map_err(|_| Error::InvalidId(input.into()))?;
        Ok(Self(uuid))
    }
}

/// Stable user identifier issued by the identity provider.
///
/// The wrapper preserves the raw value; emptiness is rejected at the
/// registry and identity boundaries rather than in the constructor.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque transport-assigned address of one live push channel.
///
/// ```
/// use crest_common::ChannelAddress;
///
/// let address = ChannelAddress::new("conn-1");
/// assert_eq!(address.as_str(), "conn-1");
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ChannelAddress(String);

impl ChannelAddress {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Seconds-resolution wall clock used for submission and lifecycle stamps.
pub fn now_epoch_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or(0)
}
