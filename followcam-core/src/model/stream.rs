use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub const STREAM_ID_LEN: usize = 8;

/// Короткое имя трансляции, которое оператор передает зрителям вне системы.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(transparent)]
pub struct StreamId(String);

impl StreamId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Eight lowercase latin letters drawn from a fresh v4 uuid.
    pub fn generate() -> Self {
        let mut bits = Uuid::new_v4().as_u128();
        let id = (0..STREAM_ID_LEN)
            .map(|_| {
                let letter = (b'a' + (bits % 26) as u8) as char;
                bits /= 26;
                letter
            })
            .collect::<String>();

        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StreamId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for StreamId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
