use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A protocol number that does not belong to any supported release.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported protocol version: {0}")]
pub struct UnknownProtocol(pub String);

/// Supported game releases, oldest first.
///
/// Releases sharing a protocol number (1.8.x, 1.9.3/1.9.4, 1.10.x, 1.11.1/1.11.2)
/// are represented once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum ProtocolVersion {
    V1_8,
    V1_9,
    V1_9_1,
    V1_9_2,
    V1_9_4,
    V1_10,
    V1_11,
    V1_11_2,
    V1_12,
    V1_12_1,
    V1_12_2,
}

impl ProtocolVersion {
    pub const ALL: [ProtocolVersion; 11] = [
        ProtocolVersion::V1_8,
        ProtocolVersion::V1_9,
        ProtocolVersion::V1_9_1,
        ProtocolVersion::V1_9_2,
        ProtocolVersion::V1_9_4,
        ProtocolVersion::V1_10,
        ProtocolVersion::V1_11,
        ProtocolVersion::V1_11_2,
        ProtocolVersion::V1_12,
        ProtocolVersion::V1_12_1,
        ProtocolVersion::V1_12_2,
    ];

    /// The number sent in the handshake packet.
    pub fn protocol(self) -> i32 {
        match self {
            ProtocolVersion::V1_8 => 47,
            ProtocolVersion::V1_9 => 107,
            ProtocolVersion::V1_9_1 => 108,
            ProtocolVersion::V1_9_2 => 109,
            ProtocolVersion::V1_9_4 => 110,
            ProtocolVersion::V1_10 => 210,
            ProtocolVersion::V1_11 => 315,
            ProtocolVersion::V1_11_2 => 316,
            ProtocolVersion::V1_12 => 335,
            ProtocolVersion::V1_12_1 => 338,
            ProtocolVersion::V1_12_2 => 340,
        }
    }

    pub fn from_protocol(protocol: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.protocol() == protocol)
    }

    pub fn name(self) -> &'static str {
        match self {
            ProtocolVersion::V1_8 => "1.8",
            ProtocolVersion::V1_9 => "1.9",
            ProtocolVersion::V1_9_1 => "1.9.1",
            ProtocolVersion::V1_9_2 => "1.9.2",
            ProtocolVersion::V1_9_4 => "1.9.4",
            ProtocolVersion::V1_10 => "1.10",
            ProtocolVersion::V1_11 => "1.11",
            ProtocolVersion::V1_11_2 => "1.11.2",
            ProtocolVersion::V1_12 => "1.12",
            ProtocolVersion::V1_12_1 => "1.12.1",
            ProtocolVersion::V1_12_2 => "1.12.2",
        }
    }

    /// 1.9 "Combat Update" or later: dual wielding, split block placement.
    pub fn is_combat_or_later(self) -> bool {
        self >= ProtocolVersion::V1_9
    }

    /// 1.10 "Frostburn Update" or later.
    pub fn is_frostburn_or_later(self) -> bool {
        self >= ProtocolVersion::V1_10
    }

    /// 1.11 "Exploration Update" or later.
    pub fn is_exploration_or_later(self) -> bool {
        self >= ProtocolVersion::V1_11
    }

    /// 1.12 "World of Color Update" or later.
    pub fn is_world_of_color_or_later(self) -> bool {
        self >= ProtocolVersion::V1_12
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (protocol {})", self.name(), self.protocol())
    }
}

impl TryFrom<i32> for ProtocolVersion {
    type Error = UnknownProtocol;

    fn try_from(protocol: i32) -> Result<Self, Self::Error> {
        Self::from_protocol(protocol).ok_or_else(|| UnknownProtocol(protocol.to_string()))
    }
}

impl From<ProtocolVersion> for i32 {
    fn from(version: ProtocolVersion) -> Self {
        version.protocol()
    }
}

/// Accepts either a release name ("1.12.2", "1.8.9") or a protocol number ("340").
impl FromStr for ProtocolVersion {
    type Err = UnknownProtocol;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(protocol) = s.parse::<i32>() {
            return Self::try_from(protocol);
        }
        if let Some(v) = Self::ALL.into_iter().find(|v| v.name() == s) {
            return Ok(v);
        }
        match s {
            s if s.starts_with("1.8.") => Ok(ProtocolVersion::V1_8),
            "1.9.3" => Ok(ProtocolVersion::V1_9_4),
            "1.10.1" | "1.10.2" => Ok(ProtocolVersion::V1_10),
            "1.11.1" => Ok(ProtocolVersion::V1_11_2),
            _ => Err(UnknownProtocol(s.to_string())),
        }
    }
}
