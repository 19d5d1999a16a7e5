//! Identifier types for the terminal facility simulator
//!
//! Facilities, entry points, flights and crew locations are named in the
//! terminal configuration, so their identifiers wrap the configured string.
//! Crew members and cleaning tasks are numbered by the optimizer, and every
//! run gets a UUID so exported results can be told apart.

use super::Gender;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! named_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create an identifier from its configured name
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            /// The configured name
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

named_identifier!(
    /// Identifier of a restroom facility (e.g. `R1`)
    RestroomId
);

named_identifier!(
    /// Identifier of a gate or security checkpoint where passenger flow originates
    EntryPointId
);

named_identifier!(
    /// Identifier of a scheduled flight
    FlightId
);

named_identifier!(
    /// Any place a crew member can stand: a restroom, a crew base or the supply depot
    LocationId
);

impl From<&RestroomId> for LocationId {
    fn from(id: &RestroomId) -> Self {
        Self(id.0.clone())
    }
}

/// One gender-specific half of a restroom, the atomic unit of queueing
///
/// Rendered as `"{restroom}-{gender}"`, e.g. `R1-M`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId {
    /// Restroom the section belongs to
    pub restroom: RestroomId,
    /// Gender served by the section
    pub gender: Gender,
}

impl SectionId {
    /// Create a section identifier
    pub fn new(restroom: RestroomId, gender: Gender) -> Self {
        Self { restroom, gender }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.restroom, self.gender)
    }
}

impl FromStr for SectionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (restroom, gender) = s
            .rsplit_once('-')
            .ok_or_else(|| format!("Section id must look like '<restroom>-<M|F>': {}", s))?;
        if restroom.is_empty() {
            return Err(format!("Section id has an empty restroom part: {}", s));
        }
        Ok(Self { restroom: RestroomId::new(restroom), gender: gender.parse()? })
    }
}

impl Serialize for SectionId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SectionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Identifier of a cleaning crew member, numbered from 1 (`CREW_001`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CrewId(pub u32);

impl fmt::Display for CrewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREW_{:03}", self.0)
    }
}

impl Serialize for CrewId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CrewId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let digits = s.strip_prefix("CREW_").unwrap_or(&s);
        digits.parse().map(CrewId).map_err(serde::de::Error::custom)
    }
}

/// Identifier of a cleaning task
///
/// Task ids are opaque sequence numbers. The task category lives in
/// [`crate::crew::CleaningTask::cleaning_type`], never in the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TASK_{:05}", self.0)
    }
}

impl Serialize for TaskId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let digits = s.strip_prefix("TASK_").unwrap_or(&s);
        digits.parse().map(TaskId).map_err(serde::de::Error::custom)
    }
}

/// Unique identifier for a simulation or optimization run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Create a new random run ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RUN_{}", self.0.simple())
    }
}

impl Serialize for RunId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RunId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let raw = s.strip_prefix("RUN_").unwrap_or(&s);
        let uuid = Uuid::parse_str(raw).map_err(serde::de::Error::custom)?;
        Ok(RunId(uuid))
    }
}
