//! Configuration source subsystem.
//!
//! # Data Flow
//! ```text
//! property store (remote service / TOML file / in-memory)
//!     → ConfigSource::fetch(owner)
//!     → Vec<ConfigEntry> (wire form: name + stringValue/listValue/mapValue)
//!     → EntryValue (one active case per entry)
//!     → consumed by routing::table when a snapshot is derived
//! ```
//!
//! # Design Decisions
//! - Entries are immutable once fetched
//! - The loosely typed wire form is collapsed into a tagged [`EntryValue`] at
//!   deserialization; consumers check the case they expect
//! - Sources do no caching of their own

pub mod file;
pub mod http;
pub mod memory;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use file::FileConfigSource;
pub use http::HttpConfigSource;
pub use memory::MemoryConfigSource;

static EMPTY_MAP: BTreeMap<String, String> = BTreeMap::new();

/// Errors raised while fetching configuration entries.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The store could not be reached.
    #[error("configuration store unavailable: {0}")]
    Unavailable(String),

    /// The store answered with a non-success status.
    #[error("configuration store returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The store answered with something that is not a list of entries.
    #[error("failed to decode configuration entries: {0}")]
    Decode(String),

    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Anything that can return all configuration entries for an owner name.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Fetch every entry stored for `owner`. All returned entries come from
    /// one read of the store.
    async fn fetch(&self, owner: &str) -> Result<Vec<ConfigEntry>, SourceError>;
}

/// The value carried by a configuration entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValue {
    Scalar(String),
    List(Vec<String>),
    Map(BTreeMap<String, String>),
    /// All three wire fields were absent or empty.
    Empty,
}

impl EntryValue {
    /// The list value. `Empty` reads as an empty list.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            EntryValue::List(list) => Some(list),
            EntryValue::Empty => Some(&[]),
            _ => None,
        }
    }

    /// The map value. `Empty` reads as an empty map.
    pub fn as_map(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            EntryValue::Map(map) => Some(map),
            EntryValue::Empty => Some(&EMPTY_MAP),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            EntryValue::Scalar(value) => Some(value),
            EntryValue::Empty => Some(""),
            _ => None,
        }
    }

    /// Name of the active case, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            EntryValue::Scalar(_) => "string",
            EntryValue::List(_) => "list",
            EntryValue::Map(_) => "map",
            EntryValue::Empty => "empty",
        }
    }
}

/// A named configuration entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "WireEntry", into = "WireEntry")]
pub struct ConfigEntry {
    pub name: String,
    pub value: EntryValue,
}

impl ConfigEntry {
    pub fn new(name: impl Into<String>, value: EntryValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn scalar(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, EntryValue::Scalar(value.into()))
    }

    pub fn list<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, EntryValue::List(values.into_iter().map(Into::into).collect()))
    }

    pub fn map<I, K, V>(name: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(
            name,
            EntryValue::Map(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
        )
    }
}

/// Entry as stored by the property service.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireEntry {
    name: String,
    #[serde(default, alias = "string_value", skip_serializing_if = "Option::is_none")]
    string_value: Option<String>,
    #[serde(default, alias = "list_value", skip_serializing_if = "Option::is_none")]
    list_value: Option<Vec<String>>,
    #[serde(default, alias = "map_value", skip_serializing_if = "Option::is_none")]
    map_value: Option<BTreeMap<String, String>>,
}

impl From<WireEntry> for ConfigEntry {
    fn from(wire: WireEntry) -> Self {
        // The store fills unused fields with empty defaults, so the first
        // non-empty field is the active one.
        let value = match (wire.map_value, wire.list_value, wire.string_value) {
            (Some(map), _, _) if !map.is_empty() => EntryValue::Map(map),
            (_, Some(list), _) if !list.is_empty() => EntryValue::List(list),
            (_, _, Some(value)) if !value.is_empty() => EntryValue::Scalar(value),
            _ => EntryValue::Empty,
        };
        Self {
            name: wire.name,
            value,
        }
    }
}

impl From<ConfigEntry> for WireEntry {
    fn from(entry: ConfigEntry) -> Self {
        let mut wire = WireEntry {
            name: entry.name,
            ..Default::default()
        };
        match entry.value {
            EntryValue::Scalar(value) => wire.string_value = Some(value),
            EntryValue::List(list) => wire.list_value = Some(list),
            EntryValue::Map(map) => wire.map_value = Some(map),
            EntryValue::Empty => {}
        }
        wire
    }
}
