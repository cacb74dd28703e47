use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// The closed set of element lookup strategies.
///
/// These are the only strategies a client can name; anything else is
/// rejected at translation time rather than falling back to a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    #[serde(rename = "by-id")]
    Id,
    #[serde(rename = "by-name")]
    Name,
    #[serde(rename = "by-link-text")]
    LinkText,
    #[serde(rename = "by-partial-link-text")]
    PartialLinkText,
    #[serde(rename = "by-xpath")]
    XPath,
    #[serde(rename = "by-class-name")]
    ClassName,
    #[serde(rename = "by-vendor-query")]
    VendorQuery,
}

/// Wire key to strategy, exhaustive over the enum.
const STRATEGY_KEYS: [(&str, Strategy); 7] = [
    ("by-id", Strategy::Id),
    ("by-name", Strategy::Name),
    ("by-link-text", Strategy::LinkText),
    ("by-partial-link-text", Strategy::PartialLinkText),
    ("by-xpath", Strategy::XPath),
    ("by-class-name", Strategy::ClassName),
    ("by-vendor-query", Strategy::VendorQuery),
];

impl Strategy {
    pub const ALL: [Strategy; 7] = [
        Strategy::Id,
        Strategy::Name,
        Strategy::LinkText,
        Strategy::PartialLinkText,
        Strategy::XPath,
        Strategy::ClassName,
        Strategy::VendorQuery,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Strategy::Id => "by-id",
            Strategy::Name => "by-name",
            Strategy::LinkText => "by-link-text",
            Strategy::PartialLinkText => "by-partial-link-text",
            Strategy::XPath => "by-xpath",
            Strategy::ClassName => "by-class-name",
            Strategy::VendorQuery => "by-vendor-query",
        }
    }

    /// Table lookup, case-sensitive. Unknown keys are a miss, not a
    /// fallthrough.
    pub fn from_key(key: &str) -> Option<Strategy> {
        STRATEGY_KEYS
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, s)| *s)
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported selector strategy: {key}")]
pub struct UnsupportedStrategy {
    pub key: String,
}

impl FromStr for Strategy {
    type Err = UnsupportedStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::from_key(s).ok_or_else(|| UnsupportedStrategy { key: s.to_string() })
    }
}

/// A strategy plus its lookup string. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selector {
    pub strategy: Strategy,
    pub value: String,
}

impl Selector {
    pub fn new(strategy: Strategy, value: impl Into<String>) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }

    /// Maps a wire strategy key and lookup string to a selector.
    pub fn translate(key: &str, value: &str) -> Result<Self, UnsupportedStrategy> {
        Ok(Self::new(key.parse::<Strategy>()?, value))
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.strategy, self.value)
    }
}
