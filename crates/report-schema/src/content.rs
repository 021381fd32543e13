//! Logical content paths and their built-in schema documents

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Page document types with a dedicated schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContentPath {
    Dashboard,
    FinancialModel,
    MarketAnalysis,
    Team,
    Roadmap,
}

impl ContentPath {
    /// Every known content path, in registration order
    pub const ALL: [ContentPath; 5] = [
        ContentPath::Dashboard,
        ContentPath::FinancialModel,
        ContentPath::MarketAnalysis,
        ContentPath::Team,
        ContentPath::Roadmap,
    ];

    /// The path as it appears in page routes
    pub fn as_str(self) -> &'static str {
        match self {
            ContentPath::Dashboard => "dashboard",
            ContentPath::FinancialModel => "financial-model",
            ContentPath::MarketAnalysis => "market-analysis",
            ContentPath::Team => "team",
            ContentPath::Roadmap => "roadmap",
        }
    }

    /// File name used when loading an override from a schema directory
    pub fn schema_file_name(self) -> String {
        format!("{}.schema.json", self.as_str())
    }

    pub(crate) fn builtin_document(self) -> &'static str {
        match self {
            ContentPath::Dashboard => include_str!("../schemas/dashboard.schema.json"),
            ContentPath::FinancialModel => include_str!("../schemas/financial-model.schema.json"),
            ContentPath::MarketAnalysis => include_str!("../schemas/market-analysis.schema.json"),
            ContentPath::Team => include_str!("../schemas/team.schema.json"),
            ContentPath::Roadmap => include_str!("../schemas/roadmap.schema.json"),
        }
    }
}

/// Name of the fallback schema
pub const GENERIC_SCHEMA_NAME: &str = "generic";

pub(crate) const GENERIC_DOCUMENT: &str = include_str!("../schemas/generic.schema.json");

impl fmt::Display for ContentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentPath::ALL
            .into_iter()
            .find(|path| path.as_str() == s)
            .ok_or_else(|| Error::UnknownContentPath(s.to_string()))
    }
}
