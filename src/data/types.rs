use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CollectionError;

// ---------------------------------------------------------------------------
// CollectionType – the closed set of recognized layouts
// ---------------------------------------------------------------------------

/// Tag naming one in-memory layout for a collection of time series.
///
/// The string forms (`"numpy3D"`, `"np-list"`, ...) are the names downstream
/// estimators use to declare which layouts they accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CollectionType {
    /// Fixed array, shape (n_cases, n_channels, n_timepoints).
    #[serde(rename = "numpy3D")]
    Numpy3D,
    /// List of 2D arrays, each (n_channels, n_timepoints).
    #[serde(rename = "np-list")]
    NpList,
    /// List of tables, each with one row per time point and one column per channel.
    #[serde(rename = "df-list")]
    DfList,
    /// Flat array, shape (n_cases, n_timepoints). Univariate only.
    #[serde(rename = "numpy2D")]
    Numpy2D,
    /// Single table with one row per time point and one column per case.
    #[serde(rename = "pd-wide")]
    PdWide,
    /// Long table keyed by (case, timepoint) with one column per channel.
    #[serde(rename = "pd-multiindex")]
    PdMultiIndex,
}

impl CollectionType {
    /// Every recognized layout.
    pub const ALL: [CollectionType; 6] = [
        CollectionType::Numpy3D,
        CollectionType::NpList,
        CollectionType::DfList,
        CollectionType::Numpy2D,
        CollectionType::PdWide,
        CollectionType::PdMultiIndex,
    ];

    /// Layouts able to hold more than one channel.
    pub const MULTIVARIATE: [CollectionType; 4] = [
        CollectionType::Numpy3D,
        CollectionType::NpList,
        CollectionType::DfList,
        CollectionType::PdMultiIndex,
    ];

    /// Layouts able to hold series of differing lengths.
    pub const UNEQUAL_LENGTH: [CollectionType; 3] = [
        CollectionType::NpList,
        CollectionType::DfList,
        CollectionType::PdMultiIndex,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CollectionType::Numpy3D => "numpy3D",
            CollectionType::NpList => "np-list",
            CollectionType::DfList => "df-list",
            CollectionType::Numpy2D => "numpy2D",
            CollectionType::PdWide => "pd-wide",
            CollectionType::PdMultiIndex => "pd-multiindex",
        }
    }

    pub fn supports_multivariate(self) -> bool {
        Self::MULTIVARIATE.contains(&self)
    }

    pub fn supports_unequal_length(self) -> bool {
        Self::UNEQUAL_LENGTH.contains(&self)
    }
}

impl fmt::Display for CollectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionType {
    type Err = CollectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CollectionType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                CollectionError::type_error(format!(
                    "Unknown collection type: {s}. Expected one of {}",
                    CollectionType::ALL.map(CollectionType::as_str).join(", ")
                ))
            })
    }
}
