//! Structured search queries against the catalog.

use serde::{Deserialize, Serialize};

use super::error::CatalogError;
use super::kind::RegulationKind;

/// Earliest plausible regulation year (the year of independence).
const MIN_YEAR: u16 = 1945;

/// Upper bound for plausible regulation years.
const MAX_YEAR: u16 = 2100;

/// Status filter applied to listing searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StatusFilter {
    /// Only regulations currently in force ("Berlaku"). The default mode.
    #[default]
    Active,
    /// Only revoked regulations ("Tidak Berlaku").
    Revoked,
    /// No status restriction.
    Any,
}

impl StatusFilter {
    /// The literal value the search endpoint expects for this filter.
    #[must_use]
    pub fn as_param(self) -> &'static str {
        match self {
            Self::Active => "Berlaku",
            Self::Revoked => "Tidak Berlaku",
            Self::Any => "",
        }
    }
}

/// An immutable, validated search query.
///
/// Absent fields serialize as empty query-parameter values, never as
/// omitted parameters — the search endpoint expects all six slots present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegulationQuery {
    kind: Option<RegulationKind>,
    year: Option<u16>,
    number: Option<u32>,
    status: StatusFilter,
}

impl RegulationQuery {
    /// Creates a query, validating year and number ranges.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidQuery`] when the year is outside
    /// 1945..=2100 or the number is zero.
    pub fn new(
        kind: Option<RegulationKind>,
        year: Option<u16>,
        number: Option<u32>,
        status: StatusFilter,
    ) -> Result<Self, CatalogError> {
        if let Some(year) = year
            && !(MIN_YEAR..=MAX_YEAR).contains(&year)
        {
            return Err(CatalogError::invalid_query(format!(
                "year {year} outside {MIN_YEAR}..={MAX_YEAR}"
            )));
        }
        if number == Some(0) {
            return Err(CatalogError::invalid_query("number must be positive"));
        }
        Ok(Self {
            kind,
            year,
            number,
            status,
        })
    }

    /// The regulation kind restriction, if any.
    #[must_use]
    pub fn kind(&self) -> Option<RegulationKind> {
        self.kind
    }

    /// The year restriction, if any.
    #[must_use]
    pub fn year(&self) -> Option<u16> {
        self.year
    }

    /// The regulation number restriction, if any.
    #[must_use]
    pub fn number(&self) -> Option<u32> {
        self.number
    }

    /// The status filter.
    #[must_use]
    pub fn status(&self) -> StatusFilter {
        self.status
    }
}
