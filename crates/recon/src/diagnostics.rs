//! Join-key mismatches between sources.
//!
//! None of these abort a run; the pipeline still zero-fills the missing side.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::model::{CountedAsset, LedgerRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Active bookings exist but no location counted the asset, so it is
    /// dropped from the reports.
    RentedNotCounted { asset: String, rented: f64 },
    /// Counted asset with no ledger row; its current quantity is taken as 0.
    CountedNotInLedger { asset: String, category: String },
    /// Ledger asset that no location counted.
    LedgerNotCounted { asset: String, current: f64 },
    /// Count sources disagree on an asset's category. The first one is kept.
    CategoryConflict {
        asset: String,
        kept: String,
        location: String,
        found: String,
    },
    /// The same asset appears on more than one row of one input. Rows are summed.
    DuplicateRow { input: String, asset: String, rows: usize },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RentedNotCounted { asset, rented } => {
                write!(f, "'{asset}' has {rented} unit(s) rented but was not counted at any location")
            }
            Self::CountedNotInLedger { asset, category } => {
                write!(f, "'{asset}' ({category}) is not in the inventory ledger; current taken as 0")
            }
            Self::LedgerNotCounted { asset, current } => {
                write!(f, "'{asset}' is in the ledger ({current} unit(s)) but was not counted")
            }
            Self::CategoryConflict { asset, kept, location, found } => {
                write!(f, "'{asset}' is '{found}' at {location}; keeping '{kept}'")
            }
            Self::DuplicateRow { input, asset, rows } => {
                write!(f, "{input}: '{asset}' appears on {rows} rows; quantities summed")
            }
        }
    }
}

/// Cross-source key checks once counts, rentals and the ledger are all known.
pub fn check_joins(
    counted: &[CountedAsset],
    rented: &BTreeMap<String, f64>,
    ledger: &[LedgerRecord],
) -> Vec<Diagnostic> {
    let counted_assets: BTreeSet<&str> = counted.iter().map(|c| c.asset.as_str()).collect();
    let mut ledger_current: BTreeMap<&str, f64> = BTreeMap::new();
    for rec in ledger {
        *ledger_current.entry(rec.asset.as_str()).or_insert(0.0) += rec.current;
    }

    let mut out = Vec::new();

    for (asset, qty) in rented {
        if !counted_assets.contains(asset.as_str()) {
            out.push(Diagnostic::RentedNotCounted {
                asset: asset.clone(),
                rented: *qty,
            });
        }
    }

    for c in counted {
        if !ledger_current.contains_key(c.asset.as_str()) {
            out.push(Diagnostic::CountedNotInLedger {
                asset: c.asset.clone(),
                category: c.category.clone(),
            });
        }
    }

    for (asset, current) in &ledger_current {
        if !counted_assets.contains(asset) {
            out.push(Diagnostic::LedgerNotCounted {
                asset: asset.to_string(),
                current: *current,
            });
        }
    }

    out
}
