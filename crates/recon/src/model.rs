use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::{DeltaConfig, InputName, RoundingMode};
use crate::diagnostics::Diagnostic;
use crate::error::MissingInput;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// An already-parsed tabular dataset. The first row of the source is `headers`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// Build from a header row and data rows of string slices. Mostly for tests.
    pub fn from_rows(name: &str, headers: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            name: name.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }
}

/// Tables keyed by the logical input they satisfy.
#[derive(Debug, Default)]
pub struct ReconInput {
    pub tables: HashMap<InputName, Table>,
}

impl ReconInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: InputName, table: Table) {
        self.tables.insert(name, table);
    }

    pub fn get(&self, name: &InputName) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Required inputs (per config) that have no table, in config order.
    pub fn missing(&self, config: &DeltaConfig) -> Vec<MissingInput> {
        config
            .required_inputs()
            .into_iter()
            .filter(|spec| !self.tables.contains_key(&spec.name))
            .map(|spec| MissingInput {
                input: spec.name.to_string(),
                file: spec.file,
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Typed records
// ---------------------------------------------------------------------------

/// A reservation of `quantity` units of `asset` over `[start, end)`.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRecord {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub asset: String,
    pub quantity: f64,
}

/// Units of one asset observed at one location.
#[derive(Debug, Clone, PartialEq)]
pub struct CountRecord {
    pub category: String,
    pub asset: String,
    pub count: f64,
}

/// The books quantity of one asset.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRecord {
    pub category: String,
    pub asset: String,
    pub current: f64,
}

/// All count rows from one physical location.
#[derive(Debug, Clone)]
pub struct CountSource {
    pub location: String,
    pub records: Vec<CountRecord>,
}

// ---------------------------------------------------------------------------
// Intermediate stages
// ---------------------------------------------------------------------------

/// One asset after the outer join across count locations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountedAsset {
    pub category: String,
    pub asset: String,
    /// Per-location units; locations without a row for this asset hold 0.
    pub by_location: BTreeMap<String, f64>,
    pub counted: f64,
}

/// Counted + rented + buffer arithmetic for one asset, before the ledger join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TotalRow {
    pub category: String,
    pub asset: String,
    pub counted: i64,
    pub rented: i64,
    pub total: i64,
    pub buffer: i64,
    #[serde(rename = "final")]
    pub final_qty: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    Rental,
    House,
}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rental => write!(f, "rental"),
            Self::House => write!(f, "house"),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A detail report row. Field order is the CSV column contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeltaRow {
    pub category: String,
    pub asset: String,
    pub counted: i64,
    pub rented: i64,
    pub total: i64,
    pub buffer: i64,
    #[serde(rename = "final")]
    pub final_qty: i64,
    pub current: i64,
    pub delta: i64,
}

impl DeltaRow {
    pub const HEADERS: [&'static str; 9] = [
        "category", "asset", "counted", "rented", "total", "buffer", "final", "current", "delta",
    ];
}

/// A delta-only report row: `[asset, delta]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeltaSummaryRow {
    pub asset: String,
    pub delta: i64,
}

impl DeltaSummaryRow {
    pub const HEADERS: [&'static str; 2] = ["asset", "delta"];
}

#[derive(Debug, Clone, Serialize)]
pub struct DeltaReport {
    pub class: AssetClass,
    /// Every asset of the class, whatever its delta.
    pub detail: Vec<DeltaRow>,
    /// Only assets whose delta is nonzero.
    pub deltas: Vec<DeltaSummaryRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeltaSummary {
    pub rental_assets: usize,
    pub house_assets: usize,
    pub rental_changes: usize,
    pub house_changes: usize,
    /// Sum of positive deltas across both classes.
    pub units_short: i64,
    /// Sum of |negative deltas| across both classes.
    pub units_surplus: i64,
    pub diagnostics: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeltaMeta {
    pub config_name: String,
    pub reference_date: NaiveDate,
    pub house_category: String,
    pub buffer_rate: f64,
    pub rounding: RoundingMode,
    pub locations: Vec<String>,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeltaResult {
    pub meta: DeltaMeta,
    pub summary: DeltaSummary,
    pub rental: DeltaReport,
    pub house: DeltaReport,
    pub diagnostics: Vec<Diagnostic>,
}
