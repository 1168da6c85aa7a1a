use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::ReconError;

/// Formats tried, in order, when a booking date cell is parsed.
/// Anything after the date portion (a time of day) is discarded.
pub const DEFAULT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
];

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct DeltaConfig {
    pub name: String,
    /// Count category that marks house-owned assets.
    #[serde(default = "default_house_category")]
    pub house_category: String,
    /// Safety buffer as a fraction of total units.
    #[serde(default = "default_buffer_rate")]
    pub buffer_rate: f64,
    #[serde(default)]
    pub rounding: RoundingMode,
    /// Date of the physical count. The CLI `--date` flag takes precedence.
    #[serde(default)]
    pub reference_date: Option<NaiveDate>,
    /// Replaces [`DEFAULT_DATE_FORMATS`] when set.
    #[serde(default)]
    pub date_formats: Option<Vec<String>>,
    pub inputs: InputsConfig,
    pub counts: Vec<CountSourceConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_house_category() -> String {
    "House Bikes".into()
}

fn default_buffer_rate() -> f64 {
    0.05
}

// ---------------------------------------------------------------------------
// Rounding
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Ties go to the even neighbour (0.5 -> 0, 1.5 -> 2).
    #[default]
    HalfEven,
    /// Ties go away from zero (0.5 -> 1).
    HalfUp,
}

impl RoundingMode {
    pub fn round(self, value: f64) -> i64 {
        let rounded = match self {
            Self::HalfEven => value.round_ties_even(),
            Self::HalfUp => value.round(),
        };
        rounded as i64
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HalfEven => write!(f, "half_even"),
            Self::HalfUp => write!(f, "half_up"),
        }
    }
}

// ---------------------------------------------------------------------------
// Column references
// ---------------------------------------------------------------------------

/// A column addressed by header name or by 0-based position.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Position(usize),
    Name(String),
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position(idx) => write!(f, "#{idx}"),
            Self::Name(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BookingColumns {
    pub start: ColumnRef,
    pub end: ColumnRef,
    pub asset: ColumnRef,
    pub quantity: ColumnRef,
}

impl Default for BookingColumns {
    fn default() -> Self {
        Self {
            start: ColumnRef::Position(0),
            end: ColumnRef::Position(1),
            asset: ColumnRef::Position(2),
            quantity: ColumnRef::Position(3),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CountColumns {
    pub category: ColumnRef,
    pub asset: ColumnRef,
    pub count: ColumnRef,
}

impl Default for CountColumns {
    fn default() -> Self {
        Self {
            category: ColumnRef::Position(0),
            asset: ColumnRef::Position(1),
            count: ColumnRef::Position(2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LedgerColumns {
    pub category: ColumnRef,
    pub asset: ColumnRef,
    pub current: ColumnRef,
}

impl Default for LedgerColumns {
    fn default() -> Self {
        Self {
            category: ColumnRef::Position(0),
            asset: ColumnRef::Position(1),
            current: ColumnRef::Position(2),
        }
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct InputsConfig {
    pub availability: BookingSourceConfig,
    pub inventory: LedgerSourceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookingSourceConfig {
    pub file: String,
    /// Where the export comes from, shown by `invdelta inputs`.
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub columns: BookingColumns,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerSourceConfig {
    pub file: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub columns: LedgerColumns,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CountSourceConfig {
    pub location: String,
    pub file: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub columns: CountColumns,
}

/// Logical name of a required input table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InputName {
    Availability,
    Inventory,
    Count(String),
}

impl fmt::Display for InputName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Availability => write!(f, "availability"),
            Self::Inventory => write!(f, "inventory"),
            Self::Count(location) => write!(f, "count:{location}"),
        }
    }
}

/// One entry of [`DeltaConfig::required_inputs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSpec {
    pub name: InputName,
    pub file: String,
    pub source: Option<String>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory, relative to the config file. Defaults to its directory.
    pub dir: Option<String>,
    pub rental_detail: String,
    pub house_detail: String,
    pub rental_summary: String,
    pub house_summary: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: None,
            rental_detail: "rental_delta_detail.csv".into(),
            house_detail: "house_delta_detail.csv".into(),
            rental_summary: "rental_delta.csv".into(),
            house_summary: "house_delta.csv".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl DeltaConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: DeltaConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.house_category.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "house_category must not be empty".into(),
            ));
        }

        if !self.buffer_rate.is_finite() || !(0.0..1.0).contains(&self.buffer_rate) {
            return Err(ReconError::ConfigValidation(format!(
                "buffer_rate must be in [0, 1), got {}",
                self.buffer_rate
            )));
        }

        if self.counts.is_empty() {
            return Err(ReconError::ConfigValidation(
                "at least one [[counts]] location is required".into(),
            ));
        }

        let mut locations = HashSet::new();
        for count in &self.counts {
            let location = count.location.trim();
            if location.is_empty() {
                return Err(ReconError::ConfigValidation(
                    "count location name must not be empty".into(),
                ));
            }
            if !locations.insert(location) {
                return Err(ReconError::ConfigValidation(format!(
                    "duplicate count location '{location}'"
                )));
            }
        }

        for spec in self.required_inputs() {
            if spec.file.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "input '{}': file must not be empty",
                    spec.name
                )));
            }
        }

        if let Some(ref formats) = self.date_formats {
            if formats.is_empty() {
                return Err(ReconError::ConfigValidation(
                    "date_formats must list at least one format".into(),
                ));
            }
        }

        let out = &self.output;
        let names = [
            &out.rental_detail,
            &out.house_detail,
            &out.rental_summary,
            &out.house_summary,
        ];
        let mut seen = HashSet::new();
        for name in names {
            if name.trim().is_empty() {
                return Err(ReconError::ConfigValidation(
                    "output file names must not be empty".into(),
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(ReconError::ConfigValidation(format!(
                    "output file '{name}' is used for more than one report"
                )));
            }
        }

        Ok(())
    }

    /// Every input the pipeline needs, in a stable order:
    /// availability, inventory, then count locations as configured.
    pub fn required_inputs(&self) -> Vec<InputSpec> {
        let mut specs = vec![
            InputSpec {
                name: InputName::Availability,
                file: self.inputs.availability.file.clone(),
                source: self.inputs.availability.source.clone(),
            },
            InputSpec {
                name: InputName::Inventory,
                file: self.inputs.inventory.file.clone(),
                source: self.inputs.inventory.source.clone(),
            },
        ];
        specs.extend(self.counts.iter().map(|c| InputSpec {
            name: InputName::Count(c.location.clone()),
            file: c.file.clone(),
            source: c.source.clone(),
        }));
        specs
    }

    pub fn date_formats(&self) -> Vec<&str> {
        match self.date_formats {
            Some(ref formats) => formats.iter().map(String::as_str).collect(),
            None => DEFAULT_DATE_FORMATS.to_vec(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
name = "Weekly Count"

[inputs.availability]
file = "Availability.xlsx"
source = "Production > Availability"

[inputs.inventory]
file = "Inventory.xlsx"

[[counts]]
location = "warehouse"
file = "Warehouse.csv"

[[counts]]
location = "seagrove"
file = "Seagrove.csv"

[[counts]]
location = "pointe"
file = "Pointe.csv"

[[counts]]
location = "house"
file = "House Bikes.csv"
"#;

    #[test]
    fn parse_defaults() {
        let config = DeltaConfig::from_toml(VALID).unwrap();
        assert_eq!(config.name, "Weekly Count");
        assert_eq!(config.house_category, "House Bikes");
        assert_eq!(config.buffer_rate, 0.05);
        assert_eq!(config.rounding, RoundingMode::HalfEven);
        assert!(config.reference_date.is_none());
        assert_eq!(config.counts.len(), 4);
        assert_eq!(config.inputs.availability.columns, BookingColumns::default());
        assert_eq!(config.output.house_summary, "house_delta.csv");
        assert_eq!(config.date_formats(), DEFAULT_DATE_FORMATS.to_vec());
    }

    #[test]
    fn required_inputs_in_order() {
        let config = DeltaConfig::from_toml(VALID).unwrap();
        let names: Vec<String> = config
            .required_inputs()
            .iter()
            .map(|s| s.name.to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "availability",
                "inventory",
                "count:warehouse",
                "count:seagrove",
                "count:pointe",
                "count:house",
            ]
        );
        assert_eq!(
            config.required_inputs()[0].source.as_deref(),
            Some("Production > Availability")
        );
    }

    #[test]
    fn parse_named_and_positional_columns() {
        let input = r#"
name = "Columns"
rounding = "half_up"
reference_date = "2024-01-05"

[inputs.availability]
file = "a.csv"
[inputs.availability.columns]
start = "Start Date"
end = "End Date"

[inputs.inventory]
file = "i.csv"
[inputs.inventory.columns]
current = 4

[[counts]]
location = "warehouse"
file = "w.csv"
"#;
        let config = DeltaConfig::from_toml(input).unwrap();
        let cols = &config.inputs.availability.columns;
        assert_eq!(cols.start, ColumnRef::Name("Start Date".into()));
        assert_eq!(cols.end, ColumnRef::Name("End Date".into()));
        assert_eq!(cols.asset, ColumnRef::Position(2));
        assert_eq!(config.inputs.inventory.columns.current, ColumnRef::Position(4));
        assert_eq!(config.rounding, RoundingMode::HalfUp);
        assert_eq!(
            config.reference_date,
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
    }

    #[test]
    fn reject_no_counts() {
        let input = r#"
name = "No counts"
counts = []
[inputs.availability]
file = "a.csv"
[inputs.inventory]
file = "i.csv"
"#;
        let err = DeltaConfig::from_toml(input).unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)), "got {err}");
    }

    #[test]
    fn reject_duplicate_location() {
        let input = format!(
            "{VALID}\n[[counts]]\nlocation = \"warehouse\"\nfile = \"again.csv\"\n"
        );
        let err = DeltaConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("duplicate count location 'warehouse'"));
    }

    #[test]
    fn reject_bad_buffer_rate() {
        let input = VALID.replace("name = \"Weekly Count\"", "name = \"x\"\nbuffer_rate = 1.5");
        let err = DeltaConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("buffer_rate"));
    }

    #[test]
    fn reject_shared_output_file() {
        let input = format!(
            "{VALID}\n[output]\nhouse_summary = \"rental_delta.csv\"\n"
        );
        let err = DeltaConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("more than one report"));
    }

    #[test]
    fn reject_invalid_rounding() {
        let input = VALID.replace("name = \"Weekly Count\"", "name = \"x\"\nrounding = \"banker\"");
        let err = DeltaConfig::from_toml(&input).unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn rounding_modes_differ_on_ties() {
        assert_eq!(RoundingMode::HalfEven.round(0.5), 0);
        assert_eq!(RoundingMode::HalfUp.round(0.5), 1);
        assert_eq!(RoundingMode::HalfEven.round(1.5), 2);
        assert_eq!(RoundingMode::HalfEven.round(2.5), 2);
        assert_eq!(RoundingMode::HalfUp.round(2.5), 3);
        assert_eq!(RoundingMode::HalfEven.round(0.4), 0);
    }
}
