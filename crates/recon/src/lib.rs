//! `invdelta-recon`: inventory count reconciliation engine.
//!
//! Pure engine crate: receives parsed tables, returns the rental and house
//! delta reports. No CLI or IO dependencies.
//!
//! Pipeline: active bookings on the reference date are summed per asset
//! ([`availability`], [`aggregate`]), counts from every location are outer
//! joined ([`counts`]), counted + rented less a safety buffer gives the final
//! target ([`totals`]), and the target is compared with the inventory ledger
//! ([`delta`]).

pub mod aggregate;
pub mod availability;
pub mod config;
pub mod counts;
pub mod delta;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod load;
pub mod model;
pub mod totals;

pub use config::{DeltaConfig, InputName, RoundingMode};
pub use diagnostics::Diagnostic;
pub use engine::run;
pub use error::{MissingInput, ReconError};
pub use model::{DeltaReport, DeltaResult, DeltaRow, DeltaSummaryRow, ReconInput, Table};
