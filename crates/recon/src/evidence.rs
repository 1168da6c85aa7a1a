use crate::diagnostics::Diagnostic;
use crate::model::{DeltaReport, DeltaSummary};

/// Compute summary statistics over both reports.
pub fn compute_summary(
    rental: &DeltaReport,
    house: &DeltaReport,
    diagnostics: &[Diagnostic],
) -> DeltaSummary {
    let mut units_short = 0;
    let mut units_surplus = 0;

    for row in rental.detail.iter().chain(&house.detail) {
        if row.delta > 0 {
            units_short += row.delta;
        } else {
            units_surplus += -row.delta;
        }
    }

    DeltaSummary {
        rental_assets: rental.detail.len(),
        house_assets: house.detail.len(),
        rental_changes: rental.deltas.len(),
        house_changes: house.deltas.len(),
        units_short,
        units_surplus,
        diagnostics: diagnostics.len(),
    }
}
