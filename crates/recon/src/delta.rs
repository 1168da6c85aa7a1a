use std::collections::BTreeMap;

use crate::config::RoundingMode;
use crate::diagnostics::Diagnostic;
use crate::model::{AssetClass, DeltaReport, DeltaRow, DeltaSummaryRow, LedgerRecord, TotalRow};

/// Reduce the ledger to `asset -> current`. Duplicate asset rows are summed
/// and reported; the ledger's category column is not used for the join.
pub fn index_ledger(
    ledger: &[LedgerRecord],
    diagnostics: &mut Vec<Diagnostic>,
) -> BTreeMap<String, f64> {
    let mut current: BTreeMap<String, f64> = BTreeMap::new();
    let mut rows: BTreeMap<&str, usize> = BTreeMap::new();

    for rec in ledger {
        *current.entry(rec.asset.clone()).or_insert(0.0) += rec.current;
        *rows.entry(rec.asset.as_str()).or_insert(0) += 1;
    }

    for (asset, n) in rows {
        if n > 1 {
            diagnostics.push(Diagnostic::DuplicateRow {
                input: "inventory".into(),
                asset: asset.to_string(),
                rows: n,
            });
        }
    }

    current
}

/// Left join with the ledger. Assets without a ledger entry get current = 0,
/// so their delta equals their final quantity.
pub fn apply_ledger(
    rows: &[TotalRow],
    ledger: &BTreeMap<String, f64>,
    rounding: RoundingMode,
) -> Vec<DeltaRow> {
    rows.iter()
        .map(|row| {
            let current = rounding.round(ledger.get(&row.asset).copied().unwrap_or(0.0));
            DeltaRow {
                category: row.category.clone(),
                asset: row.asset.clone(),
                counted: row.counted,
                rented: row.rented,
                total: row.total,
                buffer: row.buffer,
                final_qty: row.final_qty,
                current,
                delta: row.final_qty - current,
            }
        })
        .collect()
}

/// `[asset, delta]` for rows that need action. Zero deltas are left out.
pub fn nonzero_deltas(detail: &[DeltaRow]) -> Vec<DeltaSummaryRow> {
    detail
        .iter()
        .filter(|row| row.delta != 0)
        .map(|row| DeltaSummaryRow {
            asset: row.asset.clone(),
            delta: row.delta,
        })
        .collect()
}

pub fn build_report(
    class: AssetClass,
    rows: &[TotalRow],
    ledger: &BTreeMap<String, f64>,
    rounding: RoundingMode,
) -> DeltaReport {
    let detail = apply_ledger(rows, ledger, rounding);
    let deltas = nonzero_deltas(&detail);
    log::debug!(
        "{class}: {} asset(s), {} with nonzero delta",
        detail.len(),
        deltas.len()
    );
    DeltaReport {
        class,
        detail,
        deltas,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total(asset: &str, final_qty: i64) -> TotalRow {
        TotalRow {
            category: "Bikes".into(),
            asset: asset.into(),
            counted: final_qty,
            rented: 0,
            total: final_qty,
            buffer: 0,
            final_qty,
        }
    }

    fn ledger_row(asset: &str, current: f64) -> LedgerRecord {
        LedgerRecord {
            category: "Bikes".into(),
            asset: asset.into(),
            current,
        }
    }

    #[test]
    fn delta_is_final_minus_current() {
        let mut diags = Vec::new();
        let ledger = index_ledger(&[ledger_row("Bike A", 6.0)], &mut diags);
        let rows = apply_ledger(&[total("Bike A", 8)], &ledger, RoundingMode::HalfEven);
        assert_eq!(rows[0].current, 6);
        assert_eq!(rows[0].delta, 2);
    }

    #[test]
    fn fractional_ledger_value_is_rounded() {
        let mut diags = Vec::new();
        let ledger = index_ledger(&[ledger_row("Bike A", 6.5)], &mut diags);

        let even = apply_ledger(&[total("Bike A", 8)], &ledger, RoundingMode::HalfEven);
        assert_eq!(even[0].current, 6);
        assert_eq!(even[0].delta, 2);

        let up = apply_ledger(&[total("Bike A", 8)], &ledger, RoundingMode::HalfUp);
        assert_eq!(up[0].current, 7);
        assert_eq!(up[0].delta, 1);
    }

    #[test]
    fn missing_ledger_entry_means_current_zero() {
        let ledger = BTreeMap::new();
        let rows = apply_ledger(&[total("Bike A", 8)], &ledger, RoundingMode::HalfEven);
        assert_eq!(rows[0].current, 0);
        assert_eq!(rows[0].delta, rows[0].final_qty);
    }

    #[test]
    fn summary_drops_zero_deltas_detail_keeps_them() {
        let mut diags = Vec::new();
        let ledger = index_ledger(
            &[ledger_row("Bike A", 8.0), ledger_row("Bike B", 5.0)],
            &mut diags,
        );
        let report = build_report(
            AssetClass::Rental,
            &[total("Bike A", 8), total("Bike B", 3)],
            &ledger,
            RoundingMode::HalfEven,
        );
        assert_eq!(report.detail.len(), 2);
        assert_eq!(
            report.deltas,
            vec![DeltaSummaryRow {
                asset: "Bike B".into(),
                delta: -2
            }]
        );
    }

    #[test]
    fn duplicate_ledger_rows_summed() {
        let mut diags = Vec::new();
        let ledger = index_ledger(
            &[ledger_row("Bike A", 2.0), ledger_row("Bike A", 3.0)],
            &mut diags,
        );
        assert_eq!(ledger["Bike A"], 5.0);
        assert_eq!(diags.len(), 1);
    }
}
