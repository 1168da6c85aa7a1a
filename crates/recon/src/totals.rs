use std::collections::BTreeMap;

use crate::config::RoundingMode;
use crate::model::{AssetClass, CountedAsset, TotalRow};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferPolicy {
    pub rate: f64,
    pub rounding: RoundingMode,
}

impl Default for BufferPolicy {
    fn default() -> Self {
        Self {
            rate: 0.05,
            rounding: RoundingMode::HalfEven,
        }
    }
}

impl BufferPolicy {
    /// Buffer units held back from an already-rounded total.
    pub fn buffer_for(&self, total: i64) -> i64 {
        self.rounding.round(total as f64 * self.rate)
    }
}

/// Build one row. `counted`, `rented` and `total` are each rounded from their
/// unrounded values; the buffer is taken from the rounded total and `final`
/// is the difference of the two rounded integers.
pub fn total_row(
    category: &str,
    asset: &str,
    counted: f64,
    rented: f64,
    policy: &BufferPolicy,
) -> TotalRow {
    let round = |v: f64| policy.rounding.round(v);
    let total = round(counted + rented);
    let buffer = policy.buffer_for(total);
    TotalRow {
        category: category.to_string(),
        asset: asset.to_string(),
        counted: round(counted),
        rented: round(rented),
        total,
        buffer,
        final_qty: total - buffer,
    }
}

/// Left join of counted assets with rented quantities. Every counted asset
/// is kept; assets with nothing rented get 0. Rented assets that were never
/// counted are dropped here (see `diagnostics::check_joins`).
pub fn compute_totals(
    counted: &[CountedAsset],
    rented: &BTreeMap<String, f64>,
    policy: &BufferPolicy,
) -> Vec<TotalRow> {
    counted
        .iter()
        .map(|c| {
            let rented_qty = rented.get(&c.asset).copied().unwrap_or(0.0);
            total_row(&c.category, &c.asset, c.counted, rented_qty, policy)
        })
        .collect()
}

pub fn classify(category: &str, house_category: &str) -> AssetClass {
    if category == house_category {
        AssetClass::House
    } else {
        AssetClass::Rental
    }
}

/// Split rows into `(rental, house)`, preserving order within each class.
pub fn partition(rows: Vec<TotalRow>, house_category: &str) -> (Vec<TotalRow>, Vec<TotalRow>) {
    rows.into_iter()
        .partition(|row| classify(&row.category, house_category) == AssetClass::Rental)
}
