use std::collections::{BTreeMap, HashMap};

use crate::diagnostics::Diagnostic;
use crate::model::{CountSource, CountedAsset};

/// Full outer join of all count sources on asset name.
///
/// Every asset that appears in any source gets one row. Locations without a
/// row for the asset contribute 0. The category is taken from the first
/// source (in `sources` order) that supplies a non-empty one. Rows are
/// returned sorted by `(category, asset)`.
pub fn merge_counts(sources: &[CountSource], diagnostics: &mut Vec<Diagnostic>) -> Vec<CountedAsset> {
    let empty_locations: BTreeMap<String, f64> = sources
        .iter()
        .map(|s| (s.location.clone(), 0.0))
        .collect();

    let mut merged: HashMap<String, CountedAsset> = HashMap::new();

    for source in sources {
        let mut rows_per_asset: BTreeMap<&str, usize> = BTreeMap::new();

        for rec in &source.records {
            *rows_per_asset.entry(rec.asset.as_str()).or_insert(0) += 1;

            let entry = merged.entry(rec.asset.clone()).or_insert_with(|| CountedAsset {
                category: String::new(),
                asset: rec.asset.clone(),
                by_location: empty_locations.clone(),
                counted: 0.0,
            });

            if entry.category.is_empty() {
                entry.category = rec.category.clone();
            } else if !rec.category.is_empty() && rec.category != entry.category {
                diagnostics.push(Diagnostic::CategoryConflict {
                    asset: rec.asset.clone(),
                    kept: entry.category.clone(),
                    location: source.location.clone(),
                    found: rec.category.clone(),
                });
            }

            *entry.by_location.entry(source.location.clone()).or_insert(0.0) += rec.count;
        }

        for (asset, rows) in rows_per_asset {
            if rows > 1 {
                diagnostics.push(Diagnostic::DuplicateRow {
                    input: format!("count:{}", source.location),
                    asset: asset.to_string(),
                    rows,
                });
            }
        }
    }

    let mut assets: Vec<CountedAsset> = merged
        .into_values()
        .map(|mut a| {
            a.counted = a.by_location.values().sum();
            a
        })
        .collect();
    assets.sort_by(|a, b| (&a.category, &a.asset).cmp(&(&b.category, &b.asset)));

    log::debug!(
        "merged {} count source(s) into {} asset(s)",
        sources.len(),
        assets.len()
    );
    assets
}
