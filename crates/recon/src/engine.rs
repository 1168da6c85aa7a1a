use chrono::NaiveDate;

use crate::aggregate::rented_by_asset;
use crate::availability::filter_active;
use crate::config::{DeltaConfig, InputName};
use crate::counts::merge_counts;
use crate::delta::{build_report, index_ledger};
use crate::diagnostics::check_joins;
use crate::error::ReconError;
use crate::evidence::compute_summary;
use crate::load;
use crate::model::{AssetClass, CountSource, DeltaMeta, DeltaResult, ReconInput, Table};
use crate::totals::{compute_totals, partition, BufferPolicy};

fn table<'a>(input: &'a ReconInput, name: &InputName) -> Result<&'a Table, ReconError> {
    // Unreachable once `ReconInput::missing` came back empty.
    input.get(name).ok_or_else(|| {
        ReconError::MissingInputs(vec![crate::error::MissingInput {
            input: name.to_string(),
            file: String::new(),
        }])
    })
}

/// Run the delta pipeline for one reference date.
///
/// Every required input is checked before anything is parsed; a run either
/// returns all four reports or an error.
pub fn run(
    config: &DeltaConfig,
    input: &ReconInput,
    reference_date: NaiveDate,
) -> Result<DeltaResult, ReconError> {
    let missing = input.missing(config);
    if !missing.is_empty() {
        return Err(ReconError::MissingInputs(missing));
    }

    let formats = config.date_formats();

    log::info!("reading availability");
    let bookings = load::bookings(
        &InputName::Availability.to_string(),
        table(input, &InputName::Availability)?,
        &config.inputs.availability.columns,
        &formats,
    )?;

    log::info!("selecting bookings active on {reference_date}");
    let active = filter_active(&bookings, reference_date);
    log::debug!("{} of {} booking(s) active", active.len(), bookings.len());
    let rented = rented_by_asset(active);

    log::info!("reading counts");
    let mut sources = Vec::with_capacity(config.counts.len());
    for count in &config.counts {
        let name = InputName::Count(count.location.clone());
        let records = load::counts(&name.to_string(), table(input, &name)?, &count.columns)?;
        sources.push(CountSource {
            location: count.location.clone(),
            records,
        });
    }

    log::info!("merging counts");
    let mut diagnostics = Vec::new();
    let counted = merge_counts(&sources, &mut diagnostics);

    log::info!("determining total, buffer, and final quantities");
    let policy = BufferPolicy {
        rate: config.buffer_rate,
        rounding: config.rounding,
    };
    let totals = compute_totals(&counted, &rented, &policy);
    let (rental_rows, house_rows) = partition(totals, &config.house_category);

    log::info!("reading inventory");
    let ledger = load::ledger(
        &InputName::Inventory.to_string(),
        table(input, &InputName::Inventory)?,
        &config.inputs.inventory.columns,
    )?;
    diagnostics.extend(check_joins(&counted, &rented, &ledger));
    let ledger_index = index_ledger(&ledger, &mut diagnostics);

    log::info!("computing deltas");
    let rental = build_report(AssetClass::Rental, &rental_rows, &ledger_index, config.rounding);
    let house = build_report(AssetClass::House, &house_rows, &ledger_index, config.rounding);

    for d in &diagnostics {
        log::warn!("{d}");
    }

    let summary = compute_summary(&rental, &house, &diagnostics);

    Ok(DeltaResult {
        meta: DeltaMeta {
            config_name: config.name.clone(),
            reference_date,
            house_category: config.house_category.clone(),
            buffer_rate: config.buffer_rate,
            rounding: config.rounding,
            locations: config.counts.iter().map(|c| c.location.clone()).collect(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        rental,
        house,
        diagnostics,
    })
}
