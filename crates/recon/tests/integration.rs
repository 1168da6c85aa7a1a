use std::path::PathBuf;

use chrono::NaiveDate;
use invdelta_recon::config::DeltaConfig;
use invdelta_recon::engine::run;
use invdelta_recon::model::{DeltaResult, DeltaRow, DeltaSummaryRow, ReconInput, Table};
use invdelta_recon::{Diagnostic, ReconError, RoundingMode};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn read_table(file: &str) -> Table {
    let path = fixtures_dir().join(file);
    let mut reader = csv::Reader::from_path(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    let headers = reader.headers().unwrap().iter().map(String::from).collect();
    let rows = reader
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect();
    Table::new(file, headers, rows)
}

fn load_config(overrides: &str) -> DeltaConfig {
    let base = std::fs::read_to_string(fixtures_dir().join("weekly.delta.toml")).unwrap();
    DeltaConfig::from_toml(&format!("{overrides}\n{base}")).unwrap()
}

fn load_input(config: &DeltaConfig) -> ReconInput {
    let mut input = ReconInput::new();
    for spec in config.required_inputs() {
        input.insert(spec.name, read_table(&spec.file));
    }
    input
}

fn load_and_run(overrides: &str) -> DeltaResult {
    let config = load_config(overrides);
    let input = load_input(&config);
    let date = config.reference_date.unwrap();
    run(&config, &input, date).unwrap()
}

fn detail(category: &str, asset: &str, nums: [i64; 7]) -> DeltaRow {
    let [counted, rented, total, buffer, final_qty, current, delta] = nums;
    DeltaRow {
        category: category.into(),
        asset: asset.into(),
        counted,
        rented,
        total,
        buffer,
        final_qty,
        current,
        delta,
    }
}

// -------------------------------------------------------------------------
// Reports
// -------------------------------------------------------------------------

#[test]
fn rental_detail_report() {
    let result = load_and_run("");
    assert_eq!(
        result.rental.detail,
        vec![
            detail("Bikes", "Beach Cruiser", [12, 6, 18, 1, 17, 17, 0]),
            detail("Chairs", "Beach Chair", [60, 0, 60, 3, 57, 50, 7]),
            detail("Water", "Kayak", [4, 1, 5, 0, 5, 7, -2]),
        ]
    );
}

#[test]
fn rental_summary_report_skips_zero_deltas() {
    let result = load_and_run("");
    assert_eq!(
        result.rental.deltas,
        vec![
            DeltaSummaryRow { asset: "Beach Chair".into(), delta: 7 },
            DeltaSummaryRow { asset: "Kayak".into(), delta: -2 },
        ]
    );
}

#[test]
fn house_reports() {
    let result = load_and_run("");
    assert_eq!(
        result.house.detail,
        vec![
            detail("House Bikes", "House Cruiser", [12, 0, 12, 1, 11, 11, 0]),
            // never in the ledger: current defaults to 0, delta == final
            detail("House Bikes", "House Trike", [0, 0, 0, 0, 0, 0, 0]),
        ]
    );
    assert!(result.house.deltas.is_empty());
}

#[test]
fn partitions_do_not_overlap() {
    let result = load_and_run("");
    assert!(result.rental.detail.iter().all(|r| r.category != "House Bikes"));
    assert!(result.house.detail.iter().all(|r| r.category == "House Bikes"));
}

#[test]
fn join_diagnostics() {
    let result = load_and_run("");
    assert_eq!(
        result.diagnostics,
        vec![
            Diagnostic::RentedNotCounted { asset: "Paddle Board".into(), rented: 2.0 },
            Diagnostic::CountedNotInLedger {
                asset: "House Trike".into(),
                category: "House Bikes".into(),
            },
            Diagnostic::LedgerNotCounted { asset: "Tandem".into(), current: 3.0 },
        ]
    );
    assert!(result.rental.detail.iter().all(|r| r.asset != "Paddle Board"));
}

#[test]
fn summary_totals() {
    let result = load_and_run("");
    let s = &result.summary;
    assert_eq!(s.rental_assets, 3);
    assert_eq!(s.house_assets, 2);
    assert_eq!(s.rental_changes, 2);
    assert_eq!(s.house_changes, 0);
    assert_eq!(s.units_short, 7);
    assert_eq!(s.units_surplus, 2);
    assert_eq!(s.diagnostics, 3);
}

// -------------------------------------------------------------------------
// Config knobs
// -------------------------------------------------------------------------

#[test]
fn other_reference_date_changes_rented() {
    let config = load_config("");
    let input = load_input(&config);
    // On the 16th the 2024-06-14..16 kayak booking has ended and the
    // 3-unit one has started.
    let date = NaiveDate::from_ymd_opt(2024, 6, 16).unwrap();
    let result = run(&config, &input, date).unwrap();
    let kayak = result.rental.detail.iter().find(|r| r.asset == "Kayak").unwrap();
    assert_eq!(kayak.rented, 3);
    assert_eq!(kayak.total, 7);
}

#[test]
fn half_up_rounding_and_larger_buffer() {
    let result = load_and_run("rounding = \"half_up\"\nbuffer_rate = 0.1");
    assert_eq!(result.meta.rounding, RoundingMode::HalfUp);
    let kayak = result.rental.detail.iter().find(|r| r.asset == "Kayak").unwrap();
    // total 5 * 0.1 = 0.5 -> 1 under half-up
    assert_eq!(kayak.buffer, 1);
    assert_eq!(kayak.final_qty, 4);
    assert_eq!(kayak.delta, -3);
}

#[test]
fn renamed_house_category() {
    let result = load_and_run("house_category = \"Water\"");
    assert_eq!(result.house.detail.len(), 1);
    assert_eq!(result.house.detail[0].asset, "Kayak");
    assert_eq!(result.rental.detail.len(), 4);
}

#[test]
fn open_ended_booking_is_not_rented() {
    let config = load_config("");
    let mut input = load_input(&config);
    let mut availability = read_table("Availability.csv");
    availability.rows.push(vec![
        "2024-06-10".into(),
        String::new(),
        "Kayak".into(),
        "5".into(),
    ]);
    input.insert(invdelta_recon::InputName::Availability, availability);

    let result = run(&config, &input, config.reference_date.unwrap()).unwrap();
    let kayak = result.rental.detail.iter().find(|r| r.asset == "Kayak").unwrap();
    assert_eq!(kayak.rented, 1);
    assert_eq!(kayak.delta, -2);
}

// -------------------------------------------------------------------------
// Failures
// -------------------------------------------------------------------------

#[test]
fn every_missing_input_is_reported() {
    let config = load_config("");
    let mut input = load_input(&config);
    input.tables.retain(|name, _| name.to_string() == "availability");

    let err = run(&config, &input, config.reference_date.unwrap()).unwrap_err();
    match err {
        ReconError::MissingInputs(missing) => {
            let files: Vec<&str> = missing.iter().map(|m| m.file.as_str()).collect();
            assert_eq!(
                files,
                vec![
                    "Inventory.csv",
                    "Warehouse.csv",
                    "Seagrove.csv",
                    "Pointe.csv",
                    "House Bikes.csv",
                ]
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn header_mismatch_is_fatal() {
    let config = load_config("");
    let mut input = load_input(&config);
    input.insert(
        invdelta_recon::InputName::Availability,
        Table::from_rows("Availability.csv", &["From", "To", "Item", "Qty"], &[]),
    );
    let err = run(&config, &input, config.reference_date.unwrap()).unwrap_err();
    assert_eq!(err.to_string(), "input 'availability': missing column 'Start'");
}
