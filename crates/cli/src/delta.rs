//! `invdelta run | validate | inputs`: config-driven inventory delta.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use invdelta_io::report::{write_report_set, write_rows};
use invdelta_recon::config::InputSpec;
use invdelta_recon::model::{DeltaResult, DeltaRow, DeltaSummaryRow};
use invdelta_recon::{DeltaConfig, ReconInput};
use serde::Serialize;

use crate::exit_codes::{EXIT_DELTAS_FOUND, EXIT_MISSING_INPUTS};
use crate::{CliError, RunArgs};

fn read_config(config_path: &Path) -> Result<DeltaConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path).map_err(|e| {
        CliError::io(format!("cannot read config {}: {e}", config_path.display()))
    })?;
    DeltaConfig::from_toml(&config_str).map_err(CliError::recon)
}

/// Input and output paths are relative to the config file's directory.
fn base_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn resolve_date(flag: Option<NaiveDate>, config: &DeltaConfig) -> NaiveDate {
    flag.or(config.reference_date)
        .unwrap_or_else(|| chrono::Local::now().date_naive())
}

/// Every required input whose file is not on disk.
fn absent_inputs(base: &Path, specs: &[InputSpec]) -> Vec<(PathBuf, String)> {
    specs
        .iter()
        .map(|spec| (base.join(&spec.file), spec.name.to_string()))
        .filter(|(path, _)| !path.is_file())
        .collect()
}

pub fn cmd_run(args: RunArgs, quiet: bool) -> Result<(), CliError> {
    let config = read_config(&args.config)?;
    let base = base_dir(&args.config);
    let reference_date = resolve_date(args.date, &config);
    let specs = config.required_inputs();

    let absent = absent_inputs(&base, &specs);
    if !absent.is_empty() {
        for (path, input) in &absent {
            eprintln!("missing: {} ({input})", path.display());
        }
        return Err(CliError {
            code: EXIT_MISSING_INPUTS,
            message: format!("{} required input(s) missing", absent.len()),
            hint: None,
        }
        .with_hint(format!(
            "input files are resolved relative to {}",
            base.display()
        )));
    }

    let mut input = ReconInput::new();
    for spec in specs {
        let table = invdelta_io::load_table(&base.join(&spec.file)).map_err(CliError::load)?;
        log::debug!("{}: {} row(s)", spec.name, table.rows.len());
        input.insert(spec.name, table);
    }

    let result = invdelta_recon::run(&config, &input, reference_date).map_err(CliError::recon)?;

    let out_dir = match (&args.out_dir, &config.output.dir) {
        (Some(dir), _) => dir.clone(),
        (None, Some(dir)) => base.join(dir),
        (None, None) => base.clone(),
    };
    write_reports(&out_dir, &config, &result, quiet)?;

    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::io(format!("cannot write output: {e}")))?;
        if !quiet {
            eprintln!("wrote {}", path.display());
        }
    }

    if args.json {
        println!("{json_str}");
    }

    // Human summary to stderr
    let s = &result.summary;
    if !quiet {
        eprintln!(
            "delta '{}' on {}: rental {} asset(s), {} change(s); house {} asset(s), {} change(s); {} unit(s) short, {} surplus; {} diagnostic(s)",
            result.meta.config_name,
            result.meta.reference_date,
            s.rental_assets,
            s.rental_changes,
            s.house_assets,
            s.house_changes,
            s.units_short,
            s.units_surplus,
            s.diagnostics,
        );
    }

    let changes = s.rental_changes + s.house_changes;
    if args.fail_on_delta && changes > 0 {
        return Err(CliError {
            code: EXIT_DELTAS_FOUND,
            message: format!("{changes} asset(s) with a nonzero delta"),
            hint: None,
        });
    }

    Ok(())
}

fn write_reports(
    out_dir: &Path,
    config: &DeltaConfig,
    result: &DeltaResult,
    quiet: bool,
) -> Result<(), CliError> {
    std::fs::create_dir_all(out_dir)
        .map_err(|e| CliError::io(format!("cannot create {}: {e}", out_dir.display())))?;

    let output = &config.output;
    let detail_reports: [(&str, &[DeltaRow]); 2] = [
        (&output.rental_detail, &result.rental.detail),
        (&output.house_detail, &result.house.detail),
    ];
    let summary_reports: [(&str, &[DeltaSummaryRow]); 2] = [
        (&output.rental_summary, &result.rental.deltas),
        (&output.house_summary, &result.house.deltas),
    ];

    let render_err = |file: &str, message: String| {
        CliError::load(invdelta_io::IoError::Write {
            path: out_dir.join(file),
            message,
        })
    };
    let mut rendered: Vec<(&str, Vec<u8>)> = Vec::with_capacity(4);
    for (file, rows) in detail_reports {
        let bytes = write_rows(Vec::new(), &DeltaRow::HEADERS, rows).map_err(|e| render_err(file, e))?;
        rendered.push((file, bytes));
    }
    for (file, rows) in summary_reports {
        let bytes =
            write_rows(Vec::new(), &DeltaSummaryRow::HEADERS, rows).map_err(|e| render_err(file, e))?;
        rendered.push((file, bytes));
    }

    // All four land together or none do
    let written = write_report_set(out_dir, &rendered).map_err(CliError::load)?;
    if !quiet {
        for path in written {
            eprintln!("wrote {}", path.display());
        }
    }

    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    eprintln!(
        "valid: '{}' with {} count location(s), house category '{}', buffer {} ({})",
        config.name,
        config.counts.len(),
        config.house_category,
        config.buffer_rate,
        config.rounding,
    );
    Ok(())
}

#[derive(Serialize)]
struct InputStatus {
    input: String,
    file: String,
    source: Option<String>,
    present: bool,
}

pub fn cmd_inputs(config_path: PathBuf, json: bool) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    let base = base_dir(&config_path);

    let statuses: Vec<InputStatus> = config
        .required_inputs()
        .into_iter()
        .map(|spec| InputStatus {
            present: base.join(&spec.file).is_file(),
            input: spec.name.to_string(),
            file: spec.file,
            source: spec.source,
        })
        .collect();

    if json {
        let json_str = serde_json::to_string_pretty(&statuses)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    } else {
        let width = statuses.iter().map(|s| s.input.len()).max().unwrap_or(0);
        for s in &statuses {
            let status = if s.present { "ok" } else { "missing" };
            match &s.source {
                Some(source) => {
                    println!("{status:<8} {:<width$}  {}  [{source}]", s.input, s.file)
                }
                None => println!("{status:<8} {:<width$}  {}", s.input, s.file),
            }
        }
    }

    let missing = statuses.iter().filter(|s| !s.present).count();
    if missing > 0 {
        return Err(CliError {
            code: EXIT_MISSING_INPUTS,
            message: format!("{missing} required input(s) missing"),
            hint: None,
        });
    }
    Ok(())
}
