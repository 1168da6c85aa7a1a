//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain     | Description                                   |
//! |---------|------------|-----------------------------------------------|
//! | 0       | Universal  | Success                                       |
//! | 1       | run        | Nonzero deltas found (`--fail-on-delta`)      |
//! | 2       | Universal  | CLI usage error (bad args, bad date)          |
//! | 60-69   | delta      | Config, input and output failures             |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, missing required options.
/// clap exits with the same code on its own parse errors.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Delta (1, 60-69)
// =============================================================================

/// At least one asset has a nonzero delta and `--fail-on-delta` was given.
/// Like `diff(1)`, exit 1 means "inventory differs."
pub const EXIT_DELTAS_FOUND: u8 = 1;

/// Config could not be parsed or failed validation.
pub const EXIT_INVALID_CONFIG: u8 = 60;

/// One or more required input files are absent.
pub const EXIT_MISSING_INPUTS: u8 = 61;

/// An input file could not be parsed (bad header, date or quantity).
pub const EXIT_INPUT_PARSE: u8 = 62;

/// Filesystem failure reading the config or writing reports.
pub const EXIT_IO: u8 = 63;
