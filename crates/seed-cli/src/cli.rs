//! Command-line arguments of the `seed` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use crate::input::{
    Adoption, Assignment, Concatenation, Edit, parse_adoption, parse_assignment,
    parse_concatenation, parse_edit,
};

#[derive(Parser)]
#[command(
    name = "seed",
    version,
    about = "Map uploaded building files and reconcile building records",
    long_about = "Map the columns of uploaded building files onto the canonical building \
                  schema, and reconcile a canonical building from its source records."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow sample values from uploaded files in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// TOML settings file.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the canonical building fields and their types.
    Fields,

    /// Suggest and validate a column mapping for a CSV file.
    Map(MapArgs),

    /// Reconcile a canonical building from its source records.
    Merge(MergeArgs),
}

#[derive(Args)]
pub struct MapArgs {
    #[arg(value_name = "CSV")]
    pub csv: PathBuf,

    /// Saved suggestions (`{"Header": ["field", confidence]}`) used instead
    /// of fuzzy scoring.
    #[arg(long = "suggestions", value_name = "JSON")]
    pub suggestions: Option<PathBuf>,

    /// Field types (`{"field": "float"}`) replacing the standard schema.
    #[arg(long = "types", value_name = "JSON")]
    pub types: Option<PathBuf>,

    /// Directory of saved mappings reused as previous mappings.
    #[arg(long = "repository", value_name = "DIR", requires = "org")]
    pub repository: Option<PathBuf>,

    #[arg(long = "org", value_name = "ID")]
    pub org: Option<i64>,

    /// Import source label ("Assessed Raw", "Portfolio Raw", ...).
    #[arg(long = "source-type", default_value = "Assessed Raw")]
    pub source_type: String,

    /// Map a header to a field (HEADER=FIELD, empty FIELD ignores it).
    #[arg(long = "set", value_name = "HEADER=FIELD", value_parser = parse_assignment)]
    pub set: Vec<Assignment>,

    /// Concatenate headers into one field (FIELD=H1,H2).
    #[arg(long = "concat", value_name = "FIELD=H1,H2", value_parser = parse_concatenation)]
    pub concat: Vec<Concatenation>,

    /// Write the committed mapping list as JSON.
    #[arg(long = "output", value_name = "JSON")]
    pub output: Option<PathBuf>,

    /// Save the committed mapping to the repository.
    #[arg(long = "save", requires = "repository")]
    pub save: bool,
}

#[derive(Args)]
pub struct MergeArgs {
    /// Canonical building record.
    #[arg(value_name = "CANONICAL_JSON")]
    pub canonical: PathBuf,

    /// Source building records.
    #[arg(value_name = "SOURCE_JSON", required = true)]
    pub sources: Vec<PathBuf>,

    /// Make a source the default for every value it has.
    #[arg(long = "default", value_name = "ID")]
    pub default: Option<i64>,

    /// Take one field from a source (ID:FIELD).
    #[arg(long = "adopt", value_name = "ID:FIELD", value_parser = parse_adoption)]
    pub adopt: Vec<Adoption>,

    /// Take one extra-data value from a source (ID:KEY).
    #[arg(long = "adopt-extra", value_name = "ID:KEY", value_parser = parse_adoption)]
    pub adopt_extra: Vec<Adoption>,

    /// Set a field by hand (FIELD=VALUE).
    #[arg(long = "edit", value_name = "FIELD=VALUE", value_parser = parse_edit)]
    pub edit: Vec<Edit>,

    /// Write the reconciled canonical record as JSON.
    #[arg(long = "output", value_name = "JSON")]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
