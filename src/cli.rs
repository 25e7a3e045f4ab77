//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use peraturan_dl::{RegulationKind, StatusFilter};

/// Harvest legal documents from the peraturan.go.id catalog.
///
/// Searches the public catalog by regulation kind, year, and number,
/// follows pagination, and downloads every referenced document into a
/// `<KIND>/<year>/Nomor <number>/` tree. Direct document URLs can be
/// passed as positional arguments to skip discovery.
#[derive(Parser, Debug)]
#[command(name = "peraturan-dl")]
#[command(author, version, about)]
pub struct Args {
    /// Direct document URLs (https://peraturan.go.id/files/...) to
    /// download without searching
    pub urls: Vec<String>,

    /// Regulation kind to search for (UU, PP, PERPRES, ...)
    #[arg(short = 'k', long, value_parser = parse_kind)]
    pub category: Option<RegulationKind>,

    /// Promulgation year to search for
    #[arg(short = 'y', long)]
    pub year: Option<u16>,

    /// Regulation number to search for
    #[arg(short = 'n', long)]
    pub number: Option<u32>,

    /// Status filter applied to the search
    #[arg(long, value_enum, default_value_t = StatusArg::Active)]
    pub status: StatusArg,

    /// Harvest every kind across a year range (requires --from-year and
    /// --to-year)
    #[arg(long, conflicts_with_all = ["category", "year", "number"])]
    pub all: bool,

    /// First year of the --all range
    #[arg(long, required_if_eq("all", "true"))]
    pub from_year: Option<u16>,

    /// Last year of the --all range
    #[arg(long, required_if_eq("all", "true"))]
    pub to_year: Option<u16>,

    /// Root directory of the archive tree
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Maximum concurrent downloads (1-100)
    #[arg(short = 'c', long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: Option<u8>,

    /// Delay between listing-page fetches in milliseconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub delay_ms: Option<u64>,

    /// Fetch attempts per document, including the first (1-10)
    #[arg(short = 'r', long, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub retries: Option<u8>,

    /// Report what would be downloaded without any network or disk I/O
    #[arg(long)]
    pub demo: bool,

    /// Configuration file (JSON); missing file means defaults
    #[arg(long, default_value = "config.json")]
    pub config: PathBuf,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

/// Status filter as exposed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    /// Regulations currently in force.
    Active,
    /// Revoked regulations.
    Revoked,
    /// No status restriction.
    Any,
}

impl From<StatusArg> for StatusFilter {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Active => StatusFilter::Active,
            StatusArg::Revoked => StatusFilter::Revoked,
            StatusArg::Any => StatusFilter::Any,
        }
    }
}

fn parse_kind(value: &str) -> Result<RegulationKind, String> {
    RegulationKind::from_code(value).ok_or_else(|| {
        let known: Vec<&str> = RegulationKind::ALL.iter().map(|k| k.code()).collect();
        format!("unknown regulation kind {value:?}; known: {}", known.join(", "))
    })
}
