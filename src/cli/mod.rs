//! Command-line parsing for the CPI price viewer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the loading/pricing code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "cpi", version, about = "CPI average prices in USD and Bitcoin")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the (filtered) series catalog.
    List(DataArgs),
    /// Print the annual price table and charts for one series.
    Show(ShowArgs),
    /// Choose a series from a numbered list, then print it like `show`.
    Pick(PickArgs),
    /// Plot a previously exported report JSON.
    Plot(PlotArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same selection pipeline as `cpi show`, but renders results
    /// in a terminal UI using Ratatui.
    Tui(DataArgs),
}

/// Input files and catalog/observation filters, shared by every data command.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Series catalog (tab-delimited, `series_id` / `series_title` / `end_year`).
    #[arg(long, env = "CPI_SERIES_FILE", default_value = "ap.series")]
    pub series_file: PathBuf,

    /// CPI observations (tab-delimited, `series_id` / `year` / `period` / `value`).
    #[arg(long, env = "CPI_PRICE_FILE", default_value = "ap.data.0.Current")]
    pub price_file: PathBuf,

    /// BTC/USD prices (tab-delimited, `year` / `period` / `value`).
    #[arg(long, env = "BTC_PRICE_FILE", default_value = "bitcoin.price.period")]
    pub reference_file: PathBuf,

    /// Only list series whose title contains this text (case-insensitive).
    #[arg(long, default_value = "U.S. City Average")]
    pub title_filter: String,

    /// Disable the title filter.
    #[arg(long)]
    pub any_title: bool,

    /// Ignore observations before this year.
    #[arg(long, default_value_t = 2017)]
    pub min_year: i32,

    /// Only list series still published in or after this year.
    #[arg(long, default_value_t = 2017)]
    pub min_end_year: i32,

    /// Disable both year filters.
    #[arg(long)]
    pub all_years: bool,
}

/// Terminal chart and export options.
#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    /// Disable the terminal charts.
    #[arg(long)]
    pub no_plot: bool,

    /// Chart width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Chart height (rows).
    #[arg(long, default_value_t = 16)]
    pub height: usize,

    /// Export the converted table to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the converted table and chart series to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    /// Series identifier, e.g. `APU0000708111`.
    pub series_id: String,

    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args, Clone)]
pub struct PickArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Options for plotting a saved report.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Report JSON file produced by `cpi show --export-json`.
    #[arg(long, value_name = "JSON")]
    pub report: PathBuf,

    /// Chart width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Chart height (rows).
    #[arg(long, default_value_t = 16)]
    pub height: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_defaults() {
        let cli = Cli::try_parse_from(["cpi", "show", "APU0000708111"]).unwrap();
        let Command::Show(args) = cli.command else {
            panic!("expected show");
        };
        assert_eq!(args.series_id, "APU0000708111");
        assert_eq!(args.data.title_filter, "U.S. City Average");
        assert_eq!(args.data.min_year, 2017);
        assert!(!args.output.no_plot);
        assert_eq!(args.output.export, None);
    }

    #[test]
    fn data_flags_parse() {
        let cli = Cli::try_parse_from([
            "cpi",
            "list",
            "--series-file",
            "/tmp/s.tsv",
            "--any-title",
            "--all-years",
        ])
        .unwrap();
        let Command::List(args) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.series_file, PathBuf::from("/tmp/s.tsv"));
        assert!(args.any_title);
        assert!(args.all_years);
    }

    #[test]
    fn show_requires_series_id() {
        assert!(Cli::try_parse_from(["cpi", "show"]).is_err());
    }
}
