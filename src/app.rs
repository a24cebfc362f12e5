//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - builds the session and runs the selection pipeline
//! - prints tables/charts
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, DataArgs, OutputArgs, PickArgs, PlotArgs, ShowArgs};
use crate::domain::{ChartData, PipelineConfig};
use crate::error::AppError;

pub mod pipeline;
pub mod session;

pub use session::Session;

/// Entry point for the `cpi` binary.
pub fn run() -> Result<(), AppError> {
    // A missing `.env` is the normal case.
    match dotenvy::dotenv() {
        Err(err) if !err.not_found() => log::warn!("ignoring unreadable .env: {err}"),
        _ => {}
    }

    // We want `cpi` and `cpi --any-title` to behave like `cpi tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::List(args) => handle_list(args),
        Command::Show(args) => handle_show(args),
        Command::Pick(args) => handle_pick(args),
        Command::Plot(args) => handle_plot(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn handle_list(args: DataArgs) -> Result<(), AppError> {
    let mut session = Session::new(pipeline_config_from_args(&args));
    let catalog = session.catalog()?;

    if catalog.is_empty() {
        println!("No series match the current filters.");
        return Ok(());
    }
    print!("{}", crate::report::format_catalog(&catalog.rows));
    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let mut session = Session::new(pipeline_config_from_args(&args.data));
    let run = pipeline::run_for_id(&mut session, &args.series_id)?;
    print_selection(&run, &args.output)
}

fn handle_pick(args: PickArgs) -> Result<(), AppError> {
    let mut session = Session::new(pipeline_config_from_args(&args.data));
    let catalog = session.catalog()?;

    let Some(series) = crate::cli::picker::prompt_for_series(&catalog.rows)? else {
        println!("Please select a series to continue.");
        return Ok(());
    };

    let run = pipeline::run_for_id(&mut session, &series.id)?;
    print_selection(&run, &args.output)
}

fn handle_tui(args: DataArgs) -> Result<(), AppError> {
    crate::tui::run(pipeline_config_from_args(&args))
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let report = crate::io::read_report_json(&args.report)?;
    log::info!(
        "replotting {} ({} generated at {})",
        report.series.id,
        report.tool,
        report.generated_at.to_rfc3339()
    );

    print!("{}", crate::report::format_series_header(&report.series));
    println!();
    print_charts(&report.series.title, &report.charts, args.width, args.height);
    Ok(())
}

fn print_selection(run: &pipeline::SelectionOutput, output: &OutputArgs) -> Result<(), AppError> {
    print!("{}", crate::report::format_report(&run.report));

    if !output.no_plot && !run.report.is_empty() {
        println!();
        print_charts(&run.series.title, &run.report.charts, output.width, output.height);
    }

    // Optional exports.
    if let Some(path) = &output.export {
        crate::io::write_results_csv(path, &run.converted)?;
    }
    if let Some(path) = &output.export_json {
        crate::io::write_report_json(path, &run.series, &run.converted)?;
    }
    Ok(())
}

fn print_charts(title: &str, charts: &ChartData, width: usize, height: usize) {
    let usd = crate::plot::render_ascii_line_chart(&format!("{title}: Annual Average (USD)"), &charts.usd, width, height);
    println!("{usd}");
    let sats = crate::plot::render_ascii_line_chart(&format!("{title}: Annual Average (sats)"), &charts.sats, width, height);
    println!("{sats}");
}

pub fn pipeline_config_from_args(args: &DataArgs) -> PipelineConfig {
    let (min_year, min_end_year) = if args.all_years {
        (None, None)
    } else {
        (Some(args.min_year), Some(args.min_end_year))
    };

    let title_filter = if args.any_title || args.title_filter.trim().is_empty() {
        None
    } else {
        Some(args.title_filter.clone())
    };

    PipelineConfig {
        series_path: args.series_file.clone(),
        price_path: args.price_file.clone(),
        reference_path: args.reference_file.clone(),
        title_filter,
        min_end_year,
        min_year,
    }
}

/// Rewrite argv so `cpi` defaults to `cpi tui`.
///
/// Rules:
/// - `cpi`                      -> `cpi tui`
/// - `cpi --any-title ...`      -> `cpi tui --any-title ...`
/// - `cpi --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "list" | "show" | "pick" | "plot" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_tui() {
        assert_eq!(rewrite_args(argv(&["cpi"])), argv(&["cpi", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["cpi", "--any-title"])),
            argv(&["cpi", "tui", "--any-title"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(rewrite_args(argv(&["cpi", "show", "X"])), argv(&["cpi", "show", "X"]));
        assert_eq!(rewrite_args(argv(&["cpi", "--help"])), argv(&["cpi", "--help"]));
    }

    fn data_args() -> DataArgs {
        DataArgs {
            series_file: PathBuf::from("s"),
            price_file: PathBuf::from("p"),
            reference_file: PathBuf::from("r"),
            title_filter: "U.S. City Average".to_string(),
            any_title: false,
            min_year: 2017,
            min_end_year: 2018,
            all_years: false,
        }
    }

    #[test]
    fn config_carries_filters() {
        let config = pipeline_config_from_args(&data_args());
        assert_eq!(config.title_filter.as_deref(), Some("U.S. City Average"));
        assert_eq!(config.min_year, Some(2017));
        assert_eq!(config.min_end_year, Some(2018));
        assert_eq!(config.reference_path, PathBuf::from("r"));
    }

    #[test]
    fn escape_hatches_disable_filters() {
        let mut args = data_args();
        args.any_title = true;
        args.all_years = true;
        let config = pipeline_config_from_args(&args);
        assert_eq!(config.title_filter, None);
        assert_eq!(config.min_year, None);
        assert_eq!(config.min_end_year, None);
    }
}
