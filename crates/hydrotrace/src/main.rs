use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use hydrotrace_core::calculator::apply_desorption_rate;
use hydrotrace_core::settings::DEFAULT_SETTINGS_FILE;
use hydrotrace_core::{
    AlignmentOptions, CalculationMode, Command as SessionCommand, FlowSettings,
    MeasurementParameters, Outcome, PlotMode, PlotSeries, RunTimestampIndexing, Session,
};
use hydrotrace_parser::{parser_descriptors, ChemStationFormat};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Trace hydrogen analysis for chem station reports", long_about = None)]
struct Cli {
    /// Settings file holding the hydrogen standard content and carrier gas molar rate
    #[arg(long, global = true, env = "HYDROTRACE_SETTINGS")]
    settings: Option<PathBuf>,
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Total hydrogen content (ppm) of a report
    Total(ReportArgs),
    /// Desorption rate (ppm/min) of every run in a report
    Rates(ReportArgs),
    /// Peak area against run number
    Plot(ReportArgs),
    /// Interpolate a temperature log onto the run times
    Align(AlignArgs),
    /// List the supported report layouts
    Formats,
    /// Show or change the persisted settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// Chem station text report (UTF-16)
    report: PathBuf,
    /// Report layout revision
    #[arg(long, default_value = "legacy", value_parser = parse_format)]
    format: ChemStationFormat,
    #[command(flatten)]
    measurement: MeasurementArgs,
}

#[derive(Args, Debug)]
struct MeasurementArgs {
    /// Hydrogen standard peak area
    #[arg(long, default_value_t = 86485.0)]
    std_peak_area: f64,
    /// Sample weight (g)
    #[arg(long, default_value_t = 5.0)]
    weight: f64,
    /// Gas flow rate during test (mL/min)
    #[arg(long, default_value_t = 20.0)]
    flow_rate: f64,
    /// Cycle time of an individual run (min)
    #[arg(long, default_value_t = 2.3)]
    cycle_time: f64,
}

impl From<&MeasurementArgs> for MeasurementParameters {
    fn from(args: &MeasurementArgs) -> Self {
        MeasurementParameters {
            h_std_peak_area: args.std_peak_area,
            sample_weight: args.weight,
            flow_rate: args.flow_rate,
            cycle_time: args.cycle_time,
        }
    }
}

#[derive(Args, Debug)]
struct AlignArgs {
    #[command(flatten)]
    report: ReportArgs,
    /// Temperature logger CSV export
    temperature: PathBuf,
    /// Minutes added to every temperature timestamp
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    delay: f64,
    /// Offset from run index to timestamp row
    #[arg(long, allow_negative_numbers = true, conflicts_with = "sequential")]
    run_offset: Option<i64>,
    /// Pair the n-th run with the n-th timestamp instead of using the run index
    #[arg(long)]
    sequential: bool,
    /// Write the aligned series to this file
    #[arg(long)]
    export: Option<PathBuf>,
    /// Print points for one plot mode
    #[arg(long, value_parser = parse_plot_mode)]
    plot: Option<PlotMode>,
}

impl AlignArgs {
    fn options(&self) -> AlignmentOptions {
        let indexing = if self.sequential {
            RunTimestampIndexing::Sequential
        } else {
            self.run_offset
                .map(RunTimestampIndexing::Offset)
                .unwrap_or_default()
        };
        AlignmentOptions {
            delay_minutes: self.delay,
            indexing,
        }
    }
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    /// Print the current settings
    Show,
    /// Update and persist settings
    Set {
        /// Hydrogen standard content (ppm)
        #[arg(long)]
        content: Option<f64>,
        /// Carrier gas molar rate (µmol/s)
        #[arg(long)]
        molar_rate: Option<f64>,
    },
}

fn parse_format(value: &str) -> Result<ChemStationFormat, String> {
    ChemStationFormat::try_from(value)
}

fn parse_plot_mode(value: &str) -> Result<PlotMode, String> {
    PlotMode::try_from(value)
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let settings_path = cli
        .settings
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));
    let mut session = Session::open(&settings_path)
        .with_context(|| format!("failed to set up settings at {}", settings_path.display()))?;

    match cli.command {
        Command::Total(args) => handle_total(&mut session, &args, cli.json),
        Command::Rates(args) => handle_rates(&mut session, &args, cli.json),
        Command::Plot(args) => handle_plot(&mut session, &args, cli.json),
        Command::Align(args) => handle_align(&mut session, &args, cli.json),
        Command::Formats => {
            handle_formats();
            Ok(())
        }
        Command::Settings { action } => handle_settings(&mut session, action, cli.json),
    }
}

fn load_report(session: &mut Session, args: &ReportArgs) -> Result<()> {
    session.dispatch(SessionCommand::SetMeasurement((&args.measurement).into()))?;
    session
        .dispatch(SessionCommand::LoadChemStation {
            path: args.report.clone(),
            format: args.format,
        })
        .with_context(|| format!("failed to load {}", args.report.display()))?;
    Ok(())
}

fn handle_total(session: &mut Session, args: &ReportArgs, json: bool) -> Result<()> {
    load_report(session, args)?;
    let outcome = session.dispatch(SessionCommand::Calculate(CalculationMode::Total))?;

    if json {
        print_json(&outcome)
    } else {
        println!("Result (ppm): {}", session.result_text());
        Ok(())
    }
}

fn handle_rates(session: &mut Session, args: &ReportArgs, json: bool) -> Result<()> {
    load_report(session, args)?;
    let outcome = session.dispatch(SessionCommand::Calculate(CalculationMode::Rate))?;

    if json {
        return print_json(&outcome);
    }

    let Some(report) = session.chem_report() else {
        bail!("no chem station data loaded");
    };
    let df = apply_desorption_rate(&report.runs_dataframe()?, &session.instrument_config())?;
    println!("{df}");
    Ok(())
}

fn handle_plot(session: &mut Session, args: &ReportArgs, json: bool) -> Result<()> {
    load_report(session, args)?;
    let outcome = session.dispatch(SessionCommand::Plot(PlotMode::AreaVsRun))?;
    print_plot(&outcome, json)
}

fn handle_align(session: &mut Session, args: &AlignArgs, json: bool) -> Result<()> {
    load_report(session, &args.report)?;
    session.dispatch(SessionCommand::Calculate(CalculationMode::Rate))?;
    session
        .dispatch(SessionCommand::LoadTemperature {
            path: args.temperature.clone(),
        })
        .with_context(|| format!("failed to load {}", args.temperature.display()))?;
    session
        .dispatch(SessionCommand::Align(args.options()))
        .context("temperature log does not cover the run times; adjust --delay or --run-offset")?;

    if let Some(path) = &args.export {
        session.dispatch(SessionCommand::Export { path: path.clone() })?;
        info!(path = %path.display(), "aligned series exported");
    }

    if let Some(mode) = args.plot {
        let outcome = session.dispatch(SessionCommand::Plot(mode))?;
        return print_plot(&outcome, json);
    }

    let Some(series) = session.aligned() else {
        bail!("alignment produced no series");
    };
    if json {
        return print_json(series);
    }
    println!("origin: {}", series.origin);
    println!("Time (min),Temp (C),D_rate (ppm/min)");
    for ((time, temp), rate) in series
        .common_time
        .iter()
        .zip(&series.common_temp)
        .zip(&series.desorption_rate)
    {
        println!("{time:.4},{temp:.4},{rate:.6}");
    }
    Ok(())
}

fn handle_formats() {
    for descriptor in parser_descriptors() {
        println!(
            "{:<8} {:<20} {}",
            descriptor.format.as_str(),
            descriptor.code,
            descriptor.description
        );
    }
}

fn handle_settings(session: &mut Session, action: SettingsAction, json: bool) -> Result<()> {
    if let SettingsAction::Set {
        content,
        molar_rate,
    } = action
    {
        let current = session.settings().flow;
        let flow = FlowSettings {
            content: content.unwrap_or(current.content),
            molar_rate: molar_rate.unwrap_or(current.molar_rate),
        };
        session.dispatch(SessionCommand::UpdateSettings(flow))?;
    }

    if json {
        return print_json(session.settings());
    }
    print_settings(session.settings_path(), &session.settings().flow);
    Ok(())
}

fn print_settings(path: &Path, flow: &FlowSettings) {
    println!("settings file: {}", path.display());
    println!("H std content (ppm): {}", flow.content);
    println!("Carrier gas molar rate (µmol/s): {}", flow.molar_rate);
}

fn print_plot(outcome: &Outcome, json: bool) -> Result<()> {
    let Outcome::Plot(series) = outcome else {
        bail!("expected plot output, got {outcome:?}");
    };
    if json {
        return print_json(series);
    }
    print_points(series);
    Ok(())
}

fn print_points(series: &PlotSeries) {
    println!("{},{}", series.x_label, series.y_label);
    for (x, y) in &series.points {
        println!("{x},{y}");
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{text}");
    Ok(())
}
