use std::path::{Path, PathBuf};

use clap::Parser;

use radargram::config::{ProcessingConfig, RelativePermittivity};
use radargram::output::{OutputFormat, SurveyReport, create_formatter};
use radargram::processing::{SurveyProcessor, max_trace_count};
use radargram::survey::Channel;
use radargram::units::{HorizontalUnit, VerticalUnit};

#[derive(Parser, Debug)]
#[command(name = "survey_info")]
#[command(about = "Decode GPR survey files and summarise their contents", long_about = None)]
struct Args {
    /// Survey files (.rd3, .rd7, .dzt)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output format: text, csv, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Relative permittivity of the ground; unusable values fall back to 6
    #[arg(short = 'e', long, default_value = "8")]
    epsilon: String,

    /// TOML processing configuration applied before summarising
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Band to keep from dual-channel surveys
    #[arg(long, value_enum)]
    channel: Option<Channel>,

    /// Pad every survey with zero traces to the longest one
    #[arg(long)]
    equalize: bool,

    /// Print the vertical axis extent in this unit
    #[arg(long, value_enum)]
    vertical: Option<VerticalUnit>,

    /// Print the horizontal axis extent in this unit
    #[arg(long, value_enum)]
    horizontal: Option<HorizontalUnit>,

    /// Survey length in metres, overriding the file header
    #[arg(long)]
    distance: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let permittivity = RelativePermittivity::parse_or_fallback(&args.epsilon);

    let mut config = match &args.config {
        Some(path) => ProcessingConfig::load(path)?,
        None => ProcessingConfig::default(),
    };
    if args.channel.is_some() {
        config.channel = args.channel;
    }
    if args.equalize {
        config.pad_to = max_trace_count(&args.files);
        log::info!("Equalising to {:?} traces", config.pad_to);
    }
    let processor = SurveyProcessor::new(config)?;

    let reports: Vec<SurveyReport> = args
        .files
        .iter()
        .enumerate()
        .map(|(position, path)| {
            summarise(path, position, &processor, permittivity, &args)
                .unwrap_or_else(|e| SurveyReport::failed(path, &*e))
        })
        .collect();

    let formatter = create_formatter(args.format, args.verbose > 0);
    print!("{}", formatter.format(&reports)?);
    Ok(())
}

fn summarise(
    path: &Path,
    position: usize,
    processor: &SurveyProcessor,
    permittivity: RelativePermittivity,
    args: &Args,
) -> anyhow::Result<SurveyReport> {
    let survey = processor.prepare(&radargram::decode(path)?)?;
    let amplitudes = processor.process(&survey, position)?;
    let report = SurveyReport::new(path, &survey, &amplitudes, permittivity.value())?;

    if args.vertical.is_some() || args.horizontal.is_some() {
        let mut units = survey.unit_converter(permittivity.value())?;
        if let Some(distance) = args.distance {
            units = units.with_max_distance(distance)?;
        }
        if let Some(unit) = args.vertical {
            eprintln!(
                "{}: vertical extent {:.3} ({:?})",
                report.filename,
                units.vertical_extent(unit, amplitudes.nrows()),
                unit
            );
        }
        if let Some(unit) = args.horizontal {
            eprintln!(
                "{}: horizontal extent {:.3} ({:?})",
                report.filename,
                units.horizontal_extent(unit, amplitudes.ncols()),
                unit
            );
        }
    }
    Ok(report)
}
