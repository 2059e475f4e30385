use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use radargram::format::SurveyFormat;
use radargram::simulation::{
    DztOptions, MalaHeader, SyntheticSurveyConfig, generate_radargram, write_dzt, write_mala,
};

#[derive(Parser, Debug)]
#[command(name = "generate_survey")]
#[command(about = "Generate synthetic GPR survey files for decoder and pipeline testing")]
struct Args {
    /// TOML radargram configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "data/synthetic")]
    output_dir: PathBuf,

    /// Formats to write: comma-separated list of rd3, rd7, dzt
    #[arg(short, long, default_value = "rd3,rd7,dzt")]
    formats: String,

    /// Number of survey lines per format
    #[arg(short, long, default_value_t = 1)]
    lines: u32,

    /// Base seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Samples per trace (CLI override)
    #[arg(long)]
    samples: Option<usize>,

    /// Traces per line (CLI override)
    #[arg(long)]
    traces: Option<usize>,

    /// Noise standard deviation (CLI override)
    #[arg(long)]
    noise: Option<f64>,

    /// Time window in ns
    #[arg(long, default_value_t = 100.0)]
    time_window: f64,

    /// Output filename prefix
    #[arg(long, default_value = "line")]
    prefix: String,

    /// Generate manifest.json
    #[arg(long)]
    manifest: bool,
}

#[derive(Debug, Deserialize, Default)]
struct TomlConfig {
    radargram: Option<SyntheticSurveyConfig>,
}

#[derive(Debug, serde::Serialize)]
struct ManifestEntry {
    file: String,
    format: SurveyFormat,
    seed: u64,
    samples: usize,
    traces: usize,
}

fn parse_formats(s: &str) -> Result<Vec<SurveyFormat>> {
    s.split(',')
        .map(|part| {
            let ext = part.trim().to_ascii_lowercase();
            SurveyFormat::ALL
                .into_iter()
                .find(|f| f.extension() == ext)
                .with_context(|| format!("Unknown format '{}'", part.trim()))
        })
        .collect()
}

fn load_toml_config(path: &PathBuf) -> Result<TomlConfig> {
    let content = fs::read_to_string(path).context("Failed to read config file")?;
    toml::from_str(&content).context("Failed to parse config file")
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    fs::create_dir_all(&args.output_dir).context("Failed to create output directory")?;

    let toml_config = if let Some(ref config_path) = args.config {
        load_toml_config(config_path)?
    } else {
        TomlConfig::default()
    };
    let mut base = toml_config.radargram.unwrap_or_default();
    if let Some(samples) = args.samples {
        base.samples = samples;
    }
    if let Some(traces) = args.traces {
        base.traces = traces;
    }
    if let Some(noise) = args.noise {
        base.noise_std = noise;
    }

    let formats = parse_formats(&args.formats)?;
    let base_seed = args.seed.unwrap_or(0);
    let total_files = formats.len() * args.lines as usize;
    let mut manifest_entries = Vec::new();

    for line in 0..args.lines {
        let seed = base_seed + line as u64;
        let config = base.clone().with_seed(seed);
        let amplitudes = generate_radargram(&config).context("Failed to generate radargram")?;

        for &format in &formats {
            let filename = format!("{}_{:03}.{}", args.prefix, line, format.extension());
            let filepath = args.output_dir.join(&filename);
            match format {
                SurveyFormat::Dzt => {
                    let options = DztOptions {
                        bits: 32,
                        range_ns: args.time_window as f32,
                        created: Some(Utc::now().naive_utc()),
                        ..Default::default()
                    };
                    write_dzt(&filepath, &amplitudes, &options)
                }
                SurveyFormat::Rd3 | SurveyFormat::Rd7 => {
                    let header = MalaHeader {
                        time_window_ns: args.time_window,
                        ..Default::default()
                    };
                    write_mala(&filepath, format, &amplitudes, &header)
                }
            }
            .with_context(|| format!("Failed to write {}", filepath.display()))?;

            manifest_entries.push(ManifestEntry {
                file: filename,
                format,
                seed,
                samples: config.samples,
                traces: config.traces,
            });
            eprint!("\rGenerating: {}/{}", manifest_entries.len(), total_files);
        }
    }
    eprintln!();

    if args.manifest {
        let manifest_path = args.output_dir.join("manifest.json");
        let manifest_json = serde_json::to_string_pretty(&manifest_entries)
            .context("Failed to serialize manifest")?;
        fs::write(&manifest_path, manifest_json).context("Failed to write manifest")?;
        eprintln!("Manifest written to: {}", manifest_path.display());
    }

    eprintln!(
        "Generated {} files in {}",
        total_files,
        args.output_dir.display()
    );
    Ok(())
}
