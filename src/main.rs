mod annotate;
mod config;
mod data;
mod error;
mod live;
mod log;
mod pipeline;
mod render;
mod source;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::{Parser, Subcommand};

use annotate::AnnotationToggle;
use config::AnalyzerConfig;
use data::elements::ReferenceLineTable;
use log::session::SessionLog;
use pipeline::Pipeline;
use render::{CsvSink, MultiSink, RenderSink, TerminalSink};

#[derive(Parser)]
#[command(
    name = "spectropix",
    version,
    about = "Analyze photographed optical spectra: calibrated curves, peaks, element candidates"
)]
struct Cli {
    /// JSON config file overriding the built-in defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// JSON reference line table (element name -> wavelengths in nm)
    #[arg(long, global = true)]
    elements: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze one captured spectrum image
    Analyze {
        /// Image file to analyze; defaults to the newest image in --dir
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// Watch folder scanned for the newest capture
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Write the calibrated curve as CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Save the session log here (JSON with a .json extension, text otherwise)
        #[arg(long)]
        session_log: Option<PathBuf>,

        /// Leave the source image in place instead of moving it to processed/
        #[arg(long, default_value_t = false)]
        keep: bool,

        /// Toggle an annotation at this wavelength in nm (repeatable)
        #[arg(long = "inspect", value_name = "NM")]
        inspect: Vec<f64>,
    },
    /// Stream frames from a camera endpoint and analyze continuously
    Live {
        /// Still-image endpoint, e.g. http://device-ip:8080/shot.jpg
        #[arg(short, long)]
        url: String,

        /// Keep the latest curve mirrored to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    ::log::info!("spectropix v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AnalyzerConfig::from_json_file(path)?,
        None => AnalyzerConfig::default(),
    };
    let table = match &cli.elements {
        Some(path) => ReferenceLineTable::from_json_file(path)?,
        None => ReferenceLineTable::builtin(),
    };
    ::log::info!("reference table: {} elements", table.num_elements());

    match cli.command {
        Command::Analyze { image, dir, csv, session_log, keep, inspect } => {
            run_analyze(config, &table, image, &dir, csv, session_log, keep, &inspect)
        }
        Command::Live { url, csv } => run_live_mode(config, &table, &url, csv),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_analyze(
    config: AnalyzerConfig,
    table: &ReferenceLineTable,
    image: Option<PathBuf>,
    dir: &std::path::Path,
    csv: Option<PathBuf>,
    session_log: Option<PathBuf>,
    keep: bool,
    inspect: &[f64],
) -> Result<(), Box<dyn std::error::Error>> {
    let (path, from_watch_folder) = match image {
        Some(path) => (path, false),
        None => match source::latest_image_in(dir)? {
            Some(path) => (path, true),
            None => {
                return Err(format!("no image files found in {}", dir.display()).into());
            }
        },
    };

    let mut session = SessionLog::new();
    session.set_source(&path.display().to_string());

    let img = image::open(&path)?;
    session.add_entry(
        "Load",
        &format!("{} ({}x{})", path.display(), img.width(), img.height()),
    );

    let pipeline = Pipeline::new(config)?;
    let frame = pipeline.process_image(&img, &mut session)?;
    let tolerance = pipeline.config().offline_tolerance();
    let identifications = frame.identify(table, tolerance);

    let mut sink = MultiSink::new();
    sink.push(Box::new(TerminalSink));
    if let Some(csv_path) = &csv {
        sink.push(Box::new(CsvSink::new(csv_path)));
    }
    sink.render_frame(&frame, &identifications)?;

    let mut toggle = AnnotationToggle::new();
    for &wavelength in inspect {
        match toggle.toggle(wavelength, &frame.peaks, table, tolerance) {
            Some(command) => sink.annotation(&command)?,
            None => ::log::warn!("no peaks to inspect near {:.1} nm", wavelength),
        }
    }
    sink.close()?;

    if from_watch_folder && !keep {
        let dest = source::move_to_processed(&path)?;
        session.add_entry("Archive", &format!("moved to {}", dest.display()));
    }

    if let Some(log_path) = session_log {
        let is_json = log_path
            .extension()
            .map(|e| e.to_string_lossy().eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            session.save_json(&log_path)?;
        } else {
            session.save_text(&log_path)?;
        }
        ::log::info!("session log saved to {}", log_path.display());
    }

    Ok(())
}

fn run_live_mode(
    config: AnalyzerConfig,
    table: &ReferenceLineTable,
    url: &str,
    csv: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut pipeline = Pipeline::new(config)?;
    let fetcher = source::FrameFetcher::new(url)?;

    let mut sink = MultiSink::new();
    sink.push(Box::new(TerminalSink));
    if let Some(csv_path) = &csv {
        sink.push(Box::new(CsvSink::new(csv_path)));
    }

    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    ctrlc::set_handler(move || {
        flag.store(false, Ordering::SeqCst);
    })?;

    live::run_live(&mut pipeline, table, &fetcher, &mut sink, &running)?;
    Ok(())
}
