/// Rendering sink boundary.
///
/// The pipeline hands every processed frame to a `RenderSink`; actual
/// drawing (plots, annotations, colors) happens on the other side of
/// this trait. Two plain sinks ship with the CLI: a terminal summary and
/// a CSV writer.
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::annotate::{AnnotationCommand, AnnotationPayload};
use crate::error::Result;
use crate::pipeline::{PeakIdentification, SpectrumFrame};

/// A visible-spectrum band hint for display highlighting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavelengthBand {
    pub low_nm: f64,
    pub high_nm: f64,
    pub label: &'static str,
}

/// The three fixed highlight bands of the live display.
pub const HIGHLIGHT_BANDS: [WavelengthBand; 3] = [
    WavelengthBand { low_nm: 400.0, high_nm: 500.0, label: "blue" },
    WavelengthBand { low_nm: 500.0, high_nm: 600.0, label: "green" },
    WavelengthBand { low_nm: 600.0, high_nm: 700.0, label: "red" },
];

pub trait RenderSink {
    /// A freshly processed frame with its element candidates.
    fn render_frame(
        &mut self,
        frame: &SpectrumFrame,
        identifications: &[PeakIdentification],
    ) -> Result<()>;

    /// An annotation toggled on or off.
    fn annotation(&mut self, command: &AnnotationCommand) -> Result<()>;

    /// Flush and release the sink. Called once, on shutdown.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Prints a per-frame summary to the terminal.
#[derive(Debug, Default)]
pub struct TerminalSink;

impl RenderSink for TerminalSink {
    fn render_frame(
        &mut self,
        frame: &SpectrumFrame,
        identifications: &[PeakIdentification],
    ) -> Result<()> {
        println!(
            "{} samples, {:.1}-{:.1} nm, {} peaks",
            frame.intensity.len(),
            frame.wavelengths.first().copied().unwrap_or(0.0),
            frame.wavelengths.last().copied().unwrap_or(0.0),
            frame.peaks.len()
        );
        for id in identifications {
            let band = HIGHLIGHT_BANDS
                .iter()
                .find(|b| id.peak.wavelength >= b.low_nm && id.peak.wavelength < b.high_nm)
                .map(|b| b.label)
                .unwrap_or("outside visible bands");
            if id.matches.is_empty() {
                println!(
                    "  peak @ {:7.1} nm ({}) — no matching elements",
                    id.peak.wavelength, band
                );
            } else {
                let names: Vec<String> = id.matches.iter().map(|m| m.to_string()).collect();
                println!(
                    "  peak @ {:7.1} nm ({}) — {}",
                    id.peak.wavelength,
                    band,
                    names.join(", ")
                );
            }
        }
        Ok(())
    }

    fn annotation(&mut self, command: &AnnotationCommand) -> Result<()> {
        match command {
            AnnotationCommand::Show { wavelength, payload, .. } => match payload {
                AnnotationPayload::Matches(matches) => {
                    let names: Vec<String> = matches.iter().map(|m| m.to_string()).collect();
                    println!("  [annotate {:.1} nm] {}", wavelength, names.join(", "));
                }
                AnnotationPayload::NoMatch => {
                    println!("  [annotate {:.1} nm] no matching elements", wavelength);
                }
            },
            AnnotationCommand::Retract { wavelength } => {
                println!("  [retract {:.1} nm]", wavelength);
            }
        }
        Ok(())
    }
}

/// Writes each frame as `wavelength_nm,intensity,is_peak` rows.
/// Successive frames overwrite: the file always holds the latest curve.
pub struct CsvSink {
    path: std::path::PathBuf,
}

impl CsvSink {
    pub fn new(path: &Path) -> Self {
        Self { path: path.to_path_buf() }
    }
}

impl RenderSink for CsvSink {
    fn render_frame(
        &mut self,
        frame: &SpectrumFrame,
        _identifications: &[PeakIdentification],
    ) -> Result<()> {
        let mut out = BufWriter::new(File::create(&self.path)?);
        writeln!(out, "wavelength_nm,intensity,is_peak")?;
        for (i, (wl, v)) in frame
            .wavelengths
            .iter()
            .zip(frame.intensity.samples())
            .enumerate()
        {
            let is_peak = frame.peaks.iter().any(|p| p.index == i);
            writeln!(out, "{:.3},{:.4},{}", wl, v, u8::from(is_peak))?;
        }
        out.flush()?;
        Ok(())
    }

    fn annotation(&mut self, _command: &AnnotationCommand) -> Result<()> {
        // Annotations are a display concern; the CSV only carries the curve.
        Ok(())
    }
}

/// Fan-out to several sinks; frames go to each in order.
#[derive(Default)]
pub struct MultiSink {
    sinks: Vec<Box<dyn RenderSink>>,
}

impl MultiSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: Box<dyn RenderSink>) {
        self.sinks.push(sink);
    }
}

impl RenderSink for MultiSink {
    fn render_frame(
        &mut self,
        frame: &SpectrumFrame,
        identifications: &[PeakIdentification],
    ) -> Result<()> {
        for sink in &mut self.sinks {
            sink.render_frame(frame, identifications)?;
        }
        Ok(())
    }

    fn annotation(&mut self, command: &AnnotationCommand) -> Result<()> {
        for sink in &mut self.sinks {
            sink.annotation(command)?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        for sink in &mut self.sinks {
            sink.close()?;
        }
        Ok(())
    }
}
