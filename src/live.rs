/// Live streaming analysis.
///
/// A single-threaded cooperative loop: fetch a frame, run the pipeline,
/// hand the result to the rendering sink, pause, repeat. Per-frame
/// failures are logged and skipped — the stream keeps going — while an
/// interrupt stops the loop cleanly and closes the sink.
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::data::elements::ReferenceLineTable;
use crate::error::Result;
use crate::pipeline::Pipeline;
use crate::render::RenderSink;
use crate::source::FrameFetcher;

pub fn run_live(
    pipeline: &mut Pipeline,
    table: &ReferenceLineTable,
    fetcher: &FrameFetcher,
    sink: &mut dyn RenderSink,
    running: &AtomicBool,
) -> Result<()> {
    let tolerance = pipeline.config().live_tolerance();
    let pause = Duration::from_millis(pipeline.config().frame_interval_ms);

    log::info!(
        "starting live spectrum analysis from {} (tolerance {} nm)",
        fetcher.url(),
        tolerance
    );

    while running.load(Ordering::SeqCst) {
        // Log-and-continue policy: no backoff, no error budget; every
        // failure is retried on the next tick.
        match process_one(pipeline, table, fetcher, sink, tolerance) {
            Ok(peak_count) => log::debug!("frame processed, {} peaks", peak_count),
            Err(e) => log::warn!("frame skipped: {}", e),
        }
        std::thread::sleep(pause);
    }

    log::info!("stopping live analysis");
    sink.close()
}

fn process_one(
    pipeline: &mut Pipeline,
    table: &ReferenceLineTable,
    fetcher: &FrameFetcher,
    sink: &mut dyn RenderSink,
    tolerance: f64,
) -> Result<usize> {
    let image = fetcher.fetch_frame()?;
    let frame = pipeline.process_frame(&image)?;
    let identifications = frame.identify(table, tolerance);
    sink.render_frame(&frame, &identifications)?;
    Ok(frame.peaks.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerConfig;

    struct CountingSink {
        closed: bool,
    }

    impl RenderSink for CountingSink {
        fn render_frame(
            &mut self,
            _frame: &crate::pipeline::SpectrumFrame,
            _ids: &[crate::pipeline::PeakIdentification],
        ) -> Result<()> {
            Ok(())
        }

        fn annotation(&mut self, _command: &crate::annotate::AnnotationCommand) -> Result<()> {
            Ok(())
        }

        fn close(&mut self) -> Result<()> {
            self.closed = true;
            Ok(())
        }
    }

    #[test]
    fn test_stopped_loop_closes_sink_without_fetching() {
        let mut pipeline = Pipeline::new(AnalyzerConfig::default()).unwrap();
        let table = ReferenceLineTable::builtin();
        // Nothing listens here; the loop must exit before any fetch.
        let fetcher = FrameFetcher::new("http://127.0.0.1:9/shot.jpg").unwrap();
        let mut sink = CountingSink { closed: false };
        let running = AtomicBool::new(false);

        run_live(&mut pipeline, &table, &fetcher, &mut sink, &running).unwrap();
        assert!(sink.closed);
    }
}
