use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use smart_leds::RGB8;

use super::{
    ControllerObserver, ControllerStatus, DominanceTracker, EnergyBaseline, FrameReport,
    INITIAL_RANGE,
};
use crate::audio::{CaptureDevice, FrequencyRange, Spectra, SpectralAnalyzer};
use crate::cadence::CadenceTracker;
use crate::config::ControllerConfig;
use crate::errors::{MyError, MyResult};
use crate::lights::ColorPalette;
use crate::logging::{info, warn};
use crate::output::{LightSink, OFF};

/// Everything the control loop owns. Moves onto the loop's thread while running and comes back when it stops.
pub struct ReactiveLoop {
    analyzer: SpectralAnalyzer,
    sink: Box<dyn LightSink>,
    palette: ColorPalette,
    tracker: DominanceTracker,
    baseline: EnergyBaseline,
    active: FrequencyRange,
    observer: Box<dyn ControllerObserver>,
    last_frame: u64,
}

impl ReactiveLoop {
    pub fn new(
        config: &ControllerConfig,
        analyzer: SpectralAnalyzer,
        sink: Box<dyn LightSink>,
        observer: Box<dyn ControllerObserver>,
    ) -> MyResult<Self> {
        config.validate()?;

        let palette = ColorPalette::new(&config.color_spec())?;

        let [lower, upper] = config.energy_range;

        Ok(Self {
            analyzer,
            sink,
            palette,
            tracker: DominanceTracker::new(Instant::now()),
            baseline: EnergyBaseline::new(lower, upper),
            active: INITIAL_RANGE,
            observer,
            last_frame: 0,
        })
    }

    pub fn active_range(&self) -> FrequencyRange {
        self.active
    }

    pub fn baseline(&self) -> &EnergyBaseline {
        &self.baseline
    }

    pub fn tracker(&self) -> &DominanceTracker {
        &self.tracker
    }

    pub fn analyzer_mut(&mut self) -> &mut SpectralAnalyzer {
        &mut self.analyzer
    }

    /// every run gets fresh dominance votes and a window that starts at `now`
    pub fn restart(&mut self, now: Instant) {
        self.tracker.restart(now);
    }

    /// One iteration of the control loop. Returns the color that was sent, if any.
    ///
    /// Frames that were already handled are skipped. Errors that only affect this frame are given to the observer
    /// and turn into `Ok(None)`. Sink errors are returned.
    pub fn step(&mut self, now: Instant) -> MyResult<Option<RGB8>> {
        let frame = self.analyzer.spectra().frame;

        if frame == self.last_frame {
            return Ok(None);
        }
        self.last_frame = frame;

        let peaks = self.analyzer.peak_deltas(&self.tracker.ranges());

        for err in peaks.iter().filter_map(|x| x.as_ref().err()) {
            self.observer.skipped(err);
        }

        self.tracker.vote(&peaks);

        let dominant = self.tracker.dominant();
        let band = self.tracker.bands()[dominant];

        self.active = band.range;

        // the dominant band's own peak is the sample for this frame
        let sample = peaks[dominant]
            .as_ref()
            .ok()
            .map(|&peak| (peak, self.baseline.update(peak.energy)));

        if let Some(winner) = self.tracker.roll_window(now) {
            self.observer.window_rolled(&winner);
        }

        let Some((peak, power)) = sample else {
            return Ok(None);
        };

        let color = match self.palette.color_for(self.active, peak.frequency_hz) {
            Ok(x) => x.with_power(power),
            Err(err) if err.is_recoverable() => {
                self.observer.skipped(&err);
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        self.sink.send(color.rgb())?;

        self.observer.frame(&FrameReport {
            frame,
            band: band.name,
            range: band.range,
            peak,
            upper_energy: self.baseline.upper(),
            power,
            color,
        });

        Ok(Some(color.rgb()))
    }

    fn run(mut self, stop: Arc<AtomicBool>) -> (Self, MyResult<()>) {
        let mut cadence = CadenceTracker::new(self.analyzer.config().cadence());

        let result = loop {
            if stop.load(Ordering::Acquire) {
                break Ok(());
            }

            let started = Instant::now();

            match self.step(started) {
                Ok(_) => {}
                Err(err) if err.is_recoverable() => self.observer.skipped(&err),
                Err(err) => break Err(err),
            }

            let now = Instant::now();

            cadence.tick(started, now);

            thread::sleep(cadence.remaining(started, now));
        };

        // best effort. the light should go dark even if the loop is exiting because the sink broke
        if let Err(err) = self.sink.send(OFF) {
            warn!("failed turning the light off: {}", err);
        }

        if let Err(err) = self.analyzer.stop() {
            warn!("failed stopping audio: {}", err);
        }

        (self, result)
    }
}

struct Running {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<(ReactiveLoop, MyResult<()>)>,
}

/// Starts and stops the control loop on its own thread.
///
/// `Idle -> Running -> Idle` as many times as you like. `teardown` from `Idle` is final.
pub struct ReactiveController {
    status: ControllerStatus,
    idle: Option<ReactiveLoop>,
    running: Option<Running>,
}

impl ReactiveController {
    pub fn new(
        config: &ControllerConfig,
        analyzer: SpectralAnalyzer,
        sink: Box<dyn LightSink>,
        observer: Box<dyn ControllerObserver>,
    ) -> MyResult<Self> {
        let parts = ReactiveLoop::new(config, analyzer, sink, observer)?;

        Ok(Self::from_loop(parts))
    }

    /// open the audio device and build a controller around it
    pub fn configure<D: CaptureDevice>(
        config: &ControllerConfig,
        device: &D,
        sink: Box<dyn LightSink>,
        observer: Box<dyn ControllerObserver>,
    ) -> MyResult<Self> {
        config.validate()?;

        let analyzer = SpectralAnalyzer::configure(config.analyzer_config(), device)?;

        Self::new(config, analyzer, sink, observer)
    }

    pub fn from_loop(parts: ReactiveLoop) -> Self {
        Self {
            status: ControllerStatus::Idle,
            idle: Some(parts),
            running: None,
        }
    }

    pub fn status(&self) -> ControllerStatus {
        self.status
    }

    /// false once the loop's thread has exited, even if `stop` hasn't been called yet
    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|x| !x.handle.is_finished())
    }

    /// the loop's state between runs. only while idle
    pub fn reactive_loop(&self) -> Option<&ReactiveLoop> {
        self.idle.as_ref()
    }

    /// only while idle
    pub fn analyzer_mut(&mut self) -> Option<&mut SpectralAnalyzer> {
        self.idle.as_mut().map(|x| x.analyzer_mut())
    }

    /// the last spectra computed before stopping. only while idle
    pub fn spectra(&mut self) -> Option<&Spectra> {
        self.analyzer_mut().map(|x| x.spectra())
    }

    pub fn start(&mut self) -> MyResult<()> {
        match self.status {
            ControllerStatus::Running => return Ok(()),
            ControllerStatus::Stopped => return Err(self.lifecycle("start")),
            ControllerStatus::Idle => {}
        }

        let Some(mut parts) = self.idle.take() else {
            return Err(self.lifecycle("start"));
        };

        if let Err(err) = parts.sink.open() {
            self.idle = Some(parts);
            return Err(err);
        }

        if let Err(err) = parts.analyzer.start() {
            if let Err(close_err) = parts.sink.close() {
                warn!("failed closing the light: {}", close_err);
            }

            self.idle = Some(parts);
            return Err(err);
        }

        parts.restart(Instant::now());

        let stop = Arc::new(AtomicBool::new(false));

        let handle = {
            let stop = stop.clone();

            thread::spawn(move || parts.run(stop))
        };

        self.running = Some(Running { stop, handle });
        self.status = ControllerStatus::Running;

        info!("reactive lights started");

        Ok(())
    }

    /// Ask the loop to finish its current iteration and wait for it.
    ///
    /// An error that ended the loop early is returned here. The controller is idle either way.
    pub fn stop(&mut self) -> MyResult<()> {
        match self.status {
            ControllerStatus::Idle => return Ok(()),
            ControllerStatus::Stopped => return Err(self.lifecycle("stop")),
            ControllerStatus::Running => {}
        }

        let Some(running) = self.running.take() else {
            return Err(self.lifecycle("stop"));
        };

        running.stop.store(true, Ordering::Release);

        let (parts, result) = match running.handle.join() {
            Ok(x) => x,
            Err(panic) => std::panic::resume_unwind(panic),
        };

        self.idle = Some(parts);
        self.status = ControllerStatus::Idle;

        info!("reactive lights stopped");

        result
    }

    /// Release the sink and the audio device. Nothing works after this.
    pub fn teardown(&mut self) -> MyResult<()> {
        if self.status != ControllerStatus::Idle {
            return Err(self.lifecycle("teardown"));
        }

        let Some(mut parts) = self.idle.take() else {
            return Err(self.lifecycle("teardown"));
        };

        self.status = ControllerStatus::Stopped;

        // the sink gets closed even if the audio device won't stop
        let stopped = parts.analyzer.stop();
        let closed = parts.sink.close();

        stopped?;
        closed?;

        info!("reactive lights torn down");

        Ok(())
    }

    fn lifecycle(&self, operation: &'static str) -> MyError {
        MyError::Lifecycle {
            operation,
            status: self.status,
        }
    }
}

impl Drop for ReactiveController {
    fn drop(&mut self) {
        if self.status == ControllerStatus::Running {
            if let Err(err) = self.stop() {
                warn!("control loop ended with an error: {}", err);
            }
        }
    }
}
