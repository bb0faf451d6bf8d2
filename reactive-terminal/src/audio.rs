use std::thread::{self, JoinHandle};

use cpal::{
    BufferSize, Device, SampleFormat, SampleRate, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use log::{debug, error, info, trace, warn};
use reactive_lights_core::audio::{AnalyzerConfig, Capture, CaptureDevice, SpectrumProcessor};
use reactive_lights_core::errors::{MyError, MyResult};

/// An input device as the host reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDevice {
    pub index: usize,
    pub name: String,
    pub max_input_channels: u16,
}

/// every input device on the default host. `index` is what `device_index` refers to
pub fn list_input_devices() -> anyhow::Result<Vec<InputDevice>> {
    let host = cpal::default_host();

    let devices = host
        .input_devices()?
        .enumerate()
        .map(|(index, device)| {
            let name = device.name().unwrap_or_else(|_| "<unknown>".to_string());

            let max_input_channels = device
                .supported_input_configs()
                .map(|configs| configs.map(|x| x.channels()).max().unwrap_or(0))
                .unwrap_or(0);

            InputDevice {
                index,
                name,
                max_input_channels,
            }
        })
        .collect();

    Ok(devices)
}

/// Collects interleaved samples into mono frames of the processor's chunk size.
struct Framer {
    processor: SpectrumProcessor,
    channels: usize,
    frame: Vec<f32>,
}

impl Framer {
    fn new(processor: SpectrumProcessor, channels: u16) -> Self {
        let frame = Vec::with_capacity(processor.chunk());

        Self {
            processor,
            channels: channels.max(1) as usize,
            frame,
        }
    }

    /// returns how many frames were analyzed
    fn push(&mut self, data: &[f32]) -> usize {
        let mut analyzed = 0;

        for samples in data.chunks_exact(self.channels) {
            let mono = samples.iter().sum::<f32>() / self.channels as f32;

            self.frame.push(mono);

            if self.frame.len() == self.processor.chunk() {
                self.processor.process_frame(&self.frame);
                self.frame.clear();
                analyzed += 1;
            }
        }

        analyzed
    }
}

enum Command {
    Play,
    Pause,
}

type Reply = flume::Sender<MyResult<()>>;

/// The microphone on the default cpal host.
///
/// cpal streams can't leave the thread that built them, so each capture gets a thread that owns its stream and takes
/// play and pause commands over a channel.
#[derive(Debug, Default)]
pub struct CpalDevice;

impl CaptureDevice for CpalDevice {
    type Capture = CpalCapture;

    fn open(
        &self,
        config: &AnalyzerConfig,
        processor: SpectrumProcessor,
    ) -> MyResult<Self::Capture> {
        let (command_tx, command_rx) = flume::unbounded::<(Command, Reply)>();
        let (ready_tx, ready_rx) = flume::bounded(1);

        let config = config.clone();

        let handle = thread::spawn(move || {
            let stream = match build_stream(&config, processor) {
                Ok(x) => x,
                Err(err) => {
                    let _ = ready_tx.send(Err(err));
                    return;
                }
            };

            // some hosts start streams as soon as they are built
            if let Err(err) = stream.pause() {
                debug!("pausing a new stream failed: {}", err);
            }

            if ready_tx.send(Ok(())).is_err() {
                return;
            }

            // the capture hung up when this ends
            while let Ok((command, reply)) = command_rx.recv() {
                let result = match command {
                    Command::Play => stream.play().map_err(|err| {
                        MyError::Configuration(format!("failed to start the stream: {err}"))
                    }),
                    Command::Pause => stream.pause().map_err(|err| {
                        MyError::Configuration(format!("failed to pause the stream: {err}"))
                    }),
                };

                let _ = reply.send(result);
            }

            debug!("audio stream thread exiting");
        });

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(CpalCapture {
                commands: Some(command_tx),
                thread: Some(handle),
            }),
            Ok(Err(err)) => Err(err),
            Err(_) => Err(MyError::Configuration(
                "the audio stream thread exited early".into(),
            )),
        }
    }
}

fn find_device(config: &AnalyzerConfig) -> MyResult<Device> {
    let host = cpal::default_host();

    let device = match config.device_index {
        None => host.default_input_device(),
        Some(index) => host
            .input_devices()
            .map_err(|err| MyError::Configuration(format!("cannot list input devices: {err}")))?
            .nth(index),
    };

    device.ok_or_else(|| {
        MyError::Configuration(format!("no input device at {:?}", config.device_index))
    })
}

fn build_stream(config: &AnalyzerConfig, processor: SpectrumProcessor) -> MyResult<cpal::Stream> {
    let device = find_device(config)?;

    let name = device.name().unwrap_or_else(|_| "<unknown>".to_string());

    let sample_rate = SampleRate(config.sample_rate_hz);

    let supported = device
        .supported_input_configs()
        .map_err(|err| MyError::Configuration(format!("cannot query {name}: {err}")))?
        .any(|x| {
            x.channels() == config.channels
                && x.sample_format() == SampleFormat::F32
                && x.min_sample_rate() <= sample_rate
                && sample_rate <= x.max_sample_rate()
        });

    if !supported {
        return Err(MyError::Configuration(format!(
            "{name} cannot record {} channels of f32 at {} Hz",
            config.channels, config.sample_rate_hz
        )));
    }

    let stream_config = StreamConfig {
        channels: config.channels,
        sample_rate,
        buffer_size: BufferSize::Default,
    };

    let mut framer = Framer::new(processor, config.channels);

    let err_fn = move |err| {
        error!("an error occurred on stream: {err:?}");
    };

    let stream = device
        .build_input_stream(
            &stream_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                trace!("heard {} samples", data.len());

                framer.push(data);
            },
            err_fn,
            None,
        )
        .map_err(|err| MyError::Configuration(format!("cannot open {name}: {err}")))?;

    info!("opened input device {name}");

    Ok(stream)
}

/// Owns the stream's thread. Dropping this closes the stream.
pub struct CpalCapture {
    commands: Option<flume::Sender<(Command, Reply)>>,
    thread: Option<JoinHandle<()>>,
}

impl CpalCapture {
    fn command(&self, command: Command) -> MyResult<()> {
        let gone = || MyError::Configuration("the audio stream thread is gone".into());

        let commands = self.commands.as_ref().ok_or_else(gone)?;

        let (reply_tx, reply_rx) = flume::bounded(1);

        commands.send((command, reply_tx)).map_err(|_| gone())?;

        reply_rx.recv().map_err(|_| gone())?
    }
}

impl Capture for CpalCapture {
    fn start(&mut self) -> MyResult<()> {
        self.command(Command::Play)
    }

    fn stop(&mut self) -> MyResult<()> {
        self.command(Command::Pause)
    }
}

impl Drop for CpalCapture {
    fn drop(&mut self) {
        // hanging up ends the thread's command loop
        self.commands.take();

        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                warn!("the audio stream thread panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reactive_lights_core::audio::spectrum_channel;
    use reactive_lights_core::windows::FlatWindow;

    #[test]
    fn test_framer_downmixes_and_chunks() {
        let (processor, mut reader) = spectrum_channel::<FlatWindow>(8);

        let mut framer = Framer::new(processor, 2);

        // 6 stereo samples is not a whole frame yet
        assert_eq!(framer.push(&[1.0; 12]), 0);
        assert_eq!(reader.latest().frame, 0);

        // left and right cancel out. this finishes the first frame and starts the second
        let mut data = vec![];
        for _ in 0..4 {
            data.extend_from_slice(&[1.0, -1.0]);
        }
        assert_eq!(framer.push(&data), 1);

        let spectra = reader.latest();
        assert_eq!(spectra.frame, 1);

        // 6 ones and 2 zeros with no window: dc bin is 6 squared
        assert_eq!(spectra.energy[0], 36.0);
        assert_eq!(framer.frame.len(), 2);
    }

    #[test]
    fn test_framer_ignores_partial_samples() {
        let (processor, mut reader) = spectrum_channel::<FlatWindow>(4);

        let mut framer = Framer::new(processor, 3);

        // 14 values is 4 whole samples and 2 leftovers
        assert_eq!(framer.push(&[0.5; 14]), 1);
        assert_eq!(reader.latest().frame, 1);
        assert!(framer.frame.is_empty());
    }
}
