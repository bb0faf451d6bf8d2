//! The capture thread writes spectra, the control loop reads them.
//!
//! A triple buffer sits between them. The writer never waits on the reader and the reader always gets a whole frame,
//! though possibly an old one. Nothing queues up if the reader falls behind.
use std::sync::Arc;

use rustfft::{Fft, FftPlanner, num_complex::Complex};
use triple_buffer::TripleBuffer;

use crate::logging::trace;
use crate::windows::{Window, apply_window};

/// The published result of one analyzed frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectra {
    /// how many frames the processor has analyzed. 0 means nothing has been captured yet
    pub frame: u64,
    /// squared fft magnitude per bin
    pub energy: Vec<f32>,
    /// max(energy - previous energy, 0) per bin
    pub delta: Vec<f32>,
}

impl Spectra {
    pub fn silent(bins: usize) -> Self {
        Self {
            frame: 0,
            energy: vec![0.0; bins],
            delta: vec![0.0; bins],
        }
    }

    pub fn bins(&self) -> usize {
        self.energy.len()
    }
}

/// create the writing and reading halves for frames of `chunk` samples
pub fn spectrum_channel<W: Window>(chunk: usize) -> (SpectrumProcessor, SpectrumReader) {
    let bins = chunk / 2 + 1;

    let (input, output) = TripleBuffer::new(&Spectra::silent(bins)).split();

    let processor = SpectrumProcessor::new::<W>(chunk, input);
    let reader = SpectrumReader { output };

    (processor, reader)
}

/// Owned by whatever delivers audio. Runs the fft on each frame and publishes the result.
pub struct SpectrumProcessor {
    chunk: usize,
    frames: u64,
    fft: Arc<dyn Fft<f32>>,
    window_multipliers: Vec<f32>,
    windowed: Vec<f32>,
    fft_buf: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    /// the last frame's result. its energy is the previous energy for the next delta
    result: Spectra,
    input: triple_buffer::Input<Spectra>,
}

impl SpectrumProcessor {
    fn new<W: Window>(chunk: usize, input: triple_buffer::Input<Spectra>) -> Self {
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(chunk);

        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Self {
            chunk,
            frames: 0,
            fft,
            window_multipliers: W::windows(chunk),
            windowed: vec![0.0; chunk],
            fft_buf: vec![Complex::new(0.0, 0.0); chunk],
            scratch,
            result: Spectra::silent(chunk / 2 + 1),
            input,
        }
    }

    pub fn chunk(&self) -> usize {
        self.chunk
    }

    /// Window, fft, square, diff, publish.
    ///
    /// Short frames are zero padded and long frames are truncated to `chunk`.
    pub fn process_frame(&mut self, frame: &[f32]) {
        let n = frame.len().min(self.chunk);

        self.windowed[..n].copy_from_slice(&frame[..n]);
        self.windowed[n..].fill(0.0);

        apply_window(&mut self.windowed, &self.window_multipliers);

        for (c, &x) in self.fft_buf.iter_mut().zip(self.windowed.iter()) {
            *c = Complex::new(x, 0.0);
        }

        self.fft
            .process_with_scratch(&mut self.fft_buf, &mut self.scratch);

        self.frames += 1;

        let result = &mut self.result;

        result.frame = self.frames;

        for ((energy, delta), bin) in result
            .energy
            .iter_mut()
            .zip(result.delta.iter_mut())
            .zip(self.fft_buf.iter())
        {
            let e = bin.norm_sqr();

            *delta = (e - *energy).max(0.0);
            *energy = e;
        }

        self.input.write(self.result.clone());

        trace!("published frame {}", self.frames);
    }
}

/// Owned by the analyzer. Reading never blocks the processor.
pub struct SpectrumReader {
    output: triple_buffer::Output<Spectra>,
}

impl SpectrumReader {
    /// the most recently published spectra
    pub fn latest(&mut self) -> &Spectra {
        self.output.read()
    }
}
