//! Frequency analysers fed by taps in the audio path.
//!
//! The audio thread only appends mono samples to a [`SampleTap`]; the FFT
//! work happens on the reader's side when a frame is rendered. Readings
//! follow the browser `AnalyserNode::getByteFrequencyData` conventions.

use std::collections::VecDeque;
use std::f32::consts::PI;
use std::sync::{Arc, Mutex};

use realfft::num_complex::Complex32;
use realfft::{RealFftPlanner, RealToComplex};
use tracing::warn;

/// Magnitude smoothing between consecutive readings.
const SMOOTHING: f32 = 0.8;
/// Decibel window mapped onto `0..=255`.
const MIN_DB: f32 = -100.0;
const MAX_DB: f32 = -30.0;

/// Bounded ring of the most recent mono samples.
#[derive(Clone, Debug)]
pub struct SampleTap {
    samples: Arc<Mutex<VecDeque<f32>>>,
    capacity: usize,
}

impl SampleTap {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Append a batch of samples, dropping the oldest ones past capacity.
    ///
    /// Never blocks: if a reader holds the lock the batch is skipped.
    pub fn push(&self, batch: &[f32]) {
        let Ok(mut buf) = self.samples.try_lock() else {
            return;
        };
        for &s in batch {
            if buf.len() >= self.capacity {
                buf.pop_front();
            }
            buf.push_back(s);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut buf) = self.samples.lock() {
            buf.clear();
        }
    }

    /// Copy the newest `out.len()` samples into `out`, zero-padding the front
    /// when fewer are available.
    pub fn latest(&self, out: &mut [f32]) {
        out.fill(0.0);
        let Ok(buf) = self.samples.lock() else {
            return;
        };
        let n = buf.len().min(out.len());
        let skip = buf.len() - n;
        let start = out.len() - n;
        for (dst, &src) in out[start..].iter_mut().zip(buf.iter().skip(skip)) {
            *dst = src;
        }
    }
}

/// FFT analyser over a [`SampleTap`].
pub struct Analyser {
    tap: SampleTap,
    fft: Arc<dyn RealToComplex<f32>>,
    window: Vec<f32>,
    input: Vec<f32>,
    spectrum: Vec<Complex32>,
    smoothed: Vec<f32>,
}

impl Analyser {
    /// `fft_size` must be a power of two of at least 32.
    pub fn new(tap: SampleTap, fft_size: usize) -> Self {
        let fft = RealFftPlanner::<f32>::new().plan_fft_forward(fft_size);
        let input = fft.make_input_vec();
        let spectrum = fft.make_output_vec();
        Self {
            tap,
            fft,
            window: blackman(fft_size),
            input,
            spectrum,
            smoothed: vec![0.0; fft_size / 2],
        }
    }

    pub fn fft_size(&self) -> usize {
        self.window.len()
    }

    /// Number of bins produced per reading (`fft_size / 2`).
    pub fn frequency_bin_count(&self) -> usize {
        self.smoothed.len()
    }

    /// Fill `out` with byte magnitudes for the newest block of samples.
    ///
    /// Extra entries in `out` beyond the bin count are zeroed.
    pub fn byte_frequency_data(&mut self, out: &mut [u8]) {
        self.tap.latest(&mut self.input);
        for (s, w) in self.input.iter_mut().zip(&self.window) {
            *s *= w;
        }

        if let Err(e) = self.fft.process(&mut self.input, &mut self.spectrum) {
            warn!(error = %e, "spectrum analysis failed");
            out.fill(0);
            return;
        }

        let scale = 1.0 / self.fft_size() as f32;
        for (k, slot) in self.smoothed.iter_mut().enumerate() {
            let magnitude = self.spectrum[k].norm() * scale;
            *slot = SMOOTHING * *slot + (1.0 - SMOOTHING) * magnitude;
        }

        out.fill(0);
        for (dst, &mag) in out.iter_mut().zip(&self.smoothed) {
            *dst = to_byte(mag);
        }
    }
}

fn to_byte(magnitude: f32) -> u8 {
    if magnitude <= 0.0 {
        return 0;
    }
    let db = 20.0 * magnitude.log10();
    let scaled = 255.0 / (MAX_DB - MIN_DB) * (db - MIN_DB);
    scaled.clamp(0.0, 255.0) as u8
}

fn blackman(n: usize) -> Vec<f32> {
    let (a0, a1, a2) = (0.42, 0.5, 0.08);
    (0..n)
        .map(|i| {
            let x = i as f32 / n as f32;
            a0 - a1 * (2.0 * PI * x).cos() + a2 * (4.0 * PI * x).cos()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tap_keeps_only_newest_samples() {
        let tap = SampleTap::new(4);
        tap.push(&[1.0, 2.0, 3.0]);
        tap.push(&[4.0, 5.0]);

        let mut out = [0.0; 4];
        tap.latest(&mut out);
        assert_eq!(out, [2.0, 3.0, 4.0, 5.0]);

        let mut wide = [9.0; 6];
        tap.latest(&mut wide);
        assert_eq!(wide, [0.0, 0.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn silence_reads_as_zero() {
        let mut analyser = Analyser::new(SampleTap::new(256), 256);
        assert_eq!(analyser.frequency_bin_count(), 128);
        let mut out = vec![7u8; 128];
        analyser.byte_frequency_data(&mut out);
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn sine_peaks_in_its_bin() {
        let tap = SampleTap::new(256);
        let mut analyser = Analyser::new(tap.clone(), 256);
        // Bin 16 of a 256-point FFT, quiet enough to stay below the 255 ceiling.
        let tone: Vec<f32> = (0..256)
            .map(|i| 0.001 * (2.0 * PI * 16.0 * i as f32 / 256.0).sin())
            .collect();

        let mut out = vec![0u8; 128];
        for _ in 0..20 {
            tap.push(&tone);
            analyser.byte_frequency_data(&mut out);
        }

        let peak = out
            .iter()
            .enumerate()
            .max_by_key(|(_, v)| **v)
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 16);
        assert!(out[16] > out[60]);
    }

    #[test]
    fn byte_mapping_covers_decibel_window() {
        assert_eq!(to_byte(0.0), 0);
        assert_eq!(to_byte(1e-6), 0); // -120 dB
        assert_eq!(to_byte(1.0), 255); // 0 dB
        let mid = to_byte(10f32.powf(-65.0 / 20.0));
        assert!((126..=128).contains(&mid), "got {mid}");
    }
}
