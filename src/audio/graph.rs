//! The fixed signal chain every track is played through.
//!
//! ```text
//! source ─┬─> lowshelf(200) -> peaking(1k) -> highshelf(3k) -> eq tap (32) -> output
//!         └─> spectrum tap (256)
//! ```
//!
//! The graph is built once per session; each new track only re-wires the
//! decoded source through the same gains and taps.

use std::time::Duration;

use rodio::source::SeekError;
use rodio::{ChannelCount, Sample, SampleRate, Source};

use super::analyser::{Analyser, SampleTap};
use super::eq::{Band, EqGains, Equalizer};

/// FFT size of the analyser feeding the equalizer bars.
pub const EQ_FFT_SIZE: usize = 32;
/// FFT size of the analyser feeding the spectrum visualizer.
pub const SPECTRUM_FFT_SIZE: usize = 256;

// Frames collected before handing a batch to a tap.
const TAP_BATCH: usize = 128;

#[derive(Clone, Debug)]
pub struct AudioGraph {
    gains: EqGains,
    eq_tap: SampleTap,
    spectrum_tap: SampleTap,
}

impl Default for AudioGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioGraph {
    pub fn new() -> Self {
        Self {
            gains: EqGains::default(),
            eq_tap: SampleTap::new(EQ_FFT_SIZE),
            spectrum_tap: SampleTap::new(SPECTRUM_FFT_SIZE),
        }
    }

    /// Set a band's gain in dB; takes effect on the next processed frame.
    pub fn set_gain(&self, band: Band, gain_db: f32) -> f32 {
        self.gains.set(band, gain_db)
    }

    pub fn gain(&self, band: Band) -> f32 {
        self.gains.get(band)
    }

    /// Analyser over the equalized output (16 bins).
    pub fn equalizer_analyser(&self) -> Analyser {
        Analyser::new(self.eq_tap.clone(), EQ_FFT_SIZE)
    }

    /// Analyser over the raw source (128 bins).
    pub fn spectrum_analyser(&self) -> Analyser {
        Analyser::new(self.spectrum_tap.clone(), SPECTRUM_FFT_SIZE)
    }

    /// Drop samples left over from the previous source.
    pub fn clear_taps(&self) {
        self.eq_tap.clear();
        self.spectrum_tap.clear();
    }

    /// Route `source` through the chain.
    pub fn wire<S: Source>(&self, source: S) -> impl Source + use<S> {
        let tapped = TapSource::new(source, self.spectrum_tap.clone());
        let equalized = EqSource::new(tapped, self.gains.clone());
        TapSource::new(equalized, self.eq_tap.clone())
    }
}

/// Pass-through source that mirrors a mono mixdown into a [`SampleTap`].
pub struct TapSource<S> {
    inner: S,
    tap: SampleTap,
    frame_sum: f32,
    channel: usize,
    pending: Vec<f32>,
}

impl<S: Source> TapSource<S> {
    pub fn new(inner: S, tap: SampleTap) -> Self {
        Self {
            inner,
            tap,
            frame_sum: 0.0,
            channel: 0,
            pending: Vec::with_capacity(TAP_BATCH),
        }
    }

    fn flush(&mut self) {
        if !self.pending.is_empty() {
            self.tap.push(&self.pending);
            self.pending.clear();
        }
    }
}

impl<S: Source> Iterator for TapSource<S> {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        let Some(sample) = self.inner.next() else {
            self.flush();
            return None;
        };

        let channels = usize::from(self.inner.channels()).max(1);
        self.frame_sum += sample;
        self.channel += 1;
        if self.channel >= channels {
            self.pending.push(self.frame_sum / channels as f32);
            self.frame_sum = 0.0;
            self.channel = 0;
            if self.pending.len() >= TAP_BATCH {
                self.flush();
            }
        }

        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<S: Source> Source for TapSource<S> {
    fn current_span_len(&self) -> Option<usize> {
        self.inner.current_span_len()
    }

    fn channels(&self) -> ChannelCount {
        self.inner.channels()
    }

    fn sample_rate(&self) -> SampleRate {
        self.inner.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.inner.total_duration()
    }

    fn try_seek(&mut self, pos: Duration) -> Result<(), SeekError> {
        self.channel = 0;
        self.frame_sum = 0.0;
        self.inner.try_seek(pos)
    }
}

/// Applies the three-band equalizer to an interleaved source.
pub struct EqSource<S> {
    inner: S,
    gains: EqGains,
    eq: Equalizer,
    channel: usize,
    channels: usize,
    sample_rate: SampleRate,
    generation: Option<u64>,
}

impl<S: Source> EqSource<S> {
    pub fn new(inner: S, gains: EqGains) -> Self {
        Self {
            inner,
            gains,
            eq: Equalizer::default(),
            channel: 0,
            channels: 0,
            sample_rate: 0,
            generation: None,
        }
    }

    // Called at frame boundaries: picks up gain edits and format changes.
    fn refresh(&mut self) {
        let channels = usize::from(self.inner.channels()).max(1);
        let sample_rate = self.inner.sample_rate();
        let generation = self.gains.generation();

        if channels != self.channels
            || sample_rate != self.sample_rate
            || Some(generation) != self.generation
        {
            self.eq
                .configure(channels, sample_rate as f32, self.gains.snapshot());
            self.channels = channels;
            self.sample_rate = sample_rate;
            self.generation = Some(generation);
        }
    }
}

impl<S: Source> Iterator for EqSource<S> {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        if self.channel == 0 {
            self.refresh();
        }
        let sample = self.inner.next()?;
        let out = self.eq.process(self.channel, sample);
        self.channel = (self.channel + 1) % self.channels.max(1);
        Some(out)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<S: Source> Source for EqSource<S> {
    fn current_span_len(&self) -> Option<usize> {
        self.inner.current_span_len()
    }

    fn channels(&self) -> ChannelCount {
        self.inner.channels()
    }

    fn sample_rate(&self) -> SampleRate {
        self.inner.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.inner.total_duration()
    }

    fn try_seek(&mut self, pos: Duration) -> Result<(), SeekError> {
        self.channel = 0;
        self.inner.try_seek(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rodio::buffer::SamplesBuffer;

    #[test]
    fn flat_graph_passes_samples_through() {
        let graph = AudioGraph::new();
        let input: Vec<f32> = (0..64).map(|i| (i as f32 / 64.0) - 0.5).collect();
        let out: Vec<f32> = graph
            .wire(SamplesBuffer::new(1, 44_100, input.clone()))
            .collect();

        assert_eq!(out.len(), input.len());
        for (a, b) in out.iter().zip(&input) {
            assert!((a - b).abs() < 1e-4);
        }
    }

    #[test]
    fn bass_gain_applies_to_every_channel() {
        let graph = AudioGraph::new();
        graph.set_gain(Band::Bass, 12.0);
        let dc = vec![0.1f32; 2 * 8_000];
        let out: Vec<f32> = graph.wire(SamplesBuffer::new(2, 44_100, dc)).collect();

        let tail = &out[out.len() - 2..];
        let expected = 0.1 * 10f32.powf(12.0 / 20.0);
        for s in tail {
            assert!((s - expected).abs() < 0.01, "got {s}");
        }
    }

    #[test]
    fn taps_receive_mono_mixdown() {
        let graph = AudioGraph::new();
        // Left/right cancel out in the mixdown.
        let frames: Vec<f32> = (0..512).flat_map(|_| [0.5f32, -0.5]).collect();
        let _: Vec<f32> = graph.wire(SamplesBuffer::new(2, 44_100, frames)).collect();

        let mut latest = [1.0f32; SPECTRUM_FFT_SIZE];
        graph.spectrum_tap.latest(&mut latest);
        assert!(latest.iter().all(|s| s.abs() < 1e-6));
    }

    #[test]
    fn analysers_have_expected_bin_counts() {
        let graph = AudioGraph::new();
        assert_eq!(graph.equalizer_analyser().frequency_bin_count(), 16);
        assert_eq!(graph.spectrum_analyser().frequency_bin_count(), 128);
    }
}
