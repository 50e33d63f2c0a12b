//! Three-band equalizer built from RBJ cookbook biquads.
//!
//! Shelves use a slope of 1; the mid band is a peaking filter with Q = 1.

use std::f32::consts::PI;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Gain limit applied to every band, in dB.
pub const MAX_GAIN_DB: f32 = 40.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Band {
    /// Low shelf at 200 Hz.
    Bass,
    /// Peaking filter at 1 kHz, Q = 1.
    Mid,
    /// High shelf at 3 kHz.
    Treble,
}

impl Band {
    pub const ALL: [Band; 3] = [Band::Bass, Band::Mid, Band::Treble];

    pub fn frequency(self) -> f32 {
        match self {
            Band::Bass => 200.0,
            Band::Mid => 1000.0,
            Band::Treble => 3000.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Band::Bass => "bass",
            Band::Mid => "mid",
            Band::Treble => "treble",
        }
    }

    fn slot(self) -> usize {
        match self {
            Band::Bass => 0,
            Band::Mid => 1,
            Band::Treble => 2,
        }
    }

    fn coefficients(self, gain_db: f32, sample_rate: f32) -> Coefficients {
        // Keep the centre frequency below Nyquist for low sample rates.
        let freq = self.frequency().min(sample_rate * 0.45);
        match self {
            Band::Bass => Coefficients::low_shelf(freq, gain_db, sample_rate),
            Band::Mid => Coefficients::peaking(freq, 1.0, gain_db, sample_rate),
            Band::Treble => Coefficients::high_shelf(freq, gain_db, sample_rate),
        }
    }
}

/// Normalized biquad coefficients (`a0 == 1`).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Coefficients {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl Coefficients {
    pub const PASSTHROUGH: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    fn normalized(b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) -> Self {
        let inv = 1.0 / a0;
        Self {
            b0: b0 * inv,
            b1: b1 * inv,
            b2: b2 * inv,
            a1: a1 * inv,
            a2: a2 * inv,
        }
    }

    pub fn low_shelf(frequency: f32, gain_db: f32, sample_rate: f32) -> Self {
        let a = 10f32.powf(gain_db / 40.0);
        let (cos_w, alpha) = shelf_terms(frequency, sample_rate);
        let two_sqrt_a_alpha = 2.0 * a.sqrt() * alpha;

        Self::normalized(
            a * ((a + 1.0) - (a - 1.0) * cos_w + two_sqrt_a_alpha),
            2.0 * a * ((a - 1.0) - (a + 1.0) * cos_w),
            a * ((a + 1.0) - (a - 1.0) * cos_w - two_sqrt_a_alpha),
            (a + 1.0) + (a - 1.0) * cos_w + two_sqrt_a_alpha,
            -2.0 * ((a - 1.0) + (a + 1.0) * cos_w),
            (a + 1.0) + (a - 1.0) * cos_w - two_sqrt_a_alpha,
        )
    }

    pub fn high_shelf(frequency: f32, gain_db: f32, sample_rate: f32) -> Self {
        let a = 10f32.powf(gain_db / 40.0);
        let (cos_w, alpha) = shelf_terms(frequency, sample_rate);
        let two_sqrt_a_alpha = 2.0 * a.sqrt() * alpha;

        Self::normalized(
            a * ((a + 1.0) + (a - 1.0) * cos_w + two_sqrt_a_alpha),
            -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_w),
            a * ((a + 1.0) + (a - 1.0) * cos_w - two_sqrt_a_alpha),
            (a + 1.0) - (a - 1.0) * cos_w + two_sqrt_a_alpha,
            2.0 * ((a - 1.0) - (a + 1.0) * cos_w),
            (a + 1.0) - (a - 1.0) * cos_w - two_sqrt_a_alpha,
        )
    }

    pub fn peaking(frequency: f32, q: f32, gain_db: f32, sample_rate: f32) -> Self {
        let a = 10f32.powf(gain_db / 40.0);
        let omega = 2.0 * PI * frequency / sample_rate;
        let cos_w = omega.cos();
        let alpha = omega.sin() / (2.0 * q);

        Self::normalized(
            1.0 + alpha * a,
            -2.0 * cos_w,
            1.0 - alpha * a,
            1.0 + alpha / a,
            -2.0 * cos_w,
            1.0 - alpha / a,
        )
    }
}

// Slope S = 1 reduces the cookbook's shelf alpha to sin(w0) / sqrt(2).
fn shelf_terms(frequency: f32, sample_rate: f32) -> (f32, f32) {
    let omega = 2.0 * PI * frequency / sample_rate;
    (omega.cos(), omega.sin() / 2.0 * 2f32.sqrt())
}

/// Direct Form I biquad section.
#[derive(Debug, Clone)]
pub struct Biquad {
    c: Coefficients,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Default for Biquad {
    fn default() -> Self {
        Self {
            c: Coefficients::PASSTHROUGH,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }
}

impl Biquad {
    /// Swap coefficients but keep the delay lines, so gain changes do not click.
    pub fn set_coefficients(&mut self, c: Coefficients) {
        self.c = c;
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let c = &self.c;
        let output = c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }
}

/// Gain parameters shared between the controller and the audio thread.
///
/// Writers bump a generation counter so the audio path only recomputes
/// coefficients when something changed.
#[derive(Clone, Debug, Default)]
pub struct EqGains {
    inner: Arc<GainCells>,
}

#[derive(Debug, Default)]
struct GainCells {
    bands: [AtomicU32; 3],
    generation: AtomicU64,
}

impl EqGains {
    /// Set `band` to `gain_db`, clamped to ±[`MAX_GAIN_DB`]. Returns the stored value.
    pub fn set(&self, band: Band, gain_db: f32) -> f32 {
        let gain_db = if gain_db.is_finite() {
            gain_db.clamp(-MAX_GAIN_DB, MAX_GAIN_DB)
        } else {
            0.0
        };
        self.inner.bands[band.slot()].store(gain_db.to_bits(), Ordering::Relaxed);
        self.inner.generation.fetch_add(1, Ordering::Release);
        gain_db
    }

    pub fn get(&self, band: Band) -> f32 {
        f32::from_bits(self.inner.bands[band.slot()].load(Ordering::Relaxed))
    }

    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> [f32; 3] {
        Band::ALL.map(|b| self.get(b))
    }
}

/// Per-channel filter chains for the three bands.
#[derive(Debug, Clone, Default)]
pub struct Equalizer {
    chains: Vec<[Biquad; 3]>,
}

impl Equalizer {
    /// Recompute coefficients; resizes the chain set if the channel count changed.
    pub fn configure(&mut self, channels: usize, sample_rate: f32, gains: [f32; 3]) {
        self.chains.resize_with(channels.max(1), Default::default);
        let coeffs = Band::ALL.map(|b| b.coefficients(gains[b.slot()], sample_rate));
        for chain in &mut self.chains {
            for (filter, c) in chain.iter_mut().zip(coeffs) {
                filter.set_coefficients(c);
            }
        }
    }

    #[inline]
    pub fn process(&mut self, channel: usize, sample: f32) -> f32 {
        match self.chains.get_mut(channel) {
            Some(chain) => chain.iter_mut().fold(sample, |s, f| f.process(s)),
            None => sample,
        }
    }
}
