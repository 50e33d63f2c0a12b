//! Frame-driven visual state: the 16 equalizer bars and the mirrored
//! spectrum. Everything here reads analyser output and never touches
//! playback.

use crate::audio::{Analyser, AudioGraph};

pub const EQ_BAR_COUNT: usize = 16;
/// Height of an idle equalizer bar.
pub const EQ_BAR_BASELINE: f32 = 5.0;
/// Horizontal gap between spectrum bars.
pub const SPECTRUM_GAP: f64 = 1.0;

/// Liveness flag of one per-frame loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameLoop {
    running: bool,
}

impl FrameLoop {
    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn halt(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// The two render loops: equalizer bars and spectrum.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderLoops {
    pub equalizer: FrameLoop,
    pub spectrum: FrameLoop,
}

impl RenderLoops {
    pub fn start_all(&mut self) {
        self.equalizer.start();
        self.spectrum.start();
    }
}

/// `max(v / 2, 5)`
pub fn eq_bar_height(value: u8) -> f32 {
    (f32::from(value) / 2.0).max(EQ_BAR_BASELINE)
}

/// One spectrum bar, drawn twice: at `x` and mirrored at `mirrored_x`.
///
/// The bar extends `height / 2` above and `height / 2` below the centre line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrumBar {
    pub x: f64,
    pub mirrored_x: f64,
    pub width: f64,
    pub height: f64,
    pub color: (u8, u8, u8),
}

pub fn bar_color(index: usize, value: u8) -> (u8, u8, u8) {
    let red = (u32::from(value) + 100) % 255;
    let green = (index * 5) % 255;
    (red as u8, green as u8, 200)
}

/// Lay `bins` out across a canvas `width` units wide.
///
/// Bars are `(width / bins) * 2.5` wide with a gap of 1, so only the lower
/// part of the spectrum fits; bars starting past the right edge are dropped.
pub fn spectrum_bars(bins: &[u8], width: f64) -> Vec<SpectrumBar> {
    if bins.is_empty() || width <= 0.0 {
        return Vec::new();
    }
    let bar_width = (width / bins.len() as f64) * 2.5;
    let mut out = Vec::new();
    let mut x = 0.0;
    for (i, &value) in bins.iter().enumerate() {
        if x >= width {
            break;
        }
        out.push(SpectrumBar {
            x,
            mirrored_x: width - x - bar_width,
            width: bar_width,
            height: f64::from(value),
            color: bar_color(i, value),
        });
        x += bar_width + SPECTRUM_GAP;
    }
    out
}

/// Analyser readers and the most recent frame of each loop.
pub struct Visualizer {
    eq: Analyser,
    spectrum: Analyser,
    eq_bytes: Vec<u8>,
    spectrum_bytes: Vec<u8>,
    bars: [f32; EQ_BAR_COUNT],
}

impl Visualizer {
    pub fn new(graph: &AudioGraph) -> Self {
        let eq = graph.equalizer_analyser();
        let spectrum = graph.spectrum_analyser();
        let eq_bytes = vec![0; eq.frequency_bin_count()];
        let spectrum_bytes = vec![0; spectrum.frequency_bin_count()];
        Self {
            eq,
            spectrum,
            eq_bytes,
            spectrum_bytes,
            bars: [EQ_BAR_BASELINE; EQ_BAR_COUNT],
        }
    }

    /// Advance both loops by one frame.
    ///
    /// A loop that observes the engine paused halts itself; the equalizer
    /// also drops to its baseline. The spectrum keeps its last frame.
    pub fn frame(&mut self, loops: &mut RenderLoops, engine_paused: bool) {
        if loops.equalizer.is_running() {
            self.eq.byte_frequency_data(&mut self.eq_bytes);
            for (bar, &v) in self.bars.iter_mut().zip(&self.eq_bytes) {
                *bar = eq_bar_height(v);
            }
            if engine_paused {
                loops.equalizer.halt();
            }
        }
        if !loops.equalizer.is_running() {
            self.bars = [EQ_BAR_BASELINE; EQ_BAR_COUNT];
        }

        if loops.spectrum.is_running() {
            if engine_paused {
                loops.spectrum.halt();
            } else {
                self.spectrum.byte_frequency_data(&mut self.spectrum_bytes);
            }
        }
    }

    pub fn eq_bars(&self) -> &[f32; EQ_BAR_COUNT] {
        &self.bars
    }

    pub fn spectrum(&self) -> &[u8] {
        &self.spectrum_bytes
    }
}
