//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Bar, BarChart, BarGroup, Block, Borders, Clear, List, ListItem, ListState, Padding,
        Paragraph, Wrap,
        canvas::{self, Canvas},
    },
};

use crate::app::{App, InputMode, LayoutMode};
use crate::audio::Band;
use crate::config::{Settings, TimeField, UiSettings};
use crate::keymap;
use crate::lyrics::LyricsView;
use crate::player::{Controller, HostBridge, MediaEngine, PlaybackState, VolumeIcon};
use crate::prefs::Theme;
use crate::visual::{Visualizer, spectrum_bars};

/// Colours for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub fg: Color,
    pub bg: Color,
    pub accent: Color,
    pub dim: Color,
}

pub fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            fg: Color::White,
            bg: Color::Black,
            accent: Color::Cyan,
            dim: Color::DarkGray,
        },
        Theme::Light => Palette {
            fg: Color::Black,
            bg: Color::White,
            accent: Color::Blue,
            dim: Color::Gray,
        },
    }
}

/// Format a `Duration` as `m:ss`.
pub fn format_time(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Build the now-playing time text (elapsed/total/remaining) per `UiSettings`.
fn now_playing_time_text(
    elapsed: Duration,
    total: Option<Duration>,
    ui: &UiSettings,
) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    for f in &ui.now_playing_time_fields {
        match f {
            TimeField::Elapsed => parts.push(format_time(elapsed)),
            TimeField::Total => {
                if let Some(t) = total {
                    parts.push(format_time(t));
                }
            }
            TimeField::Remaining => {
                if let Some(t) = total {
                    parts.push(format!("-{}", format_time(t.saturating_sub(elapsed))));
                }
            }
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(&ui.now_playing_time_separator))
    }
}

pub fn volume_glyph(icon: VolumeIcon) -> &'static str {
    match icon {
        VolumeIcon::Mute => "🔇",
        VolumeIcon::Off => "🔈",
        VolumeIcon::Low => "🔉",
        VolumeIcon::High => "🔊",
    }
}

fn state_text(state: PlaybackState) -> &'static str {
    match state {
        PlaybackState::Playing => "Playing",
        PlaybackState::Paused => "Paused",
        PlaybackState::Stopped => "Stopped",
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag { "ON" } else { "OFF" }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(3);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// First visible row so that `selected` sits near the middle of `height` rows.
pub fn list_window_start(total: usize, height: usize, selected: usize) -> usize {
    if total <= height || height == 0 {
        return 0;
    }
    let half = height / 2;
    let start = selected.saturating_sub(half);
    start.min(total - height)
}

fn bordered<'a>(title: &'a str, p: Palette) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(p.dim))
        .style(Style::default().fg(p.fg).bg(p.bg))
}

/// Render the entire UI into the provided `frame`.
pub fn draw<E: MediaEngine, B: HostBridge>(
    frame: &mut Frame,
    app: &App,
    controller: &Controller<E, B>,
    visualizer: &Visualizer,
    settings: &Settings,
) {
    let p = palette(app.theme);
    frame.render_widget(Block::default().style(Style::default().bg(p.bg)), frame.area());

    match app.layout {
        LayoutMode::Full => draw_full(frame, app, controller, visualizer, settings, p),
        LayoutMode::Compact => draw_compact(frame, app, controller, visualizer, settings, p),
    }

    if app.mode == InputMode::FolderPrompt {
        draw_prompt(frame, app, p);
    }
}

fn draw_full<E: MediaEngine, B: HostBridge>(
    frame: &mut Frame,
    app: &App,
    controller: &Controller<E, B>,
    visualizer: &Visualizer,
    settings: &Settings,
    p: Palette,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(8),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(settings.ui.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            bordered(" tunebox ", p)
                .title_alignment(Alignment::Center)
                .title_style(Style::default().fg(p.accent)),
        );
    frame.render_widget(header, chunks[0]);

    draw_status(frame, chunks[1], app, controller, &settings.ui, p);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[2]);
    draw_playlist(frame, body[0], app, controller, p);

    let right = if app.show_lyrics {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(9),
                Constraint::Min(5),
                Constraint::Percentage(35),
            ])
            .split(body[1])
    } else {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(9), Constraint::Min(5)])
            .split(body[1])
    };
    draw_equalizer(frame, right[0], app, controller, visualizer, p);
    draw_spectrum(frame, right[1], visualizer, p);
    if app.show_lyrics {
        draw_lyrics(frame, right[2], controller, p);
    }

    let footer = Paragraph::new(keymap::help_text())
        .style(Style::default().fg(p.dim))
        .block(bordered(" controls ", p).padding(Padding::horizontal(1)))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}

fn draw_compact<E: MediaEngine, B: HostBridge>(
    frame: &mut Frame,
    app: &App,
    controller: &Controller<E, B>,
    visualizer: &Visualizer,
    settings: &Settings,
    p: Palette,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(5)])
        .split(frame.area());
    draw_status(frame, chunks[0], app, controller, &settings.ui, p);
    draw_equalizer(frame, chunks[1], app, controller, visualizer, p);
}

fn draw_status<E: MediaEngine, B: HostBridge>(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    controller: &Controller<E, B>,
    ui: &UiSettings,
    p: Palette,
) {
    let mut parts: Vec<String> = Vec::new();
    match controller.current_track() {
        Some(track) => {
            let time = now_playing_time_text(controller.position(), controller.duration(), ui);
            match time {
                Some(time) => parts.push(format!("Song: {} [{}]", track.display, time)),
                None => parts.push(format!("Song: {}", track.display)),
            }
        }
        None => parts.push("No songs".to_string()),
    }
    parts.push(state_text(controller.state()).to_string());
    parts.push(format!("Shuffle: {}", on_off(controller.shuffle())));
    parts.push(format!("Repeat: {}", on_off(controller.repeat())));
    parts.push(format!(
        "{} {:.0}%",
        volume_glyph(controller.volume_icon()),
        controller.volume() * 100.0
    ));
    parts.push(if app.follow_playback {
        "CURSOR: Follow".to_string()
    } else {
        "CURSOR: Free-roam".to_string()
    });
    if let Some(dir) = &app.current_dir {
        parts.push(format!("Dir: {dir}"));
    }

    let mut lines = vec![Line::from(parts.join(" • "))];
    if let Some(status) = &app.status {
        lines.push(Line::styled(status.as_str(), Style::default().fg(p.accent)));
    }

    let status = Paragraph::new(lines)
        .block(bordered(" status ", p).padding(Padding::horizontal(1)))
        .wrap(Wrap { trim: true });
    frame.render_widget(status, area);
}

fn draw_playlist<E: MediaEngine, B: HostBridge>(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    controller: &Controller<E, B>,
    p: Palette,
) {
    let tracks = controller.playlist().tracks();
    let total = tracks.len();
    // Only build ListItems for the visible window.
    let height = area.height.saturating_sub(2) as usize;
    let start = list_window_start(total, height, app.selected);
    let end = (start + height.max(1)).min(total);

    let playing = controller.current_index();
    let items: Vec<ListItem> = tracks[start..end]
        .iter()
        .enumerate()
        .map(|(offset, track)| {
            let i = start + offset;
            let marker = if i == playing && controller.current_track().is_some() {
                "♪ "
            } else {
                "  "
            };
            let style = if i == playing {
                Style::default().fg(p.accent)
            } else {
                Style::default().fg(p.fg)
            };
            ListItem::new(format!("{marker}{}", track.display)).style(style)
        })
        .collect();

    let title = format!(" playlist ({total}) ");
    let list = List::new(items)
        .block(bordered(&title, p))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if total > 0 {
        state.select(Some(app.selected.saturating_sub(start)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

/// `bass +3.0 dB` with the focused band highlighted.
fn gain_line<E: MediaEngine, B: HostBridge>(
    app: &App,
    controller: &Controller<E, B>,
    p: Palette,
) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, band) in Band::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        let text = format!(
            "{} {:.0}Hz {:+.1} dB",
            band.label(),
            band.frequency(),
            controller.gain(*band)
        );
        let style = if *band == app.eq_focus {
            Style::default().fg(p.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(p.dim)
        };
        spans.push(Span::styled(text, style));
    }
    Line::from(spans)
}

fn draw_equalizer<E: MediaEngine, B: HostBridge>(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    controller: &Controller<E, B>,
    visualizer: &Visualizer,
    p: Palette,
) {
    let block = bordered(" equalizer ", p);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 {
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);
    frame.render_widget(Paragraph::new(gain_line(app, controller, p)), rows[0]);

    let bars: Vec<Bar> = visualizer
        .eq_bars()
        .iter()
        .map(|&h| Bar::default().value(h.round() as u64).text_value(String::new()))
        .collect();
    let count = bars.len().max(1) as u16;
    let bar_width = (rows[1].width.saturating_sub(count - 1) / count).max(1);
    let chart = BarChart::default()
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(Style::default().fg(p.accent))
        .max(128)
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, rows[1]);
}

fn draw_spectrum(frame: &mut Frame, area: Rect, visualizer: &Visualizer, p: Palette) {
    let block = bordered(" visualizer ", p);
    let inner = block.inner(area);
    // Braille cells are two dots wide.
    let width = f64::from(inner.width) * 2.0;
    let bars = spectrum_bars(visualizer.spectrum(), width);

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .background_color(p.bg)
        .x_bounds([0.0, width.max(1.0)])
        .y_bounds([0.0, 256.0])
        .paint(move |ctx| {
            let centre = 128.0;
            for bar in &bars {
                if bar.height <= 0.0 {
                    continue;
                }
                let (r, g, b) = bar.color;
                let color = Color::Rgb(r, g, b);
                let top = centre + bar.height / 2.0;
                let bottom = centre - bar.height / 2.0;
                for start in [bar.x, bar.mirrored_x] {
                    let mut x = start;
                    while x < start + bar.width {
                        ctx.draw(&canvas::Line::new(x, bottom, x, top, color));
                        x += 1.0;
                    }
                }
            }
        });
    frame.render_widget(canvas, area);
}

fn lyrics_text(view: &LyricsView) -> &str {
    match view {
        LyricsView::Idle => "",
        LyricsView::Loading => "Fetching lyrics...",
        LyricsView::Loaded(text) => text.as_str(),
        LyricsView::Unavailable(placeholder) => *placeholder,
    }
}

fn draw_lyrics<E: MediaEngine, B: HostBridge>(
    frame: &mut Frame,
    area: Rect,
    controller: &Controller<E, B>,
    p: Palette,
) {
    let lyrics = Paragraph::new(lyrics_text(controller.lyrics().view()))
        .block(bordered(" lyrics ", p).padding(Padding::horizontal(1)))
        .wrap(Wrap { trim: false });
    frame.render_widget(lyrics, area);
}

fn draw_prompt(frame: &mut Frame, app: &App, p: Palette) {
    let area = centered_rect_sized(64, 3, frame.area());
    frame.render_widget(Clear, area);
    let prompt = Paragraph::new(format!("{}▏", app.folder_input)).block(
        bordered(" open folder (enter loads, esc cancels) ", p)
            .border_style(Style::default().fg(p.accent)),
    );
    frame.render_widget(prompt, area);
}
