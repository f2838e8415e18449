//! Spectrum widget
//!
//! Draws the analyzer's display levels: 0.0 is -100 dB, 1.0 is full scale,
//! on the analyzer's warped frequency axis.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Axis labels for the warped frequency axis, computed once at startup
pub struct SpectrumAxis {
    pub labels: Vec<String>,
}

impl SpectrumAxis {
    /// Label the left edge, centre and right edge of the display
    pub fn new(bin_frequency: impl Fn(usize) -> f64, scope_size: usize) -> Self {
        let last = scope_size.saturating_sub(1);
        let labels = [0, scope_size / 2, last]
            .into_iter()
            .map(|bin| format_hz(bin_frequency(bin)))
            .collect();
        Self { labels }
    }
}

fn format_hz(freq: f64) -> String {
    if freq >= 1_000.0 {
        format!("{:.1}k", freq / 1_000.0)
    } else {
        format!("{freq:.0}")
    }
}

/// Render the spectrum levels
pub fn render_spectrum(frame: &mut Frame, area: Rect, levels: &[f32], axis: &SpectrumAxis) {
    let block = Block::default()
        .title(" Spectrum ")
        .borders(Borders::ALL);

    let len = levels.len().max(1) as f64;
    let data: Vec<(f64, f64)> = levels
        .iter()
        .enumerate()
        .map(|(i, &level)| (i as f64 / len, level as f64))
        .collect();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .labels(axis.labels.iter().map(|l| Span::raw(l.clone())).collect::<Vec<_>>())
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .labels(vec!["-100", "-50", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
