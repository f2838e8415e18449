//! Scrolling waveform widget

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use saavy_scope::analysis::WaveformView;

/// Render the waveform history as per-column min/max envelopes
pub fn render_waveform(frame: &mut Frame, area: Rect, view: &WaveformView) {
    let block = Block::default()
        .title(" Waveform ")
        .borders(Borders::ALL);

    // Two braille dots per terminal cell
    let width = (area.width.saturating_sub(2) as usize * 2).max(1);
    let columns = view.min_max_columns(width);

    let upper: Vec<(f64, f64)> = columns
        .iter()
        .enumerate()
        .map(|(i, &(_, hi))| (i as f64 / width as f64, hi as f64))
        .collect();
    let lower: Vec<(f64, f64)> = columns
        .iter()
        .enumerate()
        .map(|(i, &(lo, _))| (i as f64 / width as f64, lo as f64))
        .collect();

    let datasets = vec![
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&upper),
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&lower),
    ];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-1.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
