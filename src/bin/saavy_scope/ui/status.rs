//! Status bar widget - sound, octave, voices and device info

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use saavy_scope::{synth::SoundKind, VoiceStealing};

/// Fixed facts about the running session
pub struct SessionInfo {
    pub sample_rate: f64,
    pub channels: usize,
    pub midi_port: Option<String>,
    pub stealing: VoiceStealing,
}

/// Values that change while running
pub struct StatusLine<'a> {
    pub sound: SoundKind,
    pub sound_name: String,
    pub base_note: u8,
    pub midi_dropped: u64,
    pub frames_dropped: u64,
    pub session: &'a SessionInfo,
}

/// Render the status bar
pub fn render_status(frame: &mut Frame, area: Rect, status: &StatusLine<'_>) {
    let block = Block::default()
        .title(" saavy-scope ")
        .borders(Borders::ALL);

    let session = status.session;
    let sound = match status.sound {
        SoundKind::Sine => "Sine".to_owned(),
        SoundKind::Sampled => format!("Sample: {}", status.sound_name),
    };
    let stealing = match session.stealing {
        VoiceStealing::Drop => "drop",
        VoiceStealing::StealOldest => "steal",
    };
    let midi = session.midi_port.as_deref().unwrap_or("keyboard only");

    let line = Line::from(vec![
        Span::styled(format!(" {sound}  "), Style::default().fg(Color::Cyan)),
        Span::styled(
            format!("Octave C{}  ", status.base_note as i32 / 12 - 1),
            Style::default().fg(Color::White),
        ),
        Span::styled(format!("Pool: {stealing}  "), Style::default().fg(Color::Yellow)),
        Span::styled(format!("MIDI: {midi}  "), Style::default().fg(Color::Green)),
        Span::styled(
            format!(
                "{:.1}kHz {}ch  ",
                session.sample_rate / 1000.0,
                session.channels
            ),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!(
                "Dropped: {} events, {} frames",
                status.midi_dropped, status.frames_dropped
            ),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}
