//! TUI module for saavy-scope
//!
//! Draws the scrolling waveform and the spectrum, and turns key presses
//! into notes and sound switches.

mod spectrum;
mod status;
mod waveform;

use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use midir::MidiInputConnection;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use saavy_scope::{
    analysis::{SpectralAnalyzer, WaveformView},
    io::MidiInputHandle,
    synth::{SampledSound, SoundSwitch},
};

pub use status::SessionInfo;

use crate::{keyboard::VirtualKeyboard, midi_input};
use spectrum::{render_spectrum, SpectrumAxis};
use status::{render_status, StatusLine};
use waveform::render_waveform;

/// UI application state
pub struct UiApp {
    waveform: WaveformView,
    spectrum: SpectralAnalyzer,
    spectrum_axis: SpectrumAxis,
    /// Latest display levels, kept between analyzer frames
    levels: Vec<f32>,
    spectrum_interval: Duration,
    last_spectrum: Instant,
    sounds: SoundSwitch,
    sample: SampledSound,
    keyboard: VirtualKeyboard,
    midi: MidiInputHandle,
    midi_connection: Option<MidiInputConnection<()>>,
    session: SessionInfo,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        waveform: WaveformView,
        spectrum: SpectralAnalyzer,
        refresh_hz: f32,
        sounds: SoundSwitch,
        sample: SampledSound,
        midi: MidiInputHandle,
        midi_connection: Option<MidiInputConnection<()>>,
        session: SessionInfo,
    ) -> Self {
        let sample_rate = session.sample_rate;
        let spectrum_axis = SpectrumAxis::new(
            |bin| spectrum.bin_frequency(bin, sample_rate),
            spectrum.scope_size(),
        );
        let levels = vec![0.0; spectrum.scope_size()];

        Self {
            waveform,
            spectrum,
            spectrum_axis,
            levels,
            spectrum_interval: Duration::from_secs_f32(1.0 / refresh_hz.max(1.0)),
            last_spectrum: Instant::now(),
            sounds,
            sample,
            keyboard: VirtualKeyboard::new(midi.clone()),
            midi,
            midi_connection,
            session,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.waveform.poll();
            self.poll_spectrum();
            self.keyboard.tick();

            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    /// Pull analyzer frames at the configured refresh rate
    fn poll_spectrum(&mut self) {
        if self.last_spectrum.elapsed() < self.spectrum_interval {
            return;
        }
        self.last_spectrum = Instant::now();

        if let Some(latest) = self.spectrum.frames().last() {
            self.levels = latest;
        }
    }

    /// Move to the next hardware input, ending with keyboard only
    fn cycle_midi_input(&mut self) {
        // Close the current port first; some backends refuse a second client
        self.midi_connection = None;

        let ports = match midi_input::available_ports() {
            Ok(ports) => ports,
            Err(err) => {
                log::warn!("cannot list MIDI inputs: {err}");
                self.session.midi_port = None;
                return;
            }
        };
        let Some(index) = midi_input::next_port(self.session.midi_port.as_deref(), &ports) else {
            self.session.midi_port = None;
            log::info!("MIDI input closed, keyboard only");
            return;
        };

        match midi_input::connect(&index.to_string(), self.midi.clone()) {
            Ok((connection, name)) => {
                self.midi_connection = Some(connection);
                self.session.midi_port = Some(name);
            }
            Err(err) => {
                log::warn!("{err}");
                self.session.midi_port = None;
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            KeyCode::Char('1') => self.sounds.use_sine(),
            KeyCode::Char('2') => self.sounds.use_sampled(self.sample.clone()),
            KeyCode::Char('z') => self.keyboard.octave_down(),
            KeyCode::Char('x') => self.keyboard.octave_up(),
            KeyCode::Char(' ') => self.keyboard.panic(),
            KeyCode::Char('m') | KeyCode::Char('M') => self.cycle_midi_input(),
            KeyCode::Char(c) => {
                self.keyboard.press(c);
            }
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // Main layout: status, waveform, spectrum, help
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),      // Status bar
                Constraint::Percentage(40), // Waveform
                Constraint::Min(8),         // Spectrum
                Constraint::Length(1),      // Help bar
            ])
            .split(area);

        let status = StatusLine {
            sound: self.sounds.current_kind(),
            sound_name: self.sounds.current_name(),
            base_note: self.keyboard.base_note(),
            midi_dropped: self.midi.dropped_events(),
            frames_dropped: self.spectrum.frames_dropped(),
            session: &self.session,
        };
        render_status(frame, chunks[0], &status);
        render_waveform(frame, chunks[1], &self.waveform);
        render_spectrum(frame, chunks[2], &self.levels, &self.spectrum_axis);

        let help = Paragraph::new(
            " [A-K] Play  [Z/X] Octave  [1] Sine  [2] Sample  [M] MIDI input  [Space] All off  [Q] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}
