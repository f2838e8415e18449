//! Hardware MIDI input via midir.

use color_eyre::eyre::{eyre, Result as EyreResult};
use midir::{Ignore, MidiInput, MidiInputConnection, MidiInputPort};
use saavy_scope::io::{MidiInputHandle, MidiMessage};

const CLIENT_NAME: &str = "saavy-scope";

fn create_midi_in() -> EyreResult<MidiInput> {
    let mut midi_in =
        MidiInput::new(CLIENT_NAME).map_err(|e| eyre!("failed to open MIDI client: {e}"))?;
    midi_in.ignore(Ignore::All);
    Ok(midi_in)
}

fn port_names(midi_in: &MidiInput) -> Vec<(MidiInputPort, String)> {
    midi_in
        .ports()
        .into_iter()
        .map(|port| {
            let name = midi_in
                .port_name(&port)
                .unwrap_or_else(|_| "Unknown Input".to_string());
            (port, name)
        })
        .collect()
}

pub fn list_ports() -> EyreResult<()> {
    let midi_in = create_midi_in()?;
    let ports = port_names(&midi_in);
    if ports.is_empty() {
        println!("No MIDI inputs found");
    }
    for (index, (_, name)) in ports.iter().enumerate() {
        println!("{index}: {name}");
    }
    Ok(())
}

/// Names of the inputs currently available, in index order.
pub fn available_ports() -> EyreResult<Vec<String>> {
    let midi_in = create_midi_in()?;
    Ok(port_names(&midi_in).into_iter().map(|(_, name)| name).collect())
}

/// Index of the input after `current` when cycling through `names`.
///
/// `None` means keyboard only, which sits after the last port.
pub fn next_port(current: Option<&str>, names: &[String]) -> Option<usize> {
    let next = current
        .and_then(|name| names.iter().position(|n| n == name))
        .map_or(0, |index| index + 1);
    (next < names.len()).then_some(next)
}

/// Open the input matching `spec` (an index or part of a port name) and
/// forward every decoded message to `handle`.
///
/// The connection stays open until the returned value is dropped.
pub fn connect(spec: &str, handle: MidiInputHandle) -> EyreResult<(MidiInputConnection<()>, String)> {
    let midi_in = create_midi_in()?;
    let ports = port_names(&midi_in);

    let selected = match spec.parse::<usize>() {
        Ok(index) => ports.into_iter().nth(index),
        Err(_) => {
            let needle = spec.to_lowercase();
            ports
                .into_iter()
                .find(|(_, name)| name.to_lowercase().contains(&needle))
        }
    };
    let (port, name) = selected.ok_or_else(|| eyre!("no MIDI input matches `{spec}`"))?;

    let connection = midi_in
        .connect(
            &port,
            "saavy-scope-input",
            move |_stamp, bytes, _| {
                if let Some(message) = MidiMessage::from_bytes(bytes) {
                    if message != MidiMessage::Other {
                        handle.push_message(message);
                    }
                }
            },
            (),
        )
        .map_err(|e| eyre!("failed to connect to `{name}`: {e}"))?;

    log::info!("listening on MIDI input `{name}`");
    Ok((connection, name))
}
