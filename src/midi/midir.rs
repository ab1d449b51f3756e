// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::{collections::HashMap, error::Error, fmt, mem};

use midir::{
    MidiInput, MidiInputConnection, MidiInputPort, MidiOutput, MidiOutputConnection,
    MidiOutputPort,
};
use midly::live::LiveEvent;
use parking_lot::Mutex;
use tokio::sync::mpsc::Sender;
use tracing::{debug, error, info, span, warn, Level};

pub struct Device {
    name: String,
    input_port: Option<MidiInputPort>,
    output_port: Option<MidiOutputPort>,
    event_connection: Mutex<Option<MidiInputConnection<()>>>,
}

impl super::Device for Device {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn watch_events(&self, sender: Sender<Vec<u8>>) -> Result<(), Box<dyn Error>> {
        let span = span!(Level::INFO, "wait for event (midir)");
        let _enter = span.enter();

        let mut event_connection = self.event_connection.lock();
        if event_connection.is_some() {
            return Err("Already watching events.".into());
        }

        let input_port = match self.input_port.as_ref() {
            Some(input_port) => input_port,
            None => {
                return Err(format!(
                    "{} has no MIDI input, cannot listen for events",
                    self.name
                )
                .into())
            }
        };

        info!(device = self.name, "Watching MIDI events.");

        let input = MidiInput::new("gizmo input")?;
        *event_connection = Some(input.connect(
            input_port,
            "gizmo input watcher",
            move |_, raw_event, _| {
                if let Err(e) = sender.blocking_send(Vec::from(raw_event)) {
                    error!(
                        err = format!("{:?}", e),
                        "Error sending MIDI event to receiver."
                    );
                }
            },
            (),
        )?);

        Ok(())
    }

    fn stop_watch_events(&self) {
        // Explicitly drop the connection, which drops the sender with it.
        let event_connection = self.event_connection.lock().take();

        mem::drop(event_connection);
    }

    fn connect_output(&self) -> Result<Box<dyn super::Output>, Box<dyn Error>> {
        let output_port = match self.output_port.as_ref() {
            Some(output_port) => output_port,
            None => return Err(format!("{} has no MIDI output", self.name).into()),
        };

        let output = MidiOutput::new("gizmo output")?;
        let connection = output.connect(output_port, "gizmo thru")?;
        info!(device = self.name, "Connected MIDI output.");

        Ok(Box::new(Connection {
            name: self.name.clone(),
            connection,
            buf: Vec::with_capacity(8),
        }))
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut capabilities: Vec<String> = Vec::new();
        if self.input_port.is_some() {
            capabilities.push(String::from("Input"));
        }
        if self.output_port.is_some() {
            capabilities.push(String::from("Output"));
        }

        write!(f, "{} ({})", self.name, capabilities.join("/"))
    }
}

/// An open midir output connection.
struct Connection {
    name: String,
    connection: MidiOutputConnection,
    buf: Vec<u8>,
}

impl super::Output for Connection {
    fn emit(&mut self, event: LiveEvent<'static>) {
        self.buf.clear();
        if let Err(e) = event.write(&mut self.buf) {
            error!(err = e.to_string(), "Unable to encode MIDI event.");
            return;
        }

        debug!(
            device = self.name,
            event = format!("{:?}", event),
            "Emitting event."
        );
        if let Err(e) = self.connection.send(&self.buf) {
            warn!(
                device = self.name,
                err = e.to_string(),
                "Unable to send MIDI event."
            );
        }
    }
}

/// Lists midir devices and produces the Device trait.
pub fn list() -> Result<Vec<Box<dyn super::Device>>, Box<dyn Error>> {
    Ok(list_midir_devices()?
        .into_iter()
        .map(|device| {
            let device: Box<dyn super::Device> = Box::new(device);
            device
        })
        .collect())
}

/// Lists midir devices.
fn list_midir_devices() -> Result<Vec<Device>, Box<dyn Error>> {
    let input = MidiInput::new("gizmo input listing")?;
    let output = MidiOutput::new("gizmo output listing")?;

    let mut devices: HashMap<String, Device> = HashMap::new();

    for port in input.ports() {
        let name = input.port_name(&port)?;
        devices.entry(name.clone()).or_insert_with(|| Device {
            name,
            input_port: Some(port),
            output_port: None,
            event_connection: Mutex::new(None),
        });
    }

    for port in output.ports() {
        let name = output.port_name(&port)?;
        match devices.get_mut(&name) {
            Some(device) => {
                device.output_port = Some(port);
            }
            None => {
                devices.insert(
                    name.clone(),
                    Device {
                        name,
                        input_port: None,
                        output_port: Some(port),
                        event_connection: Mutex::new(None),
                    },
                );
            }
        }
    }

    let mut sorted_devices = devices.into_values().collect::<Vec<Device>>();
    sorted_devices.sort_by_key(|device| device.name.clone());
    Ok(sorted_devices)
}

/// Gets the given midir device.
pub fn get(name: &str) -> Result<Device, Box<dyn Error>> {
    let mut matches = list_midir_devices()?
        .into_iter()
        .filter(|device| device.name.contains(name))
        .collect::<Vec<Device>>();

    if matches.is_empty() {
        return Err(format!("no device found with name {}", name).into());
    }
    if matches.len() > 1 {
        return Err(format!(
            "found too many devices that match ({}), use a less ambiguous device name",
            matches
                .iter()
                .map(|device| device.name.clone())
                .collect::<Vec<String>>()
                .join(", ")
        )
        .into());
    }

    // We've verified that there's only one element in the vector, so this should be safe.
    Ok(matches.swap_remove(0))
}
