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
use std::{error::Error, fmt, sync::Arc};

use midly::{
    live::LiveEvent,
    num::{u4, u7},
    MidiMessage,
};
use tokio::sync::mpsc::Sender;

mod midir;
mod mock;

/// The number of channels addressable on a MIDI port.
pub const NUM_MIDI_CHANNELS: u8 = 16;

/// The All Notes Off channel mode controller.
const ALL_NOTES_OFF: u8 = 123;

/// A sink for outbound MIDI events. Sinks never fail from the caller's point of
/// view; implementations that talk to hardware log their own errors.
pub trait Output {
    /// Emits an event.
    fn emit(&mut self, event: LiveEvent<'static>);
}

impl Output for Vec<LiveEvent<'static>> {
    fn emit(&mut self, event: LiveEvent<'static>) {
        self.push(event);
    }
}

/// A MIDI device that can listen for inputs and open an output.
pub trait Device: fmt::Display + std::marker::Send + std::marker::Sync {
    /// Returns the name of the device.
    fn name(&self) -> String;

    /// Watches MIDI input for events and sends them to the given sender.
    fn watch_events(&self, sender: Sender<Vec<u8>>) -> Result<(), Box<dyn Error>>;

    /// Stops watching events. Dropping the watcher closes the sender.
    fn stop_watch_events(&self);

    /// Opens an output connection to the device.
    fn connect_output(&self) -> Result<Box<dyn Output>, Box<dyn Error>>;
}

/// Lists devices known to midir.
pub fn list_devices() -> Result<Vec<Box<dyn Device>>, Box<dyn Error>> {
    midir::list()
}

/// Gets a device with the given name.
pub fn get_device(name: &str) -> Result<Arc<dyn Device>, Box<dyn Error>> {
    if name.starts_with("mock") {
        return Ok(Arc::new(mock::Device::get(name)));
    };

    Ok(Arc::new(midir::get(name)?))
}

/// Converts a 1-based channel number into its wire representation.
pub fn wire_channel(channel: u8) -> u4 {
    u4::from(channel.saturating_sub(1))
}

/// Builds a channel voice event on a 1-based channel.
pub fn event(channel: u8, message: MidiMessage) -> LiveEvent<'static> {
    LiveEvent::Midi {
        channel: wire_channel(channel),
        message,
    }
}

/// Sends All Notes Off on every channel.
pub fn all_notes_off(output: &mut dyn Output) {
    for channel in 1..=NUM_MIDI_CHANNELS {
        output.emit(event(
            channel,
            MidiMessage::Controller {
                controller: u7::from(ALL_NOTES_OFF),
                value: u7::from(0),
            },
        ));
    }
}
