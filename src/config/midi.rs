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
use serde::Deserialize;

use super::error::ConfigError;
use crate::midi::NUM_MIDI_CHANNELS;

/// The MIDI devices thru runs between.
#[derive(Clone, Debug, Deserialize)]
pub struct Midi {
    /// The device to read events from.
    input_device: String,
    /// The device to send events to. Defaults to the input device.
    output_device: Option<String>,
}

impl Midi {
    pub fn input_device(&self) -> &str {
        &self.input_device
    }

    pub fn output_device(&self) -> &str {
        self.output_device.as_deref().unwrap_or(&self.input_device)
    }
}

/// Parses a 1-based MIDI channel.
pub(super) fn parse_channel(channel: u8) -> Result<u8, ConfigError> {
    if (1..=NUM_MIDI_CHANNELS).contains(&channel) {
        Ok(channel)
    } else {
        Err(ConfigError::Invalid(format!(
            "error parsing channel: {} is invalid",
            channel
        )))
    }
}

/// Parses a value that must fit in 7 bits.
pub(super) fn parse_u7(raw: u8, what: &str) -> Result<u8, ConfigError> {
    if raw <= 0x7F {
        Ok(raw)
    } else {
        Err(ConfigError::Invalid(format!(
            "error parsing {}: {} is invalid",
            what, raw
        )))
    }
}
