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
use midly::num::u7;
use serde::Deserialize;

use super::{
    error::ConfigError,
    midi::{parse_channel, parse_u7},
};
use crate::{
    midi::NUM_MIDI_CHANNELS,
    thru::{ChannelFilter, ChordMemory, Options, MAX_CHORD_NOTES, MAX_EXTRA_NOTES},
};

/// The thru configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Thru {
    /// The channel to listen to. Omitted for omni.
    input_channel: Option<u8>,
    /// The channel to send to. 0 disables thru.
    output_channel: u8,
    /// The number of channels after the output channel to distribute notes over.
    distribution_channels: u8,
    /// How many extra copies of each message to send.
    extra_notes: u8,
    /// The chord every note is expanded into.
    chord: Vec<u8>,
    /// Start with thru bypassed.
    bypass: bool,
}

impl Thru {
    /// Validates the configuration and converts it into thru options.
    pub fn options(&self) -> Result<Options, ConfigError> {
        let input = match self.input_channel {
            Some(channel) => ChannelFilter::Channel(parse_channel(channel)?),
            None => ChannelFilter::Omni,
        };
        if self.output_channel > NUM_MIDI_CHANNELS {
            return Err(ConfigError::Invalid(format!(
                "output channel {} is invalid",
                self.output_channel
            )));
        }
        if self.distribution_channels > NUM_MIDI_CHANNELS {
            return Err(ConfigError::Invalid(format!(
                "cannot distribute over {} channels",
                self.distribution_channels
            )));
        }
        if self.extra_notes > MAX_EXTRA_NOTES {
            return Err(ConfigError::Invalid(format!(
                "at most {} extra notes are allowed, got {}",
                MAX_EXTRA_NOTES, self.extra_notes
            )));
        }
        if self.chord.len() > MAX_CHORD_NOTES {
            return Err(ConfigError::Invalid(format!(
                "chords hold at most {} notes, got {}",
                MAX_CHORD_NOTES,
                self.chord.len()
            )));
        }
        let chord = self
            .chord
            .iter()
            .map(|note| parse_u7(*note, "chord note").map(u7::from))
            .collect::<Result<Vec<u7>, ConfigError>>()?;

        Ok(Options::new(input, self.output_channel)
            .with_distribution(self.distribution_channels)
            .with_extra_notes(self.extra_notes)
            .with_chord(ChordMemory::new(&chord)))
    }

    pub fn bypass(&self) -> bool {
        self.bypass
    }
}
