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
use serde::{Deserialize, Serialize};

use super::{error::ConfigError, midi::parse_u7};
use crate::sequencer::{
    self, ControlType, StepSequence, TrackData, NOTE_LENGTH_DEFAULT, OUT_CHANNEL_DEFAULT,
    VELOCITY_PER_NOTE,
};

/// A step sequence as written in YAML.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Sequence {
    #[serde(default)]
    format: Format,
    #[serde(default)]
    layout: Layout,
    #[serde(default)]
    tracks: Vec<Track>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq)]
enum Format {
    #[default]
    #[serde(rename = "12x16")]
    Tracks12x16,
    #[serde(rename = "8x24")]
    Tracks8x24,
    #[serde(rename = "6x32")]
    Tracks6x32,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
enum Layout {
    #[default]
    Basic,
    Extended,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
enum Control {
    ControlChange,
    Nrpn,
    Rpn,
    ProgramChange,
    PitchBend,
    Aftertouch,
    VoltageA,
    VoltageB,
}

/// A control track's stream.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
struct ControlStream {
    #[serde(rename = "type")]
    kind: Control,
    #[serde(default)]
    parameter: u16,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
struct Step {
    note: u8,
    velocity: u8,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
struct Track {
    #[serde(skip_serializing_if = "Option::is_none")]
    control: Option<ControlStream>,
    muted: bool,
    /// 0 is off, 17 the default channel.
    out_channel: u8,
    /// 101 is the default length.
    note_length: u8,
    /// 128 is per-note velocity.
    velocity: u8,
    fader: u8,
    steps: Vec<Step>,
}

impl Default for Track {
    fn default() -> Self {
        Track {
            control: None,
            muted: false,
            out_channel: OUT_CHANNEL_DEFAULT,
            note_length: NOTE_LENGTH_DEFAULT,
            velocity: VELOCITY_PER_NOTE,
            fader: sequencer::FADER_MAX,
            steps: Vec::new(),
        }
    }
}

impl From<Format> for sequencer::Format {
    fn from(format: Format) -> Self {
        match format {
            Format::Tracks12x16 => sequencer::Format::Tracks12x16,
            Format::Tracks8x24 => sequencer::Format::Tracks8x24,
            Format::Tracks6x32 => sequencer::Format::Tracks6x32,
        }
    }
}

impl From<sequencer::Format> for Format {
    fn from(format: sequencer::Format) -> Self {
        match format {
            sequencer::Format::Tracks12x16 => Format::Tracks12x16,
            sequencer::Format::Tracks8x24 => Format::Tracks8x24,
            sequencer::Format::Tracks6x32 => Format::Tracks6x32,
        }
    }
}

impl From<Layout> for sequencer::Layout {
    fn from(layout: Layout) -> Self {
        match layout {
            Layout::Basic => sequencer::Layout::Basic,
            Layout::Extended => sequencer::Layout::Extended,
        }
    }
}

impl From<sequencer::Layout> for Layout {
    fn from(layout: sequencer::Layout) -> Self {
        match layout {
            sequencer::Layout::Basic => Layout::Basic,
            sequencer::Layout::Extended => Layout::Extended,
        }
    }
}

impl From<Control> for ControlType {
    fn from(control: Control) -> Self {
        match control {
            Control::ControlChange => ControlType::ControlChange,
            Control::Nrpn => ControlType::Nrpn,
            Control::Rpn => ControlType::Rpn,
            Control::ProgramChange => ControlType::ProgramChange,
            Control::PitchBend => ControlType::PitchBend,
            Control::Aftertouch => ControlType::Aftertouch,
            Control::VoltageA => ControlType::VoltageA,
            Control::VoltageB => ControlType::VoltageB,
        }
    }
}

impl From<ControlType> for Control {
    fn from(control: ControlType) -> Self {
        match control {
            ControlType::ControlChange => Control::ControlChange,
            ControlType::Nrpn => Control::Nrpn,
            ControlType::Rpn => Control::Rpn,
            ControlType::ProgramChange => Control::ProgramChange,
            ControlType::PitchBend => Control::PitchBend,
            ControlType::Aftertouch => Control::Aftertouch,
            ControlType::VoltageA => Control::VoltageA,
            ControlType::VoltageB => Control::VoltageB,
        }
    }
}

impl Sequence {
    /// Describes an existing step sequence.
    pub fn from_step_sequence(sequence: &StepSequence) -> Sequence {
        let format = sequence.format();
        Sequence {
            format: format.into(),
            layout: sequence.layout().into(),
            tracks: sequence
                .tracks()
                .iter()
                .enumerate()
                .map(|(i, track)| Track {
                    control: match track.data {
                        TrackData::Note => None,
                        TrackData::Control { kind, parameter } => Some(ControlStream {
                            kind: kind.into(),
                            parameter,
                        }),
                    },
                    muted: track.muted,
                    out_channel: track.out_channel,
                    note_length: track.note_length,
                    velocity: track.velocity,
                    fader: track.fader,
                    steps: (0..format.length())
                        .filter_map(|step| sequence.step(i, step))
                        .map(|(note, velocity)| Step { note, velocity })
                        .collect(),
                })
                .collect(),
        }
    }

    /// Validates the description and builds the step sequence.
    pub fn to_step_sequence(&self) -> Result<StepSequence, ConfigError> {
        let format = sequencer::Format::from(self.format);
        let layout = sequencer::Layout::from(self.layout);
        if self.tracks.len() > format.tracks() {
            return Err(ConfigError::Invalid(format!(
                "{} tracks given, the format holds {}",
                self.tracks.len(),
                format.tracks()
            )));
        }

        let mut sequence = StepSequence::new(format, layout);
        for (i, config) in self.tracks.iter().enumerate() {
            if config.steps.len() > format.length() {
                return Err(ConfigError::Invalid(format!(
                    "track {} has {} steps, the format holds {}",
                    i + 1,
                    config.steps.len(),
                    format.length()
                )));
            }
            for (step, value) in config.steps.iter().enumerate() {
                sequence.set_step(
                    i,
                    step,
                    parse_u7(value.note, "note")?,
                    parse_u7(value.velocity, "velocity")?,
                );
            }

            let data = match config.control {
                None => TrackData::Note,
                Some(_) if layout == sequencer::Layout::Basic => {
                    return Err(ConfigError::Invalid(format!(
                        "track {} is a control track, which needs the extended layout",
                        i + 1
                    )))
                }
                Some(control) if control.parameter > 0x3FFF => {
                    return Err(ConfigError::Invalid(format!(
                        "control parameter {} is invalid",
                        control.parameter
                    )))
                }
                Some(control) => TrackData::Control {
                    kind: control.kind.into(),
                    parameter: control.parameter,
                },
            };
            if config.out_channel > OUT_CHANNEL_DEFAULT {
                return Err(ConfigError::Invalid(format!(
                    "out channel {} is invalid",
                    config.out_channel
                )));
            }
            if config.note_length > NOTE_LENGTH_DEFAULT {
                return Err(ConfigError::Invalid(format!(
                    "note length {} is invalid",
                    config.note_length
                )));
            }
            if config.velocity > VELOCITY_PER_NOTE {
                return Err(ConfigError::Invalid(format!(
                    "velocity {} is invalid",
                    config.velocity
                )));
            }

            let Some(track) = sequence.track_mut(i) else {
                continue;
            };
            track.data = data;
            track.muted = config.muted;
            track.out_channel = config.out_channel;
            track.note_length = config.note_length;
            track.velocity = config.velocity;
            track.fader = parse_u7(config.fader, "fader")?;
        }
        Ok(sequence)
    }
}
