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
//! Where each track's settings live in the high bits of its note buffer.

use crate::pack::Field;

use super::{ControlType, Track, TrackData};

/// The per-track field layout of a step sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Layout {
    /// Note tracks only.
    #[default]
    Basic,
    /// Note or control tracks, told apart by a leading data type bit.
    Extended,
}

/// The settings of a note track.
struct NoteFields {
    mute: Field,
    out_channel: Field,
    note_length: Field,
    velocity: Field,
    fader: Field,
}

const BASIC_NOTE: NoteFields = NoteFields {
    mute: Field::new(0, 1),
    out_channel: Field::new(1, 5),
    note_length: Field::new(6, 7),
    velocity: Field::new(13, 8),
    fader: Field::new(21, 7),
};

/// 0 for note tracks, 1 for control tracks.
const DATA_TYPE: Field = Field::new(0, 1);

const EXTENDED_NOTE: NoteFields = NoteFields {
    mute: Field::new(1, 1),
    out_channel: Field::new(2, 5),
    note_length: Field::new(7, 7),
    velocity: Field::new(14, 8),
    fader: Field::new(22, 7),
};

const CONTROL_TYPE: Field = Field::new(1, 3);
const PARAMETER_MSB: Field = Field::new(4, 7);
const PARAMETER_LSB: Field = Field::new(11, 7);
const CONTROL_OUT_CHANNEL: Field = Field::new(18, 5);

/// The number of cells from a track's start that packing may touch, padding
/// included.
pub(super) const TRACK_FOOTPRINT: usize = 30;

/// Packs `value` into `field` relative to `base`, saturating at the largest
/// value the field holds.
fn store(field: Field, buffer: &mut [u8], base: usize, value: u8) {
    field.at(base).pack(buffer, value.min(field.max_value()));
}

impl NoteFields {
    // Ascending offset order, so each field overwrites the padding of the last.
    fn write(&self, buffer: &mut [u8], base: usize, track: &Track) {
        store(self.mute, buffer, base, u8::from(track.muted));
        store(self.out_channel, buffer, base, track.out_channel);
        store(self.note_length, buffer, base, track.note_length);
        store(self.velocity, buffer, base, track.velocity);
        store(self.fader, buffer, base, track.fader);
    }

    fn read(&self, buffer: &[u8], base: usize) -> Track {
        Track {
            data: TrackData::Note,
            muted: self.mute.at(base).unpack(buffer) == 1,
            out_channel: self.out_channel.at(base).unpack(buffer),
            note_length: self.note_length.at(base).unpack(buffer),
            velocity: self.velocity.at(base).unpack(buffer),
            fader: self.fader.at(base).unpack(buffer),
        }
    }
}

impl Layout {
    pub fn to_byte(self) -> u8 {
        match self {
            Layout::Basic => 0,
            Layout::Extended => 1,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Layout> {
        match byte {
            0 => Some(Layout::Basic),
            1 => Some(Layout::Extended),
            _ => None,
        }
    }

    /// Packs a track's settings into the high bits of the cells starting at
    /// `base`. The basic layout has no room for control data and always writes
    /// a note track.
    pub(super) fn write_track(self, buffer: &mut [u8], base: usize, track: &Track) {
        match (self, track.data) {
            (Layout::Basic, _) => BASIC_NOTE.write(buffer, base, track),
            (Layout::Extended, TrackData::Note) => {
                store(DATA_TYPE, buffer, base, 0);
                EXTENDED_NOTE.write(buffer, base, track);
            }
            (Layout::Extended, TrackData::Control { kind, parameter }) => {
                store(DATA_TYPE, buffer, base, 1);
                store(CONTROL_TYPE, buffer, base, kind.to_bits());
                store(PARAMETER_MSB, buffer, base, (parameter >> 7) as u8);
                store(PARAMETER_LSB, buffer, base, (parameter & 0x7F) as u8);
                store(CONTROL_OUT_CHANNEL, buffer, base, track.out_channel);
            }
        }
    }

    /// Unpacks a track's settings from the cells starting at `base`.
    pub(super) fn read_track(self, buffer: &[u8], base: usize) -> Track {
        match self {
            Layout::Basic => BASIC_NOTE.read(buffer, base),
            Layout::Extended if DATA_TYPE.at(base).unpack(buffer) == 0 => {
                EXTENDED_NOTE.read(buffer, base)
            }
            Layout::Extended => {
                let msb = u16::from(PARAMETER_MSB.at(base).unpack(buffer));
                let lsb = u16::from(PARAMETER_LSB.at(base).unpack(buffer));
                Track {
                    data: TrackData::Control {
                        kind: ControlType::from_bits(CONTROL_TYPE.at(base).unpack(buffer)),
                        parameter: (msb << 7) | lsb,
                    },
                    out_channel: CONTROL_OUT_CHANNEL.at(base).unpack(buffer),
                    ..Track::default()
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::{
        Layout, NoteFields, BASIC_NOTE, CONTROL_OUT_CHANNEL, CONTROL_TYPE, DATA_TYPE,
        EXTENDED_NOTE, PARAMETER_LSB, PARAMETER_MSB, TRACK_FOOTPRINT,
    };
    use crate::{
        pack::Field,
        sequencer::{ControlType, Track, TrackData},
    };

    fn note_fields(fields: &NoteFields) -> Vec<Field> {
        vec![
            fields.mute,
            fields.out_channel,
            fields.note_length,
            fields.velocity,
            fields.fader,
        ]
    }

    /// Checks that fields are in ascending order, never overlap, and stay
    /// within the track footprint.
    fn assert_disjoint(fields: &[Field]) {
        for pair in fields.windows(2) {
            assert!(
                pair[0].offset() + usize::from(pair[0].width()) <= pair[1].offset(),
                "{:?} overlaps {:?}",
                pair[0],
                pair[1]
            );
        }
        for field in fields {
            assert!(field.offset() + 8 <= TRACK_FOOTPRINT, "{:?} too far", field);
        }
    }

    #[test]
    fn layouts_are_disjoint() {
        assert_disjoint(&note_fields(&BASIC_NOTE));

        let mut extended = vec![DATA_TYPE];
        extended.extend(note_fields(&EXTENDED_NOTE));
        assert_disjoint(&extended);

        assert_disjoint(&[
            DATA_TYPE,
            CONTROL_TYPE,
            PARAMETER_MSB,
            PARAMETER_LSB,
            CONTROL_OUT_CHANNEL,
        ]);
    }

    #[test]
    fn oversized_values_saturate() {
        let mut buffer = [0x55u8; 32];
        let track = Track {
            out_channel: 40,
            note_length: 200,
            fader: 255,
            ..Track::default()
        };

        for layout in [Layout::Basic, Layout::Extended] {
            layout.write_track(&mut buffer, 0, &track);
            let read = layout.read_track(&buffer, 0);
            assert_eq!(31, read.out_channel);
            assert_eq!(127, read.note_length);
            assert_eq!(127, read.fader);
            assert_eq!(track.velocity, read.velocity);
            assert!(buffer.iter().all(|cell| cell & 0x7F == 0x55));
        }

        let control = Track {
            data: TrackData::Control {
                kind: ControlType::Rpn,
                parameter: 0x3FFF,
            },
            out_channel: 99,
            ..Track::default()
        };
        Layout::Extended.write_track(&mut buffer, 0, &control);
        assert_eq!(
            Track {
                out_channel: 31,
                ..control
            },
            Layout::Extended.read_track(&buffer, 0)
        );
    }

    #[test]
    fn layout_bytes() {
        for layout in [Layout::Basic, Layout::Extended] {
            assert_eq!(Some(layout), Layout::from_byte(layout.to_byte()));
        }
        assert_eq!(None, Layout::from_byte(2));
    }
}
