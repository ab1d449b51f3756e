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
//! Step sequences as they are stored in a slot.
//!
//! A step sequence is a fixed buffer of 7-bit cells, two per step (note then
//! velocity), one run of steps per track. Per-track settings have no storage
//! of their own: on save they are packed into the spare high bits of the
//! track's cells, and on load they are unpacked and the high bits cleared
//! again.

use tracing::{debug, info};

use crate::{
    pack,
    slot::{Slot, SlotError, SlotType},
};

mod layout;

pub use layout::Layout;

/// The size of a step sequence buffer in cells.
pub const BUFFER_SIZE: usize = 384;

/// Track output channel: silenced.
pub const OUT_CHANNEL_OFF: u8 = 0;

/// Track output channel: use the global output channel.
pub const OUT_CHANNEL_DEFAULT: u8 = 17;

/// Track velocity: use the velocity stored with each note.
pub const VELOCITY_PER_NOTE: u8 = 128;

/// Track note length: use the global note length. Lengths 0..=100 are a
/// percentage of the step.
pub const NOTE_LENGTH_DEFAULT: u8 = 101;

/// Full fader.
pub const FADER_MAX: u8 = 127;

/// The track count and length a step sequence buffer is divided into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    /// 12 tracks of 16 steps.
    #[default]
    Tracks12x16,
    /// 8 tracks of 24 steps.
    Tracks8x24,
    /// 6 tracks of 32 steps.
    Tracks6x32,
}

impl Format {
    pub fn tracks(&self) -> usize {
        match self {
            Format::Tracks12x16 => 12,
            Format::Tracks8x24 => 8,
            Format::Tracks6x32 => 6,
        }
    }

    pub fn length(&self) -> usize {
        match self {
            Format::Tracks12x16 => 16,
            Format::Tracks8x24 => 24,
            Format::Tracks6x32 => 32,
        }
    }

    /// The first cell of the given track.
    pub fn track_start(&self, track: usize) -> usize {
        track * self.length() * 2
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Format::Tracks12x16 => 0,
            Format::Tracks8x24 => 1,
            Format::Tracks6x32 => 2,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Format> {
        match byte {
            0 => Some(Format::Tracks12x16),
            1 => Some(Format::Tracks8x24),
            2 => Some(Format::Tracks6x32),
            _ => None,
        }
    }
}

/// What a control track sends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlType {
    ControlChange,
    Nrpn,
    Rpn,
    ProgramChange,
    PitchBend,
    Aftertouch,
    VoltageA,
    VoltageB,
}

impl ControlType {
    const ALL: [ControlType; 8] = [
        ControlType::ControlChange,
        ControlType::Nrpn,
        ControlType::Rpn,
        ControlType::ProgramChange,
        ControlType::PitchBend,
        ControlType::Aftertouch,
        ControlType::VoltageA,
        ControlType::VoltageB,
    ];

    /// The 3-bit stored form.
    pub fn to_bits(self) -> u8 {
        self as u8
    }

    /// Every 3-bit value is a control type; higher bits are ignored.
    pub fn from_bits(bits: u8) -> ControlType {
        ControlType::ALL[usize::from(bits & 0x07)]
    }
}

/// What a track plays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TrackData {
    #[default]
    Note,
    /// A control stream with a 14-bit parameter number.
    Control { kind: ControlType, parameter: u16 },
}

/// Per-track settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Track {
    pub data: TrackData,
    pub muted: bool,
    /// 0 is off, 1..=16 a channel, 17 the default channel.
    pub out_channel: u8,
    pub note_length: u8,
    /// 0..=127, or 128 for per-note velocity.
    pub velocity: u8,
    pub fader: u8,
}

impl Default for Track {
    fn default() -> Self {
        Track {
            data: TrackData::Note,
            muted: false,
            out_channel: OUT_CHANNEL_DEFAULT,
            note_length: NOTE_LENGTH_DEFAULT,
            velocity: VELOCITY_PER_NOTE,
            fader: FADER_MAX,
        }
    }
}

/// A step sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepSequence {
    format: Format,
    layout: Layout,
    buffer: [u8; BUFFER_SIZE],
    tracks: Vec<Track>,
}

impl Default for StepSequence {
    fn default() -> Self {
        StepSequence::new(Format::default(), Layout::default())
    }
}

impl StepSequence {
    /// Creates an empty sequence with default track settings.
    pub fn new(format: Format, layout: Layout) -> StepSequence {
        StepSequence {
            format,
            layout,
            buffer: [0; BUFFER_SIZE],
            tracks: vec![Track::default(); format.tracks()],
        }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track_mut(&mut self, track: usize) -> Option<&mut Track> {
        self.tracks.get_mut(track)
    }

    /// The raw cell buffer.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    fn cell(&self, track: usize, step: usize) -> Option<usize> {
        if track >= self.format.tracks() || step >= self.format.length() {
            return None;
        }
        Some(self.format.track_start(track) + step * 2)
    }

    /// The note and velocity at a step.
    pub fn step(&self, track: usize, step: usize) -> Option<(u8, u8)> {
        self.cell(track, step)
            .map(|cell| (self.buffer[cell], self.buffer[cell + 1]))
    }

    /// Sets the note and velocity at a step, keeping the low 7 bits of each.
    /// Returns false if the step is outside the sequence.
    pub fn set_step(&mut self, track: usize, step: usize, note: u8, velocity: u8) -> bool {
        match self.cell(track, step) {
            Some(cell) => {
                self.buffer[cell] = note & 0x7F;
                self.buffer[cell + 1] = velocity & 0x7F;
                true
            }
            None => false,
        }
    }

    /// Packs every track's settings into the buffer's high bits. The buffer is
    /// not playable until `strip` is called.
    pub fn pack(&mut self) {
        for (i, track) in self.tracks.iter().enumerate() {
            self.layout
                .write_track(&mut self.buffer, self.format.track_start(i), track);
        }
    }

    /// Reads every track's settings back out of the buffer's high bits.
    pub fn unpack(&mut self) {
        let format = self.format;
        let layout = self.layout;
        let buffer = &self.buffer;
        self.tracks = (0..format.tracks())
            .map(|i| layout.read_track(buffer, format.track_start(i)))
            .collect();
    }

    /// Clears the buffer's high bits.
    pub fn strip(&mut self) {
        pack::strip_high_bits(&mut self.buffer);
    }

    /// Packs the sequence into a slot image. The live buffer is stripped again
    /// before returning, so the sequence stays playable.
    pub fn save(&mut self) -> Slot {
        self.pack();
        let slot = Slot::new(
            SlotType::StepSequencer,
            self.format.to_byte(),
            self.layout.to_byte(),
            &self.buffer,
        );
        self.strip();

        debug!(
            format = ?self.format,
            layout = ?self.layout,
            "Packed step sequence."
        );
        slot
    }

    /// Loads a sequence from a slot image. Slots holding anything other than a
    /// step sequence give a fresh sequence.
    pub fn load(slot: &Slot) -> Result<StepSequence, SlotError> {
        if slot.kind() != SlotType::StepSequencer {
            info!(kind = ?slot.kind(), "Slot holds no step sequence, starting fresh.");
            return Ok(StepSequence::default());
        }

        let format = Format::from_byte(slot.format()).ok_or(SlotError::Format(slot.format()))?;
        let layout = Layout::from_byte(slot.layout()).ok_or(SlotError::Layout(slot.layout()))?;
        if slot.payload().len() != BUFFER_SIZE {
            return Err(SlotError::Size {
                expected: BUFFER_SIZE,
                actual: slot.payload().len(),
            });
        }

        let mut sequence = StepSequence::new(format, layout);
        sequence.buffer.copy_from_slice(slot.payload());
        sequence.unpack();
        sequence.strip();
        Ok(sequence)
    }
}
