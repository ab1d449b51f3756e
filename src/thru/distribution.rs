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
//! The distribution slot table.
//!
//! One slot per MIDI channel, each remembering the note currently sounding
//! through it. A round-robin cursor picks the next slot to hand out.

use std::ops::Range;

use midly::num::u7;

use crate::midi::NUM_MIDI_CHANNELS;

const NUM_SLOTS: usize = NUM_MIDI_CHANNELS as usize;

/// The result of handing the cursor slot to a new note.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Assignment {
    /// The slot the note was stored in.
    pub slot: u8,
    /// The note that was sounding in the slot before, if any.
    pub stale: Option<u7>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Distribution {
    notes: [Option<u7>; NUM_SLOTS],
    cursor: u8,
}

impl Distribution {
    /// Creates an empty slot table with the cursor at slot 0.
    pub fn new() -> Distribution {
        Distribution::default()
    }

    /// Empties every slot and rewinds the cursor.
    pub fn reset(&mut self) {
        self.notes = [None; NUM_SLOTS];
        self.cursor = 0;
    }

    /// The slot the next note will be stored in.
    pub fn cursor(&self) -> u8 {
        self.cursor
    }

    /// The note sounding in the given slot.
    pub fn note(&self, slot: u8) -> Option<u7> {
        self.notes[slot as usize]
    }

    /// Empties the given slot.
    pub fn clear(&mut self, slot: u8) {
        self.notes[slot as usize] = None;
    }

    /// Stores `note` in the cursor slot and advances the cursor. The cursor
    /// wraps to 0 once it passes `last_slot(channels)`.
    pub fn assign(&mut self, note: u7, channels: u8) -> Assignment {
        let slot = self.cursor;
        let stale = self.notes[slot as usize].replace(note);

        self.cursor += 1;
        if self.cursor > last_slot(channels) {
            self.cursor = 0;
        }

        Assignment { slot, stale }
    }
}

/// Every slot in the table, live or not.
pub fn slots() -> Range<u8> {
    0..NUM_SLOTS as u8
}

/// The highest slot index in use for a configured distribution channel count.
/// The count is 1-based, so `channels` itself is a valid index, bounded by the
/// size of the table.
pub fn last_slot(channels: u8) -> u8 {
    channels.min(NUM_MIDI_CHANNELS - 1)
}
