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

/// The most notes a chord memory can hold.
pub const MAX_CHORD_NOTES: usize = 8;

/// A remembered chord. The first note is the root; every other note is played
/// at the same distance from the incoming note as it was from the root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChordMemory {
    notes: [u7; MAX_CHORD_NOTES],
    len: usize,
}

impl ChordMemory {
    /// Creates a chord memory from the given notes. Anything past
    /// `MAX_CHORD_NOTES` is ignored.
    pub fn new(notes: &[u7]) -> ChordMemory {
        let len = notes.len().min(MAX_CHORD_NOTES);
        let mut memory = ChordMemory {
            notes: [u7::from(0); MAX_CHORD_NOTES],
            len,
        };
        memory.notes[..len].copy_from_slice(&notes[..len]);
        memory
    }

    /// The remembered notes, root first.
    pub fn notes(&self) -> &[u7] {
        &self.notes[..self.len]
    }

    /// The extra notes to play alongside `key`. The root itself is not
    /// repeated, and notes that land outside 0..=127 are dropped.
    pub fn tones(&self, key: u7) -> impl Iterator<Item = u7> + '_ {
        let root = self.notes().first().map_or(0, |root| i16::from(root.as_int()));
        let key = i16::from(key.as_int());

        self.notes().iter().skip(1).filter_map(move |note| {
            let tone = i16::from(note.as_int()) - root + key;
            u8::try_from(tone).ok().and_then(u7::try_from)
        })
    }
}

impl Default for ChordMemory {
    fn default() -> Self {
        ChordMemory::new(&[])
    }
}
