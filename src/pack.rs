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
//! High-bit packing for 7-bit note buffers.
//!
//! Cells of a note buffer only use their low 7 bits. The high bit of eight
//! consecutive cells can therefore carry one extra byte, most significant bit
//! first, without disturbing the note data underneath. Fields narrower than a
//! byte are left-justified before distribution and shifted back down after
//! gathering.
//!
//! None of these functions check offsets. Positions past the end of the
//! buffer panic through slice indexing; overlapping fields silently clobber
//! each other.

/// The note-owned bits of a cell.
const NOTE_MASK: u8 = 0x7F;

/// The bit borrowed by the codec.
const HIGH_BIT: u8 = 0x80;

/// Number of cells a single distributed byte spans.
pub const CELLS_PER_BYTE: usize = 8;

/// Starting at `position`, spreads the bits of `byte` over the high bits of the
/// next eight cells, most significant bit first. The low 7 bits of each cell are
/// left alone.
pub fn distribute(buffer: &mut [u8], position: usize, byte: u8) {
    let mut byte = byte;
    for cell in &mut buffer[position..position + CELLS_PER_BYTE] {
        *cell = (*cell & NOTE_MASK) | (byte & HIGH_BIT);
        byte <<= 1;
    }
}

/// Collects the high bits of the eight cells starting at `position` into a byte,
/// the first cell landing in the most significant bit.
pub fn gather(buffer: &[u8], position: usize) -> u8 {
    buffer[position..position + CELLS_PER_BYTE]
        .iter()
        .fold(0, |byte, cell| (byte << 1) | (cell >> 7))
}

/// Clears every borrowed high bit, leaving plain 7-bit note data.
pub fn strip_high_bits(buffer: &mut [u8]) {
    buffer.iter_mut().for_each(|cell| *cell &= NOTE_MASK);
}

/// A packed field: `width` bits stored in the high bits of the cells starting
/// at `offset`.
///
/// Packing writes all eight cells of the window, so the trailing padding of a
/// narrow field lands on whatever follows it. Fields sharing a window must be
/// packed in ascending offset order so that later fields overwrite the padding
/// of earlier ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    offset: usize,
    width: u8,
}

impl Field {
    /// Creates a new field. Widths outside 1..=8 are rejected at compile time
    /// when used in a const context and panic otherwise.
    pub const fn new(offset: usize, width: u8) -> Field {
        assert!(width >= 1 && width <= 8, "field width must be 1..=8 bits");
        Field { offset, width }
    }

    /// The cell offset of the field's first bit.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The number of bits in the field.
    pub fn width(&self) -> u8 {
        self.width
    }

    /// The largest value the field can hold.
    pub fn max_value(&self) -> u8 {
        (0xFFu16 >> (8 - self.width)) as u8
    }

    /// Returns the same field relocated to start `base` cells further in.
    pub fn at(&self, base: usize) -> Field {
        Field {
            offset: base + self.offset,
            width: self.width,
        }
    }

    /// Packs the low `width` bits of `value` into the buffer.
    pub fn pack(&self, buffer: &mut [u8], value: u8) {
        distribute(buffer, self.offset, value << (8 - self.width));
    }

    /// Unpacks the field from the buffer.
    pub fn unpack(&self, buffer: &[u8]) -> u8 {
        gather(buffer, self.offset) >> (8 - self.width)
    }
}
