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
//! Slot images and the directory they are stored in.
//!
//! A slot image is three header bytes (slot type, format, layout) followed by
//! the payload. Slots are numbered from 0 and stored one file per slot.

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, info};

/// The number of slots in a store.
pub const NUM_SLOTS: usize = 16;

const HEADER_SIZE: usize = 3;

/// Errors reading or writing slots.
#[derive(Debug, thiserror::Error)]
pub enum SlotError {
    #[error("Slot I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Slot {0} is out of range (0..{NUM_SLOTS})")]
    OutOfRange(usize),
    #[error("Slot image is truncated ({0} bytes)")]
    Truncated(usize),
    #[error("Unknown slot type {0}")]
    UnknownType(u8),
    #[error("Unknown sequence format {0}")]
    Format(u8),
    #[error("Unknown sequence layout {0}")]
    Layout(u8),
    #[error("Slot payload is {actual} bytes, expected {expected}")]
    Size { expected: usize, actual: usize },
}

/// What a slot holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SlotType {
    #[default]
    Empty,
    StepSequencer,
    Recorder,
    DrumSequencer,
}

impl SlotType {
    pub fn to_byte(self) -> u8 {
        match self {
            SlotType::Empty => 0,
            SlotType::StepSequencer => 1,
            SlotType::Recorder => 2,
            SlotType::DrumSequencer => 3,
        }
    }

    pub fn from_byte(byte: u8) -> Result<SlotType, SlotError> {
        match byte {
            0 => Ok(SlotType::Empty),
            1 => Ok(SlotType::StepSequencer),
            2 => Ok(SlotType::Recorder),
            3 => Ok(SlotType::DrumSequencer),
            _ => Err(SlotError::UnknownType(byte)),
        }
    }
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SlotType::Empty => "empty",
            SlotType::StepSequencer => "step sequencer",
            SlotType::Recorder => "recorder",
            SlotType::DrumSequencer => "drum sequencer",
        })
    }
}

/// A slot image.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Slot {
    kind: SlotType,
    format: u8,
    layout: u8,
    payload: Vec<u8>,
}

impl Slot {
    pub fn new(kind: SlotType, format: u8, layout: u8, payload: &[u8]) -> Slot {
        Slot {
            kind,
            format,
            layout,
            payload: payload.to_vec(),
        }
    }

    /// A slot holding nothing.
    pub fn empty() -> Slot {
        Slot::default()
    }

    pub fn kind(&self) -> SlotType {
        self.kind
    }

    pub fn format(&self) -> u8 {
        self.format
    }

    pub fn layout(&self) -> u8 {
        self.layout
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// The stored form of the slot.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE + self.payload.len());
        bytes.push(self.kind.to_byte());
        bytes.push(self.format);
        bytes.push(self.layout);
        bytes.extend_from_slice(&self.payload);
        bytes
    }

    /// Parses a stored slot.
    pub fn from_bytes(bytes: &[u8]) -> Result<Slot, SlotError> {
        if bytes.len() < HEADER_SIZE {
            return Err(SlotError::Truncated(bytes.len()));
        }
        Ok(Slot {
            kind: SlotType::from_byte(bytes[0])?,
            format: bytes[1],
            layout: bytes[2],
            payload: bytes[HEADER_SIZE..].to_vec(),
        })
    }
}

/// A directory of slot files.
#[derive(Debug)]
pub struct SlotStore {
    path: PathBuf,
}

impl SlotStore {
    /// Opens a slot store, creating the directory if needed.
    pub fn open(path: &Path) -> Result<SlotStore, SlotError> {
        fs::create_dir_all(path)?;
        info!(path = %path.display(), "Opened slot store.");
        Ok(SlotStore {
            path: path.to_path_buf(),
        })
    }

    fn file(&self, index: usize) -> Result<PathBuf, SlotError> {
        if index >= NUM_SLOTS {
            return Err(SlotError::OutOfRange(index));
        }
        Ok(self.path.join(format!("slot-{:02}.bin", index)))
    }

    /// Writes a slot, replacing whatever it held.
    pub fn save(&self, index: usize, slot: &Slot) -> Result<(), SlotError> {
        let file = self.file(index)?;
        fs::write(&file, slot.to_bytes())?;
        debug!(slot = index, kind = %slot.kind(), "Saved slot.");
        Ok(())
    }

    /// Reads a slot. Slots that were never written are empty.
    pub fn load(&self, index: usize) -> Result<Slot, SlotError> {
        let file = self.file(index)?;
        match fs::read(&file) {
            Ok(bytes) => Slot::from_bytes(&bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Slot::empty()),
            Err(e) => Err(e.into()),
        }
    }

    /// Every slot in order.
    pub fn list(&self) -> Result<Vec<Slot>, SlotError> {
        (0..NUM_SLOTS).map(|index| self.load(index)).collect()
    }
}
