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

use super::{midi::Midi, thru::Thru};

/// The configuration for gizmo.
#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
    /// The MIDI devices to use.
    midi: Midi,
    /// The thru configuration.
    #[serde(default)]
    thru: Thru,
}

impl Settings {
    pub fn midi(&self) -> &Midi {
        &self.midi
    }

    pub fn thru(&self) -> &Thru {
        &self.thru
    }
}
