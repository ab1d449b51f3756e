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
//! Thru: live redistribution of an incoming note stream.
//!
//! Notes arriving on the input channel are passed through to the output, fanned
//! out round-robin over a block of consecutive channels, replicated, and
//! expanded into remembered chords. Note-offs and polyphonic aftertouch follow
//! each note to whichever channel it was sent on.

use midly::{
    live::LiveEvent,
    num::{u4, u7},
    MidiMessage,
};
use tracing::debug;

use crate::midi::{self, Output, NUM_MIDI_CHANNELS};

mod chord;
mod distribution;
pub mod session;

pub use chord::{ChordMemory, MAX_CHORD_NOTES};
pub use distribution::{Assignment, Distribution};

/// The most times a single message may be repeated beyond the first.
pub const MAX_EXTRA_NOTES: u8 = 15;

/// Which input channels thru listens to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChannelFilter {
    /// Every channel.
    #[default]
    Omni,
    /// A single channel, 1-based.
    Channel(u8),
}

impl ChannelFilter {
    /// Returns true if events on the given wire channel pass the filter.
    pub fn accepts(&self, channel: u4) -> bool {
        match self {
            ChannelFilter::Omni => true,
            ChannelFilter::Channel(filter) => *filter == channel.as_int() + 1,
        }
    }
}

/// Thru options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Options {
    input: ChannelFilter,
    output_channel: u8,
    distribution_channels: u8,
    extra_notes: u8,
    chord: ChordMemory,
}

impl Options {
    /// Creates new options passing `input` through to `output_channel` (1-based,
    /// 0 disables thru). Out of range channels are clamped.
    pub fn new(input: ChannelFilter, output_channel: u8) -> Options {
        Options {
            input,
            output_channel: output_channel.min(NUM_MIDI_CHANNELS),
            ..Options::default()
        }
    }

    /// Distributes notes over the output channel and the `channels` channels
    /// after it. 0 disables distribution.
    pub fn with_distribution(mut self, channels: u8) -> Options {
        self.distribution_channels = channels.min(NUM_MIDI_CHANNELS);
        self
    }

    /// Sends every message `extra_notes` additional times.
    pub fn with_extra_notes(mut self, extra_notes: u8) -> Options {
        self.extra_notes = extra_notes.min(MAX_EXTRA_NOTES);
        self
    }

    /// Expands every note into the given chord.
    pub fn with_chord(mut self, chord: ChordMemory) -> Options {
        self.chord = chord;
        self
    }

    pub fn input(&self) -> ChannelFilter {
        self.input
    }

    pub fn output_channel(&self) -> u8 {
        self.output_channel
    }

    pub fn distribution_channels(&self) -> u8 {
        self.distribution_channels
    }

    pub fn extra_notes(&self) -> u8 {
        self.extra_notes
    }

    pub fn chord(&self) -> &ChordMemory {
        &self.chord
    }

    fn distributing(&self) -> bool {
        self.distribution_channels > 0
    }

    /// The 1-based channel for a distribution slot, wrapping around the top of
    /// the channel space.
    fn slot_channel(&self, slot: u8) -> u8 {
        (self.output_channel + slot - 1) % NUM_MIDI_CHANNELS + 1
    }
}

/// A message that follows a sounding note to its channel.
#[derive(Clone, Copy)]
enum Follow {
    NoteOff,
    Pressure,
}

impl Follow {
    fn message(self, key: u7, value: u7) -> MidiMessage {
        match self {
            Follow::NoteOff => MidiMessage::NoteOff { key, vel: value },
            Follow::Pressure => MidiMessage::Aftertouch { key, vel: value },
        }
    }

    /// Note-offs free the slot. Pressure only updates a note that keeps sounding.
    fn releases(self) -> bool {
        matches!(self, Follow::NoteOff)
    }
}

/// The thru engine. Owns the distribution slot table; everything else comes in
/// through `Options` on each call.
#[derive(Clone, Debug, Default)]
pub struct Thru {
    distribution: Distribution,
    bypass: bool,
}

impl Thru {
    /// Creates a new engine with an empty slot table.
    pub fn new() -> Thru {
        Thru {
            distribution: Distribution::new(),
            bypass: false,
        }
    }

    /// When bypassed, every event is dropped.
    pub fn set_bypass(&mut self, bypass: bool) {
        self.bypass = bypass;
    }

    pub fn is_bypassed(&self) -> bool {
        self.bypass
    }

    pub fn distribution(&self) -> &Distribution {
        &self.distribution
    }

    /// Forgets every sounding note.
    pub fn reset(&mut self) {
        self.distribution.reset();
    }

    /// Silences every channel and forgets every sounding note.
    pub fn all_notes_off(&mut self, output: &mut dyn Output) {
        midi::all_notes_off(output);
        self.reset();
    }

    /// Processes one inbound event. Anything that is not a note-on, note-off or
    /// polyphonic aftertouch on an accepted channel is dropped.
    ///
    /// Options may change between calls. Note-offs and aftertouch search every
    /// slot, so notes held before the distribution count was lowered are still
    /// found, and are followed on the channel their slot maps to under the
    /// current options.
    pub fn process(&mut self, options: &Options, event: &LiveEvent, output: &mut dyn Output) {
        let (channel, message) = match event {
            LiveEvent::Midi { channel, message } => (*channel, *message),
            _ => return,
        };

        if self.bypass || !options.input.accepts(channel) || options.output_channel == 0 {
            return;
        }

        match message {
            MidiMessage::NoteOn { key, vel } if vel.as_int() == 0 => {
                self.follow(options, Follow::NoteOff, key, vel, output)
            }
            MidiMessage::NoteOn { key, vel } => self.note_on(options, key, vel, output),
            MidiMessage::NoteOff { key, vel } => {
                self.follow(options, Follow::NoteOff, key, vel, output)
            }
            MidiMessage::Aftertouch { key, vel } => {
                self.follow(options, Follow::Pressure, key, vel, output)
            }
            _ => {}
        }
    }

    fn note_on(&mut self, options: &Options, key: u7, vel: u7, output: &mut dyn Output) {
        let mut channel = options.output_channel;

        if options.distributing() {
            let assignment = self
                .distribution
                .assign(key, options.distribution_channels);
            channel = options.slot_channel(assignment.slot);

            if let Some(stale) = assignment.stale {
                debug!(
                    slot = assignment.slot,
                    channel,
                    note = stale.as_int(),
                    "Reusing distribution slot."
                );
                replicate(
                    options,
                    channel,
                    MidiMessage::NoteOff {
                        key: stale,
                        vel: u7::from(127),
                    },
                    output,
                );
            }
        }

        replicate(options, channel, MidiMessage::NoteOn { key, vel }, output);
        for tone in options.chord.tones(key) {
            replicate(
                options,
                channel,
                MidiMessage::NoteOn { key: tone, vel },
                output,
            );
        }
    }

    fn follow(
        &mut self,
        options: &Options,
        follow: Follow,
        key: u7,
        value: u7,
        output: &mut dyn Output,
    ) {
        if !options.distributing() {
            follow_on(options, options.output_channel, follow, key, value, output);
            return;
        }

        let mut matched = false;
        // The whole table, so notes held under a larger distribution count are
        // still found.
        for slot in distribution::slots() {
            if self.distribution.note(slot) != Some(key) {
                continue;
            }

            follow_on(options, options.slot_channel(slot), follow, key, value, output);
            if follow.releases() {
                self.distribution.clear(slot);
            }
            matched = true;
        }

        // A note that was never distributed may still have chord tones sounding
        // on the base channel.
        if !matched {
            for tone in options.chord.tones(key) {
                replicate(
                    options,
                    options.output_channel,
                    follow.message(tone, value),
                    output,
                );
            }
        }
    }
}

/// Sends the follow message for `key` and its chord tones on one channel.
fn follow_on(
    options: &Options,
    channel: u8,
    follow: Follow,
    key: u7,
    value: u7,
    output: &mut dyn Output,
) {
    replicate(options, channel, follow.message(key, value), output);
    for tone in options.chord.tones(key) {
        replicate(options, channel, follow.message(tone, value), output);
    }
}

/// Emits the message once plus once per extra note.
fn replicate(options: &Options, channel: u8, message: MidiMessage, output: &mut dyn Output) {
    let event = midi::event(channel, message);
    for _ in 0..=options.extra_notes {
        output.emit(event);
    }
}

#[cfg(test)]
mod tests;
