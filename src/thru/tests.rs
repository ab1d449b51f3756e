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
use midly::{live::LiveEvent, num::u7, MidiMessage};

use super::{ChannelFilter, ChordMemory, Options, Thru};
use crate::midi;

fn note_on(channel: u8, key: u8, vel: u8) -> LiveEvent<'static> {
    midi::event(
        channel,
        MidiMessage::NoteOn {
            key: u7::from(key),
            vel: u7::from(vel),
        },
    )
}

fn note_off(channel: u8, key: u8, vel: u8) -> LiveEvent<'static> {
    midi::event(
        channel,
        MidiMessage::NoteOff {
            key: u7::from(key),
            vel: u7::from(vel),
        },
    )
}

fn pressure(channel: u8, key: u8, value: u8) -> LiveEvent<'static> {
    midi::event(
        channel,
        MidiMessage::Aftertouch {
            key: u7::from(key),
            vel: u7::from(value),
        },
    )
}

fn chord(notes: &[u8]) -> ChordMemory {
    ChordMemory::new(u7::slice_from_int(notes))
}

/// Runs a single event through the engine and returns what came out.
fn run(
    thru: &mut Thru,
    options: &Options,
    event: LiveEvent<'static>,
) -> Vec<LiveEvent<'static>> {
    let mut output: Vec<LiveEvent<'static>> = Vec::new();
    thru.process(options, &event, &mut output);
    output
}

#[test]
fn plain_pass_through() {
    let options = Options::new(ChannelFilter::Channel(1), 3);
    let mut thru = Thru::new();

    assert_eq!(vec![note_on(3, 60, 100)], run(&mut thru, &options, note_on(1, 60, 100)));
    assert_eq!(vec![note_off(3, 60, 64)], run(&mut thru, &options, note_off(1, 60, 64)));
    assert_eq!(vec![pressure(3, 60, 20)], run(&mut thru, &options, pressure(1, 60, 20)));
}

#[test]
fn input_filter() {
    let mut thru = Thru::new();

    let filtered = Options::new(ChannelFilter::Channel(2), 1);
    assert!(run(&mut thru, &filtered, note_on(1, 60, 100)).is_empty());
    assert_eq!(1, run(&mut thru, &filtered, note_on(2, 60, 100)).len());

    let omni = Options::new(ChannelFilter::Omni, 1);
    for channel in 1..=16 {
        assert_eq!(
            vec![note_on(1, 60, 100)],
            run(&mut thru, &omni, note_on(channel, 60, 100))
        );
    }
}

#[test]
fn disabled_output_drops_everything() {
    let options = Options::new(ChannelFilter::Omni, 0).with_distribution(3);
    let mut thru = Thru::new();

    assert!(run(&mut thru, &options, note_on(1, 60, 100)).is_empty());
    assert_eq!(0, thru.distribution().cursor());
}

#[test]
fn bypass_drops_everything() {
    let options = Options::new(ChannelFilter::Omni, 1).with_distribution(2);
    let mut thru = Thru::new();
    thru.set_bypass(true);

    assert!(thru.is_bypassed());
    assert!(run(&mut thru, &options, note_on(1, 60, 100)).is_empty());
    assert_eq!(None, thru.distribution().note(0));

    thru.set_bypass(false);
    assert_eq!(1, run(&mut thru, &options, note_on(1, 60, 100)).len());
}

#[test]
fn other_messages_are_ignored() {
    let options = Options::new(ChannelFilter::Omni, 1);
    let mut thru = Thru::new();

    let controller = midi::event(
        1,
        MidiMessage::Controller {
            controller: u7::from(7),
            value: u7::from(100),
        },
    );
    assert!(run(&mut thru, &options, controller).is_empty());
    assert!(run(&mut thru, &options, LiveEvent::Realtime(midly::live::SystemRealtime::TimingClock)).is_empty());
}

#[test]
fn zero_velocity_note_on_is_a_note_off() {
    let options = Options::new(ChannelFilter::Omni, 1).with_distribution(1);
    let mut thru = Thru::new();

    run(&mut thru, &options, note_on(1, 60, 100));
    assert_eq!(vec![note_off(1, 60, 0)], run(&mut thru, &options, note_on(1, 60, 0)));
    assert_eq!(None, thru.distribution().note(0));
}

#[test]
fn distribution_scenario() {
    let options = Options::new(ChannelFilter::Channel(1), 5).with_distribution(2);
    let mut thru = Thru::new();

    assert_eq!(vec![note_on(5, 64, 100)], run(&mut thru, &options, note_on(1, 64, 100)));
    assert_eq!(1, thru.distribution().cursor());

    assert_eq!(vec![note_on(6, 70, 100)], run(&mut thru, &options, note_on(1, 70, 100)));
    assert_eq!(2, thru.distribution().cursor());

    assert_eq!(vec![note_on(7, 72, 100)], run(&mut thru, &options, note_on(1, 72, 100)));
    assert_eq!(0, thru.distribution().cursor());

    // The fourth note reuses slot 0 and silences the note still held there.
    assert_eq!(
        vec![note_off(5, 64, 127), note_on(5, 74, 100)],
        run(&mut thru, &options, note_on(1, 74, 100))
    );
}

#[test]
fn cursor_wraps_past_count_not_at_it() {
    let options = Options::new(ChannelFilter::Omni, 1).with_distribution(3);
    let mut thru = Thru::new();

    let mut cursors = Vec::new();
    for key in 0..10 {
        cursors.push(thru.distribution().cursor());
        run(&mut thru, &options, note_on(1, key, 100));
    }
    assert_eq!(vec![0, 1, 2, 3, 0, 1, 2, 3, 0, 1], cursors);
}

#[test]
fn channels_wrap_around_sixteen() {
    let options = Options::new(ChannelFilter::Omni, 15).with_distribution(3);
    let mut thru = Thru::new();

    let mut channels = Vec::new();
    for key in 0..4 {
        let output = run(&mut thru, &options, note_on(1, key, 100));
        assert_eq!(1, output.len());
        match output[0] {
            LiveEvent::Midi { channel, .. } => channels.push(channel.as_int() + 1),
            other => panic!("unexpected output {:?}", other),
        }
    }
    assert_eq!(vec![15, 16, 1, 2], channels);
}

#[test]
fn reused_slots_are_silenced_on_their_own_channel() {
    let options = Options::new(ChannelFilter::Omni, 9).with_distribution(4);
    let mut thru = Thru::new();

    // Which note each slot should still be holding.
    let mut held: [Option<u8>; 16] = [None; 16];
    let keys = (0..40u16).map(|i| ((i * 7 + 3) % 128) as u8);

    for key in keys {
        let slot = thru.distribution().cursor();
        let channel = (9 + slot - 1) % 16 + 1;
        let output = run(&mut thru, &options, note_on(1, key, 90));

        let mut expected = Vec::new();
        if let Some(stale) = held[slot as usize] {
            expected.push(note_off(channel, stale, 127));
        }
        expected.push(note_on(channel, key, 90));
        assert_eq!(expected, output, "slot {} key {}", slot, key);

        held[slot as usize] = Some(key);
    }
}

#[test]
fn note_off_clears_every_copy() {
    let options = Options::new(ChannelFilter::Omni, 1).with_distribution(3);
    let mut thru = Thru::new();

    run(&mut thru, &options, note_on(1, 60, 100));
    run(&mut thru, &options, note_on(1, 62, 100));
    run(&mut thru, &options, note_on(1, 60, 100));

    assert_eq!(
        vec![note_off(1, 60, 40), note_off(3, 60, 40)],
        run(&mut thru, &options, note_off(1, 60, 40))
    );
    assert_eq!(None, thru.distribution().note(0));
    assert_eq!(Some(u7::from(62)), thru.distribution().note(1));
    assert_eq!(None, thru.distribution().note(2));

    // A second note-off finds nothing left to release.
    assert!(run(&mut thru, &options, note_off(1, 60, 40)).is_empty());
}

#[test]
fn pressure_follows_without_releasing() {
    let options = Options::new(ChannelFilter::Omni, 4).with_distribution(1);
    let mut thru = Thru::new();

    run(&mut thru, &options, note_on(1, 50, 100));
    run(&mut thru, &options, note_on(1, 52, 100));

    assert_eq!(vec![pressure(5, 52, 33)], run(&mut thru, &options, pressure(1, 52, 33)));
    assert_eq!(Some(u7::from(52)), thru.distribution().note(1));
    assert!(run(&mut thru, &options, pressure(1, 90, 33)).is_empty());
}

#[test]
fn replication() {
    let options = Options::new(ChannelFilter::Omni, 1)
        .with_extra_notes(2)
        .with_chord(chord(&[60, 67]));
    let mut thru = Thru::new();

    assert_eq!(
        vec![
            note_on(1, 50, 100),
            note_on(1, 50, 100),
            note_on(1, 50, 100),
            note_on(1, 57, 100),
            note_on(1, 57, 100),
            note_on(1, 57, 100),
        ],
        run(&mut thru, &options, note_on(1, 50, 100))
    );
    assert_eq!(6, run(&mut thru, &options, note_off(1, 50, 0)).len());
    assert_eq!(6, run(&mut thru, &options, pressure(1, 50, 10)).len());
}

#[test]
fn replication_of_stale_note_offs() {
    let options = Options::new(ChannelFilter::Omni, 1)
        .with_distribution(1)
        .with_extra_notes(2);
    let mut thru = Thru::new();

    run(&mut thru, &options, note_on(1, 60, 100));
    run(&mut thru, &options, note_on(1, 61, 100));
    let output = run(&mut thru, &options, note_on(1, 62, 100));

    assert_eq!(
        vec![
            note_off(1, 60, 127),
            note_off(1, 60, 127),
            note_off(1, 60, 127),
            note_on(1, 62, 100),
            note_on(1, 62, 100),
            note_on(1, 62, 100),
        ],
        output
    );
}

#[test]
fn chord_tones_out_of_range_are_dropped() {
    // Root 0 and tone 90 put the derived note for 50 at 140.
    let options = Options::new(ChannelFilter::Omni, 1).with_chord(chord(&[0, 90]));
    let mut thru = Thru::new();
    assert_eq!(vec![note_on(1, 50, 100)], run(&mut thru, &options, note_on(1, 50, 100)));
    assert_eq!(vec![note_off(1, 50, 0)], run(&mut thru, &options, note_off(1, 50, 0)));
    assert_eq!(vec![pressure(1, 50, 9)], run(&mut thru, &options, pressure(1, 50, 9)));
}

#[test]
fn distributed_chords_follow_their_slot() {
    let options = Options::new(ChannelFilter::Omni, 2)
        .with_distribution(1)
        .with_chord(chord(&[48, 52, 55]));
    let mut thru = Thru::new();

    run(&mut thru, &options, note_on(1, 60, 100));
    assert_eq!(
        vec![note_on(3, 62, 100), note_on(3, 66, 100), note_on(3, 69, 100)],
        run(&mut thru, &options, note_on(1, 62, 100))
    );
    assert_eq!(
        vec![note_off(3, 62, 0), note_off(3, 66, 0), note_off(3, 69, 0)],
        run(&mut thru, &options, note_off(1, 62, 0))
    );

    // A note that is no longer held still releases its chord on the base channel.
    assert_eq!(
        vec![note_off(2, 66, 0), note_off(2, 69, 0)],
        run(&mut thru, &options, note_off(1, 62, 0))
    );
}

#[test]
fn chords_follow_every_slot_holding_the_note() {
    let options = Options::new(ChannelFilter::Omni, 2)
        .with_distribution(2)
        .with_chord(chord(&[48, 52]));
    let mut thru = Thru::new();

    run(&mut thru, &options, note_on(1, 60, 100));
    run(&mut thru, &options, note_on(1, 62, 100));
    run(&mut thru, &options, note_on(1, 60, 100));

    assert_eq!(
        vec![
            pressure(2, 60, 20),
            pressure(2, 64, 20),
            pressure(4, 60, 20),
            pressure(4, 64, 20),
        ],
        run(&mut thru, &options, pressure(1, 60, 20))
    );
    assert_eq!(Some(u7::from(60)), thru.distribution().note(0));
    assert_eq!(Some(u7::from(60)), thru.distribution().note(2));

    assert_eq!(
        vec![
            note_off(2, 60, 0),
            note_off(2, 64, 0),
            note_off(4, 60, 0),
            note_off(4, 64, 0),
        ],
        run(&mut thru, &options, note_off(1, 60, 0))
    );
    assert_eq!(None, thru.distribution().note(0));
    assert_eq!(Some(u7::from(62)), thru.distribution().note(1));
    assert_eq!(None, thru.distribution().note(2));
}

#[test]
fn notes_held_before_shrinking_distribution_are_released() {
    let wide = Options::new(ChannelFilter::Omni, 1).with_distribution(3);
    let narrow = Options::new(ChannelFilter::Omni, 1).with_distribution(1);
    let mut thru = Thru::new();

    for key in 60..64 {
        run(&mut thru, &wide, note_on(1, key, 100));
    }
    assert_eq!(Some(u7::from(63)), thru.distribution().note(3));

    assert_eq!(
        vec![note_off(4, 63, 0)],
        run(&mut thru, &narrow, note_off(1, 63, 0))
    );
    assert_eq!(None, thru.distribution().note(3));
}

#[test]
fn all_notes_off_resets() {
    let options = Options::new(ChannelFilter::Omni, 1).with_distribution(3);
    let mut thru = Thru::new();
    run(&mut thru, &options, note_on(1, 60, 100));
    run(&mut thru, &options, note_on(1, 61, 100));

    let mut output: Vec<LiveEvent<'static>> = Vec::new();
    thru.all_notes_off(&mut output);

    assert_eq!(16, output.len());
    for (i, event) in output.iter().enumerate() {
        assert_eq!(
            &midi::event(
                i as u8 + 1,
                MidiMessage::Controller {
                    controller: u7::from(123),
                    value: u7::from(0),
                }
            ),
            event
        );
    }
    assert_eq!(0, thru.distribution().cursor());
    assert_eq!(None, thru.distribution().note(0));
}
