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
//! The Thru play session: everything between entering and leaving thru play.

use std::{error::Error, sync::Arc};

use midly::live::LiveEvent;
use tokio::sync::mpsc;
use tracing::{error, info, span, warn, Level};

use super::{Options, Thru};
use crate::midi::{Device, Output};

/// How many raw events may queue up between the input watcher and the engine.
const EVENT_QUEUE_SIZE: usize = 64;

/// A running thru session.
pub struct Session {
    thru: Thru,
    options: Options,
}

impl Session {
    /// Enters thru play: silences every channel and starts from an empty slot
    /// table.
    pub fn start(options: Options, output: &mut dyn Output) -> Session {
        let mut thru = Thru::new();
        thru.all_notes_off(output);

        info!(
            output_channel = options.output_channel(),
            distribution_channels = options.distribution_channels(),
            extra_notes = options.extra_notes(),
            chord_notes = options.chord().notes().len(),
            "Thru started."
        );
        Session { thru, options }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn thru(&self) -> &Thru {
        &self.thru
    }

    pub fn set_bypass(&mut self, bypass: bool) {
        self.thru.set_bypass(bypass);
    }

    /// Processes one parsed event.
    pub fn handle(&mut self, event: &LiveEvent, output: &mut dyn Output) {
        self.thru.process(&self.options, event, output);
    }

    /// Parses and processes one raw event. Unparseable input is logged and
    /// skipped.
    pub fn handle_raw(&mut self, raw_event: &[u8], output: &mut dyn Output) {
        match LiveEvent::parse(raw_event) {
            Ok(event) => self.handle(&event, output),
            Err(e) => warn!(err = format!("{:?}", e), "Error parsing event."),
        }
    }

    /// Leaves thru play, silencing every channel.
    pub fn stop(mut self, output: &mut dyn Output) {
        self.thru.all_notes_off(output);
        info!("Thru stopped.");
    }
}

/// Runs thru from `input` to `output` until the input stops producing events or
/// the process is interrupted. With `bypass` set, the session runs bypassed.
/// Fails if the output cannot be opened.
pub async fn run(
    options: Options,
    bypass: bool,
    input: Arc<dyn Device>,
    output: Arc<dyn Device>,
) -> Result<(), Box<dyn Error>> {
    let (events_tx, mut events_rx) = mpsc::channel::<Vec<u8>>(EVENT_QUEUE_SIZE);

    let mut engine = tokio::task::spawn_blocking(move || -> Result<(), String> {
        let span = span!(Level::INFO, "thru");
        let _enter = span.enter();

        let mut connection = match output.connect_output() {
            Ok(connection) => connection,
            Err(e) => {
                error!(
                    err = e.as_ref(),
                    device = output.name(),
                    "Unable to open MIDI output."
                );
                return Err(format!(
                    "unable to open MIDI output {}: {}",
                    output.name(),
                    e
                ));
            }
        };

        let mut session = Session::start(options, connection.as_mut());
        session.set_bypass(bypass);
        while let Some(raw_event) = events_rx.blocking_recv() {
            session.handle_raw(&raw_event, connection.as_mut());
        }
        session.stop(connection.as_mut());
        Ok(())
    });

    input.watch_events(events_tx)?;

    let result = tokio::select! {
        result = &mut engine => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, stopping thru.");
            input.stop_watch_events();
            engine.await
        }
    };

    input.stop_watch_events();
    result??;
    Ok(())
}
