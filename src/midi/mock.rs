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
use std::{error::Error, fmt, sync::Arc};

use midly::live::LiveEvent;
use parking_lot::Mutex;
use tokio::sync::mpsc::Sender;
use tracing::info;

/// A mock device. Records everything emitted to it and lets tests inject input.
#[derive(Clone)]
pub struct Device {
    name: String,
    sender: Arc<Mutex<Option<Sender<Vec<u8>>>>>,
    emitted: Arc<Mutex<Vec<LiveEvent<'static>>>>,
}

impl Device {
    /// Gets the given mock device.
    pub fn get(name: &str) -> Device {
        Device {
            name: name.to_string(),
            sender: Arc::new(Mutex::new(None)),
            emitted: Arc::new(Mutex::new(Vec::new())),
        }
    }

    #[cfg(test)]
    /// Returns true if something is watching this device's input.
    pub fn is_watching(&self) -> bool {
        self.sender.lock().is_some()
    }

    #[cfg(test)]
    /// Sends the mock event through to the watcher.
    pub fn mock_event(&self, event: &[u8]) -> Result<(), Box<dyn Error>> {
        match self.sender.lock().as_ref() {
            Some(sender) => Ok(sender.try_send(event.to_vec())?),
            None => Err("Nothing is watching events.".into()),
        }
    }

    #[cfg(test)]
    /// Gets every event emitted so far.
    pub fn emitted(&self) -> Vec<LiveEvent<'static>> {
        self.emitted.lock().clone()
    }
}

impl super::Device for Device {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn watch_events(&self, sender: Sender<Vec<u8>>) -> Result<(), Box<dyn Error>> {
        let mut current = self.sender.lock();
        if current.is_some() {
            return Err("Already watching events.".into());
        }

        info!(device = self.name, "Watching MIDI events (mock).");
        *current = Some(sender);
        Ok(())
    }

    fn stop_watch_events(&self) {
        self.sender.lock().take();
    }

    fn connect_output(&self) -> Result<Box<dyn super::Output>, Box<dyn Error>> {
        Ok(Box::new(Output {
            emitted: self.emitted.clone(),
        }))
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name,)
    }
}

/// Output half of the mock device.
struct Output {
    emitted: Arc<Mutex<Vec<LiveEvent<'static>>>>,
}

impl super::Output for Output {
    fn emit(&mut self, event: LiveEvent<'static>) {
        self.emitted.lock().push(event);
    }
}
