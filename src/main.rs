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
use std::error::Error;
use std::path::PathBuf;

use clap::{crate_version, Parser, Subcommand};
use gizmo::config;
use gizmo::midi;
use gizmo::sequencer::StepSequence;
use gizmo::slot::{SlotStore, SlotType};
use gizmo::thru;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "MIDI thru with channel distribution, and step sequence slots."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lists the available MIDI input/output devices.
    MidiDevices {},
    /// Runs MIDI thru until interrupted.
    Thru {
        /// The path to the settings file.
        settings_path: String,
    },
    /// Manages stored slots.
    Slot {
        #[clap(subcommand)]
        command: SlotCommands,
    },
}

#[derive(Subcommand)]
enum SlotCommands {
    /// Lists what every slot holds.
    List {
        /// The slot directory.
        slots_path: String,
    },
    /// Packs a step sequence described in YAML into a slot.
    Pack {
        /// The path to the step sequence.
        sequence_path: String,
        /// The slot directory.
        slots_path: String,
        /// The slot to write.
        index: usize,
    },
    /// Prints the step sequence stored in a slot as YAML.
    Inspect {
        /// The slot directory.
        slots_path: String,
        /// The slot to read.
        index: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::MidiDevices {} => {
            let devices = midi::list_devices()?;

            if devices.is_empty() {
                println!("No devices found.");
                return Ok(());
            }

            println!("Devices:");
            for device in devices {
                println!("- {}", device);
            }
        }
        Commands::Thru { settings_path } => {
            let settings = config::load_settings(&PathBuf::from(settings_path))?;
            let options = settings.thru().options()?;
            let input = midi::get_device(settings.midi().input_device())?;
            let output = midi::get_device(settings.midi().output_device())?;

            thru::session::run(options, settings.thru().bypass(), input, output).await?;
        }
        Commands::Slot { command } => match command {
            SlotCommands::List { slots_path } => {
                let store = SlotStore::open(&PathBuf::from(slots_path))?;

                println!("Slots:");
                for (index, slot) in store.list()?.iter().enumerate() {
                    println!("- {:02}: {}", index, slot.kind());
                }
            }
            SlotCommands::Pack {
                sequence_path,
                slots_path,
                index,
            } => {
                let mut sequence = config::load_sequence(&PathBuf::from(sequence_path))?;
                let store = SlotStore::open(&PathBuf::from(slots_path))?;
                store.save(index, &sequence.save())?;
            }
            SlotCommands::Inspect { slots_path, index } => {
                let store = SlotStore::open(&PathBuf::from(slots_path))?;
                let slot = store.load(index)?;

                if slot.kind() != SlotType::StepSequencer {
                    println!("Slot {} holds no step sequence ({}).", index, slot.kind());
                    return Ok(());
                }

                let sequence = StepSequence::load(&slot)?;
                print!("{}", config::sequence_to_yaml(&sequence)?);
            }
        },
    }

    Ok(())
}
