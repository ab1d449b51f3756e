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
use std::path::Path;

use config::{Config, File};
use tracing::info;

use crate::sequencer::StepSequence;

pub use self::error::ConfigError;
pub use self::midi::Midi;
pub use self::sequence::Sequence;
pub use self::settings::Settings;
pub use self::thru::Thru;

mod error;
mod midi;
mod sequence;
mod settings;
mod thru;

/// Loads settings from a YAML file.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let settings = Config::builder()
        .add_source(File::from(path))
        .build()?
        .try_deserialize::<Settings>()?;
    info!(path = %path.display(), "Loaded settings.");
    Ok(settings)
}

/// Loads a step sequence from a YAML file.
pub fn load_sequence(path: &Path) -> Result<StepSequence, ConfigError> {
    Config::builder()
        .add_source(File::from(path))
        .build()?
        .try_deserialize::<Sequence>()?
        .to_step_sequence()
}

/// Describes a step sequence as YAML.
pub fn sequence_to_yaml(sequence: &StepSequence) -> Result<String, ConfigError> {
    Ok(serde_yml::to_string(&Sequence::from_step_sequence(sequence))?)
}

#[cfg(test)]
mod test {
    use std::{error::Error, fs};

    use super::{load_sequence, load_settings, sequence_to_yaml};
    use crate::sequencer::{Format, Layout, StepSequence};

    #[test]
    fn sequence_files() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("sequence.yaml");

        let mut sequence = StepSequence::new(Format::Tracks12x16, Layout::Basic);
        sequence.set_step(11, 15, 36, 64);
        fs::write(&path, sequence_to_yaml(&sequence)?)?;

        assert_eq!(sequence, load_sequence(&path)?);
        Ok(())
    }

    #[test]
    fn missing_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(load_settings(&dir.path().join("nope.yaml")).is_err());
        assert!(load_sequence(&dir.path().join("nope.yaml")).is_err());
    }
}
