//! Runner configuration.
use std::{fs, io::Read, path::Path, time::Duration};

use chip8_interp::prelude::*;
use serde::Deserialize;

use crate::error::AppResult;

/// Default number of instructions executed per second.
pub const DEFAULT_CLOCK_FREQUENCY: Hz = Hz(500);

/// Default number of steps before the runner stops the session.
pub const DEFAULT_MAX_STEPS: usize = 1000;

/// Clock frequency in instructions per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Hz(pub u32);

impl Hz {
    /// Time between two steps, or `None` when the clock is unthrottled.
    pub fn interval(self) -> Option<Duration> {
        if self.0 == 0 {
            None
        } else {
            Some(Duration::from_nanos(1_000_000_000 / self.0 as u64))
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CliConf {
    pub clock_frequency: Hz,
    pub max_steps: usize,
    /// Fixed seed for the random instruction, to make runs repeatable.
    pub seed: Option<u64>,
    /// Keys held down for the whole session.
    pub keys: Vec<KeyCode>,
}

impl Default for CliConf {
    fn default() -> Self {
        Self {
            clock_frequency: DEFAULT_CLOCK_FREQUENCY,
            max_steps: DEFAULT_MAX_STEPS,
            seed: None,
            keys: Vec::new(),
        }
    }
}

impl CliConf {
    pub fn from_reader(reader: impl Read) -> AppResult<Self> {
        Ok(serde_yaml::from_reader(reader)?)
    }

    pub fn from_file(filepath: impl AsRef<Path>) -> AppResult<Self> {
        let file = fs::File::open(filepath)?;
        Self::from_reader(file)
    }

    pub fn vm_conf(&self) -> Chip8Conf {
        Chip8Conf { seed: self.seed }
    }
}
