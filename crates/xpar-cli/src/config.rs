use std::path::Path;

use serde::Deserialize;
use xpar_error::Error;

/// Defaults that CLI flags override. An absent config file leaves every
/// field at the same defaults spec'd for the CLI itself (ifactor 1, joint
/// mode, 4 data/2 parity shards).
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct XparConfig {
    pub ifactor: u8,
    pub dshards: u8,
    pub pshards: u8,
    pub jobs: Option<usize>,
    /// When true, a shard disagreeing with consensus is fatal rather than
    /// silently dropped.
    pub strict_consensus: bool,
}

impl Default for XparConfig {
    fn default() -> Self {
        XparConfig {
            ifactor: 1,
            dshards: 4,
            pshards: 2,
            jobs: None,
            strict_consensus: false,
        }
    }
}

impl XparConfig {
    pub fn from_toml(s: &str) -> Result<Self, Error> {
        toml::from_str(s).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !(1..=3).contains(&self.ifactor) {
            return Err(Error::InvalidConfig(format!("ifactor {} out of range 1..=3", self.ifactor)));
        }
        if !(1..=127).contains(&self.dshards) {
            return Err(Error::InvalidConfig(format!("dshards {} out of range 1..=127", self.dshards)));
        }
        if !(1..=63).contains(&self.pshards) {
            return Err(Error::InvalidConfig(format!("pshards {} out of range 1..=63", self.pshards)));
        }
        Ok(())
    }
}
