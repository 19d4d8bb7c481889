//! Scene configuration from defaults and environment variables.
//!
//! | variable | effect |
//! |---|---|
//! | `HOLIDAY_SEED` | fixed `u64` seed for every layout, makes runs reproducible |
//! | `HOLIDAY_RECORD_SECONDS` | length of a recording in seconds |
//! | `HOLIDAY_START` | initial arrangement, `tree` or `scattered` |
//!
//! Invalid values are logged and ignored.

use std::str::FromStr;

use anyhow::*;

use crate::{
    animation::{Arrangement, ArrangementTimings, LayoutParams},
    record::RecordSettings,
};

pub const SEED_VAR: &str = "HOLIDAY_SEED";
pub const RECORD_SECONDS_VAR: &str = "HOLIDAY_RECORD_SECONDS";
pub const START_VAR: &str = "HOLIDAY_START";

impl FromStr for Arrangement {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tree" => Ok(Arrangement::Tree),
            "scattered" | "scatter" => Ok(Arrangement::Scattered),
            other => bail!("unknown arrangement {other:?}, expected `tree` or `scattered`"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneConfig {
    pub layout: LayoutParams,
    pub timings: ArrangementTimings,
    pub record: RecordSettings,
    /// The scene opens scattered and morphs into the tree on its first transition.
    pub start: Arrangement,
    pub snow_count: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            layout: LayoutParams::default(),
            timings: ArrangementTimings::default(),
            record: RecordSettings::default(),
            start: Arrangement::Scattered,
            snow_count: 400,
        }
    }
}

impl SceneConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom source of variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(seed) = parse_var::<u64>(&lookup, SEED_VAR) {
            config.layout.seed = Some(seed);
        }
        if let Some(seconds) = parse_var::<f32>(&lookup, RECORD_SECONDS_VAR) {
            if seconds.is_finite() && seconds > 0.0 {
                config.record.seconds = seconds;
            } else {
                log::warn!("ignoring {RECORD_SECONDS_VAR}={seconds}, it must be positive");
            }
        }
        if let Some(start) = parse_var::<Arrangement>(&lookup, START_VAR) {
            config.start = start;
        }
        log::debug!("scene config: {config:?}");
        config
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(key)?;
    match raw.parse::<T>() {
        std::result::Result::Ok(value) => Some(value),
        Err(e) => {
            log::warn!("ignoring {key}={raw:?}: {e}");
            None
        }
    }
}
