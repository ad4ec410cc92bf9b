//! Runtime configuration
//!
//! Compile-time limits live in [`crate::constants`]; this module holds the
//! values a deployment may tune: where the room store lives, how often room
//! metadata is refreshed, and the pacing of rounds and reveals. Values are
//! read from JSON or from `QUIZROOM_*` environment variables and validated
//! before use.

use garde::Validate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use web_time::Duration;

use crate::constants;

/// Environment variable overriding [`Config::store_url`]
pub const STORE_URL_VAR: &str = "QUIZROOM_STORE_URL";
/// Environment variable overriding [`Config::poll_interval`], in milliseconds
pub const POLL_INTERVAL_VAR: &str = "QUIZROOM_POLL_INTERVAL_MS";

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum Error {
    /// The JSON document could not be parsed
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// An environment variable held an unusable value
    #[error("environment variable {name} has invalid value {value:?}")]
    Variable {
        /// Name of the offending variable
        name: &'static str,
        /// The value found
        value: String,
    },
    /// A value was outside of its allowed bounds
    #[error(transparent)]
    Invalid(#[from] garde::Report),
}

/// Validates a configurable delay against the allowed millisecond bounds
fn validate_delay(val: &Duration) -> garde::Result {
    let millis = val.as_millis();
    if (u128::from(constants::timing::MIN_DELAY_MILLIS)
        ..=u128::from(constants::timing::MAX_DELAY_MILLIS))
        .contains(&millis)
    {
        Ok(())
    } else {
        Err(garde::Error::new(format!(
            "delay of {millis}ms is outside of the bounds [{},{}]",
            constants::timing::MIN_DELAY_MILLIS,
            constants::timing::MAX_DELAY_MILLIS,
        )))
    }
}

/// Pacing of rounds, reveals and the start countdown
#[serde_with::serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Timing {
    /// Interval between two countdown ticks
    #[garde(custom(|v, _| validate_delay(v)))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub tick_interval: Duration,
    /// Delay between reveal stages
    #[garde(custom(|v, _| validate_delay(v)))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub reveal_step: Duration,
    /// Delay between the last reveal stage and the next question
    #[garde(custom(|v, _| validate_delay(v)))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub reveal_trailing: Duration,
    /// Seconds counted down before a solo quiz begins (zero disables it)
    #[garde(range(max = 10))]
    pub start_countdown: u8,
    /// Delay between two start countdown steps
    #[garde(custom(|v, _| validate_delay(v)))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub start_countdown_step: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            tick_interval: constants::timing::TICK_INTERVAL,
            reveal_step: constants::timing::REVEAL_STEP,
            reveal_trailing: constants::timing::REVEAL_TRAILING,
            start_countdown: constants::timing::START_COUNTDOWN,
            start_countdown_step: constants::timing::START_COUNTDOWN_STEP,
        }
    }
}

/// Top-level configuration
#[serde_with::serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Config {
    /// Base URL of the room store
    #[garde(length(min = 1), custom(|v: &String, _| validate_store_url(v)))]
    pub store_url: String,
    /// Delay between two room metadata refreshes
    #[garde(custom(|v, _| validate_delay(v)))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub poll_interval: Duration,
    /// Round and reveal pacing
    #[garde(dive)]
    pub timing: Timing,
}

/// Checks that the store URL uses an HTTP scheme
fn validate_store_url(val: &str) -> garde::Result {
    if val.starts_with("http://") || val.starts_with("https://") {
        Ok(())
    } else {
        Err(garde::Error::new("store url must start with http:// or https://"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_url: constants::store::DEFAULT_URL.to_owned(),
            poll_interval: constants::room::POLL_INTERVAL,
            timing: Timing::default(),
        }
    }
}

impl Config {
    /// Parses and validates a JSON configuration document
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or a value is out of
    /// bounds.
    pub fn from_json(source: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Builds the configuration from defaults and `QUIZROOM_*` variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or a value is out of
    /// bounds.
    pub fn from_env() -> Result<Self, Error> {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides looked up by variable name
    ///
    /// # Arguments
    ///
    /// * `lookup` - Returns the value of a variable, if set
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be parsed or is out of bounds.
    pub fn with_overrides<F: Fn(&str) -> Option<String>>(mut self, lookup: F) -> Result<Self, Error> {
        if let Some(url) = lookup(STORE_URL_VAR) {
            self.store_url = url.trim().trim_end_matches('/').to_owned();
        }

        if let Some(value) = lookup(POLL_INTERVAL_VAR) {
            let millis = value.trim().parse::<u64>().map_err(|_| Error::Variable {
                name: POLL_INTERVAL_VAR,
                value: value.clone(),
            })?;
            self.poll_interval = Duration::from_millis(millis);
        }

        self.validate()?;
        Ok(self)
    }
}
