//! Scheduler description: algorithm name followed by `key = value` options.
//!
//! ```
//! # use schedsim::{Algorithm, SchedulerConfig};
//! # fn main() -> schedsim::Result<()> {
//! let config: SchedulerConfig = "FEEDBACK\nquantum = 2\nnum_priorities = 3\n".parse()?;
//! assert_eq!(config.algorithm, Algorithm::Feedback);
//! assert_eq!(config.options.get("quantum"), Some("2"));
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{Error, Result, Time};

/// Supported scheduling algorithms.
#[derive(
    Debug,
    PartialEq,
    Eq,
    Clone,
    Copy,
    strum::EnumString,
    strum::Display,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Algorithm {
    /// See [`Fcfs`](crate::Fcfs).
    #[strum(serialize = "FCFS")]
    Fcfs,
    /// See [`VirtualRoundRobin`](crate::VirtualRoundRobin).
    #[strum(serialize = "VRR")]
    Vrr,
    /// See [`ShortestRemainingTime`](crate::ShortestRemainingTime).
    #[strum(serialize = "SRT")]
    Srt,
    /// See [`HighestResponseRatio`](crate::HighestResponseRatio).
    #[strum(serialize = "HRRN")]
    Hrrn,
    /// See [`Feedback`](crate::Feedback).
    #[strum(serialize = "FEEDBACK")]
    Feedback,
}

impl Algorithm {
    /// Options that must be present for this algorithm.
    #[must_use]
    pub fn required_options(self) -> &'static [&'static str] {
        match self {
            Self::Fcfs => &[],
            Self::Vrr => &["quantum"],
            Self::Srt | Self::Hrrn => &["service_given", "alpha"],
            Self::Feedback => &["quantum", "num_priorities"],
        }
    }

    /// Options that may be present for this algorithm.
    #[must_use]
    pub fn optional_options(self) -> &'static [&'static str] {
        match self {
            Self::Srt => &["preemptive"],
            _ => &[],
        }
    }
}

/// Raw option assignments, as read from the scheduler description.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options(BTreeMap<String, String>);

impl Options {
    /// Returns the raw value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Sets `key` to `value`, returning `false` if it was already set.
    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) -> bool {
        self.0.insert(key.into(), value.into()).is_none()
    }

    /// Checks that all options required by `algorithm` are present and no others besides its
    /// optional ones.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] listing missing or unexpected options.
    pub fn validate_keys(&self, algorithm: Algorithm) -> Result<()> {
        let required = algorithm.required_options();
        let optional = algorithm.optional_options();
        let missing = required
            .iter()
            .filter(|key| !self.0.contains_key(**key))
            .collect_vec();
        if !missing.is_empty() {
            return Err(Error::InvalidConfiguration(format!(
                "{} requires options: {}",
                algorithm,
                missing.iter().format(", ")
            )));
        }
        let unexpected = self
            .0
            .keys()
            .filter(|key| !required.contains(&key.as_str()) && !optional.contains(&key.as_str()))
            .collect_vec();
        if !unexpected.is_empty() {
            return Err(Error::InvalidConfiguration(format!(
                "{} does not accept options: {}",
                algorithm,
                unexpected.iter().format(", ")
            )));
        }
        Ok(())
    }

    fn required(&self, key: &str) -> Result<&str> {
        self.get(key)
            .ok_or_else(|| Error::InvalidConfiguration(format!("missing option `{}`", key)))
    }

    /// Parses a positive integer option, such as `quantum`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if missing, not an integer, or not positive.
    pub fn positive(&self, key: &str) -> Result<Time> {
        let value = self.required(key)?;
        match value.parse::<i64>() {
            Ok(v) if v > 0 => Ok(v as Time),
            Ok(_) => Err(Error::InvalidConfiguration(format!(
                "`{}` must be positive, got {}",
                key, value
            ))),
            Err(_) => Err(Error::InvalidConfiguration(format!(
                "`{}` must be an integer, got `{}`",
                key, value
            ))),
        }
    }

    /// Parses a `true`/`false` option.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if missing or neither `true` nor `false`.
    pub fn flag(&self, key: &str) -> Result<bool> {
        self.flag_or(key, None)
    }

    /// Parses a `true`/`false` option, falling back to `default` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if present but neither `true` nor `false`.
    pub fn flag_or_default(&self, key: &str, default: bool) -> Result<bool> {
        self.flag_or(key, Some(default))
    }

    fn flag_or(&self, key: &str, default: Option<bool>) -> Result<bool> {
        let value = match (self.get(key), default) {
            (Some(value), _) => value,
            (None, Some(default)) => return Ok(default),
            (None, None) => self.required(key)?,
        };
        match value {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(Error::InvalidConfiguration(format!(
                "`{}` must be `true` or `false`, got `{}`",
                key, value
            ))),
        }
    }

    /// Parses a fraction in `[0, 1]`, such as `alpha`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if missing, not a number, or out of range.
    pub fn fraction(&self, key: &str) -> Result<f64> {
        let value = self.required(key)?;
        let parsed: f64 = value.parse().map_err(|_| {
            Error::InvalidConfiguration(format!("`{}` must be a number, got `{}`", key, value))
        })?;
        if (0.0..=1.0).contains(&parsed) {
            Ok(parsed)
        } else {
            Err(Error::InvalidConfiguration(format!(
                "`{}` must be between 0 and 1, got {}",
                key, value
            )))
        }
    }
}

/// Parsed scheduler description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Selected algorithm.
    pub algorithm: Algorithm,
    /// Raw options; validated when the scheduler is constructed.
    pub options: Options,
}

impl SchedulerConfig {
    /// Reads a scheduler description file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid description.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        std::fs::read_to_string(path)?.parse()
    }
}

impl FromStr for SchedulerConfig {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        let mut lines = input
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));
        let (_, name) = lines.next().ok_or_else(|| Error::InvalidScheduleSpec {
            line: 1,
            reason: String::from("missing algorithm name"),
        })?;
        let algorithm =
            Algorithm::from_str(name).map_err(|_| Error::UnsupportedAlgorithm(name.to_string()))?;
        let mut options = Options::default();
        for (line, assignment) in lines {
            let (key, value) = assignment
                .splitn(2, '=')
                .map(str::trim)
                .collect_tuple()
                .filter(|(key, value)| {
                    !key.is_empty()
                        && !value.is_empty()
                        && !key.contains(char::is_whitespace)
                        && !value.contains(|c: char| c.is_whitespace() || c == '=')
                })
                .ok_or_else(|| Error::InvalidScheduleSpec {
                    line,
                    reason: format!("expected `key = value`, got `{}`", assignment),
                })?;
            if !options.insert(key, value) {
                return Err(Error::InvalidConfiguration(format!(
                    "option `{}` given more than once",
                    key
                )));
            }
        }
        Ok(Self { algorithm, options })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use float_cmp::approx_eq;
    use rstest::rstest;

    #[test]
    fn test_parse() {
        let config: SchedulerConfig = "# comment\nVRR\n\n  quantum=4  \n".parse().unwrap();
        assert_eq!(config.algorithm, Algorithm::Vrr);
        assert_eq!(config.options.get("quantum"), Some("4"));
        assert!(config.options.validate_keys(Algorithm::Vrr).is_ok());
        assert_eq!(config.options.positive("quantum").unwrap(), 4);
    }

    #[test]
    fn test_unsupported_algorithm() {
        assert!(matches!(
            "RR\nquantum = 1".parse::<SchedulerConfig>(),
            Err(Error::UnsupportedAlgorithm(name)) if name == "RR"
        ));
        assert!(matches!(
            "".parse::<SchedulerConfig>(),
            Err(Error::InvalidScheduleSpec { line: 1, .. })
        ));
    }

    #[rstest(
        input,
        line,
        case("SRT\nservice_given = true\nalpha", 3),
        case("SRT\n= 0.5", 2),
        case("FEEDBACK\nquantum = 1\nnum_priorities = 1 2", 3),
        case("VRR\nquantum = = 1", 2)
    )]
    fn test_malformed_option(input: &str, line: usize) {
        match input.parse::<SchedulerConfig>() {
            Err(Error::InvalidScheduleSpec { line: l, .. }) => assert_eq!(l, line),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_option() {
        assert!(matches!(
            "VRR\nquantum = 1\nquantum = 2".parse::<SchedulerConfig>(),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[rstest(
        input,
        algorithm,
        valid,
        case("FCFS", Algorithm::Fcfs, true),
        case("FCFS\nquantum = 2", Algorithm::Fcfs, false),
        case("VRR", Algorithm::Vrr, false),
        case("SRT\nservice_given = true\nalpha = 0.5", Algorithm::Srt, true),
        case("SRT\nservice_given = true\nalpha = 0.5\npreemptive = true", Algorithm::Srt, true),
        case("HRRN\nservice_given = true\nalpha = 0.5\npreemptive = true", Algorithm::Hrrn, false),
        case("HRRN\nservice_given = true", Algorithm::Hrrn, false),
        case("FEEDBACK\nquantum = 1\nnum_priorities = 3", Algorithm::Feedback, true),
        case("FEEDBACK\nquantum = 1\nnum_priorities = 3\nalpha = 1", Algorithm::Feedback, false)
    )]
    fn test_validate_keys(input: &str, algorithm: Algorithm, valid: bool) {
        let config: SchedulerConfig = input.parse().unwrap();
        assert_eq!(config.algorithm, algorithm);
        assert_eq!(config.options.validate_keys(algorithm).is_ok(), valid);
    }

    #[test]
    fn test_option_values() {
        let mut options = Options::default();
        options.insert("quantum", "0");
        options.insert("negative", "-3");
        options.insert("word", "ten");
        options.insert("alpha", "0.25");
        options.insert("big_alpha", "1.5");
        options.insert("given", "true");
        options.insert("bad_flag", "yes");
        assert!(options.positive("quantum").is_err());
        assert!(options.positive("negative").is_err());
        assert!(options.positive("word").is_err());
        assert!(options.positive("missing").is_err());
        assert!(approx_eq!(f64, options.fraction("alpha").unwrap(), 0.25));
        assert!(options.fraction("big_alpha").is_err());
        assert!(options.flag("given").unwrap());
        assert!(options.flag("bad_flag").is_err());
        assert!(options.flag("missing").is_err());
        assert!(!options.flag_or_default("missing", false).unwrap());
    }
}
