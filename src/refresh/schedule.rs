//! Daily wall-clock checkpoints.

use chrono::{Duration, NaiveDateTime, NaiveTime};

/// Parse an `HH:MM:SS` checkpoint.
pub fn parse_checkpoint(value: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M:%S")
}

/// A set of times of day at which the cache is reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailySchedule {
    checkpoints: Vec<NaiveTime>,
}

impl DailySchedule {
    pub fn new(mut checkpoints: Vec<NaiveTime>) -> Self {
        checkpoints.sort();
        checkpoints.dedup();
        Self { checkpoints }
    }

    /// Parse a list of `HH:MM:SS` strings.
    pub fn parse<S: AsRef<str>>(values: &[S]) -> Result<Self, chrono::ParseError> {
        let checkpoints = values
            .iter()
            .map(|v| parse_checkpoint(v.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(checkpoints))
    }

    pub fn checkpoints(&self) -> &[NaiveTime] {
        &self.checkpoints
    }

    /// True if a checkpoint lies in `(previous, now]`.
    ///
    /// A clock that moved backwards crosses nothing.
    pub fn crossed(&self, previous: NaiveDateTime, now: NaiveDateTime) -> bool {
        if self.checkpoints.is_empty() || now <= previous {
            return false;
        }
        if now - previous >= Duration::days(1) {
            return true;
        }

        let mut day = previous.date();
        while day <= now.date() {
            for checkpoint in &self.checkpoints {
                let at = day.and_time(*checkpoint);
                if previous < at && at <= now {
                    return true;
                }
            }
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        false
    }
}
