//! Date provider
//!
//! The metadata API is keyed by calendar date in `YYYY-MM-DD` form.

use crate::error::{PicError, Result};
use chrono::{Local, NaiveDate};
use std::fmt;
use std::str::FromStr;

const FORMAT: &str = "%Y-%m-%d";

/// A calendar date rendered as `YYYY-MM-DD`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date(NaiveDate);

impl Date {
    /// Today's date from the local system clock
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    /// Parse a user-supplied `YYYY-MM-DD` string
    pub fn parse(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(s.trim(), FORMAT)
            .map(Self)
            .map_err(|_| PicError::InvalidDate(s.to_string()))
    }
}

impl From<NaiveDate> for Date {
    fn from(d: NaiveDate) -> Self {
        Self(d)
    }
}

impl FromStr for Date {
    type Err = PicError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(FORMAT))
    }
}
