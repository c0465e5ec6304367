//! Construction hook for normalized instants.
//!
//! The date normalizer never builds a temporal value itself: it renders the
//! parsed timestamp into a formatted string and hands that to an
//! [`InstantFactory`]. Two shapes are produced:
//!
//! ```text
//! 2008-10-05 13:22:00.124           wall clock, no offset in the source
//! 2008-10-05 13:22:00.124 +00:00    already shifted to UTC
//! ```

use chrono::{DateTime, FixedOffset, NaiveDateTime};

use crate::error::{NormalizeError, Result};
use crate::zone::Zone;

/// `strftime` layout of the wall-clock part handed to factories.
pub const WALL_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Suffix appended to [`WALL_FORMAT`] once a value has been shifted to UTC.
pub const UTC_SUFFIX: &str = " +00:00";

const WALL_PARSE: &str = "%Y-%m-%d %H:%M:%S%.f";
const OFFSET_PARSE: &str = "%Y-%m-%d %H:%M:%S%.f %:z";

pub trait InstantFactory {
    type Instant;

    fn create(&self, formatted: &str) -> Result<Self::Instant>;
}

/// Any `Fn(&str) -> Result<T>` closure is a factory.
impl<F, T> InstantFactory for F
where
    F: Fn(&str) -> Result<T>,
{
    type Instant = T;

    fn create(&self, formatted: &str) -> Result<T> {
        self(formatted)
    }
}

/// Default factory producing `DateTime<FixedOffset>`.
///
/// UTC-suffixed input is taken as-is; bare wall clocks are resolved in `zone`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChronoInstantFactory {
    pub zone: Zone,
}

impl ChronoInstantFactory {
    pub fn new(zone: Zone) -> Self {
        Self { zone }
    }
}

impl InstantFactory for ChronoInstantFactory {
    type Instant = DateTime<FixedOffset>;

    fn create(&self, formatted: &str) -> Result<Self::Instant> {
        if let Ok(dt) = DateTime::parse_from_str(formatted, OFFSET_PARSE) {
            return Ok(dt);
        }

        let wall = NaiveDateTime::parse_from_str(formatted, WALL_PARSE).map_err(|e| {
            NormalizeError::Factory {
                input: formatted.to_string(),
                reason: e.to_string(),
            }
        })?;
        self.zone.resolve(&wall)
    }
}
