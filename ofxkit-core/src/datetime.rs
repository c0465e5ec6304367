//! Date/time normalization for OFX `<DTPOSTED>`, `<DTSERVER>`, `<DTASOF>` etc.
//!
//! Accepted shapes:
//!
//! ```text
//! YYYYMMDD
//! YYYYMMDDHHMMSS
//! YYYYMMDDHHMMSS.XXX
//! YYYYMMDDHHMMSS.XXX[-5:EST]
//! ```
//!
//! The bracket may trail any of the shapes and its zone label is optional.
//! Values carrying an offset are shifted to UTC before the factory sees them;
//! values without one are handed over as a bare wall clock.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use tracing::debug;

use crate::error::{NormalizeError, Result};
use crate::factory::{ChronoInstantFactory, InstantFactory, UTC_SUFFIX, WALL_FORMAT};
use crate::zone::Zone;

static OFX_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?P<date>[0-9]{8})",
        r"(?:(?P<time>[0-9]{6})(?:\.(?P<frac>[0-9]+))?)?",
        r"(?:\[(?P<offset>[^:\]]*)(?::(?P<label>[^\]]*))?\])?$"
    ))
    .expect("OFX date pattern")
});

/// A raw OFX timestamp split into its parts, before any zone handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfxTimestamp {
    /// Wall clock as written in the field, milliseconds included.
    pub wall: NaiveDateTime,
    /// Whole-hour UTC offset from the `[...]` suffix.
    pub offset_hours: Option<i32>,
    /// Advisory zone label from the suffix (`EST`, `GMT`, ...). Never used in arithmetic.
    pub zone_label: Option<String>,
}

impl OfxTimestamp {
    /// Split a raw field. Empty or blank input means "no value".
    pub fn parse(raw: &str) -> Result<Option<Self>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }

        let caps = OFX_DATE
            .captures(raw)
            .ok_or_else(|| NormalizeError::UnrecognizedDate(raw.to_string()))?;

        let date = &caps["date"];
        let components = || NormalizeError::InvalidComponents(raw.to_string());
        let field = |s: &str| s.parse::<u32>().map_err(|_| components());

        let year = date[0..4].parse::<i32>().map_err(|_| components())?;
        let day = NaiveDate::from_ymd_opt(year, field(&date[4..6])?, field(&date[6..8])?)
            .ok_or_else(components)?;

        let time = match caps.name("time") {
            Some(t) => {
                let t = t.as_str();
                let millis = caps.name("frac").map_or(0, |f| millis_of(f.as_str()));
                NaiveTime::from_hms_milli_opt(
                    field(&t[0..2])?,
                    field(&t[2..4])?,
                    field(&t[4..6])?,
                    millis,
                )
                .ok_or_else(components)?
            }
            None => NaiveTime::MIN,
        };

        let offset_hours = caps
            .name("offset")
            .map(|o| parse_offset(o.as_str()))
            .transpose()?;
        let zone_label = caps
            .name("label")
            .map(|l| l.as_str().trim())
            .filter(|l| !l.is_empty())
            .map(str::to_string);

        Ok(Some(Self {
            wall: day.and_time(time),
            offset_hours,
            zone_label,
        }))
    }

    /// The wall clock shifted to UTC, when the field carried an offset.
    pub fn utc_wall(&self) -> Option<NaiveDateTime> {
        self.offset_hours
            .map(|hours| self.wall - Duration::hours(i64::from(hours)))
    }

    /// Render the string handed to an [`InstantFactory`].
    pub fn formatted(&self) -> String {
        match self.utc_wall() {
            Some(utc) => format!("{}{UTC_SUFFIX}", utc.format(WALL_FORMAT)),
            None => self.wall.format(WALL_FORMAT).to_string(),
        }
    }
}

/// Leading three fraction digits as milliseconds: `.5` is 500, `.123456` is 123.
fn millis_of(frac: &str) -> u32 {
    frac.bytes()
        .chain(std::iter::repeat(b'0'))
        .take(3)
        .fold(0, |acc, b| acc * 10 + u32::from(b - b'0'))
}

fn parse_offset(s: &str) -> Result<i32> {
    let trimmed = s.trim();
    match trimmed.parse::<i32>() {
        Ok(hours) if (-23..=23).contains(&hours) => Ok(hours),
        _ => Err(NormalizeError::InvalidOffset(trimmed.to_string())),
    }
}

/// Turns raw OFX date fields into instants built by `F`.
#[derive(Debug, Clone, Default)]
pub struct DateTimeNormalizer<F = ChronoInstantFactory> {
    factory: F,
}

impl DateTimeNormalizer {
    /// Default factory, naive times resolved in the process timezone.
    pub fn new() -> Self {
        Self::default()
    }

    /// Default factory, naive times resolved in `zone`.
    pub fn with_zone(zone: Zone) -> Self {
        Self::with_factory(ChronoInstantFactory::new(zone))
    }
}

impl<F: InstantFactory> DateTimeNormalizer<F> {
    pub fn with_factory(factory: F) -> Self {
        Self { factory }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Normalize one raw field. `Ok(None)` for empty input; the factory is
    /// not consulted in that case.
    pub fn normalize(&self, raw: &str) -> Result<Option<F::Instant>> {
        let Some(stamp) = OfxTimestamp::parse(raw)? else {
            return Ok(None);
        };

        let formatted = stamp.formatted();
        if let Some(hours) = stamp.offset_hours {
            debug!(
                raw,
                offset_hours = hours,
                label = stamp.zone_label.as_deref().unwrap_or(""),
                %formatted,
                "shifted OFX time to UTC"
            );
        }

        self.factory.create(&formatted).map(Some)
    }
}

/// Normalize a raw OFX date with the default factory in the process timezone.
pub fn create_datetime_from_str(raw: &str) -> Result<Option<DateTime<FixedOffset>>> {
    DateTimeNormalizer::new().normalize(raw)
}
