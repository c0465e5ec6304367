//! Zone resolution for OFX wall-clock times that carry no offset.

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Duration, FixedOffset, Local, LocalResult, NaiveDateTime, Offset, TimeZone, Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{NormalizeError, Result};

/// Where a naive OFX timestamp is anchored when the field has no `[offset:TZ]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Zone {
    /// The process timezone (`TZ` / system setting).
    #[default]
    Local,
    Utc,
    /// An IANA zone such as `America/Chicago`.
    Named(Tz),
}

impl Zone {
    /// Resolve a wall-clock time in this zone.
    ///
    /// A time inside a DST gap is rolled forward by the length of the gap
    /// (02:30 on a spring-forward night in Chicago becomes 03:30 CDT); a time
    /// inside a DST fold resolves to the earlier of the two instants.
    pub fn resolve(&self, wall: &NaiveDateTime) -> Result<DateTime<FixedOffset>> {
        debug!(%wall, zone = %self, "resolving naive OFX time");
        match self {
            Zone::Local => resolve_in(&Local, wall, self),
            Zone::Utc => Ok(Utc.from_utc_datetime(wall).fixed_offset()),
            Zone::Named(tz) => resolve_in(tz, wall, self),
        }
    }
}

fn resolve_in<T: TimeZone>(
    tz: &T,
    wall: &NaiveDateTime,
    zone: &Zone,
) -> Result<DateTime<FixedOffset>> {
    match tz.from_local_datetime(wall) {
        LocalResult::Single(dt) => Ok(dt.fixed_offset()),
        LocalResult::Ambiguous(earliest, latest) => {
            warn!(
                %wall,
                zone = %zone,
                earliest = %earliest.fixed_offset(),
                latest = %latest.fixed_offset(),
                "ambiguous local time, using the earlier instant"
            );
            Ok(earliest.fixed_offset())
        }
        LocalResult::None => {
            // Read the wall clock with the offset in force before the gap.
            let before = tz
                .from_local_datetime(&(*wall - Duration::days(1)))
                .earliest()
                .ok_or_else(|| {
                    NormalizeError::NonexistentLocalTime(wall.to_string(), zone.to_string())
                })?;
            let offset = i64::from(before.offset().fix().local_minus_utc());
            let rolled = tz.from_utc_datetime(&(*wall - Duration::seconds(offset)));
            warn!(
                %wall,
                zone = %zone,
                rolled = %rolled.fixed_offset(),
                "local time falls in a DST gap, rolling forward"
            );
            Ok(rolled.fixed_offset())
        }
    }
}

impl FromStr for Zone {
    type Err = NormalizeError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("local") {
            return Ok(Zone::Local);
        }
        if s.eq_ignore_ascii_case("utc") || s == "Z" {
            return Ok(Zone::Utc);
        }
        s.parse::<Tz>()
            .map(Zone::Named)
            .map_err(|_| NormalizeError::UnknownZone(s.to_string()))
    }
}

impl TryFrom<String> for Zone {
    type Error = NormalizeError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Zone> for String {
    fn from(zone: Zone) -> Self {
        zone.to_string()
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Local => f.write_str("local"),
            Zone::Utc => f.write_str("UTC"),
            Zone::Named(tz) => f.write_str(tz.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn wall(y: i32, m: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_zone_names() {
        assert_eq!("local".parse::<Zone>().unwrap(), Zone::Local);
        assert_eq!("LOCAL".parse::<Zone>().unwrap(), Zone::Local);
        assert_eq!("UTC".parse::<Zone>().unwrap(), Zone::Utc);
        assert_eq!(
            "America/Chicago".parse::<Zone>().unwrap(),
            Zone::Named(chrono_tz::America::Chicago)
        );
        assert_eq!(
            "Mars/Olympus".parse::<Zone>(),
            Err(NormalizeError::UnknownZone("Mars/Olympus".to_string()))
        );
    }

    #[test]
    fn test_display_round_trips() {
        for name in ["local", "UTC", "Europe/Berlin"] {
            let zone: Zone = name.parse().unwrap();
            assert_eq!(zone.to_string(), name);
        }
    }

    #[test]
    fn test_resolve_chicago_standard_time() {
        // Feb is CST (UTC-6)
        let zone: Zone = "America/Chicago".parse().unwrap();
        let dt = zone.resolve(&wall(2026, 2, 20, 23, 59)).unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-02-20T23:59:00-06:00");
        assert_eq!(
            dt.with_timezone(&Utc).to_rfc3339(),
            "2026-02-21T05:59:00+00:00"
        );
    }

    #[test]
    fn test_resolve_utc_keeps_wall_clock() {
        let dt = Zone::Utc.resolve(&wall(2008, 10, 5, 13, 22)).unwrap();
        assert_eq!(dt.to_rfc3339(), "2008-10-05T13:22:00+00:00");
    }

    #[test]
    fn test_dst_gap_rolls_forward() {
        let zone: Zone = "America/Chicago".parse().unwrap();
        let dt = zone.resolve(&wall(2024, 3, 10, 2, 30)).unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-10T03:30:00-05:00");

        // half-hour gap
        let zone: Zone = "Australia/Lord_Howe".parse().unwrap();
        let dt = zone.resolve(&wall(2024, 10, 6, 2, 15)).unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-10-06T02:45:00+11:00");
    }

    #[test]
    fn test_dst_fold_picks_earlier_instant() {
        let zone: Zone = "America/Chicago".parse().unwrap();
        let dt = zone.resolve(&wall(2024, 11, 3, 1, 30)).unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-11-03T01:30:00-05:00");
    }
}
