//! Date/time binary codecs.
//!
//! PostgreSQL counts from 2000-01-01 00:00:00:
//! - date: i32 days, `i32::MAX` / `i32::MIN` are `infinity` / `-infinity`
//! - time: i64 microseconds since midnight
//! - timestamp, timestamptz: i64 microseconds, `i64::MAX` / `i64::MIN` are
//!   `infinity` / `-infinity`
//!
//! Infinities map to chrono's `MAX` / `MIN` values and back.

use bytes::{BufMut, BytesMut};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};

use super::{Cell, FromPg, PgType, ToPg, binary_payload, fixed};
use crate::error::{TypeError, TypeResult};

/// Days from 0001-01-01 (CE day 1) to 2000-01-01.
const PG_EPOCH_DAYS_FROM_CE: i32 = 730_120;

const USECS_PER_SEC: i64 = 1_000_000;
const USECS_PER_DAY: i64 = 86_400 * USECS_PER_SEC;

// ==================== Wire ⇄ chrono ====================

/// Date from days since 2000-01-01.
pub fn date_from_pg(days: i32) -> Option<NaiveDate> {
    match days {
        i32::MAX => Some(NaiveDate::MAX),
        i32::MIN => Some(NaiveDate::MIN),
        _ => NaiveDate::from_num_days_from_ce_opt(days.checked_add(PG_EPOCH_DAYS_FROM_CE)?),
    }
}

/// Days since 2000-01-01.
pub fn date_to_pg(date: NaiveDate) -> i32 {
    if date == NaiveDate::MAX {
        i32::MAX
    } else if date == NaiveDate::MIN {
        i32::MIN
    } else {
        date.num_days_from_ce() - PG_EPOCH_DAYS_FROM_CE
    }
}

/// Time of day from microseconds since midnight. 24:00:00 has no chrono
/// equivalent and yields `None`.
pub fn time_from_pg(usecs: i64) -> Option<NaiveTime> {
    if !(0..USECS_PER_DAY).contains(&usecs) {
        return None;
    }
    let secs = (usecs / USECS_PER_SEC) as u32;
    let nanos = (usecs % USECS_PER_SEC) as u32 * 1_000;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
}

/// Microseconds since midnight; sub-microsecond precision is truncated.
pub fn time_to_pg(time: NaiveTime) -> i64 {
    time.num_seconds_from_midnight() as i64 * USECS_PER_SEC + (time.nanosecond() / 1_000) as i64
}

/// Timestamp from microseconds since 2000-01-01 00:00:00.
pub fn timestamp_from_pg(usecs: i64) -> Option<NaiveDateTime> {
    match usecs {
        i64::MAX => Some(NaiveDateTime::MAX),
        i64::MIN => Some(NaiveDateTime::MIN),
        _ => {
            let days = i32::try_from(usecs.div_euclid(USECS_PER_DAY)).ok()?;
            let date = date_from_pg(days)?;
            let time = time_from_pg(usecs.rem_euclid(USECS_PER_DAY))?;
            Some(NaiveDateTime::new(date, time))
        }
    }
}

/// Microseconds since 2000-01-01 00:00:00, saturating to the infinities.
pub fn timestamp_to_pg(ts: NaiveDateTime) -> i64 {
    if ts == NaiveDateTime::MAX {
        return i64::MAX;
    }
    if ts == NaiveDateTime::MIN {
        return i64::MIN;
    }
    let days = (ts.date().num_days_from_ce() - PG_EPOCH_DAYS_FROM_CE) as i64;
    days.checked_mul(USECS_PER_DAY)
        .and_then(|d| d.checked_add(time_to_pg(ts.time())))
        .unwrap_or(if days < 0 { i64::MIN } else { i64::MAX })
}

// ==================== Cells ====================

#[track_caller]
fn out_of_range(cell: &Cell, expected: &'static str, raw: i64) -> TypeError {
    TypeError::invalid_data(cell.pg_type(), expected, format!("{raw} is out of range"))
}

impl<'a> FromPg<'a> for NaiveDate {
    fn from_pg(cell: &'a Cell) -> TypeResult<Self> {
        let data = binary_payload(cell, &[PgType::Date], "NaiveDate")?;
        let days = i32::from_be_bytes(fixed(cell, data, "NaiveDate")?);
        match date_from_pg(days) {
            Some(date) => Ok(date),
            None => Err(out_of_range(cell, "NaiveDate", days as i64)),
        }
    }
}

impl ToPg for NaiveDate {
    const PG_TYPE: PgType = PgType::Date;

    fn write_binary(&self, buf: &mut BytesMut) {
        buf.put_i32(date_to_pg(*self));
    }
}

impl<'a> FromPg<'a> for NaiveTime {
    fn from_pg(cell: &'a Cell) -> TypeResult<Self> {
        let data = binary_payload(cell, &[PgType::Time], "NaiveTime")?;
        let usecs = i64::from_be_bytes(fixed(cell, data, "NaiveTime")?);
        match time_from_pg(usecs) {
            Some(time) => Ok(time),
            None => Err(out_of_range(cell, "NaiveTime", usecs)),
        }
    }
}

impl ToPg for NaiveTime {
    const PG_TYPE: PgType = PgType::Time;

    fn write_binary(&self, buf: &mut BytesMut) {
        buf.put_i64(time_to_pg(*self));
    }
}

impl<'a> FromPg<'a> for NaiveDateTime {
    fn from_pg(cell: &'a Cell) -> TypeResult<Self> {
        let data = binary_payload(cell, &[PgType::Timestamp], "NaiveDateTime")?;
        let usecs = i64::from_be_bytes(fixed(cell, data, "NaiveDateTime")?);
        match timestamp_from_pg(usecs) {
            Some(ts) => Ok(ts),
            None => Err(out_of_range(cell, "NaiveDateTime", usecs)),
        }
    }
}

impl ToPg for NaiveDateTime {
    const PG_TYPE: PgType = PgType::Timestamp;

    fn write_binary(&self, buf: &mut BytesMut) {
        buf.put_i64(timestamp_to_pg(*self));
    }
}

impl<'a> FromPg<'a> for DateTime<Utc> {
    fn from_pg(cell: &'a Cell) -> TypeResult<Self> {
        let data = binary_payload(cell, &[PgType::Timestamptz], "DateTime<Utc>")?;
        let usecs = i64::from_be_bytes(fixed(cell, data, "DateTime<Utc>")?);
        match timestamp_from_pg(usecs) {
            Some(ts) => Ok(Utc.from_utc_datetime(&ts)),
            None => Err(out_of_range(cell, "DateTime<Utc>", usecs)),
        }
    }
}

impl ToPg for DateTime<Utc> {
    const PG_TYPE: PgType = PgType::Timestamptz;

    fn write_binary(&self, buf: &mut BytesMut) {
        buf.put_i64(timestamp_to_pg(self.naive_utc()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_epoch() {
        assert_eq!(date_from_pg(0), Some(ymd(2000, 1, 1)));
        assert_eq!(date_to_pg(ymd(1999, 12, 31)), -1);
        assert_eq!(timestamp_from_pg(0), ymd(2000, 1, 1).and_hms_opt(0, 0, 0));
    }

    #[test]
    fn test_date_cell() {
        let cell = Cell::binary(PgType::Date, 8_766i32.to_be_bytes().to_vec());
        assert_eq!(cell.get::<NaiveDate>().unwrap(), ymd(2024, 1, 1));
        assert_eq!(ymd(2024, 1, 1).to_pg().payload(), &8_766i32.to_be_bytes());
    }

    #[test]
    fn test_time_cell() {
        let usecs: i64 = (13 * 3600 + 45 * 60 + 30) * USECS_PER_SEC + 250_000;
        let cell = Cell::binary(PgType::Time, usecs.to_be_bytes().to_vec());
        let expected = NaiveTime::from_hms_micro_opt(13, 45, 30, 250_000).unwrap();
        assert_eq!(cell.get::<NaiveTime>().unwrap(), expected);
        assert_eq!(expected.to_pg().payload(), &usecs.to_be_bytes());
    }

    #[test]
    fn test_time_rejects_midnight_end() {
        let cell = Cell::binary(PgType::Time, USECS_PER_DAY.to_be_bytes().to_vec());
        assert_eq!(cell.get::<NaiveTime>().unwrap_err().kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn test_timestamp_before_epoch() {
        let ts = ymd(1969, 7, 20).and_hms_micro_opt(20, 17, 40, 123_456).unwrap();
        let cell = ts.to_pg();
        assert_eq!(cell.pg_type(), PgType::Timestamp);
        assert_eq!(cell.get::<NaiveDateTime>().unwrap(), ts);
    }

    #[test]
    fn test_timestamp_infinity() {
        let inf = Cell::binary(PgType::Timestamp, i64::MAX.to_be_bytes().to_vec());
        assert_eq!(inf.get::<NaiveDateTime>().unwrap(), NaiveDateTime::MAX);
        let neg = Cell::binary(PgType::Timestamp, i64::MIN.to_be_bytes().to_vec());
        assert_eq!(neg.get::<NaiveDateTime>().unwrap(), NaiveDateTime::MIN);
        assert_eq!(NaiveDateTime::MAX.to_pg().payload(), &i64::MAX.to_be_bytes());
        assert_eq!(NaiveDateTime::MIN.to_pg().payload(), &i64::MIN.to_be_bytes());
    }

    #[test]
    fn test_date_infinity() {
        let inf = Cell::binary(PgType::Date, i32::MAX.to_be_bytes().to_vec());
        assert_eq!(inf.get::<NaiveDate>().unwrap(), NaiveDate::MAX);
        assert_eq!(NaiveDate::MIN.to_pg().payload(), &i32::MIN.to_be_bytes());
    }

    #[test]
    fn test_timestamptz() {
        let ts = Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap();
        let cell = ts.to_pg();
        assert_eq!(cell.pg_type(), PgType::Timestamptz);
        assert_eq!(cell.get::<DateTime<Utc>>().unwrap(), ts);
        assert_eq!(cell.get::<NaiveDateTime>().unwrap_err().kind(), ErrorKind::NotImplemented);
    }

    #[test]
    fn test_wrong_sizes() {
        let cell = Cell::binary(PgType::Date, vec![0u8; 8]);
        assert_eq!(cell.get::<NaiveDate>().unwrap_err().kind(), ErrorKind::SizeMismatch);
        let cell = Cell::binary(PgType::Timestamp, vec![0u8; 4]);
        assert_eq!(cell.get::<NaiveDateTime>().unwrap_err().kind(), ErrorKind::SizeMismatch);
    }

    #[test]
    fn test_date_out_of_chrono_range() {
        let cell = Cell::binary(PgType::Date, (i32::MAX - 1).to_be_bytes().to_vec());
        assert_eq!(cell.get::<NaiveDate>().unwrap_err().kind(), ErrorKind::InvalidData);
    }
}
