//! Calendar-day boundaries for "today" statistics and date filtering

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Offset, TimeZone, Utc};

/// Midnight at the start of `now`'s calendar day, in `now`'s time zone,
/// expressed in UTC
pub fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    match now.timezone().from_local_datetime(&midnight).earliest() {
        Some(start) => start.with_timezone(&Utc),
        // Midnight skipped by a DST jump: apply the current offset
        None => {
            let offset_secs = now.offset().fix().local_minus_utc();
            Utc.from_utc_datetime(&midnight) - Duration::seconds(i64::from(offset_secs))
        }
    }
}

/// Calendar date of a UTC timestamp as seen from `tz`
pub fn local_date<Tz: TimeZone>(at: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    at.with_timezone(tz).date_naive()
}
