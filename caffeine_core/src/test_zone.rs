//! A time zone with one spring-forward and one fall-back transition.
//!
//! Standard time is UTC+0 and summer time is UTC+1, switching at 01:00 UTC
//! on 2026-03-29 and 2026-10-25. Local 01:00-02:00 does not exist on the
//! first date and occurs twice on the second.

use chrono::{Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SummerTimeZone;

fn offset(seconds: i32) -> FixedOffset {
    FixedOffset::east_opt(seconds).unwrap()
}

fn summer_starts() -> NaiveDateTime {
    Utc.with_ymd_and_hms(2026, 3, 29, 1, 0, 0).unwrap().naive_utc()
}

fn summer_ends() -> NaiveDateTime {
    Utc.with_ymd_and_hms(2026, 10, 25, 1, 0, 0).unwrap().naive_utc()
}

impl TimeZone for SummerTimeZone {
    type Offset = FixedOffset;

    fn from_offset(_offset: &FixedOffset) -> Self {
        SummerTimeZone
    }

    fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
        self.offset_from_local_datetime(&local.and_hms_opt(0, 0, 0).unwrap())
    }

    fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
        let standard = offset(0);
        let summer = offset(3600);
        let standard_fits = self.offset_from_utc_datetime(local) == standard;
        let summer_fits =
            self.offset_from_utc_datetime(&(*local - Duration::hours(1))) == summer;

        match (summer_fits, standard_fits) {
            // The summer reading is the earlier instant
            (true, true) => LocalResult::Ambiguous(summer, standard),
            (true, false) => LocalResult::Single(summer),
            (false, true) => LocalResult::Single(standard),
            (false, false) => LocalResult::None,
        }
    }

    fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
        self.offset_from_utc_datetime(&utc.and_hms_opt(0, 0, 0).unwrap())
    }

    fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
        if *utc >= summer_starts() && *utc < summer_ends() {
            offset(3600)
        } else {
            offset(0)
        }
    }
}

#[test]
fn test_zone_transitions() {
    let gap = NaiveDate::from_ymd_opt(2026, 3, 29).unwrap().and_hms_opt(1, 30, 0).unwrap();
    assert_eq!(SummerTimeZone.offset_from_local_datetime(&gap), LocalResult::None);

    let overlap = NaiveDate::from_ymd_opt(2026, 10, 25).unwrap().and_hms_opt(1, 30, 0).unwrap();
    assert!(matches!(
        SummerTimeZone.offset_from_local_datetime(&overlap),
        LocalResult::Ambiguous(_, _)
    ));
}
