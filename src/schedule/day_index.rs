use time::{OffsetDateTime, PrimitiveDateTime};

const NANOS_PER_DAY: i128 = 24 * 60 * 60 * 1_000_000_000;

/// Whole days elapsed since `registered`, rounded towards negative infinity.
///
/// Both timestamps are naive UTC. A registration in the future yields a
/// negative index; callers decide what that means.
pub fn day_index(registered: PrimitiveDateTime, now: PrimitiveDateTime) -> i64 {
    let days = (now - registered).whole_nanoseconds().div_euclid(NANOS_PER_DAY);
    days as i64
}

/// Current time as a naive UTC timestamp, the form stored in `users.start_date`.
pub fn utc_now() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}
