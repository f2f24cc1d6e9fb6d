//! Frozen clock for service tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::{Clock, MockClock};

/// 2026-03-14 09:30 UTC.
pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

/// A clock stuck at [`fixture_timestamp`].
pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    let now = fixture_timestamp();
    let mut clock = MockClock::new();
    clock.expect_utc().return_const(now);
    clock.expect_local().return_const(now.with_timezone(&Local));
    Arc::new(clock)
}
