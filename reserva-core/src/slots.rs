//! Bookable time slots, including locally synthesized multi-day and
//! order-now slots.

use jiff::civil::Date;
use jiff::tz::TimeZone;
use jiff::{Timestamp, Zoned};
use serde::{Deserialize, Serialize};

/// Local clock hour at which a synthesized multi-day booking starts.
pub const MULTI_DAY_START_HOUR: i8 = 9;
/// Local clock hour at which a synthesized multi-day booking ends.
pub const MULTI_DAY_END_HOUR: i8 = 17;

/// A concrete bookable interval in unix seconds.
///
/// Server-sourced slots cover a single day; multi-day slots are synthesized
/// locally and flagged so review and cart rendering can branch on the shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub from: i64,
    pub to: i64,
    pub time_text: String,
    #[serde(default)]
    pub is_multi_day: bool,
}

impl Slot {
    /// Build a display slot from a raw `[from, to)` window.
    #[must_use]
    pub fn from_window(from: i64, to: i64, tz: &TimeZone) -> Self {
        Self {
            from,
            to,
            time_text: format_time_range(from, to, tz),
            is_multi_day: false,
        }
    }
}

fn zoned(seconds: i64, tz: &TimeZone) -> Zoned {
    Timestamp::from_second(seconds)
        .unwrap_or(Timestamp::UNIX_EPOCH)
        .to_zoned(tz.clone())
}

/// Civil date a unix timestamp falls on in the given zone.
#[must_use]
pub fn day_of(seconds: i64, tz: &TimeZone) -> Date {
    zoned(seconds, tz).date()
}

/// Render a `[from, to)` pair as a clock range in the given zone,
/// e.g. `09:00 – 17:00`.
#[must_use]
pub fn format_time_range(from: i64, to: i64, tz: &TimeZone) -> String {
    format!(
        "{} – {}",
        zoned(from, tz).strftime("%H:%M"),
        zoned(to, tz).strftime("%H:%M")
    )
}

/// Synthesize the single slot covering a complete `[start, end]` date range.
///
/// The booking window is fixed at 09:00 on the start day through 17:00 on
/// the end day, local to the selected zone. Returns `None` only when the
/// civil times cannot be resolved in the zone.
#[must_use]
pub fn multi_day_slot(start: Date, end: Date, tz: &TimeZone) -> Option<Slot> {
    let from = start
        .at(MULTI_DAY_START_HOUR, 0, 0, 0)
        .to_zoned(tz.clone())
        .ok()?;
    let to = end.at(MULTI_DAY_END_HOUR, 0, 0, 0).to_zoned(tz.clone()).ok()?;

    Some(Slot {
        from: from.timestamp().as_second(),
        to: to.timestamp().as_second(),
        time_text: format!(
            "{:02}:00 – {:02}:00 daily",
            MULTI_DAY_START_HOUR, MULTI_DAY_END_HOUR
        ),
        is_multi_day: true,
    })
}

/// Synthesize the immediate slot used by the order-now method: it starts at
/// the current instant and covers the service's configured total duration.
#[must_use]
pub fn order_slot(duration_seconds: i64, tz: &TimeZone) -> Slot {
    let from = Timestamp::now().as_second();
    let to = from + duration_seconds.max(1);
    Slot::from_window(from, to, tz)
}
