//! Calendar event overlay.
//!
//! Maps an external provider's event list onto calendar days for display.
//! Matching is exact date equality on the provider's own `YYYY-MM-DD` values
//! with no timezone normalization beyond what the provider already returns.
//! This module performs no money computation.

use chrono::NaiveDate;
use shared::{CalendarEvent, Month};

/// Events falling on a specific date.
pub fn events_for_date(all_events: &[CalendarEvent], date: NaiveDate) -> Vec<CalendarEvent> {
    all_events
        .iter()
        .filter(|event| event.start.as_date() == Some(date))
        .cloned()
        .collect()
}

/// Events grouped per day of a month, one entry per day in order. Days
/// without events get an empty list.
pub fn overlay_month(all_events: &[CalendarEvent], month: Month) -> Vec<(NaiveDate, Vec<CalendarEvent>)> {
    let mut days = Vec::with_capacity(month.days_in_month() as usize);
    let mut date = month.first_day();
    while month.contains(date) {
        days.push((date, events_for_date(all_events, date)));
        date = match date.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    days
}
