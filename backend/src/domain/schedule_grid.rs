//! Time-slot grid math for the day and week schedule views.
//!
//! The visible day spans the fixed operating window 08:00–18:00, divided
//! into half-hour rows. Row 1 is the header; rows 2..=22 hold the slots.
//! Week columns are the seven days of a Monday-anchored week. The anchor
//! is fixed here rather than taken from the runtime locale, so the grid
//! never silently shifts between machines.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Timelike};
use shared::GridCard;

use crate::domain::models::Appointment;

/// First hour of the operating window (inclusive)
pub const START_HOUR: u32 = 8;
/// Last hour of the operating window (exclusive)
pub const END_HOUR: u32 = 18;
/// First grid row holding schedule content; row 1 is reserved for the header
pub const FIRST_SLOT_ROW: u32 = 2;

/// Number of half-hour slot rows in the operating window
pub fn slot_row_count() -> u32 {
    (END_HOUR - START_HOUR) * 2
}

/// Largest valid `row_end` value (the grid line after the last slot)
pub fn last_grid_row() -> u32 {
    FIRST_SLOT_ROW + slot_row_count()
}

fn base_row(hour: u32) -> u32 {
    (hour - START_HOUR) * 2 + FIRST_SLOT_ROW
}

fn window_open() -> NaiveTime {
    NaiveTime::from_hms_opt(START_HOUR, 0, 0).expect("valid operating window open")
}

fn window_close() -> NaiveTime {
    NaiveTime::from_hms_opt(END_HOUR, 0, 0).expect("valid operating window close")
}

/// Grid row a card starting at `t` begins on.
///
/// Times outside the operating window clamp to the nearest edge instead of
/// producing out-of-range rows.
pub fn row_start(t: NaiveTime) -> u32 {
    if t.hour() < START_HOUR {
        return FIRST_SLOT_ROW;
    }
    if t.hour() >= END_HOUR {
        return last_grid_row() - 1;
    }
    let base = base_row(t.hour());
    if t.minute() < 30 {
        base
    } else {
        base + 1
    }
}

/// Grid row a card ending at `t` stops before.
///
/// A time on the hour ends at its base row, within the first half hour at
/// the next row, and past it one further. Out-of-window times clamp.
pub fn row_end(t: NaiveTime) -> u32 {
    if t.hour() < START_HOUR {
        return FIRST_SLOT_ROW;
    }
    if t.hour() >= END_HOUR {
        return last_grid_row();
    }
    let base = base_row(t.hour());
    match t.minute() {
        0 => base,
        m if m <= 30 => base + 1,
        _ => base + 2,
    }
}

/// Monday of the week containing `date`
pub fn week_start_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// The seven visible dates of the week starting at `week_start`
pub fn week_days(week_start: NaiveDate) -> Vec<NaiveDate> {
    (0..7).map(|offset| week_start + Duration::days(offset)).collect()
}

/// Whether any part of the appointment falls inside the operating window
/// of its own day.
fn is_visible(appointment: &Appointment) -> bool {
    let start = appointment.scheduled_start.time();
    let end = appointment.scheduled_end().time();
    // An appointment long enough to cross midnight would start well after
    // the window closes, so comparing times within one day is sufficient.
    start < window_close() && end > window_open()
}

fn card_for(appointment: &Appointment, column: u32) -> GridCard {
    let start = row_start(appointment.scheduled_start.time());
    let end = row_end(appointment.scheduled_end().time());
    // Clamping can collapse a span that pokes out of the window; a card is
    // never shorter than one slot.
    let end = end.max(start + 1);
    let style = appointment.status.style();
    GridCard {
        appointment_id: appointment.id.clone(),
        column,
        row_start: start,
        row_end: end,
        color: style.color.to_string(),
        status_label: style.label.to_string(),
        customer_label: appointment.customer_label.clone(),
        vehicle_label: appointment.vehicle_label.clone(),
    }
}

/// Place appointments onto the week grid starting at `week_start`.
///
/// Appointments outside the seven visible days, or entirely outside the
/// operating window, are omitted. An empty input yields an empty grid.
pub fn week_cards(appointments: &[Appointment], week_start: NaiveDate) -> Vec<GridCard> {
    let days = week_days(week_start);
    appointments
        .iter()
        .filter(|appointment| is_visible(appointment))
        .filter_map(|appointment| {
            let date = appointment.scheduled_start.date_naive();
            let column = days.iter().position(|day| *day == date)?;
            Some(card_for(appointment, column as u32))
        })
        .collect()
}

/// Place appointments of a single day onto the day grid (column 0).
pub fn day_cards(appointments: &[Appointment], date: NaiveDate) -> Vec<GridCard> {
    appointments
        .iter()
        .filter(|appointment| appointment.scheduled_start.date_naive() == date)
        .filter(|appointment| is_visible(appointment))
        .map(|appointment| card_for(appointment, 0))
        .collect()
}
