//! Calendar domain logic for the dealer dashboard.
//!
//! This module owns the calendar navigation state machine and assembles the
//! day/week/month/year views from an appointment list. The grid placement
//! math itself lives in [`crate::domain::schedule_grid`]; the REST layer
//! only handles transport concerns.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{Datelike, Duration, Local, Months, NaiveDate};
use log::{info, warn};
use shared::{
    CalendarNavigationRequest, CalendarViewMode, CalendarViewResponse, CalendarViewState, DayGrid,
    MonthCellType, MonthDayCell, MonthSummary, NavigationAction, WeekGrid, YearMonthCell,
    YearSummary,
};

use crate::clients::DealerApi;
use crate::domain::models::Appointment;
use crate::domain::schedule_grid;

/// Calendar service handling navigation state and view assembly
#[derive(Clone)]
pub struct CalendarService {
    /// Current navigation state; kept in memory, never persisted
    view_state: Arc<Mutex<CalendarViewState>>,
}

impl CalendarService {
    pub fn new() -> Self {
        let initial = CalendarViewState {
            reference_date: Local::now().date_naive(),
            view_mode: CalendarViewMode::Week,
        };
        Self {
            view_state: Arc::new(Mutex::new(initial)),
        }
    }

    /// Current navigation state
    pub fn view_state(&self) -> CalendarViewState {
        *self.view_state.lock().unwrap()
    }

    /// Navigation state plus the derived visible range
    pub fn view_response(&self) -> CalendarViewResponse {
        let state = self.view_state();
        let (visible_start, visible_end) = Self::visible_range(&state);
        CalendarViewResponse {
            state,
            visible_start,
            visible_end,
        }
    }

    /// Advance the navigation state machine by one user action.
    ///
    /// Mode selection keeps the reference date; previous/next shift it by
    /// one unit of the current mode; today resets it; a date pick in month
    /// or year view drills into the next finer mode.
    pub fn navigate(
        &self,
        request: CalendarNavigationRequest,
    ) -> Result<CalendarViewResponse, String> {
        let mut state = self.view_state.lock().unwrap();
        match request.action {
            NavigationAction::SelectMode => {
                let mode = request.mode.ok_or("select_mode requires a mode")?;
                state.view_mode = mode;
            }
            NavigationAction::Previous => {
                let shifted = Self::shifted(&state, -1);
                state.reference_date = shifted;
            }
            NavigationAction::Next => {
                let shifted = Self::shifted(&state, 1);
                state.reference_date = shifted;
            }
            NavigationAction::Today => {
                state.reference_date = Local::now().date_naive();
            }
            NavigationAction::SelectDate => {
                let date = request.date.ok_or("select_date requires a date")?;
                let drilled = match state.view_mode {
                    CalendarViewMode::Month => CalendarViewMode::Day,
                    CalendarViewMode::Year => CalendarViewMode::Month,
                    mode => mode,
                };
                state.view_mode = drilled;
                state.reference_date = date;
            }
        }
        let state = *state;
        info!(
            "Calendar navigation: {:?} -> {:?} {}",
            request.action, state.view_mode, state.reference_date
        );
        let (visible_start, visible_end) = Self::visible_range(&state);
        Ok(CalendarViewResponse {
            state,
            visible_start,
            visible_end,
        })
    }

    /// Reference date shifted by `steps` units of the current view mode
    fn shifted(state: &CalendarViewState, steps: i64) -> NaiveDate {
        let date = state.reference_date;
        match state.view_mode {
            CalendarViewMode::Day => date + Duration::days(steps),
            CalendarViewMode::Week => date + Duration::days(7 * steps),
            CalendarViewMode::Month => Self::shift_months(date, steps),
            CalendarViewMode::Year => Self::shift_months(date, 12 * steps),
        }
    }

    /// Month arithmetic that clamps the day-of-month into the target month
    /// (Jan 31 -> Feb 28) instead of overflowing.
    fn shift_months(date: NaiveDate, months: i64) -> NaiveDate {
        let shifted = if months >= 0 {
            date.checked_add_months(Months::new(months as u32))
        } else {
            date.checked_sub_months(Months::new(months.unsigned_abs() as u32))
        };
        shifted.unwrap_or(date)
    }

    /// Inclusive date range the current state makes visible.
    ///
    /// Always recomputed from the state, never stored.
    pub fn visible_range(state: &CalendarViewState) -> (NaiveDate, NaiveDate) {
        let date = state.reference_date;
        match state.view_mode {
            CalendarViewMode::Day => (date, date),
            CalendarViewMode::Week => {
                let start = schedule_grid::week_start_of(date);
                (start, start + Duration::days(6))
            }
            CalendarViewMode::Month => {
                let first = date.with_day(1).unwrap_or(date);
                let last_day = Self::days_in_month(date.month(), date.year() as u32);
                let last = date.with_day(last_day).unwrap_or(date);
                (first, last)
            }
            CalendarViewMode::Year => {
                let first = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);
                let last = NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date);
                (first, last)
            }
        }
    }

    /// Build the week grid for the week containing `week_of`.
    pub fn week_grid(&self, week_of: NaiveDate, appointments: &[Appointment]) -> WeekGrid {
        let week_start = schedule_grid::week_start_of(week_of);
        WeekGrid {
            week_start,
            days: schedule_grid::week_days(week_start),
            row_count: schedule_grid::last_grid_row(),
            cards: schedule_grid::week_cards(appointments, week_start),
        }
    }

    /// Build the day grid for `date`.
    pub fn day_grid(&self, date: NaiveDate, appointments: &[Appointment]) -> DayGrid {
        DayGrid {
            date,
            row_count: schedule_grid::last_grid_row(),
            cards: schedule_grid::day_cards(appointments, date),
        }
    }

    /// Appointment list for the dashboard's list view, sorted by start
    /// time, each entry carrying its resolved status tag.
    pub fn appointment_list(&self, appointments: &[Appointment]) -> Vec<shared::Appointment> {
        let mut sorted: Vec<&Appointment> = appointments.iter().collect();
        sorted.sort_by_key(|appointment| appointment.scheduled_start);
        sorted
            .into_iter()
            .map(|appointment| {
                let style = appointment.status.style();
                shared::Appointment {
                    id: appointment.id.clone(),
                    scheduled_start: appointment.scheduled_start.to_rfc3339(),
                    scheduled_end: appointment.scheduled_end().to_rfc3339(),
                    color: style.color.to_string(),
                    status_label: style.label.to_string(),
                    customer_label: appointment.customer_label.clone(),
                    vehicle_label: appointment.vehicle_label.clone(),
                    notes: appointment.notes.clone(),
                }
            })
            .collect()
    }

    /// Appointment list for a dealer, treating a fetch failure as an empty
    /// list.
    pub async fn appointment_list_for_dealer(
        &self,
        api: &dyn DealerApi,
        dealer_id: &str,
    ) -> Vec<shared::Appointment> {
        let appointments = Self::appointments_or_empty(api, dealer_id).await;
        self.appointment_list(&appointments)
    }

    /// Build the month summary: per-day appointment counts with padding
    /// cells so the first week aligns under a Monday-anchored header.
    ///
    /// All statuses count, including cancelled ones; styling is a concern
    /// of the day/week grids.
    pub fn month_summary(
        &self,
        month: u32,
        year: u32,
        appointments: &[Appointment],
    ) -> MonthSummary {
        let days_in_month = Self::days_in_month(month, year);
        let first_weekday = Self::first_weekday_of_month(month, year);
        let counts = Self::count_by_day(month, year, appointments);

        let mut days = Vec::new();
        for _ in 0..first_weekday {
            days.push(MonthDayCell {
                day: 0,
                appointment_count: 0,
                cell_type: MonthCellType::PaddingBefore,
            });
        }
        for day in 1..=days_in_month {
            days.push(MonthDayCell {
                day,
                appointment_count: counts.get(&day).copied().unwrap_or(0),
                cell_type: MonthCellType::MonthDay,
            });
        }
        while days.len() % 7 != 0 {
            days.push(MonthDayCell {
                day: 0,
                appointment_count: 0,
                cell_type: MonthCellType::PaddingAfter,
            });
        }

        MonthSummary {
            month,
            year,
            first_weekday,
            days,
        }
    }

    /// Build the year summary: per-month appointment counts.
    pub fn year_summary(&self, year: u32, appointments: &[Appointment]) -> YearSummary {
        let mut counts: HashMap<u32, u32> = HashMap::new();
        for appointment in appointments {
            let date = appointment.scheduled_start.date_naive();
            if date.year() as u32 == year {
                *counts.entry(date.month()).or_insert(0) += 1;
            }
        }
        let months = (1..=12)
            .map(|month| YearMonthCell {
                month,
                label: Self::month_name(month).to_string(),
                appointment_count: counts.get(&month).copied().unwrap_or(0),
            })
            .collect();
        YearSummary { year, months }
    }

    /// Week grid for a dealer, treating a fetch failure as an empty list.
    pub async fn week_grid_for_dealer(
        &self,
        api: &dyn DealerApi,
        dealer_id: &str,
        week_of: NaiveDate,
    ) -> WeekGrid {
        let appointments = Self::appointments_or_empty(api, dealer_id).await;
        self.week_grid(week_of, &appointments)
    }

    /// Day grid for a dealer, treating a fetch failure as an empty list.
    pub async fn day_grid_for_dealer(
        &self,
        api: &dyn DealerApi,
        dealer_id: &str,
        date: NaiveDate,
    ) -> DayGrid {
        let appointments = Self::appointments_or_empty(api, dealer_id).await;
        self.day_grid(date, &appointments)
    }

    /// Month summary for a dealer, treating a fetch failure as an empty list.
    pub async fn month_summary_for_dealer(
        &self,
        api: &dyn DealerApi,
        dealer_id: &str,
        month: u32,
        year: u32,
    ) -> MonthSummary {
        let appointments = Self::appointments_or_empty(api, dealer_id).await;
        self.month_summary(month, year, &appointments)
    }

    /// Year summary for a dealer, treating a fetch failure as an empty list.
    pub async fn year_summary_for_dealer(
        &self,
        api: &dyn DealerApi,
        dealer_id: &str,
        year: u32,
    ) -> YearSummary {
        let appointments = Self::appointments_or_empty(api, dealer_id).await;
        self.year_summary(year, &appointments)
    }

    /// The grid renders empty rather than failing when the appointment
    /// source is unavailable.
    async fn appointments_or_empty(api: &dyn DealerApi, dealer_id: &str) -> Vec<Appointment> {
        match api.fetch_appointments(dealer_id).await {
            Ok(appointments) => appointments,
            Err(err) => {
                warn!(
                    "Failed to fetch appointments for dealer {}: {:#}",
                    dealer_id, err
                );
                Vec::new()
            }
        }
    }

    fn count_by_day(month: u32, year: u32, appointments: &[Appointment]) -> HashMap<u32, u32> {
        let mut counts: HashMap<u32, u32> = HashMap::new();
        for appointment in appointments {
            let date = appointment.scheduled_start.date_naive();
            if date.month() == month && date.year() as u32 == year {
                *counts.entry(date.day()).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Number of days in a given month and year
    pub fn days_in_month(month: u32, year: u32) -> u32 {
        match month {
            2 => {
                if Self::is_leap_year(year) {
                    29
                } else {
                    28
                }
            }
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        }
    }

    /// Whether a year is a leap year
    pub fn is_leap_year(year: u32) -> bool {
        year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
    }

    /// Weekday of the first of the month, 0 = Monday .. 6 = Sunday
    fn first_weekday_of_month(month: u32, year: u32) -> u32 {
        match NaiveDate::from_ymd_opt(year as i32, month, 1) {
            Some(date) => date.weekday().num_days_from_monday(),
            None => 0,
        }
    }

    /// Human-readable name for a month number
    pub fn month_name(month: u32) -> &'static str {
        match month {
            1 => "January",
            2 => "February",
            3 => "March",
            4 => "April",
            5 => "May",
            6 => "June",
            7 => "July",
            8 => "August",
            9 => "September",
            10 => "October",
            11 => "November",
            12 => "December",
            _ => "Invalid Month",
        }
    }
}

impl Default for CalendarService {
    fn default() -> Self {
        Self::new()
    }
}
