//! Domain model for a test-drive appointment.

use chrono::{DateTime, Duration, FixedOffset};

/// Fixed length of a test-drive slot, in minutes. The end of an appointment
/// is always derived from its start; it is never stored.
pub const APPOINTMENT_DURATION_MINUTES: i64 = 60;

/// Appointment lifecycle status.
///
/// `Unknown` carries any status string the dealer platform sends that this
/// service does not recognize; it renders with the neutral style instead of
/// being dropped or crashing the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    Unknown,
}

/// Color + label pair used for grid cards and list tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusStyle {
    pub color: &'static str,
    pub label: &'static str,
}

impl AppointmentStatus {
    /// Parse a wire status string; anything unrecognized maps to `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Scheduled" => AppointmentStatus::Scheduled,
            "Confirmed" => AppointmentStatus::Confirmed,
            "Completed" => AppointmentStatus::Completed,
            "Cancelled" => AppointmentStatus::Cancelled,
            _ => AppointmentStatus::Unknown,
        }
    }

    /// Style for this status. Total: every variant, including `Unknown`,
    /// maps to exactly one (color, label) pair.
    pub fn style(self) -> StatusStyle {
        match self {
            AppointmentStatus::Scheduled => StatusStyle {
                color: "blue",
                label: "Scheduled",
            },
            AppointmentStatus::Confirmed => StatusStyle {
                color: "green",
                label: "Confirmed",
            },
            AppointmentStatus::Completed => StatusStyle {
                color: "gray",
                label: "Completed",
            },
            AppointmentStatus::Cancelled => StatusStyle {
                color: "red",
                label: "Cancelled",
            },
            AppointmentStatus::Unknown => StatusStyle {
                color: "default",
                label: "Unknown",
            },
        }
    }
}

/// A scheduled test drive, read-only within this service
#[derive(Debug, Clone, PartialEq)]
pub struct Appointment {
    pub id: String,
    pub scheduled_start: DateTime<FixedOffset>,
    pub status: AppointmentStatus,
    pub customer_label: String,
    pub vehicle_label: String,
    pub notes: Option<String>,
}

impl Appointment {
    /// End of the appointment: start plus the fixed slot duration.
    pub fn scheduled_end(&self) -> DateTime<FixedOffset> {
        self.scheduled_start + Duration::minutes(APPOINTMENT_DURATION_MINUTES)
    }
}
