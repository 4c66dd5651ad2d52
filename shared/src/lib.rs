use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Test-drive appointment as served to the dashboard list views.
///
/// Timestamps are RFC 3339 strings on the wire; the backend owns the parsed
/// representation. The status arrives pre-resolved to its (color, label)
/// tag, so unrecognized backend statuses still render with the neutral
/// style instead of breaking the list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    /// Start of the test drive (RFC 3339)
    pub scheduled_start: String,
    /// Derived end of the test drive (RFC 3339); never stored independently
    pub scheduled_end: String,
    /// Status tag color for list rendering
    pub color: String,
    /// Status tag label for list rendering
    pub status_label: String,
    pub customer_label: String,
    pub vehicle_label: String,
    pub notes: Option<String>,
}

/// Calendar view mode; doubles as the state of the navigation machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarViewMode {
    Day,
    Week,
    Month,
    Year,
}

/// Current calendar navigation state
///
/// The visible range is always derived from these two fields, never stored,
/// so the two can't drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalendarViewState {
    pub reference_date: NaiveDate,
    pub view_mode: CalendarViewMode,
}

/// Navigation action requested by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationAction {
    /// Switch view mode, keeping the reference date
    SelectMode,
    /// Shift the reference date back by one unit of the current mode
    Previous,
    /// Shift the reference date forward by one unit of the current mode
    Next,
    /// Reset the reference date to the current date, keeping the mode
    Today,
    /// Pick a specific date; drills month into day and year into month
    SelectDate,
}

/// Request to advance the calendar navigation state machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarNavigationRequest {
    pub action: NavigationAction,
    /// Required for `SelectMode`
    pub mode: Option<CalendarViewMode>,
    /// Required for `SelectDate`
    pub date: Option<NaiveDate>,
}

/// Navigation state plus the range it makes visible
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarViewResponse {
    pub state: CalendarViewState,
    /// First visible date (inclusive)
    pub visible_start: NaiveDate,
    /// Last visible date (inclusive)
    pub visible_end: NaiveDate,
}

/// A single appointment card placed on the day or week grid
///
/// Rows are CSS-grid style indices: row 1 is the header, rows 2.. are
/// half-hour slots within the operating window. `column` is 0-based from the
/// left-most visible day (always 0 in day view).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCard {
    pub appointment_id: String,
    pub column: u32,
    pub row_start: u32,
    pub row_end: u32,
    /// Status color name for the card
    pub color: String,
    /// Status label for the card
    pub status_label: String,
    pub customer_label: String,
    pub vehicle_label: String,
}

/// Week grid: seven Monday-anchored day columns of half-hour rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekGrid {
    pub week_start: NaiveDate,
    /// The seven visible dates, left to right
    pub days: Vec<NaiveDate>,
    /// Total grid rows including the header row
    pub row_count: u32,
    pub cards: Vec<GridCard>,
}

/// Day grid: a single day column of half-hour rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayGrid {
    pub date: NaiveDate,
    /// Total grid rows including the header row
    pub row_count: u32,
    pub cards: Vec<GridCard>,
}

/// Type of month summary cell for explicit rendering logic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonthCellType {
    /// Empty padding day before the start of the month
    PaddingBefore,
    /// Actual day within the month
    MonthDay,
    /// Empty padding day after the end of the month
    PaddingAfter,
}

/// A single cell of the month summary grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthDayCell {
    /// Day of month; 0 for padding cells
    pub day: u32,
    pub appointment_count: u32,
    pub cell_type: MonthCellType,
}

/// Month view: per-day appointment counts, Monday-anchored padding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthSummary {
    pub month: u32,
    pub year: u32,
    /// Weekday of the 1st, 0 = Monday .. 6 = Sunday
    pub first_weekday: u32,
    pub days: Vec<MonthDayCell>,
}

/// One month cell of the year summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearMonthCell {
    pub month: u32,
    /// Human-readable month name
    pub label: String,
    pub appointment_count: u32,
}

/// Year view: per-month appointment counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearSummary {
    pub year: u32,
    pub months: Vec<YearMonthCell>,
}

/// How a payment is collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// In-app settlement that completes without leaving the page
    Cash,
    /// Redirect to the external payment gateway and back
    GatewayRedirect,
}

/// Whether a payment settles the order in full or in part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Full,
    Installment,
}

/// Order payment status as understood by the dealer platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Paid,
    Partial,
}

/// Dashboard role of the person initiating an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Admin,
    EvmStaff,
    DealerManager,
    DealerStaff,
}

impl StaffRole {
    /// Debt records are only created for installment payments taken by the
    /// customer-facing staff role.
    pub fn creates_debt_on_installment(self) -> bool {
        matches!(self, StaffRole::DealerStaff)
    }

    /// Order-list destination this role is sent back to after a payment flow
    pub fn orders_destination(self) -> &'static str {
        match self {
            StaffRole::Admin => "/admin/orders",
            StaffRole::EvmStaff => "/evm/orders",
            StaffRole::DealerManager => "/dealer/orders",
            StaffRole::DealerStaff => "/dealer/orders",
        }
    }
}

/// Request to submit a payment for an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSubmitRequest {
    pub order_id: String,
    pub payment_method: PaymentMethod,
    pub payment_type: PaymentType,
    /// Required when `payment_type` is `Installment`; one of 20..90 in steps of 10
    pub installment_percentage: Option<u8>,
    pub initiating_role: StaffRole,
}

/// Result of a payment submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PaymentSubmitResponse {
    /// Cash path completed (possibly with reconciliation warnings)
    Settled {
        payment_id: String,
        order_status: OrderStatus,
        debt_id: Option<String>,
        warnings: Vec<String>,
    },
    /// Gateway path: the browser must navigate to `pay_url`
    RedirectToGateway { pay_url: String },
}

/// What the gateway return endpoint concluded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayReturnStatus {
    /// Gateway reported success and the order was reconciled
    Completed,
    /// Gateway reported failure or cancellation
    Failed,
    /// No gateway payment was in progress; safe no-op
    NotInProgress,
}

/// Response of the gateway return endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayReturnResponse {
    pub status: GatewayReturnStatus,
    pub order_status: Option<OrderStatus>,
    pub debt_id: Option<String>,
    pub warnings: Vec<String>,
    /// Where the dashboard should send the user next
    pub redirect_to: String,
}
