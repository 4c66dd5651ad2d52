pub mod appointment;
pub mod order;
pub mod payment;
pub mod session;

pub use appointment::{Appointment, AppointmentStatus, StatusStyle, APPOINTMENT_DURATION_MINUTES};
pub use order::OrderSummary;
pub use payment::{InstallmentPercentage, PaymentRequest, PaymentTerms, MIN_GATEWAY_AMOUNT};
pub use session::PendingGatewaySession;
