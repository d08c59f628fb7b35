use chrono::NaiveDate;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RegistrationsRow {
    pub registration_id: String,
    pub user_id: String,
    pub student_id: String,
    pub parent_id: Option<String>,
    pub activity_id: String,
    pub status: String,
    pub payment_status: String,
    pub attendance_status: String,
    pub notes: Option<String>,
    pub registered_at: String,
}

/// Registration joined with the schedule fields of its activity, as needed by
/// cancellation (start-date cutoff) and the my-registrations view.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RegistrationWithActivityRow {
    pub registration_id: String,
    pub user_id: String,
    pub student_id: String,
    pub parent_id: Option<String>,
    pub activity_id: String,
    pub status: String,
    pub payment_status: String,
    pub title: String,
    pub start_date: NaiveDate,
    pub registered_at: String,
}

/// Pending -> Approved | Cancelled | Rejected; Approved -> Cancelled;
/// Rejected and Cancelled are terminal. Rows are never deleted: cancel and
/// decline are status transitions so enrollment history survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl RegistrationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "Pending",
            RegistrationStatus::Approved => "Approved",
            RegistrationStatus::Rejected => "Rejected",
            RegistrationStatus::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationPaymentStatus {
    NotApplicable,
    Unpaid,
    Paid,
    RefundPending,
    Refunded,
}

impl RegistrationPaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RegistrationPaymentStatus::NotApplicable => "N/A",
            RegistrationPaymentStatus::Unpaid => "Unpaid",
            RegistrationPaymentStatus::Paid => "Paid",
            RegistrationPaymentStatus::RefundPending => "RefundPending",
            RegistrationPaymentStatus::Refunded => "Refunded",
        }
    }
}
