#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PaymentsRow {
    pub payment_id: String,
    pub registration_id: String,
    pub amount: i64,
    pub payment_status: String,
    pub transaction_id: Option<String>,
    pub payment_method: Option<String>,
    pub paid_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Completed => "Completed",
            PaymentStatus::Failed => "Failed",
            PaymentStatus::Refunded => "Refunded",
        }
    }
}
