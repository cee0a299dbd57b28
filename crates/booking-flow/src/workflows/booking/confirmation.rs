use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::payment::short_code;
use super::record::JobRecord;

/// Issued when payment succeeds. Job ID and OTP are display-only identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub job_id: String,
    pub otp: String,
    pub payment_reference: String,
    pub confirmed_at: DateTime<Utc>,
    pub record: JobRecord,
}

impl BookingConfirmation {
    pub(crate) fn issue(record: JobRecord, payment_reference: String) -> Self {
        Self {
            job_id: format!("JOB-{}", short_code()),
            otp: generate_otp(),
            payment_reference,
            confirmed_at: Utc::now(),
            record,
        }
    }
}

fn generate_otp() -> String {
    let value = (Uuid::new_v4().as_u128() as u64) % 1_000_000;
    format!("{value:06}")
}

/// Receives confirmed bookings for documentation (job sheets, labels).
pub trait DocumentSink: Send + Sync {
    fn publish(&self, confirmation: &BookingConfirmation) -> Result<(), DocumentError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("document generator unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_identifiers_have_display_shapes() {
        let confirmation = BookingConfirmation::issue(JobRecord::default(), "PAY-1".to_string());
        assert!(confirmation.job_id.starts_with("JOB-"));
        assert_eq!(confirmation.job_id.len(), 12);
        assert_eq!(confirmation.otp.len(), 6);
        assert!(confirmation.otp.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(confirmation.payment_reference, "PAY-1");
    }
}
