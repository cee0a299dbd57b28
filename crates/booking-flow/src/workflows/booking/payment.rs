use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use super::domain::JobType;

/// What the flow hands to the gateway when the user pays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub job_type: JobType,
    pub vehicle_key: Option<String>,
    pub attempt: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PaymentOutcome {
    Approved { reference: String },
    Declined { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentError {
    #[error("payment gateway unavailable: {0}")]
    Unavailable(String),
}

/// Charge hook so the flow can be driven without a real processor.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, request: PaymentRequest) -> Result<PaymentOutcome, PaymentError>;
}

/// Simulated processor: waits `delay`, then approves with probability `success_rate`.
#[derive(Debug, Clone)]
pub struct MockPaymentGateway {
    delay: Duration,
    success_rate: f64,
}

impl MockPaymentGateway {
    pub fn new(delay: Duration, success_rate: f64) -> Self {
        Self {
            delay,
            success_rate: success_rate.clamp(0.0, 1.0),
        }
    }

    pub fn always_approve() -> Self {
        Self::new(Duration::ZERO, 1.0)
    }

    pub fn always_decline() -> Self {
        Self::new(Duration::ZERO, 0.0)
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn charge(&self, request: PaymentRequest) -> Result<PaymentOutcome, PaymentError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let draw = unit_draw();
        debug!(attempt = request.attempt, draw, "simulated payment settled");

        if draw < self.success_rate {
            Ok(PaymentOutcome::Approved {
                reference: format!("PAY-{}", short_code()),
            })
        } else {
            Ok(PaymentOutcome::Declined {
                reason: "card declined by issuer".to_string(),
            })
        }
    }
}

/// Uniform value in `[0, 1)` from the random bits of a v4 UUID.
fn unit_draw() -> f64 {
    const RANDOM_BITS: u32 = 62;
    let bits = (Uuid::new_v4().as_u128() as u64) & ((1u64 << RANDOM_BITS) - 1);
    bits as f64 / (1u64 << RANDOM_BITS) as f64
}

pub(crate) fn short_code() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> PaymentRequest {
        PaymentRequest {
            job_type: JobType::Single,
            vehicle_key: Some("van".to_string()),
            attempt: 1,
        }
    }

    #[test]
    fn unit_draw_stays_in_range() {
        for _ in 0..1_000 {
            let draw = unit_draw();
            assert!((0.0..1.0).contains(&draw));
        }
    }

    #[tokio::test]
    async fn extreme_rates_are_deterministic() {
        let approved = MockPaymentGateway::always_approve()
            .charge(request())
            .await
            .expect("charge settles");
        assert!(matches!(approved, PaymentOutcome::Approved { reference } if reference.starts_with("PAY-")));

        let declined = MockPaymentGateway::always_decline()
            .charge(request())
            .await
            .expect("charge settles");
        assert!(matches!(declined, PaymentOutcome::Declined { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn charge_waits_for_the_configured_delay() {
        let gateway = MockPaymentGateway::new(Duration::from_secs(2), 1.0);
        let started = tokio::time::Instant::now();
        gateway.charge(request()).await.expect("charge settles");
        assert!(started.elapsed() >= Duration::from_secs(2));
    }
}
