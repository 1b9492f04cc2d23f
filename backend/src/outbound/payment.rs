//! Simulated payment collaborator.
//!
//! No money moves: a payment "confirms" after a fixed delay unless the
//! user cancels first.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::ports::{PaymentError, PaymentGateway, PaymentReceipt, PaymentRequest};

/// Gateway that confirms after `delay`.
#[derive(Clone)]
pub struct SimulatedPaymentGateway {
    delay: Duration,
    clock: Arc<dyn Clock>,
}

impl SimulatedPaymentGateway {
    pub fn new(delay: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { delay, clock }
    }

    fn receipt(&self, request: &PaymentRequest) -> PaymentReceipt {
        PaymentReceipt {
            reference: Uuid::new_v4(),
            amount: request.amount,
            label: request.label.clone(),
            confirmed_at: self.clock.utc(),
        }
    }
}

#[async_trait]
impl PaymentGateway for SimulatedPaymentGateway {
    async fn request_payment(
        &self,
        request: &PaymentRequest,
        cancel: CancellationToken,
    ) -> Result<PaymentReceipt, PaymentError> {
        if request.amount < Decimal::ZERO {
            return Err(PaymentError::declined("amount must not be negative"));
        }
        if request.amount.is_zero() {
            return Ok(self.receipt(request));
        }

        debug!(user_id = %request.user_id, amount = %request.amount, label = %request.label, "payment pending");
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                info!(user_id = %request.user_id, label = %request.label, "payment cancelled");
                Err(PaymentError::cancelled())
            }
            () = tokio::time::sleep(self.delay) => {
                info!(user_id = %request.user_id, amount = %request.amount, label = %request.label, "payment confirmed");
                Ok(self.receipt(request))
            }
        }
    }
}
