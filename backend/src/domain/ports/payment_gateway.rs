//! Port for the payment collaborator.
//!
//! A payment either confirms after an opaque delay or ends without a
//! receipt. Callers mutate entitlements only after a receipt is returned.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::domain::{Error, UserId};

use super::define_port_error;

/// What is being charged, and to whom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub user_id: UserId,
    pub amount: Decimal,
    /// Human-readable item, e.g. `Season 1, Episode 5`.
    pub label: String,
}

/// Proof of a confirmed payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub reference: Uuid,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub label: String,
    pub confirmed_at: DateTime<Utc>,
}

define_port_error! {
    /// Reasons a payment ends without a receipt.
    pub enum PaymentError {
        /// The user withdrew before confirmation.
        Cancelled => "payment was cancelled",
        /// The collaborator refused the charge.
        Declined { message: String } => "payment declined: {message}",
    }
}

impl From<PaymentError> for Error {
    fn from(error: PaymentError) -> Self {
        match error {
            PaymentError::Cancelled => Error::conflict("payment was cancelled")
                .with_details(serde_json::json!({ "code": "payment_cancelled" })),
            PaymentError::Declined { message } => {
                Error::conflict(format!("payment declined: {message}"))
                    .with_details(serde_json::json!({ "code": "payment_declined" }))
            }
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charge `request.amount`, resolving early with
    /// [`PaymentError::Cancelled`] once `cancel` fires.
    async fn request_payment(
        &self,
        request: &PaymentRequest,
        cancel: CancellationToken,
    ) -> Result<PaymentReceipt, PaymentError>;
}

/// Fixture gateway that confirms every payment at once unless already
/// cancelled.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePaymentGateway;

#[async_trait]
impl PaymentGateway for FixturePaymentGateway {
    async fn request_payment(
        &self,
        request: &PaymentRequest,
        cancel: CancellationToken,
    ) -> Result<PaymentReceipt, PaymentError> {
        if cancel.is_cancelled() {
            return Err(PaymentError::cancelled());
        }
        Ok(PaymentReceipt {
            reference: Uuid::new_v4(),
            amount: request.amount,
            label: request.label.clone(),
            confirmed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;

    fn request() -> PaymentRequest {
        PaymentRequest {
            user_id: UserId::random(),
            amount: Decimal::new(10, 2),
            label: "Season 1, Episode 5".to_owned(),
        }
    }

    #[tokio::test]
    async fn fixture_gateway_confirms_with_requested_amount() {
        let receipt = FixturePaymentGateway
            .request_payment(&request(), CancellationToken::new())
            .await
            .expect("confirmed");
        assert_eq!(receipt.amount, Decimal::new(10, 2));
        assert_eq!(receipt.label, "Season 1, Episode 5");
    }

    #[tokio::test]
    async fn fixture_gateway_honours_prior_cancellation() {
        let token = CancellationToken::new();
        token.cancel();
        let err = FixturePaymentGateway
            .request_payment(&request(), token)
            .await
            .expect_err("cancelled");
        assert_eq!(err, PaymentError::Cancelled);
    }

    #[test]
    fn cancellation_maps_to_conflict() {
        let error = Error::from(PaymentError::cancelled());
        assert_eq!(error.code(), ErrorCode::Conflict);
        assert_eq!(
            error.details(),
            Some(&serde_json::json!({ "code": "payment_cancelled" }))
        );
    }
}
