use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::error::{DomainFault, PluginError};
use crate::types::Currency;

/// One transaction as reported by a payment plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentTransaction {
    pub payment_id: Uuid,
    pub transaction_id: Uuid,
    pub transaction_type: TransactionType,
    /// Amount in the currency's minor unit (cents for USD).
    pub amount_minor: i64,
    pub currency: Currency,
    pub status: PaymentStatus,
    /// Gateway-side reference, when the gateway issued one.
    pub gateway_reference: Option<String>,
    pub effective_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Authorize,
    Capture,
    Purchase,
    Void,
    Credit,
    Refund,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Processed,
    Pending,
    Declined,
    Failed,
}

/// Failures a payment plugin may declare as part of its contract.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PaymentApiError {
    #[error("payment declined ({code}): {message}")]
    Declined { code: String, message: String },

    #[error("method not supported: {0}")]
    MethodNotSupported(String),

    #[error("gateway unavailable: {0}")]
    GatewayUnavailable(String),

    #[error("payment rejected: {0}")]
    Rejected(String),
}

impl DomainFault for PaymentApiError {
    fn from_runtime(code: &str, message: &str) -> Self {
        match code {
            "declined" => PaymentApiError::Declined {
                code: code.to_string(),
                message: message.to_string(),
            },
            "method_not_supported" => PaymentApiError::MethodNotSupported(message.to_string()),
            "gateway_unavailable" => PaymentApiError::GatewayUnavailable(message.to_string()),
            _ => PaymentApiError::Rejected(message.to_string()),
        }
    }
}

/// The payment operations a plugin declaring [`CapabilityKind::Payment`]
/// must provide.
///
/// Each call addresses one transaction of one payment on one account; the
/// host supplies all identifiers. Plugins report failure either through a
/// declared [`PaymentApiError`] or through the transaction's `status`
/// field, depending on whether the gateway produced a transaction record.
///
/// [`CapabilityKind::Payment`]: crate::types::CapabilityKind::Payment
#[async_trait]
pub trait PaymentCapability: Send + Sync {
    async fn authorize_payment(
        &self,
        account_id: Uuid,
        payment_id: Uuid,
        transaction_id: Uuid,
        payment_method_id: Uuid,
        amount_minor: i64,
        currency: Currency,
    ) -> Result<PaymentTransaction, PluginError<PaymentApiError>>;

    async fn capture_payment(
        &self,
        account_id: Uuid,
        payment_id: Uuid,
        transaction_id: Uuid,
        payment_method_id: Uuid,
        amount_minor: i64,
        currency: Currency,
    ) -> Result<PaymentTransaction, PluginError<PaymentApiError>>;

    async fn purchase_payment(
        &self,
        account_id: Uuid,
        payment_id: Uuid,
        transaction_id: Uuid,
        payment_method_id: Uuid,
        amount_minor: i64,
        currency: Currency,
    ) -> Result<PaymentTransaction, PluginError<PaymentApiError>>;

    async fn void_payment(
        &self,
        account_id: Uuid,
        payment_id: Uuid,
        transaction_id: Uuid,
        payment_method_id: Uuid,
    ) -> Result<PaymentTransaction, PluginError<PaymentApiError>>;

    async fn credit_payment(
        &self,
        account_id: Uuid,
        payment_id: Uuid,
        transaction_id: Uuid,
        payment_method_id: Uuid,
        amount_minor: i64,
        currency: Currency,
    ) -> Result<PaymentTransaction, PluginError<PaymentApiError>>;

    async fn refund_payment(
        &self,
        account_id: Uuid,
        payment_id: Uuid,
        transaction_id: Uuid,
        payment_method_id: Uuid,
        amount_minor: i64,
        currency: Currency,
    ) -> Result<PaymentTransaction, PluginError<PaymentApiError>>;

    /// All transactions recorded for a payment, oldest first.
    async fn payment_info(
        &self,
        account_id: Uuid,
        payment_id: Uuid,
    ) -> Result<Vec<PaymentTransaction>, PluginError<PaymentApiError>>;
}
