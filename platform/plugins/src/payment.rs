//! Payment capability adapter.
//!
//! Presents a [`PluginBridge`] as a [`PaymentCapability`]: arguments are
//! marshalled to JSON, method names cross the boundary verbatim, and the
//! bridge classifies every failure.

use std::sync::Arc;

use async_trait::async_trait;
use paygrid_core::{
    CapabilityKind, ConfigurationError, Currency, PaymentApiError, PaymentCapability,
    PaymentTransaction, PluginError,
};
use serde_json::json;
use uuid::Uuid;

use crate::bridge::PluginBridge;

pub struct PaymentBridge {
    bridge: Arc<PluginBridge>,
}

impl PaymentBridge {
    /// Wrap `bridge` as a payment capability. The descriptor must declare
    /// [`CapabilityKind::Payment`].
    pub fn new(bridge: Arc<PluginBridge>) -> Result<Self, ConfigurationError> {
        if !bridge.descriptor().declares(CapabilityKind::Payment) {
            return Err(ConfigurationError(format!(
                "plugin `{}` does not declare the payment capability",
                bridge.name()
            )));
        }
        Ok(Self { bridge })
    }

    pub fn plugin_name(&self) -> &str {
        self.bridge.name()
    }

    async fn transact(
        &self,
        method: &str,
        account_id: Uuid,
        payment_id: Uuid,
        transaction_id: Uuid,
        payment_method_id: Uuid,
        amount_minor: i64,
        currency: Currency,
    ) -> Result<PaymentTransaction, PluginError<PaymentApiError>> {
        self.bridge
            .invoke_typed(
                CapabilityKind::Payment,
                method,
                json!({
                    "account_id": account_id,
                    "payment_id": payment_id,
                    "transaction_id": transaction_id,
                    "payment_method_id": payment_method_id,
                    "amount_minor": amount_minor,
                    "currency": currency,
                }),
            )
            .await
    }
}

#[async_trait]
impl PaymentCapability for PaymentBridge {
    async fn authorize_payment(
        &self,
        account_id: Uuid,
        payment_id: Uuid,
        transaction_id: Uuid,
        payment_method_id: Uuid,
        amount_minor: i64,
        currency: Currency,
    ) -> Result<PaymentTransaction, PluginError<PaymentApiError>> {
        self.transact(
            "authorize_payment",
            account_id,
            payment_id,
            transaction_id,
            payment_method_id,
            amount_minor,
            currency,
        )
        .await
    }

    async fn capture_payment(
        &self,
        account_id: Uuid,
        payment_id: Uuid,
        transaction_id: Uuid,
        payment_method_id: Uuid,
        amount_minor: i64,
        currency: Currency,
    ) -> Result<PaymentTransaction, PluginError<PaymentApiError>> {
        self.transact(
            "capture_payment",
            account_id,
            payment_id,
            transaction_id,
            payment_method_id,
            amount_minor,
            currency,
        )
        .await
    }

    async fn purchase_payment(
        &self,
        account_id: Uuid,
        payment_id: Uuid,
        transaction_id: Uuid,
        payment_method_id: Uuid,
        amount_minor: i64,
        currency: Currency,
    ) -> Result<PaymentTransaction, PluginError<PaymentApiError>> {
        self.transact(
            "purchase_payment",
            account_id,
            payment_id,
            transaction_id,
            payment_method_id,
            amount_minor,
            currency,
        )
        .await
    }

    async fn void_payment(
        &self,
        account_id: Uuid,
        payment_id: Uuid,
        transaction_id: Uuid,
        payment_method_id: Uuid,
    ) -> Result<PaymentTransaction, PluginError<PaymentApiError>> {
        self.bridge
            .invoke_typed(
                CapabilityKind::Payment,
                "void_payment",
                json!({
                    "account_id": account_id,
                    "payment_id": payment_id,
                    "transaction_id": transaction_id,
                    "payment_method_id": payment_method_id,
                }),
            )
            .await
    }

    async fn credit_payment(
        &self,
        account_id: Uuid,
        payment_id: Uuid,
        transaction_id: Uuid,
        payment_method_id: Uuid,
        amount_minor: i64,
        currency: Currency,
    ) -> Result<PaymentTransaction, PluginError<PaymentApiError>> {
        self.transact(
            "credit_payment",
            account_id,
            payment_id,
            transaction_id,
            payment_method_id,
            amount_minor,
            currency,
        )
        .await
    }

    async fn refund_payment(
        &self,
        account_id: Uuid,
        payment_id: Uuid,
        transaction_id: Uuid,
        payment_method_id: Uuid,
        amount_minor: i64,
        currency: Currency,
    ) -> Result<PaymentTransaction, PluginError<PaymentApiError>> {
        self.transact(
            "refund_payment",
            account_id,
            payment_id,
            transaction_id,
            payment_method_id,
            amount_minor,
            currency,
        )
        .await
    }

    async fn payment_info(
        &self,
        account_id: Uuid,
        payment_id: Uuid,
    ) -> Result<Vec<PaymentTransaction>, PluginError<PaymentApiError>> {
        self.bridge
            .invoke_typed(
                CapabilityKind::Payment,
                "payment_info",
                json!({
                    "account_id": account_id,
                    "payment_id": payment_id,
                }),
            )
            .await
    }
}
