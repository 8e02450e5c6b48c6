use common_utils::CustomResult;
use domain_types::{
    errors::CallbackError, merchant_config::MerchantConfig, notification::TransactionNotification,
};
use gateway_integration::globalpay::{self, transformers};
use interfaces::callbacks::{NotificationSource, RequestDetails};

/// Generic asynchronous-method callbacks (bank redirect, BNPL): the
/// signature is the `X-GP-Signature` query parameter, computed over the
/// canonicalized query string with the signature parameter removed.
pub struct RedirectNotificationSource;

impl NotificationSource for RedirectNotificationSource {
    fn family(&self) -> &'static str {
        "redirect"
    }

    fn verify_source(
        &self,
        request: &RequestDetails,
        config: &MerchantConfig,
    ) -> CustomResult<bool, CallbackError> {
        Ok(globalpay::verify_query_signature(
            &request.query_params,
            config,
        ))
    }

    fn parse_notification(
        &self,
        request: &RequestDetails,
    ) -> CustomResult<TransactionNotification, CallbackError> {
        Ok(transformers::notification_from_query(
            &request.body,
            &request.query_params,
        ))
    }
}
