use common_utils::{consts, CustomResult};
use domain_types::{
    errors::CallbackError, merchant_config::MerchantConfig, notification::TransactionNotification,
};
use error_stack::ResultExt;
use gateway_integration::globalpay::{self, transformers};
use interfaces::callbacks::{NotificationSource, RequestDetails};

/// Hosted-page `return`/`status` callbacks: signature in the
/// `X-GP-Signature` header, computed over the raw JSON body.
pub struct HppNotificationSource;

impl NotificationSource for HppNotificationSource {
    fn family(&self) -> &'static str {
        "hpp"
    }

    fn verify_source(
        &self,
        request: &RequestDetails,
        config: &MerchantConfig,
    ) -> CustomResult<bool, CallbackError> {
        let signature = request.header(consts::X_GP_SIGNATURE).unwrap_or("");
        Ok(globalpay::verify_payload_signature(
            &request.body,
            signature,
            config,
        ))
    }

    fn parse_notification(
        &self,
        request: &RequestDetails,
    ) -> CustomResult<TransactionNotification, CallbackError> {
        transformers::notification_from_body(&request.body, &request.query_params)
    }
}

/// Form body of the authoritative `final` callback, auto-submitted by the
/// interstitial return page.
#[derive(Debug, serde::Deserialize)]
pub struct FinalCallbackForm {
    #[serde(rename = "X-GP-Signature")]
    pub signature: String,
    pub gateway_response: String,
}

/// Hosted-page `final` callback: the signed gateway payload travels as a
/// form field next to its signature. The signature is re-verified here from
/// scratch — the interstitial page that posted the form is UI, not a trust
/// boundary.
pub struct HppFinalSource;

impl HppFinalSource {
    fn form(request: &RequestDetails) -> CustomResult<FinalCallbackForm, CallbackError> {
        serde_urlencoded::from_bytes::<FinalCallbackForm>(&request.body)
            .change_context(CallbackError::PayloadDecodingFailed)
            .attach_printable("final callback form missing signature or gateway_response")
    }
}

impl NotificationSource for HppFinalSource {
    fn family(&self) -> &'static str {
        "hpp_final"
    }

    fn verify_source(
        &self,
        request: &RequestDetails,
        config: &MerchantConfig,
    ) -> CustomResult<bool, CallbackError> {
        let form = Self::form(request)?;
        Ok(globalpay::verify_payload_signature(
            form.gateway_response.as_bytes(),
            &form.signature,
            config,
        ))
    }

    fn parse_notification(
        &self,
        request: &RequestDetails,
    ) -> CustomResult<TransactionNotification, CallbackError> {
        let form = Self::form(request)?;
        transformers::notification_from_body(
            form.gateway_response.as_bytes(),
            &request.query_params,
        )
    }
}
