//! Thin client for the gateway's transaction API: the authoritative
//! re-query used by the generic redirect family, plus reversals and voids.

use std::time::{Duration, Instant};

use common_enums::Currency;
use common_utils::{
    crypto::{self, GenerateDigest},
    ext_traits::BytesExt,
    CustomResult,
};
use domain_types::{
    errors::GatewayClientError, notification::TransactionNotification, types::MinorUnit,
};
use error_stack::ResultExt;
use interfaces::processor_client::{ProcessorClient, VoidReason};
use secrecy::{ExposeSecret, SecretString};

use super::{headers, transformers, GP_API_VERSION};

/// Bearer tokens expire server-side; refresh slightly early to avoid racing
/// the deadline with an in-flight request.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(30);

#[derive(Debug, serde::Serialize)]
struct AccessTokenRequest {
    app_id: String,
    nonce: String,
    secret: String,
    grant_type: String,
}

#[derive(Debug, serde::Deserialize)]
struct AccessTokenResponse {
    token: String,
    seconds_to_expire: i64,
}

#[derive(Debug, serde::Serialize)]
struct ReversalRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Client for the gateway's REST API, authenticated per the gateway's
/// app-id/app-key scheme: a bearer token obtained by hashing a nonce with
/// the app key.
pub struct GlobalpayClient {
    base_url: String,
    app_id: String,
    app_key: SecretString,
    http_client: reqwest::Client,
    token: tokio::sync::Mutex<Option<CachedToken>>,
}

impl GlobalpayClient {
    pub fn new(
        base_url: impl Into<String>,
        app_id: impl Into<String>,
        app_key: impl Into<String>,
    ) -> Self {
        let app_key: String = app_key.into();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            app_id: app_id.into(),
            app_key: SecretString::new(app_key.into()),
            http_client: reqwest::Client::new(),
            token: tokio::sync::Mutex::new(None),
        }
    }

    fn access_token_request(&self) -> CustomResult<AccessTokenRequest, GatewayClientError> {
        let nonce = (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000).to_string();
        let secret_input = format!("{}{}", nonce, self.app_key.expose_secret());
        let digest = crypto::Sha512
            .generate_digest(secret_input.as_bytes())
            .change_context(GatewayClientError::AccessTokenFailure)?;

        Ok(AccessTokenRequest {
            app_id: self.app_id.clone(),
            nonce,
            secret: hex::encode(digest),
            grant_type: "client_credentials".to_owned(),
        })
    }

    async fn access_token(&self) -> CustomResult<String, GatewayClientError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.token.clone());
            }
        }

        let request = self.access_token_request()?;
        let response = self
            .http_client
            .post(format!("{}/accesstoken", self.base_url))
            .header(headers::X_GP_VERSION, GP_API_VERSION)
            .json(&request)
            .send()
            .await
            .change_context(GatewayClientError::AccessTokenFailure)?;

        if !response.status().is_success() {
            return Err(GatewayClientError::AccessTokenFailure)
                .attach_printable(format!("access token request failed: {}", response.status()));
        }

        let body = response
            .bytes()
            .await
            .change_context(GatewayClientError::AccessTokenFailure)?;
        let token_response: AccessTokenResponse = body
            .parse_struct("AccessTokenResponse")
            .change_context(GatewayClientError::ResponseDecodingFailed)?;

        let expires_in =
            Duration::from_secs(u64::try_from(token_response.seconds_to_expire).unwrap_or(0))
                .saturating_sub(TOKEN_EXPIRY_MARGIN);
        *cached = Some(CachedToken {
            token: token_response.token.clone(),
            expires_at: Instant::now() + expires_in,
        });

        Ok(token_response.token)
    }

    async fn reversal_call(
        &self,
        transaction_id: &str,
        request: &ReversalRequest,
    ) -> CustomResult<(), GatewayClientError> {
        let token = self.access_token().await?;
        let response = self
            .http_client
            .post(format!(
                "{}/transactions/{}/reversal",
                self.base_url, transaction_id
            ))
            .header(headers::AUTHORIZATION, format!("Bearer {token}"))
            .header(headers::X_GP_VERSION, GP_API_VERSION)
            .header(headers::CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .change_context(GatewayClientError::RequestNotSent)?;

        match response.status() {
            status if status.is_success() => Ok(()),
            reqwest::StatusCode::NOT_FOUND => Err(error_stack::report!(
                GatewayClientError::TransactionNotFound(transaction_id.to_owned())
            )),
            status => Err(GatewayClientError::UnexpectedServerResponse)
                .attach_printable(format!("reversal returned {status}")),
        }
    }
}

#[async_trait::async_trait]
impl ProcessorClient for GlobalpayClient {
    async fn get_transaction(
        &self,
        transaction_id: &str,
    ) -> CustomResult<TransactionNotification, GatewayClientError> {
        let token = self.access_token().await?;
        let response = self
            .http_client
            .get(format!(
                "{}/transactions/{}",
                self.base_url, transaction_id
            ))
            .header(headers::AUTHORIZATION, format!("Bearer {token}"))
            .header(headers::X_GP_VERSION, GP_API_VERSION)
            .send()
            .await
            .change_context(GatewayClientError::RequestNotSent)?;

        match response.status() {
            status if status.is_success() => {
                let body = response
                    .bytes()
                    .await
                    .change_context(GatewayClientError::ResponseDecodingFailed)?;
                let payload: transformers::GlobalpayNotification = body
                    .parse_struct("GlobalpayNotification")
                    .change_context(GatewayClientError::ResponseDecodingFailed)?;
                Ok(payload.into_notification(&[]))
            }
            reqwest::StatusCode::NOT_FOUND => Err(error_stack::report!(
                GatewayClientError::TransactionNotFound(transaction_id.to_owned())
            )),
            status => Err(GatewayClientError::UnexpectedServerResponse)
                .attach_printable(format!("transaction query returned {status}")),
        }
    }

    async fn reverse_transaction(
        &self,
        transaction_id: &str,
        amount: MinorUnit,
        _currency: Currency,
    ) -> CustomResult<(), GatewayClientError> {
        self.reversal_call(
            transaction_id,
            &ReversalRequest {
                amount: Some(amount.get_amount_as_i64().to_string()),
                description: None,
            },
        )
        .await
    }

    async fn void_transaction(
        &self,
        transaction_id: &str,
        reason: VoidReason,
    ) -> CustomResult<(), GatewayClientError> {
        self.reversal_call(
            transaction_id,
            &ReversalRequest {
                amount: None,
                description: Some(reason.to_string()),
            },
        )
        .await
    }
}
