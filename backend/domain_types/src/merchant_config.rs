use std::collections::HashSet;

use common_enums::Environment;
use secrecy::SecretString;

/// Merchant-configured credential for one gateway environment.
#[derive(Debug)]
pub struct GatewayCredential {
    pub app_id: String,
    /// The app key doubles as the HMAC-style key for notification signatures.
    pub app_key: SecretString,
}

impl GatewayCredential {
    pub fn new(app_id: impl Into<String>, app_key: String) -> Self {
        Self {
            app_id: app_id.into(),
            app_key: SecretString::new(app_key.into()),
        }
    }
}

/// Merchant settings injected into every component that needs them.
///
/// Credential selection depends solely on `live_mode`; there is no fallback
/// from one environment's key to the other — a signature computed with the
/// wrong key is indistinguishable from tampering and must fail closed.
#[derive(Debug)]
pub struct MerchantConfig {
    pub live_mode: bool,
    pub production: GatewayCredential,
    pub sandbox: GatewayCredential,
    /// AVS result codes the merchant auto-reverses on.
    pub avs_reject_codes: HashSet<String>,
    /// CVN result codes the merchant auto-reverses on.
    pub cvn_reject_codes: HashSet<String>,
    /// Gates raw payload logging on callback endpoints.
    pub debug: bool,
}

impl MerchantConfig {
    pub fn environment(&self) -> Environment {
        if self.live_mode {
            Environment::Production
        } else {
            Environment::Sandbox
        }
    }

    pub fn active_credential(&self) -> &GatewayCredential {
        if self.live_mode {
            &self.production
        } else {
            &self.sandbox
        }
    }
}
