use crate::config::GoogleSection;
use crate::error::BoxError;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use yup_oauth2::authenticator::Authenticator;
use yup_oauth2::{InstalledFlowAuthenticator, InstalledFlowReturnMethod};

pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/gmail.readonly",
    "https://www.googleapis.com/auth/spreadsheets",
];

/// Google OAuth tokens shared by the Gmail and Sheets clients.
///
/// Tokens are cached in `token_cache_path` across runs. When the cache is
/// missing or cannot be refreshed, the installed-app flow opens a local
/// redirect listener and prints the consent URL.
pub struct GoogleAuth {
    auth: Authenticator<HttpsConnector<HttpConnector>>,
}

impl GoogleAuth {
    pub async fn new(cfg: &GoogleSection) -> Result<Self, BoxError> {
        let secret = yup_oauth2::read_application_secret(&cfg.credentials_path)
            .await
            .map_err(|e| format!("failed to read {}: {e}", cfg.credentials_path))?;

        let auth =
            InstalledFlowAuthenticator::builder(secret, InstalledFlowReturnMethod::HTTPRedirect)
                .persist_tokens_to_disk(&cfg.token_cache_path)
                .build()
                .await?;

        Ok(Self { auth })
    }

    pub async fn access_token(&self) -> Result<String, BoxError> {
        let token = self.auth.token(SCOPES).await?;
        token
            .token()
            .map(str::to_string)
            .ok_or_else(|| "Google returned a token without an access token".into())
    }
}
