//! Brevo HTTP request methods

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;
use crate::http_client::HttpUtils;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::{BrevoApiError, BrevoProvider};

impl BrevoProvider {
    /// Execute a Brevo API request
    ///
    /// 2xx bodies are decoded into `T` (an empty body decodes as JSON `null`); 4xx bodies are
    /// decoded as [`BrevoApiError`] and mapped.
    pub(crate) async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        ctx: ErrorContext,
    ) -> Result<T> {
        let url = format!("{}{path}", self.api_base);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header("api-key", &self.api_key)
            .header("Accept", "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let (status, response_text) = HttpUtils::execute_request_with_retry(
            request,
            self.provider_name(),
            method.as_str(),
            &url,
            &self.retry,
        )
        .await?;

        if status >= 400 {
            let raw = match serde_json::from_str::<BrevoApiError>(&response_text) {
                Ok(err) => RawApiError::with_code(err.code, err.message),
                Err(_) => RawApiError::new(response_text),
            };
            log::warn!(
                "[{}] API error (HTTP {status}): {:?} {}",
                self.provider_name(),
                raw.code,
                raw.message
            );
            return Err(self.map_error(raw.status(status), ctx));
        }

        let text = if response_text.trim().is_empty() {
            "null"
        } else {
            response_text.as_str()
        };
        HttpUtils::parse_json(text, self.provider_name())
    }
}
