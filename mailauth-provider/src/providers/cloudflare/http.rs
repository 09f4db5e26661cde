//! Cloudflare HTTP request methods

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;
use crate::http_client::HttpUtils;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::{CloudflareProvider, CloudflareResponse};

impl CloudflareProvider {
    /// Execute a Cloudflare API request and unwrap the response envelope
    pub(crate) async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        ctx: ErrorContext,
    ) -> Result<CloudflareResponse<T>> {
        let url = format!("{}{path}", self.api_base);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .bearer_auth(&self.api_token);
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

        let cf_response: CloudflareResponse<T> =
            match HttpUtils::parse_json(&response_text, self.provider_name()) {
                Ok(resp) => resp,
                // Non-JSON 4xx bodies (proxies, WAF pages) are mapped by status alone
                Err(_) if status >= 400 => {
                    return Err(
                        self.map_error(RawApiError::new(response_text).status(status), ctx)
                    );
                }
                Err(e) => return Err(e),
            };

        if !cf_response.success || status >= 400 {
            let raw = cf_response.errors.first().map_or_else(
                || RawApiError::new("Unknown error"),
                |e| RawApiError::with_code(e.code.to_string(), e.message.clone()),
            );
            log::warn!(
                "[{}] API error (HTTP {status}): {:?} {}",
                self.provider_name(),
                raw.code,
                raw.message
            );
            return Err(self.map_error(raw.status(status), ctx));
        }

        Ok(cf_response)
    }

    /// Like [`request`](Self::request) but requires a `result` payload
    pub(crate) async fn request_result<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        ctx: ErrorContext,
    ) -> Result<T> {
        self.request(method, path, body, ctx)
            .await?
            .result
            .ok_or_else(|| self.parse_error("Missing result field in response"))
    }
}
