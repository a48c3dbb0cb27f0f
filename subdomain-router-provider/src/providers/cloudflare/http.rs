//! Cloudflare HTTP request methods

use reqwest::RequestBuilder;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::http_client::HttpUtils;
use crate::traits::{ErrorContext, ProviderErrorMapper, RawApiError};

use super::types::CloudflareResultInfo;
use super::{CF_API_BASE, CloudflareProvider, CloudflareResponse, READ_RETRIES};

impl CloudflareProvider {
    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("Authorization", format!("Bearer {}", self.api_token))
    }

    /// Check the `success` flag of the envelope and map the first API error.
    fn check_envelope<T>(
        &self,
        cf_response: CloudflareResponse<T>,
        context: ErrorContext,
    ) -> Result<CloudflareResponse<T>> {
        if cf_response.success {
            return Ok(cf_response);
        }
        let (code, message) = cf_response
            .errors
            .as_ref()
            .and_then(|errors| errors.first())
            .map_or_else(
                || (String::new(), "Unknown error".to_string()),
                |e| (e.code.to_string(), e.message.clone()),
            );
        let summary = format!("API error {code}: {message}");
        let error = self.map_error(RawApiError::with_code(code, message), context);
        log::log!(error.log_level(), "[{}] {summary}", self.provider_name());
        Err(error)
    }

    /// GET a single object.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        context: ErrorContext,
    ) -> Result<T> {
        let url = format!("{CF_API_BASE}{path}");
        let request = self.authorized(self.client.get(&url));
        let (_, body) = HttpUtils::execute_request_with_retry(
            request,
            self.provider_name(),
            "GET",
            &url,
            READ_RETRIES,
        )
        .await?;

        let cf_response: CloudflareResponse<T> =
            HttpUtils::parse_json(&body, self.provider_name())?;
        self.check_envelope(cf_response, context)?
            .result
            .ok_or_else(|| self.parse_error("missing result field in response"))
    }

    /// GET one page of a list endpoint.
    pub(crate) async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        context: ErrorContext,
    ) -> Result<(Vec<T>, Option<CloudflareResultInfo>)> {
        let url = format!("{CF_API_BASE}{path}");
        let request = self.authorized(self.client.get(&url));
        let (_, body) = HttpUtils::execute_request_with_retry(
            request,
            self.provider_name(),
            "GET",
            &url,
            READ_RETRIES,
        )
        .await?;

        let cf_response: CloudflareResponse<Vec<T>> =
            HttpUtils::parse_json(&body, self.provider_name())?;
        let cf_response = self.check_envelope(cf_response, context)?;
        Ok((cf_response.result.unwrap_or_default(), cf_response.result_info))
    }

    /// POST a JSON body. Sent once.
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        context: ErrorContext,
    ) -> Result<T> {
        let url = format!("{CF_API_BASE}{path}");
        let request = self.authorized(self.client.post(&url)).json(body);
        let (_, text) =
            HttpUtils::execute_request(request, self.provider_name(), "POST", &url).await?;

        let cf_response: CloudflareResponse<T> =
            HttpUtils::parse_json(&text, self.provider_name())?;
        self.check_envelope(cf_response, context)?
            .result
            .ok_or_else(|| self.parse_error("missing result field in response"))
    }

    /// PATCH a JSON body. Sent once.
    pub(crate) async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        context: ErrorContext,
    ) -> Result<T> {
        let url = format!("{CF_API_BASE}{path}");
        let request = self.authorized(self.client.patch(&url)).json(body);
        let (_, text) =
            HttpUtils::execute_request(request, self.provider_name(), "PATCH", &url).await?;

        let cf_response: CloudflareResponse<T> =
            HttpUtils::parse_json(&text, self.provider_name())?;
        self.check_envelope(cf_response, context)?
            .result
            .ok_or_else(|| self.parse_error("missing result field in response"))
    }

    /// DELETE a resource. Sent once.
    pub(crate) async fn delete(&self, path: &str, context: ErrorContext) -> Result<()> {
        let url = format!("{CF_API_BASE}{path}");
        let request = self.authorized(self.client.delete(&url));
        let (_, text) =
            HttpUtils::execute_request(request, self.provider_name(), "DELETE", &url).await?;

        let cf_response: CloudflareResponse<serde_json::Value> =
            HttpUtils::parse_json(&text, self.provider_name())?;
        self.check_envelope(cf_response, context)?;
        Ok(())
    }
}
