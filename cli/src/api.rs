//! HTTP client for the solarcoat API.
//!
//! Every call goes through [`ApiClient::execute`], which retries transient
//! failures per [`RetryPolicy`] and unwraps the `{ success, ... }` envelope.

use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde_json::Value;

use crate::CliError;
use crate::retry::{RetryPolicy, backoff_delay, is_retryable_status, is_transient};

pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    policy: RetryPolicy,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns [`CliError::InvalidBaseUrl`] for a URL that cannot carry a
    /// path, or an HTTP error if the client cannot be built.
    pub fn new(base_url: &str, policy: RetryPolicy) -> Result<Self, CliError> {
        let base = Url::parse(base_url).map_err(|_| CliError::InvalidBaseUrl(base_url.to_owned()))?;
        if base.cannot_be_a_base() {
            return Err(CliError::InvalidBaseUrl(base_url.to_owned()));
        }
        let http = reqwest::Client::builder().build()?;
        Ok(Self { http, base, policy })
    }

    /// Join percent-encoded path segments onto the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::InvalidBaseUrl`] if the base cannot take segments.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, CliError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| CliError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn get(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Value, CliError> {
        let url = self.endpoint(segments)?;
        self.execute(|| self.http.get(url.clone()).query(query)).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn send_json(&self, method: Method, segments: &[&str], body: Option<&Value>) -> Result<Value, CliError> {
        let url = self.endpoint(segments)?;
        self.execute(|| {
            let request = self.http.request(method.clone(), url.clone());
            match body {
                Some(json) => request.json(json),
                None => request,
            }
        })
        .await
    }

    /// Upload a CSV file as the multipart field `file`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn upload_csv(&self, segments: &[&str], file_name: &str, bytes: Vec<u8>) -> Result<Value, CliError> {
        let url = self.endpoint(segments)?;
        self.execute(|| {
            let part = Part::bytes(bytes.clone()).file_name(file_name.to_owned());
            self.http.post(url.clone()).multipart(Form::new().part("file", part))
        })
        .await
    }

    /// Send the request built by `build`, retrying transport failures and
    /// retryable statuses with exponential backoff.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Server`] for a non-2xx status or a
    /// `success: false` body, and [`CliError::Http`] when the server stays
    /// unreachable.
    pub async fn execute<F>(&self, build: F) -> Result<Value, CliError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            let err = match build().send().await {
                Ok(response) => {
                    let status = response.status();
                    let text = response.text().await?;
                    match interpret(status, &text) {
                        Err(err) if is_retryable_status(status) => err,
                        result => return result,
                    }
                }
                Err(err) if is_transient(&err) => CliError::Http(err),
                Err(err) => return Err(err.into()),
            };

            if !self.policy.allows_retry(attempt) {
                return Err(err);
            }
            let delay = backoff_delay(attempt);
            eprintln!("{err}; retrying in {}ms", delay.as_millis());
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

/// Turn a status and body into the success payload or a server error.
///
/// # Errors
///
/// Returns [`CliError::Server`] carrying the envelope's `error` string when
/// present, otherwise the raw body.
pub fn interpret(status: StatusCode, body: &str) -> Result<Value, CliError> {
    let value = if body.trim().is_empty() { Value::Null } else { serde_json::from_str(body).unwrap_or(Value::Null) };
    let rejected = value.get("success").and_then(Value::as_bool) == Some(false);

    if status.is_success() && !rejected {
        return Ok(value);
    }

    let message = value
        .get("error")
        .and_then(Value::as_str)
        .map_or_else(|| body.trim().to_owned(), str::to_owned);
    Err(CliError::Server { status: status.as_u16(), message })
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
