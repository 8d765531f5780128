use super::error::describe;
use super::{FetchError, RetryPolicy};
use core::time::Duration;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio_retry::RetryIf;

const LOG_TARGET: &str = "    client";

/// Largest response body excerpt kept in error messages.
const MAX_BODY_EXCERPT: usize = 512;

/// Build the GraphQL endpoint URL for a Memberful organization.
#[must_use]
pub fn endpoint_for(organization: &str) -> String {
    format!("https://{organization}.memberful.com/api/graphql")
}

/// Memberful GraphQL API client.
///
/// Each call to [`Client::execute`] is a single POST, retried according to the
/// client's [`RetryPolicy`] when the failure is transient.
#[derive(Debug, Clone)]
#[expect(clippy::struct_field_names, reason = "client field stores the underlying HTTP client")]
pub struct Client {
    client: reqwest::Client,
    endpoint: String,
    retry: RetryPolicy,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    extensions: Option<Value>,
}

impl GraphQlError {
    fn is_authentication(&self) -> bool {
        let code = self
            .extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_ascii_lowercase();

        if code.contains("unauthenticated") || code.contains("unauthorized") || code.contains("forbidden") {
            return true;
        }

        let message = self.message.to_ascii_lowercase();
        message.contains("unauthorized") || message.contains("authenticat") || message.contains("api key")
    }
}

impl Client {
    /// Create a client for `endpoint` that authenticates with `api_key`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::MissingApiKey`] when the key is blank, and [`FetchError::Setup`]
    /// when the HTTP client can't be built.
    pub fn new(api_key: &str, endpoint: impl Into<String>, retry: RetryPolicy, timeout: Duration) -> Result<Self, FetchError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(FetchError::MissingApiKey);
        }

        let mut auth_val =
            HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| FetchError::Setup(format!("invalid API key: {e}")))?;
        auth_val.set_sensitive(true);

        let mut headers = HeaderMap::new();
        let _ = headers.insert(AUTHORIZATION, auth_val);

        let client = reqwest::Client::builder()
            .user_agent(concat!("memberboard/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Setup(describe(&e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            retry,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Run a GraphQL query and decode its `data` member.
    ///
    /// `operation` is only used for logging.
    pub async fn execute<T: DeserializeOwned>(&self, operation: &str, query: &str, variables: Value) -> Result<T, FetchError> {
        let body = json!({ "query": query, "variables": variables });
        let mut attempt = 0u32;

        RetryIf::start(
            self.retry.delays(),
            || {
                attempt += 1;
                self.post_once::<T>(operation, attempt, &body)
            },
            |e: &FetchError| {
                let retry = e.is_transient();
                if retry {
                    log::warn!(target: LOG_TARGET, "Retrying {operation} after transient failure: {e}");
                }
                retry
            },
        )
        .await
    }

    async fn post_once<T: DeserializeOwned>(&self, operation: &str, attempt: u32, body: &Value) -> Result<T, FetchError> {
        log::debug!(target: LOG_TARGET, "POST {} ({operation}, attempt {attempt})", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(body)
            .send()
            .await
            .map_err(|e| classify_transport_error(&e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| FetchError::TransientNetwork(describe(&e)))?;

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(FetchError::Authentication(format!("HTTP {}", status.as_u16())));
        }

        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::TransientNetwork(format!("HTTP {}", status.as_u16())));
        }

        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                body: excerpt(&text),
            });
        }

        decode_response(&text)
    }
}

fn classify_transport_error(error: &reqwest::Error) -> FetchError {
    if error.is_builder() {
        FetchError::Setup(describe(error))
    } else {
        FetchError::TransientNetwork(describe(error))
    }
}

fn decode_response<T: DeserializeOwned>(text: &str) -> Result<T, FetchError> {
    let response: GraphQlResponse<T> =
        serde_json::from_str(text).map_err(|e| FetchError::malformed(format!("invalid response body: {e}")))?;

    if let Some(auth) = response.errors.iter().find(|e| e.is_authentication()) {
        return Err(FetchError::Authentication(auth.message.clone()));
    }

    if !response.errors.is_empty() {
        let messages: Vec<_> = response.errors.iter().map(|e| e.message.as_str()).collect();
        return Err(FetchError::malformed(format!("GraphQL errors: {}", messages.join("; "))));
    }

    response.data.ok_or_else(|| FetchError::malformed("response has no data"))
}

fn excerpt(text: &str) -> String {
    if text.len() <= MAX_BODY_EXCERPT {
        return text.to_string();
    }

    let mut end = MAX_BODY_EXCERPT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", text.get(..end).unwrap_or_default())
}
