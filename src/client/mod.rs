use std::io::Write;
use std::sync::Arc;

use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_ENCODING, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::envelope::Envelope;
use crate::errors::Error;
use crate::metrics::{API_CALLS_TOTAL, API_SERVER_ERRORS_TOTAL, API_TRANSPORT_ERRORS_TOTAL};
use crate::params::Params;

pub mod rate_limiter;

use rate_limiter::RateLimiter;

/// Path of the course listing endpoint.
const COURSE_LIST_PATH: &str = "course/listByParameter";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Rate-limited client for the envelope API.
///
/// Cheap to clone; all per-call state lives on the call stack, so a single
/// client can serve any number of concurrent tasks.
#[derive(Clone)]
pub struct ApiClient {
    http_client: reqwest::Client,
    rate_limiter: RateLimiter,
    config: Arc<ClientConfig>,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        if config.base_url.is_empty() {
            return Err(Error::config("base_url must be set"));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        for (name, value) in &config.default_headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| Error::config(format!("invalid header name: {name}")))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| Error::config(format!("invalid value for header {name}")))?;
            headers.insert(header_name, header_value);
        }

        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(config.pool_idle_timeout())
            .build()?;

        let rate_limiter = RateLimiter::new(config.rate_limit_per_second);

        info!(
            base_url = %config.base_url,
            rate_limit = config.rate_limit_per_second,
            "initialized API client"
        );

        Ok(Self {
            http_client,
            rate_limiter,
            config: Arc::new(config),
        })
    }

    /// Fetch the course listing for the given filter parameters.
    ///
    /// The payload for this endpoint is an opaque JSON string.
    pub async fn list_courses(&self, params: &Params) -> Result<String, Error> {
        self.execute(COURSE_LIST_PATH, params).await
    }

    /// Issue a form-encoded POST to `path` and classify the response
    /// envelope into a typed payload or a failure.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &Params,
    ) -> Result<T, Error> {
        let envelope = self.post_form(path, params).await?;
        let result = envelope.into_result();

        if let Err(error) = &result {
            if let Some(code) = error.code() {
                API_SERVER_ERRORS_TOTAL
                    .with_label_values(&[&code.to_string()])
                    .inc();
                warn!(code, path, "server reported failure");
            }
        }

        result
    }

    /// Send one request and decode the envelope. No status interpretation
    /// happens anywhere else.
    async fn post_form(&self, path: &str, params: &Params) -> Result<Envelope, Error> {
        API_CALLS_TOTAL.with_label_values(&[path]).inc();

        // Wait for the client-side throttle first
        self.rate_limiter.acquire().await;

        let fields = self.request_fields(params);
        let request_id = Uuid::new_v4().to_string();
        let timestamp = format!("{:010}", Utc::now().timestamp());
        let url = self.endpoint_url(path);

        debug!(%request_id, %url, fields = fields.len(), "issuing request");
        if self.config.log_bodies {
            debug!(%request_id, body = %encode_form(&fields), "request body");
        }

        let request = self
            .http_client
            .post(&url)
            .header("timestamp", &timestamp)
            .header("x-request-id", &request_id);

        let request = if self.config.is_gzip_path(path) {
            request
                .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                .header(CONTENT_ENCODING, "gzip")
                .body(gzip_body(&encode_form(&fields)))
        } else {
            request.form(&fields)
        };

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                API_TRANSPORT_ERRORS_TOTAL.with_label_values(&["send"]).inc();
                return Err(Error::Transport(e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            API_TRANSPORT_ERRORS_TOTAL.with_label_values(&["http"]).inc();
            let body = response.text().await.unwrap_or_default();
            warn!(
                %request_id,
                status = status.as_u16(),
                "request failed before envelope decode"
            );
            return Err(Error::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                API_TRANSPORT_ERRORS_TOTAL.with_label_values(&["read"]).inc();
                return Err(Error::Transport(e));
            }
        };
        if self.config.log_bodies {
            debug!(%request_id, body = %body, "response body");
        }

        let envelope: Envelope = serde_json::from_str(&body).map_err(|e| {
            API_TRANSPORT_ERRORS_TOTAL
                .with_label_values(&["decode"])
                .inc();
            Error::decode(format!("response was not a valid envelope: {e}"))
        })?;

        debug!(%request_id, code = envelope.code, "decoded envelope");
        Ok(envelope)
    }

    /// Merge the parameter layers: client info, configured extras, then
    /// per-call fields. Later layers win on key collisions.
    fn request_fields(&self, params: &Params) -> Params {
        self.config
            .client_info
            .as_params()
            .merge(&self.config.extra_params)
            .merge(params)
    }

    fn endpoint_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Urlencode the fields in key order.
fn encode_form(params: &Params) -> String {
    params
        .iter()
        .map(|(key, value)| {
            format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn gzip_body(body: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(body.as_bytes())
        .and_then(|_| encoder.finish())
        .expect("gzip to memory cannot fail")
}
