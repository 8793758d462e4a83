use serde_json::Value;

use super::codes;

/// Result alias for client operations.
pub type ApiResult<T> = std::result::Result<T, Error>;

/// Failures surfaced by the client.
///
/// Server-reported failures are routine values carried through `Result`,
/// never panics. `NoData` is a refinement of `Server`: the transport layer
/// accepted the call but the envelope held nothing to show, which calling
/// code commonly treats differently from a server-reported error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The call went through but the server sent no usable payload.
    #[error("empty result: {message}")]
    NoData { message: String },

    /// The server reported a classified failure.
    #[error("server failure {code}: {message}")]
    Server {
        code: i32,
        message: String,
        data: Option<Value>,
    },

    /// Non-2xx HTTP response, before an envelope could be decoded.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Connection or protocol fault below the envelope layer.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body or payload did not deserialize.
    #[error("decode error: {message}")]
    Decode { message: String },

    /// Invalid client configuration.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl Error {
    /// Classifier code carried by a server-reported failure.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::NoData { .. } => Some(codes::OK),
            Self::Server { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Payload attached to a server-reported failure, if any.
    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Server {
                data: Some(data), ..
            } => Some(data),
            _ => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData { .. })
    }
}

/// Helpers for creating common failures
impl Error {
    pub fn no_data(message: impl Into<String>) -> Self {
        Self::NoData {
            message: message.into(),
        }
    }

    pub fn server(code: i32, message: impl Into<String>, data: Option<Value>) -> Self {
        Self::Server {
            code,
            message: message.into(),
            data,
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_no_data_is_distinguishable() {
        let err = Error::no_data("empty result");
        assert!(err.is_no_data());
        assert_eq!(err.code(), Some(codes::OK));
        assert!(err.data().is_none());
    }

    #[test]
    fn test_server_failure_carries_code_and_payload() {
        let err = Error::server(7, "server error", Some(json!({"x": 1})));
        assert!(!err.is_no_data());
        assert_eq!(err.code(), Some(7));
        assert_eq!(err.data(), Some(&json!({"x": 1})));
    }

    #[test]
    fn test_non_server_failures_have_no_code() {
        let err = Error::decode("bad body");
        assert_eq!(err.code(), None);
        assert!(err.data().is_none());

        let err = Error::Http {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.code(), None);
    }

    #[test]
    fn test_display_includes_message() {
        let err = Error::server(3, "special", None);
        assert_eq!(err.to_string(), "server failure 3: special");

        let err = Error::no_data("empty result");
        assert_eq!(err.to_string(), "empty result: empty result");
    }
}
