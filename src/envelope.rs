use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::{codes, Error};

/// Decoded server response wrapper.
///
/// Every endpoint answers with the same JSON shape: an integer classifier,
/// a human-readable message, and an optional payload. The payload stays raw
/// until classification has decided the call succeeded, so failures can
/// carry it through unchanged.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub code: i32,
    pub message: String,
    pub data: Option<Value>,
}

impl Envelope {
    /// Classify the envelope, returning the raw payload on success.
    ///
    /// Classifier `0` with a payload is success; classifier `0` without one
    /// becomes [`Error::NoData`], keeping "nothing to show" distinguishable
    /// from a server-reported error. Every other classifier becomes
    /// [`Error::Server`] with the code, message, and payload preserved
    /// exactly.
    pub fn into_value(self) -> Result<Value, Error> {
        match self.code {
            codes::OK => match self.data {
                Some(value) => Ok(value),
                None => Err(Error::NoData {
                    message: self.message,
                }),
            },
            _ => Err(Error::Server {
                code: self.code,
                message: self.message,
                data: self.data,
            }),
        }
    }

    /// Classify the envelope, deserializing the payload on success.
    pub fn into_result<T: DeserializeOwned>(self) -> Result<T, Error> {
        let value = self.into_value()?;
        serde_json::from_value(value)
            .map_err(|e| Error::decode(format!("payload did not match the expected shape: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(code: i32, message: &str, data: Option<Value>) -> Envelope {
        Envelope {
            code,
            message: message.to_string(),
            data,
        }
    }

    #[test]
    fn test_ok_without_payload_is_no_data() {
        let result = envelope(0, "empty result", None).into_value();
        match result {
            Err(Error::NoData { message }) => assert_eq!(message, "empty result"),
            other => panic!("expected NoData, got {other:?}"),
        }
    }

    #[test]
    fn test_ok_with_payload_is_success() {
        let payload = envelope(0, "ok", Some(json!(["a", "b"])))
            .into_value()
            .expect("expected success");
        assert_eq!(payload, json!(["a", "b"]));
    }

    #[test]
    fn test_session_expired_is_a_plain_server_failure() {
        let result = envelope(3, "special", Some(json!({"x": 1}))).into_value();
        match result {
            Err(Error::Server {
                code,
                message,
                data,
            }) => {
                assert_eq!(code, codes::SESSION_EXPIRED);
                assert_eq!(message, "special");
                assert_eq!(data, Some(json!({"x": 1})));
            }
            other => panic!("expected Server, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_code_round_trips_all_fields() {
        let result = envelope(7, "server error", None).into_value();
        match result {
            Err(Error::Server {
                code,
                message,
                data,
            }) => {
                assert_eq!(code, 7);
                assert_eq!(message, "server error");
                assert_eq!(data, None);
            }
            other => panic!("expected Server, got {other:?}"),
        }
    }

    #[test]
    fn test_failure_payload_is_not_transformed() {
        let payload = json!({"partial": [1, 2, 3], "hint": "retry later"});
        let err = envelope(12, "overloaded", Some(payload.clone()))
            .into_value()
            .unwrap_err();
        assert_eq!(err.code(), Some(12));
        assert_eq!(err.data(), Some(&payload));
    }

    #[test]
    fn test_typed_payload_deserializes() {
        #[derive(Debug, PartialEq, Deserialize)]
        struct Course {
            id: u32,
            title: String,
        }

        let courses: Vec<Course> = envelope(
            0,
            "ok",
            Some(json!([{"id": 1, "title": "Ownership"}])),
        )
        .into_result()
        .expect("expected success");
        assert_eq!(
            courses,
            vec![Course {
                id: 1,
                title: "Ownership".to_string()
            }]
        );
    }

    #[test]
    fn test_mismatched_payload_is_a_decode_failure() {
        let result: Result<String, Error> =
            envelope(0, "ok", Some(json!({"not": "a string"}))).into_result();
        assert!(matches!(result, Err(Error::Decode { .. })));
    }

    #[test]
    fn test_envelope_deserializes_with_and_without_data() {
        let envelope: Envelope =
            serde_json::from_str(r#"{"code": 0, "message": "ok", "data": "payload"}"#).unwrap();
        assert_eq!(envelope.code, 0);
        assert_eq!(envelope.data, Some(json!("payload")));

        let envelope: Envelope =
            serde_json::from_str(r#"{"code": 5, "message": "nope"}"#).unwrap();
        assert_eq!(envelope.code, 5);
        assert_eq!(envelope.data, None);

        let envelope: Envelope =
            serde_json::from_str(r#"{"code": 0, "message": "ok", "data": null}"#).unwrap();
        assert_eq!(envelope.data, None);
    }
}
