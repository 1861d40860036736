use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// Multipart field the image bytes travel under.
pub const IMAGE_FIELD: &str = "image";
pub const REMOVAL_PATH: &str = "/api/remove-watermark";
pub const HEALTH_PATH: &str = "/api/test";

/// Body returned by the removal service. Exactly one field is expected to be set.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct RemovalResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TestResponse {
    pub message: String,
}

/// What the service said, once the transport layer is out of the way.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RemovalReply {
    /// Base64 encoded image.
    Image(String),
    Failure(String),
}

impl RemovalResponse {
    pub fn success<S: Into<String>>(encoded: S) -> Self {
        Self {
            result: Some(encoded.into()),
            error: None,
        }
    }

    pub fn failure<S: Into<String>>(msg: S) -> Self {
        Self {
            result: None,
            error: Some(msg.into()),
        }
    }

    /// A non-empty `result` wins over `error`.
    pub fn into_reply(self) -> Result<RemovalReply, TransportError> {
        match (self.result, self.error) {
            (Some(result), _) if !result.is_empty() => Ok(RemovalReply::Image(result)),
            (_, Some(error)) if !error.is_empty() => Ok(RemovalReply::Failure(error)),
            _ => Err(TransportError::EmptyReply),
        }
    }
}

/// Interprets a raw HTTP answer from the removal service.
///
/// A body that parses into a result or an error is honoured whatever the
/// status code. Anything else is a transport failure: non-2xx answers keep
/// their status and body, 2xx answers report why the body was unusable.
pub fn read_reply(status: u16, body: &str) -> Result<RemovalReply, TransportError> {
    let success = (200..300).contains(&status);

    match serde_json::from_str::<RemovalResponse>(body) {
        Ok(response) => match response.into_reply() {
            Ok(reply) => Ok(reply),
            Err(err) if success => Err(err),
            Err(_) => Err(TransportError::Status {
                status,
                body: body.to_string(),
            }),
        },
        Err(e) if success => Err(TransportError::Decode(e.to_string())),
        Err(_) => Err(TransportError::Status {
            status,
            body: body.to_string(),
        }),
    }
}
