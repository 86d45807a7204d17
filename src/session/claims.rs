use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

/// base64url, with or without `=` padding.
const JWT_PAYLOAD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("token has no payload segment")]
    MissingPayload,
    #[error("payload is not valid base64url")]
    Base64,
    #[error("payload is not a JSON object")]
    Json,
}

/// Claims read out of a bearer token's payload.
///
/// Decoding does not check the signature: these values are only good for
/// deciding what to show, never for deciding what is allowed. The server
/// re-checks every request.
#[derive(Debug, Clone, PartialEq)]
pub struct Claims {
    /// `sub`, the username.
    pub subject: Option<String>,
    /// `exp`, seconds since the Unix epoch.
    pub expires_at: Option<f64>,
    /// `is_admin`; only a JSON `true` counts.
    pub is_admin: bool,
}

impl Claims {
    /// Decode the payload (second dot-separated segment) of `token`.
    pub fn decode(token: &str) -> Result<Self, DecodeError> {
        let payload = token
            .split('.')
            .nth(1)
            .filter(|segment| !segment.is_empty())
            .ok_or(DecodeError::MissingPayload)?;

        let bytes = JWT_PAYLOAD
            .decode(payload)
            .map_err(|_| DecodeError::Base64)?;

        let value: Value = serde_json::from_slice(&bytes).map_err(|_| DecodeError::Json)?;
        let object = value.as_object().ok_or(DecodeError::Json)?;

        Ok(Self {
            subject: object
                .get("sub")
                .and_then(Value::as_str)
                .map(str::to_string),
            expires_at: object.get("exp").and_then(Value::as_f64),
            is_admin: object
                .get("is_admin")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        })
    }

    /// True when `exp` is strictly after `now`. Both sides are compared in
    /// milliseconds; a missing `exp` never counts as live.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(exp) => exp * 1000.0 > now.timestamp_millis() as f64,
            None => false,
        }
    }
}
