//! JSON wire format for update messages.
//!
//! ```json
//! {"type":"update","driverId":"…","latitude":47.55,"longitude":-52.74,"status":"delivering","eta":1700000000000}
//! ```

use serde::Serialize;
use serde::de::Error as _;
use serde_json::Value;

use fleet_core::DriverUpdate;

use crate::{SimError, SimResult};

/// Value of the `type` tag on update messages.
pub const UPDATE_TYPE: &str = "update";

#[derive(Serialize)]
struct Outbound<'a> {
    #[serde(rename = "type")]
    kind:   &'static str,
    #[serde(flatten)]
    update: &'a DriverUpdate,
}

/// Serialize one outbound message.  Failures surface as [`SimError::Encode`].
pub fn encode(update: &DriverUpdate) -> SimResult<String> {
    serde_json::to_string(&Outbound { kind: UPDATE_TYPE, update }).map_err(SimError::Encode)
}

/// Parse one inbound message.
///
/// # Errors
///
/// - [`SimError::MalformedMessage`] — not JSON, a field is missing or of the
///   wrong type, or a coordinate is not finite.
/// - [`SimError::UnsupportedMessage`] — valid JSON whose `type` is not
///   `"update"` (or is absent).
pub fn decode(text: &str) -> SimResult<DriverUpdate> {
    let value: Value = serde_json::from_str(text)?;
    match value.get("type").and_then(Value::as_str) {
        Some(UPDATE_TYPE) => {}
        Some(other) => return Err(SimError::UnsupportedMessage(other.to_owned())),
        None => return Err(SimError::UnsupportedMessage("<missing>".to_owned())),
    }
    let update: DriverUpdate = serde_json::from_value(value)?;
    if !update.latitude.is_finite() || !update.longitude.is_finite() {
        return Err(serde_json::Error::custom("non-finite coordinate").into());
    }
    Ok(update)
}
