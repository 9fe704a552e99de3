//! JSON wire format spoken with the controller.
//!
//! Outbound, one frame per sampling interval:
//! ```text
//! { "type": "sensor_update", "device": "<id>",
//!   "data": { "temp": f, "humidity": f, "lux": f,
//!             "tank": n, "gas": n, "soil": [n, ...] } }
//! ```
//!
//! Inbound, arbitrary arrival:
//! ```text
//! { "command": "<NAME>", "id": n, "state": b }
//! ```
//! `id` is optional (absent or `null` → 0).  `command` and `state` are
//! required; a frame missing either does not decode.  Unknown fields are
//! ignored.

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::error::CommsError;
use crate::sensors::SensorSnapshot;

/// Message-type discriminator of every outbound snapshot.
pub const SENSOR_UPDATE: &str = "sensor_update";

/// Longest command name that decodes.  Longer names are not part of any
/// vocabulary and are treated as malformed.
pub const MAX_COMMAND_LEN: usize = 24;

#[derive(Debug, Serialize)]
struct SensorUpdate<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    device: &'a str,
    data: Readings<'a>,
}

#[derive(Debug, Serialize)]
struct Readings<'a> {
    temp: f32,
    humidity: f32,
    lux: f32,
    tank: u16,
    gas: u16,
    soil: &'a [u8],
}

/// Encode `snap` as one `sensor_update` frame.  Only the first
/// `active_plants` soil slots are sent.
pub fn encode_snapshot(
    device: &str,
    snap: &SensorSnapshot,
    active_plants: usize,
) -> Result<std::string::String, CommsError> {
    let soil = &snap.soil[..active_plants.min(snap.soil.len())];
    let msg = SensorUpdate {
        kind: SENSOR_UPDATE,
        device,
        data: Readings {
            temp: snap.temperature,
            humidity: snap.humidity,
            lux: snap.lux,
            tank: snap.tank,
            gas: snap.gas,
            soil,
        },
    };
    serde_json::to_string(&msg).map_err(|_| CommsError::Serialize)
}

/// A decoded inbound instruction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Command {
    #[serde(rename = "command")]
    pub name: String<MAX_COMMAND_LEN>,
    #[serde(default, deserialize_with = "id_or_zero")]
    pub id: i32,
    pub state: bool,
}

/// Anything but an integer that fits `i32` reads as 0.
fn id_or_zero<'de, D>(de: D) -> Result<i32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(de)?;
    Ok(value.as_i64().and_then(|n| i32::try_from(n).ok()).unwrap_or(0))
}

/// Decode one inbound frame.  `None` for anything that is not a
/// well-formed command object.
pub fn decode_command(bytes: &[u8]) -> Option<Command> {
    serde_json::from_slice(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_PLANTS;

    fn snapshot() -> SensorSnapshot {
        SensorSnapshot {
            temperature: 24.5,
            humidity: 61.25,
            lux: 300.0,
            soil: [10, 20, 30, 40, 50, 60],
            tank: 1800,
            gas: 412,
        }
    }

    #[test]
    fn snapshot_frame_layout() {
        let json = encode_snapshot("esp32_main", &snapshot(), 3).unwrap();
        assert_eq!(
            json,
            r#"{"type":"sensor_update","device":"esp32_main","data":{"temp":24.5,"humidity":61.25,"lux":300.0,"tank":1800,"gas":412,"soil":[10,20,30]}}"#
        );
    }

    #[test]
    fn soil_is_never_longer_than_capacity() {
        let json = encode_snapshot("n", &snapshot(), MAX_PLANTS + 4).unwrap();
        assert!(json.contains(r#""soil":[10,20,30,40,50,60]"#));
    }

    #[test]
    fn decodes_full_command() {
        let cmd = decode_command(br#"{"command":"PUMP","id":2,"state":true}"#).unwrap();
        assert_eq!(cmd.name.as_str(), "PUMP");
        assert_eq!(cmd.id, 2);
        assert!(cmd.state);
    }

    #[test]
    fn missing_or_null_id_is_zero() {
        let cmd = decode_command(br#"{"command":"LIGHT","state":false}"#).unwrap();
        assert_eq!(cmd.id, 0);
        let cmd = decode_command(br#"{"command":"LIGHT","id":null,"state":true}"#).unwrap();
        assert_eq!(cmd.id, 0);
    }

    #[test]
    fn non_integer_or_oversized_id_is_zero() {
        for frame in [
            &br#"{"command":"PUMP","id":"1","state":true}"#[..],
            br#"{"command":"PUMP","id":1.0,"state":true}"#,
            br#"{"command":"PUMP","id":4294967296,"state":true}"#,
            br#"{"command":"PUMP","id":[2],"state":true}"#,
        ] {
            let cmd = decode_command(frame).unwrap();
            assert_eq!(cmd.id, 0);
            assert_eq!(cmd.name.as_str(), "PUMP");
        }
        let cmd = decode_command(br#"{"command":"PUMP","id":-7,"state":false}"#).unwrap();
        assert_eq!(cmd.id, -7);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let cmd = decode_command(br#"{"command":"FAN_INTAKE","state":true,"extra":[1,2]}"#);
        assert!(cmd.is_some());
    }

    #[test]
    fn rejects_malformed_frames() {
        assert_eq!(decode_command(b""), None);
        assert_eq!(decode_command(b"{not json"), None);
        assert_eq!(decode_command(br#"{"id":1,"state":true}"#), None);
        assert_eq!(decode_command(br#"{"command":"PUMP","id":1}"#), None);
        assert_eq!(decode_command(br#"{"command":"PUMP","state":"yes"}"#), None);
        assert_eq!(decode_command(br#"{"command":7,"state":true}"#), None);
        assert_eq!(decode_command(br#"[1,2,3]"#), None);
    }
}
