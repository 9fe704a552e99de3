//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to              |
//! |----------------|--------------------|--------------------------|
//! | `hardware`     | SensorPort         | SHT3x/BH1750 (I²C), ADC1 |
//! |                | OutputPort         | ESP32 GPIO               |
//! | `log_sink`     | EventSink          | Serial log output        |
//! | `time`         | ClockPort          | ESP32 system timer       |
//! | `ws_transport` | FrameTransport     | WebSocket client         |
//! | `wifi`         | —                  | ESP-IDF WiFi STA         |
//! | `device_id`    | —                  | eFuse factory MAC        |

pub mod device_id;
pub mod hardware;
pub mod log_sink;
pub mod time;
pub mod wifi;
pub mod ws_transport;
