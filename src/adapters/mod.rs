//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements        | Connects to                  |
//! |------------|-------------------|------------------------------|
//! | `hardware` | SensorPort        | ESP32 ADC, GPIO              |
//! |            | ActuatorPort      | ESP32 GPIO                   |
//! | `log_sink` | EventSink         | Serial log output            |
//! | `smtp`     | NotificationPort  | SMTP relay over TLS          |
//! | `time`     | ClockPort         | SNTP / system clock          |
//! | `wifi`     | ConnectivityPort  | ESP-IDF WiFi STA             |

pub mod hardware;
pub mod log_sink;
pub mod smtp;
pub mod time;
pub(super) mod utils;
pub mod wifi;
