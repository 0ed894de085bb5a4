/// Credentials baked into the firmware image. Environment variables take
/// priority over values from `.env`.
const CREDENTIAL_VARS: [&str; 7] = [
    "MOUSETRAP_WIFI_SSID",
    "MOUSETRAP_WIFI_PASSWORD",
    "MOUSETRAP_SMTP_USER",
    "MOUSETRAP_SMTP_PASSWORD",
    "MOUSETRAP_SENDER_NAME",
    "MOUSETRAP_RECIPIENT",
    "MOUSETRAP_NTP_HOST",
];

fn main() {
    load_env_config();

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}

/// Load credentials from `.env` and forward them as compile-time env vars.
fn load_env_config() {
    use std::env;
    use std::path::Path;

    println!("cargo:rerun-if-changed=.env");
    for var in CREDENTIAL_VARS {
        println!("cargo:rerun-if-env-changed={}", var);
    }

    if Path::new(".env").exists() {
        match dotenvy::dotenv() {
            Ok(_) => println!("cargo:warning=Loaded .env file"),
            Err(e) => println!("cargo:warning=Failed to load .env file: {}", e),
        }
    }

    for var in CREDENTIAL_VARS {
        let value = env::var(var).unwrap_or_default().trim().to_string();
        println!("cargo:rustc-env={}={}", var, value);
    }

    let ssid = env::var("MOUSETRAP_WIFI_SSID").unwrap_or_default();
    if ssid.trim().is_empty() {
        println!("cargo:warning=MOUSETRAP_WIFI_SSID is empty - the trap will halt at start-up");
    }
    let recipient = env::var("MOUSETRAP_RECIPIENT").unwrap_or_default();
    if recipient.trim().is_empty() {
        println!("cargo:warning=MOUSETRAP_RECIPIENT is empty - notifications will be rejected");
    }
}
