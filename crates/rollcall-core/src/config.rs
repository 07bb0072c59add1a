//! Environment-sourced kiosk configuration.
//!
//! The kiosk is configured entirely through environment variables (optionally
//! seeded from a `.env` file by the binary). Parsing goes through a lookup
//! closure so the same code path serves the process environment and tests.
//!
//! # Examples
//!
//! ```
//! use std::collections::HashMap;
//! use rollcall_core::KioskConfig;
//!
//! let vars = HashMap::from([
//!     ("API_URL", "http://10.0.0.5:3000"),
//!     ("LCD_COLS", "20"),
//!     ("LCD_ROWS", "4"),
//! ]);
//!
//! let config = KioskConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
//! assert_eq!(config.lcd_columns, 20);
//! assert_eq!(config.api_url.as_str(), "http://10.0.0.5:3000/");
//! ```

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::constants::*;
use crate::{Error, Result};

/// Where card ids come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderSource {
    /// No reader hardware; never reports a card while polling.
    Simulated,
    /// Newline-terminated card ids typed on standard input.
    Stdin,
    /// Newline-terminated card ids read from a device node (keyboard-wedge or
    /// serial readers).
    Device(PathBuf),
}

impl FromStr for ReaderSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "" => Err(Error::InvalidConfig {
                key: "RFID_READER".to_string(),
                value: s.to_string(),
            }),
            "simulated" | "sim" => Ok(Self::Simulated),
            "stdin" | "-" => Ok(Self::Stdin),
            path => Ok(Self::Device(PathBuf::from(path))),
        }
    }
}

/// Where display output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayTarget {
    /// Echo every write to standard output.
    Console,
    /// Discard all output (headless kiosks).
    None,
}

impl FromStr for DisplayTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "console" => Ok(Self::Console),
            "none" | "off" => Ok(Self::None),
            other => Err(Error::InvalidConfig {
                key: "LCD_DISPLAY".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Timing knobs for the control loop, backend client and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub poll_interval: Duration,
    pub debounce_window: Duration,
    pub iteration_backoff: Duration,
    pub health_timeout: Duration,
    pub health_retry: Duration,
    pub request_timeout: Duration,
    pub result_dwell: Duration,
    pub startup_dwell: Duration,
    pub shutdown_dwell: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            debounce_window: Duration::from_millis(DEFAULT_DEBOUNCE_WINDOW_MS),
            iteration_backoff: Duration::from_millis(DEFAULT_ITERATION_BACKOFF_MS),
            health_timeout: Duration::from_millis(DEFAULT_HEALTH_TIMEOUT_MS),
            health_retry: Duration::from_millis(DEFAULT_HEALTH_RETRY_MS),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            result_dwell: Duration::from_millis(DEFAULT_RESULT_DWELL_MS),
            startup_dwell: Duration::from_millis(DEFAULT_STARTUP_DWELL_MS),
            shutdown_dwell: Duration::from_millis(DEFAULT_SHUTDOWN_DWELL_MS),
        }
    }
}

/// Complete kiosk configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KioskConfig {
    /// Backend base URL.
    pub api_url: Url,

    /// Value sent in the `X-API-Token` header.
    pub api_token: String,

    /// LCD backpack bus address.
    pub lcd_i2c_address: u8,

    pub lcd_columns: usize,
    pub lcd_rows: usize,

    pub reader: ReaderSource,
    pub display: DisplayTarget,

    pub timings: Timings,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            api_token: String::new(),
            lcd_i2c_address: DEFAULT_LCD_I2C_ADDRESS,
            lcd_columns: DEFAULT_LCD_COLUMNS,
            lcd_rows: DEFAULT_LCD_ROWS,
            reader: ReaderSource::Simulated,
            display: DisplayTarget::Console,
            timings: Timings::default(),
        }
    }
}

impl KioskConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Returns an error if any variable is present but malformed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults for
    /// missing keys.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfig` naming the first malformed variable, or
    /// `Error::InvalidGeometry` when the LCD has no rows or columns.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("API_URL") {
            config.api_url = Url::parse(raw.trim()).map_err(|_| invalid("API_URL", &raw))?;
        }
        if let Some(token) = lookup("API_TOKEN") {
            config.api_token = token;
        }
        if let Some(raw) = lookup("LCD_I2C_ADDRESS") {
            config.lcd_i2c_address = parse_i2c_address(&raw)?;
        }
        if let Some(raw) = lookup("LCD_COLS") {
            config.lcd_columns = parse_number("LCD_COLS", &raw)?;
        }
        if let Some(raw) = lookup("LCD_ROWS") {
            config.lcd_rows = parse_number("LCD_ROWS", &raw)?;
        }
        if let Some(raw) = lookup("RFID_READER") {
            config.reader = raw.parse()?;
        }
        if let Some(raw) = lookup("LCD_DISPLAY") {
            config.display = raw.parse()?;
        }

        let timings = &mut config.timings;
        for (key, slot) in [
            ("POLL_INTERVAL_MS", &mut timings.poll_interval),
            ("DEBOUNCE_WINDOW_MS", &mut timings.debounce_window),
            ("HEALTH_TIMEOUT_MS", &mut timings.health_timeout),
            ("HEALTH_RETRY_MS", &mut timings.health_retry),
            ("REQUEST_TIMEOUT_MS", &mut timings.request_timeout),
            ("RESULT_DWELL_MS", &mut timings.result_dwell),
        ] {
            if let Some(raw) = lookup(key) {
                *slot = Duration::from_millis(parse_number(key, &raw)?);
            }
        }

        if config.lcd_columns == 0 || config.lcd_rows == 0 {
            return Err(Error::InvalidGeometry {
                columns: config.lcd_columns,
                rows: config.lcd_rows,
            });
        }

        Ok(config)
    }
}

fn invalid(key: &str, value: &str) -> Error {
    Error::InvalidConfig {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| invalid(key, raw))
}

/// Parse a bus address written as hex, with or without a `0x` prefix.
fn parse_i2c_address(raw: &str) -> Result<u8> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    u8::from_str_radix(digits, 16).map_err(|_| invalid("LCD_I2C_ADDRESS", raw))
}
