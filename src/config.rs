use std::env;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub notify_queue_size: usize,
    pub event_buffer_size: usize,
    pub tax_rate: f64,
    pub delivery_fee: f64,
    pub admin_email: String,
    pub email_endpoint: String,
    pub email_timeout_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            notify_queue_size: parse_or_default("NOTIFY_QUEUE_SIZE", 1024)?,
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", 1024)?,
            tax_rate: parse_or_default("TAX_RATE", 0.05)?,
            delivery_fee: parse_or_default("DELIVERY_FEE", 40.0)?,
            admin_email: env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@store.local".to_string()),
            email_endpoint: env::var("EMAIL_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:8025/send".to_string()),
            email_timeout_ms: parse_or_default("EMAIL_TIMEOUT_MS", 5_000)?,
        })
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
