use crate::errors::AppError;
use dotenvy::dotenv;
use std::{env, path::PathBuf, str::FromStr};

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub receipts_dir: PathBuf,
    pub gym_name: String,
    /// Members whose subscription ends within this many days are "expiring soon".
    pub expiring_soon_days: i64,
    /// Active members without a check-in for this many days show up as absent.
    pub absent_reminder_days: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        Ok(Self {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: parse_var("SERVER_PORT", 4000)?,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://data/gym.sqlite".to_string()),
            receipts_dir: env::var("RECEIPTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/receipts")),
            gym_name: env::var("GYM_NAME").unwrap_or_else(|_| "Gym Desk".to_string()),
            expiring_soon_days: parse_var("EXPIRING_SOON_DAYS", 7)?,
            absent_reminder_days: parse_var("ABSENT_REMINDER_DAYS", 7)?,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 4000,
            database_url: "sqlite::memory:".to_string(),
            receipts_dir: PathBuf::from("data/receipts"),
            gym_name: "Gym Desk".to_string(),
            expiring_soon_days: 7,
            absent_reminder_days: 7,
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{name} must be a valid number, got '{raw}'"))),
        Err(_) => Ok(default),
    }
}
