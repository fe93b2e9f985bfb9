use std::path::PathBuf;

use dotenvy::dotenv;
use serde::Deserialize;
use thiserror::Error;

use crate::notification::Notification;

/// Prefix of every environment variable read into [`Config`]
pub const ENV_PREFIX: &str = "TINVOICE_";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration in environment: {0}")]
    Env(#[from] envy::Error),

    #[error("Missing setting TINVOICE_{0}")]
    MissingSetting(&'static str),
}

/// Application configuration, read once at startup and handed to the
/// storage and the notifier.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Location of the invoice store
    pub data_file: Option<PathBuf>,

    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,

    #[serde(default = "default_notify_from")]
    pub notify_from: String,
    #[serde(default = "default_notify_to")]
    pub notify_to: String,
    #[serde(default = "default_notify_subject")]
    pub notify_subject: String,
    #[serde(default = "default_notify_body")]
    pub notify_body: String,
}

/// Connection details for the SMTP relay
#[derive(Debug, Clone, PartialEq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
}

fn default_notify_from() -> String {
    String::from("Personal Training <invoices@example.com>")
}

fn default_notify_to() -> String {
    String::from("client@example.com")
}

fn default_notify_subject() -> String {
    String::from("Your personal training invoice")
}

fn default_notify_body() -> String {
    String::from("Hello,\n\nAn invoice for your recent training sessions has been issued.\n\nThank you!")
}

impl Config {
    /// Load configuration from `TINVOICE_*` environment variables, after
    /// reading a `.env` file if one exists
    pub fn load() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::prefixed(ENV_PREFIX).from_iter(vars)?)
    }

    /// Configured data file, or `<data dir>/tinvoice/invoices.json`
    pub fn data_file(&self) -> PathBuf {
        self.data_file.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("tinvoice")
                .join("invoices.json")
        })
    }

    pub fn smtp_settings(&self) -> Result<SmtpSettings, ConfigError> {
        let host = self
            .smtp_host
            .clone()
            .ok_or(ConfigError::MissingSetting("SMTP_HOST"))?;

        Ok(SmtpSettings {
            host,
            port: self.smtp_port,
            username: self.smtp_username.clone(),
            password: self.smtp_password.clone(),
        })
    }

    pub fn notification(&self) -> Notification {
        Notification {
            from: self.notify_from.clone(),
            to: self.notify_to.clone(),
            subject: self.notify_subject.clone(),
            body: self.notify_body.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_without_variables() {
        let config = Config::from_vars(vars(&[("HOME", "/home/coach")])).unwrap();

        assert!(config.data_file.is_none());
        assert!(config.data_file().ends_with("tinvoice/invoices.json"));
        assert_eq!(config.notify_to, "client@example.com");
        assert!(matches!(
            config.smtp_settings(),
            Err(ConfigError::MissingSetting("SMTP_HOST"))
        ));
    }

    #[test]
    fn test_prefixed_variables() {
        let config = Config::from_vars(vars(&[
            ("TINVOICE_DATA_FILE", "/tmp/my-invoices.json"),
            ("TINVOICE_SMTP_HOST", "smtp.example.com"),
            ("TINVOICE_SMTP_PORT", "2525"),
            ("TINVOICE_SMTP_USERNAME", "coach"),
            ("TINVOICE_SMTP_PASSWORD", "secret"),
            ("TINVOICE_NOTIFY_SUBJECT", "Invoice"),
        ]))
        .unwrap();

        assert_eq!(config.data_file(), PathBuf::from("/tmp/my-invoices.json"));
        assert_eq!(
            config.smtp_settings().unwrap(),
            SmtpSettings {
                host: String::from("smtp.example.com"),
                port: Some(2525),
                username: Some(String::from("coach")),
                password: Some(String::from("secret")),
            }
        );
        assert_eq!(config.notification().subject, "Invoice");
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let result = Config::from_vars(vars(&[("TINVOICE_SMTP_PORT", "not-a-port")]));
        assert!(matches!(result, Err(ConfigError::Env(_))));
    }
}
