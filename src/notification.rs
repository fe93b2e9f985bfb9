use lettre::{
    Message, SmtpTransport, Transport,
    address::AddressError,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use thiserror::Error;

use crate::config::{Config, SmtpSettings};

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Invalid email address '{address}': {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: AddressError,
    },

    #[error("Failed to build email: {0}")]
    BuildFailed(#[from] lettre::error::Error),

    #[error("Failed to connect to mail server '{host}': {source}")]
    ConnectFailed {
        host: String,
        #[source]
        source: lettre::transport::smtp::Error,
    },

    #[error("Failed to deliver email: {0}")]
    TransportFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Email delivery is not configured: {0}")]
    NotConfigured(String),
}

/// A fixed email: sender, recipient, subject and body are not derived from
/// any invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

pub trait Notifier {
    fn send(&self, notification: &Notification) -> Result<(), DeliveryError>;
}

/// Delivers notifications as plain-text emails over any lettre transport
pub struct MailNotifier<T> {
    transport: T,
}

impl<T> MailNotifier<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }
}

impl MailNotifier<SmtpTransport> {
    pub fn smtp(settings: &SmtpSettings) -> Result<Self, DeliveryError> {
        let mut builder =
            SmtpTransport::relay(&settings.host).map_err(|e| DeliveryError::ConnectFailed {
                host: settings.host.clone(),
                source: e,
            })?;

        if let Some(port) = settings.port {
            builder = builder.port(port);
        }
        if let (Some(username), Some(password)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self::new(builder.build()))
    }
}

/// Stands in for a mailer that could not be set up; every send fails with
/// [`DeliveryError::NotConfigured`]
pub struct UnavailableNotifier {
    reason: String,
}

impl UnavailableNotifier {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Notifier for UnavailableNotifier {
    fn send(&self, _notification: &Notification) -> Result<(), DeliveryError> {
        Err(DeliveryError::NotConfigured(self.reason.clone()))
    }
}

/// SMTP notifier for the configured relay, or an [`UnavailableNotifier`]
/// explaining why there is none
pub fn configured_notifier(config: &Config) -> Box<dyn Notifier> {
    let notifier = config
        .smtp_settings()
        .map_err(|e| e.to_string())
        .and_then(|settings| MailNotifier::smtp(&settings).map_err(|e| e.to_string()));

    match notifier {
        Ok(notifier) => Box::new(notifier),
        Err(reason) => {
            tracing::warn!(reason = %reason, "email delivery unavailable");
            Box::new(UnavailableNotifier::new(reason))
        }
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    address
        .parse()
        .map_err(|e| DeliveryError::InvalidAddress {
            address: address.to_string(),
            source: e,
        })
}

pub fn build_message(notification: &Notification) -> Result<Message, DeliveryError> {
    let email = Message::builder()
        .from(parse_mailbox(&notification.from)?)
        .to(parse_mailbox(&notification.to)?)
        .subject(&notification.subject)
        .header(ContentType::TEXT_PLAIN)
        .body(notification.body.clone())?;
    Ok(email)
}

impl<T> Notifier for MailNotifier<T>
where
    T: Transport,
    T::Error: std::error::Error + Send + Sync + 'static,
{
    fn send(&self, notification: &Notification) -> Result<(), DeliveryError> {
        let email = build_message(notification)?;

        tracing::debug!(to = %notification.to, subject = %notification.subject, "sending email");
        self.transport
            .send(&email)
            .map_err(|e| DeliveryError::TransportFailed(Box::new(e)))?;
        tracing::info!(to = %notification.to, "email sent");
        Ok(())
    }
}
