//! Submission confirmation emails.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::debug;

use econnect_core::config::{SmtpConfig, SmtpTls};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid email address `{address}`: {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },
    #[error("could not build email: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("smtp delivery failed: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;

    fn mode(&self) -> &'static str;
}

/// Authenticated SMTP relay, TLS from connect or upgraded with STARTTLS.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn from_config(config: &SmtpConfig) -> Result<Self, NotifyError> {
        let builder = match config.tls {
            SmtpTls::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?,
            SmtpTls::Starttls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?,
        };
        let credentials = Credentials::new(
            config.username.clone(),
            config.password.expose_secret().to_string(),
        );
        let transport = builder.port(config.port).credentials(credentials).build();

        let address = parse_address(&config.from_address)?;
        Ok(Self { transport, from: Mailbox::new(Some(config.brand.clone()), address) })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let to = Mailbox::new(None, parse_address(&notification.to)?);
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(notification.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(notification.body.clone())?;

        self.transport.send(message).await?;
        Ok(())
    }

    fn mode(&self) -> &'static str {
        "smtp"
    }
}

/// Used when `smtp.enabled` is false.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        debug!(
            event_name = "notify.skipped",
            subject = %notification.subject,
            "smtp disabled; confirmation email not sent"
        );
        Ok(())
    }

    fn mode(&self) -> &'static str {
        "disabled"
    }
}

fn parse_address(raw: &str) -> Result<Address, NotifyError> {
    raw.trim()
        .parse::<Address>()
        .map_err(|source| NotifyError::Address { address: raw.to_string(), source })
}
