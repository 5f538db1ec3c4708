use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    Address,
    transport::smtp::authentication::Credentials,
    transport::smtp::client::{Tls, TlsParameters},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

fn default_from_name() -> String {
    "Aulão Solidário".to_string()
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_server: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            username: String::new(),
            password: String::new(),
            from_email: String::new(),
            from_name: default_from_name(),
        }
    }
}

impl EmailConfig {
    pub fn is_complete(&self) -> bool {
        !self.smtp_server.is_empty()
            && !self.username.is_empty()
            && !self.password.is_empty()
            && !self.from_email.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<()>;
}

/// Sends HTML mail through an authenticated SMTP relay
pub struct SmtpEmailSender {
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpEmailSender {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        if !config.is_complete() {
            return Err(anyhow!("SMTP server, username, password and sender are required"));
        }
        info!("📧 Initializing email sender for SMTP server: {}:{}", config.smtp_server, config.smtp_port);

        let from_address = config
            .from_email
            .parse::<Address>()
            .context("Failed to parse from email")?;
        let from = Mailbox::new(Some(config.from_name.clone()), from_address);

        let tls_params = TlsParameters::new(config.smtp_server.clone())
            .context("Failed to create TLS parameters")?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_server)
            .context("Failed to create SMTP relay")?
            .port(config.smtp_port)
            .tls(Tls::Required(tls_params))
            .credentials(Credentials::new(config.username.clone(), config.password.clone()))
            .build();

        Ok(Self { from, transport })
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(email.to.parse::<Mailbox>().with_context(|| format!("Invalid recipient {}", email.to))?)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(email.html_body.clone())
            .context("Failed to build email")?;

        self.transport.send(message).await.context("Failed to send email")?;
        debug!("📧 Email sent to {}", email.to);
        Ok(())
    }
}

/// Used when SMTP is not configured; every send fails
pub struct DisabledEmailSender;

#[async_trait]
impl EmailSender for DisabledEmailSender {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        Err(anyhow!("email delivery is not configured, message to {} dropped", email.to))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Records sent mail and fails for the configured recipients
    #[derive(Default)]
    pub struct RecordingEmailSender {
        pub sent: Mutex<Vec<OutgoingEmail>>,
        pub failing_recipients: HashSet<String>,
    }

    impl RecordingEmailSender {
        pub fn failing_for(recipients: &[&str]) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                failing_recipients: recipients.iter().map(|r| r.to_string()).collect(),
            }
        }

        pub fn sent(&self) -> Vec<OutgoingEmail> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EmailSender for RecordingEmailSender {
        async fn send(&self, email: &OutgoingEmail) -> Result<()> {
            if self.failing_recipients.contains(&email.to) {
                return Err(anyhow!("mailbox unavailable: {}", email.to));
            }
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }
}
