//! Outbound mail delivery for booking and cancellation notices.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::{Config, MailConfig};
use crate::error::{AppError, AppResult};

/// Mail transport selected by configuration.
///
/// The `console` driver logs messages instead of sending them, which is the
/// default for development and tests. A send failure never rolls back the
/// booking or cancellation that triggered it; callers log a warning and
/// report delivery status to the client.
#[derive(Clone)]
pub enum Mailer {
    Smtp(SmtpMailer),
    Console,
}

impl Mailer {
    pub fn from_config(config: &Config) -> Self {
        match &config.mail {
            MailConfig::Console => Mailer::Console,
            MailConfig::Smtp(smtp) => Mailer::Smtp(SmtpMailer {
                host: smtp.host.clone(),
                port: smtp.port,
                credentials: Credentials::new(smtp.username.clone(), smtp.password.clone()),
                from_email: smtp.from_email.clone(),
                from_name: smtp.from_name.clone(),
            }),
        }
    }

    pub async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        match self {
            Mailer::Console => {
                tracing::info!(to = %to, subject = %subject, "mail delivered to console driver");
                tracing::debug!(body = %body, "mail body");
                Ok(())
            }
            Mailer::Smtp(smtp) => smtp.send(to, subject, body).await,
        }
    }
}

#[derive(Clone)]
pub struct SmtpMailer {
    host: String,
    port: u16,
    credentials: Credentials,
    from_email: String,
    from_name: String,
}

impl SmtpMailer {
    /// Creates a new transport per message to avoid connection pooling issues.
    fn build_transport(&self) -> AppResult<SmtpTransport> {
        Ok(SmtpTransport::relay(&self.host)
            .map_err(|e| AppError::Internal(format!("SMTP relay error: {}", e)))?
            .port(self.port)
            .credentials(self.credentials.clone())
            .build())
    }

    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        let email = Message::builder()
            .from(
                format!("{} <{}>", self.from_name, self.from_email)
                    .parse()
                    .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?,
            )
            .to(to
                .parse()
                .map_err(|e| AppError::Internal(format!("Invalid to address: {}", e)))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        let mailer = self.build_transport()?;

        tokio::task::spawn_blocking(move || {
            mailer
                .send(&email)
                .map_err(|e| AppError::Internal(format!("Failed to send email: {}", e)))
        })
        .await
        .map_err(|e| AppError::Internal(format!("Email task failed: {}", e)))?
        .map(|_| ())
    }
}
