/// Email service for account verification mail
use crate::config::EmailConfig;
use crate::error::{AppError, Result};
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
struct SmtpSender {
    transport: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    from: Mailbox,
}

/// Async email transport wrapper (SMTP or no-op)
#[derive(Clone)]
pub struct EmailService {
    sender: Option<SmtpSender>,
    verification_base_url: String,
}

impl EmailService {
    /// Build email service from configuration
    ///
    /// If SMTP host is empty, operates in no-op mode (logs only).
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let from = config
            .smtp_from
            .parse::<Mailbox>()
            .map_err(|e| AppError::Internal(format!("Invalid SMTP_FROM address: {}", e)))?;

        let sender = if config.smtp_host.trim().is_empty() {
            warn!("SMTP host not configured; email service will operate in no-op mode");
            None
        } else {
            let builder = if config.use_starttls {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            } else {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            }
            .map_err(|e| AppError::Internal(format!("Failed to configure SMTP transport: {}", e)))?
            .port(config.smtp_port);

            let builder = if let (Some(username), Some(password)) =
                (&config.smtp_username, &config.smtp_password)
            {
                builder.credentials(Credentials::new(username.to_string(), password.to_string()))
            } else {
                builder
            };

            Some(SmtpSender {
                transport: Arc::new(builder.build()),
                from,
            })
        };

        Ok(Self {
            sender,
            verification_base_url: config.verification_base_url.clone(),
        })
    }

    /// Mailer that only logs; used when no SMTP relay exists
    pub fn disabled(verification_base_url: &str) -> Self {
        Self {
            sender: None,
            verification_base_url: verification_base_url.to_string(),
        }
    }

    /// Check if SMTP transport is enabled
    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    /// Link the recipient follows to verify their address
    pub fn build_verification_link(&self, token: &str) -> String {
        format!("{}/{}", self.verification_base_url.trim_end_matches('/'), token)
    }

    /// Send verification email with activation link
    pub async fn send_verification_email(&self, recipient: &str, name: &str, token: &str) -> Result<()> {
        let link = self.build_verification_link(token);
        let subject = "Verify your email address";
        let body = format!(
            "Hi {},\n\nThanks for signing up. Please confirm your email address by opening the link below:\n{}\n\nIf you did not create an account, you can ignore this email.",
            name, link
        );
        self.send_mail(recipient, subject, &body).await
    }

    async fn send_mail(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        let Some(sender) = &self.sender else {
            info!(recipient = %recipient, subject = %subject, "email delivery skipped (no-op mode)");
            return Ok(());
        };

        let to = recipient
            .parse::<Mailbox>()
            .map_err(|e| AppError::Validation(format!("Invalid recipient address: {}", e)))?;

        let message = Message::builder()
            .from(sender.from.clone())
            .to(to)
            .subject(subject)
            .header(header::ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        sender
            .transport
            .send(message)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to send email: {}", e)))?;

        info!(recipient = %recipient, subject = %subject, "email sent");
        Ok(())
    }
}
