//! Outgoing mail for signup verification codes.
//!
//! `MailSender` is the seam the auth service talks to. `SmtpMailer` delivers
//! through an SMTP relay; `LogMailer` only writes the code to the log and is
//! what development runs without SMTP settings get.

use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header},
    transport::smtp::authentication::Credentials,
};
use thiserror::Error;

use crate::env_config::MailConfig;

#[derive(Error, Debug)]
pub enum MailError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("transport failure: {0}")]
    Transport(String),
}

/// A one-time verification code addressed to a pending user.
#[derive(Debug, Clone)]
pub struct OtpMail<'a> {
    pub to_email: &'a str,
    pub to_name: &'a str,
    pub code: &'a str,
    pub expires_in_minutes: i64,
}

#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send_otp(&self, mail: OtpMail<'_>) -> Result<(), MailError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig, timeout: Duration) -> Result<Self, MailError> {
        let from: Mailbox = format!("{} <{}>", config.from_name, config.from_email)
            .parse()
            .map_err(|e| MailError::InvalidAddress(format!("from address: {}", e)))?;

        let creds = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        // 465 speaks implicit TLS, everything else upgrades with STARTTLS
        let builder = if config.smtp_port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
        }
        .map_err(|e| MailError::Transport(format!("Failed to configure SMTP relay: {}", e)))?;

        let transport = builder
            .port(config.smtp_port)
            .credentials(creds)
            .timeout(Some(timeout))
            .build();

        Ok(SmtpMailer { transport, from })
    }
}

#[async_trait]
impl MailSender for SmtpMailer {
    async fn send_otp(&self, mail: OtpMail<'_>) -> Result<(), MailError> {
        let to: Mailbox = mail
            .to_email
            .parse()
            .map_err(|e| MailError::InvalidAddress(format!("{}: {}", mail.to_email, e)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject("Your verification code")
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(otp_text_body(&mail)),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(otp_html_body(&mail)),
                    ),
            )
            .map_err(|e| MailError::Build(e.to_string()))?;

        match self.transport.send(message).await {
            Ok(_) => {
                log::info!("Verification code sent to {}", mail.to_email);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to send verification code to {}: {}", mail.to_email, e);
                Err(MailError::Transport(e.to_string()))
            }
        }
    }
}

/// Writes the code to the log instead of sending it.
pub struct LogMailer;

#[async_trait]
impl MailSender for LogMailer {
    async fn send_otp(&self, mail: OtpMail<'_>) -> Result<(), MailError> {
        log::warn!(
            "SMTP not configured, verification code for {} is {}",
            mail.to_email,
            mail.code
        );
        Ok(())
    }
}

fn otp_text_body(mail: &OtpMail<'_>) -> String {
    format!(
        "Hello {name},\n\n\
         Your verification code is: {code}\n\n\
         This code expires in {minutes} minutes.\n\n\
         If you didn't request this code, you can ignore this email.\n",
        name = mail.to_name,
        code = mail.code,
        minutes = mail.expires_in_minutes,
    )
}

fn otp_html_body(mail: &OtpMail<'_>) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; color: #333;">
    <p>Hello {name},</p>
    <p>Your verification code is:</p>
    <p style="font-size: 28px; font-weight: bold; letter-spacing: 4px;">{code}</p>
    <p>This code expires in <strong>{minutes} minutes</strong>.</p>
    <p>If you didn't request this code, you can ignore this email.</p>
</body>
</html>"#,
        name = escape_html(mail.to_name),
        code = mail.code,
        minutes = mail.expires_in_minutes,
    )
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
