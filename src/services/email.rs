// src/services/email.rs
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_sesv2::config::Region;
use aws_sdk_sesv2::types::{Body as SesBody, Content, Destination, EmailContent, Message};
use aws_sdk_sesv2::Client as SesClient;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::auth::otp::OtpPurpose;
use crate::common::config::EmailConfig;
use crate::common::safe_email_log;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// Outbound email delivery
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), EmailError>;
}

/// Delivers mail through AWS SES v2
pub struct SesEmailSender {
    client: SesClient,
    from_address: String,
}

impl SesEmailSender {
    /// Credentials come from the default AWS provider chain.
    pub async fn new(config: &EmailConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.ses_region {
            loader = loader.region(Region::new(region.clone()));
        }
        let aws_config = loader.load().await;

        Self {
            client: SesClient::new(&aws_config),
            from_address: config.from_address.clone(),
        }
    }
}

#[async_trait]
impl EmailSender for SesEmailSender {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), EmailError> {
        let destination = Destination::builder().to_addresses(to).build();

        let subject_content = Content::builder()
            .data(subject)
            .charset("UTF-8")
            .build()
            .map_err(|e| EmailError::Build(format!("subject: {}", e)))?;

        let body_content = Content::builder()
            .data(html_body)
            .charset("UTF-8")
            .build()
            .map_err(|e| EmailError::Build(format!("body: {}", e)))?;

        let message = Message::builder()
            .subject(subject_content)
            .body(SesBody::builder().html(body_content).build())
            .build();

        let result = self
            .client
            .send_email()
            .from_email_address(&self.from_address)
            .destination(destination)
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, to = %safe_email_log(to), "Failed to send email via SES");
                EmailError::Delivery(e.to_string())
            })?;

        info!(
            to = %safe_email_log(to),
            message_id = ?result.message_id(),
            "Email sent successfully via SES"
        );
        Ok(())
    }
}

/// Writes outgoing mail to the log instead of sending it.
/// Only wired up outside production when no sender is configured.
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), EmailError> {
        warn!(
            to = %safe_email_log(to),
            subject = %subject,
            body = %html_body,
            "Email delivery not configured, logging message instead"
        );
        Ok(())
    }
}

/// Subject and HTML body for an OTP email
pub fn otp_email(code: &str, purpose: OtpPurpose) -> (String, String) {
    let (subject, message) = match purpose {
        OtpPurpose::Signup => (
            "Verify Your Email - NoteBase",
            format!(
                "Your verification code is: {}. This code will expire in 10 minutes.",
                code
            ),
        ),
        OtpPurpose::PasswordReset => (
            "Reset Your Password - NoteBase",
            format!(
                "Your password reset code is: {}. This code will expire in 10 minutes.",
                code
            ),
        ),
    };

    let body = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        .code {{ background-color: #f5f5f5; padding: 20px; text-align: center; margin: 20px 0; }}
        .code h1 {{ color: #2563eb; margin: 0; font-size: 32px; letter-spacing: 5px; }}
        .footer {{ padding: 20px 0; font-size: 12px; color: #666; }}
    </style>
</head>
<body>
    <div class="container">
        <h2>NoteBase</h2>
        <p>Hello,</p>
        <p>{}</p>
        <div class="code">
            <h1>{}</h1>
        </div>
        <p>If you didn't request this, please ignore this email.</p>
        <p>Best regards,<br>NoteBase Team</p>
        <div class="footer">
            <p>This is an automated message. Please do not reply directly to this email.</p>
        </div>
    </div>
</body>
</html>"#,
        message, code
    );

    (subject.to_string(), body)
}
