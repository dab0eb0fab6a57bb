use lettre::message::{MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use rollcall_config::EmailConfig;
use rollcall_core::AppError;
use tracing::{info, instrument};

/// Minutes a password-reset code stays valid.
pub const RESET_CODE_TTL_MINUTES: i64 = 10;

pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Sends a password-reset verification code. With SMTP disabled the send
    /// is skipped and only logged.
    #[instrument(skip(self, code))]
    pub async fn send_reset_code(
        &self,
        to_email: &str,
        to_name: &str,
        code: &str,
    ) -> Result<(), AppError> {
        if !self.config.enabled {
            info!(to = %to_email, "SMTP disabled; reset code not emailed");
            return Ok(());
        }

        let html_body = reset_code_template(to_name, code);
        let text_body = format!(
            "Hi {},\n\n\
             Your Rollcall password reset code is: {}\n\n\
             The code expires in {} minutes.\n\n\
             If you didn't request this, please ignore this email.",
            to_name, code, RESET_CODE_TTL_MINUTES
        );

        self.send_email(to_email, "Your password reset code", &text_body, &html_body)
            .await
    }

    #[instrument(skip(self, html_body, text_body))]
    async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), AppError> {
        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        let email = Message::builder()
            .from(
                from.parse()
                    .map_err(|e| AppError::internal_error(format!("Invalid from email: {}", e)))?,
            )
            .to(to_email
                .parse()
                .map_err(|e| AppError::internal_error(format!("Invalid to email: {}", e)))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )
            .map_err(|e| AppError::internal_error(format!("Failed to build email: {}", e)))?;

        let mailer = if self.config.smtp_username.is_empty() {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build()
        } else {
            let creds = Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            );

            SmtpTransport::relay(&self.config.smtp_host)
                .map_err(|e| {
                    AppError::internal_error(format!("Failed to create SMTP relay: {}", e))
                })?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build()
        };

        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::internal_error(format!("Task join error: {}", e)))?
            .map_err(|e| AppError::internal_error(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}

fn reset_code_template(name: &str, code: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Password Reset Code</title>
</head>
<body style="margin: 0; padding: 20px; font-family: Arial, sans-serif; background-color: #f4f4f4;">
    <table width="600" cellpadding="0" cellspacing="0" align="center" style="background-color: #ffffff; border-radius: 8px;">
        <tr>
            <td style="background-color: #0F766E; padding: 24px; text-align: center;">
                <h1 style="margin: 0; color: #ffffff; font-size: 26px;">Rollcall</h1>
            </td>
        </tr>
        <tr>
            <td style="padding: 32px 30px; color: #444444; font-size: 16px; line-height: 1.5;">
                <p>Hi <strong>{name}</strong>,</p>
                <p>Use this code to reset your password:</p>
                <p style="font-size: 32px; letter-spacing: 8px; font-weight: bold; text-align: center; color: #0F766E;">{code}</p>
                <p><strong>The code expires in {ttl} minutes.</strong></p>
                <p style="font-size: 14px; color: #777777;">If you didn't request a password reset, you can ignore this email.</p>
            </td>
        </tr>
    </table>
</body>
</html>"#,
        name = name,
        code = code,
        ttl = RESET_CODE_TTL_MINUTES
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_contains_code_and_name() {
        let html = reset_code_template("Asha", "482913");
        assert!(html.contains("482913"));
        assert!(html.contains("Asha"));
        assert!(html.contains("10 minutes"));
    }

    #[tokio::test]
    async fn test_disabled_service_skips_send() {
        let service = EmailService::new(EmailConfig::default());
        let result = service
            .send_reset_code("asha@college.edu", "Asha", "123456")
            .await;
        assert!(result.is_ok());
    }
}
