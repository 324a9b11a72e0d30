use super::{IMailer, OutgoingMail};
use crate::config::{DebugConfig, SmtpConfig, SmtpEncryption};
use anyhow::Context;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::time::Duration;
use tracing::{debug, info};

/// Delivers reminders through the configured mail relay. In debug mode
/// every message is redirected to the debug address.
pub struct SmtpMailer {
    smtp: SmtpConfig,
    debug: DebugConfig,
}

impl SmtpMailer {
    pub fn new(smtp: SmtpConfig, debug: DebugConfig) -> Self {
        Self { smtp, debug }
    }

    /// Where a message addressed to `to` actually goes
    fn actual_recipient<'a>(&'a self, to: &'a str) -> &'a str {
        if self.debug.enabled {
            self.debug
                .email
                .as_deref()
                .unwrap_or(&self.smtp.from_address)
        } else {
            to
        }
    }

    fn build_message(&self, mail: &OutgoingMail, recipient: &str) -> anyhow::Result<Message> {
        let from = Mailbox::new(
            Some(self.smtp.from_name.clone()),
            self.smtp
                .from_address
                .parse()
                .context("FROM_EMAIL_ADDRESS is not a valid address")?,
        );
        let mut builder = Message::builder()
            .from(from)
            .to(recipient
                .parse()
                .with_context(|| format!("Invalid recipient address: {}", recipient))?)
            .subject(mail.subject.clone());
        if !self.debug.enabled {
            if let Some(bcc) = &self.smtp.bcc_address {
                builder = builder.bcc(bcc.parse().context("BCC_EMAIL_ADDRESS is not valid")?);
            }
        }
        let content_type = if mail.is_html {
            ContentType::TEXT_HTML
        } else {
            ContentType::TEXT_PLAIN
        };
        Ok(builder.header(content_type).body(mail.body.clone())?)
    }

    fn transport(&self) -> anyhow::Result<AsyncSmtpTransport<Tokio1Executor>> {
        let server = self
            .smtp
            .server
            .as_deref()
            .context("SMTP_SERVER is not configured")?;
        let builder = match self.smtp.encryption {
            SmtpEncryption::Ssl => AsyncSmtpTransport::<Tokio1Executor>::relay(server)?,
            SmtpEncryption::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(server)?
            }
            SmtpEncryption::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(server),
        };
        let builder = builder
            .port(self.smtp.port)
            .timeout(Some(Duration::from_secs(15)));
        let builder = match &self.smtp.password {
            Some(password) => builder.credentials(Credentials::new(
                self.smtp.from_address.clone(),
                password.clone(),
            )),
            None => builder,
        };
        Ok(builder.build())
    }
}

#[async_trait::async_trait]
impl IMailer for SmtpMailer {
    async fn deliver(&self, mail: &OutgoingMail) -> anyhow::Result<String> {
        let recipient = self.actual_recipient(&mail.to).to_string();
        if recipient != mail.to {
            info!(
                "Debug mode: redirecting email originally for {} to {}",
                mail.to, recipient
            );
        }
        let message = self.build_message(mail, &recipient)?;
        debug!(
            "Connecting to SMTP server {:?}:{} using {:?}",
            self.smtp.server, self.smtp.port, self.smtp.encryption
        );
        self.transport()?
            .send(message)
            .await
            .with_context(|| format!("SMTP delivery to {} failed", recipient))?;
        info!("Email sent to {}", recipient);
        Ok(recipient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;

    fn mailer(debug: bool, debug_email: Option<&str>) -> SmtpMailer {
        let config = Config::default();
        let mut smtp = config.smtp;
        smtp.bcc_address = Some("archive@example.com".into());
        SmtpMailer::new(
            smtp,
            DebugConfig {
                enabled: debug,
                email: debug_email.map(String::from),
                max_emails: 2,
            },
        )
    }

    fn mail() -> OutgoingMail {
        OutgoingMail {
            to: "viewer@example.com".into(),
            subject: "Plex Reminder: Heat is available and unwatched".into(),
            body: "<p>Hi</p>".into(),
            is_html: true,
        }
    }

    #[test]
    fn debug_mode_redirects() {
        assert_eq!(
            mailer(true, Some("dev@example.com")).actual_recipient("viewer@example.com"),
            "dev@example.com"
        );
        assert_eq!(
            mailer(true, None).actual_recipient("viewer@example.com"),
            "reminders@example.com"
        );
        assert_eq!(
            mailer(false, Some("dev@example.com")).actual_recipient("viewer@example.com"),
            "viewer@example.com"
        );
    }

    #[test]
    fn bcc_only_outside_debug_mode() {
        let real = mailer(false, None)
            .build_message(&mail(), "viewer@example.com")
            .unwrap();
        assert_eq!(real.envelope().to().len(), 2);

        let debug = mailer(true, None)
            .build_message(&mail(), "reminders@example.com")
            .unwrap();
        assert_eq!(debug.envelope().to().len(), 1);
    }

    #[tokio::test]
    async fn delivery_without_server_fails() {
        assert!(mailer(false, None).deliver(&mail()).await.is_err());
    }
}
