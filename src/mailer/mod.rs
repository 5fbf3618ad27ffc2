//! SMTP delivery of the rendered digest

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials as SmtpCredentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{debug, info};

use crate::config::{MailAccount, MailConfig};
use crate::digest::Digest;
use crate::errors::{MailError, MailResult};

/// Sends digests through an SMTP relay over implicit TLS
#[derive(Clone)]
pub struct Mailer {
    host: String,
    port: u16,
    account: MailAccount,
}

impl Mailer {
    pub fn new(config: &MailConfig, account: MailAccount) -> Self {
        Self {
            host: config.smtp_host.clone(),
            port: config.smtp_port,
            account,
        }
    }

    pub fn recipient(&self) -> &str {
        &self.account.recipient
    }

    /// Assemble the HTML message without sending it
    pub fn build_message(&self, digest: &Digest) -> MailResult<Message> {
        let from = parse_mailbox(&self.account.sender)?;
        let to = parse_mailbox(&self.account.recipient)?;

        Ok(Message::builder()
            .from(from)
            .to(to)
            .subject(digest.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(digest.html.clone())?)
    }

    pub async fn send(&self, digest: &Digest) -> MailResult<()> {
        let message = self.build_message(digest)?;
        let host = self.host.clone();
        let port = self.port;
        let credentials =
            SmtpCredentials::new(self.account.sender.clone(), self.account.password.clone());

        debug!("Connecting to SMTP relay {}:{}", host, port);
        tokio::task::spawn_blocking(move || -> MailResult<()> {
            let transport = SmtpTransport::relay(&host)?
                .port(port)
                .credentials(credentials)
                .build();
            transport.send(&message)?;
            Ok(())
        })
        .await??;

        info!(
            "Sent digest with {} records to {}",
            digest.total, self.account.recipient
        );
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> MailResult<Mailbox> {
    address
        .parse::<Mailbox>()
        .map_err(|e| MailError::address(address, e.to_string()))
}
