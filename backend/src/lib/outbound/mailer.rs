use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::AsyncSmtpTransport;
use lettre::AsyncTransport;
use lettre::Message;
use lettre::Tokio1Executor;
use sqlx::PgPool;

use crate::domain::admin::errors::MailError;
use crate::domain::admin::ports::MailSender;

pub const MAIL_HOST_KEY: &str = "mail:host";
pub const MAIL_USERNAME_KEY: &str = "mail:username";
pub const MAIL_PASSWORD_KEY: &str = "mail:password";
pub const MAIL_FROM_KEY: &str = "mail:from";

struct MailSettings {
    host: String,
    username: String,
    password: String,
    from: String,
}

/// SMTP mail delivery.
///
/// Connection settings live in the `app_data` table and are read per send,
/// so an operator can rotate them without restarting the application.
pub struct SmtpMailer {
    pool: PgPool,
}

impl SmtpMailer {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn settings(&self) -> Result<MailSettings, MailError> {
        let keys = vec![
            MAIL_HOST_KEY.to_string(),
            MAIL_USERNAME_KEY.to_string(),
            MAIL_PASSWORD_KEY.to_string(),
            MAIL_FROM_KEY.to_string(),
        ];
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT key, value FROM app_data WHERE key = ANY($1)")
                .bind(&keys)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| MailError::Settings(e.to_string()))?;

        let value_of = |key: &str| -> Result<String, MailError> {
            rows.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| MailError::Settings(format!("missing app data key `{key}`")))
        };

        Ok(MailSettings {
            host: value_of(MAIL_HOST_KEY)?,
            username: value_of(MAIL_USERNAME_KEY)?,
            password: value_of(MAIL_PASSWORD_KEY)?,
            from: value_of(MAIL_FROM_KEY)?,
        })
    }
}

#[async_trait]
impl MailSender for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        let settings = self.settings().await?;

        let from: Mailbox = settings
            .from
            .parse()
            .map_err(|e: lettre::address::AddressError| MailError::InvalidAddress(e.to_string()))?;
        let to: Mailbox = to
            .parse()
            .map_err(|e: lettre::address::AddressError| MailError::InvalidAddress(e.to_string()))?;

        let message = Message::builder()
            .from(from)
            .to(to.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
            .map_err(|e| MailError::Transport(e.to_string()))?
            .credentials(Credentials::new(settings.username, settings.password))
            .build();

        transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        tracing::debug!(to = %to, "mail delivered");
        Ok(())
    }
}
