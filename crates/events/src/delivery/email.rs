//! Handoff invitation email via SMTP.
//!
//! [`EmailDelivery`] wraps the `lettre` async SMTP transport. If `SMTP_HOST`
//! is not set, [`EmailConfig::from_env`] returns `None` and invitations are
//! not mailed; the vendor can still share the link from their outbox.

use chrono::{DateTime, Utc};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

const DEFAULT_FROM_ADDRESS: &str = "noreply@handoff.local";

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable        | Required | Default                  |
    /// |-----------------|----------|--------------------------|
    /// | `SMTP_HOST`     | yes      |                          |
    /// | `SMTP_PORT`     | no       | `587`                    |
    /// | `SMTP_FROM`     | no       | `noreply@handoff.local`  |
    /// | `SMTP_USER`     | no       |                          |
    /// | `SMTP_PASSWORD` | no       |                          |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// Invitation
// ---------------------------------------------------------------------------

/// Everything the invitation email says.
#[derive(Debug, Clone)]
pub struct HandoffInvite {
    pub to: String,
    pub claim_link: String,
    pub vendor_name: String,
    pub note: Option<String>,
    pub item_count: usize,
    pub expires_at: Option<DateTime<Utc>>,
}

impl HandoffInvite {
    /// Subject line and plain-text body.
    pub fn compose(&self) -> (String, String) {
        let subject = format!("{} sent you product selections", self.vendor_name);

        let mut body = format!(
            "{} has shared {} with you.\n\nOpen this link to add them to a project:\n{}\n",
            self.vendor_name,
            match self.item_count {
                0 => "a quote".to_string(),
                1 => "1 item".to_string(),
                n => format!("{n} items"),
            },
            self.claim_link,
        );
        if let Some(note) = self.note.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            body.push_str(&format!("\nNote from {}:\n{note}\n", self.vendor_name));
        }
        if let Some(at) = self.expires_at {
            let expiry = at.format("%Y-%m-%d %H:%M UTC");
            body.push_str(&format!("\nThis link expires on {expiry}.\n"));
        }
        (subject, body)
    }
}

// ---------------------------------------------------------------------------
// EmailDelivery
// ---------------------------------------------------------------------------

pub struct EmailDelivery {
    config: EmailConfig,
}

impl EmailDelivery {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Send a handoff invitation to its recipient.
    pub async fn send_handoff_invite(&self, invite: &HandoffInvite) -> Result<(), EmailError> {
        use lettre::{
            message::header::ContentType, transport::smtp::authentication::Credentials,
            AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
        };

        let (subject, body) = invite.compose();

        let email = Message::builder()
            .from(self.config.from_address.parse()?)
            .to(invite.to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| EmailError::Build(e.to_string()))?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let mailer = transport_builder.build();
        mailer.send(email).await?;

        tracing::info!(to = %invite.to, "Handoff invitation sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
