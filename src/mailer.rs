// ============================================================================
// ENVOI DES EMAILS
// ============================================================================
//
// Description:
//   L'envoi réel des emails est un collaborateur externe. L'API ne dépend
//   que du trait Mailer : (sujet, corps, expéditeur, destinataires).
//
// Implémentations:
//   - LogMailer : écrit le mail dans les logs (développement)
//   - FileMailer : un fichier .eml par mail dans MAIL_DIR
//
// Points d'attention:
//   - Les erreurs d'envoi ne sont PAS ignorées : elles remontent jusqu'au
//     handler qui répond 500.
//
// ============================================================================

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;

use crate::config::{MailBackend, MailSettings};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub subject: String,
    pub body: String,
    pub from: String,
    pub to: Vec<String>,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail has no recipient")]
    NoRecipient,

    #[error("failed to write mail: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> Result<(), MailError>;
}

/// Construit le mailer configuré
pub fn from_settings(settings: &MailSettings) -> Arc<dyn Mailer> {
    match settings.backend {
        MailBackend::Log => Arc::new(LogMailer),
        MailBackend::File => Arc::new(FileMailer::new(settings.dir.clone())),
    }
}

pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        if email.to.is_empty() {
            return Err(MailError::NoRecipient);
        }

        tracing::info!(
            from = %email.from,
            to = ?email.to,
            subject = %email.subject,
            body = %email.body,
            "Email sent"
        );
        Ok(())
    }
}

pub struct FileMailer {
    dir: PathBuf,
}

impl FileMailer {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

/// Format RFC 822 minimal
fn render(email: &Email) -> String {
    format!(
        "From: {}\r\nTo: {}\r\nSubject: {}\r\nDate: {}\r\n\r\n{}\r\n",
        email.from,
        email.to.join(", "),
        email.subject,
        Utc::now().to_rfc2822(),
        email.body
    )
}

#[async_trait]
impl Mailer for FileMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        if email.to.is_empty() {
            return Err(MailError::NoRecipient);
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(format!(
            "{}-{}.eml",
            Utc::now().format("%Y%m%d-%H%M%S"),
            uuid::Uuid::new_v4().simple()
        ));
        tokio::fs::write(&path, render(email)).await?;

        tracing::info!(path = %path.display(), "Email written to disk");
        Ok(())
    }
}
