// ============================================================================
// CONFIGURATION
// ============================================================================
//
// Description:
//   Toute la configuration vient des variables d'environnement (.env chargé
//   par dotenv dans main.rs). Les settings sont construits une seule fois au
//   démarrage puis partagés en lecture seule via web::Data<Settings>.
//
// Variables:
//   - DATABASE_URL (obligatoire)
//   - BIND_ADDR / PORT
//   - JWT_SECRET / JWT_TTL_HOURS
//   - CONFIRMATION_CODE_TTL_MINUTES / DEFAULT_FROM_EMAIL
//   - MAILER (log | file) / MAIL_DIR
//   - PASSWORD_MIN_LENGTH
//   - PAGE_SIZE / MAX_PAGE_SIZE
//   - DB_MAX_CONNECTIONS
//
// ============================================================================

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

const INSECURE_DEV_SECRET: &str = "default-insecure-key-change-this";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub server: ServerSettings,
    pub jwt: JwtSettings,
    pub auth: AuthSettings,
    pub mail: MailSettings,
    pub password_policy: PasswordPolicy,
    pub pagination: PaginationSettings,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub bind_addr: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub ttl_hours: i64,
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// Durée de validité d'un code de confirmation
    pub confirmation_code_ttl_minutes: i64,
    pub default_from_email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailBackend {
    /// Écrit le mail dans les logs (développement)
    Log,
    /// Écrit un fichier .eml par mail dans MAIL_DIR
    File,
}

impl FromStr for MailBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "log" => Ok(MailBackend::Log),
            "file" => Ok(MailBackend::File),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MailSettings {
    pub backend: MailBackend,
    pub dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self { min_length: 8 }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PaginationSettings {
    pub page_size: u64,
    pub max_page_size: u64,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            page_size: 10,
            max_page_size: 100,
        }
    }
}

impl Settings {
    /// Construit les settings depuis l'environnement
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            database: DatabaseSettings {
                url,
                max_connections: parse_var("DB_MAX_CONNECTIONS", 10)?,
            },
            server: ServerSettings {
                bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: parse_var("PORT", 8080)?,
            },
            jwt: JwtSettings {
                secret: jwt_secret()?,
                ttl_hours: parse_var("JWT_TTL_HOURS", 24)?,
            },
            auth: AuthSettings {
                confirmation_code_ttl_minutes: parse_var("CONFIRMATION_CODE_TTL_MINUTES", 24 * 60)?,
                default_from_email: env::var("DEFAULT_FROM_EMAIL")
                    .unwrap_or_else(|_| "noreply@yamdb.local".to_string()),
            },
            mail: MailSettings {
                backend: parse_var("MAILER", MailBackend::Log)?,
                dir: env::var("MAIL_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("sent_emails")),
            },
            password_policy: PasswordPolicy {
                min_length: parse_var("PASSWORD_MIN_LENGTH", PasswordPolicy::default().min_length)?,
            },
            pagination: PaginationSettings {
                page_size: parse_var("PAGE_SIZE", PaginationSettings::default().page_size)?,
                max_page_size: parse_var("MAX_PAGE_SIZE", PaginationSettings::default().max_page_size)?,
            },
        })
    }
}

/// En release, pas de secret par défaut : le serveur refuse de démarrer
fn jwt_secret() -> Result<String, ConfigError> {
    match env::var("JWT_SECRET") {
        Ok(secret) if !secret.is_empty() => Ok(secret),
        _ if cfg!(debug_assertions) => {
            tracing::warn!("JWT_SECRET not set, using the insecure development key");
            Ok(INSECURE_DEV_SECRET.to_string())
        }
        _ => Err(ConfigError::Missing("JWT_SECRET")),
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mail_backend_parsing() {
        assert_eq!("log".parse::<MailBackend>(), Ok(MailBackend::Log));
        assert_eq!("FILE".parse::<MailBackend>(), Ok(MailBackend::File));
        assert!("smtp".parse::<MailBackend>().is_err());
    }

    #[test]
    fn test_parse_var_falls_back_to_default() {
        let value: u64 = parse_var("YAMDB_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }
}
