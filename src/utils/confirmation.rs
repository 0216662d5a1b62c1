use chrono::{DateTime, Duration, Utc};

use super::password::constant_time_eq;

/// Raison du refus d'un code de confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeRejection {
    /// Aucun code en attente (jamais demandé ou déjà consommé)
    Missing,
    Mismatch,
    Expired,
}

impl CodeRejection {
    pub fn message(self) -> &'static str {
        match self {
            CodeRejection::Missing => "No pending confirmation code for this email.",
            CodeRejection::Mismatch => "Invalid confirmation code.",
            CodeRejection::Expired => "Confirmation code has expired.",
        }
    }
}

/// Nouveau code à usage unique (UUID v4, 32 caractères hexadécimaux)
pub fn generate_code() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

pub fn expires_at(now: DateTime<Utc>, ttl_minutes: i64) -> DateTime<Utc> {
    now + Duration::minutes(ttl_minutes)
}

/// Compare le code fourni au code stocké (égalité exacte, temps constant)
pub fn check_code(
    stored: Option<&str>,
    expires_at: Option<DateTime<Utc>>,
    supplied: &str,
    now: DateTime<Utc>,
) -> Result<(), CodeRejection> {
    let stored = stored.ok_or(CodeRejection::Missing)?;

    if !constant_time_eq(stored.as_bytes(), supplied.as_bytes()) {
        return Err(CodeRejection::Mismatch);
    }

    match expires_at {
        Some(deadline) if deadline <= now => Err(CodeRejection::Expired),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_codes_are_unique() {
        let first = generate_code();
        assert_eq!(first.len(), 32);
        assert_ne!(first, generate_code());
    }

    #[test]
    fn test_check_code() {
        let now = Utc::now();
        let deadline = Some(expires_at(now, 10));

        assert_eq!(check_code(Some("abc"), deadline, "abc", now), Ok(()));
        assert_eq!(
            check_code(Some("abc"), deadline, "abd", now),
            Err(CodeRejection::Mismatch)
        );
        assert_eq!(check_code(None, deadline, "abc", now), Err(CodeRejection::Missing));
        assert_eq!(
            check_code(Some("abc"), deadline, "abc", now + Duration::minutes(11)),
            Err(CodeRejection::Expired)
        );
    }
}
