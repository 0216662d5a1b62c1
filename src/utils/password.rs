use hmac::Hmac;
use pbkdf2::pbkdf2;
use sha2::Sha256;
use rand::Rng;
use rand::distributions::Alphanumeric;
use base64::{Engine, engine::general_purpose::STANDARD};

use crate::config::PasswordPolicy;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "pbkdf2_sha256";
const ITERATIONS: u32 = 260000;
const KEY_LENGTH: usize = 32;
const SALT_LENGTH: usize = 22;

/// Mots de passe refusés d'office (extrait des listes de mots de passe courants)
const COMMON_PASSWORDS: &[&str] = &[
    "123456", "12345678", "123456789", "1234567890", "password", "password1",
    "password123", "qwerty", "qwerty123", "qwertyuiop", "abc123", "111111",
    "123123", "iloveyou", "admin", "admin123", "welcome", "letmein", "monkey",
    "dragon", "football", "baseball", "sunshine", "princess", "trustno1",
    "superman", "starwars", "passw0rd", "azerty", "changeme",
];

/// Hash un mot de passe au format pbkdf2_sha256$iterations$salt$hash
/// Le sel est alphanumérique, le hash en base64 standard
pub fn hash_password(password: &str) -> Result<String, String> {
    let salt: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_LENGTH)
        .map(char::from)
        .collect();

    let key = derive(password, &salt, ITERATIONS, KEY_LENGTH)?;

    Ok(format!("{}${}${}${}", ALGORITHM, ITERATIONS, salt, STANDARD.encode(key)))
}

fn derive(password: &str, salt: &str, iterations: u32, length: usize) -> Result<Vec<u8>, String> {
    let mut key = vec![0u8; length];
    pbkdf2::<HmacSha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut key)
        .map_err(|e| format!("PBKDF2 failed: {}", e))?;
    Ok(key)
}

/// Comparaison en temps constant
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Valide un mot de passe contre la politique configurée.
/// `attributes` : username, email, prénom, nom de l'utilisateur
pub fn validate_password(
    password: &str,
    policy: &PasswordPolicy,
    attributes: &[&str],
) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if password.chars().count() < policy.min_length {
        errors.push(format!(
            "This password is too short. It must contain at least {} characters.",
            policy.min_length
        ));
    }

    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        errors.push("This password is entirely numeric.".to_string());
    }

    let lowered = password.to_lowercase();
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        errors.push("This password is too common.".to_string());
    }

    if attributes.iter().any(|attribute| too_similar(&lowered, attribute)) {
        errors.push("The password is too similar to your personal information.".to_string());
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn too_similar(password: &str, attribute: &str) -> bool {
    // Pour un email, seule la partie locale compte
    let attribute = attribute.split('@').next().unwrap_or_default().to_lowercase();
    if attribute.chars().count() < 3 || password.is_empty() {
        return false;
    }
    password.contains(&attribute) || attribute.contains(password)
}
