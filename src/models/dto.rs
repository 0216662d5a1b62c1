// Payloads (entrées JSON validées) et réponses de l'API

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationErrors};

use crate::error::{add_error, ApiResult};
use crate::models::users::Role;
use crate::models::{category, comment, genre, review, users};

/// Distingue un champ absent (None) d'un champ explicitement null (Some(None))
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Paramètre de query vide (`?year=`) traité comme absent
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}

/// Résultat de validation combinant les règles `validator` et les règles maison
fn finish(mut errors: ValidationErrors, extra: impl FnOnce(&mut ValidationErrors)) -> ApiResult<()> {
    extra(&mut errors);
    if errors.errors().is_empty() {
        Ok(())
    } else {
        Err(errors.into())
    }
}

fn base_errors(result: Result<(), ValidationErrors>) -> ValidationErrors {
    result.err().unwrap_or_else(ValidationErrors::new)
}

pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Lettres, chiffres et @/./+/-/_
pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-'))
}

// ============================================================================
// Pagination
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<u64>,
    pub previous: Option<u64>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TitleFilter {
    pub category: Option<String>,
    pub genre: Option<String>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub year: Option<i32>,
}

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UserPayload {
    #[validate(length(min = 1, max = 150, message = "Ensure this field has between 1 and 150 characters."))]
    pub username: Option<String>,
    #[validate(
        email(message = "Enter a valid email address."),
        length(max = 254, message = "Ensure this field has no more than 254 characters.")
    )]
    pub email: Option<String>,
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
    pub first_name: Option<String>,
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
    /// Jamais renvoyé dans les réponses
    pub password: Option<String>,
}

impl UserPayload {
    /// `required` : username et email obligatoires (création, PUT)
    pub fn check(&self, required: bool) -> ApiResult<()> {
        finish(base_errors(self.validate()), |errors| {
            match &self.username {
                Some(username) => {
                    if !is_valid_username(username) {
                        add_error(
                            errors,
                            "username",
                            "Enter a valid username. Letters, digits and @/./+/-/_ only.",
                        );
                    } else if username == "me" {
                        add_error(errors, "username", "This username is reserved.");
                    }
                }
                None if required => add_error(errors, "username", "This field is required."),
                None => {}
            }
            if required && self.email.is_none() {
                add_error(errors, "email", "This field is required.");
            }
        })
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Role,
}

impl From<users::Model> for UserResponse {
    fn from(user: users::Model) -> Self {
        Self {
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            bio: user.bio,
            role: user.role,
        }
    }
}

// ============================================================================
// Genres / Catégories
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct SlugEntryPayload {
    #[validate(length(min = 1, max = 256, message = "Ensure this field has between 1 and 256 characters."))]
    pub name: String,
    #[validate(length(min = 1, max = 50, message = "Ensure this field has between 1 and 50 characters."))]
    pub slug: String,
}

impl SlugEntryPayload {
    pub fn check(&self) -> ApiResult<()> {
        finish(base_errors(self.validate()), |errors| {
            if !is_valid_slug(&self.slug) {
                add_error(
                    errors,
                    "slug",
                    "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
                );
            }
        })
    }
}

/// Représentation publique d'un genre ou d'une catégorie (sans l'id interne)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlugEntry {
    pub name: String,
    pub slug: String,
}

impl From<category::Model> for SlugEntry {
    fn from(category: category::Model) -> Self {
        Self {
            name: category.name,
            slug: category.slug,
        }
    }
}

impl From<genre::Model> for SlugEntry {
    fn from(genre: genre::Model) -> Self {
        Self {
            name: genre.name,
            slug: genre.slug,
        }
    }
}

// ============================================================================
// Titles
// ============================================================================

#[derive(Debug, Default, Deserialize, Validate)]
pub struct TitlePayload {
    #[validate(length(min = 1, max = 256, message = "Ensure this field has between 1 and 256 characters."))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub year: Option<Option<i32>>,
    pub description: Option<String>,
    /// Slugs des genres
    pub genre: Option<Vec<String>>,
    /// Slug de la catégorie, null pour la retirer
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
}

impl TitlePayload {
    pub fn check(&self, required: bool) -> ApiResult<()> {
        finish(base_errors(self.validate()), |errors| {
            if required && self.name.is_none() {
                add_error(errors, "name", "This field is required.");
            }
            if let Some(Some(year)) = self.year {
                let current = Utc::now().year();
                if year > current {
                    add_error(
                        errors,
                        "year",
                        format!("Ensure this value is less than or equal to {current}."),
                    );
                }
            }
        })
    }
}

#[derive(Debug, Serialize)]
pub struct TitleResponse {
    pub id: i32,
    pub name: String,
    pub year: Option<i32>,
    /// Moyenne des notes, null sans review
    pub rating: Option<f64>,
    pub description: String,
    pub genre: Vec<SlugEntry>,
    pub category: Option<SlugEntry>,
}

// ============================================================================
// Reviews / Comments
// ============================================================================

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ReviewPayload {
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub text: Option<String>,
    #[validate(range(min = 1, max = 10, message = "Ensure this value is between 1 and 10."))]
    pub score: Option<i32>,
}

impl ReviewPayload {
    pub fn check(&self, required: bool) -> ApiResult<()> {
        finish(base_errors(self.validate()), |errors| {
            if required && self.text.is_none() {
                add_error(errors, "text", "This field is required.");
            }
            if required && self.score.is_none() {
                add_error(errors, "score", "This field is required.");
            }
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub id: i32,
    pub text: String,
    /// Username de l'auteur
    pub author: String,
    pub score: i32,
    pub pub_date: DateTime<Utc>,
}

impl ReviewResponse {
    pub fn new(review: review::Model, author: String) -> Self {
        Self {
            id: review.id,
            text: review.text,
            author,
            score: review.score,
            pub_date: review.pub_date,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct CommentPayload {
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub text: Option<String>,
}

impl CommentPayload {
    pub fn check(&self, required: bool) -> ApiResult<()> {
        finish(base_errors(self.validate()), |errors| {
            if required && self.text.is_none() {
                add_error(errors, "text", "This field is required.");
            }
        })
    }
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: i32,
    pub text: String,
    pub author: String,
    pub pub_date: DateTime<Utc>,
}

impl CommentResponse {
    pub fn new(comment: comment::Model, author: String) -> Self {
        Self {
            id: comment.id,
            text: comment.text,
            author,
            pub_date: comment.pub_date,
        }
    }
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct RegistrationRequest {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    pub username: Option<String>,
}

impl RegistrationRequest {
    pub fn check(&self) -> ApiResult<()> {
        finish(base_errors(self.validate()), |errors| {
            if let Some(username) = &self.username {
                if !is_valid_username(username) || username == "me" {
                    add_error(errors, "username", "Enter a valid username.");
                }
            }
        })
    }
}

#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    pub email: String,
    pub username: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TokenRequest {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub confirmation_code: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_rules() {
        assert!(is_valid_slug("sci-fi_2"));
        assert!(!is_valid_slug("sci fi"));
        assert!(!is_valid_slug(""));
    }

    #[test]
    fn test_title_payload_distinguishes_null_from_absent() {
        let absent: TitlePayload = serde_json::from_str(r#"{"name": "Dune"}"#).unwrap();
        assert_eq!(absent.category, None);

        let cleared: TitlePayload = serde_json::from_str(r#"{"category": null}"#).unwrap();
        assert_eq!(cleared.category, Some(None));

        let set: TitlePayload = serde_json::from_str(r#"{"category": "books"}"#).unwrap();
        assert_eq!(set.category, Some(Some("books".to_string())));
    }

    #[test]
    fn test_title_year_cannot_be_in_the_future() {
        let next_year = Utc::now().year() + 1;
        let payload = TitlePayload {
            name: Some("Future".to_string()),
            year: Some(Some(next_year)),
            ..Default::default()
        };
        assert!(payload.check(true).is_err());

        let payload = TitlePayload {
            name: Some("Past".to_string()),
            year: Some(Some(1999)),
            ..Default::default()
        };
        assert!(payload.check(true).is_ok());
    }

    #[test]
    fn test_review_score_range() {
        for (score, ok) in [(0, false), (1, true), (10, true), (11, false)] {
            let payload = ReviewPayload {
                text: Some("ok".to_string()),
                score: Some(score),
            };
            assert_eq!(payload.check(true).is_ok(), ok, "score {score}");
        }
    }

    #[test]
    fn test_user_payload_rejects_reserved_username() {
        let payload = UserPayload {
            username: Some("me".to_string()),
            email: Some("me@example.com".to_string()),
            ..Default::default()
        };
        assert!(payload.check(true).is_err());
    }

    #[test]
    fn test_user_payload_requires_username_and_email_on_create() {
        assert!(UserPayload::default().check(true).is_err());
        assert!(UserPayload::default().check(false).is_ok());
    }
}
