// ============================================================================
// SERVICE : AUTHENTIFICATION PAR CODE DE CONFIRMATION
// ============================================================================
//
// Flux:
//   1. POST /v1/auth/email {email, username?} : crée l'utilisateur si besoin,
//      génère un code, l'envoie par email
//   2. POST /v1/auth/token {email, confirmation_code} : échange le code contre
//      un JWT
//
// Points d'attention:
//   - Le code est à usage unique : consommé par un UPDATE conditionnel
//     (WHERE confirmation_code = <code fourni>), deux échanges concurrents
//     ne peuvent pas réussir tous les deux
//   - Le code expire après CONFIRMATION_CODE_TTL_MINUTES
//   - Un échec d'envoi du mail remonte en 500
//
// ============================================================================

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::*;
use validator::Validate;

use crate::config::Settings;
use crate::error::{ApiError, ApiResult};
use crate::mailer::{Email, Mailer};
use crate::models::dto::{RegistrationRequest, RegistrationResponse, TokenRequest, TokenResponse};
use crate::models::users::{self, apply_role, Role};
use crate::utils::confirmation::{self, CodeRejection};
use crate::utils::jwt;

pub const CONFIRMATION_SUBJECT: &str = "YaMDb confirmation code";

pub struct AuthService;

impl AuthService {
    pub async fn register(
        db: &DatabaseConnection,
        mailer: &dyn Mailer,
        settings: &Settings,
        request: RegistrationRequest,
    ) -> ApiResult<RegistrationResponse> {
        request.check()?;

        let now = Utc::now();
        let code = confirmation::generate_code();
        let expires_at = confirmation::expires_at(now, settings.auth.confirmation_code_ttl_minutes);

        // 1. Utilisateur existant ou nouveau compte minimal
        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(request.email.as_str()))
            .one(db)
            .await?;

        let user = match existing {
            Some(user) => {
                if request.username.as_deref().is_some_and(|name| name != user.username) {
                    return Err(ApiError::field(
                        "username",
                        "This email is registered with another username.",
                    ));
                }

                // 2a. Nouveau code (remplace le précédent)
                let mut active: users::ActiveModel = user.into();
                active.confirmation_code = Set(Some(code.clone()));
                active.confirmation_code_expires_at = Set(Some(expires_at));
                active.update(db).await?
            }
            None => {
                // 2b. Le username par défaut est l'email
                let username = request.username.clone().unwrap_or_else(|| request.email.clone());

                let mut active = users::ActiveModel {
                    username: Set(username),
                    email: Set(request.email.clone()),
                    first_name: Set(String::new()),
                    last_name: Set(String::new()),
                    bio: Set(String::new()),
                    password_hash: Set(None),
                    confirmation_code: Set(Some(code.clone())),
                    confirmation_code_expires_at: Set(Some(expires_at)),
                    date_joined: Set(now),
                    ..Default::default()
                };
                apply_role(&mut active, Role::User);

                let created = active.insert(db).await?;
                tracing::info!(user_id = created.id, username = %created.username, "User registered");
                created
            }
        };

        // 3. Envoi du code
        mailer
            .send(&Email {
                subject: CONFIRMATION_SUBJECT.to_string(),
                body: format!(
                    "Your confirmation code: {code}\nIt expires at {}.",
                    expires_at.format("%Y-%m-%d %H:%M UTC")
                ),
                from: settings.auth.default_from_email.clone(),
                to: vec![user.email.clone()],
            })
            .await?;

        tracing::info!(user_id = user.id, "Confirmation code sent");

        Ok(RegistrationResponse {
            email: user.email,
            username: user.username,
        })
    }

    pub async fn issue_token(
        db: &DatabaseConnection,
        settings: &Settings,
        request: TokenRequest,
    ) -> ApiResult<TokenResponse> {
        request.validate()?;

        // 1. Utilisateur
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(request.email.as_str()))
            .one(db)
            .await?
            .ok_or(ApiError::NotFound("user"))?;

        // 2. Code valide et non expiré
        confirmation::check_code(
            user.confirmation_code.as_deref(),
            user.confirmation_code_expires_at,
            &request.confirmation_code,
            Utc::now(),
        )
        .map_err(|rejection| {
            tracing::info!(user_id = user.id, reason = ?rejection, "Confirmation code rejected");
            ApiError::field("confirmation_code", rejection.message())
        })?;

        // 3. Consommation atomique du code
        let consumed = users::Entity::update_many()
            .col_expr(users::Column::ConfirmationCode, Expr::value(Option::<String>::None))
            .col_expr(
                users::Column::ConfirmationCodeExpiresAt,
                Expr::value(Option::<chrono::DateTime<Utc>>::None),
            )
            .filter(users::Column::Id.eq(user.id))
            .filter(users::Column::ConfirmationCode.eq(request.confirmation_code.as_str()))
            .exec(db)
            .await?;

        if consumed.rows_affected != 1 {
            return Err(ApiError::field(
                "confirmation_code",
                CodeRejection::Missing.message(),
            ));
        }

        // 4. JWT
        let token = jwt::generate_token(user.id, &user.username, &settings.jwt).map_err(ApiError::Internal)?;

        tracing::info!(user_id = user.id, "Access token issued");
        Ok(TokenResponse { token })
    }
}
