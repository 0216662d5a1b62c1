// ============================================================================
// SERVICE : USERS
// ============================================================================
//
// Description:
//   Gestion des comptes par les admins (/users, /users/{username}) et du
//   profil courant (/users/me).
//
// Points d'attention:
//   - Le rôle n'est jamais écrit seul : apply_role() met à jour is_staff et
//     is_superuser dans le même UPDATE
//   - Un non-admin qui envoie "role" sur /users/me : champ ignoré
//   - Supprimer un user supprime ses reviews, ses commentaires et les
//     commentaires des autres sur ses reviews
//
// ============================================================================

use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use sea_orm::sea_query::Query;
use sea_orm::*;

use crate::config::{PaginationSettings, PasswordPolicy};
use crate::error::{add_error, ApiError, ApiResult};
use crate::models::dto::{Page, PageParams, SearchParams, UserPayload, UserResponse};
use crate::models::users::{self, apply_role, Role};
use crate::models::{comment, review};
use crate::services::pagination::fetch_page;
use crate::services::search::icontains;
use crate::utils::password::{hash_password, validate_password};

/// Vérifie puis hash un mot de passe. `attributes` : données personnelles
/// auxquelles il ne doit pas ressembler
fn prepare_password(password: &str, policy: &PasswordPolicy, attributes: &[&str]) -> ApiResult<String> {
    if let Err(messages) = validate_password(password, policy, attributes) {
        let mut errors = validator::ValidationErrors::new();
        for message in messages {
            add_error(&mut errors, "password", message);
        }
        return Err(errors.into());
    }

    hash_password(password).map_err(ApiError::Internal)
}

pub struct UserService;

impl UserService {
    pub async fn list(
        db: &DatabaseConnection,
        search: &SearchParams,
        page: &PageParams,
        settings: &PaginationSettings,
    ) -> ApiResult<Page<UserResponse>> {
        let mut select = users::Entity::find().order_by_asc(users::Column::Username);

        if let Some(term) = search.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            select = select.filter(icontains((users::Entity, users::Column::Username), term));
        }

        Ok(fetch_page(db, select, page, settings).await?.map(UserResponse::from))
    }

    pub async fn get_by_username(db: &DatabaseConnection, username: &str) -> ApiResult<users::Model> {
        users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(db)
            .await?
            .ok_or(ApiError::NotFound("user"))
    }

    pub async fn get_by_id(db: &DatabaseConnection, id: i32) -> ApiResult<users::Model> {
        users::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(ApiError::NotFound("user"))
    }

    /// POST /v1/users (admin)
    pub async fn create(
        db: &DatabaseConnection,
        payload: UserPayload,
        policy: &PasswordPolicy,
    ) -> ApiResult<users::Model> {
        payload.check(true)?;

        let username = payload.username.unwrap_or_default();
        let email = payload.email.unwrap_or_default();
        let first_name = payload.first_name.unwrap_or_default();
        let last_name = payload.last_name.unwrap_or_default();

        let password_hash = match payload.password.as_deref() {
            Some(password) => Some(prepare_password(
                password,
                policy,
                &[username.as_str(), email.as_str(), first_name.as_str(), last_name.as_str()],
            )?),
            None => None,
        };

        let mut active = users::ActiveModel {
            username: Set(username),
            email: Set(email),
            first_name: Set(first_name),
            last_name: Set(last_name),
            bio: Set(payload.bio.unwrap_or_default()),
            password_hash: Set(password_hash),
            confirmation_code: Set(None),
            confirmation_code_expires_at: Set(None),
            date_joined: Set(Utc::now()),
            ..Default::default()
        };
        apply_role(&mut active, payload.role.unwrap_or_default());

        let created = active.insert(db).await?;

        tracing::info!(user_id = created.id, username = %created.username, role = ?created.role, "User created");
        Ok(created)
    }

    /// PATCH / PUT d'un utilisateur.
    /// `allow_role` : faux sur /users/me pour un non-admin, le rôle envoyé
    /// est alors ignoré
    pub async fn update(
        db: &DatabaseConnection,
        user: users::Model,
        payload: UserPayload,
        partial: bool,
        allow_role: bool,
        policy: &PasswordPolicy,
    ) -> ApiResult<users::Model> {
        payload.check(!partial)?;

        // Attributs comparés au nouveau mot de passe : valeurs après mise à jour
        let password_hash = match payload.password.as_deref() {
            Some(password) => {
                let username = payload.username.as_deref().unwrap_or(&user.username);
                let email = payload.email.as_deref().unwrap_or(&user.email);
                let first_name = payload.first_name.as_deref().unwrap_or(&user.first_name);
                let last_name = payload.last_name.as_deref().unwrap_or(&user.last_name);
                Some(prepare_password(password, policy, &[username, email, first_name, last_name])?)
            }
            None => None,
        };

        let user_id = user.id;
        let mut active: users::ActiveModel = user.clone().into();

        if let Some(username) = payload.username {
            active.username = Set(username);
        }
        if let Some(email) = payload.email {
            active.email = Set(email);
        }
        if let Some(first_name) = payload.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = payload.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(bio) = payload.bio {
            active.bio = Set(bio);
        }
        if let Some(hash) = password_hash {
            active.password_hash = Set(Some(hash));
        }
        match payload.role {
            Some(role) if allow_role => apply_role(&mut active, role),
            Some(role) if role != user.role => {
                tracing::debug!(user_id, requested = ?role, "Role change ignored");
            }
            _ => {}
        }

        if !active.is_changed() {
            return Ok(user);
        }

        let updated = active.update(db).await?;

        tracing::info!(user_id, role = ?updated.role, "User updated");
        Ok(updated)
    }

    /// DELETE /v1/users/{username}
    pub async fn delete(db: &DatabaseConnection, username: &str) -> ApiResult<()> {
        let txn = db.begin().await?;

        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&txn)
            .await?
            .ok_or(ApiError::NotFound("user"))?;

        // 1. Commentaires écrits par l'utilisateur ou posés sous ses reviews
        comment::Entity::delete_many()
            .filter(
                Condition::any()
                    .add(comment::Column::AuthorId.eq(user.id))
                    .add(
                        comment::Column::ReviewId.in_subquery(
                            Query::select()
                                .column(review::Column::Id)
                                .from(review::Entity)
                                .and_where(review::Column::AuthorId.eq(user.id))
                                .to_owned(),
                        ),
                    ),
            )
            .exec(&txn)
            .await?;

        // 2. Reviews
        review::Entity::delete_many()
            .filter(review::Column::AuthorId.eq(user.id))
            .exec(&txn)
            .await?;

        // 3. Compte
        users::Entity::delete_by_id(user.id).exec(&txn).await?;

        txn.commit().await?;

        tracing::info!(user_id = user.id, username = %username, "User deleted");
        Ok(())
    }

    /// id -> username, pour l'affichage des auteurs
    pub async fn usernames<C: ConnectionTrait>(
        db: &C,
        ids: impl IntoIterator<Item = i32>,
    ) -> ApiResult<HashMap<i32, String>> {
        let ids: BTreeSet<i32> = ids.into_iter().collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        Ok(users::Entity::find()
            .filter(users::Column::Id.is_in(ids))
            .all(db)
            .await?
            .into_iter()
            .map(|user| (user.id, user.username))
            .collect())
    }

    /// Seul un admin peut changer un rôle via /users/me
    pub fn may_change_own_role(role: Role) -> bool {
        role.is_admin()
    }
}
