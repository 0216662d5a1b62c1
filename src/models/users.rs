// ============================================================================
// MODÈLE : USERS
// ============================================================================
//
// Colonnes de la table users:
//   - id (INTEGER, PRIMARY KEY, SERIAL)
//   - username (VARCHAR, UNIQUE, NOT NULL)
//   - email (VARCHAR, UNIQUE, NOT NULL)
//   - first_name / last_name / bio
//   - role ('user' | 'moderator' | 'admin')
//   - password_hash (NULL tant que l'utilisateur n'a pas de mot de passe)
//   - is_staff / is_superuser : dérivés du rôle, jamais écrits séparément
//   - confirmation_code (UNIQUE, NULL une fois consommé)
//   - confirmation_code_expires_at
//   - date_joined
//
// Points d'attention:
//   - Toute écriture de role passe par apply_role() pour que les flags
//     soient mis à jour dans le même UPDATE.
//
// ============================================================================

use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "moderator")]
    Moderator,
    #[sea_orm(string_value = "admin")]
    Admin,
}

/// Flags de privilèges dérivés du rôle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Privileges {
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl Role {
    pub fn privileges(self) -> Privileges {
        match self {
            Role::Admin => Privileges {
                is_staff: true,
                is_superuser: true,
            },
            Role::Moderator => Privileges {
                is_staff: true,
                is_superuser: false,
            },
            Role::User => Privileges {
                is_staff: false,
                is_superuser: false,
            },
        }
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Modérateurs et admins
    pub fn is_staff(self) -> bool {
        self.privileges().is_staff
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,

    #[sea_orm(unique)]
    pub email: String,

    pub first_name: String,

    pub last_name: String,

    #[sea_orm(column_type = "Text")]
    pub bio: String,

    pub role: Role,

    pub password_hash: Option<String>, // Format: pbkdf2_sha256$iterations$salt$hash

    pub is_staff: bool,

    pub is_superuser: bool,

    #[sea_orm(unique)]
    pub confirmation_code: Option<String>,

    pub confirmation_code_expires_at: Option<DateTimeUtc>,

    pub date_joined: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::review::Entity")]
    Review,

    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Review.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Écrit le rôle et les flags dérivés ensemble
pub fn apply_role(active: &mut ActiveModel, role: Role) {
    let privileges = role.privileges();
    active.role = Set(role);
    active.is_staff = Set(privileges.is_staff);
    active.is_superuser = Set(privileges.is_superuser);
}
