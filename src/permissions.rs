// ============================================================================
// PERMISSIONS
// ============================================================================
//
// Description:
//   Prédicats booléens purs sur (requester, ressource, type d'accès).
//   Chaque route combine explicitement ceux dont elle a besoin, puis appelle
//   require() pour obtenir 401 (anonyme) ou 403 (authentifié mais refusé).
//
// Règles:
//   - Lecture : toujours autorisée
//   - Genres / catégories / titres : écriture réservée aux admins
//   - Reviews / commentaires : (auteur OU staff) ET authentifié
//   - Users : admin seulement, sauf /users/me
//
// ============================================================================

use actix_web::http::Method;

use crate::error::ApiError;
use crate::middleware::AuthUser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// GET / HEAD / OPTIONS
    Read,
    /// POST / PUT / PATCH / DELETE
    Write,
}

impl From<&Method> for Access {
    fn from(method: &Method) -> Self {
        match *method {
            Method::GET | Method::HEAD | Method::OPTIONS => Access::Read,
            _ => Access::Write,
        }
    }
}

impl Access {
    pub fn is_safe(self) -> bool {
        matches!(self, Access::Read)
    }
}

pub fn is_admin(requester: Option<&AuthUser>) -> bool {
    requester.is_some_and(|user| user.role.is_admin())
}

pub fn is_admin_or_read_only(requester: Option<&AuthUser>, access: Access) -> bool {
    access.is_safe() || is_admin(requester)
}

pub fn is_owner_or_read_only(requester: Option<&AuthUser>, author_id: i32, access: Access) -> bool {
    access.is_safe() || requester.is_some_and(|user| user.id == author_id)
}

pub fn is_staff_or_read_only(requester: Option<&AuthUser>, access: Access) -> bool {
    access.is_safe() || requester.is_some_and(|user| user.role.is_staff())
}

pub fn is_authenticated_or_read_only(requester: Option<&AuthUser>, access: Access) -> bool {
    access.is_safe() || requester.is_some()
}

/// Modification / suppression d'une review ou d'un commentaire
pub fn can_modify_authored(requester: Option<&AuthUser>, author_id: i32, access: Access) -> bool {
    (is_owner_or_read_only(requester, author_id, access) || is_staff_or_read_only(requester, access))
        && is_authenticated_or_read_only(requester, access)
}

/// Transforme le résultat d'un prédicat en erreur HTTP
pub fn require(allowed: bool, requester: Option<&AuthUser>) -> Result<(), ApiError> {
    match (allowed, requester) {
        (true, _) => Ok(()),
        (false, None) => Err(ApiError::NotAuthenticated),
        (false, Some(_)) => Err(ApiError::PermissionDenied),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::Role;

    fn user(id: i32, role: Role) -> AuthUser {
        AuthUser {
            id,
            username: format!("user{id}"),
            role,
        }
    }

    #[test]
    fn test_access_from_method() {
        assert_eq!(Access::from(&Method::GET), Access::Read);
        assert_eq!(Access::from(&Method::HEAD), Access::Read);
        assert_eq!(Access::from(&Method::OPTIONS), Access::Read);
        assert_eq!(Access::from(&Method::POST), Access::Write);
        assert_eq!(Access::from(&Method::PATCH), Access::Write);
        assert_eq!(Access::from(&Method::DELETE), Access::Write);
    }

    #[test]
    fn test_reads_are_always_allowed() {
        assert!(is_admin_or_read_only(None, Access::Read));
        assert!(is_authenticated_or_read_only(None, Access::Read));
        assert!(can_modify_authored(None, 1, Access::Read));
    }

    #[test]
    fn test_admin_or_read_only() {
        assert!(!is_admin_or_read_only(None, Access::Write));
        assert!(!is_admin_or_read_only(Some(&user(1, Role::Moderator)), Access::Write));
        assert!(is_admin_or_read_only(Some(&user(1, Role::Admin)), Access::Write));
    }

    #[test]
    fn test_authored_resources() {
        let author = user(1, Role::User);
        let stranger = user(2, Role::User);
        let moderator = user(3, Role::Moderator);
        let admin = user(4, Role::Admin);

        assert!(can_modify_authored(Some(&author), 1, Access::Write));
        assert!(!can_modify_authored(Some(&stranger), 1, Access::Write));
        assert!(can_modify_authored(Some(&moderator), 1, Access::Write));
        assert!(can_modify_authored(Some(&admin), 1, Access::Write));
        assert!(!can_modify_authored(None, 1, Access::Write));
    }

    #[test]
    fn test_require_distinguishes_anonymous_from_forbidden() {
        let stranger = user(2, Role::User);
        assert!(matches!(require(false, None), Err(ApiError::NotAuthenticated)));
        assert!(matches!(require(false, Some(&stranger)), Err(ApiError::PermissionDenied)));
        assert!(require(true, None).is_ok());
    }
}
