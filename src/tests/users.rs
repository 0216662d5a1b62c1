use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;

use super::setup;
use crate::models::users::{self, Role};
use crate::models::review;

async fn flags(db: &sea_orm::DatabaseConnection, id: i32) -> (Role, bool, bool) {
    let user = users::Entity::find_by_id(id).one(db).await.unwrap().unwrap();
    (user.role, user.is_staff, user.is_superuser)
}

#[actix_web::test]
async fn test_role_changes_update_privilege_flags() {
    let ctx = setup().await;
    let (_, admin) = ctx.user("boss", Role::Admin).await;
    let (target, _) = ctx.user("target", Role::User).await;
    let app = test_app!(ctx);

    for (role, is_staff, is_superuser) in [
        (Role::Admin, true, true),
        (Role::Moderator, true, false),
        (Role::User, false, false),
        (Role::Admin, true, true),
        // Rétrogradation admin -> user
        (Role::User, false, false),
    ] {
        let (status, body) = call!(
            app,
            TestRequest::patch()
                .uri("/v1/users/target")
                .insert_header(("Authorization", admin.as_str()))
                .set_json(json!({ "role": role }))
        );
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["role"], json!(role));
        assert_eq!(flags(&ctx.db, target.id).await, (role, is_staff, is_superuser));
    }
}

#[actix_web::test]
async fn test_user_collection_is_admin_only() {
    let ctx = setup().await;
    let (_, moderator) = ctx.user("moderator", Role::Moderator).await;
    let (_, admin) = ctx.user("boss", Role::Admin).await;
    let app = test_app!(ctx);

    let (status, _) = call!(app, TestRequest::get().uri("/v1/users"));
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call!(
        app,
        TestRequest::get()
            .uri("/v1/users")
            .insert_header(("Authorization", moderator.as_str()))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call!(
        app,
        TestRequest::get()
            .uri("/v1/users?search=mod")
            .insert_header(("Authorization", admin.as_str()))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["username"], "moderator");
    assert_eq!(body["results"][0]["role"], "moderator");

    let (_, body) = call!(
        app,
        TestRequest::get()
            .uri("/v1/users?search=BOS")
            .insert_header(("Authorization", admin.as_str()))
    );
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["username"], "boss");

    let (_, body) = call!(
        app,
        TestRequest::get()
            .uri("/v1/users?search=_")
            .insert_header(("Authorization", admin.as_str()))
    );
    assert_eq!(body["count"], 0);

    let (status, _) = call!(
        app,
        TestRequest::get()
            .uri("/v1/users")
            .insert_header(("Authorization", "Bearer not-a-token"))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_admin_creates_user_with_role_and_password() {
    let ctx = setup().await;
    let (_, admin) = ctx.user("boss", Role::Admin).await;
    let app = test_app!(ctx);

    let (status, body) = call!(
        app,
        TestRequest::post()
            .uri("/v1/users")
            .insert_header(("Authorization", admin.as_str()))
            .set_json(json!({
                "username": "newmod",
                "email": "newmod@example.com",
                "role": "moderator",
                "password": "12345"
            }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["password"].as_array().unwrap().len() >= 2);

    let (status, body) = call!(
        app,
        TestRequest::post()
            .uri("/v1/users")
            .insert_header(("Authorization", admin.as_str()))
            .set_json(json!({
                "username": "newmod",
                "email": "newmod@example.com",
                "role": "moderator",
                "password": "violet-tundra-88"
            }))
    );
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["role"], "moderator");
    assert!(body.get("password").is_none());

    let stored = users::Entity::find()
        .all(&ctx.db)
        .await
        .unwrap()
        .into_iter()
        .find(|u| u.username == "newmod")
        .unwrap();
    assert!((stored.is_staff, stored.is_superuser) == (true, false));
    let hash = stored.password_hash.unwrap();
    assert!(hash.starts_with("pbkdf2_sha256$"));
    assert!(!hash.contains("violet-tundra-88"));

    // Username déjà pris
    let (status, _) = call!(
        app,
        TestRequest::post()
            .uri("/v1/users")
            .insert_header(("Authorization", admin.as_str()))
            .set_json(json!({ "username": "newmod", "email": "other@example.com" }))
    );
    assert_eq!(status, StatusCode::CONFLICT);

    // "me" est réservé
    let (status, _) = call!(
        app,
        TestRequest::post()
            .uri("/v1/users")
            .insert_header(("Authorization", admin.as_str()))
            .set_json(json!({ "username": "me", "email": "me@example.com" }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_me_reads_and_updates_own_profile() {
    let ctx = setup().await;
    let (reader, token) = ctx.user("reader", Role::User).await;
    let app = test_app!(ctx);

    let (status, _) = call!(app, TestRequest::get().uri("/v1/users/me"));
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call!(
        app,
        TestRequest::get()
            .uri("/v1/users/me/")
            .insert_header(("Authorization", token.as_str()))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "reader");
    assert_eq!(body["email"], "reader@example.com");

    // Le rôle envoyé par un non-admin est ignoré
    let (status, body) = call!(
        app,
        TestRequest::patch()
            .uri("/v1/users/me")
            .insert_header(("Authorization", token.as_str()))
            .set_json(json!({ "bio": "Reads a lot", "role": "admin" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bio"], "Reads a lot");
    assert_eq!(body["role"], "user");
    assert_eq!(flags(&ctx.db, reader.id).await, (Role::User, false, false));
}

#[actix_web::test]
async fn test_admin_manages_user_by_username() {
    let ctx = setup().await;
    let (_, admin) = ctx.user("boss", Role::Admin).await;
    let (reader, reader_token) = ctx.user("reader", Role::User).await;
    let app = test_app!(ctx);

    let (status, body) = call!(
        app,
        TestRequest::get()
            .uri("/v1/users/reader")
            .insert_header(("Authorization", admin.as_str()))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "reader");

    let (status, _) = call!(
        app,
        TestRequest::get()
            .uri("/v1/users/ghost")
            .insert_header(("Authorization", admin.as_str()))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);

    // PUT : username et email requis
    let (status, _) = call!(
        app,
        TestRequest::put()
            .uri("/v1/users/reader")
            .insert_header(("Authorization", admin.as_str()))
            .set_json(json!({ "first_name": "Ann" }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Une review pour vérifier la cascade
    let (_, title) = call!(
        app,
        TestRequest::post()
            .uri("/v1/titles")
            .insert_header(("Authorization", admin.as_str()))
            .set_json(json!({ "name": "Dune" }))
    );
    let (status, _) = call!(
        app,
        TestRequest::post()
            .uri(&format!("/v1/titles/{}/reviews", title["id"]))
            .insert_header(("Authorization", reader_token.as_str()))
            .set_json(json!({ "text": "Good", "score": 8 }))
    );
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = call!(
        app,
        TestRequest::delete()
            .uri("/v1/users/reader")
            .insert_header(("Authorization", admin.as_str()))
    );
    assert_eq!(status, StatusCode::NO_CONTENT);

    assert!(users::Entity::find_by_id(reader.id).one(&ctx.db).await.unwrap().is_none());
    assert_eq!(review::Entity::find().count(&ctx.db).await.unwrap(), 0);

    // Le token d'un compte supprimé n'authentifie plus
    let (status, _) = call!(
        app,
        TestRequest::get()
            .uri("/v1/users/me")
            .insert_header(("Authorization", reader_token.as_str()))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
