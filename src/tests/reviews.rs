use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::{json, Value};

use super::{setup, TestContext};
use crate::models::comment;
use crate::models::users::Role;

/// Crée un titre et renvoie l'URI de ses reviews
async fn title_reviews_uri(ctx: &TestContext, name: &str) -> String {
    let (_, admin) = ctx.user(&format!("admin-{}", name.to_lowercase()), Role::Admin).await;
    let app = test_app!(ctx);
    let (status, created) = call!(
        app,
        TestRequest::post()
            .uri("/v1/titles")
            .insert_header(("Authorization", admin.as_str()))
            .set_json(json!({ "name": name }))
    );
    assert_eq!(status, StatusCode::CREATED);
    format!("/v1/titles/{}/reviews", created["id"])
}

#[actix_web::test]
async fn test_second_review_on_same_title_is_rejected_but_update_works() {
    let ctx = setup().await;
    let uri = title_reviews_uri(&ctx, "Dune").await;
    let (_, reader) = ctx.user("reader", Role::User).await;
    let app = test_app!(ctx);

    let (status, first) = call!(
        app,
        TestRequest::post()
            .uri(&uri)
            .insert_header(("Authorization", reader.as_str()))
            .set_json(json!({ "text": "Great", "score": 7 }))
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["author"], "reader");
    assert_eq!(first["score"], 7);

    let (status, body) = call!(
        app,
        TestRequest::post()
            .uri(&uri)
            .insert_header(("Authorization", reader.as_str()))
            .set_json(json!({ "text": "Still great", "score": 8 }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["non_field_errors"][0].is_string());

    let (status, updated) = call!(
        app,
        TestRequest::patch()
            .uri(&format!("{uri}/{}", first["id"]))
            .insert_header(("Authorization", reader.as_str()))
            .set_json(json!({ "score": 10 }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["score"], 10);
    assert_eq!(updated["text"], "Great");
    assert!(updated["pub_date"].is_string());

    let (_, list) = call!(app, TestRequest::get().uri(&uri));
    assert_eq!(list["count"], 1);
}

#[actix_web::test]
async fn test_same_author_can_review_another_title() {
    let ctx = setup().await;
    let first = title_reviews_uri(&ctx, "Dune").await;
    let second = title_reviews_uri(&ctx, "Solaris").await;
    let (_, reader) = ctx.user("reader", Role::User).await;
    let app = test_app!(ctx);

    for uri in [&first, &second] {
        let (status, _) = call!(
            app,
            TestRequest::post()
                .uri(uri)
                .insert_header(("Authorization", reader.as_str()))
                .set_json(json!({ "text": "Fine", "score": 6 }))
        );
        assert_eq!(status, StatusCode::CREATED);
    }
}

#[actix_web::test]
async fn test_review_validation() {
    let ctx = setup().await;
    let uri = title_reviews_uri(&ctx, "Dune").await;
    let (_, reader) = ctx.user("reader", Role::User).await;
    let app = test_app!(ctx);

    for body in [
        json!({ "text": "Too good", "score": 11 }),
        json!({ "text": "Too bad", "score": 0 }),
        json!({ "score": 5 }),
    ] {
        let (status, _) = call!(
            app,
            TestRequest::post()
                .uri(&uri)
                .insert_header(("Authorization", reader.as_str()))
                .set_json(body.clone())
        );
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    }

    let (status, _) = call!(
        app,
        TestRequest::post()
            .uri("/v1/titles/999/reviews")
            .insert_header(("Authorization", reader.as_str()))
            .set_json(json!({ "text": "Ghost", "score": 5 }))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call!(
        app,
        TestRequest::post()
            .uri(&uri)
            .insert_header(("Content-Type", "application/json"))
            .insert_header(("Authorization", reader.as_str()))
            .set_payload("{not json")
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_only_author_or_staff_can_modify_review() {
    let ctx = setup().await;
    let uri = title_reviews_uri(&ctx, "Dune").await;
    let (_, author) = ctx.user("author", Role::User).await;
    let (_, stranger) = ctx.user("stranger", Role::User).await;
    let (_, moderator) = ctx.user("moderator", Role::Moderator).await;
    let app = test_app!(ctx);

    let (_, review) = call!(
        app,
        TestRequest::post()
            .uri(&uri)
            .insert_header(("Authorization", author.as_str()))
            .set_json(json!({ "text": "Mine", "score": 5 }))
    );
    let review_uri = format!("{uri}/{}", review["id"]);

    let (status, _) = call!(
        app,
        TestRequest::patch().uri(&review_uri).set_json(json!({ "score": 1 }))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call!(
        app,
        TestRequest::patch()
            .uri(&review_uri)
            .insert_header(("Authorization", stranger.as_str()))
            .set_json(json!({ "score": 1 }))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call!(
        app,
        TestRequest::patch()
            .uri(&review_uri)
            .insert_header(("Authorization", moderator.as_str()))
            .set_json(json!({ "text": "Moderated" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "Moderated");
    // L'auteur ne change pas
    assert_eq!(body["author"], "author");

    let (status, _) = call!(
        app,
        TestRequest::delete()
            .uri(&review_uri)
            .insert_header(("Authorization", stranger.as_str()))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call!(
        app,
        TestRequest::delete()
            .uri(&review_uri)
            .insert_header(("Authorization", author.as_str()))
    );
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = call!(app, TestRequest::get().uri(&review_uri));
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_review_is_scoped_to_its_title() {
    let ctx = setup().await;
    let dune = title_reviews_uri(&ctx, "Dune").await;
    let solaris = title_reviews_uri(&ctx, "Solaris").await;
    let (_, reader) = ctx.user("reader", Role::User).await;
    let app = test_app!(ctx);

    let (_, review) = call!(
        app,
        TestRequest::post()
            .uri(&dune)
            .insert_header(("Authorization", reader.as_str()))
            .set_json(json!({ "text": "Spice", "score": 8 }))
    );

    let (status, _) = call!(app, TestRequest::get().uri(&format!("{dune}/{}", review["id"])));
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call!(app, TestRequest::get().uri(&format!("{solaris}/{}", review["id"])));
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call!(
        app,
        TestRequest::get().uri(&format!("{solaris}/{}/comments", review["id"]))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_comments_lifecycle() {
    let ctx = setup().await;
    let uri = title_reviews_uri(&ctx, "Dune").await;
    let (_, author) = ctx.user("author", Role::User).await;
    let (_, commenter) = ctx.user("commenter", Role::User).await;
    let (_, admin) = ctx.user("boss", Role::Admin).await;
    let app = test_app!(ctx);

    let (_, review) = call!(
        app,
        TestRequest::post()
            .uri(&uri)
            .insert_header(("Authorization", author.as_str()))
            .set_json(json!({ "text": "Spice", "score": 8 }))
    );
    let review_uri = format!("{uri}/{}", review["id"]);
    let comments_uri = format!("{review_uri}/comments");

    let (status, _) = call!(
        app,
        TestRequest::post().uri(&comments_uri).set_json(json!({ "text": "Anonymous" }))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, created) = call!(
        app,
        TestRequest::post()
            .uri(&comments_uri)
            .insert_header(("Authorization", commenter.as_str()))
            .set_json(json!({ "text": "Agreed" }))
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["author"], "commenter");
    let comment_uri = format!("{comments_uri}/{}", created["id"]);

    let (status, list) = call!(app, TestRequest::get().uri(&format!("{comments_uri}/")));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["count"], 1);
    assert_eq!(list["results"][0]["text"], "Agreed");

    // L'auteur de la review n'est pas l'auteur du commentaire
    let (status, _) = call!(
        app,
        TestRequest::patch()
            .uri(&comment_uri)
            .insert_header(("Authorization", author.as_str()))
            .set_json(json!({ "text": "Edited" }))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call!(
        app,
        TestRequest::put()
            .uri(&comment_uri)
            .insert_header(("Authorization", commenter.as_str()))
            .set_json(json!({ "text": "Edited" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "Edited");

    // Supprimer la review supprime ses commentaires
    let (status, _) = call!(
        app,
        TestRequest::delete()
            .uri(&review_uri)
            .insert_header(("Authorization", admin.as_str()))
    );
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(comment::Entity::find().count(&ctx.db).await.unwrap(), 0);

    let (status, body) = call!(app, TestRequest::get().uri(&comment_uri));
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_ne!(body, Value::Null);
}
