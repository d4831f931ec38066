/// Integration tests for the post endpoints
///
/// Covers per-user isolation, defaults and url normalization, and the
/// not-found-or-unauthorized non-disclosure rule.

mod common;

use axum::http::{Method, StatusCode};
use common::TestContext;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_create_applies_defaults_and_normalizes_url() {
    let ctx = TestContext::new();
    let token = ctx.signed_in_user("ada@example.com").await;

    let (status, body) = ctx
        .send(
            Method::POST,
            "/api/posts",
            Some(&token),
            Some(json!({ "title": "Rust book", "url": "doc.rust-lang.org/book" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["message"].is_string());

    let post = &body["post"];
    assert!(post["id"].is_string());
    assert_eq!(post["title"], "Rust book");
    assert_eq!(post["description"], "");
    assert_eq!(post["url"], "https://doc.rust-lang.org/book");
    assert_eq!(post["status"], "TO LEARN");
    assert!(post["userId"].is_string());
    assert!(post["createdAt"].is_string());
}

#[tokio::test]
async fn test_https_url_kept_as_is() {
    let ctx = TestContext::new();
    let token = ctx.signed_in_user("ada@example.com").await;

    let post = ctx
        .create_post(
            &token,
            json!({ "title": "Axum", "url": "https://docs.rs/axum", "status": "LEARNING" }),
        )
        .await;

    assert_eq!(post["url"], "https://docs.rs/axum");
    assert_eq!(post["status"], "LEARNING");
}

#[tokio::test]
async fn test_owner_comes_from_token_not_body() {
    let ctx = TestContext::new();
    let token = ctx.signed_in_user("ada@example.com").await;
    let (_, me) = ctx.send(Method::GET, "/api/auth", Some(&token), None).await;

    let post = ctx
        .create_post(
            &token,
            json!({ "title": "Rust", "url": "example.com", "userId": Uuid::new_v4() }),
        )
        .await;

    assert_eq!(post["userId"], me["user"]["id"]);
}

#[tokio::test]
async fn test_missing_title_or_url_leaves_store_untouched() {
    let ctx = TestContext::new();
    let token = ctx.signed_in_user("ada@example.com").await;

    for (body, message) in [
        (json!({ "url": "example.com" }), "Title is required"),
        (json!({ "title": "", "url": "example.com" }), "Title is required"),
        (json!({ "title": "Rust" }), "URL is required"),
    ] {
        let (status, response) = ctx.send(Method::POST, "/api/posts", Some(&token), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], "validation_error");
        assert_eq!(response["message"], message);
    }

    assert_eq!(ctx.store.total_posts().await, 0);
}

#[tokio::test]
async fn test_users_only_see_their_own_posts() {
    let ctx = TestContext::new();
    let alice = ctx.signed_in_user("alice@example.com").await;
    let bob = ctx.signed_in_user("bob@example.com").await;

    ctx.create_post(&alice, json!({ "title": "first", "url": "a.example" })).await;
    ctx.create_post(&alice, json!({ "title": "second", "url": "b.example" })).await;
    ctx.create_post(&bob, json!({ "title": "bob's", "url": "c.example" })).await;

    let titles: Vec<String> = ctx
        .list_posts(&alice)
        .await
        .iter()
        .map(|p| p["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["first", "second"]);

    let bob_posts = ctx.list_posts(&bob).await;
    assert_eq!(bob_posts.len(), 1);
    assert_eq!(bob_posts[0]["title"], "bob's");
}

#[tokio::test]
async fn test_create_update_list_round_trip() {
    let ctx = TestContext::new();
    let token = ctx.signed_in_user("ada@example.com").await;

    let post = ctx
        .create_post(
            &token,
            json!({
                "title": "Rust",
                "description": "ownership chapter",
                "url": "example.com",
                "status": "LEARNING"
            }),
        )
        .await;
    let id = post["id"].as_str().unwrap();

    // Optional fields omitted: they fall back to defaults
    let (status, body) = ctx
        .send(
            Method::PUT,
            &format!("/api/posts/{}", id),
            Some(&token),
            Some(json!({ "title": "Rust, again", "url": "example.org" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["post"]["id"], id);

    let posts = ctx.list_posts(&token).await;
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["title"], "Rust, again");
    assert_eq!(posts[0]["url"], "https://example.org");
    assert_eq!(posts[0]["description"], "");
    assert_eq!(posts[0]["status"], "TO LEARN");
    assert_eq!(posts[0]["userId"], post["userId"]);
}

#[tokio::test]
async fn test_update_without_url_is_rejected() {
    let ctx = TestContext::new();
    let token = ctx.signed_in_user("ada@example.com").await;
    let post = ctx.create_post(&token, json!({ "title": "Rust", "url": "example.com" })).await;

    let (status, body) = ctx
        .send(
            Method::PUT,
            &format!("/api/posts/{}", post["id"].as_str().unwrap()),
            Some(&token),
            Some(json!({ "title": "Rust" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "URL is required");
    assert_eq!(ctx.list_posts(&token).await[0]["url"], "https://example.com");
}

#[tokio::test]
async fn test_foreign_and_missing_posts_are_indistinguishable() {
    let ctx = TestContext::new();
    let alice = ctx.signed_in_user("alice@example.com").await;
    let bob = ctx.signed_in_user("bob@example.com").await;

    let bobs_post = ctx.create_post(&bob, json!({ "title": "bob's", "url": "b.example" })).await;
    let foreign = format!("/api/posts/{}", bobs_post["id"].as_str().unwrap());
    let missing = format!("/api/posts/{}", Uuid::new_v4());
    let malformed = "/api/posts/not-a-uuid".to_string();
    let update = json!({ "title": "hijacked", "url": "evil.example" });

    let (foreign_status, foreign_update) =
        ctx.send(Method::PUT, &foreign, Some(&alice), Some(update.clone())).await;
    let (missing_status, missing_update) =
        ctx.send(Method::PUT, &missing, Some(&alice), Some(update.clone())).await;
    let (malformed_status, malformed_update) =
        ctx.send(Method::PUT, &malformed, Some(&alice), Some(update)).await;

    assert_eq!(foreign_status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing_status, StatusCode::UNAUTHORIZED);
    assert_eq!(malformed_status, StatusCode::UNAUTHORIZED);
    assert_eq!(foreign_update, missing_update);
    assert_eq!(foreign_update, malformed_update);
    assert_eq!(foreign_update["error"], "not_found_or_unauthorized");
    assert_eq!(foreign_update["message"], "Post not found or user not authorized");

    let (_, foreign_delete) = ctx.send(Method::DELETE, &foreign, Some(&alice), None).await;
    let (_, missing_delete) = ctx.send(Method::DELETE, &missing, Some(&alice), None).await;
    assert_eq!(foreign_delete, missing_delete);
    assert_eq!(foreign_delete, foreign_update);

    // Bob's post is untouched
    let bob_posts = ctx.list_posts(&bob).await;
    assert_eq!(bob_posts.len(), 1);
    assert_eq!(bob_posts[0]["title"], "bob's");
}

#[tokio::test]
async fn test_delete_returns_removed_post() {
    let ctx = TestContext::new();
    let token = ctx.signed_in_user("ada@example.com").await;
    let post = ctx.create_post(&token, json!({ "title": "Rust", "url": "example.com" })).await;
    let uri = format!("/api/posts/{}", post["id"].as_str().unwrap());

    let (status, body) = ctx.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["post"], post);
    assert!(ctx.list_posts(&token).await.is_empty());

    // Second delete finds nothing
    let (status, body) = ctx.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "not_found_or_unauthorized");
}
