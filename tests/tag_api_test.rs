//! HTTP tests for `/recipe/tags/`.

mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use recipe_backend::db::services::{RecipeService, TagError, TagService};
use recipe_backend::web::models::recipe_models::TagResponse;
use serde_json::json;

const TAGS_URL: &str = "/recipe/tags/";

fn detail_url(tag_id: i32) -> String {
    format!("/recipe/tags/{tag_id}/")
}

fn as_json(tags: Vec<TagResponse>) -> serde_json::Value {
    serde_json::to_value(tags).unwrap()
}

#[tokio::test]
async fn test_auth_required() {
    let app = TestApp::new().await;

    let res = app.get(TAGS_URL, None).await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let app = TestApp::new().await;
    let user = app.create_user("user@example.com").await;
    let tag = app.create_tag(&user, "Vegan").await;

    let res = app.get(TAGS_URL, Some("not-a-jwt")).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app.get(&detail_url(tag.id), None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_retrieve_tags() {
    let app = TestApp::new().await;
    let user = app.create_user("user@example.com").await;
    let token = app.token_for(&user);
    let vegan = app.create_tag(&user, "Vegan").await;
    let dessert = app.create_tag(&user, "Dessert").await;

    let res = app.get(TAGS_URL, Some(&token)).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, as_json(vec![dessert.into(), vegan.into()]));
}

#[tokio::test]
async fn test_tags_limited_to_user() {
    let app = TestApp::new().await;
    let user = app.create_user("user@example.com").await;
    let user2 = app.create_user("user2@example.com").await;
    let token = app.token_for(&user);
    app.create_tag(&user2, "Vegan").await;
    let dessert = app.create_tag(&user, "Dessert").await;

    let res = app.get(TAGS_URL, Some(&token)).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body.as_array().unwrap().len(), 1);
    assert_eq!(res.body, as_json(vec![dessert.into()]));
}

#[tokio::test]
async fn test_retrieve_single_tag() {
    let app = TestApp::new().await;
    let user = app.create_user("user@example.com").await;
    let token = app.token_for(&user);
    let tag = app.create_tag(&user, "Vegan").await;

    let single = app.get(&detail_url(tag.id), Some(&token)).await;
    let list = app.get(TAGS_URL, Some(&token)).await;

    assert_eq!(single.status, StatusCode::OK);
    assert_eq!(single.body, json!({ "id": tag.id, "name": "Vegan" }));
    assert_eq!(list.body[0], single.body);
}

#[tokio::test]
async fn test_update_tag() {
    let app = TestApp::new().await;
    let user = app.create_user("user@example.com").await;
    let token = app.token_for(&user);
    let tag = app.create_tag(&user, "Vegan").await;

    let res = app
        .request(
            Method::PATCH,
            &detail_url(tag.id),
            Some(&token),
            Some(json!({ "name": "Fruit" })),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, json!({ "id": tag.id, "name": "Fruit" }));
    let stored = TagService::get_tag_by_id(&app.db, tag.id, user.id).await.unwrap();
    assert_eq!(stored.name, "Fruit");
}

#[tokio::test]
async fn test_partial_update_without_fields_keeps_tag() {
    let app = TestApp::new().await;
    let user = app.create_user("user@example.com").await;
    let token = app.token_for(&user);
    let tag = app.create_tag(&user, "Vegan").await;

    let res = app
        .request(Method::PATCH, &detail_url(tag.id), Some(&token), Some(json!({})))
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["name"], "Vegan");
}

#[tokio::test]
async fn test_full_update_tag() {
    let app = TestApp::new().await;
    let user = app.create_user("user@example.com").await;
    let token = app.token_for(&user);
    let tag = app.create_tag(&user, "Vegan").await;

    let res = app
        .request(
            Method::PUT,
            &detail_url(tag.id),
            Some(&token),
            Some(json!({ "name": "Breakfast" })),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    let stored = TagService::get_tag_by_id(&app.db, tag.id, user.id).await.unwrap();
    assert_eq!(stored.name, "Breakfast");
}

#[tokio::test]
async fn test_update_with_blank_name_rejected() {
    let app = TestApp::new().await;
    let user = app.create_user("user@example.com").await;
    let token = app.token_for(&user);
    let tag = app.create_tag(&user, "Vegan").await;

    let res = app
        .request(
            Method::PUT,
            &detail_url(tag.id),
            Some(&token),
            Some(json!({ "name": "   " })),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    let stored = TagService::get_tag_by_id(&app.db, tag.id, user.id).await.unwrap();
    assert_eq!(stored.name, "Vegan");
}

#[tokio::test]
async fn test_delete_tag() {
    let app = TestApp::new().await;
    let user = app.create_user("user@example.com").await;
    let token = app.token_for(&user);
    let tag = app.create_tag(&user, "Vegan").await;

    let res = app
        .request(Method::DELETE, &detail_url(tag.id), Some(&token), None)
        .await;

    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert!(res.raw_body.is_empty());
    assert!(matches!(
        TagService::get_tag_by_id(&app.db, tag.id, user.id).await,
        Err(TagError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_delete_assigned_tag_unlinks_recipe() {
    let app = TestApp::new().await;
    let user = app.create_user("user@example.com").await;
    let token = app.token_for(&user);
    let tag = app.create_tag(&user, "Curry").await;
    let recipe = app.create_recipe(&user, "Thai Curry", 5, 450).await;
    RecipeService::add_tag(&app.db, recipe.recipe.id, tag.id, user.id)
        .await
        .unwrap();

    let res = app
        .request(Method::DELETE, &detail_url(tag.id), Some(&token), None)
        .await;

    assert_eq!(res.status, StatusCode::NO_CONTENT);
    let recipe = RecipeService::get_recipe_by_id(&app.db, recipe.recipe.id, user.id)
        .await
        .unwrap();
    assert!(recipe.tags.is_empty());
}

#[tokio::test]
async fn test_other_users_tag_is_not_found() {
    let app = TestApp::new().await;
    let owner = app.create_user("owner@example.com").await;
    let intruder = app.create_user("intruder@example.com").await;
    let token = app.token_for(&intruder);
    let tag = app.create_tag(&owner, "Vegan").await;

    let res = app.get(&detail_url(tag.id), Some(&token)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app
        .request(
            Method::PATCH,
            &detail_url(tag.id),
            Some(&token),
            Some(json!({ "name": "Hijacked" })),
        )
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app
        .request(Method::DELETE, &detail_url(tag.id), Some(&token), None)
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let stored = TagService::get_tag_by_id(&app.db, tag.id, owner.id).await.unwrap();
    assert_eq!(stored.name, "Vegan");
}

#[tokio::test]
async fn test_filter_tags_assigned_to_recipe() {
    let app = TestApp::new().await;
    let user = app.create_user("user@example.com").await;
    let token = app.token_for(&user);
    let tag1 = app.create_tag(&user, "Curry").await;
    let tag2 = app.create_tag(&user, "Beans").await;
    let recipe = app.create_recipe(&user, "Thai Curry", 5, 450).await;
    RecipeService::add_tag(&app.db, recipe.recipe.id, tag1.id, user.id)
        .await
        .unwrap();

    let res = app.get(&format!("{TAGS_URL}?assigned_only=1"), Some(&token)).await;

    assert_eq!(res.status, StatusCode::OK);
    let items = res.body.as_array().unwrap();
    let s1 = serde_json::to_value(TagResponse::from(tag1)).unwrap();
    let s2 = serde_json::to_value(TagResponse::from(tag2)).unwrap();
    assert!(items.contains(&s1));
    assert!(!items.contains(&s2));
}

#[tokio::test]
async fn test_filter_tags_unique() {
    let app = TestApp::new().await;
    let user = app.create_user("user@example.com").await;
    let token = app.token_for(&user);
    let tag = app.create_tag(&user, "Curry").await;
    app.create_tag(&user, "Lentils").await;
    let recipe1 = app.create_recipe(&user, "Egg Benedict", 15, 450).await;
    let recipe2 = app.create_recipe(&user, "Thai Curry", 25, 750).await;
    RecipeService::add_tag(&app.db, recipe1.recipe.id, tag.id, user.id)
        .await
        .unwrap();
    RecipeService::add_tag(&app.db, recipe2.recipe.id, tag.id, user.id)
        .await
        .unwrap();

    let res = app.get(&format!("{TAGS_URL}?assigned_only=1"), Some(&token)).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_assigned_only_false_returns_all() {
    let app = TestApp::new().await;
    let user = app.create_user("user@example.com").await;
    let token = app.token_for(&user);
    app.create_tag(&user, "Curry").await;
    app.create_tag(&user, "Beans").await;

    let res = app.get(&format!("{TAGS_URL}?assigned_only=0"), Some(&token)).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_assigned_only_must_be_boolean_like() {
    let app = TestApp::new().await;
    let user = app.create_user("user@example.com").await;
    let token = app.token_for(&user);

    let res = app
        .get(&format!("{TAGS_URL}?assigned_only=maybe"), Some(&token))
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_assigned_only_keeps_newest_first() {
    let app = TestApp::new().await;
    let user = app.create_user("user@example.com").await;
    let token = app.token_for(&user);
    let a = app.create_tag(&user, "A").await;
    let b = app.create_tag(&user, "B").await;
    app.create_tag(&user, "C").await;
    let d = app.create_tag(&user, "D").await;
    let r1 = app.create_recipe(&user, "Egg Benedict", 15, 450).await;
    let r2 = app.create_recipe(&user, "Thai Curry", 25, 750).await;
    for recipe in [&r1, &r2] {
        for id in [a.id, b.id, d.id] {
            RecipeService::add_tag(&app.db, recipe.recipe.id, id, user.id)
                .await
                .unwrap();
        }
    }

    let res = app.get(&format!("{TAGS_URL}?assigned_only=1"), Some(&token)).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, as_json(vec![d.into(), b.into(), a.into()]));
}

#[tokio::test]
async fn test_missing_tag_is_not_found() {
    let app = TestApp::new().await;
    let user = app.create_user("user@example.com").await;
    let token = app.token_for(&user);
    let missing = detail_url(9999);

    let res = app.get(&missing, Some(&token)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert!(res.body["error"].is_string());

    for method in [Method::PUT, Method::PATCH] {
        let res = app
            .request(method, &missing, Some(&token), Some(json!({ "name": "Ghost" })))
            .await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
    }

    let res = app.request(Method::DELETE, &missing, Some(&token), None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_numeric_id_is_not_found() {
    let app = TestApp::new().await;
    let user = app.create_user("user@example.com").await;
    let token = app.token_for(&user);

    let res = app.get("/recipe/tags/abc/", Some(&token)).await;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert!(res.body["error"].is_string());
}

#[tokio::test]
async fn test_full_update_without_name_rejected() {
    let app = TestApp::new().await;
    let user = app.create_user("user@example.com").await;
    let token = app.token_for(&user);
    let item = app.create_tag(&user, "Vegan").await;

    let res = app
        .request(Method::PUT, &detail_url(item.id), Some(&token), Some(json!({})))
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body["error"].is_string());
}
