//! HTTP-level integration tests for quote versioning and project quote
//! chains.

mod common;

use axum::http::StatusCode;
use common::{expect_status, get, post_json, put_json, seed_user, seed_vendor, TestUser};
use serde_json::{json, Value};
use sqlx::PgPool;

struct World {
    designer: TestUser,
    rep: TestUser,
    project_id: i64,
}

/// A designer-owned project shared with the vendor's organization as editor.
async fn world(pool: &PgPool) -> World {
    let designer = seed_user(pool, "designer@studio.test", "designer").await;
    let (rep, org_id) = seed_vendor(pool, "rep@vendor.test", "Acme Surfaces").await;

    let app = common::build_test_app(pool.clone());
    let created = expect_status(
        post_json(
            app,
            "/api/v1/projects",
            Some(&designer.token),
            json!({"title": "Harbor House"}),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    let project_id = created["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!("/api/v1/projects/{project_id}/participants"),
        Some(&designer.token),
        json!({"grantee": {"organization": org_id}, "side": "VENDOR", "role": "EDITOR"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    World {
        designer,
        rep,
        project_id,
    }
}

fn quote_body(file: &str, extra: Value) -> Value {
    let mut body = json!({
        "file_url": format!("https://files.test/{file}"),
        "file_name": file,
        "total_cents": 98000,
        "currency": "USD"
    });
    if let (Some(body), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
        body.extend(extra.clone());
    }
    body
}

async fn create_quote(pool: &PgPool, rep: &TestUser, body: Value) -> axum::response::Response {
    let app = common::build_test_app(pool.clone());
    post_json(app, "/api/v1/quotes", Some(&rep.token), body).await
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn superseding_quote_inherits_project_and_chains(pool: PgPool) {
    let w = world(&pool).await;

    let v1 = expect_status(
        create_quote(
            &pool,
            &w.rep,
            quote_body("v1.pdf", json!({"project_id": w.project_id})),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(v1["data"]["version"], 1);
    assert_eq!(v1["data"]["status"], "DRAFT");
    let v1_id = v1["data"]["id"].as_i64().unwrap();

    let v2 = expect_status(
        create_quote(
            &pool,
            &w.rep,
            quote_body("v2.pdf", json!({"supersedes_id": v1_id})),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(v2["data"]["version"], 2);
    assert_eq!(v2["data"]["project_id"], w.project_id);
    let v2_id = v2["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let chains = expect_status(
        get(
            app,
            &format!("/api/v1/projects/{}/quotes", w.project_id),
            Some(&w.designer.token),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    let chains = chains["data"].as_array().unwrap();
    assert_eq!(chains.len(), 1);
    let ids: Vec<i64> = chains[0]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![v2_id, v1_id]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn forking_a_chain_conflicts(pool: PgPool) {
    let w = world(&pool).await;
    let v1 = expect_status(
        create_quote(&pool, &w.rep, quote_body("v1.pdf", json!({}))).await,
        StatusCode::CREATED,
    )
    .await;
    let v1_id = v1["data"]["id"].as_i64().unwrap();

    let response = create_quote(
        &pool,
        &w.rep,
        quote_body("v2.pdf", json!({"supersedes_id": v1_id})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = create_quote(
        &pool,
        &w.rep,
        quote_body("v2-alt.pdf", json!({"supersedes_id": v1_id})),
    )
    .await;
    let json = expect_status(response, StatusCode::CONFLICT).await;
    assert_eq!(json["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_currency_is_rejected(pool: PgPool) {
    let w = world(&pool).await;
    let response = create_quote(
        &pool,
        &w.rep,
        quote_body("q.pdf", json!({"currency": "usd"})),
    )
    .await;
    let json = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn designers_cannot_create_quotes(pool: PgPool) {
    let w = world(&pool).await;
    let response = create_quote(&pool, &w.designer, quote_body("q.pdf", json!({}))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unattached_quote_is_private_to_its_organization(pool: PgPool) {
    let w = world(&pool).await;
    let quote = expect_status(
        create_quote(&pool, &w.rep, quote_body("q.pdf", json!({}))).await,
        StatusCode::CREATED,
    )
    .await;
    let quote_id = quote["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = get(app, &format!("/api/v1/quotes/{quote_id}"), Some(&w.rep.token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let response = get(
        app,
        &format!("/api/v1/quotes/{quote_id}"),
        Some(&w.designer.token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn quote_for_project_requires_edit_access(pool: PgPool) {
    let w = world(&pool).await;
    let (outsider, _) = seed_vendor(&pool, "rep@rival.test", "Rival Tile").await;

    let response = create_quote(
        &pool,
        &outsider,
        quote_body("q.pdf", json!({"project_id": w.project_id})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
