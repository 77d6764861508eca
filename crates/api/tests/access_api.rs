//! HTTP-level integration tests for project access, participants, and
//! vendor-side scoping of selections.

mod common;

use axum::http::StatusCode;
use common::{delete, expect_status, get, post_json, put_json, seed_user, seed_vendor, TestUser};
use serde_json::json;
use sqlx::PgPool;

struct World {
    designer: TestUser,
    rep: TestUser,
    org_id: i64,
    project_id: i64,
}

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

    World {
        designer,
        rep,
        org_id,
        project_id: created["data"]["id"].as_i64().unwrap(),
    }
}

async fn share_with_vendor(pool: &PgPool, w: &World) {
    let app = common::build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!("/api/v1/projects/{}/participants", w.project_id),
        Some(&w.designer.token),
        json!({"grantee": {"organization": w.org_id}, "side": "VENDOR", "role": "EDITOR"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

async fn add_selection(pool: &PgPool, w: &World, user: &TestUser, name: &str) -> i64 {
    let app = common::build_test_app(pool.clone());
    let created = expect_status(
        post_json(
            app,
            &format!("/api/v1/projects/{}/selections", w.project_id),
            Some(&user.token),
            json!({"product_name": name}),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    created["data"]["id"].as_i64().unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_check_reports_database(pool: PgPool) {
    let app = common::build_test_app(pool);
    let json = expect_status(get(app, "/health", None).await, StatusCode::OK).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn outsiders_cannot_see_a_project(pool: PgPool) {
    let w = world(&pool).await;

    let app = common::build_test_app(pool.clone());
    let response = get(
        app,
        &format!("/api/v1/projects/{}", w.project_id),
        Some(&w.rep.token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let listed = expect_status(
        get(app, "/api/v1/projects", Some(&w.rep.token)).await,
        StatusCode::OK,
    )
    .await;
    assert!(listed["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn vendor_sees_only_its_own_selections(pool: PgPool) {
    let w = world(&pool).await;
    share_with_vendor(&pool, &w).await;

    add_selection(&pool, &w, &w.designer, "Designer pick").await;
    let vendor_selection = add_selection(&pool, &w, &w.rep, "Vendor pick").await;

    let app = common::build_test_app(pool.clone());
    let vendor_view = expect_status(
        get(
            app,
            &format!("/api/v1/projects/{}/selections", w.project_id),
            Some(&w.rep.token),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    let rows = vendor_view["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], vendor_selection);
    assert_eq!(rows[0]["vendor_org_id"], w.org_id);
    assert_eq!(rows[0]["vendor_rep_id"], w.rep.id);

    let app = common::build_test_app(pool.clone());
    let designer_view = expect_status(
        get(
            app,
            &format!("/api/v1/projects/{}/selections", w.project_id),
            Some(&w.designer.token),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(designer_view["data"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn vendor_cannot_touch_designer_selections(pool: PgPool) {
    let w = world(&pool).await;
    share_with_vendor(&pool, &w).await;
    let designer_selection = add_selection(&pool, &w, &w.designer, "Designer pick").await;

    let app = common::build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!(
            "/api/v1/projects/{}/selections/{designer_selection}",
            w.project_id
        ),
        Some(&w.rep.token),
        json!({"quantity": 4}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let response = delete(
        app,
        &format!(
            "/api/v1/projects/{}/selections/{designer_selection}",
            w.project_id
        ),
        Some(&w.rep.token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn vendor_access_is_reported_as_vendor_editor(pool: PgPool) {
    let w = world(&pool).await;
    share_with_vendor(&pool, &w).await;

    let app = common::build_test_app(pool.clone());
    let detail = expect_status(
        get(
            app,
            &format!("/api/v1/projects/{}", w.project_id),
            Some(&w.rep.token),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(detail["data"]["access"]["role"], "EDITOR");
    assert_eq!(detail["data"]["access"]["side"], "VENDOR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_owners_may_grant(pool: PgPool) {
    let w = world(&pool).await;
    share_with_vendor(&pool, &w).await;
    let friend = seed_user(&pool, "friend@studio.test", "designer").await;

    let app = common::build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!("/api/v1/projects/{}/participants", w.project_id),
        Some(&w.rep.token),
        json!({"grantee": {"user": friend.id}, "side": "DESIGNER", "role": "VIEWER"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Re-granting updates in place rather than duplicating.
    let app = common::build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!("/api/v1/projects/{}/participants", w.project_id),
        Some(&w.designer.token),
        json!({"grantee": {"organization": w.org_id}, "side": "VENDOR", "role": "VIEWER"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let listed = expect_status(
        get(
            app,
            &format!("/api/v1/projects/{}/participants", w.project_id),
            Some(&w.designer.token),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    let rows = listed["data"].as_array().unwrap();
    let org_grants: Vec<_> = rows
        .iter()
        .filter(|p| p["organization_id"] == w.org_id)
        .collect();
    assert_eq!(org_grants.len(), 1);
    assert_eq!(org_grants[0]["role"], "VIEWER");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn viewers_cannot_add_rooms(pool: PgPool) {
    let w = world(&pool).await;
    let viewer = seed_user(&pool, "viewer@studio.test", "designer").await;

    let app = common::build_test_app(pool.clone());
    put_json(
        app,
        &format!("/api/v1/projects/{}/participants", w.project_id),
        Some(&w.designer.token),
        json!({"grantee": {"user": viewer.id}, "side": "DESIGNER", "role": "VIEWER"}),
    )
    .await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        &format!("/api/v1/projects/{}/rooms", w.project_id),
        Some(&viewer.token),
        json!({"name": "Kitchen"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let response = get(
        app,
        &format!("/api/v1/projects/{}/rooms", w.project_id),
        Some(&viewer.token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}
