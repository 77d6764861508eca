//! Integration tests for quote supersession.
//!
//! - A superseding quote gets the next version and inherits the project
//! - A quote can be superseded only once
//! - Only the issuing organization may supersede
//! - A quote out with a pending handoff cannot be revised until the link lapses
//! - Chain listing reaches ancestors outside the project and honors vendor scope

use assert_matches::assert_matches;
use handoff_core::error::CoreError;
use chrono::{Duration, Utc};
use handoff_core::handoff::{generate_visit_token, ProjectKind};
use handoff_core::quote::{group_into_chains, is_well_formed};
use handoff_db::models::organization::CreateOrganization;
use handoff_db::models::quote::{CreateQuote, QuoteAttachment};
use handoff_db::models::user::CreateUser;
use handoff_db::models::visit::{CreateVisit, NewVisit};
use handoff_db::repositories::{OrganizationRepo, ProjectRepo, QuoteRepo, UserRepo, VisitRepo};
use handoff_db::RepoError;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn vendor(pool: &PgPool, email: &str, org_name: &str) -> (i64, i64) {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            email: email.into(),
            display_name: None,
        },
    )
    .await
    .unwrap();
    let org = OrganizationRepo::create(
        pool,
        &CreateOrganization {
            name: org_name.into(),
        },
    )
    .await
    .unwrap();
    OrganizationRepo::add_member(pool, org.id, user.id).await.unwrap();
    (user.id, org.id)
}

fn quote_input(
    project_id: Option<i64>,
    supersedes_id: Option<i64>,
    total_cents: i64,
) -> CreateQuote {
    CreateQuote {
        project_id,
        room_id: None,
        selection_id: None,
        file_url: "https://files.test/quote.pdf".into(),
        file_name: "quote.pdf".into(),
        total_cents,
        currency: "USD".into(),
        lead_time_days: None,
        terms: None,
        supersedes_id,
        expires_at: None,
        line_items: None,
    }
}

async fn create(
    pool: &PgPool,
    org_id: i64,
    user_id: i64,
    input: &CreateQuote,
) -> Result<QuoteAttachment, RepoError> {
    QuoteRepo::create(pool, org_id, user_id, input).await
}

// ---------------------------------------------------------------------------
// Supersession
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn superseding_quote_gets_next_version(pool: PgPool) {
    let (user_id, org_id) = vendor(&pool, "rep@vendor.test", "Acme").await;
    let project = ProjectRepo::create(&pool, user_id, "Job", ProjectKind::Project, None)
        .await
        .unwrap();

    let v1 = create(&pool, org_id, user_id, &quote_input(Some(project.id), None, 1000))
        .await
        .unwrap();
    assert_eq!(v1.version, 1);
    assert_eq!(v1.status, "DRAFT");
    assert_eq!(v1.line_items, serde_json::json!([]));

    let v2 = create(&pool, org_id, user_id, &quote_input(None, Some(v1.id), 900))
        .await
        .unwrap();
    assert_eq!(v2.version, 2);
    assert_eq!(v2.supersedes_id, Some(v1.id));
    assert_eq!(v2.project_id, Some(project.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn fork_is_rejected(pool: PgPool) {
    let (user_id, org_id) = vendor(&pool, "rep@vendor.test", "Acme").await;
    let v1 = create(&pool, org_id, user_id, &quote_input(None, None, 1000)).await.unwrap();
    create(&pool, org_id, user_id, &quote_input(None, Some(v1.id), 900))
        .await
        .unwrap();

    let fork = create(&pool, org_id, user_id, &quote_input(None, Some(v1.id), 800)).await;
    assert_matches!(fork, Err(RepoError::Core(CoreError::Conflict(_))));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn other_org_cannot_supersede(pool: PgPool) {
    let (user_a, org_a) = vendor(&pool, "a@vendor.test", "Acme").await;
    let (user_b, org_b) = vendor(&pool, "b@vendor.test", "Rival").await;
    let v1 = create(&pool, org_a, user_a, &quote_input(None, None, 1000)).await.unwrap();

    let result = create(&pool, org_b, user_b, &quote_input(None, Some(v1.id), 900)).await;
    assert_matches!(result, Err(RepoError::Core(CoreError::Forbidden(_))));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn quote_with_pending_handoff_cannot_be_superseded(pool: PgPool) {
    let (user_id, org_id) = vendor(&pool, "rep@vendor.test", "Acme").await;
    let v1 = create(&pool, org_id, user_id, &quote_input(None, None, 1000)).await.unwrap();
    let (visit, _) = VisitRepo::issue(
        &pool,
        &NewVisit {
            token: generate_visit_token(),
            vendor_user_id: user_id,
            vendor_org_id: org_id,
            designer_email: "designer@studio.test".into(),
            input: &CreateVisit {
                recipient_email: "designer@studio.test".into(),
                items: vec![],
                quote_attachment_id: Some(v1.id),
                note: None,
                expires_at: None,
                source_project_id: None,
                organization_id: None,
            },
        },
    )
    .await
    .unwrap();

    let pending = QuoteRepo::pending_handoff_visit(&pool, v1.id).await.unwrap();
    assert_eq!(pending, Some(visit.id));
    let refused = create(&pool, org_id, user_id, &quote_input(None, Some(v1.id), 900)).await;
    assert_matches!(refused, Err(RepoError::Core(CoreError::Conflict(_))));

    // Once the link lapses the quote is free to be revised.
    sqlx::query("UPDATE vendor_visits SET expires_at = $2 WHERE id = $1")
        .bind(visit.id)
        .bind(Utc::now() - Duration::minutes(1))
        .execute(&pool)
        .await
        .unwrap();
    let v2 = create(&pool, org_id, user_id, &quote_input(None, Some(v1.id), 900))
        .await
        .unwrap();
    assert_eq!(v2.version, 2);
    assert!(QuoteRepo::has_successor(&pool, v1.id).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_superseded_quote_is_not_found(pool: PgPool) {
    let (user_id, org_id) = vendor(&pool, "rep@vendor.test", "Acme").await;
    let result = create(&pool, org_id, user_id, &quote_input(None, Some(424_242), 900)).await;
    assert_matches!(
        result,
        Err(RepoError::Core(CoreError::NotFound { entity: "QuoteAttachment", id: 424_242 }))
    );
}

// ---------------------------------------------------------------------------
// Chain listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn chain_listing_includes_ancestors_outside_project(pool: PgPool) {
    let (user_a, org_a) = vendor(&pool, "a@vendor.test", "Acme").await;
    let (user_b, org_b) = vendor(&pool, "b@vendor.test", "Rival").await;
    let project = ProjectRepo::create(&pool, user_a, "Job", ProjectKind::Project, None)
        .await
        .unwrap();

    // v1 travelled with a pending handoff and never got a project.
    let v1 = create(&pool, org_a, user_a, &quote_input(None, None, 1000)).await.unwrap();
    let v2 = create(&pool, org_a, user_a, &quote_input(Some(project.id), Some(v1.id), 900))
        .await
        .unwrap();
    let other = create(&pool, org_b, user_b, &quote_input(Some(project.id), None, 500))
        .await
        .unwrap();

    let all = QuoteRepo::list_chain_members_for_project(&pool, project.id, None)
        .await
        .unwrap();
    let chains = group_into_chains(all);
    assert_eq!(chains.len(), 2);
    let acme = chains.iter().find(|c| c[0].id == v2.id).unwrap();
    assert_eq!(acme.iter().map(|q| q.id).collect::<Vec<_>>(), vec![v2.id, v1.id]);
    assert!(is_well_formed(acme));

    let scope = [org_b];
    let scoped = QuoteRepo::list_chain_members_for_project(&pool, project.id, Some(&scope[..]))
        .await
        .unwrap();
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0].id, other.id);
}
