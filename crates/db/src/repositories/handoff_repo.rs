//! The atomic claim of a handoff visit.
//!
//! Everything a claim changes happens in one transaction: the conditional
//! visit update, participant grants, materialized selections, and the quote
//! re-homing. Only the first claimer's conditional update matches a row;
//! every later attempt rolls back without side effects.

use chrono::Utc;
use handoff_core::access::{Grantee, Role, Side};
use handoff_core::error::CoreError;
use handoff_core::handoff::{ensure_claimable, materialized_name, ProjectKind};
use handoff_core::types::DbId;
use serde::Serialize;
use sqlx::PgPool;

use crate::error::RepoError;
use crate::models::selection::Attribution;
use crate::models::visit::VendorVisit;
use crate::repositories::selection_repo::MaterializedSelection;
use crate::repositories::{ParticipantRepo, ProjectRepo, QuoteRepo, SelectionRepo, VisitRepo};

/// Where the claimed handoff should land, after access has been checked.
#[derive(Debug, Clone)]
pub enum DestinationPlan {
    /// A project the claimer can edit. `claimer_grant` is the `(side, role)`
    /// the claimer currently holds there in their own name; it is `None`
    /// when they reach the project through an organization grant, which is
    /// then left as their only grant.
    Existing {
        project_id: DbId,
        claimer_grant: Option<(Side, Role)>,
    },
    /// A project created inside the claim transaction, owned by the claimer.
    Create { title: String, kind: ProjectKind },
}

/// A fully validated claim request.
#[derive(Debug, Clone)]
pub struct ClaimPlan {
    pub visit: VendorVisit,
    pub claimer_id: DbId,
    pub destination: DestinationPlan,
}

/// What a successful claim produced.
#[derive(Debug, Clone, Serialize)]
pub struct ClaimOutcome {
    pub visit_id: DbId,
    pub project_id: DbId,
    pub selections_attached: usize,
    pub created_project: bool,
    pub source_project_id: Option<DbId>,
    pub quote_attachment_id: Option<DbId>,
}

/// Provides the claim transaction.
pub struct HandoffRepo;

impl HandoffRepo {
    /// Claim `plan.visit` into its destination.
    ///
    /// Returns [`CoreError::AlreadyClaimed`] or [`CoreError::VisitExpired`]
    /// when the conditional update loses, classified from a fresh read of
    /// the visit after rollback.
    pub async fn claim(pool: &PgPool, plan: &ClaimPlan) -> Result<ClaimOutcome, RepoError> {
        let visit = &plan.visit;
        let mut tx = pool.begin().await?;

        let (project_id, claimer_grant, created_project) = match &plan.destination {
            DestinationPlan::Existing {
                project_id,
                claimer_grant,
            } => (*project_id, *claimer_grant, false),
            DestinationPlan::Create { title, kind } => {
                let project =
                    ProjectRepo::create(&mut *tx, plan.claimer_id, title, *kind, None).await?;
                (project.id, Some((Side::Designer, Role::Owner)), true)
            }
        };

        let claimed = sqlx::query(
            "UPDATE vendor_visits
             SET project_id = $2, claimed_by = $3, claimed_at = NOW()
             WHERE id = $1
               AND project_id IS NULL
               AND (expires_at IS NULL OR expires_at > NOW())",
        )
        .bind(visit.id)
        .bind(project_id)
        .bind(plan.claimer_id)
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            tx.rollback().await?;
            tracing::debug!(visit_id = visit.id, "Conditional claim matched no row");
            let current = VisitRepo::find_by_id(pool, visit.id)
                .await?
                .ok_or(CoreError::VisitNotFound)?;
            ensure_claimable(current.expires_at, current.project_id, Utc::now())?;
            return Err(CoreError::AlreadyClaimed.into());
        }

        if let Some((side, role)) = claimer_grant {
            ParticipantRepo::upsert(
                &mut *tx,
                project_id,
                Grantee::User(plan.claimer_id),
                side,
                role,
            )
            .await?;
        }
        ParticipantRepo::upsert(
            &mut *tx,
            project_id,
            Grantee::Org(visit.vendor_org_id),
            Side::Vendor,
            Role::Editor,
        )
        .await?;

        let package = VisitRepo::find_package_by_visit(&mut *tx, visit.id).await?;
        let mut selections_attached = 0;
        let mut source_project_id = None;
        let mut quote_attachment_id = None;

        if let Some(package) = package {
            source_project_id = package.source_project_id;

            let vendor_name: Option<(String,)> =
                sqlx::query_as("SELECT name FROM organizations WHERE id = $1")
                    .bind(visit.vendor_org_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            let vendor_name = vendor_name.map(|(name,)| name);
            let attribution = Attribution {
                vendor_rep_id: Some(visit.vendor_user_id),
                vendor_org_id: Some(visit.vendor_org_id),
            };

            let items = VisitRepo::list_materializable_items(&mut *tx, package.id).await?;
            for item in items {
                let selection = MaterializedSelection {
                    product_name: materialized_name(
                        item.catalog_name.as_deref(),
                        item.product_name.as_deref(),
                        item.description.as_deref(),
                    ),
                    description: item.description.or(item.catalog_description),
                    vendor_name: vendor_name.clone(),
                    finish: item.finish,
                    quantity: item.quantity,
                    note: item.note,
                    photo_url: item.image_url.or(item.catalog_image_url),
                };
                SelectionRepo::insert_materialized(
                    &mut *tx,
                    project_id,
                    visit.id,
                    &selection,
                    attribution,
                )
                .await?;
                selections_attached += 1;
            }

            if let Some(quote_id) = package.quote_attachment_id {
                if !QuoteRepo::attach_to_project(&mut *tx, quote_id, project_id).await? {
                    tx.rollback().await?;
                    return Err(CoreError::Conflict(format!(
                        "Quote {quote_id} is already attached to another project"
                    ))
                    .into());
                }
                quote_attachment_id = Some(quote_id);
            }
        }

        tx.commit().await?;

        Ok(ClaimOutcome {
            visit_id: visit.id,
            project_id,
            selections_attached,
            created_project,
            source_project_id,
            quote_attachment_id,
        })
    }
}
