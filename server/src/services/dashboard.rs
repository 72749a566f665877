//! Dashboard aggregates for the CRM landing view.

use serde::Serialize;
use sqlx::PgPool;

use super::opportunity::OpportunityStage;
use super::submission::{self, FormSubmission, SubmissionFilter};

const RECENT_SUBMISSIONS: i64 = 5;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_contacts: i64,
    pub new_contacts_this_month: i64,
    pub open_opportunities: i64,
    pub pipeline_value: f64,
    pub won_value: f64,
    pub total_submissions: i64,
    pub new_submissions: i64,
    pub recent_submissions: Vec<FormSubmission>,
}

/// Collect headline counts and the latest submissions.
///
/// # Errors
///
/// Returns a database error if any query fails.
pub async fn dashboard_stats(pool: &PgPool) -> Result<DashboardStats, sqlx::Error> {
    let (total_contacts, new_contacts_this_month) = sqlx::query_as::<_, (i64, i64)>(
        "SELECT COUNT(*),
                COUNT(*) FILTER (WHERE created_at >= date_trunc('month', now()))
         FROM contacts",
    )
    .fetch_one(pool)
    .await?;

    let closed: Vec<&str> =
        OpportunityStage::ALL.into_iter().filter(|s| !s.is_open()).map(OpportunityStage::as_str).collect();
    let (open_opportunities, pipeline_value, won_value) = sqlx::query_as::<_, (i64, f64, f64)>(
        "SELECT COUNT(*) FILTER (WHERE stage <> ALL($1)),
                COALESCE(SUM(value) FILTER (WHERE stage <> ALL($1)), 0)::float8,
                COALESCE(SUM(value) FILTER (WHERE stage = $2), 0)::float8
         FROM opportunities",
    )
    .bind(&closed)
    .bind(OpportunityStage::Won.as_str())
    .fetch_one(pool)
    .await?;

    let (total_submissions, new_submissions) = sqlx::query_as::<_, (i64, i64)>(
        "SELECT COUNT(*), COUNT(*) FILTER (WHERE status = 'new') FROM form_submissions",
    )
    .fetch_one(pool)
    .await?;

    let recent_submissions =
        submission::list_submissions(pool, &SubmissionFilter::new(None, None, Some(RECENT_SUBMISSIONS)))
            .await?;

    Ok(DashboardStats {
        total_contacts,
        new_contacts_this_month,
        open_opportunities,
        pipeline_value,
        won_value,
        total_submissions,
        new_submissions,
        recent_submissions,
    })
}

#[cfg(all(test, feature = "live-db-tests"))]
mod tests {
    use super::*;
    use crate::services::contact::{self, ContactInput};
    use crate::state::test_helpers;

    #[tokio::test]
    async fn stats_count_new_contacts() {
        let pool = test_helpers::live_pool().await;
        let before = dashboard_stats(&pool).await.unwrap();

        let input = ContactInput {
            first_name: "Dash".into(),
            email: test_helpers::unique_email("dashboard"),
            ..ContactInput::default()
        };
        let new_contact = contact::validate_new_contact(&input).unwrap();
        contact::create_contact(&pool, &new_contact).await.unwrap();

        let after = dashboard_stats(&pool).await.unwrap();
        assert!(after.total_contacts > before.total_contacts);
        assert!(after.new_contacts_this_month >= 1);
        assert!(after.recent_submissions.len() <= 5);
        assert!(after.pipeline_value >= 0.0);
    }
}
