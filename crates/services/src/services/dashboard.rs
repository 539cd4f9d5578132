//! Aggregate numbers for the dashboard landing page.

use db::models::{deal::StageCount, interaction::Interaction, lead::StatusCount};
use serde::Serialize;
use tracing::debug;
use ts_rs::TS;

use super::store::{CrmBackend, StoreError};

pub const RECENT_INTERACTIONS: i64 = 5;

#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub leads_by_status: Vec<StatusCount>,
    pub deals_by_stage: Vec<StageCount>,
    pub recent_interactions: Vec<Interaction>,
}

pub async fn dashboard_stats<B>(backend: &B) -> Result<DashboardStats, StoreError>
where
    B: CrmBackend + ?Sized,
{
    let leads_by_status = backend.lead_status_counts().await?;
    let deals_by_stage = backend.deal_stage_counts().await?;
    let recent_interactions = backend.recent_interactions(RECENT_INTERACTIONS).await?;
    debug!(
        statuses = leads_by_status.len(),
        stages = deals_by_stage.len(),
        "Dashboard stats collected"
    );

    Ok(DashboardStats {
        leads_by_status,
        deals_by_stage,
        recent_interactions,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use db::models::{
        interaction::CreateInteraction,
        lead::{CreateLead, Lead},
    };

    use super::*;
    use crate::services::store::{MemoryStore, Repository};

    #[tokio::test]
    async fn keeps_only_the_latest_interactions() {
        let store = MemoryStore::new();
        let lead = Repository::<Lead>::create(
            &store,
            CreateLead {
                name: "Katherine".to_string(),
                email: "kj@example.com".to_string(),
                phone: "555-0199".to_string(),
                status: "Reached Out".to_string(),
                client_domain: "Healthcare".to_string(),
                contact_platform: "LinkedIn".to_string(),
                location: "Oslo".to_string(),
                note: None,
                company_id: None,
                last_contact_date: None,
            },
        )
        .await
        .unwrap();

        let start = Utc::now() - Duration::days(30);
        for day in 0..7 {
            let touch = CreateInteraction {
                lead_id: lead.id,
                user_id: None,
                interaction_type: format!("call {day}"),
                notes: None,
                date: Some(start + Duration::days(day)),
            };
            Repository::<Interaction>::create(&store, touch).await.unwrap();
        }

        let stats = dashboard_stats(&store).await.unwrap();
        assert_eq!(stats.leads_by_status.len(), 1);
        assert_eq!(stats.leads_by_status[0].count, 1);
        assert!(stats.deals_by_stage.is_empty());
        let types: Vec<&str> = stats
            .recent_interactions
            .iter()
            .map(|i| i.interaction_type.as_str())
            .collect();
        assert_eq!(types, ["call 6", "call 5", "call 4", "call 3", "call 2"]);
    }

    #[test]
    fn serializes_camel_case_keys() {
        let stats = DashboardStats {
            leads_by_status: Vec::new(),
            deals_by_stage: Vec::new(),
            recent_interactions: Vec::new(),
        };
        let value = serde_json::to_value(&stats).unwrap();
        assert!(value.get("leadsByStatus").is_some());
        assert!(value.get("dealsByStage").is_some());
        assert!(value.get("recentInteractions").is_some());
    }
}
