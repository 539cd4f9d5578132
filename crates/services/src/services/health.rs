//! Liveness report including a round-trip to the store.

use serde::Serialize;
use tracing::error;
use ts_rs::TS;

use super::store::CrmBackend;

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
pub struct HealthReport {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub database: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub error: Option<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == "ok"
    }
}

pub async fn check_health<B>(backend: &B) -> HealthReport
where
    B: CrmBackend + ?Sized,
{
    match backend.ping().await {
        Ok(()) => HealthReport {
            status: "ok".to_string(),
            database: Some("connected".to_string()),
            message: "API and database are reachable".to_string(),
            error: None,
        },
        Err(e) => {
            error!(error = %e, "Health check failed");
            HealthReport {
                status: "error".to_string(),
                database: None,
                message: "Database connection failed".to_string(),
                error: Some(e.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::MemoryStore;

    #[tokio::test]
    async fn memory_store_is_always_connected() {
        let report = check_health(&MemoryStore::new()).await;
        assert!(report.is_healthy());

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["database"], "connected");
        assert!(value.get("error").is_none());
    }
}
