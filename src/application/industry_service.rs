// Industry service - Use case for listing monitored industries
use crate::application::monitoring_api::MonitoringApi;
use crate::domain::compliance::{compliance_score, RiskLevel};
use crate::domain::industry::Industry;
use crate::domain::reading::LimitSet;
use crate::error::Result;
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct IndustryOverview {
    #[serde(flatten)]
    pub industry: Industry,
    pub short_name: String,
    pub risk: RiskLevel,
}

#[derive(Clone)]
pub struct IndustryService {
    api: Arc<dyn MonitoringApi>,
}

impl IndustryService {
    pub fn new(api: Arc<dyn MonitoringApi>) -> Self {
        Self { api }
    }

    /// Industries with their risk band. A missing backend score is filled in
    /// from the latest reading when one can be scored.
    pub async fn list_industries(&self) -> Result<Vec<IndustryOverview>> {
        let industries = self.api.list_industries().await?;
        let overviews = industries.into_iter().map(|mut industry| async move {
            if industry.compliance_score.is_none() {
                industry.compliance_score = self.local_score(&industry).await;
            }
            IndustryOverview {
                short_name: industry.short_name(),
                risk: RiskLevel::from_score(industry.compliance_score),
                industry,
            }
        });
        Ok(join_all(overviews).await)
    }

    async fn local_score(&self, industry: &Industry) -> Option<f64> {
        let reading = match self.api.live(industry.id).await {
            Ok(reading) => reading?,
            Err(e) => {
                tracing::warn!(industry_id = industry.id, error = %e, "failed to fetch live reading");
                return None;
            }
        };
        let limits = match &reading.limits {
            Some(limits) => limits.clone(),
            None => match self.api.safe_limits(&industry.industry_type).await {
                Ok(limits) => limits?,
                Err(e) => {
                    tracing::warn!(industry_type = %industry.industry_type, error = %e, "failed to fetch safe limits");
                    return None;
                }
            },
        };
        compliance_score(&reading, &limits)
    }

    pub async fn safe_limits(&self, industry_type: &str) -> Result<Option<LimitSet>> {
        self.api.safe_limits(industry_type).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::monitoring_api::fake::FakeApi;
    use crate::domain::pollutant::PollutantKind;
    use crate::domain::reading::Reading;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn industry(id: i64, score: Option<f64>) -> Industry {
        Industry {
            id,
            name: format!("Plant {id}"),
            industry_type: "steel".to_string(),
            location: None,
            contact_email: None,
            lat: None,
            lng: None,
            compliance_score: score,
            violations_count: 0,
            last_reading_at: None,
        }
    }

    #[tokio::test]
    async fn test_list_industries_attaches_risk() {
        let api = FakeApi {
            industries: vec![industry(1, Some(91.0)), industry(2, Some(40.2)), industry(3, None)],
            ..FakeApi::default()
        };
        let service = IndustryService::new(Arc::new(api));

        let risks: Vec<RiskLevel> = service
            .list_industries()
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.risk)
            .collect();
        assert_eq!(risks, vec![RiskLevel::Low, RiskLevel::High, RiskLevel::Unknown]);
    }

    #[tokio::test]
    async fn test_missing_score_is_computed_from_live_reading() {
        let ts = NaiveDate::from_ymd_opt(2025, 2, 11)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let mut live = HashMap::new();
        // 90/60 = 1.5, scored as (2 - 1.5) / 2 * 100 = 25
        live.insert(3, Reading::new(3, ts).with(PollutantKind::Pm25, 90.0));
        let mut limits = HashMap::new();
        limits.insert(
            "steel".to_string(),
            LimitSet::new("steel").with(PollutantKind::Pm25, 60.0),
        );
        let api = FakeApi {
            industries: vec![industry(1, Some(91.0)), industry(3, None)],
            live,
            limits,
            ..FakeApi::default()
        };
        let service = IndustryService::new(Arc::new(api));

        let overviews = service.list_industries().await.unwrap();
        assert_eq!(overviews[0].industry.compliance_score, Some(91.0));
        assert_eq!(overviews[1].industry.compliance_score, Some(25.0));
        assert_eq!(overviews[1].risk, RiskLevel::High);
        assert_eq!(overviews[1].short_name, "Plant 3");
    }
}
