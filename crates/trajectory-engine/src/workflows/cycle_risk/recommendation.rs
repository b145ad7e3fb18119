use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::warn;

use super::domain::{RiskDetection, RiskType};
use crate::workflows::directory::EmployeeId;
use crate::workflows::trajectory::RiskLevel;

/// Context handed to a recommendation provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationRequest {
    pub employee_id: EmployeeId,
    pub risk_type: RiskType,
    pub risk_level: RiskLevel,
    pub risk_score: f64,
    pub risk_factors: Vec<String>,
}

impl RecommendationRequest {
    pub fn for_detection(employee_id: &EmployeeId, detection: &RiskDetection) -> Self {
        Self {
            employee_id: employee_id.clone(),
            risk_type: detection.risk_type,
            risk_level: detection.risk_level,
            risk_score: detection.risk_score,
            risk_factors: detection.risk_factors.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecommendationError {
    #[error("recommendation provider unavailable: {0}")]
    Unavailable(String),
}

/// Optional capability producing natural-language guidance for a risk.
#[async_trait]
pub trait RecommendationGenerator: Send + Sync {
    async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Option<String>, RecommendationError>;
}

/// Used where no provider is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRecommendations;

#[async_trait]
impl RecommendationGenerator for NoRecommendations {
    async fn recommend(
        &self,
        _request: &RecommendationRequest,
    ) -> Result<Option<String>, RecommendationError> {
        Ok(None)
    }
}

/// Fixed HR playbook text per risk type.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaybookRecommendations;

#[async_trait]
impl RecommendationGenerator for PlaybookRecommendations {
    async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Option<String>, RecommendationError> {
        let text = match request.risk_type {
            RiskType::ChronicUnderperformance => {
                "Agree a time-boxed improvement plan with explicit goals and fortnightly reviews."
            }
            RiskType::SkillsDecay => {
                "Book renewal training for the expiring certifications before they lapse."
            }
            RiskType::ToxicHighPerformer => {
                "Address collaboration and behavior expectations directly; pair results with 360 feedback."
            }
            RiskType::DecliningTrend => {
                "Hold a development conversation to uncover causes of the decline and reset goals."
            }
        };
        Ok(Some(text.to_string()))
    }
}

/// Call the generator within `timeout`, degrading every failure to `None`.
pub async fn best_effort_recommendation(
    generator: &dyn RecommendationGenerator,
    request: &RecommendationRequest,
    timeout: Duration,
) -> Option<String> {
    match tokio::time::timeout(timeout, generator.recommend(request)).await {
        Ok(Ok(text)) => text.filter(|value| !value.trim().is_empty()),
        Ok(Err(err)) => {
            warn!(
                employee_id = %request.employee_id,
                risk_type = request.risk_type.label(),
                error = %err,
                "recommendation generation failed"
            );
            None
        }
        Err(_) => {
            warn!(
                employee_id = %request.employee_id,
                risk_type = request.risk_type.label(),
                timeout_ms = timeout.as_millis() as u64,
                "recommendation generation timed out"
            );
            None
        }
    }
}
