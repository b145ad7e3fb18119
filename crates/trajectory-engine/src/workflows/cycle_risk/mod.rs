//! Cycle-based risk detection over completed appraisal cycles and certifications, with
//! reconciliation into persistent risk records.

pub mod detectors;
pub mod domain;
pub mod reconciler;
pub mod recommendation;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use detectors::{
    chronic_underperformance, declining_trend, detect_all, skills_decay, toxic_high_performer,
    DetectionConfig, DetectionReport,
};
pub use domain::{
    Certification, CycleRating, CycleTrend, ExpiringCertification, InterventionRecord,
    PerformanceRisk, RiskDetection, RiskEvidence, RiskInterventionKind, RiskType,
    SuccessionImpact, TrendHistoryEntry,
};
pub use reconciler::{reconcile, ReconcileOutcome, AUTO_RESOLUTION_NOTE};
pub use recommendation::{
    best_effort_recommendation, NoRecommendations, PlaybookRecommendations, RecommendationError,
    RecommendationGenerator, RecommendationRequest,
};
pub use repository::{
    DevelopmentPlanGateway, PerformanceHistory, RepositoryError, RiskRepository, RiskUpsert,
};
pub use router::{dispatch_risk_action, risk_router, RiskAction};
pub use service::{
    EmployeeAnalysisFailure, EmployeeRiskSummary, RiskAnalysisReport, RiskAnalysisService,
    RiskServiceError, RiskSummary,
};
