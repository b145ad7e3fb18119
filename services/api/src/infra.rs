use chrono::{DateTime, NaiveDate, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use trajectory_engine::config::AnalysisConfig;
use trajectory_engine::workflows::cycle_risk::{
    DetectionConfig, PlaybookRecommendations, RiskAnalysisService,
};
use trajectory_engine::workflows::memory::{
    InMemoryDevelopmentPlans, InMemoryDirectory, InMemoryPerformanceHistory,
    InMemoryRiskRepository, InMemoryTrajectoryRepository,
};
use trajectory_engine::workflows::trajectory::{ScoringConfig, TrajectoryService};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type MemoryTrajectoryService = TrajectoryService<InMemoryTrajectoryRepository>;
pub(crate) type MemoryRiskService =
    RiskAnalysisService<InMemoryRiskRepository, InMemoryPerformanceHistory>;

/// In-memory stores shared by the server, demo and score commands.
#[derive(Clone, Default)]
pub(crate) struct InMemoryStores {
    pub(crate) directory: Arc<InMemoryDirectory>,
    pub(crate) signals: Arc<InMemoryTrajectoryRepository>,
    pub(crate) risks: Arc<InMemoryRiskRepository>,
    pub(crate) history: Arc<InMemoryPerformanceHistory>,
    pub(crate) plans: Arc<InMemoryDevelopmentPlans>,
}

impl InMemoryStores {
    pub(crate) fn with_directory(directory: InMemoryDirectory) -> Self {
        Self {
            directory: Arc::new(directory),
            ..Self::default()
        }
    }

    pub(crate) fn trajectory_service(&self) -> MemoryTrajectoryService {
        TrajectoryService::new(
            self.signals.clone(),
            self.directory.clone(),
            ScoringConfig::default(),
        )
    }

    pub(crate) fn risk_service(&self, analysis: AnalysisConfig) -> MemoryRiskService {
        RiskAnalysisService::new(
            self.risks.clone(),
            self.history.clone(),
            self.directory.clone(),
            self.plans.clone(),
            DetectionConfig::default(),
        )
        .with_recommendations(Arc::new(PlaybookRecommendations))
        .with_analysis_config(analysis)
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// End of the given day, or now when no date was supplied.
pub(crate) fn as_of(date: Option<NaiveDate>) -> DateTime<Utc> {
    date.and_then(|day| day.and_hms_opt(23, 59, 59))
        .map(|naive| naive.and_utc())
        .unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_iso_dates() {
        let date = parse_date(" 2025-03-14 ").expect("valid date");
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid"));
    }

    #[test]
    fn parse_date_rejects_other_formats() {
        let err = parse_date("14/03/2025").expect_err("rejected");
        assert!(err.contains("YYYY-MM-DD"));
    }

    #[test]
    fn as_of_uses_end_of_day() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid");
        assert_eq!(as_of(Some(date)).to_rfc3339(), "2025-03-14T23:59:59+00:00");
    }
}
