//! Signal-driven trajectory scoring, classification and manager intervention prompts.

pub mod domain;
mod import;
pub mod intervention;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ContributingFactor, ExplainabilityRecord, InterventionType, Momentum, NewSignal, RiskLevel,
    Signal, SignalSentiment, SignalType, TrajectoryHistory, TrajectoryScore, TrendDirection,
};
pub use import::{SignalCsvImporter, SignalImportError};
pub use intervention::{
    GeneratedPrompt, InterventionPrompt, InterventionTemplate, PromptPriority, PromptType,
    TriggerSource,
};
pub use repository::{RepositoryError, TrajectoryRepository};
pub use router::{dispatch_trajectory_action, trajectory_router, TrajectoryAction};
pub use scoring::{ScoringConfig, TrajectoryAnalysis, TrajectoryEngine};
pub use service::{
    PromptFailure, PromptGenerationReport, TrajectoryService, TrajectoryServiceError,
    TRAJECTORY_HISTORY_LIMIT,
};
