use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::domain::{InterventionType, RiskLevel, TrajectoryScore};
use crate::workflows::directory::{CompanyId, EmployeeId, EmployeeProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptType {
    Concern,
    Coaching,
    Recognition,
    CheckIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptPriority {
    Urgent,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerSource {
    TrajectoryAnalysis,
}

/// Manager-facing suggestion created from a direct report's trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterventionPrompt {
    pub id: Uuid,
    pub company_id: CompanyId,
    pub manager_id: EmployeeId,
    pub employee_id: EmployeeId,
    pub prompt_type: PromptType,
    pub title: String,
    pub message: String,
    pub suggested_actions: Vec<String>,
    pub priority: PromptPriority,
    pub trigger_source: TriggerSource,
    pub created_at: DateTime<Utc>,
}

/// Stored prompt enriched for immediate display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedPrompt {
    pub prompt: InterventionPrompt,
    pub employee_name: String,
    pub trajectory_score: f64,
    pub risk_level: RiskLevel,
}

/// Fixed copy for one intervention type. `{name}` is replaced with the employee's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterventionTemplate {
    pub prompt_type: PromptType,
    pub priority: PromptPriority,
    pub title: &'static str,
    pub message: &'static str,
    pub suggested_actions: &'static [&'static str],
}

impl InterventionTemplate {
    pub fn for_type(intervention: InterventionType) -> Self {
        match intervention {
            InterventionType::Pip => Self {
                prompt_type: PromptType::Concern,
                priority: PromptPriority::Urgent,
                title: "Performance concern: {name}",
                message: "{name}'s performance trajectory has reached a critical level. A structured performance improvement plan with clear milestones is recommended.",
                suggested_actions: &[
                    "Schedule a private conversation this week",
                    "Draft a performance improvement plan with measurable goals",
                    "Agree on weekly progress reviews",
                    "Loop in HR for guidance",
                ],
            },
            InterventionType::Support => Self {
                prompt_type: PromptType::Concern,
                priority: PromptPriority::High,
                title: "{name} may need additional support",
                message: "{name}'s recent signals point to a high-risk trajectory. Check for blockers, workload issues or resourcing gaps before they compound.",
                suggested_actions: &[
                    "Hold a one-on-one focused on blockers",
                    "Review current workload and priorities",
                    "Offer mentoring or training resources",
                ],
            },
            InterventionType::Coaching => Self {
                prompt_type: PromptType::Coaching,
                priority: PromptPriority::Medium,
                title: "Coaching opportunity for {name}",
                message: "{name}'s trajectory is trending downward. A coaching conversation now can reverse the trend early.",
                suggested_actions: &[
                    "Set up a coaching session",
                    "Revisit goals and expectations together",
                    "Give specific, timely feedback",
                ],
            },
            InterventionType::Recognition => Self {
                prompt_type: PromptType::Recognition,
                priority: PromptPriority::Medium,
                title: "Recognize {name}'s progress",
                message: "{name} is on a strong, improving trajectory. Acknowledging it reinforces the momentum.",
                suggested_actions: &[
                    "Send public recognition",
                    "Discuss stretch assignments or growth paths",
                    "Nominate for an award or spotlight",
                ],
            },
            InterventionType::CheckIn => Self {
                prompt_type: PromptType::CheckIn,
                priority: PromptPriority::Low,
                title: "Check in with {name}",
                message: "A routine check-in with {name} keeps the trajectory data fresh and expectations aligned.",
                suggested_actions: &[
                    "Schedule a regular one-on-one",
                    "Ask about current priorities and support needs",
                ],
            },
        }
    }

    pub fn render(
        &self,
        manager_id: &EmployeeId,
        employee: &EmployeeProfile,
        created_at: DateTime<Utc>,
    ) -> InterventionPrompt {
        InterventionPrompt {
            id: Uuid::new_v4(),
            company_id: employee.company_id.clone(),
            manager_id: manager_id.clone(),
            employee_id: employee.employee_id.clone(),
            prompt_type: self.prompt_type,
            title: self.title.replace("{name}", &employee.full_name),
            message: self.message.replace("{name}", &employee.full_name),
            suggested_actions: self
                .suggested_actions
                .iter()
                .map(|action| action.to_string())
                .collect(),
            priority: self.priority,
            trigger_source: TriggerSource::TrajectoryAnalysis,
            created_at,
        }
    }
}

/// Prompt for `employee` when the trajectory recommends an intervention.
pub fn prompt_for(
    manager_id: &EmployeeId,
    employee: &EmployeeProfile,
    trajectory: &TrajectoryScore,
    created_at: DateTime<Utc>,
) -> Option<InterventionPrompt> {
    if !trajectory.intervention_recommended {
        return None;
    }
    let intervention = trajectory
        .intervention_type
        .unwrap_or(InterventionType::CheckIn);
    Some(InterventionTemplate::for_type(intervention).render(manager_id, employee, created_at))
}
