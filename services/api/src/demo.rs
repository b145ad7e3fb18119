use crate::infra::{as_of, InMemoryStores};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use clap::Args;
use std::collections::BTreeSet;
use std::path::PathBuf;
use trajectory_engine::config::AnalysisConfig;
use trajectory_engine::error::AppError;
use trajectory_engine::workflows::cycle_risk::{
    Certification, CycleRating, RiskAnalysisReport, RiskServiceError, RiskSummary,
};
use trajectory_engine::workflows::directory::{CompanyId, EmployeeId, EmployeeProfile};
use trajectory_engine::workflows::memory::InMemoryDirectory;
use trajectory_engine::workflows::trajectory::{
    NewSignal, SignalCsvImporter, SignalType, TrajectoryScore,
};

const DEMO_COMPANY: &str = "demo-co";
const DEMO_MANAGER: &str = "mgr-100";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date (YYYY-MM-DD). Defaults to now.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Skip the cycle-based risk portion of the demo.
    #[arg(long)]
    pub(crate) skip_risk: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Signal CSV export to score
    #[arg(long)]
    pub(crate) signals_csv: PathBuf,
    /// Evaluation date (YYYY-MM-DD). Defaults to now.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let now = as_of(args.as_of);
    let signals = SignalCsvImporter::from_path(&args.signals_csv)?;
    println!(
        "Scoring {} signals from {} as of {}",
        signals.len(),
        args.signals_csv.display(),
        now.format("%Y-%m-%d")
    );

    let outcome = score_signals(signals, now);
    for (signal, reason) in &outcome.rejected {
        println!(
            "  Skipped {} signal for {}: {}",
            signal.signal_type.label(),
            signal.employee_id,
            reason
        );
    }
    if outcome.scores.is_empty() {
        println!("No employees could be scored.");
        return Ok(());
    }
    for score in &outcome.scores {
        render_score(score);
    }
    Ok(())
}

#[derive(Debug, Default)]
struct ScoreOutcome {
    scores: Vec<TrajectoryScore>,
    rejected: Vec<(NewSignal, String)>,
}

/// Record every signal into a fresh store, then score each distinct employee once.
fn score_signals(signals: Vec<NewSignal>, now: DateTime<Utc>) -> ScoreOutcome {
    let stores = InMemoryStores::default();
    let service = stores.trajectory_service();
    let mut outcome = ScoreOutcome::default();
    let mut employees = BTreeSet::new();

    for signal in signals {
        let key = (signal.company_id.clone(), signal.employee_id.clone());
        match service.record_signal_at(signal.clone(), now) {
            Ok(_) => {
                employees.insert(key);
            }
            Err(err) => outcome.rejected.push((signal, err.to_string())),
        }
    }

    for (company_id, employee_id) in employees {
        match service.compute_trajectory_at(&company_id, &employee_id, now) {
            Ok(score) => outcome.scores.push(score),
            Err(err) => println!("  Scoring unavailable for {}: {}", employee_id, err),
        }
    }
    outcome
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let now = as_of(args.as_of);
    let company = CompanyId::from(DEMO_COMPANY);
    let manager = EmployeeId::from(DEMO_MANAGER);
    let stores = InMemoryStores::with_directory(demo_directory());

    println!(
        "Performance trajectory demo for {} as of {}",
        company,
        now.format("%Y-%m-%d")
    );

    let trajectories = stores.trajectory_service();
    for signal in demo_signals(now) {
        if let Err(err) = trajectories.record_signal_at(signal, now) {
            println!("  Signal rejected: {}", err);
        }
    }

    println!("\nTrajectories");
    for profile in demo_team() {
        match trajectories.compute_trajectory_at(&company, &profile.employee_id, now) {
            Ok(score) => render_score(&score),
            Err(err) => println!("  {} unavailable: {}", profile.full_name, err),
        }
    }

    println!("\nManager prompts for {}", manager);
    match trajectories.generate_intervention_prompts_at(&company, &manager, now) {
        Ok(report) => {
            if report.prompts.is_empty() {
                println!("  No direct report needs attention.");
            }
            for generated in report.prompts {
                println!(
                    "- [{:?}] {} (score {:.1}, {})",
                    generated.prompt.priority,
                    generated.prompt.title,
                    generated.trajectory_score,
                    generated.risk_level.label()
                );
                for action in &generated.prompt.suggested_actions {
                    println!("    * {}", action);
                }
            }
            for failure in report.failures {
                println!("- {}: prompt failed ({})", failure.employee_id, failure.error);
            }
        }
        Err(err) => println!("  Prompt generation unavailable: {}", err),
    }

    if args.skip_risk {
        return Ok(());
    }

    seed_history(&stores, &company, now.date_naive())?;
    let risks = stores.risk_service(AnalysisConfig::default());

    println!("\nCycle-based risk analysis");
    let report = risks.analyze_risk_at(&company, None, now).await?;
    render_report(&report);
    render_summary(&risks.risk_summary(&company)?);

    Ok(())
}

fn render_score(score: &TrajectoryScore) {
    let intervention = score
        .intervention_type
        .map(|kind| format!("{:?}", kind))
        .unwrap_or_else(|| "none".to_string());
    println!(
        "- {}: score {:.1} | {} risk | momentum {:?} | trend {:?} | intervention {}",
        score.employee_id,
        score.trajectory_score,
        score.risk_level.label(),
        score.momentum,
        score.trend_direction,
        intervention
    );
    if !score.minimum_signals_met {
        println!("    (fewer signals than the scoring minimum; treat with caution)");
    }
}

fn render_report(report: &RiskAnalysisReport) {
    for summary in &report.summaries {
        let types: Vec<&str> = summary.risk_types.iter().map(|risk| risk.label()).collect();
        let highest = summary
            .highest_risk_level
            .map(|level| level.label())
            .unwrap_or("none");
        println!(
            "- {}: {} active ({}) | highest {}",
            summary.employee_id,
            summary.risks_found,
            if types.is_empty() {
                "none".to_string()
            } else {
                types.join(", ")
            },
            highest
        );
    }
    for failure in &report.failures {
        println!("- {}: analysis failed ({})", failure.employee_id, failure.error);
    }
}

fn render_summary(summary: &RiskSummary) {
    println!(
        "\nActive risks: {} across {} employees",
        summary.total_active, summary.affected_employees
    );
    for (risk_type, count) in summary.by_type.iter().filter(|(_, count)| **count > 0) {
        println!("  - {}: {}", risk_type.label(), count);
    }
}

fn demo_team() -> Vec<EmployeeProfile> {
    [
        ("emp-101", "Ana Silva"),
        ("emp-102", "Ravi Patel"),
        ("emp-103", "Priya Nair"),
    ]
    .into_iter()
    .map(|(id, name)| EmployeeProfile {
        employee_id: EmployeeId::from(id),
        company_id: CompanyId::from(DEMO_COMPANY),
        full_name: name.to_string(),
        manager_id: Some(EmployeeId::from(DEMO_MANAGER)),
        active: true,
    })
    .collect()
}

fn demo_directory() -> InMemoryDirectory {
    let mut employees = demo_team();
    employees.push(EmployeeProfile {
        employee_id: EmployeeId::from(DEMO_MANAGER),
        company_id: CompanyId::from(DEMO_COMPANY),
        full_name: "Morgan Blake".to_string(),
        manager_id: None,
        active: true,
    });
    InMemoryDirectory::with_employees(employees)
}

fn demo_signal(
    employee: &str,
    signal_type: SignalType,
    value: f64,
    days_ago: i64,
    now: DateTime<Utc>,
) -> NewSignal {
    NewSignal {
        employee_id: EmployeeId::from(employee),
        company_id: CompanyId::from(DEMO_COMPANY),
        signal_type,
        signal_value: value,
        signal_sentiment: None,
        source_id: None,
        source_table: Some("demo".to_string()),
        signal_weight: None,
        captured_at: Some(now - Duration::days(days_ago)),
    }
}

fn demo_signals(now: DateTime<Utc>) -> Vec<NewSignal> {
    let mut signals = Vec::new();
    for (days_ago, goal, feedback) in [(3, 24.0, 30.0), (10, 35.0, 38.0), (40, 55.0, 60.0)] {
        signals.push(demo_signal("emp-101", SignalType::GoalProgress, goal, days_ago, now));
        signals.push(demo_signal("emp-101", SignalType::Feedback, feedback, days_ago, now));
    }
    for (days_ago, goal) in [(2, 92.0), (9, 88.0), (30, 80.0), (60, 72.0)] {
        signals.push(demo_signal("emp-102", SignalType::GoalProgress, goal, days_ago, now));
    }
    signals.push(demo_signal("emp-102", SignalType::Recognition, 95.0, 5, now));
    signals.push(demo_signal("emp-103", SignalType::CheckIn, 62.0, 14, now));
    signals.push(demo_signal("emp-103", SignalType::Training, 70.0, 45, now));
    signals
}

fn cycle(
    quarters_ago: i64,
    overall: f64,
    goal: f64,
    competency: f64,
    today: NaiveDate,
) -> CycleRating {
    CycleRating {
        cycle_id: format!("q-{quarters_ago}"),
        cycle_name: format!("Quarterly review -{quarters_ago}"),
        completed_on: today - Duration::days(91 * quarters_ago),
        overall,
        goal,
        competency,
        responsibility: competency,
    }
}

fn seed_history(
    stores: &InMemoryStores,
    company: &CompanyId,
    today: NaiveDate,
) -> Result<(), RiskServiceError> {
    let seeded = [
        (
            "emp-101",
            vec![
                cycle(1, 2.4, 2.5, 2.6, today),
                cycle(2, 2.8, 2.9, 2.8, today),
                cycle(3, 3.6, 3.5, 3.4, today),
                cycle(4, 4.2, 4.0, 3.9, today),
            ],
        ),
        (
            "emp-102",
            vec![
                cycle(1, 4.1, 4.8, 2.4, today),
                cycle(2, 4.0, 4.6, 2.6, today),
            ],
        ),
        ("emp-103", vec![cycle(1, 3.6, 3.5, 3.7, today)]),
    ];

    for (employee, cycles) in seeded {
        let employee = EmployeeId::from(employee);
        for rating in cycles {
            stores.history.record_cycle(company, &employee, rating)?;
        }
    }

    stores.history.record_certification(
        company,
        &EmployeeId::from("emp-103"),
        Certification {
            certification_id: "cert-sec-1".to_string(),
            name: "Security awareness".to_string(),
            expires_on: today + Duration::days(20),
            mandatory: true,
        },
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use trajectory_engine::workflows::trajectory::RiskLevel;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn score_signals_scores_each_employee_once() {
        let csv = "employee_id,company_id,signal_type,signal_value,captured_at\n\
emp-1,acme,goal_progress,20,2025-05-30T09:00:00Z\n\
emp-1,acme,feedback,25,2025-05-28T09:00:00Z\n\
emp-2,acme,recognition,90,2025-05-29T09:00:00Z\n";
        let signals = SignalCsvImporter::from_reader(csv.as_bytes()).expect("csv parses");

        let outcome = score_signals(signals, now());

        assert!(outcome.rejected.is_empty());
        assert_eq!(outcome.scores.len(), 2);
        assert_eq!(outcome.scores[0].employee_id, EmployeeId::from("emp-1"));
        assert_eq!(outcome.scores[0].risk_level, RiskLevel::Critical);
        assert_eq!(outcome.scores[1].risk_level, RiskLevel::Low);
    }

    #[test]
    fn score_signals_reports_rejected_rows() {
        let mut signal = demo_signal("emp-1", SignalType::Feedback, 50.0, 1, now());
        signal.signal_weight = Some(-1.0);

        let outcome = score_signals(vec![signal], now());

        assert!(outcome.scores.is_empty());
        assert_eq!(outcome.rejected.len(), 1);
        assert!(outcome.rejected[0].1.contains("signal_weight"));
    }

    #[tokio::test]
    async fn demo_runs_end_to_end() {
        let args = DemoArgs {
            as_of: NaiveDate::from_ymd_opt(2025, 6, 1),
            skip_risk: false,
        };
        run_demo(args).await.expect("demo completes");
    }
}
