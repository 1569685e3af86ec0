use crate::infra::{build_engine, build_service, InMemoryEmployeeRepository};
use clap::Args;
use evalmate::config::AppConfig;
use evalmate::error::AppError;
use evalmate::workflows::employees::{
    derive_file, EmployeeRecord, EvaluationError, EvaluationReport,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DeriveArgs {
    /// CSV export of raw employee metrics
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Destination for the enriched CSV
    #[arg(long)]
    pub(crate) output: PathBuf,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print the raw JSON report instead of the formatted summary.
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_derive(args: DeriveArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let engine = build_engine(&config.scoring)?;
    let summary = derive_file(&engine.graph, &args.input, &args.output)?;

    println!(
        "Derived {} employee(s): {} input column(s) -> {} output column(s)",
        summary.rows, summary.columns_in, summary.columns_out
    );
    println!("Wrote {}", args.output.display());
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let engine = build_engine(&config.scoring)?;
    let repository = Arc::new(InMemoryEmployeeRepository::default());
    let service = build_service(&engine, repository, &config.scoring);

    println!("Employee evaluation demo");
    for record in demo_employees() {
        let employee_id = record.employee_id.clone();
        if let Err(err) = service.ingest(record) {
            println!("  Ingest rejected for {}: {}", employee_id, err);
            continue;
        }

        match service.evaluate(&employee_id) {
            Ok(report) if args.json => match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{}", json),
                Err(err) => println!("  Report unavailable: {}", err),
            },
            Ok(report) => render_report(&report),
            Err(EvaluationError::IncompleteRecord { field, .. }) => {
                println!("\n{}: details not filled (missing {})", employee_id, field)
            }
            Err(err) => println!("\n{}: evaluation unavailable: {}", employee_id, err),
        }
    }

    match service.roster(10) {
        Ok(roster) => {
            println!("\nRoster");
            for view in roster {
                println!(
                    "- {} [{}] {} field(s)",
                    view.employee_id, view.status, view.field_count
                );
            }
        }
        Err(err) => println!("\nRoster unavailable: {}", err),
    }

    Ok(())
}

fn render_report(report: &EvaluationReport) {
    let promotion = &report.promotion;
    println!(
        "\n{} ({})",
        promotion.employee_name.as_deref().unwrap_or("Unnamed"),
        promotion.employee_id
    );
    if let Some(role) = &promotion.role {
        println!(
            "  Role: {} | Department: {}",
            role,
            promotion.department.as_deref().unwrap_or("n/a")
        );
    }
    println!(
        "  Promotion: {} {:.1} ({}) - {}",
        promotion.icon, promotion.score, promotion.level, promotion.recommendation
    );
    for (label, value) in &promotion.kpi_scores {
        println!("    - {}: {:.2}", label, value);
    }

    let attrition = &report.attrition;
    println!(
        "  Attrition: {} {} - {}",
        attrition.icon, attrition.risk_level, attrition.recommendation
    );

    let anomaly = &report.anomaly;
    if anomaly.description.is_empty() {
        println!(
            "  Anomaly: {} {} (score {:.3})",
            anomaly.icon, anomaly.anomaly_status, anomaly.anomaly_score
        );
    } else {
        println!(
            "  Anomaly: {} {} (score {:.3}): {}",
            anomaly.icon, anomaly.anomaly_status, anomaly.anomaly_score, anomaly.description
        );
    }
    println!("  Feedback: {}", report.feedback_summary);
}

fn demo_employees() -> Vec<EmployeeRecord> {
    let mut developer = EmployeeRecord::new("EMP1001")
        .with_text("name", "Asha Rao")
        .with_text("department", "Engineering")
        .with_text("designation", "Software Developer")
        .with_number("tenure_in_current_role", 3.0)
        .with_number("score_delta", 1.0)
        .with_text("past_roles_held", "Intern, Junior Developer")
        .with_number("promotions_achieved", 1.0)
        .with_number("avg_hours_logged_vs_team", 3.0)
        .with_number("peer_complaints", 0.0)
        .with_text("hr_warnings", "No")
        .with_number("hackathon_participation", 1.0)
        .with_text("peer_reviews", "Great collaborator and very reliable.")
        .with_text("manager_comments", "Consistently delivers ahead of schedule.");
    for field in [
        "peer_review_rating",
        "manager_feedback",
        "conflict_resolution",
        "report_submission_punctuality",
        "meeting_participation_rate",
        "active_workdays",
        "task_completion_ratio",
        "adaptability_to_change",
        "initiative_in_projects",
        "cross_team_coordination",
        "policy_compliance",
        "ethics_confidentiality",
        "code_quality",
        "sprint_velocity",
        "deployment_frequency",
    ] {
        developer = developer.with_number(field, 4.0);
    }

    let mut analyst = EmployeeRecord::new("EMP1002")
        .with_text("name", "Ben Ortiz")
        .with_text("department", "Analytics")
        .with_text("designation", "Data Analyst")
        .with_number("tenure_in_current_role", 1.0)
        .with_number("score_delta", -0.5)
        .with_number("avg_hours_logged_vs_team", 5.0)
        .with_number("peer_complaints", 4.0)
        .with_text("hr_warnings", "Yes")
        .with_text("peer_reviews", "Often rude and unreliable in reviews.");
    for field in [
        "peer_review_rating",
        "manager_feedback",
        "meeting_participation_rate",
        "active_workdays",
        "task_completion_ratio",
    ] {
        analyst = analyst.with_number(field, 1.0);
    }

    let newcomer = EmployeeRecord::new("EMP1003")
        .with_text("name", "Chen Li")
        .with_text("designation", "QA Tester");

    vec![developer, analyst, newcomer]
}
