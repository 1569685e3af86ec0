use std::sync::Arc;

use proptest::prelude::*;

use super::common::*;
use crate::workflows::employees::domain::{EmployeeRecord, RecordState};
use crate::workflows::employees::roles::{KpiDefinition, RoleKpiRegistry, RoleKpis};
use crate::workflows::employees::schema::{RawSchema, NUMERIC_FIELDS};
use crate::workflows::employees::scoring::{
    ConfigurationError, DerivationGraph, DerivedMetricSpec, FixedSentiment, MetricScale,
    WeightedAggregate, NEUTRAL_SCORE, STANDARD_PIPELINE,
};

fn position(order: &[&str], id: &str) -> usize {
    order
        .iter()
        .position(|step| *step == id)
        .unwrap_or_else(|| panic!("{id} missing from pipeline"))
}

#[test]
fn pipeline_order_respects_dependencies() {
    let order = graph().order();
    assert_eq!(order.len(), 29);
    assert_eq!(order.first(), Some(&"communication_effectiveness"));
    assert_eq!(order.last(), Some(&"role_specific_kpi_score"));

    let before = |a: &str, b: &str| assert!(position(&order, a) < position(&order, b), "{a} must precede {b}");
    before("communication_effectiveness", "responsiveness");
    before("responsiveness", "effort_engagement_score");
    before("meeting_participation", "effort_engagement_score");
    before("task_ownership", "leadership_score");
    before("leadership_score", "overall_weighted_score");
    before("historical_progress_score", "overall_weighted_score");
    before("overall_weighted_score", "burnout_risk");
    before("overall_weighted_score", "promotion_recommendation");
    before("burnout_risk", "stress_load_tolerance");
    before("burnout_risk", "retention_suggestion");
    before("code_commits", "bug_fix_count");
    before("regression_pass_rate", "defect_leakage_rate");
}

#[test]
fn steady_developer_derives_expected_scores() {
    let derived = graph().derive(&steady_developer());
    let value = |field: &str| {
        derived
            .get(field)
            .and_then(|value| value.as_number())
            .unwrap_or_else(|| panic!("{field} not derived"))
    };

    assert_eq!(value("communication_effectiveness"), 4.0);
    assert_eq!(value("effort_engagement_score"), 4.0);
    assert_eq!(value("integrity_feedback_score"), 4.0);
    assert_eq!(value("historical_progress_score"), 1.0);
    assert_eq!(value("task_ownership"), 5.0);
    assert_eq!(value("leadership_score"), 4.0);
    assert!((value("overall_weighted_score") - 3.55).abs() < 0.011);
    assert_eq!(value("burnout_risk"), 2.0);
    assert_eq!(value("stress_load_tolerance"), 4.0);
    assert_eq!(value("voluntary_contributions"), 2.0);
    assert_eq!(value("promotion_recommendation"), 1.0);
    assert_eq!(value("retention_suggestion"), 0.0);
    assert_eq!(value("adherence_to_deadlines"), NEUTRAL_SCORE);
    assert_eq!(value("code_commits"), 4.0);
    assert_eq!(value("bug_fix_count"), 4.0);
    assert_eq!(value("role_specific_kpi_score"), 4.0);
}

#[test]
fn empty_record_falls_back_to_neutral_scores() {
    let derived = graph().derive(&EmployeeRecord::new("EMP0404"));
    for id in [
        "communication_effectiveness",
        "responsiveness",
        "effort_engagement_score",
        "adaptability_growth_score",
        "integrity_feedback_score",
        "historical_progress_score",
        "leadership_score",
        "skill_development_score",
        "role_specific_kpi_score",
    ] {
        assert_eq!(
            derived.get(id).and_then(|value| value.as_number()),
            Some(NEUTRAL_SCORE),
            "{id}"
        );
    }
}

#[test]
fn role_kpis_are_absent_for_other_designations() {
    let graph = graph();

    let developer = graph.derive(&steady_developer());
    assert!(developer.contains_key("code_commits"));
    assert!(!developer.contains_key("regression_pass_rate"));
    assert!(!developer.contains_key("audit_readiness_score"));

    let accountant = graph.derive(
        &EmployeeRecord::new("EMP0300")
            .with_text("designation", "Accountant")
            .with_number("policy_compliance_x", 5.0),
    );
    assert_eq!(
        accountant
            .get("audit_readiness_score")
            .and_then(|value| value.as_number()),
        Some(5.0)
    );
    assert!(!accountant.contains_key("code_commits"));

    let unknown = graph.derive(&EmployeeRecord::new("EMP0301").with_text("designation", "Barista"));
    for kpi in graph.roles().roles().flat_map(|role| role.kpis.iter()) {
        if graph.is_derived(kpi.id) {
            assert!(!unknown.contains_key(kpi.id), "{} leaked", kpi.id);
        }
    }
    assert!(unknown.contains_key("role_specific_kpi_score"));
}

#[test]
fn derivation_is_idempotent_and_recomputes_engine_owned_values() {
    let graph = graph();
    let raw = steady_developer();

    let mut once = raw.clone();
    graph.compute_all(&mut once);
    let mut twice = once.clone();
    graph.compute_all(&mut twice);
    assert_eq!(once, twice);
    assert_eq!(once.state, RecordState::Evaluated);
    assert!(once.is_engine_written("burnout_risk"));
    assert!(once.is_engine_written("code_commits"));
    assert!(!once.is_engine_written("sprint_velocity"));

    let tampered = raw.clone().with_number("burnout_risk", 1.0);
    assert_eq!(graph.derive(&tampered), graph.derive(&raw));
}

#[test]
fn supplied_role_kpis_survive_repeated_runs() {
    let graph = graph();
    let mut record = EmployeeRecord::new("EMP0420")
        .with_text("designation", "QA Tester")
        .with_number("test_cases_executed", 1.0)
        .with_number("bugs_reported", 1.0)
        .with_number("regression_pass_rate", 5.0);

    graph.compute_all(&mut record);
    graph.compute_all(&mut record);

    assert_eq!(record.number("regression_pass_rate"), Some(5.0));
    assert!(!record.is_engine_written("regression_pass_rate"));
    assert!(record.is_engine_written("defect_leakage_rate"));
}

#[test]
fn supplied_developer_kpis_feed_the_role_score() {
    let derived = graph().derive(
        &EmployeeRecord::new("EMP0421")
            .with_text("designation", "Software Developer")
            .with_number("code_commits", 5.0)
            .with_number("bug_fix_count", 5.0),
    );
    let value = |field: &str| derived.get(field).and_then(|value| value.as_number());

    assert_eq!(value("code_commits"), Some(5.0));
    assert_eq!(value("bug_fix_count"), Some(5.0));
    assert_eq!(value("role_specific_kpi_score"), Some(5.0));
}

#[test]
fn bug_fix_count_reads_the_effective_commit_count() {
    let graph = graph();
    let base = EmployeeRecord::new("EMP0422")
        .with_text("designation", "Software Developer")
        .with_number("bugs_reported", 5.0)
        .with_number("sprint_velocity", 5.0);
    let bug_fix = |record: &EmployeeRecord| {
        graph
            .derive(record)
            .get("bug_fix_count")
            .and_then(|value| value.as_number())
    };

    // 0.4 * 5 + 0.3 * 1 + 0.3 * 5 = 3.8
    assert_eq!(bug_fix(&base.clone().with_number("code_commits", 1.0)), Some(4.0));
    // code_commits derives to 5 from sprint_velocity alone.
    assert_eq!(bug_fix(&base), Some(5.0));
}

#[test]
fn derive_leaves_the_input_untouched() {
    let raw = steady_developer();
    let snapshot = raw.clone();
    let _ = graph().derive(&raw);
    assert_eq!(raw, snapshot);
}

#[test]
fn batch_matches_sequential_derivation() {
    let graph = graph();
    let mut batch = vec![steady_developer(), struggling_analyst(), EmployeeRecord::new("EMP0003")];
    let expected: Vec<_> = batch
        .iter()
        .map(|record| {
            let mut copy = record.clone();
            graph.compute_all(&mut copy);
            copy
        })
        .collect();

    graph.compute_batch(&mut batch);
    assert_eq!(batch, expected);
}

#[test]
fn sentiment_feeds_burnout_and_retention() {
    let calm = graph_with(0.8).derive(&struggling_analyst());
    let hostile = graph_with(-0.8).derive(&struggling_analyst());

    let burnout = |fields: &crate::workflows::employees::domain::FieldMap| {
        fields.get("burnout_risk").and_then(|value| value.as_number())
    };
    // 0.4 * 5 + 0.3 * 5 + 0.3 * bucket
    assert_eq!(burnout(&calm), Some(4.0));
    assert_eq!(burnout(&hostile), Some(5.0));
    assert_eq!(
        hostile
            .get("retention_suggestion")
            .and_then(|value| value.as_number()),
        Some(1.0)
    );
}

fn build(steps: Vec<DerivedMetricSpec>) -> Result<DerivationGraph, ConfigurationError> {
    DerivationGraph::new(
        steps,
        RoleKpiRegistry::new(Vec::new()),
        &RawSchema::standard(),
        Arc::new(FixedSentiment(0.0)),
    )
}

#[test]
fn forward_references_are_rejected() {
    let error = build(vec![
        DerivedMetricSpec::weighted(
            "first_metric",
            WeightedAggregate::new(&[("second_metric", 1.0)]),
            MetricScale::Ordinal,
        ),
        DerivedMetricSpec::weighted(
            "second_metric",
            WeightedAggregate::new(&[("peer_review_rating", 1.0)]),
            MetricScale::Ordinal,
        ),
    ])
    .expect_err("forward reference");

    assert_eq!(
        error,
        ConfigurationError::ForwardReference {
            metric: "first_metric".to_string(),
            source_field: "second_metric".to_string(),
        }
    );
}

#[test]
fn self_reference_is_a_cycle() {
    let error = build(vec![DerivedMetricSpec::weighted(
        "looping_metric",
        WeightedAggregate::new(&[("looping_metric", 1.0)]),
        MetricScale::Ordinal,
    )])
    .expect_err("cycle");
    assert!(matches!(error, ConfigurationError::Cycle { .. }));
}

#[test]
fn unknown_sources_and_bad_weights_are_rejected() {
    let unknown = build(vec![DerivedMetricSpec::weighted(
        "typo_metric",
        WeightedAggregate::new(&[("peer_reveiw_rating", 1.0)]),
        MetricScale::Ordinal,
    )])
    .expect_err("unknown source");
    assert!(matches!(unknown, ConfigurationError::UnknownSource { .. }));

    let weight = build(vec![DerivedMetricSpec::weighted(
        "weightless_metric",
        WeightedAggregate::new(&[("peer_review_rating", 0.0)]),
        MetricScale::Ordinal,
    )])
    .expect_err("invalid weight");
    assert!(matches!(weight, ConfigurationError::InvalidWeight { .. }));
}

#[test]
fn duplicates_and_shadowed_raw_fields_are_rejected() {
    let spec = DerivedMetricSpec::weighted(
        "twice_metric",
        WeightedAggregate::new(&[("peer_review_rating", 1.0)]),
        MetricScale::Ordinal,
    );
    assert_eq!(
        build(vec![spec, spec]).expect_err("duplicate"),
        ConfigurationError::DuplicateMetric("twice_metric".to_string())
    );

    let shadow = DerivedMetricSpec::weighted(
        "peer_review_rating",
        WeightedAggregate::new(&[("manager_feedback", 1.0)]),
        MetricScale::Ordinal,
    );
    assert_eq!(
        build(vec![shadow]).expect_err("shadow"),
        ConfigurationError::ShadowsRawField("peer_review_rating".to_string())
    );
}

#[test]
fn registry_kpis_must_be_raw_or_derived() {
    let roles = RoleKpiRegistry::new(vec![RoleKpis {
        designation: "Astronaut",
        kpis: [
            KpiDefinition { id: "orbits_completed", label: "Orbits Completed" },
            KpiDefinition { id: "code_quality", label: "Code Quality" },
            KpiDefinition { id: "mttr", label: "MTTR" },
            KpiDefinition { id: "deadlines_met", label: "Deadlines Met" },
            KpiDefinition { id: "sprint_velocity", label: "Sprint Velocity" },
        ],
    }]);
    let error = DerivationGraph::new(
        STANDARD_PIPELINE.to_vec(),
        roles,
        &RawSchema::standard(),
        Arc::new(FixedSentiment(0.0)),
    )
    .expect_err("unknown kpi");

    assert_eq!(
        error,
        ConfigurationError::UnknownKpi {
            designation: "Astronaut".to_string(),
            kpi: "orbits_completed".to_string(),
        }
    );
}

fn designation() -> impl Strategy<Value = Option<&'static str>> {
    prop_oneof![
        Just(None),
        Just(Some("Software Developer")),
        Just(Some("QA Tester")),
        Just(Some("Accountant")),
        Just(Some("AI/ML Engineer")),
        Just(Some("Night Watch")),
    ]
}

proptest! {
    #[test]
    fn derived_scores_stay_in_range(
        values in proptest::collection::vec(
            prop_oneof![-1.0e9..1.0e9_f64, -10.0..10.0_f64, Just(0.0_f64)],
            NUMERIC_FIELDS.len(),
        ),
        role in designation(),
        polarity in -1.0..1.0_f64,
    ) {
        let mut record = EmployeeRecord::new("EMP-PROP");
        for (field, value) in NUMERIC_FIELDS.iter().zip(&values) {
            record = record.with_number(field, *value);
        }
        if let Some(role) = role {
            record = record.with_text("designation", role);
        }

        let derived = graph_with(polarity).derive(&record);
        for step in STANDARD_PIPELINE {
            let Some(value) = derived.get(step.id).and_then(|value| value.as_number()) else {
                continue;
            };
            match step.scale {
                MetricScale::Flag => prop_assert!(value == 0.0 || value == 1.0, "{} = {}", step.id, value),
                MetricScale::Ordinal => {
                    prop_assert!((1.0..=5.0).contains(&value), "{} = {}", step.id, value);
                    prop_assert_eq!(value.fract(), 0.0);
                }
                MetricScale::Continuous => {
                    prop_assert!((1.0..=5.0).contains(&value), "{} = {}", step.id, value)
                }
            }
        }
    }
}
