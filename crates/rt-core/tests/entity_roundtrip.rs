//! Serde roundtrip and JsonSchema validation tests for all entity types.

use std::collections::BTreeMap;

use chrono::Utc;
use rt_core::entities::*;
use rt_core::enums::*;
use rt_core::responses::*;
use schemars::schema_for;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            // Serde roundtrip
            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            // Schema validation
            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

fn sample_account() -> Account {
    Account {
        account_hash: "4829103746582910".into(),
        role: AccountRole::Analyst,
        is_active: true,
        created_at: Utc::now(),
        last_login_at: None,
    }
}

fn sample_content() -> ContentAnalysis {
    ContentAnalysis {
        id: "cia-3b9e0d21".into(),
        workspace_id: "ws-8f2a61c0".into(),
        url: Some("https://example.org/report".into()),
        title: Some("Port activity report".into()),
        content_text: "Vessels were observed leaving the harbor at night.".into(),
        summary: Some("Unusual night departures.".into()),
        entities: serde_json::json!({"people": [], "organizations": ["Harbor Authority"]}),
        claim_analysis: Some(
            r#"{"claims":[{"claim":"Vessels left at night","deception_analysis":{"risk_score":35}}]}"#
                .into(),
        ),
        is_saved: false,
        created_by: Some("4829103746582910".into()),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

roundtrip_and_validate!(account_roundtrip, Account, sample_account());

roundtrip_and_validate!(
    workspace_roundtrip,
    Workspace,
    Workspace {
        id: "ws-8f2a61c0".into(),
        name: "Maritime watch".into(),
        description: None,
        owner_hash: "4829103746582910".into(),
        is_public: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    workspace_member_roundtrip,
    WorkspaceMember,
    WorkspaceMember {
        workspace_id: "ws-8f2a61c0".into(),
        account_hash: "7301928374651029".into(),
        role: MemberRole::Editor,
        added_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    actor_roundtrip,
    Actor,
    Actor {
        id: "act-1d4c7e92".into(),
        workspace_id: "ws-8f2a61c0".into(),
        name: "Harbor Authority".into(),
        actor_type: ActorType::Organization,
        description: Some("Port operator".into()),
        deception_profile: Some(
            r#"{"mom":{"motive":3,"opportunity":4,"means":2},"pop":{"overall_risk_level":"medium"}}"#
                .into()
        ),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    source_roundtrip,
    Source,
    Source {
        id: "src-a0b1c2d3".into(),
        workspace_id: "ws-8f2a61c0".into(),
        name: "Dock worker".into(),
        source_type: SourceType::Human,
        description: None,
        moses_assessment: Some(r#"{"source_vulnerability":2,"manipulation_evidence":1}"#.into()),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    framework_session_roundtrip,
    FrameworkSession,
    FrameworkSession {
        id: "fw-5e6f7a8b".into(),
        workspace_id: "ws-8f2a61c0".into(),
        framework_type: FrameworkType::Swot,
        title: "Port expansion SWOT".into(),
        description: None,
        data: serde_json::json!({"strengths": ["deep water"], "weaknesses": []}),
        status: AnalysisStatus::InProgress,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    ach_analysis_roundtrip,
    AchAnalysis,
    AchAnalysis {
        id: "ach-9c8d7e6f".into(),
        workspace_id: "ws-8f2a61c0".into(),
        title: "Who closed the port?".into(),
        description: Some("Competing explanations for the closure".into()),
        scale_type: AchScaleType::Logarithmic,
        status: AnalysisStatus::Draft,
        hypotheses: vec![
            Hypothesis {
                id: "hyp-00000001".into(),
                text: "Labor strike".into(),
            },
            Hypothesis {
                id: "hyp-00000002".into(),
                text: "Security incident".into(),
            },
        ],
        evidence: vec![Evidence {
            id: "evd-00000001".into(),
            text: "Union issued a statement".into(),
            source: Some("Press release".into()),
            weight: Some(8),
            hypotheses_scores: BTreeMap::from([
                ("hyp-00000001".to_string(), AchScore::Supports),
                ("hyp-00000002".to_string(), AchScore::Contradicts),
            ]),
        }],
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    ach_summary_roundtrip,
    AchAnalysisSummary,
    AchAnalysisSummary {
        id: "ach-9c8d7e6f".into(),
        workspace_id: "ws-8f2a61c0".into(),
        title: "Who closed the port?".into(),
        scale_type: AchScaleType::Linear,
        status: AnalysisStatus::Completed,
        hypothesis_count: 2,
        evidence_count: 1,
        updated_at: Utc::now(),
    }
);

roundtrip_and_validate!(content_analysis_roundtrip, ContentAnalysis, sample_content());

roundtrip_and_validate!(
    claim_adjustment_roundtrip,
    ClaimAdjustment,
    ClaimAdjustment {
        id: "adj-11223344".into(),
        content_analysis_id: "cia-3b9e0d21".into(),
        claim_index: 0,
        original_risk_score: Some(35.0),
        adjusted_risk_score: 80.0,
        reason: Some("Contradicted by AIS data".into()),
        adjusted_by: "4829103746582910".into(),
        created_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    library_framework_roundtrip,
    LibraryFramework,
    LibraryFramework {
        id: "lib-aabbccdd".into(),
        framework_session_id: Some("fw-5e6f7a8b".into()),
        framework_type: FrameworkType::Cog,
        title: "Adversary COG template".into(),
        description: None,
        data: serde_json::json!({"center_of_gravity": "logistics"}),
        author_hash: "4829103746582910".into(),
        view_count: 12,
        fork_count: 3,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    feedback_roundtrip,
    Feedback,
    Feedback {
        id: "fbk-01020304".into(),
        account_hash: None,
        category: FeedbackCategory::Bug,
        message: "Matrix export drops the last column".into(),
        page: Some("/ach".into()),
        created_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    settings_roundtrip,
    AccountSettings,
    AccountSettings {
        account_hash: "4829103746582910".into(),
        settings: serde_json::json!({"theme": "dark", "language": "en"}),
        updated_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    activity_roundtrip,
    ActivityEntry,
    ActivityEntry {
        id: "log-deadbeef".into(),
        workspace_id: Some("ws-8f2a61c0".into()),
        account_hash: Some("4829103746582910".into()),
        entity_type: EntityType::AchAnalysis,
        entity_id: "ach-9c8d7e6f".into(),
        action: ActivityAction::StatusChanged,
        detail: Some(serde_json::json!({"from": "draft", "to": "in_progress"})),
        created_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    register_response_roundtrip,
    RegisterResponse,
    RegisterResponse::new("4829103746582910".into())
);

roundtrip_and_validate!(
    login_response_roundtrip,
    LoginResponse,
    LoginResponse {
        account: sample_account(),
        created: true,
    }
);

roundtrip_and_validate!(
    content_pipeline_response_roundtrip,
    ContentPipelineResponse,
    ContentPipelineResponse {
        analysis: sample_content(),
        actors_created: 2,
        actors_failed: 1,
    }
);

roundtrip_and_validate!(
    cleanup_response_roundtrip,
    CleanupResponse,
    CleanupResponse {
        deleted: 4,
        retention_days: 7,
    }
);

#[test]
fn framework_type_schema_lists_all_variants() {
    let schema = serde_json::to_value(schema_for!(FrameworkType)).unwrap();
    let text = schema.to_string();
    for ft in FrameworkType::ALL {
        assert!(text.contains(ft.as_str()), "missing {ft} in schema");
    }
}
