// End-to-end: capture -> correlation -> origin detection -> graph

use paramflow_core::{CapturedTraffic, Paramalyzer, ParamType};
use paramflow_tracker::{DetectorConfig, OriginDetector, TrackedParameter};

const CAPTURE: &str = r#"[
    {
        "method": "POST",
        "url": "https://app.example/login",
        "body": "password=secret1"
    },
    {
        "method": "GET",
        "url": "https://app.example/account",
        "cookies": "token=secret1-derived"
    }
]"#;

#[tokio::test]
async fn test_password_to_token_scenario() {
    let traffic = CapturedTraffic::from_json(CAPTURE).unwrap();
    let correlated = Paramalyzer::analyze(&traffic);
    assert_eq!(correlated.len(), 2);

    for param in correlated.values() {
        let stats = param.stats();
        assert_eq!(stats.request_count, 1);
        assert_eq!(stats.unique_value_count, 1);
    }

    let vertices: Vec<TrackedParameter> = Paramalyzer::param_secrets(&correlated)
        .into_iter()
        .map(|p| TrackedParameter::new(p.clone()))
        .collect();
    assert_eq!(vertices.len(), 2, "both params look sensitive by name");

    let outcome = OriginDetector::new(DetectorConfig::default())
        .spawn(vertices)
        .wait()
        .await
        .unwrap();

    let graph = outcome.into_graph();
    assert_eq!(graph.vertex_count(), 2);
    assert_eq!(graph.edge_count(), 1);

    let edges = graph.edges();
    let (origin, _, dependent) = edges[0];
    assert_eq!(origin.name(), "password");
    assert_eq!(origin.param().param_type(), ParamType::Body);
    assert_eq!(dependent.name(), "token");
    assert_eq!(dependent.param().param_type(), ParamType::Cookie);
}

#[tokio::test]
async fn test_graph_requests_layout_after_assembly() {
    let traffic = CapturedTraffic::from_json(CAPTURE).unwrap();
    let correlated = Paramalyzer::analyze(&traffic);
    let vertices: Vec<TrackedParameter> = correlated
        .values()
        .map(|p| TrackedParameter::new(p.clone()))
        .collect();

    let outcome = OriginDetector::new(DetectorConfig::default())
        .spawn(vertices)
        .wait()
        .await
        .unwrap();
    let mut graph = outcome.into_graph();
    assert!(graph.take_layout_request());
    assert!(!graph.take_layout_request());
}
