use paramflow::handlers::*;
use paramflow_core::Paramalyzer;
use paramflow_tracker::DependencyGraph;
use std::io::Write;
use tempfile::NamedTempFile;

const CAPTURE: &str = r#"[
    {
        "method": "POST",
        "url": "https://app.example/login",
        "body": "password=secret1&remember=no"
    },
    {
        "method": "GET",
        "url": "https://app.example/account",
        "cookies": "token=secret1-derived"
    }
]"#;

fn write_capture(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_capture_valid_file() {
    let file = write_capture(CAPTURE);
    let traffic = load_capture(file.path().to_str().unwrap()).unwrap();
    let correlated = Paramalyzer::analyze(&traffic);
    assert_eq!(correlated.len(), 3);
}

#[test]
fn test_load_capture_missing_file() {
    let result = load_capture("/nonexistent/capture.json");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("Failed to load capture"));
}

#[test]
fn test_parse_threshold_valid() {
    assert_eq!(parse_threshold("0.5").unwrap(), 0.5);
    assert_eq!(parse_threshold("1.0").unwrap(), 1.0);
    assert_eq!(parse_threshold("0").unwrap(), 0.0);
}

#[test]
fn test_parse_threshold_rejects_garbage_and_out_of_range() {
    assert!(parse_threshold("high").is_err());
    assert!(parse_threshold("1.5").is_err());
    assert!(parse_threshold("-0.1").is_err());
}

#[test]
fn test_select_tracked_secrets_vs_all() {
    let file = write_capture(CAPTURE);
    let traffic = load_capture(file.path().to_str().unwrap()).unwrap();
    let correlated = Paramalyzer::analyze(&traffic);

    let secrets = select_tracked(&correlated, false);
    let all = select_tracked(&correlated, true);

    assert_eq!(all.len(), 3);
    assert_eq!(secrets.len(), 2, "password and token, not remember");
}

#[test]
fn test_render_edges_empty_graph() {
    let graph = DependencyGraph::new();
    assert!(render_edges(&graph).contains("no origin relationships"));
}
