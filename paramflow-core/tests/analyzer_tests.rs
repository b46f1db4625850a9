// Tests for traffic parsing and the correlation pass

use paramflow_core::{CapturedTraffic, Paramalyzer, ParamKey, ParamType, TrafficSource};

const CAPTURE: &str = r#"[
    {
        "method": "POST",
        "url": "https://app.example/login",
        "body": "user=alice&password=hunter2secret",
        "response_body": "<html>Welcome alice</html>"
    },
    {
        "method": "GET",
        "url": "https://app.example/home?tab=inbox",
        "cookies": "sid=q8Zx2PvKm9Rt4Wl7Yn3Bd6; theme=dark",
        "response_body": "<html>inbox</html>"
    },
    {
        "method": "GET",
        "url": "https://app.example/home?tab=archive",
        "cookies": "sid=q8Zx2PvKm9Rt4Wl7Yn3Bd6; theme=dark"
    }
]"#;

#[test]
fn test_capture_parsing_extracts_all_param_types() {
    let traffic = CapturedTraffic::from_json(CAPTURE).unwrap();
    assert_eq!(traffic.record_count(), 3);

    let mut names = Vec::new();
    traffic.for_each_record(&mut |record| {
        for inst in &record.instances {
            names.push((inst.name.clone(), inst.param_type));
        }
    });

    assert!(names.contains(&("user".to_string(), ParamType::Body)));
    assert!(names.contains(&("password".to_string(), ParamType::Body)));
    assert!(names.contains(&("tab".to_string(), ParamType::Url)));
    assert!(names.contains(&("sid".to_string(), ParamType::Cookie)));
    assert!(names.contains(&("theme".to_string(), ParamType::Cookie)));
}

#[test]
fn test_analyze_groups_by_name_and_type() {
    let traffic = CapturedTraffic::from_json(CAPTURE).unwrap();
    let correlated = Paramalyzer::analyze(&traffic);

    // user, password, tab, sid, theme
    assert_eq!(correlated.len(), 5);

    let tab = &correlated[&ParamKey::new("tab", ParamType::Url)];
    assert_eq!(tab.instances(true).len(), 2);
    assert_eq!(tab.instances(false).len(), 2);
    assert_eq!(tab.unique_urls().len(), 1, "query is stripped from source URL");

    let sid = &correlated[&ParamKey::new("sid", ParamType::Cookie)];
    assert_eq!(sid.instances(true).len(), 2);
    assert_eq!(sid.instances(false).len(), 1);
}

#[test]
fn test_analyze_is_repeatable() {
    let traffic = CapturedTraffic::from_json(CAPTURE).unwrap();
    let first = Paramalyzer::analyze(&traffic);
    let second = Paramalyzer::analyze(&traffic);
    assert_eq!(first.len(), second.len());
    for (key, param) in &first {
        assert_eq!(param.len(), second[key].len());
    }
}

#[test]
fn test_reflection_flag_from_response_body() {
    let traffic = CapturedTraffic::from_json(CAPTURE).unwrap();
    let correlated = Paramalyzer::analyze(&traffic);

    let user = &correlated[&ParamKey::new("user", ParamType::Body)];
    assert_eq!(user.reflected_count(), 1);

    let password = &correlated[&ParamKey::new("password", ParamType::Body)];
    assert_eq!(password.reflected_count(), 0);
}

#[test]
fn test_capture_loads_from_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("capture.json");
    std::fs::write(&path, CAPTURE).unwrap();

    let traffic = CapturedTraffic::from_path(&path).unwrap();
    assert_eq!(traffic.record_count(), 3);
}

#[test]
fn test_empty_traffic_yields_empty_map() {
    let traffic = CapturedTraffic::from_json("[]").unwrap();
    let correlated = Paramalyzer::analyze(&traffic);
    assert!(correlated.is_empty());
}

#[test]
fn test_malformed_entries_are_skipped_not_fatal() {
    let capture = r#"[
        {"url": "https://app.example/?a=1"},
        {"not_a_record": true},
        {"url": "::not a url::"},
        {"url": "https://app.example/?b=2"}
    ]"#;
    let traffic = CapturedTraffic::from_json(capture).unwrap();
    assert_eq!(traffic.record_count(), 2);
}

#[test]
fn test_form_values_are_percent_decoded() {
    let capture = r#"[
        {"method": "POST", "url": "https://app.example/s", "body": "q=hello+world%21"}
    ]"#;
    let traffic = CapturedTraffic::from_json(capture).unwrap();
    let correlated = Paramalyzer::analyze(&traffic);
    let q = &correlated[&ParamKey::new("q", ParamType::Body)];
    let sample = q.sample().unwrap();
    assert_eq!(sample.raw_value, "hello+world%21");
    assert_eq!(sample.decoded_value, "hello world!");
}

#[test]
fn test_json_body_parameters() {
    let capture = r#"[
        {"method": "POST", "url": "https://app.example/api", "body": "{\"account\": \"alice\", \"limit\": 50}"}
    ]"#;
    let traffic = CapturedTraffic::from_json(capture).unwrap();
    let correlated = Paramalyzer::analyze(&traffic);
    assert!(correlated.contains_key(&ParamKey::new("account", ParamType::Body)));
    let limit = &correlated[&ParamKey::new("limit", ParamType::Body)];
    assert_eq!(limit.sample().unwrap().decoded_value, "50");
}

// ============================================================================
// Secrets heuristic
// ============================================================================

#[test]
fn test_param_secrets_matches_sensitive_names_and_entropy() {
    let traffic = CapturedTraffic::from_json(CAPTURE).unwrap();
    let correlated = Paramalyzer::analyze(&traffic);
    let secrets = Paramalyzer::param_secrets(&correlated);
    let names: Vec<&str> = secrets.iter().map(|p| p.name()).collect();

    // "password" and "sid" by name; "sid" also by entropy.
    assert!(names.contains(&"password"));
    assert!(names.contains(&"sid"));
    assert!(!names.contains(&"theme"));
    assert!(!names.contains(&"tab"));
}
