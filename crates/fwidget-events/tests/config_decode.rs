//! Host-supplied bus configuration.

use fwidget_events::EventBusConfig;
use pretty_assertions::assert_eq;

#[test]
fn missing_fields_take_defaults() {
    let cfg: EventBusConfig = serde_json::from_str("{}").expect("decode");
    assert_eq!(cfg, EventBusConfig::default());
    assert_eq!(cfg.poll_interval_ms, 40);
    assert_eq!(cfg.poll_retries, 500);
}

#[test]
fn kebab_case_fields() {
    let cfg: EventBusConfig = serde_json::from_str(
        r#"{"poll-interval-ms": 10, "poll-retries": 3, "platform": {"bubbling-focus-events": true}}"#,
    )
    .expect("decode");
    assert_eq!(cfg.poll_interval_ms, 10);
    assert_eq!(cfg.poll_retries, 3);
    assert!(cfg.platform.bubbling_focus_events);
}
