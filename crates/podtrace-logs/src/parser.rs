use podtrace_types::{KubeletEvent, truncate};
use serde_json::Value;

/// Width of the message preview written to the debug log
const PREVIEW_WIDTH: usize = 100;

/// Log parser for extracting kubelet events from raw log lines
pub struct LogParser;

impl LogParser {
    /// Parse a raw log line into a KubeletEvent.
    ///
    /// Returns `None` when the line carries no JSON object at all. A line whose
    /// JSON is malformed still yields an event, with every field zeroed. A
    /// field of the wrong type only zeroes that field, and a repeated key
    /// keeps its last value.
    pub fn parse(raw: &str) -> Option<KubeletEvent> {
        let payload = Self::strip_prefix(raw)?;

        let event = match serde_json::from_str::<Value>(payload) {
            Ok(value) => serde_json::from_value(value).unwrap_or_else(|err| {
                tracing::debug!(error = %err, "JSON payload is not an object, using empty event");
                KubeletEvent::default()
            }),
            Err(err) => {
                tracing::debug!(error = %err, "Malformed JSON payload, using empty event");
                KubeletEvent::default()
            }
        };

        tracing::debug!(
            pod = %event.pod,
            msg = %truncate(&event.message, PREVIEW_WIDTH),
            "Extracted event"
        );

        Some(event)
    }

    /// Skip timestamps, level tags and anything else before the first `{`
    fn strip_prefix(raw: &str) -> Option<&str> {
        raw.find('{').map(|start| &raw[start..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_prefix() {
        let line = r#"foo bar {"ts":100,"msg":"syncPod enter","pod":{"name":"nginx-abc123"},"caller":"kuberuntime/x.go:1"}"#;
        let event = LogParser::parse(line).unwrap();
        assert_eq!(event.timestamp, 100.0);
        assert_eq!(event.message, "syncPod enter");
        assert_eq!(event.pod_name(), "nginx-abc123");
        assert_eq!(event.origin, "kuberuntime/x.go:1");
    }

    #[test]
    fn test_parse_bare_json() {
        let line = r#"{"ts":1.5,"msg":"GenericPLEG: Relisting","caller":"pleg/generic.go:191"}"#;
        let event = LogParser::parse(line).unwrap();
        assert_eq!(event.timestamp, 1.5);
        assert!(event.pod_name().is_empty());
        assert!(event.related_pods.is_empty());
    }

    #[test]
    fn test_line_without_json_is_discarded() {
        assert!(LogParser::parse("-- Logs begin at Mon 2024-01-15 --").is_none());
        assert!(LogParser::parse("").is_none());
    }

    #[test]
    fn test_malformed_json_gives_empty_event() {
        let event = LogParser::parse(r#"I0115 {"ts":12,"msg":"#).unwrap();
        assert_eq!(event, KubeletEvent::default());
    }

    #[test]
    fn test_trailing_garbage_gives_empty_event() {
        let event = LogParser::parse(r#"{"ts":12,"msg":"hi"} trailing"#).unwrap();
        assert_eq!(event, KubeletEvent::default());
    }

    #[test]
    fn test_wrong_field_type_keeps_other_fields() {
        let event = LogParser::parse(r#"{"ts":"yesterday","msg":"hi"}"#).unwrap();
        assert_eq!(event.timestamp, 0.0);
        assert_eq!(event.message, "hi");
    }

    #[test]
    fn test_related_pods_as_objects_keeps_pod() {
        let line = r#"{"ts":1,"msg":"syncPod enter","pod":{"name":"nginx-1"},"pods":[{"name":"nginx-1","namespace":"default"}]}"#;
        let event = LogParser::parse(line).unwrap();
        assert_eq!(event.timestamp, 1.0);
        assert_eq!(event.message, "syncPod enter");
        assert_eq!(event.pod_name(), "nginx-1");
        assert!(event.related_pods.is_empty());
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let event = LogParser::parse(r#"{"ts":1,"msg":"first","msg":"second"}"#).unwrap();
        assert_eq!(event.timestamp, 1.0);
        assert_eq!(event.message, "second");
    }

    #[test]
    fn test_parse_multibyte_prefix_no_panic() {
        let line = r#"╭──╮ {"ts":3,"msg":"ok"}"#;
        let event = LogParser::parse(line).unwrap();
        assert_eq!(event.message, "ok");
    }
}
