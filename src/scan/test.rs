#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::scan::{scanner_args, ScanOutcome};

    #[test]
    fn args_keep_their_positions_when_fields_are_missing() {
        let args = scanner_args("/r/raffles/comments/abc/slug/", 5.0, None, &[], 0);
        assert_eq!(
            args,
            vec![
                "/r/raffles/comments/abc/slug/".to_string(),
                "5".to_string(),
                "null".to_string(),
                "[]".to_string(),
                "0".to_string(),
            ]
        );
    }

    #[test]
    fn args_encode_existing_comment_ids_as_json() {
        let ids = vec!["t1_abc".to_string(), "t1_def".to_string()];
        let args = scanner_args("/r/x/comments/id/slug/", 2.5, Some(40), &ids, 12);
        assert_eq!(args[1], "2.5");
        assert_eq!(args[2], "40");
        assert_eq!(args[3], "[\"t1_abc\",\"t1_def\"]");
        assert_eq!(args[4], "12");
    }

    #[test]
    fn scanner_output_round_trips_extra_fields() {
        let raw = json!({
            "ok": true,
            "participants": [{ "redditUser": "ash", "spots": 2 }],
            "commentsScanned": 57,
            "aiModel": "gpt-4o-mini"
        });

        let outcome: ScanOutcome = serde_json::from_value(raw).unwrap();
        assert!(outcome.ok);
        assert_eq!(outcome.participants.len(), 1);
        assert_eq!(outcome.extra["commentsScanned"], 57);

        let back = serde_json::to_value(&outcome).unwrap();
        assert_eq!(back["aiModel"], "gpt-4o-mini");
    }

    #[test]
    fn scanner_error_output_parses_without_participants() {
        let raw = json!({ "ok": false, "error": "thread is locked" });
        let outcome: ScanOutcome = serde_json::from_value(raw).unwrap();
        assert!(!outcome.ok);
        assert!(outcome.participants.is_empty());
        assert_eq!(outcome.error.as_deref(), Some("thread is locked"));
    }
}
