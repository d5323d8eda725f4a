#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use crate::monitor::{summarize, UNKNOWN_HOST};
    use crate::projection::LifecycleStatus;
    use crate::types::JoinedRaffleRow;

    fn row(participants: serde_json::Value) -> JoinedRaffleRow {
        JoinedRaffleRow {
            id: 7,
            reddit_link: Some(
                "/r/PokemonRaffles/comments/abc123/nm_fast_charizard_vmax_37_spots_at_10ea/"
                    .to_string(),
            ),
            total_spots: 10,
            cost_per_spot: 10.0,
            participants,
            fast_raffle_enabled: false,
            username: Some("stored-name".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            actual_username: Some("current-name".to_string()),
        }
    }

    #[test]
    fn summary_carries_the_derived_view() {
        let summary = summarize(row(json!([
            { "redditUser": "ash", "spots": 3 },
            { "username": "misty", "spotsRequested": 6 },
        ])));

        assert_eq!(summary.title, "[NM] Fast Charizard Vmax 37 Spots At 10ea");
        assert_eq!(summary.item_name, "Charizard Vmax");
        assert!(summary.is_fast);
        assert_eq!(summary.filled_spots, 9);
        assert_eq!(summary.remaining_spots, 1);
        assert_eq!(summary.progress, 90);
        assert_eq!(summary.status, LifecycleStatus::AlmostFull);
        assert_eq!(summary.participants.len(), 2);
    }

    #[test]
    fn host_prefers_the_joined_username() {
        let summary = summarize(row(json!([])));
        assert_eq!(summary.host, "current-name");

        let mut no_join = row(json!([]));
        no_join.actual_username = None;
        assert_eq!(summarize(no_join).host, "stored-name");

        let mut anonymous = row(json!([]));
        anonymous.actual_username = None;
        anonymous.username = None;
        assert_eq!(summarize(anonymous).host, UNKNOWN_HOST);
    }

    #[test]
    fn unreadable_roster_projects_as_empty() {
        let summary = summarize(row(json!("definitely not a roster")));
        assert_eq!(summary.filled_spots, 0);
        assert_eq!(summary.remaining_spots, 10);
        assert_eq!(summary.progress, 0);
        assert_eq!(summary.status, LifecycleStatus::Starting);
        assert!(summary.participants.is_empty());
    }

    #[test]
    fn legacy_string_encoded_roster_still_counts() {
        let encoded = serde_json::Value::String(
            json!([{ "redditUser": "brock", "spots": 4 }]).to_string(),
        );
        let summary = summarize(row(encoded));
        assert_eq!(summary.filled_spots, 4);
        assert_eq!(summary.progress, 40);
        assert_eq!(summary.status, LifecycleStatus::Filling);
    }
}
