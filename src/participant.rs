use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// One claimed entry in a raffle roster.
///
/// Rosters written by older clients use `username`/`spotsRequested` instead of
/// `redditUser`/`spots`; both spellings are accepted here and resolved by the
/// canonical accessors, so nothing downstream branches on field names. Unknown
/// fields (comment ids, payment state, timestamps) ride along untouched.
#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, Default)]
pub struct Participant {
    #[serde(
        rename = "redditUser",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub reddit_user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spots: Option<i64>,
    #[serde(
        rename = "spotsRequested",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub spots_requested: Option<i64>,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: serde_json::Map<String, Value>,
}

impl Participant {
    /// The Reddit username that claimed the spots, trimmed. `redditUser`
    /// wins; a blank value counts as absent and falls through to the legacy
    /// `username` field.
    pub fn identity(&self) -> Option<&str> {
        non_blank(self.reddit_user.as_deref()).or_else(|| non_blank(self.username.as_deref()))
    }

    /// Case-folded identity used for dedup comparisons.
    pub fn folded_identity(&self) -> Option<String> {
        self.identity().map(str::to_lowercase)
    }

    /// Claimed spot count; `spots` wins over the legacy `spotsRequested`,
    /// missing means zero.
    pub fn spot_count(&self) -> i64 {
        self.spots.or(self.spots_requested).unwrap_or(0)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Decode a stored roster column. History rows written by older builds hold a
/// JSON-encoded string rather than a jsonb array; anything unreadable decodes
/// as an empty roster rather than failing the request.
pub fn roster_from_stored(stored: Option<Value>) -> Vec<Participant> {
    match stored {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(encoded)) => serde_json::from_str(&encoded).unwrap_or_default(),
        Some(value) => serde_json::from_value(value).unwrap_or_default(),
    }
}

/// Filter a freshly scanned batch down to participants not already on the
/// stored roster, preserving the batch's order. Identities are compared
/// case-insensitively after trimming; candidates without an identity are
/// dropped.
///
/// Duplicates within the batch itself are deliberately left alone -- dedup is
/// only against `existing`, matching how scans have always behaved.
pub fn filter_new_participants(
    existing: &[Participant],
    candidates: Vec<Participant>,
) -> Vec<Participant> {
    let known: HashSet<String> = existing
        .iter()
        .filter_map(Participant::folded_identity)
        .collect();

    candidates
        .into_iter()
        .filter(|candidate| match candidate.folded_identity() {
            Some(identity) => !known.contains(&identity),
            None => false,
        })
        .collect()
}
