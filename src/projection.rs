use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::participant::Participant;

pub const UNKNOWN_RAFFLE: &str = "Unknown Raffle";
pub const UNKNOWN_ITEM: &str = "Unknown Item";

/// Condition-grading shorthand sellers put in thread titles.
static CONDITION_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(nm|bnib|nib|lnib|mint|used)\b").unwrap());
static FAST_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bfast\b").unwrap());
/// Trailing spot-count clause, e.g. "37 Spots At 10ea" or "- 20 spots @ $5".
static SPOT_CLAUSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*-?\s*\d+\s*spots?\s*(at|@).*$").unwrap());
static TRAILING_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+\d+$").unwrap());
static FAST_BADGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s*-?\s*\bfast\b\s*").unwrap());
static BRACKET_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[A-Z]+\]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// How far along an active raffle is, bucketed for the monitor UI.
#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LifecycleStatus {
    Starting,
    Filling,
    AlmostFull,
}

/// Display fields derived from a raffle's source link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TitleInfo {
    pub title: String,
    pub item_name: String,
    pub is_fast: bool,
}

/// The denormalized view of one raffle, computed per request and never
/// persisted.
#[derive(Serialize, ToSchema, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RaffleView {
    pub title: String,
    pub item_name: String,
    pub total_spots: i64,
    pub filled_spots: i64,
    pub remaining_spots: i64,
    pub cost_per_spot: f64,
    pub progress: i64,
    pub status: LifecycleStatus,
    pub is_fast: bool,
}

/// Compute the full monitor view for one raffle. Total; malformed input
/// degrades to placeholder strings and zeroes.
pub fn project(
    source_link: Option<&str>,
    total_spots: i32,
    cost_per_spot: f64,
    fast_mode_enabled: bool,
    roster: &[Participant],
) -> RaffleView {
    let filled = filled_spots(roster);
    let total = i64::from(total_spots);
    let progress = progress_percent(filled, total);
    let info = derive_title(source_link.unwrap_or(""));

    RaffleView {
        title: info.title,
        item_name: info.item_name,
        total_spots: total,
        filled_spots: filled,
        remaining_spots: total - filled,
        cost_per_spot,
        progress,
        status: lifecycle_status(progress),
        is_fast: info.is_fast || fast_mode_enabled,
    }
}

pub fn filled_spots(roster: &[Participant]) -> i64 {
    roster.iter().map(Participant::spot_count).sum()
}

/// Percent filled, rounded half away from zero. A raffle with unknown
/// capacity (`total <= 0`) reports 0 regardless of fill.
pub fn progress_percent(filled: i64, total: i64) -> i64 {
    if total > 0 {
        ((filled as f64 / total as f64) * 100.0).round() as i64
    } else {
        0
    }
}

/// Thresholds are inclusive: 30% is already `filling`, 90% `almost-full`.
pub fn lifecycle_status(progress: i64) -> LifecycleStatus {
    if progress >= 90 {
        LifecycleStatus::AlmostFull
    } else if progress >= 30 {
        LifecycleStatus::Filling
    } else {
        LifecycleStatus::Starting
    }
}

/// Best-effort title, item name and fast flag from a Reddit thread link of
/// the form `.../comments/<id>/<slug>/`. A missing link yields placeholders;
/// a link without a recognizable slug becomes the title verbatim.
pub fn derive_title(source_link: &str) -> TitleInfo {
    if source_link.trim().is_empty() {
        return TitleInfo {
            title: UNKNOWN_RAFFLE.to_string(),
            item_name: UNKNOWN_ITEM.to_string(),
            is_fast: false,
        };
    }

    let Some(slug) = slug_from_link(source_link) else {
        return TitleInfo {
            title: source_link.to_string(),
            item_name: UNKNOWN_ITEM.to_string(),
            is_fast: false,
        };
    };

    let spaced = slug.replace(['_', '-'], " ");
    let cased = title_case(spaced.trim());
    let title = CONDITION_TAG
        .replace_all(&cased, |caps: &Captures| {
            format!("[{}]", caps[1].to_uppercase())
        })
        .into_owned();
    let is_fast = FAST_WORD.is_match(&title);
    let item_name = clean_item_name(&title);

    TitleInfo {
        title,
        item_name,
        is_fast,
    }
}

/// The slug is the segment two past the literal `comments` segment.
fn slug_from_link(link: &str) -> Option<&str> {
    let parts: Vec<&str> = link.split('/').collect();
    let comments_index = parts.iter().position(|part| *part == "comments")?;
    parts
        .get(comments_index + 2)
        .copied()
        .filter(|slug| !slug.is_empty())
}

fn title_case(input: &str) -> String {
    input
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Item name is the title minus everything that is surfaced elsewhere in the
/// monitor: the spot-count clause, a trailing bare number, the Fast badge
/// word and the bracketed condition tags.
fn clean_item_name(title: &str) -> String {
    let cleaned = SPOT_CLAUSE.replace(title, "");
    let cleaned = TRAILING_NUMBER.replace(&cleaned, "");
    let cleaned = FAST_BADGE.replace_all(&cleaned, " ");
    let cleaned = BRACKET_TAG.replace_all(&cleaned, " ");
    let cleaned = WHITESPACE.replace_all(&cleaned, " ");
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        UNKNOWN_ITEM.to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entrant(spots: i64) -> Participant {
        Participant {
            reddit_user: Some(format!("user{spots}")),
            spots: Some(spots),
            ..Participant::default()
        }
    }

    #[test]
    fn filled_spots_sums_the_roster() {
        let roster = vec![entrant(3), entrant(5), entrant(1)];
        assert_eq!(filled_spots(&roster), 9);
        assert_eq!(filled_spots(&[]), 0);
    }

    #[test]
    fn progress_rounds_half_away_from_zero() {
        assert_eq!(progress_percent(3, 10), 30);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(1, 8), 13); // 12.5 rounds up
    }

    #[test]
    fn zero_capacity_reports_zero_progress() {
        assert_eq!(progress_percent(25, 0), 0);
        assert_eq!(progress_percent(0, 0), 0);
    }

    #[test]
    fn lifecycle_thresholds_are_inclusive() {
        assert_eq!(lifecycle_status(0), LifecycleStatus::Starting);
        assert_eq!(lifecycle_status(29), LifecycleStatus::Starting);
        assert_eq!(lifecycle_status(30), LifecycleStatus::Filling);
        assert_eq!(lifecycle_status(89), LifecycleStatus::Filling);
        assert_eq!(lifecycle_status(90), LifecycleStatus::AlmostFull);
        assert_eq!(lifecycle_status(100), LifecycleStatus::AlmostFull);
        assert_eq!(lifecycle_status(150), LifecycleStatus::AlmostFull);
    }

    #[test]
    fn status_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&LifecycleStatus::AlmostFull).unwrap(),
            "\"almost-full\""
        );
    }

    #[test]
    fn overfilled_raffle_goes_negative_without_clamping() {
        let roster = vec![entrant(7), entrant(6)];
        let view = project(None, 10, 1.0, false, &roster);
        assert_eq!(view.filled_spots, 13);
        assert_eq!(view.remaining_spots, -3);
        assert_eq!(view.progress, 130);
        assert_eq!(view.status, LifecycleStatus::AlmostFull);
    }

    #[test]
    fn title_parsing_end_to_end() {
        let link = "https://reddit.com/r/PokemonRaffles/comments/abc123/nm_fast_charizard_vmax_37_spots_at_10ea/";
        let info = derive_title(link);
        assert_eq!(info.title, "[NM] Fast Charizard Vmax 37 Spots At 10ea");
        assert_eq!(info.item_name, "Charizard Vmax");
        assert!(info.is_fast);
    }

    #[test]
    fn condition_tags_are_bracketed_and_uppercased() {
        let info = derive_title("/r/watchraffles/comments/xyz/bnib_seiko_turtle_20_spots_at_5/");
        assert_eq!(info.title, "[BNIB] Seiko Turtle 20 Spots At 5");
        assert_eq!(info.item_name, "Seiko Turtle");
        assert!(!info.is_fast);
    }

    #[test]
    fn spot_clause_with_at_sign_is_stripped() {
        let info = derive_title("/r/raffles/comments/id1/lego_set_10_spots_@_2ea/");
        assert_eq!(info.item_name, "Lego Set");
    }

    #[test]
    fn trailing_bare_number_is_stripped() {
        let info = derive_title("/r/raffles/comments/id1/gundam_kit_25/");
        assert_eq!(info.title, "Gundam Kit 25");
        assert_eq!(info.item_name, "Gundam Kit");
    }

    #[test]
    fn dashes_and_runs_of_separators_collapse() {
        let info = derive_title("/r/raffles/comments/id1/mint-omega--seamaster__300/");
        assert_eq!(info.title, "[MINT] Omega Seamaster 300");
        assert_eq!(info.item_name, "Omega Seamaster");
    }

    #[test]
    fn fast_detection_is_whole_word() {
        // "breakfast" must not trip the fast badge.
        let info = derive_title("/r/raffles/comments/id1/breakfast_club_poster/");
        assert!(!info.is_fast);
        assert_eq!(info.item_name, "Breakfast Club Poster");
    }

    #[test]
    fn fast_mode_flag_forces_is_fast() {
        let view = project(
            Some("/r/raffles/comments/id1/slow_and_steady_raffle/"),
            10,
            1.0,
            true,
            &[],
        );
        assert!(view.is_fast);
        assert_eq!(view.title, "Slow And Steady Raffle");
    }

    #[test]
    fn missing_link_falls_back_to_placeholders() {
        let info = derive_title("");
        assert_eq!(info.title, UNKNOWN_RAFFLE);
        assert_eq!(info.item_name, UNKNOWN_ITEM);
        assert!(!info.is_fast);
    }

    #[test]
    fn link_without_slug_becomes_the_title() {
        let link = "https://reddit.com/r/PokemonRaffles/comments/abc123";
        let info = derive_title(link);
        assert_eq!(info.title, link);
        assert_eq!(info.item_name, UNKNOWN_ITEM);
    }

    #[test]
    fn title_that_cleans_to_nothing_keeps_placeholder_item() {
        let info = derive_title("/r/raffles/comments/id1/fast_50_spots_at_1ea/");
        assert!(info.is_fast);
        assert_eq!(info.item_name, UNKNOWN_ITEM);
    }

    #[test]
    fn legacy_spot_fields_count_toward_fill() {
        let roster = vec![Participant {
            username: Some("old-client".to_string()),
            spots_requested: Some(4),
            ..Participant::default()
        }];
        let view = project(None, 10, 2.5, false, &roster);
        assert_eq!(view.filled_spots, 4);
        assert_eq!(view.remaining_spots, 6);
        assert_eq!(view.progress, 40);
        assert_eq!(view.status, LifecycleStatus::Filling);
    }
}
