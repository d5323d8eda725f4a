#[cfg(test)]
mod tests {
    use crate::settings::duplicate_mapping_ids;
    use crate::types::NameMappingRow;

    fn mapping(id: i32, reddit_username: &str) -> NameMappingRow {
        NameMappingRow {
            id,
            reddit_username: reddit_username.to_string(),
            first_initial: "A".to_string(),
            last_initial: "B".to_string(),
        }
    }

    #[test]
    fn unique_usernames_are_untouched() {
        let rows = vec![mapping(1, "ash"), mapping(2, "misty"), mapping(3, "brock")];
        assert!(duplicate_mapping_ids(&rows).is_empty());
    }

    #[test]
    fn later_duplicates_are_dropped() {
        let rows = vec![mapping(1, "ash"), mapping(2, "ash"), mapping(3, "ash")];
        assert_eq!(duplicate_mapping_ids(&rows), vec![2, 3]);
    }

    #[test]
    fn lowercase_row_replaces_earlier_mixed_case() {
        let rows = vec![mapping(1, "AshKetchum"), mapping(2, "ashketchum")];
        // The mixed-case row goes, the lowercase duplicate stays.
        assert_eq!(duplicate_mapping_ids(&rows), vec![1]);
    }

    #[test]
    fn mixed_case_duplicate_of_lowercase_is_dropped() {
        let rows = vec![mapping(1, "ashketchum"), mapping(2, "AshKetchum")];
        assert_eq!(duplicate_mapping_ids(&rows), vec![2]);
    }

    #[test]
    fn two_mixed_case_duplicates_keep_the_first() {
        let rows = vec![mapping(1, "AshKetchum"), mapping(2, "ASHKETCHUM")];
        assert_eq!(duplicate_mapping_ids(&rows), vec![2]);
    }
}
