/// Input resolution: maps raw player text onto a declared choice set.
///
/// Both resolvers try a 1-based numeric index first and then an exact,
/// case-insensitive text match. The first matching option wins, so content
/// should not give two options in one set the same text.
use crate::schema::scene::ChoiceOption;

/// Interpret `input` as a 1-based index into a list of `len` entries.
///
/// Zero, negative, non-numeric and out-of-range input all yield `None`.
pub fn parse_index(input: &str, len: usize) -> Option<usize> {
    let number: i64 = input.trim().parse().ok()?;
    let index = usize::try_from(number).ok()?.checked_sub(1)?;
    (index < len).then_some(index)
}

/// Resolve a thread (initial) choice: numeric index, then `id`, then text.
pub fn resolve_thread_choice<'a>(
    input: &str,
    choices: &'a [ChoiceOption],
) -> Option<&'a ChoiceOption> {
    if choices.is_empty() {
        return None;
    }
    if let Some(index) = parse_index(input, choices.len()) {
        return choices.get(index);
    }

    let needle = input.trim();
    choices
        .iter()
        .find(|choice| matches_text(&choice.id, needle))
        .or_else(|| choices.iter().find(|choice| matches_text(choice.text(), needle)))
}

/// Resolve a story choice: numeric index, then text. Ids are not consulted.
pub fn resolve_choice_option<'a>(
    input: &str,
    choices: &'a [ChoiceOption],
) -> Option<&'a ChoiceOption> {
    if choices.is_empty() {
        return None;
    }
    if let Some(index) = parse_index(input, choices.len()) {
        return choices.get(index);
    }

    let needle = input.trim();
    choices
        .iter()
        .find(|choice| matches_text(choice.text(), needle))
}

/// Case-insensitive equality. Empty candidates never match.
fn matches_text(candidate: &str, needle: &str) -> bool {
    !candidate.is_empty() && candidate.to_lowercase() == needle.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn threads() -> Vec<ChoiceOption> {
        vec![
            ChoiceOption::new("hero", "The Hero"),
            ChoiceOption::new("shadow", "The Shadow"),
            ChoiceOption::new("ambition", "The Ambition"),
        ]
    }

    fn story() -> Vec<ChoiceOption> {
        vec![
            ChoiceOption::new("left", "Open the door").with_next_block(1),
            ChoiceOption::new("right", "Walk away").with_next_block(2),
        ]
    }

    #[test]
    fn parse_index_bounds() {
        assert_eq!(parse_index("1", 2), Some(0));
        assert_eq!(parse_index(" 2 ", 2), Some(1));
        assert_eq!(parse_index("3", 2), None);
        assert_eq!(parse_index("0", 2), None);
        assert_eq!(parse_index("-1", 2), None);
        assert_eq!(parse_index("one", 2), None);
        assert_eq!(parse_index("1", 0), None);
    }

    #[test]
    fn thread_choice_by_number() {
        let choices = threads();
        assert_eq!(resolve_thread_choice("2", &choices).unwrap().id, "shadow");
    }

    #[test]
    fn thread_choice_by_id_any_case() {
        let choices = threads();
        assert_eq!(resolve_thread_choice("AMBITION", &choices).unwrap().id, "ambition");
    }

    #[test]
    fn thread_choice_by_text() {
        let choices = threads();
        assert_eq!(resolve_thread_choice("the shadow", &choices).unwrap().id, "shadow");
    }

    #[test]
    fn thread_choice_prefers_id_over_text() {
        let choices = vec![
            ChoiceOption::new("first", "second"),
            ChoiceOption::new("second", "other"),
        ];
        assert_eq!(resolve_thread_choice("second", &choices).unwrap().id, "second");
    }

    #[test]
    fn numeric_input_wins_over_matching_id() {
        let choices = vec![ChoiceOption::new("a", "A"), ChoiceOption::new("1", "B")];
        assert_eq!(resolve_thread_choice("1", &choices).unwrap().id, "a");

        let ids_only = vec![
            ChoiceOption {
                id: "a".to_string(),
                ..ChoiceOption::default()
            },
            ChoiceOption {
                id: "b".to_string(),
                ..ChoiceOption::default()
            },
        ];
        assert_eq!(resolve_thread_choice("1", &ids_only).unwrap().id, "a");
    }

    #[test]
    fn out_of_range_number_falls_through_to_text() {
        let choices = vec![ChoiceOption::new("x", "7"), ChoiceOption::new("y", "Y")];
        assert_eq!(resolve_choice_option("7", &choices).unwrap().id, "x");
        assert_eq!(resolve_choice_option("0", &choices), None);
    }

    #[test]
    fn story_choice_ignores_ids() {
        let choices = story();
        assert!(resolve_choice_option("left", &choices).is_none());
        assert_eq!(resolve_choice_option("walk AWAY", &choices).unwrap().id, "right");
        assert_eq!(resolve_choice_option("1", &choices).unwrap().id, "left");
    }

    #[test]
    fn duplicate_text_first_wins() {
        let choices = vec![
            ChoiceOption::new("a", "Same"),
            ChoiceOption::new("b", "Same"),
        ];
        assert_eq!(resolve_choice_option("same", &choices).unwrap().id, "a");
    }

    #[test]
    fn empty_id_is_unresolvable_by_id() {
        let choices = vec![ChoiceOption {
            id: String::new(),
            text: Some("Only text".to_string()),
            ..ChoiceOption::default()
        }];
        assert!(resolve_thread_choice("", &choices).is_none());
        assert!(resolve_thread_choice("only text", &choices).is_some());
    }

    proptest! {
        #[test]
        fn empty_choice_list_never_resolves(input in ".*") {
            prop_assert!(resolve_thread_choice(&input, &[]).is_none());
            prop_assert!(resolve_choice_option(&input, &[]).is_none());
        }

        #[test]
        fn resolvers_are_total(input in ".*", texts in proptest::collection::vec(".*", 0..5)) {
            let choices: Vec<ChoiceOption> = texts
                .iter()
                .enumerate()
                .map(|(i, text)| ChoiceOption::new(format!("opt{i}"), text.clone()))
                .collect();
            let _ = resolve_thread_choice(&input, &choices);
            let _ = resolve_choice_option(&input, &choices);
        }

        #[test]
        fn valid_index_always_resolves(len in 1usize..8, pick in 0usize..8) {
            prop_assume!(pick < len);
            let choices: Vec<ChoiceOption> = (0..len)
                .map(|i| ChoiceOption::new(format!("opt{i}"), format!("Option {i}")))
                .collect();
            let input = (pick + 1).to_string();
            let resolved = resolve_choice_option(&input, &choices).unwrap();
            prop_assert_eq!(&resolved.id, &choices[pick].id);
        }
    }
}
