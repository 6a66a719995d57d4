/// Normalization properties over generated scene content.

use narrative_terminal::core::content::{parse_scene_json, parse_scene_ron};
use narrative_terminal::core::normalizer::normalize;
use narrative_terminal::schema::scene::{
    ChoiceOption, InitialChoice, NarrativeSceneData, SecretQuestion, StoryBlock,
};
use narrative_terminal::schema::thread::Thread;
use proptest::prelude::*;

fn option_strategy() -> impl Strategy<Value = ChoiceOption> {
    (
        prop_oneof!["hero", "Shadow", "AMBITION", "mystic", "", "[a-z]{1,8}"],
        proptest::option::of("[A-Za-z ]{0,12}"),
        -3i32..8,
    )
        .prop_map(|(id, text, next_block)| ChoiceOption {
            id: id.to_string(),
            text,
            next_block,
            ..ChoiceOption::default()
        })
}

fn scene_strategy() -> impl Strategy<Value = NarrativeSceneData> {
    scene_strategy_with(".{0,20}")
}

fn scene_strategy_with(line: &'static str) -> impl Strategy<Value = NarrativeSceneData> {
    (
        proptest::collection::vec(line, 0..4),
        proptest::option::of(proptest::collection::vec(option_strategy(), 0..4)),
        proptest::collection::vec(
            (
                proptest::collection::vec(line, 0..3),
                proptest::option::of("[a-z ?]{0,10}"),
                proptest::collection::vec(option_strategy(), 0..3),
            ),
            0..5,
        ),
        proptest::collection::vec("[a-z]{1,6}", 0..3),
        proptest::option::of("[A-Za-z ]{0,12}"),
        proptest::option::of("[A-Za-z ]{0,12}"),
    )
        .prop_map(|(opening_lines, initial, blocks, secret_options, name_prompt, exit_line)| NarrativeSceneData {
            scene_type: String::new(),
            opening_lines,
            initial_choice: initial.map(|options| InitialChoice {
                prompt: "Pick.".to_string(),
                options,
            }),
            story_blocks: blocks
                .into_iter()
                .map(|(paragraphs, question, choices)| StoryBlock {
                    paragraphs,
                    question,
                    choices,
                })
                .collect(),
            name_prompt,
            secret_question: SecretQuestion {
                prompt: String::new(),
                options: secret_options,
            },
            exit_line,
        })
}

proptest! {
    #[test]
    fn normalization_is_idempotent(scene in scene_strategy()) {
        let once = normalize(scene);
        let twice = normalize(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn normalized_thread_options_have_text(scene in scene_strategy()) {
        let scene = normalize(scene);
        for option in scene.thread_choices() {
            prop_assert!(option.text.is_some());
            prop_assert_eq!(option.thread, Thread::parse_or_default(&option.id));
        }
    }

    #[test]
    fn normalized_json_round_trips(scene in scene_strategy()) {
        let scene = normalize(scene);
        let json = serde_json::to_string(&scene).unwrap();
        prop_assert_eq!(parse_scene_json(&json).unwrap(), scene);
    }

    #[test]
    fn normalized_ron_round_trips(scene in scene_strategy_with("[A-Za-z0-9 .,!?'-]{0,20}")) {
        let scene = normalize(scene);
        let ron = ron::to_string(&scene).unwrap();
        prop_assert_eq!(parse_scene_ron(&ron).unwrap(), scene);
    }
}

#[test]
fn ron_scene_keeps_initial_choice_and_questions() {
    let scene = normalize(NarrativeSceneData {
        initial_choice: Some(InitialChoice {
            prompt: "Pick.".to_string(),
            options: vec![ChoiceOption::new("shadow", "Shadow")],
        }),
        story_blocks: vec![StoryBlock {
            paragraphs: vec!["The corridor forks.".to_string()],
            question: Some("Which way?".to_string()),
            choices: vec![ChoiceOption::new("left", "Left").with_next_block(1)],
        }],
        exit_line: Some("Bye".to_string()),
        ..NarrativeSceneData::default()
    });
    let ron = ron::to_string(&scene).unwrap();
    let parsed = parse_scene_ron(&ron).unwrap();
    assert_eq!(parsed.thread_choices()[0].thread, Thread::Shadow);
    assert_eq!(parsed.story_blocks[0].question.as_deref(), Some("Which way?"));
    assert_eq!(parsed.exit_line.as_deref(), Some("Bye"));
    assert_eq!(parsed, scene);
}

#[test]
fn unknown_thread_normalizes_to_hero() {
    let scene = parse_scene_json(
        r#"{"initialChoice": {"prompt": "Pick", "options": [{"id": "mystic"}]}}"#,
    )
    .unwrap();
    assert_eq!(scene.thread_choices()[0].thread, Thread::Hero);
}
