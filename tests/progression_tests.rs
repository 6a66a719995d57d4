/// Progression integration tests: full runs over fixture and sample content.

use narrative_terminal::core::affinity::Alignment;
use narrative_terminal::core::config::TerminalConfig;
use narrative_terminal::core::content::{load_scene, ContentLibrary};
use narrative_terminal::core::controller::{NarrativeController, NarrativeState, Progress};
use narrative_terminal::core::host::{PromptKind, RecordingHost};
use narrative_terminal::schema::scene::NarrativeSceneData;
use narrative_terminal::schema::thread::Thread;
use std::path::Path;

fn fixture(name: &str) -> NarrativeSceneData {
    load_scene(&Path::new("tests/fixtures").join(name)).unwrap()
}

#[test]
fn five_block_run_covers_every_gate() {
    let mut controller = NarrativeController::new(fixture("five_blocks.ron"));
    let mut host = RecordingHost::new();

    // Blocks 0 and 1 pass through; block 1's blank question is not a gate.
    let progress = controller.start(&mut host).unwrap();
    assert_eq!(progress, Progress::Awaiting(PromptKind::StoryChoice));
    assert_eq!(controller.state(), NarrativeState::StoryChoicePending(2));
    assert_eq!(host.lines, vec!["Boot.", "zero", "one", "two"]);

    // "Stay" points back at block 2 and advances to 3 instead.
    controller.submit("stay", &mut host).unwrap();
    assert_eq!(controller.state(), NarrativeState::FreeformPending(3));

    assert_eq!(
        controller.submit("  ", &mut host).unwrap(),
        Progress::Ignored(PromptKind::Freeform)
    );
    controller.submit("A spiral.", &mut host).unwrap();
    assert_eq!(controller.state(), NarrativeState::NamePending);

    controller.submit("Ada", &mut host).unwrap();
    assert_eq!(controller.state(), NarrativeState::SecretPending);

    assert_eq!(controller.submit("2", &mut host).unwrap(), Progress::Complete);
    let responses = controller.scene_responses();
    assert_eq!(responses.get("block-3-response").map(String::as_str), Some("A spiral."));
    assert_eq!(responses.get("secret").map(String::as_str), Some("lie"));
    assert_eq!(host.completions, 1);
    assert_eq!(
        host.lines.last().map(String::as_str),
        Some("Moving to the next part of your journey...")
    );
}

#[test]
fn far_jump_clamps_to_name_prompt() {
    let mut controller = NarrativeController::new(fixture("five_blocks.ron"));
    let mut host = RecordingHost::new();
    controller.start(&mut host).unwrap();

    let progress = controller.submit("2", &mut host).unwrap();

    assert_eq!(progress, Progress::Awaiting(PromptKind::PlayerName));
    assert_eq!(controller.current_block(), Some(5));
    assert!(controller.scene_responses().is_empty());
}

#[test]
fn malformed_fixture_plays_without_errors() {
    let scene = fixture("malformed.json");
    assert_eq!(scene.opening_lines, vec!["Signal found."]);
    assert_eq!(scene.thread_choices().len(), 3);
    assert_eq!(scene.thread_choices()[0].thread, Thread::Hero);
    assert_eq!(scene.thread_choices()[1].thread, Thread::Shadow);
    assert_eq!(scene.thread_choices()[2].text(), "No id at all");
    assert!(scene.secret().is_none());

    let mut controller = NarrativeController::new(scene);
    let mut host = RecordingHost::new();
    controller.start(&mut host).unwrap();

    // "mystic" cannot be typed back as a thread name, but its id still resolves.
    controller.submit("mystic", &mut host).unwrap();
    assert_eq!(controller.selected_thread(), Some(Thread::Hero));
    assert_eq!(controller.state(), NarrativeState::StoryChoicePending(1));

    // A negative nextBlock clamps to 0 and replays the pass-through block.
    controller.submit("back", &mut host).unwrap();
    assert_eq!(controller.state(), NarrativeState::StoryChoicePending(1));
    assert_eq!(controller.affinity().score(Thread::Shadow), 1);
    assert_eq!(controller.affinity().score(Thread::Hero), 1);

    // nextBlock "two" was not a number and defaulted to 0.
    controller.submit("onward", &mut host).unwrap();
    assert_eq!(controller.state(), NarrativeState::StoryChoicePending(1));
}

#[test]
fn sample_content_loads_for_every_thread() {
    let library = ContentLibrary::load_from_dir(Path::new("content")).unwrap();
    assert_eq!(library.threads(), Thread::ALL.to_vec());

    let ambition = library.scene_for(Thread::Ambition).unwrap();
    assert_eq!(ambition.opening_lines[0], "The terminal boots in gold.");
    assert_eq!(ambition.thread_choices()[0].thread, Thread::Ambition);
}

#[test]
fn hero_sample_run_reaches_completion() {
    let library = ContentLibrary::load_from_dir(Path::new("content")).unwrap();
    let scene = library.scene_for(Thread::Hero).unwrap().clone();
    let config = TerminalConfig {
        response_key_prefix: Some("scene1_narrative.".to_string()),
        ..TerminalConfig::default()
    };
    let mut controller = NarrativeController::builder().config(config).build(scene);
    let mut host = RecordingHost::new();

    controller.start(&mut host).unwrap();
    controller.submit("hero", &mut host).unwrap();
    controller.submit("the warm door", &mut host).unwrap();
    controller.submit("It was mine.", &mut host).unwrap();
    controller.submit("Ada", &mut host).unwrap();
    let progress = controller.submit("1", &mut host).unwrap();

    assert_eq!(progress, Progress::Complete);
    assert_eq!(host.selected_thread, Some(Thread::Hero));
    assert_eq!(
        host.responses,
        vec![
            ("scene1_narrative.block-1-response".to_string(), "It was mine.".to_string()),
            ("scene1_narrative.secret".to_string(), "A promise".to_string()),
        ]
    );
    // Thread lock plus the warm door's light score.
    assert_eq!(controller.affinity().score(Thread::Hero), 3);
    assert_eq!(controller.affinity().dominant(), Alignment::Dominant(Thread::Hero));
}

#[test]
fn affinity_carries_into_the_next_scene() {
    let library = ContentLibrary::load_from_dir(Path::new("content")).unwrap();
    let mut host = RecordingHost::new();

    let mut first = NarrativeController::new(library.scene_for(Thread::Shadow).unwrap().clone());
    first.start(&mut host).unwrap();
    first.submit("shadow", &mut host).unwrap();
    first.submit("keep it", &mut host).unwrap();
    let tracker = first.into_affinity();
    assert_eq!(tracker.score(Thread::Shadow), 2);

    let mut second = NarrativeController::builder()
        .affinity(tracker)
        .build(library.scene_for(Thread::Shadow).unwrap().clone());
    let mut host = RecordingHost::new();
    second.start(&mut host).unwrap();
    assert!(second.submit("hero", &mut host).is_err());
    assert!(second.submit("shadow", &mut host).is_ok());
    assert_eq!(second.affinity().score(Thread::Shadow), 3);
}
