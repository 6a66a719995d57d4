/// Cinematic plan builder: flattens scene data into an ordered list of
/// beats for hosts that stage the whole run up front.
///
/// The plan uses the same ordering and defaulting rules as the progression
/// controller, so a host can preview exactly what a run will show.
use serde::{Deserialize, Serialize};

use crate::core::config::TerminalConfig;
use crate::core::host::OptionView;
use crate::schema::scene::NarrativeSceneData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BeatKind {
    OpeningLine,
    ThreadChoice,
    StoryParagraph,
    StoryQuestion,
    StoryChoice,
    NamePrompt,
    SecretPrompt,
    ExitLine,
}

/// How a host should stage a beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Presentation {
    /// Narrative text, revealed over time.
    Typewriter,
    /// Shown at once, no input.
    Immediate,
    /// Opens an input prompt.
    AwaitInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beat {
    pub kind: BeatKind,
    /// Story block the beat belongs to, for block beats.
    pub block: Option<usize>,
    pub lines: Vec<String>,
    pub prompt: Option<String>,
    pub options: Vec<OptionView>,
    pub presentation: Presentation,
}

impl Beat {
    fn line(kind: BeatKind, block: Option<usize>, text: &str) -> Self {
        Self {
            kind,
            block,
            lines: vec![text.to_string()],
            prompt: None,
            options: Vec::new(),
            presentation: Presentation::Typewriter,
        }
    }

    fn prompt(
        kind: BeatKind,
        block: Option<usize>,
        prompt: &str,
        options: Vec<OptionView>,
        presentation: Presentation,
    ) -> Self {
        Self {
            kind,
            block,
            lines: Vec::new(),
            prompt: Some(prompt.to_string()),
            options,
            presentation,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.presentation == Presentation::AwaitInput
    }
}

/// An ordered, deterministic sequence of beats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CinematicPlan {
    beats: Vec<Beat>,
}

impl CinematicPlan {
    /// Build a plan with the default canned text.
    pub fn build(data: &NarrativeSceneData) -> Self {
        Self::build_with(data, &TerminalConfig::default())
    }

    /// Build a plan, taking canned text from `config`. Never fails; absent
    /// optional content becomes default text or is skipped.
    pub fn build_with(data: &NarrativeSceneData, config: &TerminalConfig) -> Self {
        let mut beats = Vec::new();

        for line in &data.opening_lines {
            beats.push(Beat::line(BeatKind::OpeningLine, None, line));
        }

        let thread_choices = data.thread_choices();
        if !thread_choices.is_empty() {
            let prompt = data
                .initial_choice
                .as_ref()
                .map(|choice| choice.prompt.as_str())
                .unwrap_or_default();
            let options = thread_choices.iter().map(OptionView::from).collect();
            beats.push(Beat::prompt(
                BeatKind::ThreadChoice,
                None,
                prompt,
                options,
                Presentation::AwaitInput,
            ));
        }

        for (i, block) in data.story_blocks.iter().enumerate() {
            for paragraph in &block.paragraphs {
                beats.push(Beat::line(BeatKind::StoryParagraph, Some(i), paragraph));
            }

            let Some(question) = block.question_text() else {
                continue;
            };
            // A question without choices is itself the free-form input gate.
            let question_presentation = if block.choices.is_empty() {
                Presentation::AwaitInput
            } else {
                Presentation::Immediate
            };
            beats.push(Beat::prompt(
                BeatKind::StoryQuestion,
                Some(i),
                question,
                Vec::new(),
                question_presentation,
            ));

            if !block.choices.is_empty() {
                let options = block
                    .choices
                    .iter()
                    .enumerate()
                    .map(|(j, choice)| {
                        let id = if choice.id.trim().is_empty() {
                            format!("block_{}_choice_{}", i, j)
                        } else {
                            choice.id.clone()
                        };
                        let label = match choice.label() {
                            "" => format!("Option {}", j + 1),
                            label => label.to_string(),
                        };
                        OptionView::new(id, label, choice.description.clone())
                    })
                    .collect();
                beats.push(Beat::prompt(
                    BeatKind::StoryChoice,
                    Some(i),
                    question,
                    options,
                    Presentation::AwaitInput,
                ));
            }
        }

        let name_prompt = data
            .name_prompt_text()
            .unwrap_or(config.default_name_prompt.as_str());
        beats.push(Beat::prompt(
            BeatKind::NamePrompt,
            None,
            name_prompt,
            Vec::new(),
            Presentation::AwaitInput,
        ));

        if let Some(secret) = data.secret() {
            let prompt = if secret.prompt.trim().is_empty() {
                config.default_secret_prompt.as_str()
            } else {
                secret.prompt.as_str()
            };
            let options = secret
                .options
                .iter()
                .enumerate()
                .map(|(i, option)| OptionView::new((i + 1).to_string(), option.as_str(), ""))
                .collect();
            beats.push(Beat::prompt(
                BeatKind::SecretPrompt,
                None,
                prompt,
                options,
                Presentation::AwaitInput,
            ));
        }

        let exit = data
            .exit_line_text()
            .unwrap_or(config.closing_line.as_str());
        beats.push(Beat::line(BeatKind::ExitLine, None, exit));

        tracing::debug!(beats = beats.len(), "cinematic plan built");
        Self { beats }
    }

    pub fn beats(&self) -> &[Beat] {
        &self.beats
    }

    pub fn len(&self) -> usize {
        self.beats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beats.is_empty()
    }

    pub fn kinds(&self) -> Vec<BeatKind> {
        self.beats.iter().map(|beat| beat.kind).collect()
    }

    /// Beats that open an input prompt.
    pub fn interactive_count(&self) -> usize {
        self.beats.iter().filter(|beat| beat.is_interactive()).count()
    }

    pub fn beats_of(&self, kind: BeatKind) -> impl Iterator<Item = &Beat> + '_ {
        self.beats.iter().filter(move |beat| beat.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::scene::{ChoiceOption, InitialChoice, SecretQuestion, StoryBlock};

    #[test]
    fn empty_scene_has_name_and_exit_only() {
        let plan = CinematicPlan::build(&NarrativeSceneData::default());
        assert_eq!(plan.kinds(), vec![BeatKind::NamePrompt, BeatKind::ExitLine]);

        let name = &plan.beats()[0];
        assert_eq!(
            name.prompt.as_deref(),
            Some("What name should the terminal record?")
        );
        assert_eq!(
            plan.beats()[1].lines,
            vec!["Moving to the next part of your journey..."]
        );
    }

    #[test]
    fn story_choice_ids_and_labels_default() {
        let data = NarrativeSceneData {
            story_blocks: vec![StoryBlock {
                paragraphs: vec!["The corridor splits.".to_string()],
                question: Some("Which way?".to_string()),
                choices: vec![
                    ChoiceOption::default(),
                    ChoiceOption::new("right", "Go right"),
                ],
            }],
            ..NarrativeSceneData::default()
        };
        let plan = CinematicPlan::build(&data);
        let choice = plan.beats_of(BeatKind::StoryChoice).next().unwrap();

        assert_eq!(choice.block, Some(0));
        assert_eq!(choice.options[0].id, "block_0_choice_0");
        assert_eq!(choice.options[0].label, "Option 1");
        assert_eq!(choice.options[1].id, "right");
        assert_eq!(choice.options[1].label, "Go right");

        let question = plan.beats_of(BeatKind::StoryQuestion).next().unwrap();
        assert_eq!(question.presentation, Presentation::Immediate);
    }

    #[test]
    fn freeform_question_awaits_input() {
        let data = NarrativeSceneData {
            story_blocks: vec![StoryBlock {
                question: Some("What do you remember?".to_string()),
                ..StoryBlock::default()
            }],
            ..NarrativeSceneData::default()
        };
        let plan = CinematicPlan::build(&data);
        assert_eq!(
            plan.kinds(),
            vec![BeatKind::StoryQuestion, BeatKind::NamePrompt, BeatKind::ExitLine]
        );
        assert_eq!(plan.interactive_count(), 2);
    }

    #[test]
    fn blank_question_emits_paragraphs_only() {
        let data = NarrativeSceneData {
            story_blocks: vec![StoryBlock {
                paragraphs: vec!["a".to_string(), "b".to_string()],
                question: Some("  ".to_string()),
                choices: vec![ChoiceOption::new("x", "X")],
            }],
            ..NarrativeSceneData::default()
        };
        let plan = CinematicPlan::build(&data);
        assert_eq!(plan.beats_of(BeatKind::StoryParagraph).count(), 2);
        assert_eq!(plan.beats_of(BeatKind::StoryChoice).count(), 0);
    }

    #[test]
    fn secret_options_get_numeric_ids() {
        let data = NarrativeSceneData {
            secret_question: SecretQuestion {
                prompt: String::new(),
                options: vec!["truth".to_string(), "lie".to_string()],
            },
            ..NarrativeSceneData::default()
        };
        let plan = CinematicPlan::build(&data);
        let secret = plan.beats_of(BeatKind::SecretPrompt).next().unwrap();
        assert_eq!(secret.prompt.as_deref(), Some("Can you face what hides in the dark?"));
        let ids: Vec<&str> = secret.options.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(plan.kinds().last(), Some(&BeatKind::ExitLine));
    }

    #[test]
    fn thread_choice_needs_options() {
        let data = NarrativeSceneData {
            initial_choice: Some(InitialChoice {
                prompt: "Choose.".to_string(),
                options: Vec::new(),
            }),
            ..NarrativeSceneData::default()
        };
        let plan = CinematicPlan::build(&data);
        assert_eq!(plan.beats_of(BeatKind::ThreadChoice).count(), 0);
    }

    #[test]
    fn config_overrides_canned_text() {
        let config = TerminalConfig {
            closing_line: "Fin.".to_string(),
            default_name_prompt: "Name?".to_string(),
            ..TerminalConfig::default()
        };
        let plan = CinematicPlan::build_with(&NarrativeSceneData::default(), &config);
        assert_eq!(plan.beats()[0].prompt.as_deref(), Some("Name?"));
        assert_eq!(plan.beats()[1].lines, vec!["Fin."]);
    }

    #[test]
    fn plan_is_deterministic() {
        let data = NarrativeSceneData {
            opening_lines: vec!["a".to_string(), "b".to_string()],
            exit_line: Some("bye".to_string()),
            ..NarrativeSceneData::default()
        };
        assert_eq!(CinematicPlan::build(&data), CinematicPlan::build(&data));
    }
}
