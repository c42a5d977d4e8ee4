//! Render-ready view models. Everything the DOM layer paints is computed
//! here from session state, so the labels and enable rules are plain data.

use crate::api::{PublicState, SubmitResult};
use crate::catalog::QUESTIONS_PER_EVENT;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Home,
    Theme,
    StageIntro,
    Roadmap,
    EventIntro,
    Quiz,
    EventOutro,
    StageOutro,
    Summary,
}

impl Screen {
    pub fn name(self) -> &'static str {
        match self {
            Screen::Home => "home",
            Screen::Theme => "theme",
            Screen::StageIntro => "stage-intro",
            Screen::Roadmap => "roadmap",
            Screen::EventIntro => "event-intro",
            Screen::Quiz => "quiz",
            Screen::EventOutro => "event-outro",
            Screen::StageOutro => "stage-outro",
            Screen::Summary => "summary",
        }
    }

    pub fn element_id(self) -> String {
        format!("{}-screen", self.name())
    }
}

pub const SUBMIT_LABEL: &str = "정답 제출";
pub const RETRY_LABEL: &str = "재시도";
pub const SUMMARY_LABEL: &str = "요약 보기";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionMark {
    Correct,
    Wrong,
}

impl OptionMark {
    pub fn css_class(self) -> &'static str {
        match self {
            OptionMark::Correct => "option-correct",
            OptionMark::Wrong => "option-wrong",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionView {
    pub index: usize,
    pub text: String,
    pub mark: Option<OptionMark>,
    pub disabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnswerInput {
    Choices(Vec<OptionView>),
    ShortAnswer { disabled: bool },
    Hidden,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitButton {
    pub label: &'static str,
    pub retry: bool,
    pub disabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizView {
    pub score: i64,
    pub stage_title: String,
    pub summary: String,
    pub phase_label: String,
    pub image_url: Option<String>,
    pub question_text: String,
    pub input: AnswerInput,
    pub submit: SubmitButton,
    pub next_enabled: bool,
    /// A fresh question: wipe any feedback left from the previous one.
    pub clear_feedback: bool,
}

pub fn phase_label(state: &PublicState) -> String {
    match &state.current_event {
        Some(ce) => match ce.title.as_deref().filter(|t| !t.is_empty()) {
            Some(title) => format!(
                "{title} · {}/{}",
                ce.event_index + 1,
                ce.event_total.unwrap_or(0)
            ),
            None => "문제".to_string(),
        },
        None => "문제".to_string(),
    }
}

/// `clear_waiting` is set while the post-clear "summary" transition is armed.
pub fn quiz_view(
    state: &PublicState,
    result: Option<&SubmitResult>,
    selected: Option<usize>,
    clear_waiting: bool,
) -> QuizView {
    let answered_correct = result.is_some_and(|r| r.correct);
    let answered_wrong = result.is_some_and(|r| !r.correct);
    let q = state.question.as_ref();

    let input = match q {
        Some(q) if q.is_mcq() => AnswerInput::Choices(
            q.options
                .iter()
                .enumerate()
                .map(|(index, text)| {
                    let mark = match (result, selected) {
                        (Some(r), Some(_)) if r.correct && r.correct_choice_index == Some(index) => {
                            Some(OptionMark::Correct)
                        }
                        (Some(r), Some(sel)) if !r.correct && sel == index => Some(OptionMark::Wrong),
                        _ => None,
                    };
                    OptionView {
                        index,
                        text: text.clone(),
                        mark,
                        disabled: answered_correct,
                    }
                })
                .collect(),
        ),
        Some(_) => AnswerInput::ShortAnswer {
            disabled: answered_correct,
        },
        None => AnswerInput::Hidden,
    };

    let summary_waiting = clear_waiting && answered_correct;
    let submit = if summary_waiting {
        SubmitButton {
            label: SUMMARY_LABEL,
            retry: false,
            disabled: false,
        }
    } else if answered_wrong {
        SubmitButton {
            label: RETRY_LABEL,
            retry: true,
            disabled: false,
        }
    } else {
        SubmitButton {
            label: SUBMIT_LABEL,
            retry: false,
            disabled: answered_correct,
        }
    };

    QuizView {
        score: state.score,
        stage_title: if state.stage_title.is_empty() {
            "스테이지 제목".to_string()
        } else {
            state.stage_title.clone()
        },
        summary: state.summary.clone(),
        phase_label: phase_label(state),
        image_url: q.map(|q| q.image_url.clone()).filter(|u| !u.is_empty()),
        question_text: q.map(|q| q.text.clone()).unwrap_or_default(),
        input,
        submit,
        next_enabled: result.is_some_and(|r| r.correct && !r.stage_cleared),
        clear_feedback: result.is_none(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Correct,
    Wrong,
}

impl Tone {
    pub fn css_class(self) -> &'static str {
        match self {
            Tone::Correct => "correct",
            Tone::Wrong => "wrong",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedbackView {
    pub text: String,
    pub tone: Tone,
}

/// The explanation is only revealed after a correct answer so a retry is
/// not spoiled.
pub fn feedback_view(result: &SubmitResult, explanation: Option<&str>) -> FeedbackView {
    let mut text = match &result.feedback {
        Some(msg) => msg.clone(),
        None if result.correct => "정답!".to_string(),
        None => "오답! 다시 시도해봐 🫠".to_string(),
    };
    if result.correct {
        if let Some(exp) = explanation.filter(|e| !e.is_empty()) {
            text.push_str("\n\n해설) ");
            text.push_str(exp);
        }
    }
    FeedbackView {
        text,
        tone: if result.correct { Tone::Correct } else { Tone::Wrong },
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatteryView {
    pub level: usize,
    pub label: Option<String>,
}

/// One cell per question of the current event.
pub fn battery_view(state: &PublicState) -> BatteryView {
    match &state.current_event {
        Some(ce) => {
            let level = (ce.event_index + 1).min(QUESTIONS_PER_EVENT);
            let total = ce.event_total.unwrap_or(QUESTIONS_PER_EVENT);
            BatteryView {
                level,
                label: Some(format!("{level} / {total}")),
            }
        }
        None => BatteryView {
            level: 0,
            label: None,
        },
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mood {
    Normal,
    Correct,
    Wrong,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AvatarRole {
    User,
    Partner,
}

impl Mood {
    pub fn image(self, role: AvatarRole, base: &str) -> String {
        let who = match role {
            AvatarRole::User => "human",
            AvatarRole::Partner => "robot",
        };
        let mood = match self {
            Mood::Normal => "normal",
            Mood::Correct => "correct",
            Mood::Wrong => "incorrect",
        };
        format!("{}/{who}_{mood}.png", base.trim_end_matches('/'))
    }

    /// Reaction class toggled on the avatar's `.status-item` box.
    pub fn reaction_class(self) -> Option<&'static str> {
        match self {
            Mood::Normal => None,
            Mood::Correct => Some("correct"),
            Mood::Wrong => Some("wrong"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummaryView {
    pub title: String,
    pub summary: String,
    pub score: i64,
}

pub fn summary_view(state: &PublicState) -> SummaryView {
    SummaryView {
        title: if state.stage_title.is_empty() {
            "스테이지 요약".to_string()
        } else {
            state.stage_title.clone()
        },
        summary: state.summary.clone(),
        score: state.score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CurrentEvent, Question};

    fn mcq_state() -> PublicState {
        PublicState {
            stage_title: "금융사".into(),
            score: 2,
            current_event: Some(CurrentEvent {
                event_key: "1_the_great_depression_1929".into(),
                title: Some("1929 대공황".into()),
                event_index: 1,
                event_total: Some(5),
                ..Default::default()
            }),
            question: Some(Question {
                kind: "mcq".into(),
                text: "원인은?".into(),
                options: vec!["a".into(), "b".into(), "c".into()],
                explanation: "설명".into(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn marks(view: &QuizView) -> Vec<Option<OptionMark>> {
        match &view.input {
            AnswerInput::Choices(opts) => opts.iter().map(|o| o.mark).collect(),
            other => panic!("expected choices, got {other:?}"),
        }
    }

    #[test]
    fn fresh_question_has_submit_label() {
        let view = quiz_view(&mcq_state(), None, None, false);
        assert_eq!(view.submit.label, SUBMIT_LABEL);
        assert!(!view.submit.disabled);
        assert!(!view.next_enabled);
        assert!(view.clear_feedback);
        assert_eq!(view.phase_label, "1929 대공황 · 2/5");
        assert_eq!(view.image_url, None);
    }

    #[test]
    fn wrong_answer_marks_only_my_pick() {
        let res = SubmitResult {
            correct: false,
            correct_choice_index: Some(0),
            ..Default::default()
        };
        let view = quiz_view(&mcq_state(), Some(&res), Some(2), false);
        assert_eq!(marks(&view), vec![None, None, Some(OptionMark::Wrong)]);
        assert_eq!(view.submit.label, RETRY_LABEL);
        assert!(view.submit.retry);
        assert!(!view.next_enabled);
    }

    #[test]
    fn correct_answer_locks_options_and_enables_next() {
        let res = SubmitResult {
            correct: true,
            correct_choice_index: Some(1),
            ..Default::default()
        };
        let view = quiz_view(&mcq_state(), Some(&res), Some(1), false);
        assert_eq!(marks(&view), vec![None, Some(OptionMark::Correct), None]);
        assert!(view.submit.disabled);
        assert!(view.next_enabled);
        match view.input {
            AnswerInput::Choices(opts) => assert!(opts.iter().all(|o| o.disabled)),
            _ => unreachable!(),
        }
    }

    #[test]
    fn cleared_answer_turns_submit_into_summary() {
        let res = SubmitResult {
            correct: true,
            event_cleared: true,
            stage_cleared: true,
            ..Default::default()
        };
        let view = quiz_view(&mcq_state(), Some(&res), Some(1), true);
        assert_eq!(view.submit.label, SUMMARY_LABEL);
        assert!(!view.submit.disabled);
        assert!(!view.next_enabled);
    }

    #[test]
    fn short_answer_uses_text_input() {
        let mut st = mcq_state();
        st.question.as_mut().unwrap().kind = "short".into();
        st.current_event = None;
        let view = quiz_view(&st, None, None, false);
        assert_eq!(view.input, AnswerInput::ShortAnswer { disabled: false });
        assert_eq!(view.phase_label, "문제");
    }

    #[test]
    fn explanation_only_after_correct() {
        let ok = SubmitResult { correct: true, ..Default::default() };
        assert_eq!(feedback_view(&ok, Some("설명")).text, "정답!\n\n해설) 설명");
        let bad = SubmitResult::default();
        let fb = feedback_view(&bad, Some("설명"));
        assert_eq!(fb.text, "오답! 다시 시도해봐 🫠");
        assert_eq!(fb.tone, Tone::Wrong);
    }

    #[test]
    fn battery_tracks_event_position() {
        let st = mcq_state();
        assert_eq!(
            battery_view(&st),
            BatteryView { level: 2, label: Some("2 / 5".into()) }
        );
        assert_eq!(battery_view(&PublicState::default()).level, 0);
    }

    #[test]
    fn avatar_images() {
        assert_eq!(
            Mood::Wrong.image(AvatarRole::Partner, "/static/images/Status/"),
            "/static/images/Status/robot_incorrect.png"
        );
        assert_eq!(Mood::Normal.reaction_class(), None);
    }
}
