//! Page-session controller.
//!
//! `Session` owns the cached server state plus the UI-only flags that
//! sequence screens (retry mode, the pending next question, the armed
//! "summary" transition, the replayable stage outro). Each handler does at
//! most one round trip through the [`Backend`] and queues [`Ui`] effects;
//! the DOM layer drains and paints them.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::{PublicState, SubmitRequest, SubmitResult};
use crate::catalog::{self, is_playable_stage};
use crate::client::Backend;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::roadmap::{self, EventStatus, RoadmapView};
use crate::story::{Slide, Story, StoryKind, StoryUi};
use crate::view::{
    self, BatteryView, FeedbackView, Mood, QuizView, Screen, SummaryView,
};

/// Paint instructions, applied in order.
#[derive(Clone, Debug, PartialEq)]
pub enum Ui {
    Screen(Screen),
    Roadmap(RoadmapView),
    Quiz(QuizView),
    Feedback(FeedbackView),
    ClearFeedback,
    Story(StoryView),
    Battery(BatteryView),
    Avatar(Mood),
    NextEnabled(bool),
    Summary(SummaryView),
    Alert(String),
    DevPanel(bool),
    DevLog(String),
    DevTouched(bool),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoryView {
    pub kind: StoryKind,
    /// `None` keeps whatever title the screen already shows.
    pub title: Option<String>,
    pub subtitle: String,
    pub slide: Slide,
    pub next_label: Option<&'static str>,
}

/// What the submit button does once an event or stage has just been cleared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionKind {
    EventOutro,
    StageOutro,
    Roadmap,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub kind: TransitionKind,
    pub payload: Option<Value>,
    pub ui: StoryUi,
}

/// Stage outro held for the roadmap's replay button.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingOutro {
    pub payload: Value,
    pub ui: StoryUi,
}

/// Raw answer widgets read at click time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubmitInput {
    pub choice: Option<usize>,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DevAction {
    Fetch,
    GoRoadmap,
    SolveOne,
    SolveEvent,
    SolveStage,
    ResetStage,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Boot { dev_touched: bool },
    FetchState,
    Navigate(Screen),
    ThemeGlobal,
    StageHotspot(String),
    StartStage(String),
    StoryNext(StoryKind),
    StageIntroSkip,
    EventIntroBack,
    RoadmapCard(usize),
    WatchStageOutro,
    Submit(SubmitInput),
    Next,
    Hint,
    GoRoadmap,
    SummaryRestart,
    Dev(DevAction),
}

pub struct Session<B> {
    pub(crate) backend: B,
    pub(crate) config: ClientConfig,
    pub(crate) current: Option<PublicState>,
    last_result: Option<SubmitResult>,
    last_selected: Option<usize>,
    retry_mode: bool,
    pending: Option<PublicState>,
    post_clear: Option<Transition>,
    review_return_key: Option<String>,
    pub(crate) pending_stage_outro: Option<PendingOutro>,
    story: Story,
    story_ui: StoryUi,
    screen: Screen,
    outbox: Vec<Ui>,
}

impl<B: Backend> Session<B> {
    pub fn new(backend: B, config: ClientConfig) -> Self {
        Self {
            backend,
            config,
            current: None,
            last_result: None,
            last_selected: None,
            retry_mode: false,
            pending: None,
            post_clear: None,
            review_return_key: None,
            pending_stage_outro: None,
            story: Story::default(),
            story_ui: StoryUi::default(),
            screen: Screen::Home,
            outbox: Vec::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn state(&self) -> Option<&PublicState> {
        self.current.as_ref()
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn story(&self) -> &Story {
        &self.story
    }

    pub fn last_result(&self) -> Option<&SubmitResult> {
        self.last_result.as_ref()
    }

    pub fn is_retry_mode(&self) -> bool {
        self.retry_mode
    }

    pub fn post_clear(&self) -> Option<&Transition> {
        self.post_clear.as_ref()
    }

    pub fn pending_stage_outro(&self) -> Option<&PendingOutro> {
        self.pending_stage_outro.as_ref()
    }

    pub fn review_return_key(&self) -> Option<&str> {
        self.review_return_key.as_deref()
    }

    /// Take every queued paint instruction.
    pub fn drain(&mut self) -> Vec<Ui> {
        std::mem::take(&mut self.outbox)
    }

    pub async fn handle(&mut self, action: Action) -> Result<(), ClientError> {
        debug!(?action, "handle");
        match action {
            Action::Boot { dev_touched } => self.boot(dev_touched).await,
            Action::FetchState => self.fetch_state().await,
            Action::Navigate(screen) => {
                self.show_screen(screen);
                Ok(())
            }
            Action::ThemeGlobal => {
                let stage_id = self.config.stage_id.clone();
                self.resume_or_start_stage(&stage_id).await
            }
            Action::StageHotspot(stage_id) => self.select_stage(&stage_id).await,
            Action::StartStage(stage_id) => self.start_stage(&stage_id).await,
            Action::StoryNext(kind) => self.story_next(kind).await,
            Action::StageIntroSkip => {
                self.show_screen(Screen::Roadmap);
                Ok(())
            }
            Action::EventIntroBack => self.event_intro_back().await,
            Action::RoadmapCard(index) => self.open_roadmap_card(index).await,
            Action::WatchStageOutro => {
                self.watch_stage_outro();
                Ok(())
            }
            Action::Submit(input) => self.submit_answer(input).await,
            Action::Next => self.go_next().await,
            Action::Hint => {
                self.show_hint();
                Ok(())
            }
            Action::GoRoadmap => self.go_roadmap_safe().await,
            Action::SummaryRestart => {
                self.reset_stage_silently().await?;
                let stage_id = self.config.stage_id.clone();
                self.start_stage(&stage_id).await
            }
            Action::Dev(dev) => self.handle_dev(dev).await,
        }
    }

    // --- paint helpers ----------------------------------------------------

    pub(crate) fn push(&mut self, ui: Ui) {
        self.outbox.push(ui);
    }

    pub(crate) fn alert(&mut self, msg: impl Into<String>) {
        self.push(Ui::Alert(msg.into()));
    }

    pub(crate) fn show_screen(&mut self, screen: Screen) {
        self.screen = screen;
        self.push(Ui::Screen(screen));
        if screen == Screen::Roadmap {
            self.render_roadmap();
        }
    }

    pub(crate) fn render_roadmap(&mut self) {
        let view = roadmap::roadmap_view(self.current.as_ref(), self.pending_stage_outro.is_some());
        self.push(Ui::Roadmap(view));
    }

    pub(crate) fn render_all(&mut self) {
        let Some(state) = &self.current else {
            return;
        };
        let quiz = view::quiz_view(
            state,
            self.last_result.as_ref(),
            self.last_selected,
            self.post_clear.is_some(),
        );
        let battery = view::battery_view(state);
        self.retry_mode = self.last_result.as_ref().is_some_and(|r| !r.correct);
        self.push(Ui::Quiz(quiz));
        self.push(Ui::Battery(battery));
    }

    fn render_feedback(&mut self, result: &SubmitResult) {
        let explanation = self
            .current
            .as_ref()
            .and_then(|s| s.question.as_ref())
            .map(|q| q.explanation.as_str());
        let fb = view::feedback_view(result, explanation);
        self.push(Ui::Feedback(fb));
    }

    fn set_avatar(&mut self, mood: Mood) {
        self.push(Ui::Avatar(mood));
    }

    fn stage_title_or(&self, fallback: &str) -> String {
        self.current
            .as_ref()
            .map(|s| s.stage_title.as_str())
            .filter(|t| !t.is_empty())
            .unwrap_or(fallback)
            .to_string()
    }

    fn stage_outro_ui(&self) -> StoryUi {
        StoryUi::new(self.stage_title_or("스테이지"), "교훈/정리")
    }

    fn clear_answer_flags(&mut self) {
        self.last_result = None;
        self.last_selected = None;
        self.retry_mode = false;
    }

    fn clear_transitions(&mut self) {
        self.pending = None;
        self.post_clear = None;
    }

    fn alert_failure(&mut self, what: &str, err: &ClientError) {
        warn!(%err, "{what} failed");
        let side = if err.is_server() { "서버" } else { "클라이언트" };
        self.alert(format!("{what}하는 중 오류가 발생했어요. ({side})"));
    }

    // --- story ------------------------------------------------------------

    fn story_view(&self, opening: bool) -> Option<StoryView> {
        let kind = self.story.kind()?;
        let title = (opening && !self.story_ui.title.is_empty()).then(|| self.story_ui.title.clone());
        Some(StoryView {
            kind,
            title,
            subtitle: self.story.progress_label(&self.story_ui.subtitle),
            slide: self.story.current(),
            next_label: self.story.next_label(),
        })
    }

    pub(crate) fn start_story(&mut self, kind: StoryKind, payload: &Value, ui: StoryUi) {
        self.story = Story::start(kind, payload);
        self.story_ui = ui;
        if let Some(view) = self.story_view(true) {
            self.push(Ui::Story(view));
        }
        self.show_screen(kind.screen());
    }

    /// Advance the story on screen; returns `true` once it has run out.
    fn next_story(&mut self, kind: StoryKind) -> bool {
        if self.story.kind() != Some(kind) || self.story.advance() {
            return true;
        }
        if let Some(view) = self.story_view(false) {
            self.push(Ui::Story(view));
        }
        false
    }

    async fn story_next(&mut self, kind: StoryKind) -> Result<(), ClientError> {
        if !self.next_story(kind) {
            return Ok(());
        }
        match kind {
            StoryKind::StageIntro => {
                self.show_screen(Screen::Roadmap);
                Ok(())
            }
            StoryKind::EventIntro => {
                self.show_screen(Screen::Quiz);
                self.set_avatar(Mood::Normal);
                self.render_all();
                Ok(())
            }
            StoryKind::EventOutro | StoryKind::StageOutro => self.go_roadmap_safe().await,
        }
    }

    fn watch_stage_outro(&mut self) {
        // Kept after viewing so the outro can be replayed until a reset.
        let Some(outro) = self.pending_stage_outro.clone() else {
            return;
        };
        self.start_story(StoryKind::StageOutro, &outro.payload, outro.ui);
    }

    // --- server round trips -----------------------------------------------

    fn adopt_fetched(&mut self, state: Option<PublicState>) {
        self.current = state;
        self.last_result = None;
        let Some(state) = &self.current else {
            self.render_roadmap();
            return;
        };
        let summary = view::summary_view(state);
        self.render_all();
        self.render_roadmap();
        self.push(Ui::Summary(summary));
    }

    pub async fn fetch_state(&mut self) -> Result<(), ClientError> {
        let state = self.backend.state().await?;
        self.adopt_fetched(state);
        Ok(())
    }

    async fn boot(&mut self, dev_touched: bool) -> Result<(), ClientError> {
        self.show_screen(Screen::Home);
        if !self.config.dev_mode && dev_touched {
            info!("dev session left state behind, resetting stage");
            self.reset_stage_silently().await?;
            self.push(Ui::DevTouched(false));
        }
        let fetched = self.fetch_state().await;
        if self.config.dev_mode {
            self.push(Ui::DevPanel(true));
            self.push(Ui::DevLog("DEV MODE ON\n(Shift+D 토글)".into()));
        }
        fetched
    }

    pub async fn submit_answer(&mut self, input: SubmitInput) -> Result<(), ClientError> {
        if self.current.is_none() {
            return Ok(());
        }

        // "요약 보기" after a clear: commit the next state and play the outro.
        if let Some(t) = self.post_clear.take() {
            if let Some(next) = self.pending.take() {
                self.current = Some(next);
            }
            let story_kind = match t.kind {
                TransitionKind::EventOutro => Some(StoryKind::EventOutro),
                TransitionKind::StageOutro => Some(StoryKind::StageOutro),
                TransitionKind::Roadmap => None,
            };
            if let (Some(kind), Some(payload)) = (story_kind, &t.payload) {
                self.start_story(kind, payload, t.ui.clone());
                return Ok(());
            }
            self.show_screen(Screen::Roadmap);
            return self.fetch_state().await;
        }

        // "재시도": redraw the same question without asking the server.
        if self.retry_mode {
            self.set_avatar(Mood::Normal);
            self.clear_answer_flags();
            self.push(Ui::ClearFeedback);
            self.render_all();
            return Ok(());
        }

        let Some(question) = self.current.as_ref().and_then(|s| s.question.clone()) else {
            return Ok(());
        };
        let request = if question.is_mcq() {
            let Some(choice) = input.choice else {
                self.alert("보기를 하나 선택해 주세요.");
                return Ok(());
            };
            self.last_selected = Some(choice);
            SubmitRequest::Choice {
                choice_index: choice,
            }
        } else {
            let answer = input.text.trim();
            if answer.is_empty() {
                self.alert("정답을 입력해 주세요.");
                return Ok(());
            }
            SubmitRequest::Text {
                answer: answer.to_string(),
            }
        };

        let result = self.backend.submit(&request).await?;
        if let Some(err) = &result.error {
            warn!(%err, "submit rejected");
            self.alert(err.clone());
            return Ok(());
        }
        // Already scored server-side: the result renders even without a next state.
        self.pending = result.next_state().unwrap_or_else(|err| {
            warn!(%err, "undecodable publicState in submit result");
            None
        });
        self.last_result = Some(result.clone());
        info!(
            correct = result.correct,
            event_cleared = result.event_cleared,
            stage_cleared = result.stage_cleared,
            "answer submitted"
        );

        if result.event_cleared || result.stage_cleared {
            self.set_avatar(Mood::Correct);
            if result.stage_cleared {
                if let Some(payload) = result.stage_outro_payload() {
                    self.pending_stage_outro = Some(PendingOutro {
                        payload: payload.clone(),
                        ui: self.stage_outro_ui(),
                    });
                }
            }
            self.adopt_pending_score();

            let transition = if let Some(payload) = result.event_outro_payload().filter(|_| result.event_cleared) {
                let event_title = self
                    .current
                    .as_ref()
                    .and_then(|s| s.current_event_title())
                    .unwrap_or("사건")
                    .to_string();
                Transition {
                    kind: TransitionKind::EventOutro,
                    payload: Some(payload.clone()),
                    ui: StoryUi::new("사건 요약", event_title),
                }
            } else if let Some(payload) = result.stage_outro_payload().filter(|_| result.stage_cleared) {
                Transition {
                    kind: TransitionKind::StageOutro,
                    payload: Some(payload.clone()),
                    ui: self.stage_outro_ui(),
                }
            } else {
                Transition {
                    kind: TransitionKind::Roadmap,
                    payload: None,
                    ui: StoryUi::default(),
                }
            };
            self.post_clear = Some(transition);

            self.render_all();
            self.render_feedback(&result);
            self.push(Ui::NextEnabled(false));
            return Ok(());
        }

        if result.correct {
            self.adopt_pending_score();
            self.set_avatar(Mood::Correct);
            self.render_all();
            self.render_feedback(&result);
            self.push(Ui::NextEnabled(true));
            return Ok(());
        }

        self.set_avatar(Mood::Wrong);
        self.render_all();
        self.render_feedback(&result);
        Ok(())
    }

    // Keep the answered question on screen but show the new score.
    fn adopt_pending_score(&mut self) {
        let score = self.pending.as_ref().map(|p| p.score);
        if let (Some(cur), Some(score)) = (self.current.as_mut(), score) {
            cur.score = score;
        }
    }

    pub async fn start_stage(&mut self, stage_id: &str) -> Result<(), ClientError> {
        self.pending_stage_outro = None;
        if let Err(err) = self.backend.start_stage(stage_id).await {
            self.alert_failure("스테이지를 시작", &err);
            return Ok(());
        }
        if let Err(err) = self.fetch_state().await {
            self.alert_failure("스테이지를 시작", &err);
            return Ok(());
        }
        info!(stage_id, "stage started");

        let intro = self.current.as_ref().and_then(|s| s.stage_intro_payload().cloned());
        match intro {
            Some(payload) => {
                let summary = self.current.as_ref().map(|s| s.summary.clone()).unwrap_or_default();
                let ui = StoryUi::new(self.stage_title_or("스테이지"), summary);
                self.start_story(StoryKind::StageIntro, &payload, ui);
            }
            None => self.show_screen(Screen::Roadmap),
        }
        Ok(())
    }

    async fn select_stage(&mut self, stage_id: &str) -> Result<(), ClientError> {
        if !is_playable_stage(stage_id) {
            self.alert("이 스테이지는 아직 준비 중입니다!");
            return Ok(());
        }
        self.start_stage(stage_id).await
    }

    /// Re-entering a stage already in progress must not rewind it.
    pub async fn resume_or_start_stage(&mut self, stage_id: &str) -> Result<(), ClientError> {
        let existing = self.backend.state().await?;
        let resumable = existing
            .as_ref()
            .is_some_and(|s| !s.stage_title.is_empty())
            && stage_id == self.config.stage_id;
        if !resumable {
            return self.start_stage(stage_id).await;
        }

        self.current = existing;
        let intro = self.current.as_ref().and_then(|s| s.stage_intro_payload().cloned());
        match intro {
            Some(payload) => {
                let summary = self.current.as_ref().map(|s| s.summary.clone()).unwrap_or_default();
                let ui = StoryUi::new(self.stage_title_or("스테이지"), summary);
                self.start_story(StoryKind::StageIntro, &payload, ui);
            }
            None => self.show_screen(Screen::Roadmap),
        }
        Ok(())
    }

    pub async fn start_event(&mut self, event_key: &str) -> Result<(), ClientError> {
        self.set_avatar(Mood::Normal);
        let state = match self.backend.start_event(event_key).await {
            Ok(state) => state,
            Err(err) => {
                self.alert_failure("사건을 시작", &err);
                return Ok(());
            }
        };
        self.current = state;
        if let Some(st) = &self.current {
            let battery = view::battery_view(st);
            self.push(Ui::Battery(battery));
        }
        self.clear_answer_flags();
        self.clear_transitions();
        info!(event_key, "event started");

        let title = self
            .current
            .as_ref()
            .and_then(|s| s.current_event_title())
            .unwrap_or("사건")
            .to_string();
        let intro = self.current.as_ref().and_then(|s| s.event_intro_payload().cloned());
        match intro {
            Some(payload) => self.start_story(StoryKind::EventIntro, &payload, StoryUi::new(title, "사건 배경")),
            None => {
                self.show_screen(Screen::Quiz);
                self.render_all();
            }
        }
        Ok(())
    }

    /// Jump the server back to `event_key` after a review, without any UI
    /// beyond the battery HUD.
    pub async fn restore_progress_event_silently(&mut self, event_key: &str) {
        let state = match self.backend.start_event(event_key).await {
            Ok(state) => state,
            Err(err) => {
                warn!(%err, event_key, "could not restore progress event");
                return;
            }
        };
        self.current = state;
        self.clear_answer_flags();
        self.clear_transitions();
        if let Some(st) = &self.current {
            let battery = view::battery_view(st);
            self.push(Ui::Battery(battery));
        }
    }

    async fn event_intro_back(&mut self) -> Result<(), ClientError> {
        if let Some(key) = self.review_return_key.take() {
            self.restore_progress_event_silently(&key).await;
        }
        self.fetch_state().await?;
        self.show_screen(Screen::Roadmap);
        Ok(())
    }

    async fn open_roadmap_card(&mut self, index: usize) -> Result<(), ClientError> {
        let Some(state) = &self.current else {
            return Ok(());
        };
        let Some(ev) = catalog::event_by_index(index) else {
            return Ok(());
        };
        let cleared = roadmap::cleared_map(state);
        match roadmap::event_status(index, &cleared) {
            EventStatus::Locked => Ok(()),
            // Calling start_event here could rewind the server, so replay
            // the intro from the cached state instead.
            EventStatus::Active => {
                let title = state.current_event_title().unwrap_or(ev.title).to_string();
                match state.event_intro_payload().cloned() {
                    Some(payload) => {
                        self.start_story(StoryKind::EventIntro, &payload, StoryUi::new(title, "사건 배경"))
                    }
                    None => {
                        self.show_screen(Screen::Quiz);
                        self.render_all();
                    }
                }
                Ok(())
            }
            EventStatus::Completed => {
                self.review_return_key = roadmap::next_uncleared_event_key(state);
                self.start_event(ev.key).await
            }
        }
    }

    /// Show the next question. A pending state from the last submit is used
    /// as is; otherwise the state is refetched with `GET /api/state`.
    ///
    /// With `next_endpoint` set, `POST /api/next` is tried first. A server
    /// that lacks the route then costs a second round trip for the refetch.
    pub async fn go_next(&mut self) -> Result<(), ClientError> {
        self.set_avatar(Mood::Normal);
        if let Some(next) = self.pending.take() {
            self.current = Some(next);
            self.clear_answer_flags();
            self.render_all();
            return Ok(());
        }

        if !self.config.next_endpoint {
            self.fetch_state().await?;
        } else {
            match self.backend.next().await {
                Ok(state) => self.adopt_fetched(state),
                Err(err) if err.is_server() => {
                    debug!(%err, "next unavailable, refreshing state");
                    self.fetch_state().await?;
                }
                Err(err) => return Err(err),
            }
        }
        self.clear_answer_flags();
        self.render_all();
        Ok(())
    }

    pub async fn go_roadmap_safe(&mut self) -> Result<(), ClientError> {
        self.show_screen(Screen::Roadmap);
        self.set_avatar(Mood::Normal);
        self.clear_transitions();
        self.fetch_state().await?;
        self.render_roadmap();
        Ok(())
    }

    pub async fn reset_stage_silently(&mut self) -> Result<(), ClientError> {
        self.pending_stage_outro = None;
        self.backend.reset().await?;
        self.current = None;
        self.clear_answer_flags();
        self.clear_transitions();
        self.review_return_key = None;
        self.fetch_state().await
    }

    pub fn show_hint(&mut self) {
        let Some(q) = self.current.as_ref().and_then(|s| s.question.as_ref()) else {
            return;
        };
        let msg = if q.has_hint && !q.hint.is_empty() {
            format!("힌트: {}", q.hint)
        } else {
            "이 문제에는 별도의 힌트가 없습니다.".to_string()
        };
        self.alert(msg);
    }
}
