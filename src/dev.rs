//! Developer shortcuts, only wired up with `?dev=1`.
//!
//! The solvers brute-force multiple-choice questions against the real
//! server, so they leave real progress behind. Every run sets the
//! `devTouched` flag; a later non-dev page load sees it and resets the stage.

use tracing::info;

use crate::api::{SubmitRequest, SubmitResult};
use crate::client::Backend;
use crate::error::ClientError;
use crate::session::{DevAction, PendingOutro, Session, Ui};
use crate::story::StoryUi;
use crate::view::Screen;

const SOLVE_EVENT_LIMIT: usize = 40;
const SOLVE_STAGE_LIMIT: usize = 120;

impl<B: Backend> Session<B> {
    pub(crate) async fn handle_dev(&mut self, action: DevAction) -> Result<(), ClientError> {
        match action {
            DevAction::Fetch => {
                self.fetch_state().await?;
                self.dev_log("state refreshed");
            }
            DevAction::GoRoadmap => self.go_roadmap_dev().await?,
            DevAction::SolveOne => {
                self.auto_solve_one().await?;
            }
            DevAction::SolveEvent => self.auto_solve_event().await?,
            DevAction::SolveStage => self.auto_solve_stage().await?,
            DevAction::ResetStage => {
                self.reset_stage_silently().await?;
                self.dev_log("stage reset done");
            }
        }
        Ok(())
    }

    fn dev_log(&mut self, msg: impl Into<String>) {
        self.push(Ui::DevLog(msg.into()));
    }

    async fn dev_submit(&mut self, choice_index: usize) -> Result<SubmitResult, ClientError> {
        let result = self
            .backend
            .submit(&SubmitRequest::Choice { choice_index })
            .await?;
        if result.stage_cleared {
            if let Some(payload) = result.stage_outro_payload() {
                let title = self
                    .current
                    .as_ref()
                    .map(|s| s.stage_title.as_str())
                    .filter(|t| !t.is_empty())
                    .unwrap_or("스테이지")
                    .to_string();
                self.pending_stage_outro = Some(PendingOutro {
                    payload: payload.clone(),
                    ui: StoryUi::new(title, "교훈/정리"),
                });
            }
        }
        Ok(result)
    }

    /// Try every option of the current question until one is accepted.
    /// Returns the last submit result, or `None` when nothing was submitted.
    pub async fn auto_solve_one(&mut self) -> Result<Option<SubmitResult>, ClientError> {
        if self.current.is_none() {
            self.fetch_state().await?;
        }
        let Some(question) = self.current.as_ref().and_then(|s| s.question.clone()) else {
            return Ok(None);
        };
        if !question.is_mcq() {
            self.dev_log("주관식은 자동해결 불가(현재는).");
            return Ok(None);
        }

        let mut last = None;
        for i in 0..question.options.len() {
            let result = self.dev_submit(i).await?;
            self.dev_log(format!(
                "try={i}\ncorrect={}\neventCleared={}\nstageCleared={}",
                result.correct, result.event_cleared, result.stage_cleared
            ));
            let done = result.correct || result.event_cleared || result.stage_cleared;
            last = Some(result);
            if done {
                break;
            }
        }

        self.fetch_state().await?;
        self.push(Ui::DevTouched(true));
        self.show_screen(Screen::Quiz);
        self.render_all();
        Ok(last)
    }

    pub async fn auto_solve_event(&mut self) -> Result<(), ClientError> {
        for _ in 0..SOLVE_EVENT_LIMIT {
            let Some(result) = self.auto_solve_one().await? else {
                break;
            };
            if result.event_cleared || self.pending_stage_outro.is_some() {
                break;
            }
            if self.current.as_ref().and_then(|s| s.question.as_ref()).is_none() {
                break;
            }
        }
        info!("auto-solve event finished");
        self.dev_log("autoSolveEvent done");
        Ok(())
    }

    pub async fn auto_solve_stage(&mut self) -> Result<(), ClientError> {
        for _ in 0..SOLVE_STAGE_LIMIT {
            if self.auto_solve_one().await?.is_none() {
                break;
            }
            if self.pending_stage_outro.is_some() {
                break;
            }
            if self.current.as_ref().and_then(|s| s.question.as_ref()).is_none() {
                break;
            }
        }
        info!("auto-solve stage finished");
        self.dev_log("autoSolveStage done (stageOutro pending이면 로드맵 버튼 확인)");
        Ok(())
    }

    async fn go_roadmap_dev(&mut self) -> Result<(), ClientError> {
        self.show_screen(Screen::Roadmap);
        self.fetch_state().await?;
        self.render_roadmap();
        self.dev_log("roadmap");
        Ok(())
    }
}
