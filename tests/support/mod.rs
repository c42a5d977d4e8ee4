// In-memory stand-in for the quiz server's REST surface.
//
// Mirrors the server's observable rules: a correct answer advances, the last
// question of an event clears it, clearing every event clears the stage, and
// a repeated start_stage for the running stage keeps progress.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;

use keumjjogi::api::{self, PublicState, SubmitRequest, SubmitResult};
use keumjjogi::catalog::EVENTS;
use keumjjogi::{Backend, ClientError};
use serde_json::{Value, json};

#[derive(Clone, Debug)]
pub enum Answer {
    Choice(usize),
    Text(&'static str),
}

#[derive(Clone, Debug)]
struct Q {
    event: usize,
    answer: Answer,
}

#[derive(Default)]
struct Inner {
    stage_id: Option<String>,
    questions: Vec<Q>,
    event_count: usize,
    event_starts: Vec<usize>,
    current: usize,
    score: i64,
    cleared: HashSet<usize>,
    calls: Vec<String>,
    with_intros: bool,
    next_supported: bool,
    fail_start_event: bool,
    no_event_outro: bool,
    no_stage_outro: bool,
    garbled_next_state: bool,
}

pub struct FakeServer {
    inner: RefCell<Inner>,
}

impl FakeServer {
    /// `per_event[i]` lists the answers for catalog event `i`.
    pub fn new(per_event: Vec<Vec<Answer>>) -> Self {
        let mut questions = Vec::new();
        let mut event_starts = Vec::new();
        for (event, answers) in per_event.iter().enumerate() {
            event_starts.push(questions.len());
            for answer in answers {
                questions.push(Q { event, answer: answer.clone() });
            }
        }
        Self {
            inner: RefCell::new(Inner {
                questions,
                event_count: per_event.len(),
                event_starts,
                with_intros: true,
                ..Default::default()
            }),
        }
    }

    /// Every catalog event with `n` multiple-choice questions answered by option 1.
    pub fn uniform(n: usize) -> Self {
        Self::new((0..EVENTS.len()).map(|_| vec![Answer::Choice(1); n]).collect())
    }

    pub fn without_intros(self) -> Self {
        self.inner.borrow_mut().with_intros = false;
        self
    }

    pub fn with_next_endpoint(self) -> Self {
        self.inner.borrow_mut().next_supported = true;
        self
    }

    /// Event clears come back without an `eventOutro` payload.
    pub fn without_event_outro(self) -> Self {
        self.inner.borrow_mut().no_event_outro = true;
        self
    }

    /// Stage clears come back without a `stageOutro` payload.
    pub fn without_stage_outro(self) -> Self {
        self.inner.borrow_mut().no_stage_outro = true;
        self
    }

    /// Submit results carry a `publicState` that does not decode.
    pub fn with_garbled_next_state(self) -> Self {
        self.inner.borrow_mut().garbled_next_state = true;
        self
    }

    pub fn failing_start_event(self) -> Self {
        self.inner.borrow_mut().fail_start_event = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.borrow().calls.clone()
    }

    pub fn current_index(&self) -> usize {
        self.inner.borrow().current
    }

    pub fn is_started(&self) -> bool {
        self.inner.borrow().stage_id.is_some()
    }

    fn log(&self, call: &str) {
        self.inner.borrow_mut().calls.push(call.to_string());
    }

    fn raw_state(&self) -> Value {
        let inner = self.inner.borrow();
        if inner.stage_id.is_none() {
            return json!({"status": "NOT_STARTED"});
        }
        let events: Vec<Value> = (0..inner.event_count)
            .map(|i| json!({"key": EVENTS[i].key, "title": EVENTS[i].title, "cleared": inner.cleared.contains(&i)}))
            .collect();
        let (current_event, question) = match inner.questions.get(inner.current) {
            Some(q) => {
                let start = inner.event_starts[q.event];
                let total = inner.questions.iter().filter(|x| x.event == q.event).count();
                let intro = inner.with_intros.then(|| json!([{"text": format!("{} 배경", EVENTS[q.event].title)}]));
                let kind = match q.answer {
                    Answer::Choice(_) => "mcq",
                    Answer::Text(_) => "short",
                };
                (
                    json!({
                        "eventKey": EVENTS[q.event].key,
                        "title": EVENTS[q.event].title,
                        "eventIndex": inner.current - start,
                        "eventTotal": total,
                        "intro": intro,
                        "outro": {"text": "정리"},
                    }),
                    json!({
                        "id": format!("q{}", inner.current),
                        "type": kind,
                        "text": format!("질문 {}", inner.current),
                        "options": ["가", "나", "다", "라"],
                        "imageUrl": "",
                        "hasHint": inner.current % 2 == 0,
                        "hint": if inner.current % 2 == 0 { "잘 생각해봐" } else { "" },
                        "explanation": "해설입니다",
                    }),
                )
            }
            None => (Value::Null, Value::Null),
        };
        json!({
            "stageTitle": "세계 금융사",
            "summary": "금융 위기의 역사",
            "currentIndex": inner.current,
            "totalQuestions": inner.questions.len(),
            "score": inner.score,
            "stageIntro": if inner.with_intros { json!(["스테이지 시작", "두 번째 장"]) } else { Value::Null },
            "stageOutro": [{"text": "교훈"}],
            "events": events,
            "currentEvent": current_event,
            "question": question,
        })
    }

    fn state_value(&self) -> Result<Option<PublicState>, ClientError> {
        Ok(api::parse_state(self.raw_state())?)
    }
}

impl Backend for FakeServer {
    async fn state(&self) -> Result<Option<PublicState>, ClientError> {
        self.log("state");
        self.state_value()
    }

    async fn submit(&self, answer: &SubmitRequest) -> Result<SubmitResult, ClientError> {
        self.log("submit");
        if self.inner.borrow().stage_id.is_none() {
            return Err(ClientError::Status { status: 400, message: "Stage not started".into() });
        }
        let (no_event_outro, no_stage_outro, garbled) = {
            let inner = self.inner.borrow();
            (inner.no_event_outro, inner.no_stage_outro, inner.garbled_next_state)
        };
        let (correct, correct_idx, event_cleared, stage_cleared) = {
            let mut inner = self.inner.borrow_mut();
            let Some(q) = inner.questions.get(inner.current).cloned() else {
                drop(inner);
                let raw = json!({"error": "No active question", "publicState": self.raw_state()});
                return Ok(serde_json::from_value(raw)?);
            };
            let correct = match (&q.answer, answer) {
                (Answer::Choice(a), SubmitRequest::Choice { choice_index }) => a == choice_index,
                (Answer::Text(a), SubmitRequest::Text { answer }) => a == answer,
                _ => false,
            };
            let correct_idx = match q.answer {
                Answer::Choice(a) => Some(a),
                Answer::Text(_) => None,
            };
            let mut event_cleared = false;
            let mut stage_cleared = false;
            if correct {
                inner.score += 1;
                inner.current += 1;
                let last_of_event = inner.questions.get(inner.current).is_none_or(|n| n.event != q.event);
                if last_of_event {
                    event_cleared = true;
                    inner.cleared.insert(q.event);
                    stage_cleared = inner.cleared.len() >= inner.event_count;
                }
            }
            (correct, correct_idx, event_cleared, stage_cleared)
        };
        let raw = json!({
            "correct": correct,
            "correctChoiceIndex": correct_idx,
            "eventCleared": event_cleared,
            "eventOutro": if event_cleared && !no_event_outro { json!([{"text": "사건 정리"}]) } else { Value::Null },
            "stageCleared": stage_cleared,
            "stageOutro": if stage_cleared && !no_stage_outro { json!([{"text": "교훈"}]) } else { Value::Null },
            "score": self.inner.borrow().score,
            "publicState": if garbled { json!({"score": "many"}) } else { self.raw_state() },
        });
        Ok(serde_json::from_value(raw)?)
    }

    async fn start_stage(&self, stage_id: &str) -> Result<Option<PublicState>, ClientError> {
        self.log("start_stage");
        {
            let mut inner = self.inner.borrow_mut();
            if inner.stage_id.as_deref() != Some(stage_id) {
                inner.stage_id = Some(stage_id.to_string());
                inner.current = 0;
                inner.score = 0;
                inner.cleared.clear();
            }
        }
        self.state_value()
    }

    async fn start_event(&self, event_key: &str) -> Result<Option<PublicState>, ClientError> {
        self.log(&format!("start_event:{event_key}"));
        {
            let mut inner = self.inner.borrow_mut();
            if inner.fail_start_event {
                return Err(ClientError::Status { status: 400, message: "Invalid event key".into() });
            }
            let Some(idx) = EVENTS[..inner.event_count].iter().position(|e| e.key == event_key) else {
                return Err(ClientError::Status { status: 400, message: "Invalid event key".into() });
            };
            inner.current = inner.event_starts[idx];
        }
        self.state_value()
    }

    async fn next(&self) -> Result<Option<PublicState>, ClientError> {
        self.log("next");
        if !self.inner.borrow().next_supported {
            return Err(ClientError::Status { status: 404, message: "NOT FOUND".into() });
        }
        self.state_value()
    }

    async fn reset(&self) -> Result<(), ClientError> {
        self.log("reset");
        let mut inner = self.inner.borrow_mut();
        inner.stage_id = None;
        inner.current = 0;
        inner.score = 0;
        inner.cleared.clear();
        Ok(())
    }
}
