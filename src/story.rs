//! Intro / outro slideshow sequencing.
//!
//! Narrative payloads arrive in whatever shape the content author used; they
//! are flattened into `Slide`s and stepped through one at a time.

use serde_json::Value;

use crate::view::Screen;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Slide {
    pub text: String,
    pub image_url: String,
    pub title: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoryKind {
    StageIntro,
    EventIntro,
    EventOutro,
    StageOutro,
}

impl StoryKind {
    pub fn screen(self) -> Screen {
        match self {
            StoryKind::StageIntro => Screen::StageIntro,
            StoryKind::EventIntro => Screen::EventIntro,
            StoryKind::EventOutro => Screen::EventOutro,
            StoryKind::StageOutro => Screen::StageOutro,
        }
    }

    /// Prefix of the DOM ids (`<prefix>-title`, `<prefix>-text`, ...).
    pub fn prefix(self) -> &'static str {
        self.screen().name()
    }
}

/// Title / subtitle shown above the slides.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoryUi {
    pub title: String,
    pub subtitle: String,
}

impl StoryUi {
    pub fn new(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
        }
    }
}

fn str_field(obj: &Value, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_default()
}

fn slide_from(obj: &Value) -> Slide {
    if let Value::String(text) = obj {
        return Slide {
            text: text.clone(),
            ..Default::default()
        };
    }
    Slide {
        text: str_field(obj, &["text", "content"]),
        image_url: str_field(obj, &["imageUrl", "img", "image"]),
        title: str_field(obj, &["title"]),
    }
}

pub fn normalize_slides(payload: &Value) -> Vec<Slide> {
    match payload {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().map(slide_from).collect(),
        Value::String(text) => vec![Slide {
            text: text.clone(),
            ..Default::default()
        }],
        Value::Object(map) => match map.get("slides") {
            Some(Value::Array(items)) => items.iter().map(slide_from).collect(),
            _ => vec![slide_from(payload)],
        },
        Value::Bool(_) | Value::Number(_) => Vec::new(),
    }
}

/// Slide cursor for the story currently on screen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Story {
    kind: Option<StoryKind>,
    slides: Vec<Slide>,
    idx: usize,
}

impl Story {
    /// Start at slide 0. An empty payload still yields one blank slide so the
    /// screen has something to advance past.
    pub fn start(kind: StoryKind, payload: &Value) -> Self {
        let mut slides = normalize_slides(payload);
        if slides.is_empty() {
            slides.push(Slide::default());
        }
        Self {
            kind: Some(kind),
            slides,
            idx: 0,
        }
    }

    pub fn kind(&self) -> Option<StoryKind> {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn current(&self) -> Slide {
        self.slides.get(self.idx).cloned().unwrap_or_default()
    }

    pub fn is_last(&self) -> bool {
        self.idx + 1 >= self.slides.len().max(1)
    }

    /// Move to the next slide. Returns `true` once the story is finished.
    pub fn advance(&mut self) -> bool {
        if self.slides.is_empty() {
            return true;
        }
        self.idx += 1;
        self.idx >= self.slides.len()
    }

    pub fn progress_label(&self, base: &str) -> String {
        let n = self.idx + 1;
        let total = self.slides.len().max(1);
        if base.is_empty() {
            format!("{n}/{total}")
        } else {
            format!("{base}  ·  {n}/{total}")
        }
    }

    /// Label for the event-intro "next" button; other stories keep theirs.
    pub fn next_label(&self) -> Option<&'static str> {
        match self.kind {
            Some(StoryKind::EventIntro) if self.is_last() => Some("퀴즈 시작"),
            Some(StoryKind::EventIntro) => Some("다음"),
            _ => None,
        }
    }
}
