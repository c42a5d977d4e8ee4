//! Roadmap screen: which events are done, which one is next, and how far
//! into the current one the player is.

use std::collections::HashMap;

use crate::api::PublicState;
use crate::catalog::{EVENTS, QUESTIONS_PER_EVENT};

pub type ClearedMap = HashMap<String, bool>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventStatus {
    Locked,
    Active,
    Completed,
}

impl EventStatus {
    pub fn css_class(self) -> &'static str {
        match self {
            EventStatus::Locked => "locked",
            EventStatus::Active => "active",
            EventStatus::Completed => "completed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EventStatus::Locked => "잠김",
            EventStatus::Active => "계속하기",
            EventStatus::Completed => "복습하기",
        }
    }
}

/// Build the key -> cleared lookup. `events[]` is authoritative when present,
/// otherwise the first legacy list the server sent is used, even when empty.
pub fn cleared_map(state: &PublicState) -> ClearedMap {
    if let Some(events) = &state.events {
        return events
            .iter()
            .filter(|ev| !ev.key.is_empty())
            .map(|ev| (ev.key.clone(), ev.cleared))
            .collect();
    }
    [&state.cleared_events, &state.completed_events]
        .into_iter()
        .find_map(|list| list.as_ref())
        .map(|list| list.iter().map(|k| (k.clone(), true)).collect())
        .unwrap_or_default()
}

fn is_cleared(cleared: &ClearedMap, key: &str) -> bool {
    cleared.get(key).copied().unwrap_or(false)
}

pub fn event_status(index: usize, cleared: &ClearedMap) -> EventStatus {
    if index >= EVENTS.len() {
        return EventStatus::Locked;
    }
    match EVENTS.iter().position(|ev| !is_cleared(cleared, ev.key)) {
        None => EventStatus::Completed,
        Some(next) if index < next => EventStatus::Completed,
        Some(next) if index == next => EventStatus::Active,
        Some(_) => EventStatus::Locked,
    }
}

/// Answered questions for the event at `index`, in `0..=QUESTIONS_PER_EVENT`.
pub fn event_progress(index: usize, state: &PublicState, cleared: &ClearedMap) -> usize {
    let Some(ev) = EVENTS.get(index) else {
        let start = index * QUESTIONS_PER_EVENT;
        return (state.current_index + 1)
            .saturating_sub(start)
            .min(QUESTIONS_PER_EVENT);
    };
    if is_cleared(cleared, ev.key) {
        return QUESTIONS_PER_EVENT;
    }
    match &state.current_event {
        Some(ce) if ce.event_key == ev.key => (ce.event_index + 1).clamp(1, QUESTIONS_PER_EVENT),
        _ => 0,
    }
}

/// First event the server reports as not cleared.
pub fn next_uncleared_event_key(state: &PublicState) -> Option<String> {
    state
        .events
        .as_ref()?
        .iter()
        .find(|ev| !ev.key.is_empty() && !ev.cleared)
        .map(|ev| ev.key.clone())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoadmapCard {
    pub index: usize,
    pub key: &'static str,
    pub title: &'static str,
    pub status: EventStatus,
    pub progress: usize,
}

impl RoadmapCard {
    pub fn progress_label(&self) -> String {
        format!("{} / {}", self.progress, QUESTIONS_PER_EVENT)
    }

    pub fn clickable(&self) -> bool {
        self.status != EventStatus::Locked
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoadmapView {
    /// No state fetched yet: show the loading placeholder instead of cards.
    pub loading: bool,
    pub cards: Vec<RoadmapCard>,
    pub show_stage_outro: bool,
}

pub fn roadmap_view(state: Option<&PublicState>, show_stage_outro: bool) -> RoadmapView {
    let Some(state) = state else {
        return RoadmapView {
            loading: true,
            cards: Vec::new(),
            show_stage_outro,
        };
    };
    let cleared = cleared_map(state);
    let cards = EVENTS
        .iter()
        .enumerate()
        .map(|(index, ev)| RoadmapCard {
            index,
            key: ev.key,
            title: ev.title,
            status: event_status(index, &cleared),
            progress: event_progress(index, state, &cleared),
        })
        .collect();
    RoadmapView {
        loading: false,
        cards,
        show_stage_outro,
    }
}
