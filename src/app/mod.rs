//! Browser entry: binds page controls to session actions.
//!
//! Every click becomes an [`Action`] run on the single [`Session`]. Actions
//! are serialized through an async mutex, so a second click while a request
//! is in flight waits its turn instead of racing the first.

use std::cell::RefCell;
use std::rc::Rc;

use futures::lock::Mutex;
use tracing::error;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, KeyboardEvent, window};

use crate::client::HttpBackend;
use crate::config::ClientConfig;
use crate::logging;
use crate::session::{Action, DevAction, Session};
use crate::story::StoryKind;
use crate::view::Screen;

mod dom;
mod paint;

type SharedSession = Rc<Mutex<Session<HttpBackend>>>;

thread_local! {
    static SESSION: RefCell<Option<SharedSession>> = const { RefCell::new(None) };
}

/// Run `action` on the session and paint whatever it queued.
pub fn dispatch(action: Action) {
    let Some(session) = SESSION.with(|cell| cell.borrow().clone()) else {
        return;
    };
    spawn_local(async move {
        let mut guard = session.lock().await;
        let outcome = guard.handle(action).await;
        let effects = guard.drain();
        let config = guard.config().clone();
        drop(guard);
        paint::apply(&effects, &config);
        if let Err(err) = outcome {
            error!(%err, "action failed");
        }
    });
}

pub fn start() -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let search = win.location().search().unwrap_or_default();
    let config = ClientConfig::from_query(&search);
    logging::init(config.dev_mode);

    let dev_touched = dom::local_storage()
        .and_then(|s| s.get_item(&config.dev_touched_key).ok().flatten())
        .is_some_and(|v| v == "1");

    let session = Session::new(HttpBackend::new(config.clone()), config.clone());
    SESSION.with(|cell| cell.replace(Some(Rc::new(Mutex::new(session)))));

    bind_controls()?;
    if config.dev_mode {
        bind_dev_controls()?;
    }
    dispatch(Action::Boot { dev_touched });
    Ok(())
}

fn bind_action(id: &str, action: Action) -> Result<(), JsValue> {
    dom::bind_click(id, move |_| dispatch(action.clone()))
}

fn bind_controls() -> Result<(), JsValue> {
    bind_action("to-theme-btn", Action::Navigate(Screen::Theme))?;
    bind_action("back-home-from-theme", Action::Navigate(Screen::Home))?;
    bind_action("back-theme-btn", Action::Navigate(Screen::Theme))?;
    bind_action("theme-global-btn", Action::ThemeGlobal)?;

    bind_action("stage-intro-next-btn", Action::StoryNext(StoryKind::StageIntro))?;
    bind_action("stage-intro-skip-btn", Action::StageIntroSkip)?;
    bind_action("event-intro-next-btn", Action::StoryNext(StoryKind::EventIntro))?;
    bind_action("event-intro-back-btn", Action::EventIntroBack)?;
    bind_action("event-outro-next-btn", Action::StoryNext(StoryKind::EventOutro))?;
    bind_action("stage-outro-next-btn", Action::StoryNext(StoryKind::StageOutro))?;
    bind_action("roadmap-stage-outro-btn", Action::WatchStageOutro)?;

    bind_action("back-roadmap-from-quiz", Action::GoRoadmap)?;
    bind_action("summary-to-roadmap-btn", Action::GoRoadmap)?;
    bind_action("summary-restart-btn", Action::SummaryRestart)?;

    dom::bind_click("submit-btn", |_| dispatch(Action::Submit(paint::read_answer())))?;
    bind_action("next-btn", Action::Next)?;
    bind_action("hint-btn", Action::Hint)?;

    if let Some(btn) = dom::by_id("start-stage-btn") {
        let target = btn.clone();
        dom::on_click(&btn, move |_| {
            let stage_id = target
                .get_attribute("data-stage-id")
                .unwrap_or_else(|| crate::catalog::DEFAULT_STAGE_ID.to_string());
            dispatch(Action::StartStage(stage_id));
        })?;
    }

    let Some(doc) = dom::document() else {
        return Ok(());
    };
    let hotspots = doc.query_selector_all(".stage-hotspot")?;
    for i in 0..hotspots.length() {
        let Some(hs) = hotspots.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        let target = hs.clone();
        dom::on_click(&hs, move |_| {
            let stage_id = target.get_attribute("data-stage").unwrap_or_default();
            dispatch(Action::StageHotspot(stage_id));
        })?;
    }
    Ok(())
}

fn toggle_dev_panel() {
    if let Some(panel) = dom::by_id("dev-panel") {
        let shown = dom::is_displayed(&panel);
        dom::set_display(&panel, if shown { "none" } else { "block" });
    }
}

fn bind_dev_controls() -> Result<(), JsValue> {
    dom::bind_click("dev-toggle", |_| toggle_dev_panel())?;
    bind_action("dev-fetch", Action::Dev(DevAction::Fetch))?;
    bind_action("dev-go-roadmap", Action::Dev(DevAction::GoRoadmap))?;
    bind_action("dev-solve-one", Action::Dev(DevAction::SolveOne))?;
    bind_action("dev-solve-event", Action::Dev(DevAction::SolveEvent))?;
    bind_action("dev-solve-stage", Action::Dev(DevAction::SolveStage))?;
    bind_action("dev-reset-stage", Action::Dev(DevAction::ResetStage))?;

    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let closure = Closure::wrap(Box::new(move |evt: KeyboardEvent| {
        if evt.shift_key() && evt.key().eq_ignore_ascii_case("d") {
            toggle_dev_panel();
        }
    }) as Box<dyn FnMut(_)>);
    win.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}
