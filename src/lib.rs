//! Keumjjogi client crate.
//!
//! Browser controller for the Keumjjogi financial-history quiz. The server
//! owns questions, scoring and progression; this crate renders its JSON,
//! forwards player actions, and sequences the screens in between (story
//! slides, roadmap, quiz, retry / summary transitions).
//!
//! Decision logic lives in plain modules (`session`, `roadmap`, `story`,
//! `view`) that run on the host under `cargo test`; `app` is the web-sys
//! glue that paints their output.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

pub mod api;
mod app;
pub mod catalog;
pub mod client;
pub mod config;
mod dev;
pub mod error;
pub mod logging;
pub mod roadmap;
pub mod session;
pub mod story;
pub mod view;

pub use client::{Backend, HttpBackend};
pub use config::ClientConfig;
pub use error::ClientError;
pub use session::{Action, Session, SubmitInput, Ui};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() -> Result<(), JsValue> {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    let Some(doc) = web_sys::window().and_then(|w| w.document()) else {
        return Ok(());
    };
    if doc.body().is_some() {
        return app::start();
    }
    // Classic script in <head>: wait for the controls to exist.
    let closure = Closure::once_into_js(|| {
        if let Err(err) = app::start() {
            web_sys::console::error_1(&err);
        }
    });
    doc.add_event_listener_with_callback("DOMContentLoaded", closure.unchecked_ref())?;
    Ok(())
}
