// Browser smoke tests: `wasm-pack test --headless --firefox`.

#![cfg(target_arch = "wasm32")]

use keumjjogi::logging;
use keumjjogi::{ClientConfig, HttpBackend, Session};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn console_logging_installs_once() {
    logging::init(true);
    // A second page-level init must not panic.
    logging::init(false);
    tracing::info!("console subscriber ready");
}

#[wasm_bindgen_test]
fn session_starts_on_home_screen() {
    let config = ClientConfig::from_query("?dev=1");
    let session = Session::new(HttpBackend::new(config.clone()), config);
    assert!(session.config().dev_mode);
    assert!(session.state().is_none());
}
