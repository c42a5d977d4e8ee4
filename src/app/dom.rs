//! Thin web-sys helpers. Missing elements are skipped so partial pages
//! (e.g. without the dev panel) still work.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, Storage, window};

pub fn document() -> Option<Document> {
    window().and_then(|w| w.document())
}

pub fn by_id(id: &str) -> Option<Element> {
    document()?.get_element_by_id(id)
}

pub fn set_text(id: &str, text: &str) {
    if let Some(el) = by_id(id) {
        el.set_text_content(Some(text));
    }
}

pub fn set_display(el: &Element, display: &str) {
    if let Some(html) = el.dyn_ref::<HtmlElement>() {
        html.style().set_property("display", display).ok();
    }
}

pub fn is_displayed(el: &Element) -> bool {
    el.dyn_ref::<HtmlElement>()
        .and_then(|h| h.style().get_property_value("display").ok())
        .is_some_and(|d| d != "none")
}

/// Buttons carry a `.btn-label` span next to their icon; plain buttons get
/// the text directly.
pub fn set_button_label(btn: &Element, text: &str) {
    match btn.query_selector(".btn-label").ok().flatten() {
        Some(label) => label.set_text_content(Some(text)),
        None => btn.set_text_content(Some(text)),
    }
}

pub fn set_class(el: &Element, class: &str, on: bool) {
    let list = el.class_list();
    if on {
        list.add_1(class).ok();
    } else {
        list.remove_1(class).ok();
    }
}

pub fn set_disabled(el: &Element, disabled: bool) {
    if disabled {
        el.set_attribute("disabled", "").ok();
    } else {
        el.remove_attribute("disabled").ok();
    }
}

/// Show `url` in an `<img>`, or hide it entirely when there is none.
pub fn set_image(el: &Element, url: Option<&str>) {
    match url.filter(|u| !u.is_empty()) {
        Some(url) => {
            el.set_attribute("src", url).ok();
            set_display(el, "block");
        }
        None => {
            el.remove_attribute("src").ok();
            set_display(el, "none");
        }
    }
}

pub fn alert(msg: &str) {
    if let Some(w) = window() {
        w.alert_with_message(msg).ok();
    }
}

pub fn local_storage() -> Option<Storage> {
    window()?.local_storage().ok().flatten()
}

pub fn on_click<F>(el: &Element, handler: F) -> Result<(), JsValue>
where
    F: FnMut(web_sys::MouseEvent) + 'static,
{
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::MouseEvent)>);
    el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

pub fn bind_click<F>(id: &str, handler: F) -> Result<(), JsValue>
where
    F: FnMut(web_sys::MouseEvent) + 'static,
{
    match by_id(id) {
        Some(el) => on_click(&el, handler),
        None => Ok(()),
    }
}

/// Run `f` once after `ms` milliseconds.
pub fn after(ms: i32, f: impl FnOnce() + 'static) {
    let Some(w) = window() else {
        return;
    };
    let cb = Closure::once_into_js(f);
    w.set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), ms)
        .ok();
}
