//! Applies queued `Ui` effects to the page.

use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, HtmlInputElement};

use super::dom::{self, by_id, set_button_label, set_class, set_disabled, set_display, set_text};
use crate::config::ClientConfig;
use crate::roadmap::{EventStatus, RoadmapView};
use crate::session::{Action, StoryView, Ui};
use crate::view::{
    AnswerInput, AvatarRole, BatteryView, FeedbackView, Mood, QuizView, Screen, SummaryView,
};

const LOCK_ICON: &str = r#"<svg viewBox="0 0 24 24"><path d="M7 11V8a5 5 0 0 1 10 0v3"></path><rect x="6" y="11" width="12" height="10" rx="2"></rect></svg>"#;
const CHEVRON_ICON: &str = r#"<svg viewBox="0 0 24 24"><path d="M9 6l6 6-6 6"></path></svg>"#;
const PARTNER_DELAY_MS: i32 = 250;

pub fn apply(effects: &[Ui], config: &ClientConfig) {
    for effect in effects {
        match effect {
            Ui::Screen(screen) => show_screen(*screen),
            Ui::Roadmap(view) => paint_roadmap(view),
            Ui::Quiz(view) => paint_quiz(view),
            Ui::Feedback(view) => paint_feedback(Some(view)),
            Ui::ClearFeedback => paint_feedback(None),
            Ui::Story(view) => paint_story(view),
            Ui::Battery(view) => paint_battery(view),
            Ui::Avatar(mood) => paint_avatar(*mood, &config.avatar_base),
            Ui::NextEnabled(on) => {
                if let Some(btn) = by_id("next-btn") {
                    set_disabled(&btn, !on);
                }
            }
            Ui::Summary(view) => paint_summary(view),
            Ui::Alert(msg) => dom::alert(msg),
            Ui::DevPanel(show) => {
                if let Some(panel) = by_id("dev-panel") {
                    set_display(&panel, if *show { "block" } else { "none" });
                }
            }
            Ui::DevLog(msg) => set_text("dev-log", msg),
            Ui::DevTouched(on) => mark_dev_touched(&config.dev_touched_key, *on),
        }
    }
}

fn show_screen(screen: Screen) {
    let Some(doc) = dom::document() else {
        return;
    };
    if let Ok(list) = doc.query_selector_all(".screen") {
        for i in 0..list.length() {
            if let Some(el) = list.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                set_class(&el, "active", false);
            }
        }
    }
    if let Some(target) = doc.get_element_by_id(&screen.element_id()) {
        set_class(&target, "active", true);
    }
}

fn paint_roadmap(view: &RoadmapView) {
    if let Some(btn) = by_id("roadmap-stage-outro-btn") {
        set_display(&btn, if view.show_stage_outro { "inline-flex" } else { "none" });
    }
    let (Some(doc), Some(container)) = (dom::document(), by_id("event-roadmap")) else {
        return;
    };
    if view.loading {
        container.set_inner_html(
            r#"<div class="event-card locked"><div class="event-title">로드맵 로딩 중…</div><div class="event-meta"><span class="event-pill">잠시만!</span></div></div>"#,
        );
        return;
    }

    container.set_inner_html("");
    for card in &view.cards {
        let Ok(el) = doc.create_element("div") else {
            continue;
        };
        el.set_class_name(&format!("event-card {}", card.status.css_class()));
        let icon = if card.status == EventStatus::Locked { LOCK_ICON } else { CHEVRON_ICON };
        el.set_inner_html(&format!(
            r#"<div class="event-row"><div class="event-left"><div class="event-title"></div><div class="event-meta"><span class="event-pill">{}</span><span class="event-pill">{}</span></div></div><div class="event-right" aria-hidden="true">{icon}</div></div>"#,
            card.status.label(),
            card.progress_label(),
        ));
        if let Ok(Some(title)) = el.query_selector(".event-title") {
            title.set_text_content(Some(card.title));
        }
        if card.clickable() {
            let index = card.index;
            dom::on_click(&el, move |_| super::dispatch(Action::RoadmapCard(index))).ok();
        }
        container.append_child(&el).ok();
    }
}

fn paint_quiz(view: &QuizView) {
    set_text("score", &view.score.to_string());
    set_text("stage-title", &view.stage_title);
    set_text("stage-summary", &view.summary);
    set_text("phase-label", &view.phase_label);
    // Overall progress lives on the roadmap only.
    set_text("progress-label", "");
    if let Some(img) = by_id("quiz-image") {
        dom::set_image(&img, view.image_url.as_deref());
    }
    set_text("question-text", &view.question_text);

    let options = by_id("options-container");
    let short = by_id("short-answer").and_then(|el| el.dyn_into::<HtmlInputElement>().ok());
    if let Some(container) = &options {
        container.set_inner_html("");
    }
    if let Some(input) = &short {
        input.set_value("");
        input.set_disabled(false);
    }

    match &view.input {
        AnswerInput::Choices(opts) => {
            if let Some(input) = &short {
                set_display(input, "none");
            }
            if let (Some(doc), Some(container)) = (dom::document(), &options) {
                for opt in opts {
                    let Ok(btn) = doc.create_element("button") else {
                        continue;
                    };
                    btn.set_text_content(Some(&opt.text));
                    btn.set_attribute("data-index", &opt.index.to_string()).ok();
                    if let Some(mark) = opt.mark {
                        set_class(&btn, mark.css_class(), true);
                    }
                    set_disabled(&btn, opt.disabled);
                    let parent = container.clone();
                    let me = btn.clone();
                    dom::on_click(&btn, move |_| select_option(&parent, &me)).ok();
                    container.append_child(&btn).ok();
                }
            }
        }
        AnswerInput::ShortAnswer { disabled } => {
            if let Some(input) = &short {
                set_display(input, "block");
                input.set_disabled(*disabled);
            }
        }
        AnswerInput::Hidden => {
            if let Some(input) = &short {
                set_display(input, "none");
            }
        }
    }

    if let Some(btn) = by_id("submit-btn") {
        set_disabled(&btn, view.submit.disabled);
        set_class(&btn, "is-retry", view.submit.retry);
        set_button_label(&btn, view.submit.label);
    }
    if let Some(btn) = by_id("next-btn") {
        set_disabled(&btn, !view.next_enabled);
    }
    if view.clear_feedback {
        paint_feedback(None);
    }
}

fn select_option(container: &Element, chosen: &Element) {
    if let Ok(list) = container.query_selector_all("button") {
        for i in 0..list.length() {
            if let Some(el) = list.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                set_class(&el, "selected", false);
            }
        }
    }
    set_class(chosen, "selected", true);
}

/// Currently selected option index and short-answer text.
pub fn read_answer() -> crate::session::SubmitInput {
    let choice = dom::document()
        .and_then(|doc| doc.query_selector("#options-container button.selected").ok().flatten())
        .and_then(|btn| btn.get_attribute("data-index"))
        .and_then(|idx| idx.parse().ok());
    let text = by_id("short-answer")
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        .map(|input| input.value())
        .unwrap_or_default();
    crate::session::SubmitInput { choice, text }
}

fn paint_feedback(view: Option<&FeedbackView>) {
    let Some(fb) = by_id("feedback") else {
        return;
    };
    match view {
        Some(view) => {
            fb.set_text_content(Some(&view.text));
            fb.set_class_name(&format!("feedback {}", view.tone.css_class()));
        }
        None => {
            fb.set_text_content(Some(""));
            fb.set_class_name("feedback");
        }
    }
}

fn paint_story(view: &StoryView) {
    let prefix = view.kind.prefix();
    if let Some(title) = &view.title {
        set_text(&format!("{prefix}-title"), title);
    }
    let subtitle = by_id(&format!("{prefix}-summary")).or_else(|| by_id(&format!("{prefix}-subtitle")));
    if let Some(el) = subtitle {
        el.set_text_content(Some(&view.subtitle));
    }
    set_text(&format!("{prefix}-text"), &view.slide.text);
    if let Some(img) = by_id(&format!("{prefix}-image")) {
        dom::set_image(&img, Some(view.slide.image_url.as_str()));
    }
    if let (Some(label), Some(btn)) = (view.next_label, by_id(&format!("{prefix}-next-btn"))) {
        set_button_label(&btn, label);
    }
}

fn paint_battery(view: &BatteryView) {
    let Some(hud) = by_id("battery-hud") else {
        return;
    };
    hud.set_attribute("data-level", &view.level.to_string()).ok();
    if let (Some(label), Ok(Some(sub))) = (&view.label, hud.query_selector(".battery-sub")) {
        sub.set_text_content(Some(label));
    }
}

fn avatar_box(img: &Element) -> Option<Element> {
    img.closest(".status-item").ok().flatten()
}

fn trigger_reaction(target: &Element, class: &str) {
    target.class_list().remove_3("react", "correct", "wrong").ok();
    // Force a reflow so the CSS animation restarts.
    if let Some(html) = target.dyn_ref::<HtmlElement>() {
        let _ = html.offset_width();
    }
    target.class_list().add_2("react", class).ok();
}

fn paint_avatar(mood: Mood, base: &str) {
    let user = by_id("user-avatar");
    let partner = by_id("partner-avatar");
    for (img, role) in [(&user, AvatarRole::User), (&partner, AvatarRole::Partner)] {
        if let Some(img) = img {
            img.set_attribute("src", &mood.image(role, base)).ok();
        }
    }

    let user_box = user.as_ref().and_then(avatar_box);
    let partner_box = partner.as_ref().and_then(avatar_box);
    match mood.reaction_class() {
        None => {
            for b in [&user_box, &partner_box].into_iter().flatten() {
                b.class_list().remove_3("react", "correct", "wrong").ok();
            }
        }
        Some(class) => {
            if let Some(b) = &user_box {
                trigger_reaction(b, class);
            }
            if let Some(b) = partner_box {
                dom::after(PARTNER_DELAY_MS, move || trigger_reaction(&b, class));
            }
        }
    }
}

fn paint_summary(view: &SummaryView) {
    set_text("summary-stage-title", &view.title);
    set_text("summary-text", &view.summary);
    set_text("final-score", &view.score.to_string());
}

fn mark_dev_touched(key: &str, on: bool) {
    let Some(storage) = dom::local_storage() else {
        return;
    };
    if on {
        storage.set_item(key, "1").ok();
    } else {
        storage.remove_item(key).ok();
    }
}
