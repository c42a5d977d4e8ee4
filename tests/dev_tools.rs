// Dev-panel shortcuts against the in-memory server.

mod support;

use futures::executor::block_on;
use keumjjogi::catalog::EVENTS;
use keumjjogi::session::DevAction;
use keumjjogi::view::Screen;
use keumjjogi::{Action, ClientConfig, Session, Ui};
use support::{Answer, FakeServer};

fn dev_session(server: FakeServer) -> Session<FakeServer> {
    let config = ClientConfig {
        dev_mode: true,
        ..Default::default()
    };
    let mut s = Session::new(server, config);
    block_on(s.handle(Action::StartStage("stage1".into()))).unwrap();
    s.drain();
    s
}

fn dev(s: &mut Session<FakeServer>, action: DevAction) -> Vec<Ui> {
    block_on(s.handle(Action::Dev(action))).unwrap();
    s.drain()
}

fn logs(effects: &[Ui]) -> Vec<&str> {
    effects
        .iter()
        .filter_map(|ui| match ui {
            Ui::DevLog(msg) => Some(msg.as_str()),
            _ => None,
        })
        .collect()
}

fn submits(s: &Session<FakeServer>) -> usize {
    s.backend().calls().iter().filter(|c| *c == "submit").count()
}

#[test]
fn solve_one_tries_options_until_correct() {
    let mut s = dev_session(FakeServer::uniform(2).without_intros());
    let result = block_on(s.auto_solve_one()).unwrap().unwrap();
    assert!(result.correct);
    assert_eq!(submits(&s), 2);
    assert_eq!(s.backend().current_index(), 1);
    assert_eq!(s.screen(), Screen::Quiz);

    let fx = s.drain();
    assert!(fx.contains(&Ui::DevTouched(true)));
    let log = logs(&fx);
    assert!(log[0].starts_with("try=0\ncorrect=false"));
    assert!(log[1].starts_with("try=1\ncorrect=true"));
}

#[test]
fn solve_one_skips_short_answer() {
    let mut s = dev_session(FakeServer::new(vec![vec![Answer::Text("금본위제")]]).without_intros());
    assert!(block_on(s.auto_solve_one()).unwrap().is_none());
    assert_eq!(submits(&s), 0);
    assert_eq!(logs(&s.drain()), vec!["주관식은 자동해결 불가(현재는)."]);
}

#[test]
fn solve_event_stops_at_event_clear() {
    let mut s = dev_session(FakeServer::uniform(3).without_intros());
    let fx = dev(&mut s, DevAction::SolveEvent);
    assert_eq!(s.backend().current_index(), 3);
    assert_eq!(submits(&s), 6);
    assert!(s.pending_stage_outro().is_none());
    assert_eq!(logs(&fx).last().copied(), Some("autoSolveEvent done"));
}

#[test]
fn solve_stage_clears_everything_and_holds_outro() {
    let mut s = dev_session(FakeServer::uniform(1).without_intros());
    dev(&mut s, DevAction::SolveStage);
    assert_eq!(submits(&s), EVENTS.len() * 2);
    assert!(s.pending_stage_outro().is_some());
    assert!(s.state().unwrap().question.is_none());

    let fx = dev(&mut s, DevAction::GoRoadmap);
    assert_eq!(s.screen(), Screen::Roadmap);
    let shows_outro = fx.iter().any(|ui| matches!(ui, Ui::Roadmap(v) if v.show_stage_outro));
    assert!(shows_outro);
    assert_eq!(logs(&fx), vec!["roadmap"]);
}

#[test]
fn solve_event_gives_up_after_forty_questions() {
    // One long event that never clears within the limit.
    let mut s = dev_session(FakeServer::new(vec![vec![Answer::Choice(0); 50]]).without_intros());
    let fx = dev(&mut s, DevAction::SolveEvent);
    assert_eq!(submits(&s), 40);
    assert_eq!(s.backend().current_index(), 40);
    assert!(s.state().unwrap().question.is_some());
    assert_eq!(logs(&fx).last().copied(), Some("autoSolveEvent done"));
}

#[test]
fn solve_stage_gives_up_after_hundred_twenty_questions() {
    let mut s = dev_session(FakeServer::new(vec![vec![Answer::Choice(0); 130]]).without_intros());
    dev(&mut s, DevAction::SolveStage);
    assert_eq!(submits(&s), 120);
    assert_eq!(s.backend().current_index(), 120);
    assert!(s.pending_stage_outro().is_none());
}

#[test]
fn solve_without_stage_does_nothing() {
    let mut s = Session::new(FakeServer::uniform(1), ClientConfig::default());
    assert!(block_on(s.auto_solve_one()).unwrap().is_none());
    assert_eq!(submits(&s), 0);
}

#[test]
fn reset_stage_drops_progress() {
    let mut s = dev_session(FakeServer::uniform(1).without_intros());
    dev(&mut s, DevAction::SolveStage);
    let fx = dev(&mut s, DevAction::ResetStage);
    assert!(!s.backend().is_started());
    assert!(s.state().is_none());
    assert!(s.pending_stage_outro().is_none());
    assert_eq!(logs(&fx), vec!["stage reset done"]);
}

#[test]
fn dev_boot_shows_panel_and_keeps_state() {
    let config = ClientConfig {
        dev_mode: true,
        ..Default::default()
    };
    let mut s = Session::new(FakeServer::uniform(1), config);
    block_on(keumjjogi::Backend::start_stage(s.backend(), "stage1")).unwrap();

    block_on(s.handle(Action::Boot { dev_touched: true })).unwrap();
    let fx = s.drain();
    assert!(s.backend().is_started());
    assert!(fx.contains(&Ui::DevPanel(true)));
    assert!(!fx.contains(&Ui::DevTouched(false)));
    assert_eq!(logs(&fx), vec!["DEV MODE ON\n(Shift+D 토글)"]);
}
