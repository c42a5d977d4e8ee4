//! Fixed roadmap catalog for stage 1.
//!
//! The server owns question content and progression; the client only needs
//! the ordered list of events to lay out the roadmap cards.

/// One roadmap entry: the server-side event key plus its display title.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventDef {
    pub key: &'static str,
    pub title: &'static str,
}

/// Questions per event. Progress pills and the battery HUD are scaled to this.
pub const QUESTIONS_PER_EVENT: usize = 5;

/// The only stage with content on the server right now.
pub const DEFAULT_STAGE_ID: &str = "stage1";

pub const PLAYABLE_STAGES: &[&str] = &[DEFAULT_STAGE_ID];

pub const EVENTS: &[EventDef] = &[
    EventDef { key: "1_the_great_depression_1929", title: "1929 대공황" },
    EventDef { key: "2_bretton_woods_1944", title: "1944 브레튼우즈 체제" },
    EventDef { key: "3_nixon_shock_1971", title: "1971 닉슨 쇼크" },
    EventDef { key: "4_japan_bubble_burst", title: "일본 버블 붕괴" },
    EventDef { key: "5_black_monday_1987", title: "1987 블랙 먼데이" },
    EventDef { key: "6_asian_financial_crisis_1997", title: "1997 아시아 외환위기" },
    EventDef { key: "7_dotcom_bubble_2000", title: "2000 닷컴 버블" },
    EventDef { key: "8_global_financial_crisis_2008", title: "2008 글로벌 금융위기" },
    EventDef { key: "9_eurozone_debt_crisis_2010_2012", title: "유럽 재정위기" },
    EventDef { key: "r10_covid_liquidity_rally_2020", title: "2020 코로나 유동성 랠리" },
];

pub fn event_by_index(index: usize) -> Option<&'static EventDef> {
    EVENTS.get(index)
}

pub fn is_playable_stage(stage_id: &str) -> bool {
    PLAYABLE_STAGES.contains(&stage_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_has_ten_unique_events() {
        assert_eq!(EVENTS.len(), 10);
        let keys: HashSet<&str> = EVENTS.iter().map(|e| e.key).collect();
        assert_eq!(keys.len(), EVENTS.len());
        assert!(EVENTS.iter().all(|e| !e.title.is_empty()));
    }

    #[test]
    fn only_stage_one_is_playable() {
        assert!(is_playable_stage("stage1"));
        assert!(!is_playable_stage("stage2"));
        assert!(event_by_index(10).is_none());
    }
}
