//! Client settings derived from the page URL.

use crate::catalog::DEFAULT_STAGE_ID;

pub const DEV_TOUCHED_KEY: &str = "devTouched";
pub const AVATAR_BASE: &str = "/static/images/Status";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Prefix for every `/api/...` path. Empty means same origin.
    pub api_base: String,
    pub stage_id: String,
    pub dev_mode: bool,
    pub dev_touched_key: String,
    pub avatar_base: String,
    /// The server serves `POST /api/next`. Off by default: the Flask app
    /// only exposes state, submit, start and reset.
    pub next_endpoint: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            stage_id: DEFAULT_STAGE_ID.to_string(),
            dev_mode: false,
            dev_touched_key: DEV_TOUCHED_KEY.to_string(),
            avatar_base: AVATAR_BASE.to_string(),
            next_endpoint: false,
        }
    }
}

impl ClientConfig {
    /// Build from `location.search` (with or without the leading `?`).
    /// Recognised keys: `dev=1`, `api=<base url>`, `next=1`.
    pub fn from_query(search: &str) -> Self {
        let mut cfg = Self::default();
        let query = search.strip_prefix('?').unwrap_or(search);
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "dev" => cfg.dev_mode = value == "1",
                "api" => cfg.api_base = value.trim_end_matches('/').to_string(),
                "next" => cfg.next_endpoint = value == "1",
                _ => {}
            }
        }
        cfg
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }
}
