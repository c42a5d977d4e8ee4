use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    pub fn js(err: JsValue) -> Self {
        ClientError::Transport(err.as_string().unwrap_or_else(|| format!("{err:?}")))
    }

    /// The server answered but refused; anything else failed on our side.
    pub fn is_server(&self) -> bool {
        matches!(self, ClientError::Status { .. })
    }
}

impl From<ClientError> for JsValue {
    fn from(err: ClientError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
