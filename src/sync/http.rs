//! Blocking HTTP backend built on a cookie-keeping `ureq` agent.

use super::Backend;
use crate::error::{EditorError, Result};
use crate::i18n::{LanguageList, LocaleSource};
use crate::types::{Ack, AuthStatus, Category, LoginReply, ServerStatus};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

/// Talks to the plugin's web server. The session cookie set by
/// `/api/auth/login` is kept by the agent and sent on later requests.
pub struct HttpBackend {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn get_json(&self, endpoint: &str) -> Result<Value> {
        tracing::debug!(endpoint, "GET");
        self.agent
            .get(&self.url(endpoint))
            .call()
            .map_err(Self::convert_error)?
            .into_json::<Value>()
            .map_err(|e| EditorError::Json(e.to_string()))
    }

    fn post_json(&self, endpoint: &str, body: &Value) -> Result<Value> {
        tracing::debug!(endpoint, "POST");
        let response = self
            .agent
            .post(&self.url(endpoint))
            .set("Content-Type", "application/json")
            .send_json(body)
            .map_err(Self::convert_error)?;

        // Some endpoints answer with an empty body.
        let text = response.into_string()?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Map a ureq failure, pulling `error`/`message` out of JSON bodies.
    fn convert_error(e: ureq::Error) -> EditorError {
        match e {
            ureq::Error::Status(code, response) => {
                let body = response.into_string().unwrap_or_default();
                let message = serde_json::from_str::<Value>(&body)
                    .ok()
                    .and_then(|v| {
                        v.get("error")
                            .or_else(|| v.get("message"))
                            .and_then(Value::as_str)
                            .map(str::to_string)
                    })
                    .unwrap_or(body);
                EditorError::Status { code, message }
            }
            other => EditorError::Network(other.to_string()),
        }
    }

    /// `{success, data}` envelopes yield `data`; anything else is the payload.
    fn unwrap_data(value: Value) -> Value {
        match value {
            Value::Object(mut map) if map.contains_key("success") && map.contains_key("data") => {
                map.remove("data").unwrap_or(Value::Null)
            }
            other => other,
        }
    }

    fn parse<T: DeserializeOwned>(value: Value) -> Result<T> {
        Ok(serde_json::from_value(value)?)
    }

    fn ack(value: Value) -> Result<Ack> {
        let ack: Ack = if value.is_null() {
            Ack {
                success: true,
                message: None,
            }
        } else {
            Self::parse(value)?
        };
        if ack.success {
            Ok(ack)
        } else {
            Err(EditorError::Rejected(
                ack.message.unwrap_or_else(|| "request rejected".to_string()),
            ))
        }
    }
}

impl LocaleSource for HttpBackend {
    fn fetch_locale(&self, code: &str) -> Result<HashMap<String, String>> {
        Self::parse(self.get_json(&format!("/lang/{code}.json"))?)
    }

    fn fetch_language_list(&self) -> Result<LanguageList> {
        Self::parse(self.get_json("/lang/languages.json")?)
    }
}

impl Backend for HttpBackend {
    fn validate_session(&self) -> Result<AuthStatus> {
        Self::parse(self.get_json("/api/auth/validate")?)
    }

    fn login(&self, token: &str) -> Result<LoginReply> {
        match self.post_json("/api/auth/login", &json!({ "token": token })) {
            Ok(value) => Self::parse(value),
            Err(EditorError::Status { code: 400 | 401, message }) => Err(EditorError::AuthFailed(message)),
            Err(e) => Err(e),
        }
    }

    fn logout(&self) -> Result<()> {
        self.post_json("/api/auth/logout", &json!({})).map(|_| ())
    }

    fn fetch_document(&self, category: Category) -> Result<Value> {
        let value = self.get_json(&format!("/api/{}/get", category.api_segment()))?;
        Ok(Self::unwrap_data(value))
    }

    fn save_document(&self, category: Category, doc: &Value) -> Result<Ack> {
        let body = json!({ "data": doc });
        Self::ack(self.post_json(&format!("/api/{}/save", category.api_segment()), &body)?)
    }

    fn fetch_language(&self) -> Result<Option<String>> {
        let value = self.get_json("/api/language/get")?;
        Ok(value
            .get("language")
            .and_then(Value::as_str)
            .filter(|code| !code.is_empty())
            .map(str::to_string))
    }

    fn save_language(&self, code: &str) -> Result<()> {
        self.post_json("/api/language/save", &json!({ "language": code }))
            .map(|_| ())
    }

    fn fetch_status(&self) -> Result<ServerStatus> {
        Self::parse(Self::unwrap_data(self.get_json("/api/status")?))
    }

    fn reload(&self) -> Result<Ack> {
        Self::ack(self.post_json("/api/reload", &json!({}))?)
    }
}
