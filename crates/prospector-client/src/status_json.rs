use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

const FAVICON_PREFIX: &str = "data:image/png;base64,";

/// What a server reports about itself in its status response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerStatusInfo {
    pub version_name: String,
    pub protocol_version: i32,
    pub player_count: i32,
    pub player_limit: i32,
    /// Plain text of the MOTD, with nested `extra` parts concatenated.
    pub description: String,
    /// The raw favicon data URI, if any.
    pub favicon: Option<String>,
    pub enforces_secure_chat: bool,
    pub prevents_chat_reports: bool,
    /// Round trip from ping to pong.
    pub latency_ms: u64,
}

impl ServerStatusInfo {
    /// Decoded PNG bytes of the favicon.
    pub fn favicon_png(&self) -> Option<Vec<u8>> {
        let favicon = self.favicon.as_deref()?;
        let data = favicon.strip_prefix(FAVICON_PREFIX).unwrap_or(favicon);
        // servers sometimes wrap the base64 body
        let data: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        match BASE64.decode(data) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                debug!("Ignoring undecodable favicon: {}", e);
                None
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StatusJsonError {
    #[error("status body is not JSON: {0}")]
    Syntax(#[from] serde_json::Error),
    #[error("status body is not a JSON object")]
    NotAnObject,
}

/// Parses the body of a status response.
pub trait StatusJsonParser: Send + Sync {
    fn parse(&self, json: &str) -> Result<ServerStatusInfo, StatusJsonError>;
}

/// `serde_json` parser. Individual fields that are missing or mistyped keep their
/// zero value; only a body that is not a JSON object fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonStatusParser;

impl StatusJsonParser for JsonStatusParser {
    fn parse(&self, json: &str) -> Result<ServerStatusInfo, StatusJsonError> {
        let root: Value = serde_json::from_str(json)?;
        if !root.is_object() {
            return Err(StatusJsonError::NotAnObject);
        }
        Ok(ServerStatusInfo {
            version_name: string_at(&root, &["version", "name"]).unwrap_or_default(),
            protocol_version: int_at(&root, &["version", "protocol"]).unwrap_or_default(),
            player_count: int_at(&root, &["players", "online"]).unwrap_or_default(),
            player_limit: int_at(&root, &["players", "max"]).unwrap_or_default(),
            description: root.get("description").map(flatten_text).unwrap_or_default(),
            favicon: string_at(&root, &["favicon"]),
            enforces_secure_chat: bool_at(&root, &["enforcesSecureChat"]).unwrap_or_default(),
            prevents_chat_reports: bool_at(&root, &["preventsChatReports"]).unwrap_or_default(),
            latency_ms: 0,
        })
    }
}

fn lookup<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(root, |value, key| value.get(key))
}

fn typed_at<'a, T>(root: &'a Value, path: &[&str], convert: impl FnOnce(&'a Value) -> Option<T>) -> Option<T> {
    let value = lookup(root, path)?;
    let converted = convert(value);
    if converted.is_none() {
        warn!("Status field {} has unexpected value {}", path.join("."), value);
    }
    converted
}

fn string_at(root: &Value, path: &[&str]) -> Option<String> {
    typed_at(root, path, |v| v.as_str().map(str::to_owned))
}

fn int_at(root: &Value, path: &[&str]) -> Option<i32> {
    typed_at(root, path, |v| v.as_i64().and_then(|n| i32::try_from(n).ok()))
}

fn bool_at(root: &Value, path: &[&str]) -> Option<bool> {
    typed_at(root, path, Value::as_bool)
}

/// Plain text of a chat component: a bare string, an object with `text` and
/// `extra` children, or an array of components.
pub fn flatten_text(component: &Value) -> String {
    let mut out = String::new();
    append_text(component, &mut out, 0);
    out
}

fn append_text(component: &Value, out: &mut String, depth: usize) {
    // deeply nested components are cut off rather than recursed into
    if depth > 32 {
        return;
    }
    match component {
        Value::String(s) => out.push_str(s),
        Value::Object(map) => {
            if let Some(text) = map.get("text").and_then(Value::as_str) {
                out.push_str(text);
            }
            if let Some(Value::Array(extra)) = map.get("extra") {
                for child in extra {
                    append_text(child, out, depth + 1);
                }
            }
        }
        Value::Array(parts) => {
            for part in parts {
                append_text(part, out, depth + 1);
            }
        }
        _ => {}
    }
}
