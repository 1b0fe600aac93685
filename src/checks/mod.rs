//! Built-in checks and the default registry

pub mod agent_json;
pub mod http_headers;
pub mod llms_txt;
pub mod mcp;
pub mod meta_tags;
pub mod openapi;
pub mod robots_txt;
pub mod security_txt;
pub mod structured_data;

use crate::check::Check;
use std::sync::Arc;

pub use agent_json::AgentJson;
pub use http_headers::HttpHeaders;
pub use llms_txt::LlmsTxt;
pub use mcp::Mcp;
pub use meta_tags::MetaTags;
pub use openapi::OpenApi;
pub use robots_txt::RobotsTxt;
pub use security_txt::SecurityTxt;
pub use structured_data::StructuredData;

/// All built-in checks in reporting order
pub fn registry() -> Vec<Arc<dyn Check>> {
    vec![
        Arc::new(LlmsTxt),
        Arc::new(RobotsTxt),
        Arc::new(AgentJson),
        Arc::new(Mcp),
        Arc::new(SecurityTxt),
        Arc::new(StructuredData),
        Arc::new(MetaTags),
        Arc::new(OpenApi),
        Arc::new(HttpHeaders),
    ]
}

/// Ids of all built-in checks in reporting order
pub fn ids() -> Vec<&'static str> {
    registry().iter().map(|c| c.meta().id).collect()
}

/// Whether `value` is a JSON value a site owner would consider "set"
pub(crate) fn is_present(value: Option<&serde_json::Value>) -> bool {
    !matches!(value, None | Some(serde_json::Value::Null))
}

/// Whether `value` is truthy in the loose sense used for optional fields
pub(crate) fn is_truthy(value: Option<&serde_json::Value>) -> bool {
    use serde_json::Value;
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().map_or(true, |f| f != 0.0),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Render a JSON scalar for a finding message
pub(crate) fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
