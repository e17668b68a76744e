use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const GREETING: &str = "Welcome to lambhack!";
pub const COMMAND_QUERY_PARAM: &str = "command";
pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const CORS_ALLOW_HEADERS: &str = "Content-Type,X-Amz-Date,Authorization,X-Api-Key";
pub const CORS_ALLOW_METHODS: &str = "*";
/// Environment variable carrying the site URL the function answers CORS requests for.
pub const ALLOWED_ORIGIN_ENV: &str = "LAMBHACK_ALLOWED_ORIGIN";

/// Query parameter mapping produced by the deployment framework's request template.
const FRAMEWORK_QUERY_KEY: &str = "queryParams";
/// Query parameter mapping of an API Gateway proxy event.
const PROXY_QUERY_KEY: &str = "queryStringParameters";

/// Inbound gateway event.
///
/// The event is kept as the raw JSON value so it can be echoed back without
/// losing fields this crate does not model.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct GatewayRequest(Value);

impl GatewayRequest {
    pub fn new(event: Value) -> Self {
        Self(event)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Looks up a query parameter, preferring the framework mapping over the
    /// proxy mapping. Null mappings and non-string values count as absent.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        [FRAMEWORK_QUERY_KEY, PROXY_QUERY_KEY]
            .iter()
            .filter_map(|key| self.0.get(key).and_then(Value::as_object))
            .find_map(|params| params.get(name).and_then(Value::as_str))
    }

    pub fn command(&self) -> &str {
        self.query_param(COMMAND_QUERY_PARAM).unwrap_or_default()
    }
}

impl From<Value> for GatewayRequest {
    fn from(event: Value) -> Self {
        Self(event)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LambhackResponse {
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "Request")]
    pub request: GatewayRequest,
}

impl LambhackResponse {
    pub fn welcome(command: &str, request: GatewayRequest) -> Self {
        Self {
            message: format!("{GREETING}{command}"),
            request,
        }
    }
}
