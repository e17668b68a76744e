use lambhack_core::contract::{
    GatewayRequest, CORS_ALLOW_HEADERS, CORS_ALLOW_METHODS, JSON_CONTENT_TYPE,
};
use lambhack_core::handler::{handle_request, HandlerError, HandlerLogger};
use lambhack_core::runner::CommandRunner;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::{ConfigError, LambdaConfig};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

/// Entry point for one invocation whose configuration may have failed to
/// load. A broken configuration answers 500 with CORS headers for
/// `fallback_origin` instead of failing the invocation.
pub fn handle_configured_event(
    event: Value,
    runner: &dyn CommandRunner,
    config: Result<LambdaConfig, ConfigError>,
    fallback_origin: &str,
    logger: Option<&dyn HandlerLogger>,
) -> ApiGatewayResponse {
    match config {
        Ok(config) => handle_gateway_event(event, runner, &config, logger),
        Err(error) => {
            tracing::error!(error = %error, "lambhack configuration is invalid");
            error_response(
                500,
                json!({
                    "error": "misconfiguration",
                    "message": error.to_string(),
                }),
                fallback_origin,
            )
        }
    }
}

pub fn handle_gateway_event(
    event: Value,
    runner: &dyn CommandRunner,
    config: &LambdaConfig,
    logger: Option<&dyn HandlerLogger>,
) -> ApiGatewayResponse {
    let origin = config.allowed_origin.as_str();

    if !event.is_object() {
        return error_response(
            400,
            json!({
                "error": "validation_error",
                "message": "Request payload must be a JSON object",
            }),
            origin,
        );
    }

    match handle_request(GatewayRequest::new(event), runner, &config.handler, logger) {
        Ok(response) => success_response(200, response, origin),
        Err(error) => {
            let (status_code, code) = match &error {
                HandlerError::CommandRejected { .. } => (403, "command_rejected"),
                HandlerError::CommandFailed { .. } => (502, "command_failed"),
            };
            tracing::warn!(status_code, error = %error, "lambhack request failed");
            error_response(
                status_code,
                json!({
                    "error": code,
                    "message": error.to_string(),
                }),
                origin,
            )
        }
    }
}

fn success_response(status_code: u16, payload: impl Serialize, origin: &str) -> ApiGatewayResponse {
    match serde_json::to_string(&payload) {
        Ok(body) => ApiGatewayResponse {
            status_code,
            headers: response_headers(origin),
            body,
        },
        Err(error) => error_response(
            500,
            json!({
                "error": "serialization_error",
                "message": error.to_string(),
            }),
            origin,
        ),
    }
}

fn error_response(status_code: u16, payload: Value, origin: &str) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code,
        headers: response_headers(origin),
        body: payload.to_string(),
    }
}

fn response_headers(origin: &str) -> Value {
    json!({
        "Content-Type": JSON_CONTENT_TYPE,
        "Access-Control-Allow-Origin": origin,
        "Access-Control-Allow-Headers": CORS_ALLOW_HEADERS,
        "Access-Control-Allow-Methods": CORS_ALLOW_METHODS,
    })
}
