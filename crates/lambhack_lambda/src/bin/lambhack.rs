use lambda_runtime::{service_fn, Error, LambdaEvent};
use lambhack_core::handler::HandlerLogger;
use lambhack_lambda::adapters::process_runner::ProcessRunner;
use lambhack_lambda::adapters::tracing_logger::TracingLogger;
use lambhack_lambda::config::{allowed_origin_from_env, LambdaConfig};
use lambhack_lambda::handlers::gateway::{handle_configured_event, ApiGatewayResponse};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

async fn handle_request(event: LambdaEvent<Value>) -> Result<ApiGatewayResponse, Error> {
    let config = LambdaConfig::from_env();
    let fallback_origin = allowed_origin_from_env();
    let runner = ProcessRunner::default();
    let logger = TracingLogger::for_request(event.context.request_id.clone());

    let response = tokio::task::block_in_place(|| {
        handle_configured_event(
            event.payload,
            &runner,
            config,
            &fallback_origin,
            Some(&logger as &dyn HandlerLogger),
        )
    });
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .without_time()
        .init();

    lambda_runtime::run(service_fn(handle_request)).await
}
