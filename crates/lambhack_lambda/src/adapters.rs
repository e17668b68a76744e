pub mod process_runner;
pub mod tracing_logger;
