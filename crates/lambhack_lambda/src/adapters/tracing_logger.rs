use lambhack_core::handler::HandlerLogger;
use serde_json::Value;

const COMPONENT: &str = "lambhack_handler";

/// Emits handler log lines through `tracing` with the invocation's request id attached.
#[derive(Debug, Clone, Default)]
pub struct TracingLogger {
    request_id: Option<String>,
}

impl TracingLogger {
    pub fn for_request(request_id: impl Into<String>) -> Self {
        Self {
            request_id: Some(request_id.into()),
        }
    }
}

impl HandlerLogger for TracingLogger {
    fn info(&self, message: &str, details: Value) {
        tracing::info!(
            component = COMPONENT,
            request_id = self.request_id.as_deref().unwrap_or_default(),
            details = %details,
            "{message}"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().expect("poisoned mutex").clone())
                .expect("log output should be utf-8")
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("poisoned mutex").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn writes_message_with_request_id_and_details() {
        let buffer = SharedBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .without_time()
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            TracingLogger::for_request("req-42").info("hello", json!({"command": "ls"}));
        });

        let output = buffer.contents();
        assert!(output.contains("INFO"));
        assert!(output.contains("hello"));
        assert!(output.contains("request_id=\"req-42\""));
        assert!(output.contains("component=\"lambhack_handler\""));
        assert!(output.contains(r#"details={"command":"ls"}"#));
    }
}
