// Progress reporting for long-running tool invocations
//
// Notifications flow through the same outbound channel as responses so the
// writer task preserves ordering: both 0% and 100% are on the wire before
// the tool's response.

use crate::protocol::{JsonRpcRequest, ProgressParams};
use tokio::sync::mpsc;

/// Handle for emitting `notifications/progress` updates.
///
/// Constructed per tool invocation from the caller-supplied progress token.
/// When the caller didn't send a token, [`Progress::send`] is a no-op.
#[derive(Debug, Clone)]
pub struct Progress {
    token: Option<serde_json::Value>,
    outbound: mpsc::UnboundedSender<String>,
}

impl Progress {
    pub fn new(token: Option<serde_json::Value>, outbound: mpsc::UnboundedSender<String>) -> Self {
        Self { token, outbound }
    }

    /// A handle that never emits anything, for tools invoked outside a
    /// server loop (tests, one-shot usage).
    pub fn disabled() -> Self {
        let (outbound, _) = mpsc::unbounded_channel();
        Self {
            token: None,
            outbound,
        }
    }

    /// Emit a progress update out of 100. Without a token this does nothing;
    /// a closed channel is ignored rather than surfaced to the tool.
    pub fn send(&self, progress: u32, message: impl Into<String>) {
        let Some(token) = &self.token else {
            return;
        };

        let notification = JsonRpcRequest::notification(
            "notifications/progress",
            ProgressParams {
                progress_token: token.clone(),
                progress,
                total: 100,
                message: Some(message.into()),
            },
        );
        if let Ok(line) = serde_json::to_string(&notification) {
            let _ = self.outbound.send(line);
        }
    }
}
