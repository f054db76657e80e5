//! The outcome of one service-function execution.

use selfservice_catalog::ServiceDefinition;
use selfservice_core::ObjectContextUpdate;
use serde::Serialize;
use std::fmt;

/// How the chat layer should present the result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseMode {
    /// Plain message.
    #[default]
    Text,
    /// Message with one selectable button per item.
    Card,
    /// Nothing to show; the response went to the logs.
    Silent,
}

impl ResponseMode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Card => "CARD",
            Self::Silent => "SILENT",
        }
    }
}

impl fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of [`ServiceFunctionExecutor::execute`](crate::ServiceFunctionExecutor::execute).
///
/// `buttons`, `options` and `context_values` are index-aligned: selecting
/// button `i` should store `context_values[i]` as the object context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    /// False when the callback is not a service function this engine runs.
    pub handled: bool,
    pub message: Option<String>,
    pub mode: ResponseMode,
    pub buttons: Vec<String>,
    pub options: Vec<String>,
    pub context_values: Vec<Option<String>>,
    /// Change to apply to the session's object context.
    pub object_context: ObjectContextUpdate,
    pub account_context_enabled: bool,
    pub service_context_enabled: bool,
    pub object_context_enabled: bool,
}

impl ExecutionResult {
    /// The callback is not ours; the caller falls through to other handlers.
    #[must_use]
    pub fn not_handled() -> Self {
        Self::default()
    }

    /// A handled TEXT result.
    #[must_use]
    pub fn handled(message: impl Into<String>) -> Self {
        Self {
            handled: true,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: ResponseMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the selectable items and their object-context values.
    #[must_use]
    pub fn with_choices(mut self, labels: Vec<String>, context_values: Vec<Option<String>>) -> Self {
        self.options.clone_from(&labels);
        self.buttons = labels;
        self.context_values = context_values;
        self
    }

    #[must_use]
    pub fn with_object_context(mut self, update: ObjectContextUpdate) -> Self {
        self.object_context = update;
        self
    }

    /// Copies the context-tier flags declared by `definition`.
    #[must_use]
    pub fn with_enablement(mut self, definition: &ServiceDefinition) -> Self {
        self.account_context_enabled = definition.account_context_field().is_some();
        self.service_context_enabled = definition.service_context_field().is_some();
        self.object_context_enabled = definition.object_context_field().is_some();
        self
    }

    /// Prepends `prefix` to the message.
    #[must_use]
    pub fn with_message_prefix(mut self, prefix: &str) -> Self {
        if let Some(message) = self.message.take() {
            self.message = Some(format!("{prefix}{message}"));
        }
        self
    }
}
