//! Discriminated chunk variants for streamed generation responses.

use serde::{Deserialize, Serialize};

/// Token usage reported by a terminal chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

/// One incremental unit of a streamed generation response.
///
/// Consumers are expected to match exhaustively; adding a variant is a
/// compile-time-visible break at every consumption site.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChunkEvent {
    /// A fragment of generated text.
    TextDelta { content: String },
    /// A fragment of a tool call. The function name arrives at most once per
    /// call id; argument fragments concatenate in arrival order.
    ToolCallDelta {
        id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        function_name: Option<String>,
        arguments: String,
    },
    /// Terminal result carrying trace/span and run metadata.
    Finished {
        #[serde(skip_serializing_if = "Option::is_none")]
        span_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        trace_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        experiment_run_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        usage: Option<TokenUsage>,
        #[serde(skip_serializing_if = "Option::is_none")]
        latency_ms: Option<u64>,
    },
    /// Terminal error; the run is over for this instance.
    Error { message: String },
}

impl ChunkEvent {
    pub fn text(content: impl Into<String>) -> Self {
        ChunkEvent::TextDelta {
            content: content.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ChunkEvent::Error {
            message: message.into(),
        }
    }

    /// Terminal chunks end the run for their instance.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChunkEvent::Finished { .. } | ChunkEvent::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_serializes_with_type_tag() {
        let chunk = ChunkEvent::text("Hel");
        let json = serde_json::to_value(&chunk).expect("serialize");
        assert_eq!(json["type"], "text_delta");
        assert_eq!(json["content"], "Hel");
    }

    #[test]
    fn tool_call_delta_round_trips() {
        let chunk = ChunkEvent::ToolCallDelta {
            id: "call_1".to_string(),
            function_name: Some("get_weather".to_string()),
            arguments: "{\"city\":".to_string(),
        };
        let json = serde_json::to_string(&chunk).expect("serialize");
        let back: ChunkEvent = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, chunk);
    }

    #[test]
    fn terminal_variants_are_terminal() {
        assert!(ChunkEvent::error("boom").is_terminal());
        assert!(
            ChunkEvent::Finished {
                span_id: None,
                trace_id: None,
                experiment_run_id: None,
                usage: None,
                latency_ms: None,
            }
            .is_terminal()
        );
        assert!(!ChunkEvent::text("hi").is_terminal());
    }
}
