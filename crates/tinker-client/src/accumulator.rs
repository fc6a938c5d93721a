//! Streamed-response accumulator keyed by `(instance, example)`.
//!
//! Chunks apply in arrival order and every application produces a new map;
//! prior maps are never mutated in place.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tinker_types::{ChunkEvent, InstanceId, TokenUsage};

/// Identifies one dataset example within a run.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct ExampleId(pub u64);

/// Accumulation key: one instance responding to one example.
pub type ResponseKey = (InstanceId, ExampleId);

/// A tool call under construction from streamed fragments.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialToolCall {
    pub id: String,
    /// Filled at most once; later fragments never overwrite it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    /// Concatenated argument-string fragments, in arrival order.
    pub arguments: String,
}

/// Accumulated response for one `(instance, example)` pair.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceResponse {
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<PartialToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experiment_run_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// All accumulated responses for a run.
pub type ResponseMap = HashMap<ResponseKey, InstanceResponse>;

/// Merge one chunk into the map, returning a new map.
pub fn apply_chunk(map: &ResponseMap, key: ResponseKey, chunk: &ChunkEvent) -> ResponseMap {
    let mut next = map.clone();
    let entry = next.entry(key).or_default();
    match chunk {
        ChunkEvent::TextDelta { content } => {
            entry.content.push_str(content);
        }
        ChunkEvent::ToolCallDelta {
            id,
            function_name,
            arguments,
        } => {
            let index = match entry.tool_calls.iter().position(|call| call.id == *id) {
                Some(index) => index,
                None => {
                    entry.tool_calls.push(PartialToolCall {
                        id: id.clone(),
                        ..PartialToolCall::default()
                    });
                    entry.tool_calls.len() - 1
                }
            };
            let call = &mut entry.tool_calls[index];
            if call.function_name.is_none() {
                call.function_name = function_name.clone();
            }
            call.arguments.push_str(arguments);
        }
        ChunkEvent::Finished {
            span_id,
            trace_id,
            experiment_run_id,
            usage,
            latency_ms,
        } => {
            if span_id.is_some() {
                entry.span_id = span_id.clone();
            }
            if trace_id.is_some() {
                entry.trace_id = trace_id.clone();
            }
            if experiment_run_id.is_some() {
                entry.experiment_run_id = experiment_run_id.clone();
            }
            if usage.is_some() {
                entry.usage = *usage;
            }
            if latency_ms.is_some() {
                entry.latency_ms = *latency_ms;
            }
        }
        ChunkEvent::Error { message } => {
            entry.error_message = Some(message.clone());
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> ResponseKey {
        (InstanceId(0), ExampleId(1))
    }

    #[test]
    fn text_deltas_concatenate_in_order() {
        let map = ResponseMap::new();
        let map = apply_chunk(&map, key(), &ChunkEvent::text("Hel"));
        let map = apply_chunk(&map, key(), &ChunkEvent::text("lo"));
        assert_eq!(map[&key()].content, "Hello");
    }

    #[test]
    fn tool_call_fragments_concatenate_per_call_id() {
        let map = ResponseMap::new();
        let map = apply_chunk(
            &map,
            key(),
            &ChunkEvent::ToolCallDelta {
                id: "call_1".to_string(),
                function_name: Some("get_weather".to_string()),
                arguments: "{\"a\":".to_string(),
            },
        );
        let map = apply_chunk(
            &map,
            key(),
            &ChunkEvent::ToolCallDelta {
                id: "call_1".to_string(),
                function_name: None,
                arguments: "1}".to_string(),
            },
        );
        let calls = &map[&key()].tool_calls;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].arguments, "{\"a\":1}");
        assert_eq!(calls[0].function_name.as_deref(), Some("get_weather"));
    }

    #[test]
    fn function_name_is_filled_only_once() {
        let map = ResponseMap::new();
        let map = apply_chunk(
            &map,
            key(),
            &ChunkEvent::ToolCallDelta {
                id: "call_1".to_string(),
                function_name: Some("first".to_string()),
                arguments: String::new(),
            },
        );
        let map = apply_chunk(
            &map,
            key(),
            &ChunkEvent::ToolCallDelta {
                id: "call_1".to_string(),
                function_name: Some("second".to_string()),
                arguments: String::new(),
            },
        );
        assert_eq!(map[&key()].tool_calls[0].function_name.as_deref(), Some("first"));
    }

    #[test]
    fn interleaved_tool_calls_accumulate_separately() {
        let map = ResponseMap::new();
        let map = apply_chunk(
            &map,
            key(),
            &ChunkEvent::ToolCallDelta {
                id: "call_1".to_string(),
                function_name: Some("one".to_string()),
                arguments: "{".to_string(),
            },
        );
        let map = apply_chunk(
            &map,
            key(),
            &ChunkEvent::ToolCallDelta {
                id: "call_2".to_string(),
                function_name: Some("two".to_string()),
                arguments: "{}".to_string(),
            },
        );
        let map = apply_chunk(
            &map,
            key(),
            &ChunkEvent::ToolCallDelta {
                id: "call_1".to_string(),
                function_name: None,
                arguments: "}".to_string(),
            },
        );
        let calls = &map[&key()].tool_calls;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].id, "call_1");
        assert_eq!(calls[0].arguments, "{}");
        assert_eq!(calls[1].id, "call_2");
    }

    #[test]
    fn terminal_chunk_attaches_trace_and_usage() {
        let map = ResponseMap::new();
        let map = apply_chunk(&map, key(), &ChunkEvent::text("done"));
        let map = apply_chunk(
            &map,
            key(),
            &ChunkEvent::Finished {
                span_id: Some("span-1".to_string()),
                trace_id: Some("trace-1".to_string()),
                experiment_run_id: Some("exp-run-1".to_string()),
                usage: Some(TokenUsage {
                    input_tokens: 10,
                    output_tokens: 5,
                    total_tokens: 15,
                }),
                latency_ms: Some(420),
            },
        );
        let response = &map[&key()];
        assert_eq!(response.content, "done");
        assert_eq!(response.span_id.as_deref(), Some("span-1"));
        assert_eq!(response.trace_id.as_deref(), Some("trace-1"));
        assert_eq!(response.experiment_run_id.as_deref(), Some("exp-run-1"));
        assert_eq!(response.usage.unwrap().total_tokens, 15);
        assert_eq!(response.latency_ms, Some(420));
    }

    #[test]
    fn error_chunk_sets_error_message() {
        let map = ResponseMap::new();
        let map = apply_chunk(&map, key(), &ChunkEvent::error("rate limited"));
        assert_eq!(map[&key()].error_message.as_deref(), Some("rate limited"));
    }

    #[test]
    fn applying_a_chunk_leaves_the_prior_map_untouched() {
        let map = ResponseMap::new();
        let first = apply_chunk(&map, key(), &ChunkEvent::text("Hel"));
        let second = apply_chunk(&first, key(), &ChunkEvent::text("lo"));
        assert!(map.is_empty());
        assert_eq!(first[&key()].content, "Hel");
        assert_eq!(second[&key()].content, "Hello");
    }

    #[test]
    fn keys_are_isolated_per_instance_and_example() {
        let a = (InstanceId(0), ExampleId(1));
        let b = (InstanceId(1), ExampleId(1));
        let map = ResponseMap::new();
        let map = apply_chunk(&map, a, &ChunkEvent::text("A"));
        let map = apply_chunk(&map, b, &ChunkEvent::text("B"));
        assert_eq!(map[&a].content, "A");
        assert_eq!(map[&b].content, "B");
    }
}
