//! Generation backend seam: single-shot and streaming request shapes.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tinker_types::{
    ChunkEvent, InstanceId, InvocationParameterInput, MessageToolCall, ModelProvider, RunId,
    Template, TokenUsage, ToolChoice,
};

use crate::errors::PlaygroundError;

/// Stream of chunk events yielded by a streaming generation request.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<ChunkEvent, PlaygroundError>> + Send>>;

/// One generation request, built from a snapshot for a single instance.
///
/// The template is already variable-substituted; the backend only needs to
/// translate it into its wire shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub instance_id: InstanceId,
    pub run_id: RunId,
    pub provider: ModelProvider,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invocation_parameters: Vec<InvocationParameterInput>,
    pub template: Template,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Value>,
    #[serde(default)]
    pub tool_choice: ToolChoice,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experiment_id: Option<String>,
}

/// Result of a single-shot (non-streaming) generation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<MessageToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

/// Backend reached via two request shapes: a single-shot request and a
/// streaming request yielding discriminated chunk events.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn complete(&self, request: GenerationRequest) -> Result<Generation, PlaygroundError>;

    async fn stream(&self, request: GenerationRequest) -> Result<ChunkStream, PlaygroundError>;
}
