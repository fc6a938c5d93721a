//! Instances, templates, chat messages, model descriptors, and tools.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{InstanceId, MessageId, RunId, ToolId};
use crate::params::InvocationParameterInput;

/// Who produced a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A tool call recorded on an assistant message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MessageToolCall {
    pub id: String,
    pub name: String,
    /// Raw JSON arguments string as produced by the model.
    pub arguments: String,
}

/// One element of a chat template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<MessageToolCall>,
}

impl ChatMessage {
    pub fn new(id: MessageId, role: Role, content: impl Into<String>) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }
}

/// The prompt shape for an instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Template {
    Chat { messages: Vec<ChatMessage> },
    Prompt { template: String },
}

impl Template {
    pub fn is_chat(&self) -> bool {
        matches!(self, Template::Chat { .. })
    }
}

/// Supported generation backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelProvider {
    OpenAi,
    AzureOpenAi,
    Anthropic,
    Google,
}

impl ModelProvider {
    /// Providers addressed through a caller-supplied endpoint and API version.
    pub fn requires_endpoint(&self) -> bool {
        matches!(self, ModelProvider::AzureOpenAi)
    }
}

/// Model descriptor for one instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub provider: ModelProvider,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invocation_parameters: Vec<InvocationParameterInput>,
}

impl ModelConfig {
    pub fn new(provider: ModelProvider) -> Self {
        Self {
            provider,
            model_name: None,
            endpoint: None,
            api_version: None,
            invocation_parameters: Vec::new(),
        }
    }
}

/// A tool definition attached to an instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub id: ToolId,
    /// JSON-schema tool definition in the provider's function-tool shape.
    pub definition: Value,
}

/// Tool choice policy for a request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolChoice {
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
}

impl ToolChoice {
    pub fn auto() -> Self {
        Self {
            mode: "auto".to_string(),
            tool_name: None,
        }
    }

    pub fn required(tool_name: impl Into<String>) -> Self {
        Self {
            mode: "required".to_string(),
            tool_name: Some(tool_name.into()),
        }
    }
}

impl Default for ToolChoice {
    fn default() -> Self {
        Self::auto()
    }
}

/// One configured prompt/model unit within the playground.
///
/// `active_run_id` is non-null exactly while a generation request is in flight
/// for this instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaygroundInstance {
    pub id: InstanceId,
    pub template: Template,
    pub model: ModelConfig,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolSpec>,
    #[serde(default)]
    pub tool_choice: ToolChoice,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_run_id: Option<RunId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_is_chat_discriminates() {
        let chat = Template::Chat { messages: vec![] };
        let prompt = Template::Prompt {
            template: "{{question}}".to_string(),
        };
        assert!(chat.is_chat());
        assert!(!prompt.is_chat());
    }

    #[test]
    fn template_serializes_with_type_tag() {
        let prompt = Template::Prompt {
            template: "hi".to_string(),
        };
        let json = serde_json::to_value(&prompt).expect("serialize");
        assert_eq!(json["type"], "prompt");
        assert_eq!(json["template"], "hi");
    }

    #[test]
    fn only_azure_requires_endpoint() {
        assert!(ModelProvider::AzureOpenAi.requires_endpoint());
        assert!(!ModelProvider::OpenAi.requires_endpoint());
        assert!(!ModelProvider::Anthropic.requires_endpoint());
        assert!(!ModelProvider::Google.requires_endpoint());
    }

    #[test]
    fn tool_choice_defaults_to_auto() {
        let choice = ToolChoice::default();
        assert_eq!(choice.mode, "auto");
        assert!(choice.tool_name.is_none());
    }
}
