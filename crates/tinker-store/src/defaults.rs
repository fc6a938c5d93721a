//! Canonical templates and per-provider saved model defaults.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tinker_types::{
    ChatMessage, IdSource, InvocationParameterInput, ModelConfig, ModelProvider,
    PlaygroundInstance, Role, Template, ToolChoice,
};

use crate::state::OperationType;

pub const DEFAULT_CHAT_SYSTEM_PROMPT: &str = "You are a chatbot";
pub const DEFAULT_PROMPT_TEMPLATE: &str = "{{question}}";

/// Canonical two-message chat template: system prompt plus a templated user
/// turn. Message ids come from the shared id source.
pub fn default_chat_template(ids: &IdSource) -> Template {
    Template::Chat {
        messages: vec![
            ChatMessage::new(ids.next_message_id(), Role::System, DEFAULT_CHAT_SYSTEM_PROMPT),
            ChatMessage::new(ids.next_message_id(), Role::User, DEFAULT_PROMPT_TEMPLATE),
        ],
    }
}

pub fn default_prompt_template() -> Template {
    Template::Prompt {
        template: DEFAULT_PROMPT_TEMPLATE.to_string(),
    }
}

pub fn default_template(operation_type: OperationType, ids: &IdSource) -> Template {
    match operation_type {
        OperationType::Chat => default_chat_template(ids),
        OperationType::TextCompletion => default_prompt_template(),
    }
}

/// Saved model configuration fragment for one provider, as persisted by hosts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedModelConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invocation_parameters: Vec<InvocationParameterInput>,
}

/// Provider -> saved model configuration lookup.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavedModelConfigs {
    by_provider: HashMap<ModelProvider, SavedModelConfig>,
}

impl SavedModelConfigs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, provider: ModelProvider) -> Option<&SavedModelConfig> {
        self.by_provider.get(&provider)
    }

    pub fn insert(&mut self, provider: ModelProvider, config: SavedModelConfig) {
        self.by_provider.insert(provider, config);
    }
}

/// Build a fresh instance from the default template, seeded from the saved
/// per-provider configuration when one exists.
pub fn default_instance(
    ids: &IdSource,
    operation_type: OperationType,
    saved: &SavedModelConfigs,
) -> PlaygroundInstance {
    let provider = ModelProvider::OpenAi;
    let model = match saved.get(provider) {
        Some(config) => ModelConfig {
            provider,
            model_name: config.model_name.clone(),
            endpoint: config.endpoint.clone(),
            api_version: config.api_version.clone(),
            invocation_parameters: config.invocation_parameters.clone(),
        },
        None => ModelConfig::new(provider),
    };

    PlaygroundInstance {
        id: ids.next_instance_id(),
        template: default_template(operation_type, ids),
        model,
        tools: Vec::new(),
        tool_choice: ToolChoice::auto(),
        output: None,
        span_id: None,
        active_run_id: None,
    }
}
