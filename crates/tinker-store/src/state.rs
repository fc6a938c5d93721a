//! Whole-store snapshot state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tinker_types::{IdSource, InstanceId, PlaygroundInstance};

use crate::defaults::{SavedModelConfigs, default_instance};

/// Which prompt shape the playground is operating in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    Chat,
    TextCompletion,
}

/// How template variables are delimited.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateLanguage {
    None,
    Mustache,
    FString,
}

/// One immutable snapshot of the entire playground.
///
/// Operations never mutate a snapshot in place; each one computes a full new
/// value from the prior snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaygroundState {
    pub instances: Vec<PlaygroundInstance>,
    pub operation_type: OperationType,
    pub template_language: TemplateLanguage,
    pub streaming: bool,
    /// Variable name -> last-entered value, retained across template-language
    /// and mode switches so hidden variables keep their values.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub variable_cache: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experiment_id: Option<String>,
}

impl PlaygroundState {
    /// Empty playground in chat mode with mustache templating.
    pub fn empty() -> Self {
        Self {
            instances: Vec::new(),
            operation_type: OperationType::Chat,
            template_language: TemplateLanguage::Mustache,
            streaming: true,
            variable_cache: HashMap::new(),
            experiment_id: None,
        }
    }

    /// Playground seeded with a single default instance.
    pub fn with_default_instance(ids: &IdSource, saved: &SavedModelConfigs) -> Self {
        let mut state = Self::empty();
        state
            .instances
            .push(default_instance(ids, state.operation_type, saved));
        state
    }

    pub fn instance(&self, id: InstanceId) -> Option<&PlaygroundInstance> {
        self.instances.iter().find(|instance| instance.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinker_types::ModelProvider;

    #[test]
    fn empty_state_has_no_instances() {
        let state = PlaygroundState::empty();
        assert!(state.instances.is_empty());
        assert_eq!(state.operation_type, OperationType::Chat);
        assert!(state.streaming);
    }

    #[test]
    fn with_default_instance_seeds_one_chat_instance() {
        let ids = IdSource::new();
        let state = PlaygroundState::with_default_instance(&ids, &SavedModelConfigs::default());
        assert_eq!(state.instances.len(), 1);
        assert!(state.instances[0].template.is_chat());
        assert_eq!(state.instances[0].model.provider, ModelProvider::OpenAi);
        assert!(state.instances[0].active_run_id.is_none());
    }

    #[test]
    fn instance_lookup_by_id() {
        let ids = IdSource::new();
        let state = PlaygroundState::with_default_instance(&ids, &SavedModelConfigs::default());
        let id = state.instances[0].id;
        assert!(state.instance(id).is_some());
        assert!(state.instance(InstanceId(999)).is_none());
    }
}
