//! Pure state transitions over [`PlaygroundState`] snapshots.
//!
//! Every function takes the current snapshot and returns a new one. Malformed
//! or unknown ids are silent no-ops; no transition panics on user input.

use serde::{Deserialize, Serialize};
use tinker_types::{
    ChatMessage, IdSource, InstanceId, InvocationParameterInput, ModelConfig, ModelProvider,
    PlaygroundInstance, Role, RunId, Template, ToolChoice, ToolSpec, upsert_parameter,
};

use crate::catalog::ParameterSpec;
use crate::defaults::{SavedModelConfigs, default_template};
use crate::state::{OperationType, PlaygroundState, TemplateLanguage};

/// Partial update for an instance's model descriptor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelConfigPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ModelProvider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invocation_parameters: Vec<InvocationParameterInput>,
}

/// Partial update for an instance. `Some` fields are applied; `None` fields
/// are left untouched (shallow merge).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InstancePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<Template>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolSpec>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_run_id: Option<RunId>,
}

/// Apply `f` to the instance with `id`, or return the snapshot unchanged when
/// the id is unknown.
fn map_instance<F>(state: &PlaygroundState, id: InstanceId, op: &'static str, f: F) -> PlaygroundState
where
    F: FnOnce(&mut PlaygroundInstance),
{
    let mut next = state.clone();
    match next.instances.iter_mut().find(|instance| instance.id == id) {
        Some(instance) => f(instance),
        None => tracing::debug!(instance = id.0, op, "ignoring update for unknown instance"),
    }
    next
}

/// Rewrite every instance's template to the canonical default for the
/// requested operation type. Prior message content is not preserved.
pub fn set_operation_type(
    state: &PlaygroundState,
    operation_type: OperationType,
    ids: &IdSource,
) -> PlaygroundState {
    let mut next = state.clone();
    next.operation_type = operation_type;
    for instance in &mut next.instances {
        instance.template = default_template(operation_type, ids);
    }
    next
}

/// Clone the first instance's configuration into a new instance with a fresh
/// id and cleared run/trace state. No-op when the playground is empty.
pub fn add_instance(state: &PlaygroundState, ids: &IdSource) -> PlaygroundState {
    let mut next = state.clone();
    let Some(first) = state.instances.first() else {
        return next;
    };
    next.instances.push(PlaygroundInstance {
        id: ids.next_instance_id(),
        template: first.template.clone(),
        model: first.model.clone(),
        tools: first.tools.clone(),
        tool_choice: first.tool_choice.clone(),
        output: None,
        span_id: None,
        active_run_id: None,
    });
    next
}

/// Remove the instance with `id`; permanent, no tombstones.
pub fn delete_instance(state: &PlaygroundState, id: InstanceId) -> PlaygroundState {
    let mut next = state.clone();
    next.instances.retain(|instance| instance.id != id);
    next
}

/// Update an instance's model descriptor.
///
/// On a provider change with a saved configuration for the new provider, the
/// model fields are replaced from that configuration; without one, the model
/// name is cleared. Invocation parameters from the existing model and the
/// patch are concatenated on every path — the upsert contract lives in
/// [`upsert_invocation_parameter`], not here.
pub fn update_model(
    state: &PlaygroundState,
    instance_id: InstanceId,
    patch: &ModelConfigPatch,
    saved: &SavedModelConfigs,
) -> PlaygroundState {
    map_instance(state, instance_id, "update_model", |instance| {
        let current = instance.model.clone();
        let mut parameters = current.invocation_parameters.clone();
        parameters.extend(patch.invocation_parameters.iter().cloned());

        instance.model = match patch.provider {
            Some(provider) if provider != current.provider => match saved.get(provider) {
                Some(config) => ModelConfig {
                    provider,
                    model_name: config.model_name.clone(),
                    endpoint: config.endpoint.clone(),
                    api_version: config.api_version.clone(),
                    invocation_parameters: parameters,
                },
                None => ModelConfig {
                    provider,
                    model_name: None,
                    endpoint: patch.endpoint.clone(),
                    api_version: patch.api_version.clone(),
                    invocation_parameters: parameters,
                },
            },
            _ => ModelConfig {
                provider: current.provider,
                model_name: patch.model_name.clone().or_else(|| current.model_name.clone()),
                endpoint: patch.endpoint.clone().or_else(|| current.endpoint.clone()),
                api_version: patch
                    .api_version
                    .clone()
                    .or_else(|| current.api_version.clone()),
                invocation_parameters: parameters,
            },
        };
    })
}

/// Append a default user message to a chat template. No-op for prompt
/// templates and unknown ids.
pub fn add_message(
    state: &PlaygroundState,
    instance_id: InstanceId,
    ids: &IdSource,
) -> PlaygroundState {
    map_instance(state, instance_id, "add_message", |instance| {
        match &mut instance.template {
            Template::Chat { messages } => {
                messages.push(ChatMessage::new(ids.next_message_id(), Role::User, ""));
            }
            Template::Prompt { .. } => {
                tracing::debug!(
                    instance = instance.id.0,
                    "add_message on prompt template is a no-op"
                );
            }
        }
    })
}

/// Shallow-merge patch fields onto the instance.
pub fn update_instance(
    state: &PlaygroundState,
    instance_id: InstanceId,
    patch: &InstancePatch,
) -> PlaygroundState {
    map_instance(state, instance_id, "update_instance", |instance| {
        if let Some(template) = &patch.template {
            instance.template = template.clone();
        }
        if let Some(tools) = &patch.tools {
            instance.tools = tools.clone();
        }
        if let Some(tool_choice) = &patch.tool_choice {
            instance.tool_choice = tool_choice.clone();
        }
        if let Some(output) = &patch.output {
            instance.output = Some(output.clone());
        }
        if let Some(span_id) = &patch.span_id {
            instance.span_id = Some(span_id.clone());
        }
        if let Some(run_id) = patch.active_run_id {
            instance.active_run_id = Some(run_id);
        }
    })
}

/// Assign every instance a fresh monotonic run id and clear its span.
pub fn run_instances(state: &PlaygroundState, ids: &IdSource) -> PlaygroundState {
    let mut next = state.clone();
    for instance in &mut next.instances {
        instance.active_run_id = Some(ids.next_run_id());
        instance.span_id = None;
    }
    next
}

/// Clear the active run id for the instance; all other fields are untouched.
pub fn mark_complete(state: &PlaygroundState, instance_id: InstanceId) -> PlaygroundState {
    map_instance(state, instance_id, "mark_complete", |instance| {
        instance.active_run_id = None;
    })
}

pub fn set_template_language(
    state: &PlaygroundState,
    language: TemplateLanguage,
) -> PlaygroundState {
    let mut next = state.clone();
    next.template_language = language;
    next
}

pub fn set_streaming(state: &PlaygroundState, streaming: bool) -> PlaygroundState {
    let mut next = state.clone();
    next.streaming = streaming;
    next
}

/// Merge one variable value into the cache; other entries are retained.
pub fn set_variable_value(
    state: &PlaygroundState,
    name: impl Into<String>,
    value: impl Into<String>,
) -> PlaygroundState {
    let mut next = state.clone();
    next.variable_cache.insert(name.into(), value.into());
    next
}

pub fn set_experiment_id(state: &PlaygroundState, experiment_id: Option<String>) -> PlaygroundState {
    let mut next = state.clone();
    next.experiment_id = experiment_id;
    next
}

/// Replace the instance's invocation-parameter list with the entries matching
/// a supported-parameter definition; used when switching models to drop
/// parameters the new model rejects.
pub fn filter_invocation_parameters(
    state: &PlaygroundState,
    instance_id: InstanceId,
    supported: &[ParameterSpec],
) -> PlaygroundState {
    map_instance(state, instance_id, "filter_invocation_parameters", |instance| {
        instance
            .model
            .invocation_parameters
            .retain(|param| supported.iter().any(|spec| spec.matches_input(param)));
    })
}

/// Identity-based upsert into the instance's invocation-parameter list.
pub fn upsert_invocation_parameter(
    state: &PlaygroundState,
    instance_id: InstanceId,
    param: InvocationParameterInput,
) -> PlaygroundState {
    map_instance(state, instance_id, "upsert_invocation_parameter", |instance| {
        instance.model.invocation_parameters =
            upsert_parameter(&instance.model.invocation_parameters, param);
    })
}

/// Remove entries whose invocation name matches.
pub fn delete_invocation_parameter(
    state: &PlaygroundState,
    instance_id: InstanceId,
    invocation_name: &str,
) -> PlaygroundState {
    map_instance(state, instance_id, "delete_invocation_parameter", |instance| {
        instance
            .model
            .invocation_parameters
            .retain(|param| param.invocation_name != invocation_name);
    })
}
