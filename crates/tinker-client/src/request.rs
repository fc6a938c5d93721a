//! Builds generation requests from the current snapshot.

use std::collections::HashMap;

use tinker_store::{PlaygroundState, TemplateLanguage};
use tinker_types::{PlaygroundInstance, Template};

use crate::backend::GenerationRequest;
use crate::errors::PlaygroundError;

/// Build the request payload for one instance from the snapshot.
///
/// The instance must have an active run id (assigned by `run_instances`);
/// template variables are substituted from the variable cache according to the
/// playground's template language.
pub fn build_request(
    state: &PlaygroundState,
    instance: &PlaygroundInstance,
) -> Result<GenerationRequest, PlaygroundError> {
    let run_id = instance.active_run_id.ok_or_else(|| {
        PlaygroundError::invalid_request(format!(
            "instance {} has no active run",
            instance.id.0
        ))
    })?;

    let template = substitute_template(
        &instance.template,
        state.template_language,
        &state.variable_cache,
    );

    Ok(GenerationRequest {
        instance_id: instance.id,
        run_id,
        provider: instance.model.provider,
        model_name: instance.model.model_name.clone(),
        endpoint: instance.model.endpoint.clone(),
        api_version: instance.model.api_version.clone(),
        invocation_parameters: instance.model.invocation_parameters.clone(),
        template,
        tools: instance.tools.iter().map(|tool| tool.definition.clone()).collect(),
        tool_choice: instance.tool_choice.clone(),
        experiment_id: state.experiment_id.clone(),
    })
}

/// Substitute variables in every text slot of the template.
pub fn substitute_template(
    template: &Template,
    language: TemplateLanguage,
    variables: &HashMap<String, String>,
) -> Template {
    match template {
        Template::Chat { messages } => Template::Chat {
            messages: messages
                .iter()
                .map(|message| {
                    let mut message = message.clone();
                    message.content = substitute(&message.content, language, variables);
                    message
                })
                .collect(),
        },
        Template::Prompt { template } => Template::Prompt {
            template: substitute(template, language, variables),
        },
    }
}

fn substitute(
    text: &str,
    language: TemplateLanguage,
    variables: &HashMap<String, String>,
) -> String {
    match language {
        TemplateLanguage::None => text.to_string(),
        TemplateLanguage::Mustache => render(text, "{{", "}}", variables),
        TemplateLanguage::FString => render(text, "{", "}", variables),
    }
}

/// Replace `open name close` placeholders with values from `variables`.
/// Unknown variables are left in place so missing inputs stay visible.
fn render(
    text: &str,
    open: &str,
    close: &str,
    variables: &HashMap<String, String>,
) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(open) {
        out.push_str(&rest[..start]);
        let after = &rest[start + open.len()..];
        match after.find(close) {
            Some(end) => {
                let key = after[..end].trim();
                match variables.get(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push_str(open);
                        out.push_str(&after[..end]);
                        out.push_str(close);
                    }
                }
                rest = &after[end + close.len()..];
            }
            None => {
                // Unterminated placeholder: keep the delimiter literally.
                out.push_str(open);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinker_store::{PlaygroundStore, SavedModelConfigs};
    use tinker_types::{IdSource, Role};

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn mustache_substitution_replaces_known_variables() {
        let rendered = substitute(
            "Q: {{question}} ({{ lang }})",
            TemplateLanguage::Mustache,
            &vars(&[("question", "why?"), ("lang", "en")]),
        );
        assert_eq!(rendered, "Q: why? (en)");
    }

    #[test]
    fn fstring_substitution_uses_single_braces() {
        let rendered = substitute(
            "Q: {question}",
            TemplateLanguage::FString,
            &vars(&[("question", "why?")]),
        );
        assert_eq!(rendered, "Q: why?");
    }

    #[test]
    fn unknown_variables_are_left_in_place() {
        let rendered = substitute(
            "{{present}} and {{missing}}",
            TemplateLanguage::Mustache,
            &vars(&[("present", "here")]),
        );
        assert_eq!(rendered, "here and {{missing}}");
    }

    #[test]
    fn language_none_passes_text_through() {
        let rendered = substitute(
            "{{question}}",
            TemplateLanguage::None,
            &vars(&[("question", "why?")]),
        );
        assert_eq!(rendered, "{{question}}");
    }

    #[test]
    fn build_request_requires_an_active_run() {
        let store =
            PlaygroundStore::with_default_instance(IdSource::new(), &SavedModelConfigs::default());
        let state = store.snapshot();
        let err = build_request(&state, &state.instances[0]).unwrap_err();
        assert!(matches!(err, PlaygroundError::InvalidRequest { .. }));
    }

    #[test]
    fn build_request_substitutes_chat_template() {
        let store =
            PlaygroundStore::with_default_instance(IdSource::new(), &SavedModelConfigs::default());
        store.set_variable_value("question", "What is a span?");
        let state = store.run_instances();
        let request = build_request(&state, &state.instances[0]).expect("request");
        let Template::Chat { messages } = &request.template else {
            panic!("expected chat template");
        };
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "What is a span?");
        assert_eq!(request.run_id, state.instances[0].active_run_id.unwrap());
    }

    #[test]
    fn build_request_carries_experiment_id_and_model_config() {
        let store =
            PlaygroundStore::with_default_instance(IdSource::new(), &SavedModelConfigs::default());
        store.set_experiment_id(Some("exp-42".to_string()));
        let state = store.run_instances();
        let request = build_request(&state, &state.instances[0]).expect("request");
        assert_eq!(request.experiment_id.as_deref(), Some("exp-42"));
        assert_eq!(request.provider, state.instances[0].model.provider);
        assert!(request.tools.is_empty());
    }
}
