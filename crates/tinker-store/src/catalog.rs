//! Embedded catalog of invocation parameters supported per provider/model.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tinker_types::{CanonicalParameterName, InvocationParameterInput, ModelProvider};

/// Expected value shape for a supported parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    Int,
    Float,
    Bool,
    String,
    StringList,
    Json,
}

/// Definition of one parameter a model is known to accept.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub invocation_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_name: Option<CanonicalParameterName>,
    pub label: String,
    pub kind: ParameterKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
}

impl ParameterSpec {
    /// Whether a parameter input resolves to this definition, by invocation
    /// name or shared canonical name.
    pub fn matches_input(&self, input: &InvocationParameterInput) -> bool {
        if self.invocation_name == input.invocation_name {
            return true;
        }
        matches!(
            (&self.canonical_name, &input.canonical_name),
            (Some(a), Some(b)) if a == b
        )
    }
}

#[derive(Clone, Debug, Deserialize)]
struct CatalogEntry {
    provider: ModelProvider,
    /// Prefix match against the model name. Entries with a pattern are listed
    /// before the provider's generic entry; the first match wins.
    #[serde(default)]
    model_pattern: Option<String>,
    parameters: Vec<ParameterSpec>,
}

static PARAMETER_CATALOG: OnceLock<Vec<CatalogEntry>> = OnceLock::new();

fn catalog() -> &'static [CatalogEntry] {
    PARAMETER_CATALOG
        .get_or_init(|| {
            serde_json::from_str(include_str!("catalog_params.json"))
                .expect("catalog_params.json must be valid")
        })
        .as_slice()
}

/// Parameters the selected provider/model is known to support.
///
/// Catalog ordering is authoritative: the first entry matching the provider
/// and model pattern wins. With no model name, only a patternless entry can
/// match. Unknown providers yield an empty set.
pub fn supported_parameters(
    provider: ModelProvider,
    model_name: Option<&str>,
) -> Vec<ParameterSpec> {
    catalog()
        .iter()
        .filter(|entry| entry.provider == provider)
        .find(|entry| match (&entry.model_pattern, model_name) {
            (None, _) => true,
            (Some(pattern), Some(name)) => name.starts_with(pattern.as_str()),
            (Some(_), None) => false,
        })
        .map(|entry| entry.parameters.clone())
        .unwrap_or_default()
}
