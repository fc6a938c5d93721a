//! Invocation parameter inputs and their identity/upsert semantics.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical names for parameters that are equivalent across providers even
/// when their wire names differ (e.g. `max_tokens` vs `max_completion_tokens`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalParameterName {
    Temperature,
    TopP,
    MaxCompletionTokens,
    StopSequences,
    Seed,
    ReasoningEffort,
    ResponseFormat,
}

/// Value carried by one invocation parameter override.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ParameterValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
    StringList(Vec<String>),
    Json(Value),
}

/// A named per-instance model-call override.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InvocationParameterInput {
    pub invocation_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_name: Option<CanonicalParameterName>,
    pub value: ParameterValue,
}

impl InvocationParameterInput {
    pub fn new(
        invocation_name: impl Into<String>,
        canonical_name: Option<CanonicalParameterName>,
        value: ParameterValue,
    ) -> Self {
        Self {
            invocation_name: invocation_name.into(),
            canonical_name,
            value,
        }
    }

    pub fn float(invocation_name: impl Into<String>, value: f64) -> Self {
        Self::new(invocation_name, None, ParameterValue::Float(value))
    }

    pub fn int(invocation_name: impl Into<String>, value: i64) -> Self {
        Self::new(invocation_name, None, ParameterValue::Int(value))
    }

    /// Two inputs share an identity when their invocation names match, or when
    /// both carry the same canonical name.
    pub fn same_identity(&self, other: &Self) -> bool {
        if self.invocation_name == other.invocation_name {
            return true;
        }
        matches!(
            (&self.canonical_name, &other.canonical_name),
            (Some(a), Some(b)) if a == b
        )
    }
}

/// Identity-based upsert: replace a matching entry in place (position
/// preserved), otherwise append.
pub fn upsert_parameter(
    params: &[InvocationParameterInput],
    incoming: InvocationParameterInput,
) -> Vec<InvocationParameterInput> {
    let mut next = params.to_vec();
    match next.iter_mut().find(|param| param.same_identity(&incoming)) {
        Some(slot) => *slot = incoming,
        None => next.push(incoming),
    }
    next
}
