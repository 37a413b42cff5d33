// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Transport-neutral calculation result.
//!
//! Both bindings decode into these types, so a scenario's assertions never
//! depend on which binding produced the response. Absent and explicit-null
//! nested objects both become `None`; absent or null lists become empty.
//!
//! The serde attributes describe the HTTP binding's JSON field names. The
//! RPC binding builds the same values from protobuf messages.

use serde::{Deserialize, Deserializer};

/// Deserialize `null` as the type's default value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Largest magnitude at which every integer is exactly representable as f64.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A JSON number from an f64, as an integer when it has no fractional part.
///
/// Protobuf carries every number as a double while JSON keeps `1` and
/// `1.0` apart; both bindings funnel patch numbers through here.
pub(crate) fn json_number(n: f64) -> serde_json::Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

/// Rewrite every number in a JSON tree with [`json_number`].
pub(crate) fn normalize_numbers(value: serde_json::Value) -> serde_json::Value {
    use serde_json::Value;

    match value {
        Value::Number(n) if n.is_f64() => n.as_f64().map_or(Value::Null, json_number),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_numbers).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, normalize_numbers(value)))
                .collect(),
        ),
        other => other,
    }
}

fn patch<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<serde_json::Value>::deserialize(deserializer)?.map(normalize_numbers))
}

/// Overall outcome of a calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    /// Parse the service's wire name.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "SUCCESS" => Some(Outcome::Success),
            "FAILURE" => Some(Outcome::Failure),
            _ => None,
        }
    }
}

/// Severity level of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Critical,
    Warning,
    Info,
    #[serde(other)]
    Other,
}

impl Severity {
    /// Parse the service's wire name. Unrecognised levels map to `Other`.
    pub fn from_wire(value: &str) -> Self {
        match value {
            "CRITICAL" => Severity::Critical,
            "WARNING" => Severity::Warning,
            "INFO" => Severity::Info,
            _ => Severity::Other,
        }
    }
}

/// A decoded calculation response.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalResult {
    pub metadata: CalculationMetadata,
    pub messages: Vec<CalculationMessage>,
    pub mutations: Vec<ProcessedMutation>,
    pub end_situation: SituationSnapshot,
    pub initial_situation: Option<InitialSituation>,
}

impl CanonicalResult {
    pub fn outcome(&self) -> Outcome {
        self.metadata.calculation_outcome
    }

    pub fn is_success(&self) -> bool {
        self.outcome() == Outcome::Success
    }

    /// The dossier after the last successfully applied mutation.
    pub fn end_dossier(&self) -> Option<&Dossier> {
        self.end_situation.situation.dossier.as_ref()
    }

    /// The dossier before the first mutation.
    pub fn initial_dossier(&self) -> Option<&Dossier> {
        self.initial_situation
            .as_ref()
            .and_then(|initial| initial.situation.dossier.as_ref())
    }

    /// Index of the mutation the end situation reflects.
    pub fn end_mutation_index(&self) -> i32 {
        self.end_situation.mutation_index
    }

    /// True if any message carries the given level.
    pub fn has_level(&self, level: Severity) -> bool {
        self.messages.iter().any(|m| m.level == level)
    }

    /// True if any message carries the given code.
    pub fn has_code(&self, code: &str) -> bool {
        self.messages.iter().any(|m| m.code == code)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CalculationMetadata {
    #[serde(default)]
    pub calculation_id: String,
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub calculation_duration_ms: i64,
    pub calculation_outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CalculationMessage {
    #[serde(default)]
    pub id: i32,
    pub level: Severity,
    pub code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}

/// Echo of a submitted mutation, with the messages it raised.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProcessedMutation {
    pub mutation: MutationEcho,
    #[serde(default, deserialize_with = "null_as_default")]
    pub calculation_message_indexes: Vec<i32>,
    #[serde(
        default,
        rename = "forward_patch_to_situation_after_this_mutation",
        deserialize_with = "patch"
    )]
    pub forward_patch: Option<serde_json::Value>,
    #[serde(
        default,
        rename = "backward_patch_to_previous_situation",
        deserialize_with = "patch"
    )]
    pub backward_patch: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MutationEcho {
    pub mutation_id: String,
    pub mutation_definition_name: String,
    #[serde(default)]
    pub dossier_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SituationSnapshot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub mutation_id: String,
    pub mutation_index: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub actual_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub situation: Situation,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InitialSituation {
    #[serde(default, deserialize_with = "null_as_default")]
    pub actual_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub situation: Situation,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Situation {
    #[serde(default)]
    pub dossier: Option<Dossier>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Dossier {
    pub dossier_id: String,
    pub status: String,
    #[serde(default)]
    pub retirement_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub persons: Vec<Person>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub policies: Vec<Policy>,
}

impl Dossier {
    pub fn person(&self, index: usize) -> Option<&Person> {
        self.persons.get(index)
    }

    pub fn policy(&self, index: usize) -> Option<&Policy> {
        self.policies.get(index)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Person {
    pub person_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub birth_date: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Policy {
    pub policy_id: String,
    pub scheme_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub employment_start_date: String,
    pub salary: f64,
    pub part_time_factor: f64,
    #[serde(default)]
    pub attainable_pension: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub projections: Vec<ProjectionPoint>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProjectionPoint {
    pub date: String,
    pub projected_pension: f64,
}
