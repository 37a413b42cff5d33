// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Protobuf messages of the `PensionCalculationService`.
//!
//! Declared with `prost` derives so no code generation step is needed.
//! Free-form mutation properties and JSON patches travel as
//! `google.protobuf.Struct` / `google.protobuf.Value`.

use std::collections::BTreeMap;

use prost_types::value::Kind;
use prost_types::{ListValue, Struct, Value};
use serde_json::{Map, Value as JsonValue};

use crate::canonical::{self, CanonicalResult, Outcome, Severity};
use crate::request;

#[derive(Clone, PartialEq, prost::Message)]
pub struct CalculationRequest {
    #[prost(string, tag = "1")]
    pub tenant_id: String,
    #[prost(message, optional, tag = "2")]
    pub calculation_instructions: Option<CalculationInstructions>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CalculationInstructions {
    #[prost(message, repeated, tag = "1")]
    pub mutations: Vec<Mutation>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Mutation {
    #[prost(string, tag = "1")]
    pub mutation_id: String,
    #[prost(string, tag = "2")]
    pub mutation_definition_name: String,
    #[prost(string, tag = "3")]
    pub mutation_type: String,
    #[prost(string, tag = "4")]
    pub actual_at: String,
    #[prost(string, optional, tag = "5")]
    pub dossier_id: Option<String>,
    #[prost(message, optional, tag = "6")]
    pub mutation_properties: Option<Struct>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CalculationResponse {
    #[prost(message, optional, tag = "1")]
    pub calculation_metadata: Option<CalculationMetadata>,
    #[prost(message, optional, tag = "2")]
    pub calculation_result: Option<CalculationResult>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CalculationMetadata {
    #[prost(string, tag = "1")]
    pub calculation_id: String,
    #[prost(string, tag = "2")]
    pub tenant_id: String,
    #[prost(string, tag = "3")]
    pub calculation_started_at: String,
    #[prost(string, tag = "4")]
    pub calculation_completed_at: String,
    #[prost(int64, tag = "5")]
    pub calculation_duration_ms: i64,
    #[prost(string, tag = "6")]
    pub calculation_outcome: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CalculationResult {
    #[prost(message, repeated, tag = "1")]
    pub messages: Vec<CalculationMessage>,
    #[prost(message, repeated, tag = "2")]
    pub mutations: Vec<ProcessedMutation>,
    #[prost(message, optional, tag = "3")]
    pub end_situation: Option<SituationSnapshot>,
    #[prost(message, optional, tag = "4")]
    pub initial_situation: Option<InitialSituation>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CalculationMessage {
    #[prost(int32, tag = "1")]
    pub id: i32,
    #[prost(string, tag = "2")]
    pub level: String,
    #[prost(string, tag = "3")]
    pub code: String,
    #[prost(string, tag = "4")]
    pub message: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ProcessedMutation {
    #[prost(message, optional, tag = "1")]
    pub mutation: Option<Mutation>,
    #[prost(int32, repeated, tag = "2")]
    pub calculation_message_indexes: Vec<i32>,
    #[prost(message, optional, tag = "3")]
    pub forward_patch_to_situation_after_this_mutation: Option<Value>,
    #[prost(message, optional, tag = "4")]
    pub backward_patch_to_previous_situation: Option<Value>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SituationSnapshot {
    #[prost(string, tag = "1")]
    pub mutation_id: String,
    #[prost(int32, tag = "2")]
    pub mutation_index: i32,
    #[prost(string, tag = "3")]
    pub actual_at: String,
    #[prost(message, optional, tag = "4")]
    pub situation: Option<Situation>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct InitialSituation {
    #[prost(string, tag = "1")]
    pub actual_at: String,
    #[prost(message, optional, tag = "2")]
    pub situation: Option<Situation>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Situation {
    #[prost(message, optional, tag = "1")]
    pub dossier: Option<Dossier>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Dossier {
    #[prost(string, tag = "1")]
    pub dossier_id: String,
    #[prost(string, tag = "2")]
    pub status: String,
    #[prost(string, optional, tag = "3")]
    pub retirement_date: Option<String>,
    #[prost(message, repeated, tag = "4")]
    pub persons: Vec<Person>,
    #[prost(message, repeated, tag = "5")]
    pub policies: Vec<Policy>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Person {
    #[prost(string, tag = "1")]
    pub person_id: String,
    #[prost(string, tag = "2")]
    pub role: String,
    #[prost(string, tag = "3")]
    pub name: String,
    #[prost(string, tag = "4")]
    pub birth_date: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Policy {
    #[prost(string, tag = "1")]
    pub policy_id: String,
    #[prost(string, tag = "2")]
    pub scheme_id: String,
    #[prost(string, tag = "3")]
    pub employment_start_date: String,
    #[prost(double, tag = "4")]
    pub salary: f64,
    #[prost(double, tag = "5")]
    pub part_time_factor: f64,
    #[prost(double, optional, tag = "6")]
    pub attainable_pension: Option<f64>,
    #[prost(message, repeated, tag = "7")]
    pub projections: Vec<Projection>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Projection {
    #[prost(string, tag = "1")]
    pub date: String,
    #[prost(double, tag = "2")]
    pub projected_pension: f64,
}

// =============================================================================
// Request encoding
// =============================================================================

/// Convert a request into its protobuf form.
pub fn encode_request(
    request: &request::CalculationRequest,
) -> Result<CalculationRequest, serde_json::Error> {
    let mutations = request
        .mutations()
        .iter()
        .map(encode_mutation)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CalculationRequest {
        tenant_id: request.tenant_id.clone(),
        calculation_instructions: Some(CalculationInstructions { mutations }),
    })
}

fn encode_mutation(mutation: &request::Mutation) -> Result<Mutation, serde_json::Error> {
    Ok(Mutation {
        mutation_id: mutation.mutation_id.clone(),
        mutation_definition_name: mutation.mutation_definition_name.clone(),
        mutation_type: mutation.mutation_type.as_str().to_string(),
        actual_at: mutation.actual_at.format("%Y-%m-%d").to_string(),
        dossier_id: mutation.dossier_id.clone(),
        mutation_properties: Some(json_map_to_struct(
            mutation.mutation_properties.to_json_map()?,
        )),
    })
}

fn json_map_to_struct(map: Map<String, JsonValue>) -> Struct {
    Struct {
        fields: map
            .into_iter()
            .map(|(key, value)| (key, json_to_value(value)))
            .collect::<BTreeMap<_, _>>(),
    }
}

fn json_to_value(value: JsonValue) -> Value {
    let kind = match value {
        JsonValue::Null => Kind::NullValue(0),
        JsonValue::Bool(b) => Kind::BoolValue(b),
        JsonValue::Number(n) => Kind::NumberValue(n.as_f64().unwrap_or_default()),
        JsonValue::String(s) => Kind::StringValue(s),
        JsonValue::Array(items) => Kind::ListValue(ListValue {
            values: items.into_iter().map(json_to_value).collect(),
        }),
        JsonValue::Object(map) => Kind::StructValue(json_map_to_struct(map)),
    };
    Value { kind: Some(kind) }
}

// =============================================================================
// Response decoding
// =============================================================================

/// Convert a protobuf `Value` into JSON. A missing kind is `null`.
pub fn value_to_json(value: Value) -> JsonValue {
    match value.kind {
        None | Some(Kind::NullValue(_)) => JsonValue::Null,
        Some(Kind::BoolValue(b)) => JsonValue::Bool(b),
        Some(Kind::NumberValue(n)) => canonical::json_number(n),
        Some(Kind::StringValue(s)) => JsonValue::String(s),
        Some(Kind::ListValue(list)) => {
            JsonValue::Array(list.values.into_iter().map(value_to_json).collect())
        }
        Some(Kind::StructValue(s)) => JsonValue::Object(
            s.fields
                .into_iter()
                .map(|(key, value)| (key, value_to_json(value)))
                .collect(),
        ),
    }
}

/// A patch that is absent or `null` decodes to `None`, as in JSON.
fn patch(value: Option<Value>) -> Option<JsonValue> {
    value.map(value_to_json).filter(|v| !v.is_null())
}

/// Convert a protobuf response into the canonical shape.
pub fn decode_response(response: CalculationResponse) -> Result<CanonicalResult, String> {
    let metadata = response
        .calculation_metadata
        .ok_or_else(|| "missing calculation_metadata".to_string())?;
    let result = response
        .calculation_result
        .ok_or_else(|| "missing calculation_result".to_string())?;

    let calculation_outcome = Outcome::from_wire(&metadata.calculation_outcome)
        .ok_or_else(|| format!("unknown calculation_outcome '{}'", metadata.calculation_outcome))?;

    let end = result
        .end_situation
        .ok_or_else(|| "missing end_situation".to_string())?;

    Ok(CanonicalResult {
        metadata: canonical::CalculationMetadata {
            calculation_id: metadata.calculation_id,
            tenant_id: metadata.tenant_id,
            calculation_duration_ms: metadata.calculation_duration_ms,
            calculation_outcome,
        },
        messages: result
            .messages
            .into_iter()
            .map(|m| canonical::CalculationMessage {
                id: m.id,
                level: Severity::from_wire(&m.level),
                code: m.code,
                message: m.message,
            })
            .collect(),
        mutations: result
            .mutations
            .into_iter()
            .map(decode_processed_mutation)
            .collect::<Result<Vec<_>, _>>()?,
        end_situation: canonical::SituationSnapshot {
            mutation_id: end.mutation_id,
            mutation_index: end.mutation_index,
            actual_at: end.actual_at,
            situation: decode_situation(end.situation),
        },
        initial_situation: result
            .initial_situation
            .map(|initial| canonical::InitialSituation {
                actual_at: initial.actual_at,
                situation: decode_situation(initial.situation),
            }),
    })
}

fn decode_processed_mutation(
    processed: ProcessedMutation,
) -> Result<canonical::ProcessedMutation, String> {
    let mutation = processed
        .mutation
        .ok_or_else(|| "processed mutation without mutation echo".to_string())?;

    Ok(canonical::ProcessedMutation {
        mutation: canonical::MutationEcho {
            mutation_id: mutation.mutation_id,
            mutation_definition_name: mutation.mutation_definition_name,
            dossier_id: mutation.dossier_id,
        },
        calculation_message_indexes: processed.calculation_message_indexes,
        forward_patch: patch(processed.forward_patch_to_situation_after_this_mutation),
        backward_patch: patch(processed.backward_patch_to_previous_situation),
    })
}

fn decode_situation(situation: Option<Situation>) -> canonical::Situation {
    canonical::Situation {
        dossier: situation.and_then(|s| s.dossier).map(decode_dossier),
    }
}

fn decode_dossier(dossier: Dossier) -> canonical::Dossier {
    canonical::Dossier {
        dossier_id: dossier.dossier_id,
        status: dossier.status,
        retirement_date: dossier.retirement_date,
        persons: dossier
            .persons
            .into_iter()
            .map(|p| canonical::Person {
                person_id: p.person_id,
                role: p.role,
                name: p.name,
                birth_date: p.birth_date,
            })
            .collect(),
        policies: dossier
            .policies
            .into_iter()
            .map(|p| canonical::Policy {
                policy_id: p.policy_id,
                scheme_id: p.scheme_id,
                employment_start_date: p.employment_start_date,
                salary: p.salary,
                part_time_factor: p.part_time_factor,
                attainable_pension: p.attainable_pension,
                projections: p
                    .projections
                    .into_iter()
                    .map(|proj| canonical::ProjectionPoint {
                        date: proj.date,
                        projected_pension: proj.projected_pension,
                    })
                    .collect(),
            })
            .collect(),
    }
}
