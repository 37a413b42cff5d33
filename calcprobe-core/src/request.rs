// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Calculation request payloads.
//!
//! A request is a tenant id plus an ordered list of mutation commands. The
//! JSON field names here are the service's wire names; the RPC binding
//! converts the same values into protobuf messages.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ScenarioError;

/// Parse an ISO `YYYY-MM-DD` date used in a request.
pub fn date(field: &'static str, value: &str) -> Result<NaiveDate, ScenarioError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| ScenarioError::InvalidDate {
        field,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// A complete request to the calculation service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationRequest {
    pub tenant_id: String,
    pub calculation_instructions: CalculationInstructions,
}

impl CalculationRequest {
    /// The mutations in submission order.
    pub fn mutations(&self) -> &[Mutation] {
        &self.calculation_instructions.mutations
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationInstructions {
    pub mutations: Vec<Mutation>,
}

/// Whether a mutation creates a dossier or targets an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MutationType {
    DossierCreation,
    Dossier,
}

impl MutationType {
    /// Wire name of the type tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationType::DossierCreation => "DOSSIER_CREATION",
            MutationType::Dossier => "DOSSIER",
        }
    }
}

/// One mutation command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mutation {
    pub mutation_id: String,
    pub mutation_definition_name: String,
    pub mutation_type: MutationType,
    pub actual_at: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dossier_id: Option<String>,
    pub mutation_properties: MutationProperties,
}

impl Mutation {
    /// `create_dossier`: opens a new dossier with a single participant.
    pub fn create_dossier(
        mutation_id: impl Into<String>,
        actual_at: NaiveDate,
        properties: CreateDossier,
    ) -> Self {
        Self {
            mutation_id: mutation_id.into(),
            mutation_definition_name: "create_dossier".to_string(),
            mutation_type: MutationType::DossierCreation,
            actual_at,
            dossier_id: None,
            mutation_properties: MutationProperties::CreateDossier(properties),
        }
    }

    /// `add_policy`: adds an employment policy to an existing dossier.
    pub fn add_policy(
        mutation_id: impl Into<String>,
        actual_at: NaiveDate,
        dossier_id: impl Into<String>,
        properties: AddPolicy,
    ) -> Self {
        Self::on_dossier(
            mutation_id,
            "add_policy",
            actual_at,
            dossier_id,
            MutationProperties::AddPolicy(properties),
        )
    }

    /// `calculate_retirement_benefit`: retires the dossier on a date.
    pub fn calculate_retirement_benefit(
        mutation_id: impl Into<String>,
        actual_at: NaiveDate,
        dossier_id: impl Into<String>,
        retirement_date: NaiveDate,
    ) -> Self {
        Self::on_dossier(
            mutation_id,
            "calculate_retirement_benefit",
            actual_at,
            dossier_id,
            MutationProperties::CalculateRetirementBenefit(RetirementBenefit { retirement_date }),
        )
    }

    /// `apply_indexation`: raises salaries, optionally filtered.
    pub fn apply_indexation(
        mutation_id: impl Into<String>,
        actual_at: NaiveDate,
        dossier_id: impl Into<String>,
        properties: Indexation,
    ) -> Self {
        Self::on_dossier(
            mutation_id,
            "apply_indexation",
            actual_at,
            dossier_id,
            MutationProperties::ApplyIndexation(properties),
        )
    }

    /// `project_future_benefits`: projects pensions over a date range.
    pub fn project_future_benefits(
        mutation_id: impl Into<String>,
        actual_at: NaiveDate,
        dossier_id: impl Into<String>,
        properties: Projection,
    ) -> Self {
        Self::on_dossier(
            mutation_id,
            "project_future_benefits",
            actual_at,
            dossier_id,
            MutationProperties::ProjectFutureBenefits(properties),
        )
    }

    /// A mutation with a free-form definition name and properties.
    pub fn custom(
        mutation_id: impl Into<String>,
        definition_name: impl Into<String>,
        mutation_type: MutationType,
        actual_at: NaiveDate,
        dossier_id: Option<String>,
        properties: Map<String, Value>,
    ) -> Self {
        Self {
            mutation_id: mutation_id.into(),
            mutation_definition_name: definition_name.into(),
            mutation_type,
            actual_at,
            dossier_id,
            mutation_properties: MutationProperties::Custom(properties),
        }
    }

    fn on_dossier(
        mutation_id: impl Into<String>,
        definition_name: &str,
        actual_at: NaiveDate,
        dossier_id: impl Into<String>,
        properties: MutationProperties,
    ) -> Self {
        Self {
            mutation_id: mutation_id.into(),
            mutation_definition_name: definition_name.to_string(),
            mutation_type: MutationType::Dossier,
            actual_at,
            dossier_id: Some(dossier_id.into()),
            mutation_properties: properties,
        }
    }
}

/// Type-specific mutation properties, serialized as a flat JSON object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MutationProperties {
    CreateDossier(CreateDossier),
    AddPolicy(AddPolicy),
    CalculateRetirementBenefit(RetirementBenefit),
    ApplyIndexation(Indexation),
    ProjectFutureBenefits(Projection),
    Custom(Map<String, Value>),
}

impl MutationProperties {
    /// The properties as a JSON object.
    pub fn to_json_map(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            // Every variant serializes as an object.
            _ => Ok(Map::new()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateDossier {
    pub dossier_id: String,
    pub person_id: String,
    pub name: String,
    pub birth_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddPolicy {
    pub scheme_id: String,
    pub employment_start_date: NaiveDate,
    pub salary: f64,
    pub part_time_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetirementBenefit {
    pub retirement_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Indexation {
    pub percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_before: Option<NaiveDate>,
}

impl Indexation {
    /// Indexation applied to every policy.
    pub fn all(percentage: f64) -> Self {
        Self {
            percentage,
            scheme_id: None,
            effective_before: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub projection_start_date: NaiveDate,
    pub projection_end_date: NaiveDate,
    pub projection_interval_months: u32,
}

/// Builder for a `CalculationRequest`.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    tenant_id: String,
    mutations: Vec<Mutation>,
}

impl RequestBuilder {
    pub fn new(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            mutations: Vec::new(),
        }
    }

    /// Append a mutation.
    pub fn mutation(mut self, mutation: Mutation) -> Self {
        self.mutations.push(mutation);
        self
    }

    /// Finish the request. Rejects an empty mutation list and duplicate ids.
    pub fn build(self) -> Result<CalculationRequest, ScenarioError> {
        if self.mutations.is_empty() {
            return Err(ScenarioError::InvalidRequest {
                tenant_id: self.tenant_id,
                reason: "At least one mutation is required".to_string(),
            });
        }

        let mut seen = HashSet::with_capacity(self.mutations.len());
        for mutation in &self.mutations {
            if !seen.insert(mutation.mutation_id.as_str()) {
                return Err(ScenarioError::InvalidRequest {
                    tenant_id: self.tenant_id.clone(),
                    reason: format!("Duplicate mutation id {}", mutation.mutation_id),
                });
            }
        }

        Ok(CalculationRequest {
            tenant_id: self.tenant_id,
            calculation_instructions: CalculationInstructions {
                mutations: self.mutations,
            },
        })
    }
}
