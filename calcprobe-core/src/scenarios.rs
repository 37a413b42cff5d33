// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! The shipped conformance suite.
//!
//! Expected values follow the service's published rules: 3% indexation of a
//! 50000 salary gives 51500, a retirement before eligibility is rejected
//! with `NOT_ELIGIBLE`, and a critical message stops processing at the
//! offending mutation.

use crate::canonical::{CanonicalResult, Dossier, Policy, Severity};
use crate::error::ScenarioError;
use crate::registry::ScenarioRegistry;
use crate::request::{
    date, AddPolicy, CalculationRequest, CreateDossier, Indexation, Mutation, MutationType,
    Projection, RequestBuilder,
};
use crate::scenario::Scenario;

pub const README_EXAMPLE: &str = "README example (create + policy + indexation)";
pub const CREATE_DOSSIER_ONLY: &str = "Create dossier only";
pub const POLICY_WITHOUT_DOSSIER: &str = "Error: add_policy without dossier";
pub const FULL_FLOW_WITH_RETIREMENT: &str = "Full flow with retirement";
pub const NOT_ELIGIBLE_RETIREMENT: &str = "Error: NOT_ELIGIBLE retirement";
pub const INDEXATION_WITH_FILTERS: &str = "Indexation with filters";
pub const DUPLICATE_DOSSIER: &str = "Error: duplicate dossier creation";
pub const UNKNOWN_MUTATION: &str = "Error: unknown mutation";
pub const INVALID_PROJECTION_RANGE: &str = "Error: projection with invalid date range";

/// Every shipped scenario, in reporting order.
pub fn default_registry() -> ScenarioRegistry {
    ScenarioRegistry::new()
        .with(readme_example())
        .with(create_dossier_only())
        .with(policy_without_dossier())
        .with(full_flow_with_retirement())
        .with(not_eligible_retirement())
        .with(indexation_with_filters())
        .with(duplicate_dossier())
        .with(unknown_mutation())
        .with(invalid_projection_range())
}

fn end_dossier_has(r: &CanonicalResult, f: impl Fn(&Dossier) -> bool) -> bool {
    r.end_dossier().is_some_and(f)
}

fn end_policy(r: &CanonicalResult, index: usize) -> Option<&Policy> {
    r.end_dossier().and_then(|d| d.policy(index))
}

fn salary_near(r: &CanonicalResult, index: usize, expected: f64) -> bool {
    end_policy(r, index).is_some_and(|p| (p.salary - expected).abs() < 0.01)
}

fn pension_near(r: &CanonicalResult, index: usize, expected: f64) -> bool {
    end_policy(r, index)
        .and_then(|p| p.attainable_pension)
        .is_some_and(|pension| (pension - expected).abs() < 5.0)
}

fn participant(
    dossier_id: &str,
    person_id: &str,
    name: &str,
    birth_date: &str,
) -> Result<CreateDossier, ScenarioError> {
    Ok(CreateDossier {
        dossier_id: dossier_id.to_string(),
        person_id: person_id.to_string(),
        name: name.to_string(),
        birth_date: date("birth_date", birth_date)?,
    })
}

fn full_time(scheme_id: &str, start: &str, salary: f64) -> Result<AddPolicy, ScenarioError> {
    part_time(scheme_id, start, salary, 1.0)
}

fn part_time(
    scheme_id: &str,
    start: &str,
    salary: f64,
    part_time_factor: f64,
) -> Result<AddPolicy, ScenarioError> {
    Ok(AddPolicy {
        scheme_id: scheme_id.to_string(),
        employment_start_date: date("employment_start_date", start)?,
        salary,
        part_time_factor,
    })
}

// =============================================================================
// Calculation flows
// =============================================================================

const README_DOSSIER: &str = "d2222222-2222-2222-2222-222222222222";

fn readme_request() -> Result<CalculationRequest, ScenarioError> {
    let at = date("actual_at", "2020-01-01")?;
    RequestBuilder::new("tenant-001")
        .mutation(Mutation::create_dossier(
            "a1111111-1111-1111-1111-111111111111",
            at,
            participant(
                README_DOSSIER,
                "p3333333-3333-3333-3333-333333333333",
                "Jane Doe",
                "1960-06-15",
            )?,
        ))
        .mutation(Mutation::add_policy(
            "b4444444-4444-4444-4444-444444444444",
            at,
            README_DOSSIER,
            full_time("SCHEME-A", "2000-01-01", 50000.0)?,
        ))
        .mutation(Mutation::apply_indexation(
            "c5555555-5555-5555-5555-555555555555",
            date("actual_at", "2021-01-01")?,
            README_DOSSIER,
            Indexation::all(0.03),
        ))
        .build()
}

/// Create a dossier, add a policy, index it by 3%.
pub fn readme_example() -> Scenario {
    Scenario::new(README_EXAMPLE, readme_request)
        .assert("outcome SUCCESS", |r| r.is_success())
        .assert("messages empty", |r| r.messages.is_empty())
        .assert("3 mutations returned", |r| r.mutations.len() == 3)
        .assert("end mutation_index=2", |r| r.end_mutation_index() == 2)
        .assert("dossier_id correct", |r| {
            end_dossier_has(r, |d| d.dossier_id == README_DOSSIER)
        })
        .assert("status ACTIVE", |r| end_dossier_has(r, |d| d.status == "ACTIVE"))
        .assert("1 person", |r| end_dossier_has(r, |d| d.persons.len() == 1))
        .assert("1 policy", |r| end_dossier_has(r, |d| d.policies.len() == 1))
        .assert("policy_id format", |r| {
            end_policy(r, 0).is_some_and(|p| p.policy_id == format!("{}-1", README_DOSSIER))
        })
        .assert("salary=51500 after 3%", |r| salary_near(r, 0, 51500.0))
        .assert("initial dossier=null", |r| r.initial_dossier().is_none())
}

fn create_dossier_request() -> Result<CalculationRequest, ScenarioError> {
    RequestBuilder::new("tenant-002")
        .mutation(Mutation::create_dossier(
            "11111111-0000-0000-0000-000000000001",
            date("actual_at", "2023-01-01")?,
            participant(
                "dddddddd-0000-0000-0000-000000000001",
                "pppppppp-0000-0000-0000-000000000001",
                "John Smith",
                "1970-03-20",
            )?,
        ))
        .build()
}

pub fn create_dossier_only() -> Scenario {
    Scenario::new(CREATE_DOSSIER_ONLY, create_dossier_request)
        .assert("outcome SUCCESS", |r| r.is_success())
        .assert("dossier created", |r| r.end_dossier().is_some())
        .assert("status ACTIVE", |r| end_dossier_has(r, |d| d.status == "ACTIVE"))
        .assert("retirement_date null", |r| {
            end_dossier_has(r, |d| d.retirement_date.is_none())
        })
        .assert("1 person", |r| end_dossier_has(r, |d| d.persons.len() == 1))
        .assert("person name", |r| {
            end_dossier_has(r, |d| d.person(0).is_some_and(|p| p.name == "John Smith"))
        })
        .assert("empty policies", |r| end_dossier_has(r, |d| d.policies.is_empty()))
        .assert("mutation_index=0", |r| r.end_mutation_index() == 0)
}

fn policy_without_dossier_request() -> Result<CalculationRequest, ScenarioError> {
    RequestBuilder::new("tenant-003")
        .mutation(Mutation::add_policy(
            "22222222-0000-0000-0000-000000000001",
            date("actual_at", "2023-01-01")?,
            "dddddddd-0000-0000-0000-000000000099",
            full_time("SCHEME-X", "2020-01-01", 40000.0)?,
        ))
        .build()
}

/// `add_policy` against a dossier that was never created.
pub fn policy_without_dossier() -> Scenario {
    Scenario::new(POLICY_WITHOUT_DOSSIER, policy_without_dossier_request)
        .assert("outcome FAILURE", |r| !r.is_success())
        .assert("has CRITICAL message", |r| r.has_level(Severity::Critical))
        .assert("DOSSIER_NOT_FOUND code", |r| r.has_code("DOSSIER_NOT_FOUND"))
        .assert("end dossier=null", |r| r.end_dossier().is_none())
}

const RETIREMENT_DOSSIER: &str = "dddddddd-0000-0000-0000-000000000002";

fn full_flow_request() -> Result<CalculationRequest, ScenarioError> {
    RequestBuilder::new("tenant-004")
        .mutation(Mutation::create_dossier(
            "aaaaaaaa-0000-0000-0000-000000000001",
            date("actual_at", "2000-01-01")?,
            participant(
                RETIREMENT_DOSSIER,
                "pppppppp-0000-0000-0000-000000000002",
                "Alice Example",
                "1960-01-01",
            )?,
        ))
        .mutation(Mutation::add_policy(
            "bbbbbbbb-0000-0000-0000-000000000001",
            date("actual_at", "2000-01-01")?,
            RETIREMENT_DOSSIER,
            full_time("SCHEME-A", "2000-01-01", 50000.0)?,
        ))
        .mutation(Mutation::add_policy(
            "bbbbbbbb-0000-0000-0000-000000000002",
            date("actual_at", "2010-01-01")?,
            RETIREMENT_DOSSIER,
            part_time("SCHEME-B", "2010-01-01", 60000.0, 0.8)?,
        ))
        .mutation(Mutation::calculate_retirement_benefit(
            "cccccccc-0000-0000-0000-000000000001",
            date("actual_at", "2025-01-01")?,
            RETIREMENT_DOSSIER,
            date("retirement_date", "2025-01-01")?,
        ))
        .build()
}

/// Two policies followed by retirement at 65.
pub fn full_flow_with_retirement() -> Scenario {
    Scenario::new(FULL_FLOW_WITH_RETIREMENT, full_flow_request)
        .assert("outcome SUCCESS", |r| r.is_success())
        .assert("status RETIRED", |r| end_dossier_has(r, |d| d.status == "RETIRED"))
        .assert("retirement_date set", |r| {
            end_dossier_has(r, |d| d.retirement_date.as_deref() == Some("2025-01-01"))
        })
        .assert("2 policies", |r| end_dossier_has(r, |d| d.policies.len() == 2))
        .assert("policy1 pension ~24625", |r| pension_near(r, 0, 24625.0))
        .assert("policy2 pension ~14775", |r| pension_near(r, 1, 14775.0))
        .assert("4 mutations returned", |r| r.mutations.len() == 4)
}

const YOUNG_DOSSIER: &str = "dddddddd-0000-0000-0000-000000000005";

fn not_eligible_request() -> Result<CalculationRequest, ScenarioError> {
    let joined = date("actual_at", "2020-01-01")?;
    RequestBuilder::new("tenant-005")
        .mutation(Mutation::create_dossier(
            "eeeeeeee-0000-0000-0000-000000000001",
            joined,
            participant(
                YOUNG_DOSSIER,
                "pppppppp-0000-0000-0000-000000000005",
                "Young Worker",
                "1990-01-01",
            )?,
        ))
        .mutation(Mutation::add_policy(
            "eeeeeeee-0000-0000-0000-000000000002",
            joined,
            YOUNG_DOSSIER,
            full_time("SCHEME-A", "2020-01-01", 40000.0)?,
        ))
        .mutation(Mutation::calculate_retirement_benefit(
            "eeeeeeee-0000-0000-0000-000000000003",
            date("actual_at", "2025-01-01")?,
            YOUNG_DOSSIER,
            date("retirement_date", "2025-01-01")?,
        ))
        .build()
}

/// Retirement at 35 with five years of service.
pub fn not_eligible_retirement() -> Scenario {
    Scenario::new(NOT_ELIGIBLE_RETIREMENT, not_eligible_request)
        .assert("outcome FAILURE", |r| !r.is_success())
        .assert("has CRITICAL message", |r| r.has_level(Severity::Critical))
        .assert("NOT_ELIGIBLE code", |r| r.has_code("NOT_ELIGIBLE"))
        .assert("dossier still ACTIVE", |r| {
            end_dossier_has(r, |d| d.status == "ACTIVE")
        })
}

const FILTER_DOSSIER: &str = "dddddddd-0000-0000-0000-000000000006";

fn indexation_filters_request() -> Result<CalculationRequest, ScenarioError> {
    RequestBuilder::new("tenant-006")
        .mutation(Mutation::create_dossier(
            "ffffffff-0000-0000-0000-000000000001",
            date("actual_at", "2000-01-01")?,
            participant(
                FILTER_DOSSIER,
                "pppppppp-0000-0000-0000-000000000006",
                "Filter Test",
                "1960-01-01",
            )?,
        ))
        .mutation(Mutation::add_policy(
            "ffffffff-0000-0000-0000-000000000002",
            date("actual_at", "2000-01-01")?,
            FILTER_DOSSIER,
            full_time("SCHEME-A", "2000-01-01", 40000.0)?,
        ))
        .mutation(Mutation::add_policy(
            "ffffffff-0000-0000-0000-000000000003",
            date("actual_at", "2010-01-01")?,
            FILTER_DOSSIER,
            full_time("SCHEME-B", "2010-01-01", 50000.0)?,
        ))
        .mutation(Mutation::apply_indexation(
            "ffffffff-0000-0000-0000-000000000004",
            date("actual_at", "2021-01-01")?,
            FILTER_DOSSIER,
            Indexation {
                percentage: 0.10,
                scheme_id: Some("SCHEME-A".to_string()),
                effective_before: None,
            },
        ))
        .mutation(Mutation::apply_indexation(
            "ffffffff-0000-0000-0000-000000000005",
            date("actual_at", "2022-01-01")?,
            FILTER_DOSSIER,
            Indexation {
                percentage: 0.05,
                scheme_id: None,
                effective_before: Some(date("effective_before", "2005-01-01")?),
            },
        ))
        .build()
}

/// Scheme and start-date filters select only the first policy:
/// 40000 * 1.10 * 1.05 = 46200.
pub fn indexation_with_filters() -> Scenario {
    Scenario::new(INDEXATION_WITH_FILTERS, indexation_filters_request)
        .assert("policy1 salary ~46200", |r| salary_near(r, 0, 46200.0))
        .assert("policy2 salary unchanged 50000", |r| salary_near(r, 1, 50000.0))
}

// =============================================================================
// Validation rules
// =============================================================================

const DUPLICATE_DOSSIER_ID: &str = "dddddddd-0000-0000-0000-000000000007";

fn duplicate_dossier_request() -> Result<CalculationRequest, ScenarioError> {
    RequestBuilder::new("tenant-007")
        .mutation(Mutation::create_dossier(
            "77777777-0000-0000-0000-000000000001",
            date("actual_at", "2020-01-01")?,
            participant(
                DUPLICATE_DOSSIER_ID,
                "pppppppp-0000-0000-0000-000000000007",
                "First Owner",
                "1965-05-05",
            )?,
        ))
        .mutation(Mutation::create_dossier(
            "77777777-0000-0000-0000-000000000002",
            date("actual_at", "2021-01-01")?,
            participant(
                "dddddddd-0000-0000-0000-000000000008",
                "pppppppp-0000-0000-0000-000000000008",
                "Second Owner",
                "1966-06-06",
            )?,
        ))
        .build()
}

/// A second `create_dossier` on a situation that already has one.
pub fn duplicate_dossier() -> Scenario {
    Scenario::new(DUPLICATE_DOSSIER, duplicate_dossier_request)
        .assert("outcome FAILURE", |r| !r.is_success())
        .assert("has CRITICAL message", |r| r.has_level(Severity::Critical))
        .assert("DOSSIER_ALREADY_EXISTS code", |r| {
            r.has_code("DOSSIER_ALREADY_EXISTS")
        })
        .assert("end mutation_index=0", |r| r.end_mutation_index() == 0)
        .assert("first dossier kept", |r| {
            end_dossier_has(r, |d| d.dossier_id == DUPLICATE_DOSSIER_ID)
        })
}

const UNKNOWN_MUTATION_DOSSIER: &str = "dddddddd-0000-0000-0000-000000000009";

fn unknown_mutation_request() -> Result<CalculationRequest, ScenarioError> {
    RequestBuilder::new("tenant-008")
        .mutation(Mutation::create_dossier(
            "88888888-0000-0000-0000-000000000001",
            date("actual_at", "2020-01-01")?,
            participant(
                UNKNOWN_MUTATION_DOSSIER,
                "pppppppp-0000-0000-0000-000000000009",
                "Curious Tester",
                "1970-07-07",
            )?,
        ))
        .mutation(Mutation::custom(
            "88888888-0000-0000-0000-000000000002",
            "transfer_dossier",
            MutationType::Dossier,
            date("actual_at", "2021-01-01")?,
            Some(UNKNOWN_MUTATION_DOSSIER.to_string()),
            serde_json::Map::new(),
        ))
        .build()
}

/// A mutation definition the service has no handler for.
pub fn unknown_mutation() -> Scenario {
    Scenario::new(UNKNOWN_MUTATION, unknown_mutation_request)
        .assert("outcome FAILURE", |r| !r.is_success())
        .assert("has CRITICAL message", |r| r.has_level(Severity::Critical))
        .assert("UNKNOWN_MUTATION code", |r| r.has_code("UNKNOWN_MUTATION"))
        .assert("end mutation_index=0", |r| r.end_mutation_index() == 0)
}

const PROJECTION_DOSSIER: &str = "dddddddd-0000-0000-0000-000000000010";

fn invalid_projection_request() -> Result<CalculationRequest, ScenarioError> {
    RequestBuilder::new("tenant-009")
        .mutation(Mutation::create_dossier(
            "99999999-0000-0000-0000-000000000001",
            date("actual_at", "2020-01-01")?,
            participant(
                PROJECTION_DOSSIER,
                "pppppppp-0000-0000-0000-000000000010",
                "Early Planner",
                "1975-03-03",
            )?,
        ))
        .mutation(Mutation::add_policy(
            "99999999-0000-0000-0000-000000000002",
            date("actual_at", "2020-01-01")?,
            PROJECTION_DOSSIER,
            full_time("SCHEME-A", "2010-01-01", 45000.0)?,
        ))
        .mutation(Mutation::project_future_benefits(
            "99999999-0000-0000-0000-000000000003",
            date("actual_at", "2021-01-01")?,
            PROJECTION_DOSSIER,
            Projection {
                projection_start_date: date("projection_start_date", "2030-01-01")?,
                projection_end_date: date("projection_end_date", "2025-01-01")?,
                projection_interval_months: 12,
            },
        ))
        .build()
}

/// A projection whose end date precedes its start date.
pub fn invalid_projection_range() -> Scenario {
    Scenario::new(INVALID_PROJECTION_RANGE, invalid_projection_request)
        .assert("outcome FAILURE", |r| !r.is_success())
        .assert("has CRITICAL message", |r| r.has_level(Severity::Critical))
        .assert("INVALID_DATE_RANGE code", |r| r.has_code("INVALID_DATE_RANGE"))
        .assert("end mutation_index=1", |r| r.end_mutation_index() == 1)
        .assert("policy kept without projections", |r| {
            end_policy(r, 0).is_some_and(|p| p.projections.is_empty())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_registry_order() {
        let registry = default_registry();
        assert_eq!(registry.len(), 9);
        assert_eq!(registry.names()[0], README_EXAMPLE);
        assert_eq!(registry.names()[5], INDEXATION_WITH_FILTERS);
        assert_eq!(registry.names()[7], UNKNOWN_MUTATION);
        assert_eq!(registry.names()[8], INVALID_PROJECTION_RANGE);
    }

    #[test]
    fn test_every_request_builds() {
        for scenario in default_registry().iter() {
            let request = scenario
                .request()
                .unwrap_or_else(|e| panic!("{}: {}", scenario.name(), e));
            assert!(!request.mutations().is_empty());
        }
    }

    #[test]
    fn test_tenants_are_distinct() {
        let tenants: HashSet<String> = default_registry()
            .iter()
            .map(|s| s.request().unwrap().tenant_id)
            .collect();
        assert_eq!(tenants.len(), 9);
    }

    #[test]
    fn test_readme_request_wire_shape() {
        let request = readme_request().unwrap();
        let json = serde_json::to_value(&request).unwrap();
        let mutations = &json["calculation_instructions"]["mutations"];

        assert_eq!(mutations[0]["mutation_type"], "DOSSIER_CREATION");
        assert!(mutations[0].get("dossier_id").is_none());
        assert_eq!(mutations[0]["mutation_properties"]["birth_date"], "1960-06-15");
        assert_eq!(mutations[1]["dossier_id"], README_DOSSIER);
        assert_eq!(mutations[2]["mutation_properties"], serde_json::json!({ "percentage": 0.03 }));
    }

    #[test]
    fn test_projection_request_wire_shape() {
        let request = invalid_projection_request().unwrap();
        let json = serde_json::to_value(&request).unwrap();
        let projection = &json["calculation_instructions"]["mutations"][2];

        assert_eq!(projection["mutation_definition_name"], "project_future_benefits");
        assert_eq!(projection["mutation_type"], "DOSSIER");
        assert_eq!(projection["dossier_id"], PROJECTION_DOSSIER);
        assert_eq!(
            projection["mutation_properties"],
            serde_json::json!({
                "projection_start_date": "2030-01-01",
                "projection_end_date": "2025-01-01",
                "projection_interval_months": 12
            })
        );
    }
}

