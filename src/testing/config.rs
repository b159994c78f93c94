//! Test scenario configuration types
//!
//! Defines the data structures for deserializing YAML test scenarios.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::api::{PetFields, PetFilter};
use crate::common::{Error, Result};

/// A complete test scenario loaded from a YAML file
#[derive(Deserialize, Debug)]
pub struct TestScenario {
    /// Name of the test scenario
    pub name: String,
    /// Optional description of what the test verifies
    pub description: Option<String>,
    /// The sequence of test steps to execute
    pub steps: Vec<TestStep>,
}

impl TestScenario {
    /// Load a scenario from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read test scenario '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&content)
    }

    /// Parse a scenario from YAML text
    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse test scenario: {}", e)))
    }
}

/// A single test step in the execution flow
#[derive(Deserialize, Debug)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TestStep {
    /// Request an auth key; the key is kept for later steps on a 200
    Authenticate {
        /// Email override (defaults to the configured account)
        email: Option<String>,
        /// Password override (defaults to the configured account)
        password: Option<String>,
        expect: Option<ResponseExpectation>,
    },
    /// List pets
    ListPets {
        #[serde(default)]
        filter: PetFilter,
        expect: Option<ResponseExpectation>,
    },
    /// Make sure the caller owns at least one pet and select the first one
    EnsureOwnPet {
        /// Name of the pet created when none exist
        #[serde(default = "default_fallback_name")]
        name: String,
        #[serde(default = "default_fallback_type")]
        animal_type: String,
        #[serde(default = "default_fallback_age")]
        age: i64,
    },
    /// Create a pet with a photo; selects it on success
    AddPet {
        name: String,
        animal_type: String,
        age: i64,
        /// Photo path, relative to the scenario file
        photo: PathBuf,
        expect: Option<ResponseExpectation>,
    },
    /// Create a pet without a photo; selects it on success
    AddPetSimple {
        name: String,
        animal_type: String,
        age: i64,
        expect: Option<ResponseExpectation>,
    },
    /// Attach a photo to the selected pet
    AddPhoto {
        photo: PathBuf,
        expect: Option<ResponseExpectation>,
    },
    /// Update the selected pet
    UpdatePet {
        name: String,
        animal_type: String,
        age: i64,
        expect: Option<ResponseExpectation>,
    },
    /// Delete the selected pet
    DeletePet { expect: Option<ResponseExpectation> },
    /// Assert the selected pet is no longer among the caller's pets
    CheckPetAbsent,
}

fn default_fallback_name() -> String {
    "Суперкот".to_string()
}
fn default_fallback_type() -> String {
    "кот".to_string()
}
fn default_fallback_age() -> i64 {
    3
}

impl TestStep {
    /// Short human-readable label for progress output
    pub fn describe(&self) -> String {
        match self {
            TestStep::Authenticate { password, .. } => match password {
                Some(_) => "authenticate (password override)".to_string(),
                None => "authenticate".to_string(),
            },
            TestStep::ListPets { filter, .. } => match filter {
                PetFilter::All => "list all pets".to_string(),
                PetFilter::MyPets => "list my pets".to_string(),
            },
            TestStep::EnsureOwnPet { .. } => "ensure an own pet exists".to_string(),
            TestStep::AddPet { name, age, .. } => format!("add pet '{}' (age {})", name, age),
            TestStep::AddPetSimple { name, age, .. } => {
                format!("add pet '{}' without photo (age {})", name, age)
            }
            TestStep::AddPhoto { photo, .. } => format!("add photo {}", photo.display()),
            TestStep::UpdatePet { name, age, .. } => {
                format!("update pet to '{}' (age {})", name, age)
            }
            TestStep::DeletePet { .. } => "delete pet".to_string(),
            TestStep::CheckPetAbsent => "check deleted pet is absent".to_string(),
        }
    }

    /// Pet fields for steps that send them
    pub fn pet_fields(&self) -> Option<PetFields> {
        match self {
            TestStep::EnsureOwnPet {
                name,
                animal_type,
                age,
            }
            | TestStep::AddPet {
                name,
                animal_type,
                age,
                ..
            }
            | TestStep::AddPetSimple {
                name,
                animal_type,
                age,
                ..
            }
            | TestStep::UpdatePet {
                name,
                animal_type,
                age,
                ..
            } => Some(PetFields::new(name.clone(), animal_type.clone(), *age)),
            _ => None,
        }
    }
}

/// Expectations for an API response
#[derive(Deserialize, Debug, Default)]
pub struct ResponseExpectation {
    /// Expected status code (default: 200)
    pub status: Option<u16>,
    /// Expected body field values; numbers and strings compare by text
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
    /// Body fields that must exist
    #[serde(default)]
    pub present: Vec<String>,
    /// Body fields that must be non-empty strings
    #[serde(default)]
    pub non_empty: Vec<String>,
    /// Body fields that must be empty strings
    #[serde(default)]
    pub empty: Vec<String>,
    /// Minimum number of entries in `pets`
    pub min_pets: Option<usize>,
}

impl ResponseExpectation {
    /// Effective expected status
    pub fn status(&self) -> u16 {
        self.status.unwrap_or(200)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scenario() {
        let scenario = TestScenario::parse(
            r#"
name: Add pet with valid data
description: Adding a pet with a photo returns the pet
steps:
  - action: authenticate
  - action: add_pet
    name: Барбоскин
    animal_type: двортерьер
    age: 4
    photo: ../images/cat1.jpg
    expect:
      status: 200
      fields:
        name: Барбоскин
  - action: check_pet_absent
"#,
        )
        .unwrap();

        assert_eq!(scenario.name, "Add pet with valid data");
        assert_eq!(scenario.steps.len(), 3);
        match &scenario.steps[1] {
            TestStep::AddPet {
                name, age, expect, ..
            } => {
                assert_eq!(name, "Барбоскин");
                assert_eq!(*age, 4);
                let expect = expect.as_ref().unwrap();
                assert_eq!(expect.status(), 200);
                assert_eq!(expect.fields["name"], Value::from("Барбоскин"));
            }
            other => panic!("Expected AddPet step, got {:?}", other),
        }
        assert!(matches!(scenario.steps[2], TestStep::CheckPetAbsent));
    }

    #[test]
    fn test_ensure_own_pet_defaults() {
        let scenario = TestScenario::parse(
            "name: x\nsteps:\n  - action: ensure_own_pet\n  - action: list_pets\n    filter: my_pets\n",
        )
        .unwrap();

        let fields = scenario.steps[0].pet_fields().unwrap();
        assert_eq!(fields, PetFields::new("Суперкот", "кот", 3));
        match &scenario.steps[1] {
            TestStep::ListPets { filter, expect } => {
                assert_eq!(*filter, PetFilter::MyPets);
                assert!(expect.is_none());
            }
            other => panic!("Expected ListPets step, got {:?}", other),
        }
    }

    #[test]
    fn test_filter_accepts_query_values() {
        let scenario = TestScenario::parse(
            r#"
name: filters
steps:
  - action: list_pets
    filter: ""
  - action: list_pets
    filter: all
  - action: list_pets
    filter: my_pets
  - action: list_pets
"#,
        )
        .unwrap();

        let filters: Vec<PetFilter> = scenario
            .steps
            .iter()
            .map(|step| match step {
                TestStep::ListPets { filter, .. } => *filter,
                other => panic!("Expected ListPets step, got {:?}", other),
            })
            .collect();
        assert_eq!(
            filters,
            vec![PetFilter::All, PetFilter::All, PetFilter::MyPets, PetFilter::All]
        );

        let err = TestScenario::parse(
            "name: x\nsteps:\n  - action: list_pets\n    filter: others\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("Unknown pet filter"));
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let err = TestScenario::parse("name: x\nsteps:\n  - action: feed_pet\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_describe_steps() {
        let step = TestStep::UpdatePet {
            name: "Мурзик".to_string(),
            animal_type: "Котэ".to_string(),
            age: 5,
            expect: None,
        };
        assert_eq!(step.describe(), "update pet to 'Мурзик' (age 5)");
        assert!(TestStep::DeletePet { expect: None }.pet_fields().is_none());
    }
}
