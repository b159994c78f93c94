//! Test runner implementation
//!
//! Executes scenarios step by step against a live `PetFriends` client,
//! asserting on the structured status and body of each response.

use std::path::{Path, PathBuf};

use colored::Colorize;
use serde_json::Value;

use crate::api::{ApiResponse, AuthKey, Credentials, PetFields, PetFilter, PetFriends};
use crate::common::{Error, Result};

use super::config::{ResponseExpectation, TestScenario, TestStep};

/// Result of a test run
#[derive(Debug)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub steps_run: usize,
    pub steps_total: usize,
    pub error: Option<String>,
}

/// State carried between the steps of one scenario
#[derive(Debug, Default)]
struct ScenarioContext {
    key: Option<AuthKey>,
    pet_id: Option<String>,
}

impl ScenarioContext {
    fn key(&self) -> Result<&AuthKey> {
        self.key.as_ref().ok_or_else(|| {
            Error::assertion("No auth key. Add a successful 'authenticate' step first")
        })
    }

    fn pet_id(&self) -> Result<&str> {
        self.pet_id.as_deref().ok_or_else(|| {
            Error::assertion(
                "No pet selected. Add an 'ensure_own_pet', 'add_pet' or 'add_pet_simple' step first",
            )
        })
    }
}

/// Everything a step needs besides the scenario context
struct StepEnv<'a> {
    client: &'a PetFriends,
    credentials: &'a Credentials,
    /// Directory that relative photo paths resolve against
    base_dir: &'a Path,
    verbose: bool,
}

/// Run a test scenario from a YAML file
pub async fn run_scenario(
    client: &PetFriends,
    credentials: &Credentials,
    path: &Path,
    verbose: bool,
) -> Result<TestResult> {
    let scenario = TestScenario::from_file(path)?;
    let base_dir = path.parent().unwrap_or(Path::new("."));
    Ok(run_loaded(client, credentials, &scenario, base_dir, verbose).await)
}

/// Run several scenario files one after another
///
/// A file that cannot be loaded is reported as a failed result.
pub async fn run_suite(
    client: &PetFriends,
    credentials: &Credentials,
    paths: &[PathBuf],
    verbose: bool,
) -> Vec<TestResult> {
    let mut results = Vec::with_capacity(paths.len());

    for path in paths {
        match run_scenario(client, credentials, path, verbose).await {
            Ok(result) => results.push(result),
            Err(e) => {
                println!("\n{} {}: {}", "✗".red(), path.display(), e);
                results.push(TestResult {
                    name: path.display().to_string(),
                    passed: false,
                    steps_run: 0,
                    steps_total: 0,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    results
}

/// Run an already-parsed scenario
pub async fn run_loaded(
    client: &PetFriends,
    credentials: &Credentials,
    scenario: &TestScenario,
    base_dir: &Path,
    verbose: bool,
) -> TestResult {
    let steps_total = scenario.steps.len();

    println!(
        "\n{} {}",
        "Running Test:".blue().bold(),
        scenario.name.white().bold()
    );

    if let Some(desc) = &scenario.description {
        println!("  {}", desc.dimmed());
    }

    let env = StepEnv {
        client,
        credentials,
        base_dir,
        verbose,
    };
    let mut ctx = ScenarioContext::default();

    println!("\n{}", "Steps:".cyan());

    for (i, step) in scenario.steps.iter().enumerate() {
        let step_num = i + 1;

        if let Err(e) = execute_step(&env, &mut ctx, step).await {
            println!("  {} Step {}: {}", "✗".red(), step_num, e);
            tracing::debug!("Scenario '{}' failed at step {}", scenario.name, step_num);

            return TestResult {
                name: scenario.name.clone(),
                passed: false,
                steps_run: step_num,
                steps_total,
                error: Some(e.to_string()),
            };
        }

        println!(
            "  {} Step {}: {}",
            "✓".green(),
            step_num,
            step.describe().dimmed()
        );
    }

    println!(
        "\n{} {}\n",
        "✓".green().bold(),
        "Test Passed".green().bold()
    );

    TestResult {
        name: scenario.name.clone(),
        passed: true,
        steps_run: steps_total,
        steps_total,
        error: None,
    }
}

/// Print a one-line-per-scenario summary and return the number of failures
pub fn print_summary(results: &[TestResult]) -> usize {
    let failed = results.iter().filter(|r| !r.passed).count();

    println!("{}", "Summary:".cyan().bold());
    for result in results {
        if result.passed {
            println!("  {} {}", "✓".green(), result.name);
        } else {
            println!(
                "  {} {} (step {}/{}): {}",
                "✗".red(),
                result.name,
                result.steps_run,
                result.steps_total,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    let line = format!("{} passed, {} failed", results.len() - failed, failed);
    if failed == 0 {
        println!("\n{}", line.green().bold());
    } else {
        println!("\n{}", line.red().bold());
    }

    failed
}

/// Execute a single test step
async fn execute_step(env: &StepEnv<'_>, ctx: &mut ScenarioContext, step: &TestStep) -> Result<()> {
    match step {
        TestStep::Authenticate {
            email,
            password,
            expect,
        } => {
            let email = email.as_deref().unwrap_or(env.credentials.email());
            let password = password.as_deref().unwrap_or(env.credentials.password());

            let response = env.client.get_api_key(email, password).await?;
            report(env, &response);

            match expect {
                Some(exp) => check_response(&response, exp)?,
                None => check_response(
                    &response,
                    &ResponseExpectation {
                        present: vec!["key".to_string()],
                        ..Default::default()
                    },
                )?,
            }

            ctx.key = if response.status == 200 {
                Some(response.auth_key()?)
            } else {
                None
            };
            Ok(())
        }

        TestStep::ListPets { filter, expect } => {
            let response = env.client.get_list_of_pets(ctx.key()?, *filter).await?;
            report(env, &response);
            check_expected(&response, expect.as_ref())
        }

        TestStep::EnsureOwnPet { .. } => {
            let fields = step
                .pet_fields()
                .ok_or_else(|| Error::assertion("ensure_own_pet has no pet fields"))?;
            let pet_id = ensure_own_pet(env, ctx.key()?, &fields).await?;
            ctx.pet_id = Some(pet_id);
            Ok(())
        }

        TestStep::AddPet { photo, expect, .. } => {
            let fields = step
                .pet_fields()
                .ok_or_else(|| Error::assertion("add_pet has no pet fields"))?;
            let photo = resolve_path(env.base_dir, photo);

            let response = env.client.add_new_pet(ctx.key()?, &fields, &photo).await?;
            report(env, &response);
            check_expected(&response, expect.as_ref())?;
            select_created(ctx, &response);
            Ok(())
        }

        TestStep::AddPetSimple { expect, .. } => {
            let fields = step
                .pet_fields()
                .ok_or_else(|| Error::assertion("add_pet_simple has no pet fields"))?;

            let response = env.client.add_new_pet_simple(ctx.key()?, &fields).await?;
            report(env, &response);
            check_expected(&response, expect.as_ref())?;
            select_created(ctx, &response);
            Ok(())
        }

        TestStep::AddPhoto { photo, expect } => {
            let photo = resolve_path(env.base_dir, photo);
            let response = env
                .client
                .add_photo_of_pet(ctx.key()?, ctx.pet_id()?, &photo)
                .await?;
            report(env, &response);
            check_expected(&response, expect.as_ref())
        }

        TestStep::UpdatePet { expect, .. } => {
            let fields = step
                .pet_fields()
                .ok_or_else(|| Error::assertion("update_pet has no pet fields"))?;

            let response = env
                .client
                .update_pet_info(ctx.key()?, ctx.pet_id()?, &fields)
                .await?;
            report(env, &response);
            check_expected(&response, expect.as_ref())
        }

        TestStep::DeletePet { expect } => {
            let response = env.client.delete_pet(ctx.key()?, ctx.pet_id()?).await?;
            report(env, &response);
            check_expected(&response, expect.as_ref())
        }

        TestStep::CheckPetAbsent => {
            let pet_id = ctx.pet_id()?;
            let response = env
                .client
                .get_list_of_pets(ctx.key()?, PetFilter::MyPets)
                .await?;
            report(env, &response);
            check_response(&response, &ResponseExpectation::default())?;

            if response.contains_pet(pet_id)? {
                return Err(Error::assertion(format!(
                    "Pet '{}' is still listed among own pets",
                    pet_id
                )));
            }
            Ok(())
        }
    }
}

/// Return the id of the caller's first pet, creating one when there are none
async fn ensure_own_pet(env: &StepEnv<'_>, key: &AuthKey, fallback: &PetFields) -> Result<String> {
    let response = env.client.get_list_of_pets(key, PetFilter::MyPets).await?;
    report(env, &response);
    check_response(&response, &ResponseExpectation::default())?;

    let mut pets = response.pets()?;
    if pets.is_empty() {
        tracing::info!("No own pets, creating '{}'", fallback.name);

        let created = env.client.add_new_pet_simple(key, fallback).await?;
        report(env, &created);
        check_response(&created, &ResponseExpectation::default())?;

        let response = env.client.get_list_of_pets(key, PetFilter::MyPets).await?;
        report(env, &response);
        check_response(&response, &ResponseExpectation::default())?;
        pets = response.pets()?;
    }

    pets.into_iter()
        .next()
        .map(|pet| pet.id)
        .ok_or(Error::NoOwnPets)
}

/// Select a newly created pet for the following steps
fn select_created(ctx: &mut ScenarioContext, response: &ApiResponse) {
    if response.status != 200 {
        return;
    }
    if let Ok(pet) = response.pet() {
        ctx.pet_id = Some(pet.id);
    }
}

fn resolve_path(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_relative() {
        base_dir.join(path)
    } else {
        path.to_path_buf()
    }
}

fn report(env: &StepEnv<'_>, response: &ApiResponse) {
    if env.verbose {
        println!(
            "    {} {}",
            format!("[{}]", response.status).dimmed(),
            snippet(&response.body).dimmed()
        );
    }
}

fn check_expected(response: &ApiResponse, expect: Option<&ResponseExpectation>) -> Result<()> {
    match expect {
        Some(exp) => check_response(response, exp),
        None => check_response(response, &ResponseExpectation::default()),
    }
}

/// Check a response against expectations
fn check_response(response: &ApiResponse, exp: &ResponseExpectation) -> Result<()> {
    let expected_status = exp.status();
    if response.status != expected_status {
        return Err(Error::assertion(format!(
            "Expected status {}, got {}: {}",
            expected_status,
            response.status,
            snippet(&response.body)
        )));
    }

    for (name, expected) in &exp.fields {
        let actual = response
            .field(name)
            .ok_or_else(|| Error::assertion(format!("Field '{}' missing from response", name)))?;
        if !values_match(expected, actual) {
            return Err(Error::assertion(format!(
                "Expected {} = {}, got {}",
                name, expected, actual
            )));
        }
    }

    for name in &exp.present {
        if response.field(name).is_none() {
            return Err(Error::assertion(format!(
                "Field '{}' missing from response",
                name
            )));
        }
    }

    for name in &exp.non_empty {
        match response.str_field(name) {
            Some(value) if !value.is_empty() => {}
            _ => {
                return Err(Error::assertion(format!(
                    "Expected field '{}' to be a non-empty string",
                    name
                )))
            }
        }
    }

    for name in &exp.empty {
        if response.str_field(name) != Some("") {
            return Err(Error::assertion(format!(
                "Expected field '{}' to be empty, got {}",
                name,
                response.field(name).map(Value::to_string).unwrap_or_else(|| "nothing".to_string())
            )));
        }
    }

    if let Some(min) = exp.min_pets {
        let count = response.pets()?.len();
        if count < min {
            return Err(Error::assertion(format!(
                "Expected at least {} pets, got {}",
                min, count
            )));
        }
    }

    Ok(())
}

/// Compare an expected value with the service's, treating `4` and `"4"` alike
fn values_match(expected: &Value, actual: &Value) -> bool {
    if expected == actual {
        return true;
    }
    match (scalar_text(expected), scalar_text(actual)) {
        (Some(e), Some(a)) => e == a,
        _ => false,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Body text shortened for messages; photos are data URLs and get long
fn snippet(body: &Value) -> String {
    const MAX: usize = 200;
    let text = match body {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if text.chars().count() > MAX {
        let cut: String = text.chars().take(MAX).collect();
        format!("{}...", cut)
    } else {
        text
    }
}
