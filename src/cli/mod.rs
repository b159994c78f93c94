//! CLI command handling
//!
//! Dispatches CLI commands to the PetFriends client and formats output.
//! Every command prints `status: <code>` on the first line of stdout,
//! followed by the response body as pretty JSON (`key` prints the bare key
//! instead). A non-2xx status also makes the command fail.

use serde_json::Value;

use crate::api::{ApiResponse, PetFields, PetFilter, PetFriends};
use crate::commands::{Commands, PetArgs};
use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::testing;

/// Dispatch a CLI command
pub async fn dispatch(command: Commands, config: &Config) -> Result<()> {
    let client = PetFriends::from_config(config)?;
    tracing::debug!("Using PetFriends at {}", client.base_url());

    match command {
        Commands::Key => {
            let credentials = config.credentials()?;
            let response = client
                .get_api_key(credentials.email(), credentials.password())
                .await?;

            if response.status == 200 {
                let key = response.auth_key()?;
                println!("{}", status_line(&response));
                println!("{}", key.as_str());
                Ok(())
            } else {
                print_response(&response)
            }
        }

        Commands::List { mine } => {
            let key = client.authenticate(&config.credentials()?).await?;
            let filter = if mine { PetFilter::MyPets } else { PetFilter::All };
            let response = client.get_list_of_pets(&key, filter).await?;
            if response.is_success() {
                // Reject bodies that are not a pet listing before printing
                response.pets()?;
            }
            print_response(&response)
        }

        Commands::Add { fields, photo } => {
            let key = client.authenticate(&config.credentials()?).await?;
            let fields = pet_fields(fields);
            let response = match photo {
                Some(path) => client.add_new_pet(&key, &fields, &path).await?,
                None => client.add_new_pet_simple(&key, &fields).await?,
            };
            print_response(&response)
        }

        Commands::Photo { pet_id, path } => {
            let key = client.authenticate(&config.credentials()?).await?;
            let response = client.add_photo_of_pet(&key, &pet_id, &path).await?;
            print_response(&response)
        }

        Commands::Update { pet_id, fields } => {
            let key = client.authenticate(&config.credentials()?).await?;
            let response = client
                .update_pet_info(&key, &pet_id, &pet_fields(fields))
                .await?;
            print_response(&response)
        }

        Commands::Delete { pet_id } => {
            let key = client.authenticate(&config.credentials()?).await?;
            let response = client.delete_pet(&key, &pet_id).await?;
            print_response(&response)
        }

        Commands::Test { scenarios, verbose } => {
            let credentials = config.credentials()?;
            let results = testing::run_suite(&client, &credentials, &scenarios, verbose).await;
            let failed = testing::print_summary(&results);

            if failed > 0 {
                Err(Error::TestAssertion(format!(
                    "{} of {} scenarios failed",
                    failed,
                    results.len()
                )))
            } else {
                Ok(())
            }
        }
    }
}

fn pet_fields(args: PetArgs) -> PetFields {
    PetFields::new(args.name, args.animal_type, args.age)
}

fn status_line(response: &ApiResponse) -> String {
    format!("status: {}", response.status)
}

/// Status line followed by the pretty-printed body
fn render_response(response: &ApiResponse) -> Result<String> {
    Ok(format!(
        "{}\n{}",
        status_line(response),
        serde_json::to_string_pretty(&response.body)?
    ))
}

/// Print a response, failing on non-2xx statuses
fn print_response(response: &ApiResponse) -> Result<()> {
    println!("{}", render_response(response)?);

    if !response.is_success() {
        return Err(Error::Api {
            status: response.status,
            body: body_text(&response.body),
        });
    }
    Ok(())
}

fn body_text(body: &Value) -> String {
    match body {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_response_starts_with_status() {
        let response = ApiResponse {
            status: 200,
            body: json!({"pets": [{"id": "p1"}]}),
        };
        let rendered = render_response(&response).unwrap();
        let (first, rest) = rendered.split_once('\n').unwrap();

        assert_eq!(first, "status: 200");
        let body: Value = serde_json::from_str(rest).unwrap();
        assert_eq!(body["pets"][0]["id"], "p1");
    }

    #[test]
    fn test_error_status_is_printed_and_fails() {
        let response = ApiResponse {
            status: 400,
            body: json!("Bad Request"),
        };
        assert_eq!(
            render_response(&response).unwrap(),
            "status: 400\n\"Bad Request\""
        );

        let err = print_response(&response).unwrap_err();
        assert!(matches!(err, Error::Api { status: 400, ref body } if body == "Bad Request"));
    }
}
