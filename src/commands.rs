//! CLI command definitions
//!
//! Defines the clap commands for the PetFriends CLI.

use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Request an auth key for the configured account
    Key,

    /// List pets
    #[command(alias = "ls")]
    List {
        /// Only list pets owned by the configured account
        #[arg(long)]
        mine: bool,
    },

    /// Create a pet, with a photo if one is given
    Add {
        #[command(flatten)]
        fields: PetArgs,

        /// Photo file to upload with the pet
        #[arg(long)]
        photo: Option<PathBuf>,
    },

    /// Attach a photo to an existing pet
    Photo {
        /// Pet identifier
        pet_id: String,

        /// Photo file to upload
        path: PathBuf,
    },

    /// Update a pet's name, type and age
    Update {
        /// Pet identifier
        pet_id: String,

        #[command(flatten)]
        fields: PetArgs,
    },

    /// Delete a pet
    #[command(alias = "rm")]
    Delete {
        /// Pet identifier
        pet_id: String,
    },

    /// Run YAML test scenarios against the service
    Test {
        /// Scenario files to run, in order
        #[arg(required = true)]
        scenarios: Vec<PathBuf>,

        /// Print each response status and body
        #[arg(long, short)]
        verbose: bool,
    },
}

/// Pet attributes shared by `add` and `update`
#[derive(Args, Debug)]
pub struct PetArgs {
    /// Pet name
    #[arg(long)]
    pub name: String,

    /// Animal type, e.g. "кот"
    #[arg(long = "animal-type", alias = "type")]
    pub animal_type: String,

    /// Age in years (the service validates the range)
    #[arg(long, allow_negative_numbers = true)]
    pub age: i64,
}
