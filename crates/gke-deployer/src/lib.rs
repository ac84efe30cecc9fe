//! Environment preparation and credential retrieval for GKE end-to-end runs.
//!
//! Every `gcloud` call goes through a [`system_utils::CommandRunner`], with the
//! endpoint override and traceback settings carried in an explicit
//! [`system_utils::ToolContext`] instead of the process environment.

mod credentials;
mod deployer;
pub mod environment;
mod error;
pub mod gcloud;
mod prepare;
mod project;
pub mod ssh_keys;
#[cfg(test)]
mod test_utils;

pub use deployer::{Deployer, DeployerSettings};
pub use environment::{resolve_endpoint, Environment, URL_PATTERN};
pub use error::{DeployerError, PrepareStep};
pub use gcloud::{container_args, Gcloud, Location, DEFAULT_GCLOUD};
pub use prepare::{PrepareState, PreparedEnvironment, ENDPOINT_OVERRIDE_VAR, PRINT_TRACEBACKS_VAR};
