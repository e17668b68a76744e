//! Deployment wiring for lambhack.
//!
//! Builds the declaration of every deployable resource (static site, REST API,
//! CORS options and the Lambda function) and hands it to a [`deployer::Deployer`].
//! Template synthesis and provisioning belong to the deployment engine behind
//! that trait.

pub mod api;
pub mod cors;
pub mod deployer;
pub mod error;
pub mod function;
pub mod site;
pub mod stack;
