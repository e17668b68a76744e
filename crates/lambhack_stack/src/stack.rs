use std::path::{Path, PathBuf};

use lambhack_core::contract::{
    ALLOWED_ORIGIN_ENV, CORS_ALLOW_HEADERS, CORS_ALLOW_METHODS, JSON_CONTENT_TYPE,
};
use serde::Serialize;

use crate::api::{ApiGateway, Stage};
use crate::cors::CorsOptions;
use crate::deployer::Deployer;
use crate::error::Result;
use crate::function::{IamRoleDefinition, LambdaFunction};
use crate::site::S3Site;

pub const STACK_BASENAME: &str = "lambhack";
pub const STACK_DESCRIPTION: &str = "Sacrificial lambs";
pub const FUNCTION_NAME: &str = "lambhack";
pub const API_NAME: &str = "lambhack";
pub const API_STAGE: &str = "prod";
pub const RESOURCE_PATH: &str = "/lambhack";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WiringConfig {
    pub site_dir: PathBuf,
    pub artifact: PathBuf,
    pub user: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StackDeclaration {
    pub stack_name: String,
    pub description: String,
    pub functions: Vec<LambdaFunction>,
    pub api: ApiGateway,
    pub site: S3Site,
}

/// Reads the platform user the way a deploying developer would see it.
pub fn platform_user() -> Option<String> {
    ["USER", "USERNAME"]
        .iter()
        .find_map(|key| std::env::var(key).ok())
        .filter(|value| !value.trim().is_empty())
}

/// `<basename>-<user>`, with every non-alphanumeric user character replaced by
/// `-`. Without a user the basename is returned unchanged.
pub fn user_scoped_stack_name(basename: &str, user: Option<&str>) -> String {
    let Some(user) = user.map(str::trim).filter(|user| !user.is_empty()) else {
        return basename.to_string();
    };
    let user: String = user
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '-' })
        .collect();
    format!("{basename}-{user}")
}

pub fn lambhack_cors_options(site: &S3Site) -> CorsOptions {
    CorsOptions::default()
        .with_header("Access-Control-Allow-Headers", CORS_ALLOW_HEADERS)
        .with_header("Access-Control-Allow-Methods", CORS_ALLOW_METHODS)
        .with_header("Access-Control-Allow-Origin", site.website_url())
}

/// Declares the lambhack function and, when an API is given, its
/// `GET /lambhack` route.
pub fn lambhack_functions(
    api: Option<&mut ApiGateway>,
    site: &S3Site,
    artifact: &Path,
) -> Result<Vec<LambdaFunction>> {
    let function = LambdaFunction::new(FUNCTION_NAME, IamRoleDefinition::default(), artifact)
        .with_env(ALLOWED_ORIGIN_ENV, site.website_url());

    if let Some(api) = api {
        let resource = api.new_resource(RESOURCE_PATH, &function)?;
        // Only 200 is ever returned by the integration.
        let method = resource.new_method("GET", 200, &[200])?;
        method.supported_request_content_types = vec![JSON_CONTENT_TYPE.to_string()];
    }

    Ok(vec![function])
}

pub fn build_lambhack_stack(config: &WiringConfig) -> Result<StackDeclaration> {
    let site = S3Site::new(&config.site_dir)?;

    let mut api = ApiGateway::new(API_NAME, Stage::new(API_STAGE));
    api.cors_options = Some(lambhack_cors_options(&site));

    let functions = lambhack_functions(Some(&mut api), &site, &config.artifact)?;

    Ok(StackDeclaration {
        stack_name: user_scoped_stack_name(STACK_BASENAME, config.user.as_deref()),
        description: STACK_DESCRIPTION.to_string(),
        functions,
        api,
        site,
    })
}

/// Builds the whole declaration before the deployer sees any of it, so a
/// construction failure never reaches the deployment engine.
pub fn run_deployment(config: &WiringConfig, deployer: &dyn Deployer) -> Result<StackDeclaration> {
    hand_off(|| build_lambhack_stack(config), deployer)
}

/// Runs `build` to completion and provisions its result. The deployer is
/// only called once `build` has succeeded.
pub fn hand_off(
    build: impl FnOnce() -> Result<StackDeclaration>,
    deployer: &dyn Deployer,
) -> Result<StackDeclaration> {
    let stack = build()?;
    tracing::info!(
        stack_name = %stack.stack_name,
        site = %stack.site.resource_name,
        functions = stack.functions.len(),
        "provisioning stack"
    );
    deployer.provision(&stack)?;
    Ok(stack)
}
