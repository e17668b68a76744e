use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::cors::TemplateValue;

/// IAM role for a function. Empty privileges leave the engine's defaults in place.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct IamRoleDefinition {
    pub privileges: Vec<IamPrivilege>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IamPrivilege {
    pub actions: Vec<String>,
    pub resource: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LambdaFunction {
    pub name: String,
    pub handler: String,
    pub runtime: String,
    pub artifact: PathBuf,
    pub role: IamRoleDefinition,
    pub environment: BTreeMap<String, TemplateValue>,
}

impl LambdaFunction {
    pub fn new(name: impl Into<String>, role: IamRoleDefinition, artifact: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            handler: "bootstrap".to_string(),
            runtime: "provided.al2023".to_string(),
            artifact: artifact.into(),
            role,
            environment: BTreeMap::new(),
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<TemplateValue>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }
}
