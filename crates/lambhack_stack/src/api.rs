use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::cors::CorsOptions;
use crate::error::{Result, StackError};
use crate::function::LambdaFunction;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Any,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Any => "ANY",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = StackError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            "ANY" => Ok(Self::Any),
            _ => Err(StackError::InvalidHttpMethod(value.to_string())),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Stage {
    pub name: String,
}

impl Stage {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ApiMethod {
    pub http_method: HttpMethod,
    pub default_status: u16,
    pub response_statuses: Vec<u16>,
    pub supported_request_content_types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ApiResource {
    pub path: String,
    pub function_name: String,
    pub methods: Vec<ApiMethod>,
}

impl ApiResource {
    /// Declares a method on this resource. The default status is always part
    /// of the possible responses.
    pub fn new_method(
        &mut self,
        http_method: &str,
        default_status: u16,
        response_statuses: &[u16],
    ) -> Result<&mut ApiMethod> {
        let http_method: HttpMethod = http_method.parse()?;
        if self
            .methods
            .iter()
            .any(|method| method.http_method == http_method)
        {
            return Err(StackError::DuplicateMethod {
                path: self.path.clone(),
                method: http_method.to_string(),
            });
        }

        let mut statuses = Vec::with_capacity(response_statuses.len() + 1);
        for status in std::iter::once(default_status).chain(response_statuses.iter().copied()) {
            if !(100..=599).contains(&status) {
                return Err(StackError::InvalidStatusCode(status));
            }
            statuses.push(status);
        }
        statuses.sort_unstable();
        statuses.dedup();

        self.methods.push(ApiMethod {
            http_method,
            default_status,
            response_statuses: statuses,
            supported_request_content_types: Vec::new(),
        });
        let index = self.methods.len() - 1;
        Ok(&mut self.methods[index])
    }

    pub fn method(&self, http_method: HttpMethod) -> Option<&ApiMethod> {
        self.methods
            .iter()
            .find(|method| method.http_method == http_method)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ApiGateway {
    pub name: String,
    pub stage: Stage,
    pub resources: Vec<ApiResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cors_options: Option<CorsOptions>,
}

impl ApiGateway {
    pub fn new(name: impl Into<String>, stage: Stage) -> Self {
        Self {
            name: name.into(),
            stage,
            resources: Vec::new(),
            cors_options: None,
        }
    }

    pub fn new_resource(&mut self, path: &str, function: &LambdaFunction) -> Result<&mut ApiResource> {
        if !path.starts_with('/') {
            return Err(StackError::InvalidResourcePath(path.to_string()));
        }
        if self.resources.iter().any(|resource| resource.path == path) {
            return Err(StackError::DuplicateResource(path.to_string()));
        }

        self.resources.push(ApiResource {
            path: path.to_string(),
            function_name: function.name.clone(),
            methods: Vec::new(),
        });
        let index = self.resources.len() - 1;
        Ok(&mut self.resources[index])
    }

    pub fn resource(&self, path: &str) -> Option<&ApiResource> {
        self.resources.iter().find(|resource| resource.path == path)
    }
}
