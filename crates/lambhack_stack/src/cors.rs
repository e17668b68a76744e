use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Deploy-time reference to an attribute of another declared resource.
///
/// Serializes as `{"Fn::GetAtt": [resource, attribute]}` so the deployment
/// engine resolves it; it is never turned into a literal here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRef {
    pub resource: String,
    pub attribute: String,
}

impl AttributeRef {
    pub fn new(resource: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            attribute: attribute.into(),
        }
    }
}

impl Serialize for AttributeRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("Fn::GetAtt", &[&self.resource, &self.attribute])?;
        map.end()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum TemplateValue {
    Literal(String),
    Attribute(AttributeRef),
}

impl TemplateValue {
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    pub fn as_attribute(&self) -> Option<&AttributeRef> {
        match self {
            Self::Attribute(reference) => Some(reference),
            Self::Literal(_) => None,
        }
    }
}

impl From<AttributeRef> for TemplateValue {
    fn from(reference: AttributeRef) -> Self {
        Self::Attribute(reference)
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CorsOptions {
    pub headers: BTreeMap<String, TemplateValue>,
}

impl CorsOptions {
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<TemplateValue>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&TemplateValue> {
        self.headers.get(name)
    }
}

impl From<&str> for TemplateValue {
    fn from(value: &str) -> Self {
        Self::literal(value)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn serializes_literal_and_attribute_headers() {
        let options = CorsOptions::default()
            .with_header("Access-Control-Allow-Methods", "*")
            .with_header(
                "Access-Control-Allow-Origin",
                AttributeRef::new("S3Site1234abcd", "WebsiteURL"),
            );

        let value = serde_json::to_value(&options).expect("options should serialize");

        assert_eq!(
            value,
            json!({
                "headers": {
                    "Access-Control-Allow-Methods": "*",
                    "Access-Control-Allow-Origin": {"Fn::GetAtt": ["S3Site1234abcd", "WebsiteURL"]}
                }
            })
        );
    }

    #[test]
    fn later_header_replaces_earlier_value() {
        let options = CorsOptions::default()
            .with_header("Access-Control-Allow-Methods", "GET")
            .with_header("Access-Control-Allow-Methods", "*");

        assert_eq!(
            options.header("Access-Control-Allow-Methods"),
            Some(&TemplateValue::literal("*"))
        );
    }
}
