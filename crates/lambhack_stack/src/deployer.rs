use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;

use crate::error::{Result, StackError};
use crate::stack::StackDeclaration;

pub const MANIFEST_SCHEMA_VERSION: &str = "v1";

/// Receives the complete stack declaration.
///
/// Implementations own everything after hand-off: template synthesis,
/// provisioning and teardown.
pub trait Deployer {
    fn provision(&self, stack: &StackDeclaration) -> Result<()>;

    fn describe(&self, stack: &StackDeclaration) -> Result<String>;

    fn delete(&self, stack_name: &str) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct StackManifest<'a> {
    schema_version: &'static str,
    synthesized_at: String,
    stack: &'a StackDeclaration,
}

/// Writes the declaration as `<stack_name>.stack.json` under a dist directory,
/// where an external engine picks it up.
#[derive(Debug, Clone)]
pub struct ManifestDeployer {
    dist_dir: PathBuf,
}

impl ManifestDeployer {
    pub fn new(dist_dir: impl Into<PathBuf>) -> Self {
        Self {
            dist_dir: dist_dir.into(),
        }
    }

    pub fn manifest_path(&self, stack_name: &str) -> PathBuf {
        self.dist_dir.join(format!("{stack_name}.stack.json"))
    }

    pub fn is_provisioned(&self, stack_name: &str) -> bool {
        self.manifest_path(stack_name).is_file()
    }

    fn render(&self, stack: &StackDeclaration) -> Result<String> {
        let manifest = StackManifest {
            schema_version: MANIFEST_SCHEMA_VERSION,
            synthesized_at: Utc::now().to_rfc3339(),
            stack,
        };
        Ok(serde_json::to_string_pretty(&manifest)?)
    }
}

impl Deployer for ManifestDeployer {
    fn provision(&self, stack: &StackDeclaration) -> Result<()> {
        fs::create_dir_all(&self.dist_dir)?;
        let path = self.manifest_path(&stack.stack_name);
        fs::write(&path, self.render(stack)?)?;
        tracing::info!(manifest = %path.display(), "wrote stack manifest");
        Ok(())
    }

    fn describe(&self, stack: &StackDeclaration) -> Result<String> {
        self.render(stack)
    }

    fn delete(&self, stack_name: &str) -> Result<()> {
        let path = self.manifest_path(stack_name);
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(manifest = %path.display(), "removed stack manifest");
                Ok(())
            }
            Err(error) if error.kind() == ErrorKind::NotFound => {
                Err(StackError::NotProvisioned(stack_name.to_string()))
            }
            Err(error) => Err(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use serde_json::Value;

    use crate::stack::{build_lambhack_stack, WiringConfig};

    use super::*;

    fn stack(dir: &Path) -> StackDeclaration {
        let site_dir = dir.join("resources");
        fs::create_dir_all(&site_dir).expect("site dir should be created");
        fs::write(site_dir.join("index.html"), "<html></html>").expect("index should be written");
        build_lambhack_stack(&WiringConfig {
            site_dir,
            artifact: dir.join("dist/lambhack.zip"),
            user: Some("ci".to_string()),
        })
        .expect("stack should build")
    }

    #[test]
    fn provision_writes_manifest_with_getatt_origin() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let stack = stack(dir.path());
        let deployer = ManifestDeployer::new(dir.path().join("dist"));

        deployer.provision(&stack).expect("provision should succeed");

        let path = deployer.manifest_path("lambhack-ci");
        assert!(deployer.is_provisioned("lambhack-ci"));
        let manifest: Value =
            serde_json::from_slice(&fs::read(path).expect("manifest should exist"))
                .expect("manifest should be json");
        assert_eq!(manifest["schema_version"], "v1");
        assert_eq!(manifest["stack"]["description"], "Sacrificial lambs");
        assert_eq!(
            manifest["stack"]["api"]["cors_options"]["headers"]["Access-Control-Allow-Origin"]
                ["Fn::GetAtt"][1],
            "WebsiteURL"
        );
        assert_eq!(
            manifest["stack"]["api"]["resources"][0]["methods"][0]["http_method"],
            "GET"
        );
    }

    #[test]
    fn describe_does_not_write() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let stack = stack(dir.path());
        let deployer = ManifestDeployer::new(dir.path().join("dist"));

        let rendered = deployer.describe(&stack).expect("describe should succeed");

        assert!(rendered.contains("\"stack_name\": \"lambhack-ci\""));
        assert!(!deployer.is_provisioned("lambhack-ci"));
    }

    #[test]
    fn delete_removes_manifest_and_reports_missing_stack() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let stack = stack(dir.path());
        let deployer = ManifestDeployer::new(dir.path().join("dist"));
        deployer.provision(&stack).expect("provision should succeed");

        deployer.delete("lambhack-ci").expect("delete should succeed");
        let error = deployer
            .delete("lambhack-ci")
            .expect_err("second delete should fail");

        assert!(!deployer.is_provisioned("lambhack-ci"));
        assert!(matches!(error, StackError::NotProvisioned(ref name) if name == "lambhack-ci"));
    }
}
