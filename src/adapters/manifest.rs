use crate::adapters::registry::TypeRegistry;
use crate::config::substitute_env_vars;
use crate::domain::model::{
    Attribute, InterfaceDescriptor, MemberKind, Signature, TargetMember, TypeDescriptor, ROOT_TYPE,
};
use crate::utils::error::{ProxyError, Result};
use crate::utils::validation::{validate_type_name, validate_type_names, validate_unique_names, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Type metadata described in TOML. Members carry no bodies, so types loaded
/// this way can be planned but not lowered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryManifest {
    #[serde(default)]
    pub interfaces: Vec<InterfaceDescriptor>,
    #[serde(default)]
    pub types: Vec<TypeManifest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeManifest {
    pub name: String,
    pub base: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub default_constructor: bool,
    #[serde(default)]
    pub members: Vec<MemberManifest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberManifest {
    pub name: String,
    #[serde(default = "method_kind")]
    pub kind: MemberKind,
    #[serde(flatten)]
    pub signature: Signature,
    pub qualifier: Option<String>,
}

fn method_kind() -> MemberKind {
    MemberKind::Method
}

impl RegistryManifest {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ProxyError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ProxyError::ConfigValidationError {
            field: "manifest".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn into_registry(self) -> Result<TypeRegistry> {
        self.validate()?;

        let mut registry = TypeRegistry::new();
        for interface in self.interfaces {
            registry.register_interface(interface)?;
        }

        for manifest in self.types {
            let mut ty = TypeDescriptor::class(manifest.name)
                .extends(manifest.base.unwrap_or_else(|| ROOT_TYPE.to_string()));
            ty.interfaces = manifest.interfaces;
            ty.attributes = manifest.attributes;
            for member in manifest.members {
                let declared = TargetMember::declared(member.name, member.kind, member.signature);
                ty.members.push(match member.qualifier {
                    Some(interface) => declared.for_interface(interface),
                    None => declared,
                });
            }
            if manifest.default_constructor {
                ty = ty.with_default_constructor();
            }
            registry.register_type(ty)?;
        }

        tracing::debug!("Loaded {} type(s) and interface(s) from manifest", registry.len());
        Ok(registry)
    }
}

impl Validate for RegistryManifest {
    fn validate(&self) -> Result<()> {
        let mut names: Vec<String> = self.interfaces.iter().map(|i| i.name.clone()).collect();
        names.extend(self.types.iter().map(|t| t.name.clone()));
        validate_unique_names("manifest.names", &names)?;

        for interface in &self.interfaces {
            validate_type_name("interfaces.name", &interface.name)?;
            validate_type_names("interfaces.extends", &interface.extends)?;
        }

        for ty in &self.types {
            validate_type_name("types.name", &ty.name)?;
            validate_unique_names("types.interfaces", &ty.interfaces)?;
            validate_type_names("types.interfaces", &ty.interfaces)?;
            if let Some(base) = &ty.base {
                validate_type_name("types.base", base)?;
            }
        }

        Ok(())
    }
}
