use crate::core::generated::{GeneratedType, ProxyPlan};
use crate::domain::model::{Attribute, InterfaceDescriptor, TypeDescriptor, ROOT_TYPE};
use crate::utils::error::Result;
use std::sync::Arc;

/// Source of type metadata; replaces ambient runtime reflection.
pub trait TypeMetadataProvider: Send + Sync {
    fn find_type(&self, name: &str) -> Option<Arc<TypeDescriptor>>;
    fn find_interface(&self, name: &str) -> Option<Arc<InterfaceDescriptor>>;
}

/// Configuration shared by every proxy builder strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct BuilderSettings {
    pub name: Option<String>,
    pub target_type: Option<String>,
    pub interfaces: Vec<String>,
    pub base_type: String,
    pub proxy_target_attributes: bool,
    pub type_attributes: Vec<Attribute>,
}

impl Default for BuilderSettings {
    fn default() -> Self {
        Self {
            name: None,
            target_type: None,
            interfaces: Vec::new(),
            base_type: ROOT_TYPE.to_string(),
            proxy_target_attributes: true,
            type_attributes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    Unconfigured,
    Configured,
}

/// Builder contract: configure, then `build_proxy_type`.
///
/// Configuring and building the same builder from several threads must be
/// serialized by the caller; the configuration setters take `&mut self`.
pub trait ProxyTypeBuilder {
    fn settings(&self) -> &BuilderSettings;
    fn settings_mut(&mut self) -> &mut BuilderSettings;

    /// Resolves and synthesizes without lowering into a dispatch table.
    fn plan(&self) -> Result<ProxyPlan>;

    fn build_proxy_type(&self) -> Result<Arc<GeneratedType>>;

    fn state(&self) -> BuilderState {
        if self.settings().target_type.is_some() {
            BuilderState::Configured
        } else {
            BuilderState::Unconfigured
        }
    }

    fn name(&self) -> Option<&str> {
        self.settings().name.as_deref()
    }

    fn set_name(&mut self, name: &str) {
        self.settings_mut().name = Some(name.to_string());
    }

    fn target_type(&self) -> Option<&str> {
        self.settings().target_type.as_deref()
    }

    fn set_target_type(&mut self, target_type: &str) {
        self.settings_mut().target_type = Some(target_type.to_string());
    }

    fn interfaces(&self) -> &[String] {
        &self.settings().interfaces
    }

    fn set_interfaces(&mut self, interfaces: &[&str]) {
        self.settings_mut().interfaces = interfaces.iter().map(|i| i.to_string()).collect();
    }

    fn base_type(&self) -> &str {
        &self.settings().base_type
    }

    fn set_base_type(&mut self, base_type: &str) {
        self.settings_mut().base_type = base_type.to_string();
    }

    fn proxy_target_attributes(&self) -> bool {
        self.settings().proxy_target_attributes
    }

    fn set_proxy_target_attributes(&mut self, enabled: bool) {
        self.settings_mut().proxy_target_attributes = enabled;
    }

    fn type_attributes(&self) -> &[Attribute] {
        &self.settings().type_attributes
    }

    fn set_type_attributes(&mut self, attributes: Vec<Attribute>) {
        self.settings_mut().type_attributes = attributes;
    }
}
