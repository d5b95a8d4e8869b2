use crate::domain::model::{InterfaceDescriptor, RUNTIME_ORIGIN};

pub const DEFAULT_IGNORE_ATTRIBUTE: &str = "ProxyIgnore";

/// Decides which interfaces may be exposed by default resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceClassifier {
    ignore_attribute: String,
    framework_origins: Vec<String>,
}

impl InterfaceClassifier {
    pub fn new(ignore_attribute: impl Into<String>, framework_origins: Vec<String>) -> Self {
        Self {
            ignore_attribute: ignore_attribute.into(),
            framework_origins,
        }
    }

    pub fn ignore_attribute(&self) -> &str {
        &self.ignore_attribute
    }

    pub fn framework_origins(&self) -> &[String] {
        &self.framework_origins
    }

    pub fn is_proxiable(&self, interface: &InterfaceDescriptor) -> bool {
        if interface.has_attribute(&self.ignore_attribute) {
            return false;
        }

        match &interface.origin {
            Some(origin) => !self.framework_origins.iter().any(|o| o == origin),
            None => true,
        }
    }
}

impl Default for InterfaceClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_IGNORE_ATTRIBUTE, vec![RUNTIME_ORIGIN.to_string()])
    }
}
