use crate::domain::model::{InterfaceDescriptor, TypeDescriptor};
use crate::domain::ports::TypeMetadataProvider;
use crate::utils::error::{ProxyError, Result};
use crate::utils::validation::validate_type_name;
use std::collections::HashMap;
use std::sync::Arc;

/// In-memory metadata provider. Types and interfaces share one name space.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: HashMap<String, Arc<TypeDescriptor>>,
    interfaces: HashMap<String, Arc<InterfaceDescriptor>>,
}

impl TypeRegistry {
    /// 建立只含根型別的登錄表
    pub fn new() -> Self {
        let root = TypeDescriptor::root();
        let mut types = HashMap::new();
        types.insert(root.name.clone(), Arc::new(root));

        Self {
            types,
            interfaces: HashMap::new(),
        }
    }

    pub fn register_interface(&mut self, interface: InterfaceDescriptor) -> Result<()> {
        validate_type_name("interface.name", &interface.name)?;
        self.ensure_free(&interface.name)?;

        tracing::debug!("Registering interface {}", interface.name);
        self.interfaces
            .insert(interface.name.clone(), Arc::new(interface));
        Ok(())
    }

    pub fn register_type(&mut self, ty: TypeDescriptor) -> Result<()> {
        validate_type_name("type.name", &ty.name)?;
        self.ensure_free(&ty.name)?;

        tracing::debug!(
            "Registering type {} ({} interfaces, {} members)",
            ty.name,
            ty.interfaces.len(),
            ty.members.len()
        );
        self.types.insert(ty.name.clone(), Arc::new(ty));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.types.len() + self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_free(&self, name: &str) -> Result<()> {
        if self.types.contains_key(name) || self.interfaces.contains_key(name) {
            return Err(ProxyError::DuplicateType {
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeMetadataProvider for TypeRegistry {
    fn find_type(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.types.get(name).cloned()
    }

    fn find_interface(&self, name: &str) -> Option<Arc<InterfaceDescriptor>> {
        self.interfaces.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ROOT_TYPE;

    #[test]
    fn test_new_registry_has_root_type() {
        let registry = TypeRegistry::new();
        let root = registry.find_type(ROOT_TYPE).unwrap();
        assert!(root.base.is_none());
        assert!(root.constructor.is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_names_rejected_across_kinds() {
        let mut registry = TypeRegistry::new();
        registry
            .register_interface(InterfaceDescriptor::new("IShared"))
            .unwrap();

        let err = registry
            .register_type(TypeDescriptor::class("IShared"))
            .unwrap_err();
        assert!(matches!(err, ProxyError::DuplicateType { .. }));

        let err = registry
            .register_interface(InterfaceDescriptor::new("IShared"))
            .unwrap_err();
        assert!(matches!(err, ProxyError::DuplicateType { .. }));
    }

    #[test]
    fn test_invalid_names_rejected() {
        let mut registry = TypeRegistry::new();
        assert!(registry
            .register_interface(InterfaceDescriptor::new("not valid"))
            .is_err());
        assert!(registry.register_type(TypeDescriptor::class("")).is_err());
    }
}
