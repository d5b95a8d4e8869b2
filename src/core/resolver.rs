use crate::core::classifier::InterfaceClassifier;
use crate::domain::model::{InterfaceDescriptor, TypeDescriptor};
use crate::domain::ports::TypeMetadataProvider;
use crate::utils::error::{ProxyError, Result};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Interfaces a generated type will implement.
#[derive(Debug, Clone)]
pub struct ResolvedInterfaceSet {
    pub target_type: String,
    /// Resolved interfaces in resolution order.
    pub interfaces: Vec<Arc<InterfaceDescriptor>>,
    /// `interfaces` plus everything they inherit, deduplicated.
    pub closure: Vec<Arc<InterfaceDescriptor>>,
    /// True when the set came from an explicit interface list.
    pub forced: bool,
}

impl ResolvedInterfaceSet {
    pub fn names(&self) -> Vec<String> {
        self.interfaces.iter().map(|i| i.name.clone()).collect()
    }

    pub fn closure_names(&self) -> Vec<String> {
        self.closure.iter().map(|i| i.name.clone()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.closure.iter().any(|i| i.name == name)
    }

    /// Every inherited interface of each closure member, depth-first in
    /// `extends` declaration order.
    pub fn ancestry(&self) -> BTreeMap<String, Vec<String>> {
        self.closure
            .iter()
            .map(|iface| {
                let mut seen = HashSet::from([iface.name.clone()]);
                let mut ancestors = Vec::new();
                self.collect_ancestors(iface, &mut seen, &mut ancestors);
                (iface.name.clone(), ancestors)
            })
            .collect()
    }

    fn collect_ancestors(
        &self,
        iface: &InterfaceDescriptor,
        seen: &mut HashSet<String>,
        out: &mut Vec<String>,
    ) {
        for parent in &iface.extends {
            if !seen.insert(parent.clone()) {
                continue;
            }
            out.push(parent.clone());
            if let Some(parent) = self.closure.iter().find(|i| &i.name == parent) {
                self.collect_ancestors(parent, seen, out);
            }
        }
    }
}

pub struct InterfaceSetResolver<'a> {
    provider: &'a dyn TypeMetadataProvider,
    classifier: &'a InterfaceClassifier,
}

impl<'a> InterfaceSetResolver<'a> {
    pub fn new(provider: &'a dyn TypeMetadataProvider, classifier: &'a InterfaceClassifier) -> Self {
        Self {
            provider,
            classifier,
        }
    }

    pub fn resolve(
        &self,
        target_type: Option<&str>,
        explicit_interfaces: &[String],
    ) -> Result<ResolvedInterfaceSet> {
        let target_name = target_type.ok_or(ProxyError::MissingTargetType)?;

        if !explicit_interfaces.is_empty() {
            let mut seen = HashSet::new();
            let mut interfaces = Vec::new();
            for name in explicit_interfaces {
                if seen.insert(name.as_str()) {
                    interfaces.push(self.lookup_interface(name)?);
                }
            }

            tracing::debug!(
                "Using {} explicit interface(s) for {}",
                interfaces.len(),
                target_name
            );
            let closure = self.closure_of(&interfaces)?;
            return Ok(ResolvedInterfaceSet {
                target_type: target_name.to_string(),
                interfaces,
                closure,
                forced: true,
            });
        }

        let target = self
            .provider
            .find_type(target_name)
            .ok_or_else(|| ProxyError::UnknownType {
                name: target_name.to_string(),
            })?;

        let all = self.implemented_interfaces(&target)?;
        let examined = all.len();
        let interfaces: Vec<Arc<InterfaceDescriptor>> = all
            .into_iter()
            .filter(|iface| {
                let proxiable = self.classifier.is_proxiable(iface);
                if !proxiable {
                    tracing::debug!("Skipping non-proxiable interface {}", iface.name);
                }
                proxiable
            })
            .collect();

        if interfaces.is_empty() {
            return Err(ProxyError::EmptyResolution {
                target: target_name.to_string(),
                examined,
            });
        }

        // 子介面的父介面屬於其契約，即使分類器不允許也必須實作
        let closure = self.closure_of(&interfaces)?;

        Ok(ResolvedInterfaceSet {
            target_type: target_name.to_string(),
            interfaces,
            closure,
            forced: false,
        })
    }

    /// Every interface implemented by `target`: its own, those they extend, then
    /// the base chain's. First-seen order, no duplicates.
    pub fn implemented_interfaces(
        &self,
        target: &TypeDescriptor,
    ) -> Result<Vec<Arc<InterfaceDescriptor>>> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for name in &target.interfaces {
            self.collect_interface(name, &mut seen, &mut result)?;
        }

        let mut visited_types = HashSet::from([target.name.clone()]);
        let mut base = target.base.clone();
        while let Some(base_name) = base {
            if !visited_types.insert(base_name.clone()) {
                break;
            }

            let ty = self
                .provider
                .find_type(&base_name)
                .ok_or(ProxyError::UnknownType { name: base_name })?;
            for name in &ty.interfaces {
                self.collect_interface(name, &mut seen, &mut result)?;
            }
            base = ty.base.clone();
        }

        Ok(result)
    }

    fn closure_of(
        &self,
        interfaces: &[Arc<InterfaceDescriptor>],
    ) -> Result<Vec<Arc<InterfaceDescriptor>>> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for iface in interfaces {
            self.collect_interface(&iface.name, &mut seen, &mut result)?;
        }
        Ok(result)
    }

    fn collect_interface(
        &self,
        name: &str,
        seen: &mut HashSet<String>,
        out: &mut Vec<Arc<InterfaceDescriptor>>,
    ) -> Result<()> {
        if !seen.insert(name.to_string()) {
            return Ok(());
        }

        let iface = self.lookup_interface(name)?;
        out.push(iface.clone());
        for parent in &iface.extends {
            self.collect_interface(parent, seen, out)?;
        }
        Ok(())
    }

    fn lookup_interface(&self, name: &str) -> Result<Arc<InterfaceDescriptor>> {
        if let Some(iface) = self.provider.find_interface(name) {
            return Ok(iface);
        }

        if self.provider.find_type(name).is_some() {
            return Err(ProxyError::NotAnInterface {
                name: name.to_string(),
            });
        }

        Err(ProxyError::UnknownInterface {
            name: name.to_string(),
        })
    }
}
