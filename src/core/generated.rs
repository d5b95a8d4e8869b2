use crate::core::synthesizer::SynthesizedMember;
use crate::domain::model::{Attribute, Constructor, MemberBody, MemberKind, Object, Signature, ValueKind};
use crate::utils::error::InvocationError;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Build-time description of a generated type, before lowering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProxyPlan {
    pub name: String,
    pub target_type: String,
    pub base_type: String,
    /// The base type followed by its ancestors.
    pub base_chain: Vec<String>,
    pub interfaces: Vec<String>,
    /// Resolved interfaces plus every interface they inherit.
    pub implemented: Vec<String>,
    /// Inherited interfaces of each implemented interface, in lookup order.
    pub ancestry: BTreeMap<String, Vec<String>>,
    pub forced: bool,
    pub attributes: Vec<Attribute>,
    pub members: Vec<SynthesizedMember>,
}

pub(crate) enum Dispatch {
    Forward(MemberBody),
    Conformance(ValueKind),
}

struct DispatchEntry {
    signature: Signature,
    dispatch: Dispatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DispatchKey {
    interface: String,
    name: String,
    kind: MemberKind,
}

/// A synthesized composition proxy type with its dispatch table.
pub struct GeneratedType {
    plan: ProxyPlan,
    constructor: Constructor,
    dispatch: HashMap<DispatchKey, Vec<DispatchEntry>>,
}

impl GeneratedType {
    /// Lowers `plan`; `dispatch` holds one entry per planned member, in order.
    pub(crate) fn lower(plan: ProxyPlan, constructor: Constructor, dispatch: Vec<Dispatch>) -> Self {
        let mut table: HashMap<DispatchKey, Vec<DispatchEntry>> = HashMap::new();
        for (member, dispatch) in plan.members.iter().zip(dispatch) {
            table
                .entry(DispatchKey {
                    interface: member.interface.clone(),
                    name: member.name.clone(),
                    kind: member.kind,
                })
                .or_default()
                .push(DispatchEntry {
                    signature: member.signature.clone(),
                    dispatch,
                });
        }

        Self {
            plan,
            constructor,
            dispatch: table,
        }
    }

    pub fn name(&self) -> &str {
        &self.plan.name
    }

    pub fn target_type(&self) -> &str {
        &self.plan.target_type
    }

    pub fn base_type(&self) -> &str {
        &self.plan.base_type
    }

    pub fn plan(&self) -> &ProxyPlan {
        &self.plan
    }

    pub fn interfaces(&self) -> &[String] {
        &self.plan.interfaces
    }

    pub fn implemented_interfaces(&self) -> &[String] {
        &self.plan.implemented
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.plan.attributes
    }

    pub fn members(&self) -> &[SynthesizedMember] {
        &self.plan.members
    }

    /// Reflection-style lookup: qualified members are only found by their
    /// `Interface.Member` name.
    pub fn find_member(&self, name: &str) -> Option<&SynthesizedMember> {
        self.plan
            .members
            .iter()
            .find(|m| m.display_name() == name || m.qualified_name() == name)
    }

    pub fn is_assignable_to(&self, type_name: &str) -> bool {
        self.plan.name == type_name
            || self.plan.base_chain.iter().any(|b| b == type_name)
            || self.plan.implemented.iter().any(|i| i == type_name)
    }

    /// Creates a proxy instance owning a fresh target instance.
    pub fn instantiate(self: &Arc<Self>) -> ProxyInstance {
        ProxyInstance {
            proxy_type: Arc::clone(self),
            target: (self.constructor)(),
        }
    }
}

impl fmt::Debug for GeneratedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedType")
            .field("plan", &self.plan)
            .field("dispatch_entries", &self.dispatch.len())
            .finish()
    }
}

/// Instance of a generated type. The target instance is private to it.
pub struct ProxyInstance {
    proxy_type: Arc<GeneratedType>,
    target: Object,
}

impl ProxyInstance {
    pub fn proxy_type(&self) -> &Arc<GeneratedType> {
        &self.proxy_type
    }

    pub fn is_instance_of(&self, type_name: &str) -> bool {
        self.proxy_type.is_assignable_to(type_name)
    }

    /// Views the instance through `interface`, if the generated type implements it.
    pub fn cast(&mut self, interface: &str) -> Option<InterfaceRef<'_>> {
        if !self
            .proxy_type
            .implemented_interfaces()
            .iter()
            .any(|i| i == interface)
        {
            return None;
        }

        Some(InterfaceRef {
            instance: self,
            interface: interface.to_string(),
        })
    }

    fn invoke(
        &mut self,
        interface: &str,
        name: &str,
        kind: MemberKind,
        args: &[Value],
    ) -> Result<Value, InvocationError> {
        let proxy_type = Arc::clone(&self.proxy_type);

        // 先找介面自己宣告的成員，再依序找繼承來的介面
        let lineage = std::iter::once(interface).chain(
            proxy_type
                .plan
                .ancestry
                .get(interface)
                .into_iter()
                .flatten()
                .map(String::as_str),
        );

        let mut declared = false;
        let mut selected = None;
        for owner in lineage {
            let key = DispatchKey {
                interface: owner.to_string(),
                name: name.to_string(),
                kind,
            };
            let Some(entries) = proxy_type.dispatch.get(&key) else {
                continue;
            };
            declared = true;
            if let Some(entry) = entries.iter().find(|e| e.signature.accepts(args)) {
                selected = Some(entry);
                break;
            }
        }

        let entry = match selected {
            Some(entry) => entry,
            None if declared => {
                return Err(InvocationError::ArgumentMismatch {
                    interface: interface.to_string(),
                    member: name.to_string(),
                })
            }
            None => {
                return Err(InvocationError::MissingMember {
                    interface: interface.to_string(),
                    member: name.to_string(),
                })
            }
        };

        match &entry.dispatch {
            Dispatch::Forward(body) => body(&mut self.target, args),
            Dispatch::Conformance(returns) => {
                tracing::trace!("Conformance stub {}.{} called", interface, name);
                Ok(returns.default_value())
            }
        }
    }
}

impl fmt::Debug for ProxyInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyInstance")
            .field("type", &self.proxy_type.name())
            .finish_non_exhaustive()
    }
}

/// An instance viewed through one of its interfaces.
pub struct InterfaceRef<'a> {
    instance: &'a mut ProxyInstance,
    interface: String,
}

impl InterfaceRef<'_> {
    pub fn interface(&self) -> &str {
        &self.interface
    }

    pub fn call(&mut self, method: &str, args: &[Value]) -> Result<Value, InvocationError> {
        self.instance
            .invoke(&self.interface, method, MemberKind::Method, args)
    }

    pub fn get(&mut self, property: &str) -> Result<Value, InvocationError> {
        self.instance
            .invoke(&self.interface, property, MemberKind::Getter, &[])
    }

    pub fn set(&mut self, property: &str, value: Value) -> Result<(), InvocationError> {
        self.instance
            .invoke(&self.interface, property, MemberKind::Setter, &[value])
            .map(|_| ())
    }

    pub fn subscribe(&mut self, event: &str, handler: Value) -> Result<(), InvocationError> {
        self.instance
            .invoke(&self.interface, event, MemberKind::EventAdd, &[handler])
            .map(|_| ())
    }

    pub fn unsubscribe(&mut self, event: &str, handler: Value) -> Result<(), InvocationError> {
        self.instance
            .invoke(&self.interface, event, MemberKind::EventRemove, &[handler])
            .map(|_| ())
    }
}
