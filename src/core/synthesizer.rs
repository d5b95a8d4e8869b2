use crate::core::resolver::ResolvedInterfaceSet;
use crate::domain::model::{
    Attribute, MemberDescriptor, MemberKind, Signature, TargetMember, TypeDescriptor,
};
use crate::domain::ports::TypeMetadataProvider;
use crate::utils::error::{ProxyError, Result};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Delegation {
    /// Forward to the target member declared on `declared_on`.
    Forward {
        target_member: String,
        declared_on: String,
    },
    /// No compatible target member; returns the default of the return kind.
    Conformance,
}

/// One member of the generated type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesizedMember {
    pub interface: String,
    pub name: String,
    pub kind: MemberKind,
    pub signature: Signature,
    /// Implemented as `Interface.Member` because another interface declares the same member.
    pub qualified: bool,
    pub delegation: Delegation,
    pub attributes: Vec<Attribute>,
}

impl SynthesizedMember {
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.interface, self.name)
    }

    pub fn display_name(&self) -> String {
        if self.qualified {
            self.qualified_name()
        } else {
            self.name.clone()
        }
    }

    pub fn is_forwarding(&self) -> bool {
        matches!(self.delegation, Delegation::Forward { .. })
    }
}

type MemberShape = (String, MemberKind, Signature);

fn shape(member: &MemberDescriptor) -> MemberShape {
    (member.name.clone(), member.kind, member.signature.clone())
}

pub struct MemberSynthesizer<'a> {
    provider: &'a dyn TypeMetadataProvider,
}

impl<'a> MemberSynthesizer<'a> {
    pub fn new(provider: &'a dyn TypeMetadataProvider) -> Self {
        Self { provider }
    }

    pub fn synthesize(
        &self,
        set: &ResolvedInterfaceSet,
        target: &TypeDescriptor,
    ) -> Result<Vec<SynthesizedMember>> {
        // 統計每個成員形狀被幾個介面宣告
        let mut declared_by: HashMap<MemberShape, HashSet<&str>> = HashMap::new();
        for iface in &set.closure {
            for member in iface.members() {
                declared_by
                    .entry(shape(&member))
                    .or_default()
                    .insert(iface.name.as_str());
            }
        }

        let mut members = Vec::new();
        for iface in &set.closure {
            let mut emitted = HashSet::new();
            for member in iface.members() {
                let key = shape(&member);
                if !emitted.insert(key.clone()) {
                    continue;
                }

                let qualified = declared_by.get(&key).map(|s| s.len() > 1).unwrap_or(false);
                let delegation = match self.locate(target, &iface.name, &member)? {
                    Some((owner, found)) => Delegation::Forward {
                        target_member: found.display_name(),
                        declared_on: owner,
                    },
                    None => {
                        tracing::debug!(
                            "{} has no member compatible with {}.{}; emitting conformance stub",
                            target.name,
                            iface.name,
                            member.name
                        );
                        Delegation::Conformance
                    }
                };

                // 介面宣告上的屬性一律不複製到產生的成員
                members.push(SynthesizedMember {
                    interface: iface.name.clone(),
                    name: member.name,
                    kind: member.kind,
                    signature: member.signature,
                    qualified,
                    delegation,
                    attributes: Vec::new(),
                });
            }
        }

        tracing::debug!(
            "Synthesized {} member(s) for {} ({} forwarding)",
            members.len(),
            target.name,
            members.iter().filter(|m| m.is_forwarding()).count()
        );
        Ok(members)
    }

    /// Finds the target implementation of `interface`'s `member`, walking the
    /// base chain from the target upwards. Returns the declaring type's name.
    pub fn locate(
        &self,
        target: &TypeDescriptor,
        interface: &str,
        member: &MemberDescriptor,
    ) -> Result<Option<(String, TargetMember)>> {
        if let Some(found) = target.find_member(interface, member) {
            return Ok(Some((target.name.clone(), found.clone())));
        }

        let mut visited = HashSet::from([target.name.clone()]);
        let mut base = target.base.clone();
        while let Some(base_name) = base {
            if !visited.insert(base_name.clone()) {
                break;
            }

            let ty = self
                .provider
                .find_type(&base_name)
                .ok_or(ProxyError::UnknownType { name: base_name })?;
            if let Some(found) = ty.find_member(interface, member) {
                return Ok(Some((ty.name.clone(), found.clone())));
            }
            base = ty.base.clone();
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::registry::TypeRegistry;
    use crate::core::classifier::InterfaceClassifier;
    use crate::core::resolver::InterfaceSetResolver;
    use crate::domain::model::{InterfaceDescriptor, ValueKind};
    use serde_json::json;

    fn registry() -> TypeRegistry {
        let int_sig = Signature::new(Vec::new(), ValueKind::Int);
        let mut registry = TypeRegistry::new();
        registry
            .register_interface(
                InterfaceDescriptor::new("ICounter")
                    .method_with_attributes(
                        "Next",
                        int_sig.clone(),
                        vec![Attribute::new("Obsolete"), Attribute::with_value("Doc", "next")],
                    )
                    .property("Total", ValueKind::Int, true, true),
            )
            .unwrap();
        registry
            .register_interface(InterfaceDescriptor::new("ISequence").method("Next", int_sig.clone()))
            .unwrap();
        registry
            .register_interface(
                InterfaceDescriptor::new("IResettable")
                    .method("Reset", Signature::unit())
                    .event("Reset"),
            )
            .unwrap();
        registry
            .register_type(
                TypeDescriptor::class("CounterBase").member(TargetMember::accessor(
                    "Total",
                    MemberKind::Getter,
                    int_sig.clone(),
                    |obj, _| Ok(obj.get("total")),
                )),
            )
            .unwrap();
        registry
            .register_type(
                TypeDescriptor::class("Counter")
                    .extends("CounterBase")
                    .implements("ICounter")
                    .implements("ISequence")
                    .with_default_constructor()
                    .member(TargetMember::method("Next", int_sig.clone(), |_, _| Ok(json!(1))))
                    .member(
                        TargetMember::method("Next", int_sig, |_, _| Ok(json!(100)))
                            .for_interface("ISequence"),
                    ),
            )
            .unwrap();
        registry
    }

    fn synthesize(registry: &TypeRegistry, explicit: &[&str]) -> Vec<SynthesizedMember> {
        let classifier = InterfaceClassifier::default();
        let resolver = InterfaceSetResolver::new(registry, &classifier);
        let explicit: Vec<String> = explicit.iter().map(|s| s.to_string()).collect();
        let set = resolver.resolve(Some("Counter"), &explicit).unwrap();
        let target = registry.find_type("Counter").unwrap();
        MemberSynthesizer::new(registry).synthesize(&set, &target).unwrap()
    }

    #[test]
    fn test_one_member_per_accessor() {
        let registry = registry();
        let members = synthesize(&registry, &[]);
        let names: Vec<String> = members.iter().map(|m| m.display_name()).collect();
        assert_eq!(names, vec!["ICounter.Next", "Total", "Total", "ISequence.Next"]);
    }

    #[test]
    fn test_attributes_never_copied() {
        let registry = registry();
        let members = synthesize(&registry, &[]);
        assert!(members.iter().all(|m| m.attributes.is_empty()));
    }

    #[test]
    fn test_forwarding_targets_and_conformance() {
        let registry = registry();
        let members = synthesize(&registry, &[]);

        assert_eq!(
            members[0].delegation,
            Delegation::Forward {
                target_member: "Next".to_string(),
                declared_on: "Counter".to_string(),
            }
        );
        // getter inherited from the base type, setter missing
        assert_eq!(
            members[1].delegation,
            Delegation::Forward {
                target_member: "Total".to_string(),
                declared_on: "CounterBase".to_string(),
            }
        );
        assert_eq!(members[2].kind, MemberKind::Setter);
        assert_eq!(members[2].delegation, Delegation::Conformance);
        assert_eq!(
            members[3].delegation,
            Delegation::Forward {
                target_member: "ISequence.Next".to_string(),
                declared_on: "Counter".to_string(),
            }
        );
    }

    #[test]
    fn test_forced_interface_uses_stubs() {
        let registry = registry();
        let members = synthesize(&registry, &["IResettable"]);

        assert_eq!(members.len(), 3);
        assert!(members.iter().all(|m| m.delegation == Delegation::Conformance));
        // method and event share a name but differ in kind, so no qualification
        assert!(members.iter().all(|m| !m.qualified));
    }
}
