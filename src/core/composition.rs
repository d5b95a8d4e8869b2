use crate::core::classifier::InterfaceClassifier;
use crate::core::generated::{Dispatch, GeneratedType, ProxyPlan};
use crate::core::resolver::InterfaceSetResolver;
use crate::core::synthesizer::{Delegation, MemberSynthesizer};
use crate::domain::model::{Constructor, MemberDescriptor, TypeDescriptor, ROOT_TYPE};
use crate::domain::ports::{BuilderSettings, ProxyTypeBuilder, TypeMetadataProvider};
use crate::utils::error::{ProxyError, Result};
use crate::utils::validation::validate_type_name;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static PROXY_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Builds proxy types that implement interfaces by delegating to a privately
/// held instance of the target type.
pub struct CompositionProxyTypeBuilder {
    provider: Arc<dyn TypeMetadataProvider>,
    classifier: InterfaceClassifier,
    settings: BuilderSettings,
}

struct Prepared {
    target: Arc<TypeDescriptor>,
    constructor: Constructor,
    plan: ProxyPlan,
}

impl CompositionProxyTypeBuilder {
    pub fn new(provider: Arc<dyn TypeMetadataProvider>) -> Self {
        Self {
            provider,
            classifier: InterfaceClassifier::default(),
            settings: BuilderSettings::default(),
        }
    }

    pub fn with_classifier(mut self, classifier: InterfaceClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn classifier(&self) -> &InterfaceClassifier {
        &self.classifier
    }

    /// `reserve` consumes a sequence number for a generated name; dry runs
    /// only preview the next one.
    fn prepare(&self, reserve: bool) -> Result<Prepared> {
        let target_name = self
            .settings
            .target_type
            .as_deref()
            .ok_or(ProxyError::MissingTargetType)?;

        let target = match self.provider.find_type(target_name) {
            Some(target) => target,
            None if self.provider.find_interface(target_name).is_some() => {
                return Err(ProxyError::InvalidTargetType {
                    name: target_name.to_string(),
                    reason: "interfaces cannot be composition targets".to_string(),
                })
            }
            None => {
                return Err(ProxyError::UnknownType {
                    name: target_name.to_string(),
                })
            }
        };

        let resolver = InterfaceSetResolver::new(self.provider.as_ref(), &self.classifier);

        // 組合式代理至少要有一個可公開的契約
        if self.settings.interfaces.is_empty()
            && resolver.implemented_interfaces(&target)?.is_empty()
        {
            return Err(ProxyError::ContractViolation {
                target: target_name.to_string(),
            });
        }

        let set = resolver.resolve(Some(target_name), &self.settings.interfaces)?;

        let constructor =
            target
                .constructor
                .clone()
                .ok_or_else(|| ProxyError::NoDefaultConstructor {
                    target: target_name.to_string(),
                })?;

        let base_chain = self.base_chain(&target)?;

        let members = MemberSynthesizer::new(self.provider.as_ref()).synthesize(&set, &target)?;

        let mut attributes = Vec::new();
        if self.settings.proxy_target_attributes {
            attributes.extend(target.attributes.iter().cloned());
        }
        attributes.extend(self.settings.type_attributes.iter().cloned());

        let name = match &self.settings.name {
            Some(name) => {
                self.check_configured_name(name)?;
                name.clone()
            }
            None => {
                let sequence = if reserve {
                    PROXY_SEQUENCE.fetch_add(1, Ordering::Relaxed)
                } else {
                    PROXY_SEQUENCE.load(Ordering::Relaxed)
                };
                format!(
                    "{}CompositionProxy_{}",
                    target_name.rsplit('.').next().unwrap_or(target_name),
                    sequence
                )
            }
        };

        let plan = ProxyPlan {
            name,
            target_type: target_name.to_string(),
            base_type: self.settings.base_type.clone(),
            base_chain,
            interfaces: set.names(),
            implemented: set.closure_names(),
            ancestry: set.ancestry(),
            forced: set.forced,
            attributes,
            members,
        };

        Ok(Prepared {
            target,
            constructor,
            plan,
        })
    }

    /// A configured name must not shadow a known type or interface, or the
    /// proxy would claim assignability to it.
    fn check_configured_name(&self, name: &str) -> Result<()> {
        validate_type_name("name", name)?;

        let shadowed = if self.provider.find_type(name).is_some() {
            Some("type")
        } else if self.provider.find_interface(name).is_some() {
            Some("interface")
        } else {
            None
        };

        match shadowed {
            Some(kind) => Err(ProxyError::InvalidConfigValueError {
                field: "name".to_string(),
                value: name.to_string(),
                reason: format!("'{}' is already a registered {}", name, kind),
            }),
            None => Ok(()),
        }
    }

    /// The configured base type and its ancestors. The chain may not contain
    /// the target (unless the target is the root type) nor any interfaces.
    fn base_chain(&self, target: &TypeDescriptor) -> Result<Vec<String>> {
        let base_type = &self.settings.base_type;
        let invalid = |reason: &str| ProxyError::InvalidBaseType {
            base: base_type.clone(),
            reason: reason.to_string(),
        };

        if self.provider.find_interface(base_type).is_some() {
            return Err(invalid("base type must be a class, not an interface"));
        }

        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(base_type.clone());
        while let Some(name) = current {
            if !visited.insert(name.clone()) {
                break;
            }

            let ty = self
                .provider
                .find_type(&name)
                .ok_or_else(|| invalid(&format!("unknown type '{}'", name)))?;

            if ty.name == target.name && target.name != ROOT_TYPE {
                return Err(invalid("base type must not be or derive from the target type"));
            }
            if !ty.interfaces.is_empty() {
                return Err(invalid("base type must not implement interfaces"));
            }

            chain.push(ty.name.clone());
            current = ty.base.clone();
        }

        Ok(chain)
    }
}

impl ProxyTypeBuilder for CompositionProxyTypeBuilder {
    fn settings(&self) -> &BuilderSettings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut BuilderSettings {
        &mut self.settings
    }

    fn plan(&self) -> Result<ProxyPlan> {
        self.prepare(false).map(|prepared| prepared.plan)
    }

    fn build_proxy_type(&self) -> Result<Arc<GeneratedType>> {
        let Prepared {
            target,
            constructor,
            plan,
        } = self.prepare(true)?;

        let synthesizer = MemberSynthesizer::new(self.provider.as_ref());
        let mut dispatch = Vec::with_capacity(plan.members.len());
        for member in &plan.members {
            match &member.delegation {
                Delegation::Forward { .. } => {
                    let descriptor = MemberDescriptor {
                        name: member.name.clone(),
                        kind: member.kind,
                        signature: member.signature.clone(),
                        attributes: Vec::new(),
                    };
                    let body = synthesizer
                        .locate(&target, &member.interface, &descriptor)?
                        .and_then(|(_, found)| found.body)
                        .ok_or_else(|| ProxyError::UnboundMember {
                            target: target.name.clone(),
                            member: member.qualified_name(),
                        })?;
                    dispatch.push(Dispatch::Forward(body));
                }
                Delegation::Conformance => {
                    dispatch.push(Dispatch::Conformance(member.signature.returns));
                }
            }
        }

        tracing::info!(
            "✅ Built composition proxy {} for {} ({} interface(s), {} member(s))",
            plan.name,
            plan.target_type,
            plan.interfaces.len(),
            plan.members.len()
        );

        Ok(Arc::new(GeneratedType::lower(plan, constructor, dispatch)))
    }
}
