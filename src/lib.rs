pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::{manifest::RegistryManifest, registry::TypeRegistry};
pub use crate::config::BuilderConfig;
pub use crate::core::{
    classifier::InterfaceClassifier,
    composition::CompositionProxyTypeBuilder,
    generated::{GeneratedType, InterfaceRef, ProxyInstance, ProxyPlan},
    resolver::{InterfaceSetResolver, ResolvedInterfaceSet},
    synthesizer::{Delegation, MemberSynthesizer, SynthesizedMember},
};
pub use crate::domain::model::{
    Attribute, InterfaceDescriptor, MemberKind, Object, Signature, TargetMember, TypeDescriptor,
    ValueKind, ROOT_TYPE, RUNTIME_ORIGIN,
};
pub use crate::domain::ports::{BuilderSettings, BuilderState, ProxyTypeBuilder, TypeMetadataProvider};
pub use crate::utils::error::{InvocationError, ProxyError, Result};
