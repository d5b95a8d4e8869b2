pub mod classifier;
pub mod composition;
pub mod generated;
pub mod resolver;
pub mod synthesizer;

pub use crate::domain::model::{
    Attribute, InterfaceDescriptor, MemberKind, Object, Signature, TargetMember, TypeDescriptor,
    ValueKind,
};
pub use crate::domain::ports::{BuilderSettings, BuilderState, ProxyTypeBuilder, TypeMetadataProvider};
pub use crate::utils::error::Result;
