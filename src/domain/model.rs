use crate::utils::error::InvocationError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Name of the universal root type every class ultimately derives from.
pub const ROOT_TYPE: &str = "Object";

/// Origin reserved for interfaces the proxy runtime injects for its own bookkeeping.
pub const RUNTIME_ORIGIN: &str = "proxy-runtime";

/// Body of a target member: receives the held instance and the call arguments.
pub type MemberBody =
    Arc<dyn Fn(&mut Object, &[Value]) -> Result<Value, InvocationError> + Send + Sync>;

/// Parameterless constructor of a concrete type.
pub type Constructor = Arc<dyn Fn() -> Object + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Attribute {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Unit,
    Bool,
    Int,
    Float,
    String,
    Any,
}

impl ValueKind {
    /// 型別預設值，供退化的介面符合實作回傳
    pub fn default_value(&self) -> Value {
        match self {
            ValueKind::Unit | ValueKind::Any => Value::Null,
            ValueKind::Bool => Value::Bool(false),
            ValueKind::Int => Value::from(0),
            ValueKind::Float => Value::from(0.0),
            ValueKind::String => Value::String(String::new()),
        }
    }

    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ValueKind::Any => true,
            ValueKind::Unit => value.is_null(),
            ValueKind::Bool => value.is_boolean(),
            ValueKind::Int => value.is_i64() || value.is_u64(),
            ValueKind::Float => value.is_number(),
            ValueKind::String => value.is_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    #[serde(default)]
    pub params: Vec<ValueKind>,
    #[serde(default = "unit_kind")]
    pub returns: ValueKind,
}

fn unit_kind() -> ValueKind {
    ValueKind::Unit
}

impl Signature {
    pub fn new(params: Vec<ValueKind>, returns: ValueKind) -> Self {
        Self { params, returns }
    }

    pub fn unit() -> Self {
        Self::new(Vec::new(), ValueKind::Unit)
    }

    pub fn accepts(&self, args: &[Value]) -> bool {
        self.params.len() == args.len()
            && self.params.iter().zip(args).all(|(kind, arg)| kind.accepts(arg))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(|p| format!("{:?}", p)).collect();
        write!(f, "({}) -> {:?}", params.join(", "), self.returns)
    }
}

/// Accessor flavour of a member; properties and events expand to one member per accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Method,
    Getter,
    Setter,
    EventAdd,
    EventRemove,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    #[serde(flatten)]
    pub signature: Signature,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDecl {
    pub name: String,
    pub kind: ValueKind,
    #[serde(default = "yes")]
    pub readable: bool,
    #[serde(default)]
    pub writable: bool,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDecl {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

fn yes() -> bool {
    true
}

/// One accessor-level member of an interface.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDescriptor {
    pub name: String,
    pub kind: MemberKind,
    pub signature: Signature,
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceDescriptor {
    pub name: String,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
    #[serde(default)]
    pub properties: Vec<PropertyDecl>,
    #[serde(default)]
    pub events: Vec<EventDecl>,
}

impl InterfaceDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            origin: None,
            attributes: Vec::new(),
            extends: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.extends.push(parent.into());
        self
    }

    pub fn method(self, name: impl Into<String>, signature: Signature) -> Self {
        self.method_with_attributes(name, signature, Vec::new())
    }

    pub fn method_with_attributes(
        mut self,
        name: impl Into<String>,
        signature: Signature,
        attributes: Vec<Attribute>,
    ) -> Self {
        self.methods.push(MethodDecl {
            name: name.into(),
            signature,
            attributes,
        });
        self
    }

    pub fn property(
        mut self,
        name: impl Into<String>,
        kind: ValueKind,
        readable: bool,
        writable: bool,
    ) -> Self {
        self.properties.push(PropertyDecl {
            name: name.into(),
            kind,
            readable,
            writable,
            attributes: Vec::new(),
        });
        self
    }

    pub fn event(mut self, name: impl Into<String>) -> Self {
        self.events.push(EventDecl {
            name: name.into(),
            attributes: Vec::new(),
        });
        self
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name == name)
    }

    /// Flattens methods, property accessors and event accessors, in declaration order.
    pub fn members(&self) -> Vec<MemberDescriptor> {
        let mut members = Vec::new();

        for method in &self.methods {
            members.push(MemberDescriptor {
                name: method.name.clone(),
                kind: MemberKind::Method,
                signature: method.signature.clone(),
                attributes: method.attributes.clone(),
            });
        }

        for property in &self.properties {
            if property.readable {
                members.push(MemberDescriptor {
                    name: property.name.clone(),
                    kind: MemberKind::Getter,
                    signature: Signature::new(Vec::new(), property.kind),
                    attributes: property.attributes.clone(),
                });
            }
            if property.writable {
                members.push(MemberDescriptor {
                    name: property.name.clone(),
                    kind: MemberKind::Setter,
                    signature: Signature::new(vec![property.kind], ValueKind::Unit),
                    attributes: property.attributes.clone(),
                });
            }
        }

        for event in &self.events {
            for kind in [MemberKind::EventAdd, MemberKind::EventRemove] {
                members.push(MemberDescriptor {
                    name: event.name.clone(),
                    kind,
                    signature: Signature::new(vec![ValueKind::Any], ValueKind::Unit),
                    attributes: event.attributes.clone(),
                });
            }
        }

        members
    }
}

/// A member implementation on a concrete type.
#[derive(Clone)]
pub struct TargetMember {
    pub name: String,
    pub kind: MemberKind,
    pub signature: Signature,
    /// Interface this member explicitly implements, if any.
    pub qualifier: Option<String>,
    pub body: Option<MemberBody>,
}

impl TargetMember {
    pub fn method<F>(name: impl Into<String>, signature: Signature, body: F) -> Self
    where
        F: Fn(&mut Object, &[Value]) -> Result<Value, InvocationError> + Send + Sync + 'static,
    {
        Self::accessor(name, MemberKind::Method, signature, body)
    }

    pub fn accessor<F>(name: impl Into<String>, kind: MemberKind, signature: Signature, body: F) -> Self
    where
        F: Fn(&mut Object, &[Value]) -> Result<Value, InvocationError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind,
            signature,
            qualifier: None,
            body: Some(Arc::new(body)),
        }
    }

    /// Metadata-only declaration, e.g. loaded from a manifest.
    pub fn declared(name: impl Into<String>, kind: MemberKind, signature: Signature) -> Self {
        Self {
            name: name.into(),
            kind,
            signature,
            qualifier: None,
            body: None,
        }
    }

    pub fn for_interface(mut self, interface: impl Into<String>) -> Self {
        self.qualifier = Some(interface.into());
        self
    }

    pub fn matches(&self, member: &MemberDescriptor) -> bool {
        self.name == member.name && self.kind == member.kind && self.signature == member.signature
    }

    pub fn display_name(&self) -> String {
        match &self.qualifier {
            Some(interface) => format!("{}.{}", interface, self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Debug for TargetMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetMember")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("signature", &self.signature)
            .field("qualifier", &self.qualifier)
            .field("bound", &self.body.is_some())
            .finish()
    }
}

/// A concrete type known to the metadata provider.
#[derive(Clone)]
pub struct TypeDescriptor {
    pub name: String,
    pub base: Option<String>,
    pub interfaces: Vec<String>,
    pub attributes: Vec<Attribute>,
    pub constructor: Option<Constructor>,
    pub members: Vec<TargetMember>,
}

impl TypeDescriptor {
    /// A class deriving from the root type.
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: Some(ROOT_TYPE.to_string()),
            interfaces: Vec::new(),
            attributes: Vec::new(),
            constructor: None,
            members: Vec::new(),
        }
    }

    pub fn root() -> Self {
        let mut root = Self::class(ROOT_TYPE).with_default_constructor();
        root.base = None;
        root
    }

    pub fn extends(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn member(mut self, member: TargetMember) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_constructor<F>(mut self, constructor: F) -> Self
    where
        F: Fn() -> Object + Send + Sync + 'static,
    {
        self.constructor = Some(Arc::new(constructor));
        self
    }

    pub fn with_default_constructor(self) -> Self {
        let name = self.name.clone();
        self.with_constructor(move || Object::new(name.clone()))
    }

    /// Finds an implementation for `member` declared directly on this type.
    /// An explicit implementation for `interface` wins over a plain one.
    pub fn find_member(&self, interface: &str, member: &MemberDescriptor) -> Option<&TargetMember> {
        self.members
            .iter()
            .find(|m| m.qualifier.as_deref() == Some(interface) && m.matches(member))
            .or_else(|| {
                self.members
                    .iter()
                    .find(|m| m.qualifier.is_none() && m.matches(member))
            })
    }

    /// Creates a fresh instance through the parameterless constructor.
    pub fn create_instance(&self) -> Option<Object> {
        self.constructor.as_ref().map(|ctor| ctor())
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("base", &self.base)
            .field("interfaces", &self.interfaces)
            .field("attributes", &self.attributes)
            .field("has_constructor", &self.constructor.is_some())
            .field("members", &self.members)
            .finish()
    }
}

/// Runtime state of an instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    type_name: String,
    pub state: Map<String, Value>,
}

impl Object {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            state: Map::new(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn get(&self, field: &str) -> Value {
        self.state.get(field).cloned().unwrap_or(Value::Null)
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.state.insert(field.into(), value);
    }
}
