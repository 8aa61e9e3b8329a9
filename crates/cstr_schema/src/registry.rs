//! Object type registry: declares each object type once at startup together
//! with the mandatory children every instance of it must expose.
use std::collections::HashMap;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::kind::{AccessLevel, ScalarKind};
use crate::node::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("duplicate type: {0}")]
    DuplicateType(String),
    #[error("type '{type_name}' declares field '{field}' twice")]
    DuplicateField { type_name: String, field: String },
    #[error("empty name in declaration of '{0}'")]
    EmptyName(String),
    #[error("unknown type: {0}")]
    UnknownType(TypeId),
}

/// Opaque handle to a registered object type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeId(pub NodeId);

impl std::fmt::Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// A mandatory child variable of an object type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Browse name of the child; instances expose it under exactly this name.
    pub name: String,
    pub kind: ScalarKind,
    pub access: AccessLevel,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, kind: ScalarKind, access: AccessLevel) -> Self {
        Self {
            name: name.into(),
            kind,
            access,
        }
    }

    pub fn read_only(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self::new(name, kind, AccessLevel::ReadOnly)
    }

    pub fn read_write(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self::new(name, kind, AccessLevel::ReadWrite)
    }
}

/// A registered object type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectType {
    pub id: TypeId,
    pub name: String,
    /// Mandatory children, in declaration order.
    pub fields: Vec<FieldDef>,
}

impl ObjectType {
    /// Look up a declared child by browse name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// All object types known to the plant.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    types: Vec<ObjectType>,
    by_name: HashMap<String, usize>,
    next_id: u32,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaRegistry {
    /// First numeric id handed out to a registered type.
    pub const FIRST_TYPE_ID: u32 = 1001;

    pub fn new() -> Self {
        Self {
            types: Vec::new(),
            by_name: HashMap::new(),
            next_id: Self::FIRST_TYPE_ID,
        }
    }

    /// Declare an object type with its mandatory children.
    ///
    /// Fails on a duplicate type name, a duplicate child name, or an empty
    /// name anywhere in the declaration. Nothing is registered on failure.
    pub fn register_type(
        &mut self,
        name: &str,
        fields: impl IntoIterator<Item = FieldDef>,
    ) -> Result<TypeId, SchemaError> {
        if name.is_empty() {
            return Err(SchemaError::EmptyName(name.to_string()));
        }
        if self.by_name.contains_key(name) {
            return Err(SchemaError::DuplicateType(name.to_string()));
        }

        let fields: Vec<FieldDef> = fields.into_iter().collect();
        let mut seen = HashSet::new();
        for field in &fields {
            if field.name.is_empty() {
                return Err(SchemaError::EmptyName(name.to_string()));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    type_name: name.to_string(),
                    field: field.name.clone(),
                });
            }
        }

        let id = TypeId(NodeId::numeric(NodeId::PLANT_NAMESPACE, self.next_id));
        self.next_id += 1;

        self.by_name.insert(name.to_string(), self.types.len());
        self.types.push(ObjectType {
            id,
            name: name.to_string(),
            fields,
        });
        Ok(id)
    }

    /// Get a type by handle, or None if it was never registered here.
    pub fn get(&self, id: TypeId) -> Option<&ObjectType> {
        self.types.iter().find(|t| t.id == id)
    }

    /// Like [`get`](Self::get) but reports an unknown handle as an error.
    pub fn require(&self, id: TypeId) -> Result<&ObjectType, SchemaError> {
        self.get(id).ok_or(SchemaError::UnknownType(id))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Serialize the registry to a JSON description for clients.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "types": self.types.iter().map(|t| {
                serde_json::json!({
                    "id": t.id.0.to_string(),
                    "name": t.name,
                    "fields": t.fields.iter().map(|f| {
                        serde_json::json!({
                            "name": f.name,
                            "kind": f.kind.to_string(),
                            "writable": f.access.is_writable(),
                        })
                    }).collect::<Vec<_>>(),
                })
            }).collect::<Vec<_>>(),
        })
    }
}
