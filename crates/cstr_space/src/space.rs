//! Address space: the node tree remote callers browse, read and write.
//!
//! Nodes are folders, typed object instances, or scalar variables. Each
//! variable may carry one data source. Reads and writes are checked for node
//! existence and access level here and then handed to that source together
//! with the backing state.
use std::collections::HashMap;

use cstr_schema::{AccessLevel, NodeId, ScalarKind, SchemaRegistry, TypeId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adapter::{DataSource, NodeLabel};
use crate::error::{AccessError, BindingError};
use crate::value::{DataValue, ReadOptions, WriteValue};

/// Relationship between a node and one of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceKind {
    /// Folder (or object) grouping another node.
    Organizes,
    /// Object owning one of its member variables.
    HasComponent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeClass {
    Folder,
    Object {
        type_id: TypeId,
    },
    Variable {
        kind: ScalarKind,
        access: AccessLevel,
        /// Created from a mandatory child declaration of the parent's type.
        mandatory: bool,
    },
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub browse_name: String,
    pub display_name: String,
    pub class: NodeClass,
    pub parent: Option<NodeId>,
    children: Vec<(ReferenceKind, NodeId)>,
}

impl Node {
    fn new(id: NodeId, name: &str, class: NodeClass, parent: Option<NodeId>) -> Self {
        Self {
            id,
            browse_name: name.to_string(),
            display_name: name.to_string(),
            class,
            parent,
            children: Vec::new(),
        }
    }

    /// Folders and objects can hold other nodes; variables cannot.
    pub fn is_container(&self) -> bool {
        !matches!(self.class, NodeClass::Variable { .. })
    }
}

/// One entry of a browse result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceDescription {
    pub reference: ReferenceKind,
    pub node_id: NodeId,
    pub browse_name: String,
    pub display_name: String,
    pub class: NodeClass,
}

/// The plant's address space over backing state `S`.
pub struct AddressSpace<S> {
    schema: SchemaRegistry,
    nodes: HashMap<NodeId, Node>,
    sources: HashMap<NodeId, Box<dyn DataSource<S>>>,
    next_id: u32,
}

impl<S: 'static> AddressSpace<S> {
    /// First numeric id handed out to instantiated nodes.
    pub const FIRST_NODE_ID: u32 = 50_000;

    /// Create an address space holding only the `Objects` root folder.
    pub fn new(schema: SchemaRegistry) -> Self {
        let root = Node::new(NodeId::OBJECTS_FOLDER, "Objects", NodeClass::Folder, None);
        let mut nodes = HashMap::new();
        nodes.insert(root.id, root);
        Self {
            schema,
            nodes,
            sources: HashMap::new(),
            next_id: Self::FIRST_NODE_ID,
        }
    }

    /// The type registry instances are created from.
    pub fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn display_name(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(&id).map(|n| n.display_name.as_str())
    }

    fn allocate_id(&mut self) -> NodeId {
        let id = NodeId::numeric(NodeId::PLANT_NAMESPACE, self.next_id);
        self.next_id += 1;
        id
    }

    fn insert_child(
        &mut self,
        parent: NodeId,
        reference: ReferenceKind,
        name: &str,
        class: NodeClass,
    ) -> Result<NodeId, BindingError> {
        self.require_container(parent)?;

        let id = self.allocate_id();
        self.nodes
            .insert(id, Node::new(id, name, class, Some(parent)));
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push((reference, id));
        }
        Ok(id)
    }

    fn require_container(&self, id: NodeId) -> Result<(), BindingError> {
        match self.nodes.get(&id) {
            Some(node) if node.is_container() => Ok(()),
            _ => Err(BindingError::NotFound(id)),
        }
    }

    /// Add a folder under the `Objects` root.
    pub fn add_folder(&mut self, name: &str) -> NodeId {
        // The root always exists and is a folder, so this cannot fail.
        let id = self.allocate_id();
        self.nodes.insert(
            id,
            Node::new(id, name, NodeClass::Folder, Some(NodeId::OBJECTS_FOLDER)),
        );
        if let Some(root) = self.nodes.get_mut(&NodeId::OBJECTS_FOLDER) {
            root.children.push((ReferenceKind::Organizes, id));
        }
        debug!(name, node = %id, "folder added");
        id
    }

    /// Instantiate an object of type `type_id` under `parent`.
    ///
    /// One mandatory variable child is created per declared field, in
    /// declaration order. Nothing is added when the parent or the type is
    /// invalid; the parent is checked first.
    pub fn add_instance(
        &mut self,
        parent: NodeId,
        name: &str,
        type_id: TypeId,
    ) -> Result<NodeId, BindingError> {
        self.require_container(parent)?;
        let fields = self
            .schema
            .require(type_id)
            .map_err(|_| BindingError::UnknownType(type_id))?
            .fields
            .clone();

        let instance = self.insert_child(
            parent,
            ReferenceKind::Organizes,
            name,
            NodeClass::Object { type_id },
        )?;
        for field in &fields {
            self.insert_child(
                instance,
                ReferenceKind::HasComponent,
                &field.name,
                NodeClass::Variable {
                    kind: field.kind,
                    access: field.access,
                    mandatory: true,
                },
            )?;
        }

        self.check_complete(instance)?;
        debug!(name, node = %instance, %type_id, children = fields.len(), "instance added");
        Ok(instance)
    }

    /// Verify that `instance` exposes every field its type declares as a
    /// mandatory variable child of the declared kind and access.
    pub fn check_complete(&self, instance: NodeId) -> Result<(), BindingError> {
        let Some(NodeClass::Object { type_id }) = self.nodes.get(&instance).map(|n| &n.class)
        else {
            return Err(BindingError::NotFound(instance));
        };
        let ty = self
            .schema
            .require(*type_id)
            .map_err(|_| BindingError::UnknownType(*type_id))?;

        for field in &ty.fields {
            let present = self
                .resolve_child(instance, &field.name)
                .ok()
                .and_then(|child| self.nodes.get(&child))
                .is_some_and(|child| {
                    child.class
                        == NodeClass::Variable {
                            kind: field.kind,
                            access: field.access,
                            mandatory: true,
                        }
                });
            if !present {
                return Err(BindingError::IncompleteInstance {
                    instance,
                    child: field.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Resolve `name` among the member variables of `node`.
    ///
    /// Exact match on the browse name, one level deep, over component
    /// references only.
    pub fn resolve_child(&self, node: NodeId, name: &str) -> Result<NodeId, BindingError> {
        let not_found = || BindingError::ChildNotFound {
            parent: node,
            name: name.to_string(),
        };
        let parent = self.nodes.get(&node).ok_or_else(not_found)?;
        parent
            .children
            .iter()
            .filter(|(reference, _)| *reference == ReferenceKind::HasComponent)
            .map(|(_, id)| *id)
            .find(|id| {
                self.nodes
                    .get(id)
                    .is_some_and(|child| child.browse_name == name)
            })
            .ok_or_else(not_found)
    }

    /// Resolve a slash-separated browse path from the `Objects` root, e.g.
    /// `"Sensors/FRA-1/PROCESS_VALUE"`. Each step follows any reference.
    pub fn resolve_path(&self, path: &str) -> Option<NodeId> {
        let mut current = NodeId::OBJECTS_FOLDER;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            let node = self.nodes.get(&current)?;
            current = node
                .children
                .iter()
                .map(|(_, id)| *id)
                .find(|id| {
                    self.nodes
                        .get(id)
                        .is_some_and(|child| child.browse_name == segment)
                })?;
        }
        Some(current)
    }

    /// Install the data source of a variable. A variable is bound at most once.
    pub fn set_data_source(
        &mut self,
        node: NodeId,
        source: Box<dyn DataSource<S>>,
    ) -> Result<(), BindingError> {
        let target = self
            .nodes
            .get(&node)
            .ok_or(BindingError::NotAVariable(node))?;
        let NodeClass::Variable { kind, .. } = target.class else {
            return Err(BindingError::NotAVariable(node));
        };
        if source.kind() != kind {
            return Err(BindingError::KindMismatch {
                node,
                declared: kind,
                bound: source.kind(),
            });
        }
        if self.sources.contains_key(&node) {
            return Err(BindingError::AlreadyBound(node));
        }
        self.sources.insert(node, source);
        Ok(())
    }

    pub fn is_bound(&self, node: NodeId) -> bool {
        self.sources.contains_key(&node)
    }

    pub fn bound_count(&self) -> usize {
        self.sources.len()
    }

    fn variable(&self, id: NodeId) -> Result<(&Node, AccessLevel), AccessError> {
        let node = self.nodes.get(&id).ok_or(AccessError::NodeIdUnknown(id))?;
        match node.class {
            NodeClass::Variable { access, .. } => Ok((node, access)),
            _ => Err(AccessError::NotReadable(id)),
        }
    }

    /// Read the current value of a variable.
    pub fn read(&self, id: NodeId, options: &ReadOptions, state: &S) -> Result<DataValue, AccessError> {
        self.variable(id)?;
        let source = self.sources.get(&id).ok_or(AccessError::InternalError)?;
        source.read(state, options)
    }

    /// Write a variable. Read-only variables refuse before their data source
    /// is consulted.
    pub fn write(&self, id: NodeId, request: &WriteValue, state: &mut S) -> Result<(), AccessError> {
        let (node, access) = self.variable(id).map_err(|e| match e {
            AccessError::NotReadable(id) => AccessError::NotWritable(id),
            other => other,
        })?;
        if !access.is_writable() {
            return Err(AccessError::NotWritable(id));
        }
        let source = self.sources.get(&id).ok_or(AccessError::InternalError)?;
        let label = NodeLabel {
            id,
            display_name: Some(node.display_name.as_str()),
        };
        source.write(state, request, &label)
    }

    /// List the children of a node.
    pub fn browse(&self, id: NodeId) -> Result<Vec<ReferenceDescription>, AccessError> {
        let node = self.nodes.get(&id).ok_or(AccessError::NodeIdUnknown(id))?;
        Ok(node
            .children
            .iter()
            .filter_map(|(reference, child)| {
                self.nodes.get(child).map(|c| ReferenceDescription {
                    reference: *reference,
                    node_id: c.id,
                    browse_name: c.browse_name.clone(),
                    display_name: c.display_name.clone(),
                    class: c.class.clone(),
                })
            })
            .collect())
    }
}
