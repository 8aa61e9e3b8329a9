//! Instance binding.
//!
//! Creates object instances from registered types and attaches their child
//! variables to fields of the backing state. Bindings are installed once
//! and stay fixed for the life of the address space.

use cstr_schema::{NodeId, TypeId};
use tracing::{debug, info};

use crate::adapter::{FieldAccessor, FieldAdapter, Scalar};
use crate::error::BindingError;
use crate::space::{AddressSpace, NodeClass};

impl<S: 'static> AddressSpace<S> {
    /// Instantiate `type_id` under `parent` and report it.
    pub fn create_instance(
        &mut self,
        parent: NodeId,
        name: &str,
        type_id: TypeId,
    ) -> Result<NodeId, BindingError> {
        let instance = self.add_instance(parent, name, type_id)?;
        info!(instance = name, node = %instance, "instance created");
        Ok(instance)
    }

    /// Bind child `child_name` of `instance` to the field reached through
    /// `field`.
    ///
    /// The child must be a direct component of the instance and its declared
    /// kind must be `K`.
    pub fn bind_field<K: Scalar>(
        &mut self,
        instance: NodeId,
        child_name: &str,
        field: FieldAccessor<S, K>,
    ) -> Result<NodeId, BindingError> {
        let child = self.resolve_child(instance, child_name)?;
        match self.node(child).map(|n| &n.class) {
            Some(NodeClass::Variable { kind, .. }) if *kind == K::KIND => {}
            Some(NodeClass::Variable { kind, .. }) => {
                return Err(BindingError::KindMismatch {
                    node: child,
                    declared: *kind,
                    bound: K::KIND,
                });
            }
            _ => return Err(BindingError::NotAVariable(child)),
        }

        self.set_data_source(child, Box::new(FieldAdapter::new(field)))?;
        let kind = K::KIND;
        debug!(%instance, child = child_name, node = %child, %kind, "field bound");
        Ok(child)
    }
}

#[cfg(test)]
mod tests {
    use cstr_schema::{FieldDef, ScalarKind, SchemaRegistry};

    use crate::value::{ReadOptions, Variant, WriteValue};

    use super::*;

    #[derive(Debug, Default)]
    struct Line {
        pump_a: f64,
        pump_b: f64,
        recipe: u32,
    }

    fn pump_a() -> FieldAccessor<Line, f64> {
        FieldAccessor::new(|l: &Line| &l.pump_a, |l: &mut Line| &mut l.pump_a)
    }

    fn pump_b() -> FieldAccessor<Line, f64> {
        FieldAccessor::new(|l: &Line| &l.pump_b, |l: &mut Line| &mut l.pump_b)
    }

    fn recipe() -> FieldAccessor<Line, u32> {
        FieldAccessor::new(|l: &Line| &l.recipe, |l: &mut Line| &mut l.recipe)
    }

    fn space() -> (AddressSpace<Line>, TypeId, TypeId) {
        let mut schema = SchemaRegistry::new();
        let pump = schema
            .register_type("PumpType", [FieldDef::read_write("SPEED", ScalarKind::Double)])
            .unwrap();
        let batch = schema
            .register_type("BatchType", [FieldDef::read_write("RECIPE", ScalarKind::UInt32)])
            .unwrap();
        (AddressSpace::new(schema), pump, batch)
    }

    #[test]
    fn test_bind_and_write() {
        let (mut space, pump, batch) = space();
        let folder = space.add_folder("Line");
        let a = space.create_instance(folder, "P-1", pump).unwrap();
        let b = space.create_instance(folder, "B-1", batch).unwrap();

        let speed = space.bind_field(a, "SPEED", pump_a()).unwrap();
        let rec = space.bind_field(b, "RECIPE", recipe()).unwrap();

        let mut line = Line::default();
        space
            .write(speed, &WriteValue::scalar(Variant::Double(12.5)), &mut line)
            .unwrap();
        space
            .write(rec, &WriteValue::scalar(Variant::UInt32(4)), &mut line)
            .unwrap();
        assert_eq!(line.pump_a, 12.5);
        assert_eq!(line.recipe, 4);
        assert_eq!(line.pump_b, 0.0);
    }

    #[test]
    fn test_unknown_child() {
        let (mut space, pump, _) = space();
        let folder = space.add_folder("Line");
        let a = space.create_instance(folder, "P-1", pump).unwrap();
        assert_eq!(
            space.bind_field(a, "speed", pump_a()),
            Err(BindingError::ChildNotFound {
                parent: a,
                name: "speed".to_string()
            })
        );
    }

    #[test]
    fn test_kind_must_match_declaration() {
        let (mut space, pump, _) = space();
        let folder = space.add_folder("Line");
        let a = space.create_instance(folder, "P-1", pump).unwrap();
        let speed = space.resolve_child(a, "SPEED").unwrap();
        assert_eq!(
            space.bind_field(a, "SPEED", recipe()),
            Err(BindingError::KindMismatch {
                node: speed,
                declared: ScalarKind::Double,
                bound: ScalarKind::UInt32,
            })
        );
        assert!(!space.is_bound(speed));
    }

    #[test]
    fn test_binding_is_one_shot() {
        let (mut space, pump, _) = space();
        let folder = space.add_folder("Line");
        let a = space.create_instance(folder, "P-1", pump).unwrap();
        let speed = space.bind_field(a, "SPEED", pump_a()).unwrap();
        assert_eq!(
            space.bind_field(a, "SPEED", pump_b()),
            Err(BindingError::AlreadyBound(speed))
        );

        // The original binding is still in place.
        let mut line = Line::default();
        space
            .write(speed, &WriteValue::scalar(Variant::Double(3.0)), &mut line)
            .unwrap();
        assert_eq!(line.pump_a, 3.0);
        assert_eq!(line.pump_b, 0.0);
    }

    #[test]
    fn test_failed_instance_does_not_affect_others() {
        let (mut space, pump, _) = space();
        let folder = space.add_folder("Line");
        let a = space.create_instance(folder, "P-1", pump).unwrap();
        let b = space.create_instance(folder, "P-2", pump).unwrap();

        let speed_a = space.bind_field(a, "SPEED", pump_a()).unwrap();
        assert!(space.bind_field(b, "RPM", pump_b()).is_err());

        let mut line = Line {
            pump_a: 7.0,
            ..Default::default()
        };
        let dv = space
            .read(speed_a, &ReadOptions::default(), &line)
            .unwrap();
        assert_eq!(dv.value, Variant::Double(7.0));
        space
            .write(speed_a, &WriteValue::scalar(Variant::Double(8.0)), &mut line)
            .unwrap();
        assert_eq!(line.pump_a, 8.0);

        // The unbound child of the failed instance reports an internal error.
        let speed_b = space.resolve_child(b, "SPEED").unwrap();
        assert!(space.read(speed_b, &ReadOptions::default(), &line).is_err());
    }

    #[test]
    fn test_create_instance_errors() {
        let (mut space, pump, _) = space();
        let bogus = TypeId(NodeId::numeric(1, 1));
        assert_eq!(
            space.create_instance(NodeId::OBJECTS_FOLDER, "X", bogus),
            Err(BindingError::UnknownType(bogus))
        );
        let missing = NodeId::numeric(3, 3);
        assert_eq!(
            space.create_instance(missing, "X", pump),
            Err(BindingError::NotFound(missing))
        );
    }
}
