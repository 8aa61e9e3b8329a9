//! The four object types the reactor plant exposes.

use crate::kind::ScalarKind;
use crate::registry::{FieldDef, SchemaError, SchemaRegistry, TypeId};

pub const SENSOR_TYPE: &str = "SensorType";
pub const REACTOR_TYPE: &str = "ReactorType";
pub const VALVE_HANDLE_CONTROL_TYPE: &str = "ValveHandleControlType";
pub const MATH_MODEL_TYPE: &str = "MathModelType";

pub const PROCESS_VALUE: &str = "PROCESS_VALUE";
pub const REACTOR_VOLUME: &str = "REACTOR_VOLUME";
pub const MANUAL_OUTPUT: &str = "MANUAL_OUTPUT";
pub const SUBSTANCE_ID: &str = "SUBSTANCE_ID";
pub const K01: &str = "K01";
pub const K02: &str = "K02";
pub const EA1: &str = "EA1";
pub const EA2: &str = "EA2";

/// Handles of the registered plant types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlantTypes {
    pub sensor: TypeId,
    pub reactor: TypeId,
    pub valve_handle_control: TypeId,
    pub math_model: TypeId,
}

impl PlantTypes {
    /// Register the sensor, reactor, valve handle control and math model
    /// types. Fails if any of them is already registered.
    pub fn register(registry: &mut SchemaRegistry) -> Result<Self, SchemaError> {
        let sensor = registry.register_type(
            SENSOR_TYPE,
            [FieldDef::read_only(PROCESS_VALUE, ScalarKind::Double)],
        )?;
        let reactor = registry.register_type(
            REACTOR_TYPE,
            [FieldDef::read_write(REACTOR_VOLUME, ScalarKind::Double)],
        )?;
        let valve_handle_control = registry.register_type(
            VALVE_HANDLE_CONTROL_TYPE,
            [FieldDef::read_write(MANUAL_OUTPUT, ScalarKind::Double)],
        )?;
        let math_model = registry.register_type(
            MATH_MODEL_TYPE,
            [
                FieldDef::read_write(SUBSTANCE_ID, ScalarKind::UInt32),
                FieldDef::read_write(K01, ScalarKind::Double),
                FieldDef::read_write(K02, ScalarKind::Double),
                FieldDef::read_write(EA1, ScalarKind::Double),
                FieldDef::read_write(EA2, ScalarKind::Double),
            ],
        )?;

        Ok(Self {
            sensor,
            reactor,
            valve_handle_control,
            math_model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::AccessLevel;

    #[test]
    fn test_plant_types_declared() {
        let mut registry = SchemaRegistry::new();
        let types = PlantTypes::register(&mut registry).unwrap();
        assert_eq!(registry.len(), 4);

        let sensor = registry.get(types.sensor).unwrap();
        let pv = sensor.field(PROCESS_VALUE).unwrap();
        assert_eq!(pv.kind, ScalarKind::Double);
        assert_eq!(pv.access, AccessLevel::ReadOnly);

        let model = registry.get(types.math_model).unwrap();
        let names: Vec<&str> = model.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, [SUBSTANCE_ID, K01, K02, EA1, EA2]);
        assert_eq!(model.field(SUBSTANCE_ID).unwrap().kind, ScalarKind::UInt32);
        assert!(model.fields.iter().all(|f| f.access.is_writable()));
    }

    #[test]
    fn test_registering_twice_fails() {
        let mut registry = SchemaRegistry::new();
        PlantTypes::register(&mut registry).unwrap();
        let err = PlantTypes::register(&mut registry).unwrap_err();
        assert_eq!(err, SchemaError::DuplicateType(SENSOR_TYPE.into()));
    }
}
