//! Plant setup.
//!
//! Registers the object types, builds the folder and instance tree, and
//! binds every instance child to its field of the [`ModelContext`]. Each
//! instance binds independently; the outcome is collected in a
//! [`SetupReport`] for the caller to judge.

use cstr_model::ModelContext;
use cstr_schema::plant::{
    EA1, EA2, K01, K02, MANUAL_OUTPUT, PROCESS_VALUE, REACTOR_VOLUME, SUBSTANCE_ID,
};
use cstr_schema::{NodeId, PlantTypes, SchemaError, SchemaRegistry, TypeId};
use cstr_space::{AddressSpace, BindingError, FieldAccessor};
use tracing::{error, info};

/// Accessor pair for a field path inside [`ModelContext`].
macro_rules! field {
    ($($path:ident).+) => {
        FieldAccessor::new(
            |ctx: &ModelContext| &ctx.$($path).+,
            |ctx: &mut ModelContext| &mut ctx.$($path).+,
        )
    };
}

/// One child to bind, tagged with its kind.
pub enum Binding {
    Double(&'static str, FieldAccessor<ModelContext, f64>),
    UInt32(&'static str, FieldAccessor<ModelContext, u32>),
}

impl Binding {
    fn apply(
        self,
        space: &mut AddressSpace<ModelContext>,
        instance: NodeId,
    ) -> Result<NodeId, BindingError> {
        match self {
            Binding::Double(name, field) => space.bind_field(instance, name, field),
            Binding::UInt32(name, field) => space.bind_field(instance, name, field),
        }
    }
}

/// Setup outcome of one instance.
#[derive(Debug, Clone)]
pub struct InstanceReport {
    /// `Folder/Name`
    pub path: String,
    pub bound: usize,
    pub error: Option<BindingError>,
}

#[derive(Debug, Clone, Default)]
pub struct SetupReport {
    pub instances: Vec<InstanceReport>,
}

impl SetupReport {
    pub fn failures(&self) -> impl Iterator<Item = &InstanceReport> {
        self.instances.iter().filter(|r| r.error.is_some())
    }

    /// `true` when every instance was created and fully bound.
    pub fn is_complete(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn bound_fields(&self) -> usize {
        self.instances.iter().map(|r| r.bound).sum()
    }
}

/// The plant state together with its address space. The owner of a `Plant`
/// is the only writer of both.
pub struct Plant {
    pub model: ModelContext,
    pub space: AddressSpace<ModelContext>,
    pub types: PlantTypes,
}

impl Plant {
    /// Register the plant types into an empty address space.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if a plant type fails to register.
    pub fn new() -> Result<Self, SchemaError> {
        let mut schema = SchemaRegistry::new();
        let types = PlantTypes::register(&mut schema)?;
        info!(types = schema.len(), "object types registered");
        Ok(Self {
            model: ModelContext::new(),
            space: AddressSpace::new(schema),
            types,
        })
    }

    /// Register the types and build the full plant: folders, the nine
    /// instances, and their field bindings.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if a plant type fails to register. Binding
    /// failures are reported in the [`SetupReport`] instead.
    pub fn build() -> Result<(Self, SetupReport), SchemaError> {
        let mut plant = Self::new()?;
        let mut report = SetupReport::default();
        let types = plant.types;

        let model = plant.folder("Model");
        let valves = plant.folder("Valves");
        let sensors = plant.folder("Sensors");
        let reactors = plant.folder("Reactors");

        plant.model.reactor.object = plant.instance(
            &mut report,
            reactors,
            "1-F",
            types.reactor,
            vec![Binding::Double(REACTOR_VOLUME, field!(reactor.volume))],
        );

        plant.instance(
            &mut report,
            model,
            "Config",
            types.math_model,
            vec![
                Binding::UInt32(SUBSTANCE_ID, field!(substance_id)),
                Binding::Double(K01, field!(config.k01)),
                Binding::Double(K02, field!(config.k02)),
                Binding::Double(EA1, field!(config.ea1)),
                Binding::Double(EA2, field!(config.ea2)),
            ],
        );

        plant.model.sensor_flow.object = plant.instance(
            &mut report,
            sensors,
            "FRA-1",
            types.sensor,
            vec![Binding::Double(PROCESS_VALUE, field!(sensor_flow.process_value))],
        );
        plant.model.sensor_temperature.object = plant.instance(
            &mut report,
            sensors,
            "TRA-1",
            types.sensor,
            vec![Binding::Double(PROCESS_VALUE, field!(sensor_temperature.process_value))],
        );
        plant.model.sensor_concentration_a.object = plant.instance(
            &mut report,
            sensors,
            "CRA-1",
            types.sensor,
            vec![Binding::Double(PROCESS_VALUE, field!(sensor_concentration_a.process_value))],
        );
        plant.model.sensor_concentration_b.object = plant.instance(
            &mut report,
            sensors,
            "CRA-2",
            types.sensor,
            vec![Binding::Double(PROCESS_VALUE, field!(sensor_concentration_b.process_value))],
        );

        plant.model.valve_concentration_a.object = plant.instance(
            &mut report,
            valves,
            "HC-1",
            types.valve_handle_control,
            vec![Binding::Double(MANUAL_OUTPUT, field!(valve_concentration_a.manual_output))],
        );
        plant.model.valve_flow.object = plant.instance(
            &mut report,
            valves,
            "HC-2",
            types.valve_handle_control,
            vec![Binding::Double(MANUAL_OUTPUT, field!(valve_flow.manual_output))],
        );
        plant.model.valve_temperature.object = plant.instance(
            &mut report,
            valves,
            "HC-3",
            types.valve_handle_control,
            vec![Binding::Double(MANUAL_OUTPUT, field!(valve_temperature.manual_output))],
        );

        info!(
            instances = report.instances.len(),
            fields = report.bound_fields(),
            failed = report.failures().count(),
            "plant setup finished"
        );
        Ok((plant, report))
    }

    fn folder(&mut self, name: &str) -> NodeId {
        let id = self.space.add_folder(name);
        info!(folder = name, node = %id, "folder created");
        id
    }

    /// Create one instance and bind its children in order. The first
    /// failing binding stops this instance; other instances are unaffected.
    ///
    /// Returns the instance node, or [`NodeId::NULL`] if creation failed.
    pub(crate) fn instance(
        &mut self,
        report: &mut SetupReport,
        folder: NodeId,
        name: &str,
        type_id: TypeId,
        bindings: Vec<Binding>,
    ) -> NodeId {
        let path = match self.space.display_name(folder) {
            Some(folder) => format!("{folder}/{name}"),
            None => name.to_string(),
        };
        let mut entry = InstanceReport {
            path,
            bound: 0,
            error: None,
        };

        let instance = match self.space.create_instance(folder, name, type_id) {
            Ok(id) => id,
            Err(e) => {
                error!(instance = %entry.path, error = %e, "instance creation failed");
                entry.error = Some(e);
                report.instances.push(entry);
                return NodeId::NULL;
            }
        };

        for binding in bindings {
            match binding.apply(&mut self.space, instance) {
                Ok(_) => entry.bound += 1,
                Err(e) => {
                    error!(instance = %entry.path, error = %e, "binding failed");
                    entry.error = Some(e);
                    break;
                }
            }
        }
        report.instances.push(entry);
        instance
    }
}
