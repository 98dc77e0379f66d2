//! Plugin manifests and the global name registry.

use crate::traits::{Sensor, Step, Trigger};
use indexmap::IndexMap;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Which table a name belongs to; used in collision messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PluginKind {
    /// Behavior-tree leaf.
    Step,
    /// Blackboard predicate.
    Trigger,
    /// World observer.
    Sensor,
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Step => "step",
            Self::Trigger => "trigger",
            Self::Sensor => "sensor",
        };
        write!(f, "{s}")
    }
}

/// Errors from plugin registration.
#[derive(Clone, Debug)]
pub enum RegistryError {
    /// The same name was registered twice, possibly across roles.
    ///
    /// Names are global and unique across steps, triggers, and sensors.
    DuplicateName {
        /// The colliding name.
        name: String,
        /// Role of the second registration.
        kind: PluginKind,
        /// Manifest that registered the name first.
        first_origin: String,
        /// Manifest attempting the second registration.
        second_origin: String,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateName {
                name,
                kind,
                first_origin,
                second_origin,
            } => write!(
                f,
                "duplicate plugin name '{name}' ({kind}): first registered by \
                 '{first_origin}', re-registered by '{second_origin}'"
            ),
        }
    }
}

impl Error for RegistryError {}

/// A batch of plugins contributed by one origin (crate, module, host).
///
/// Built with the chaining methods and handed to
/// [`PluginRegistry::install`].
pub struct PluginManifest {
    origin: String,
    steps: Vec<(String, Arc<dyn Step>)>,
    triggers: Vec<(String, Arc<dyn Trigger>)>,
    sensors: Vec<(String, Arc<dyn Sensor>)>,
}

impl PluginManifest {
    /// Start an empty manifest for `origin`.
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            steps: Vec::new(),
            triggers: Vec::new(),
            sensors: Vec::new(),
        }
    }

    /// The manifest's origin label.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Add a step.
    pub fn step(mut self, name: impl Into<String>, step: impl Step + 'static) -> Self {
        self.steps.push((name.into(), Arc::new(step)));
        self
    }

    /// Add a trigger.
    pub fn trigger(mut self, name: impl Into<String>, trigger: impl Trigger + 'static) -> Self {
        self.triggers.push((name.into(), Arc::new(trigger)));
        self
    }

    /// Add a sensor.
    pub fn sensor(mut self, name: impl Into<String>, sensor: impl Sensor + 'static) -> Self {
        self.sensors.push((name.into(), Arc::new(sensor)));
        self
    }
}

/// Name-indexed tables of steps, triggers, and sensors.
///
/// Iteration order everywhere is registration order, which keeps sensor
/// execution and validation output deterministic.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    steps: IndexMap<String, Arc<dyn Step>>,
    triggers: IndexMap<String, Arc<dyn Trigger>>,
    sensors: IndexMap<String, Arc<dyn Sensor>>,
    origins: IndexMap<String, (PluginKind, String)>,
}

impl PluginRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install every plugin in `manifest`.
    ///
    /// All-or-nothing: names are checked (against the registry and within
    /// the manifest) before anything is inserted, so a failed install
    /// leaves the registry unchanged.
    pub fn install(&mut self, manifest: PluginManifest) -> Result<(), RegistryError> {
        let origin = manifest.origin.clone();
        {
            let mut pending: IndexMap<&str, PluginKind> = IndexMap::new();
            let names = manifest
                .steps
                .iter()
                .map(|(n, _)| (n.as_str(), PluginKind::Step))
                .chain(
                    manifest
                        .triggers
                        .iter()
                        .map(|(n, _)| (n.as_str(), PluginKind::Trigger)),
                )
                .chain(
                    manifest
                        .sensors
                        .iter()
                        .map(|(n, _)| (n.as_str(), PluginKind::Sensor)),
                );
            for (name, kind) in names {
                if let Some((_, first_origin)) = self.origins.get(name) {
                    return Err(RegistryError::DuplicateName {
                        name: name.to_string(),
                        kind,
                        first_origin: first_origin.clone(),
                        second_origin: origin.clone(),
                    });
                }
                if pending.insert(name, kind).is_some() {
                    return Err(RegistryError::DuplicateName {
                        name: name.to_string(),
                        kind,
                        first_origin: origin.clone(),
                        second_origin: origin.clone(),
                    });
                }
            }
        }

        for (name, step) in manifest.steps {
            self.origins
                .insert(name.clone(), (PluginKind::Step, origin.clone()));
            self.steps.insert(name, step);
        }
        for (name, trigger) in manifest.triggers {
            self.origins
                .insert(name.clone(), (PluginKind::Trigger, origin.clone()));
            self.triggers.insert(name, trigger);
        }
        for (name, sensor) in manifest.sensors {
            self.origins
                .insert(name.clone(), (PluginKind::Sensor, origin.clone()));
            self.sensors.insert(name, sensor);
        }
        Ok(())
    }

    /// Resolve a step by name.
    pub fn get_step(&self, name: &str) -> Option<Arc<dyn Step>> {
        self.steps.get(name).cloned()
    }

    /// Resolve a trigger by name.
    pub fn get_trigger(&self, name: &str) -> Option<Arc<dyn Trigger>> {
        self.triggers.get(name).cloned()
    }

    /// Resolve a sensor by name.
    pub fn get_sensor(&self, name: &str) -> Option<Arc<dyn Sensor>> {
        self.sensors.get(name).cloned()
    }

    /// Registered step names, in registration order.
    pub fn step_names(&self) -> impl Iterator<Item = &str> {
        self.steps.keys().map(String::as_str)
    }

    /// Registered trigger names, in registration order.
    pub fn trigger_names(&self) -> impl Iterator<Item = &str> {
        self.triggers.keys().map(String::as_str)
    }

    /// Registered sensor names, in registration order.
    pub fn sensor_names(&self) -> impl Iterator<Item = &str> {
        self.sensors.keys().map(String::as_str)
    }

    /// Sensors with their names, in registration order.
    pub fn sensors(&self) -> impl Iterator<Item = (&str, &Arc<dyn Sensor>)> {
        self.sensors.iter().map(|(n, s)| (n.as_str(), s))
    }

    /// Triggers with their names, in registration order.
    pub fn triggers(&self) -> impl Iterator<Item = (&str, &Arc<dyn Trigger>)> {
        self.triggers.iter().map(|(n, t)| (n.as_str(), t))
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("steps", &self.steps.keys().collect::<Vec<_>>())
            .field("triggers", &self.triggers.keys().collect::<Vec<_>>())
            .field("sensors", &self.sensors.keys().collect::<Vec<_>>())
            .finish()
    }
}
