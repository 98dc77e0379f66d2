//! Reference plugin library for Formic colonies.
//!
//! Everything here is pure in the plugin-contract sense: sensors read the
//! world and return facts, triggers read blackboards, steps read both and
//! return intents. The engine applies the effects.
//!
//! Install the whole set with [`install_defaults`], or pick individual
//! manifests ([`core_sensors`], [`core_triggers`], [`basic_steps`]).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod sensors;
pub mod steps;
pub mod triggers;

use formic_plugin::{PluginManifest, PluginRegistry, RegistryError};

/// The default sensor set under the `formic-plugins/sensors` origin.
pub fn core_sensors() -> PluginManifest {
    PluginManifest::new("formic-plugins/sensors")
        .sensor("bb_basic_state", sensors::BasicState)
        .sensor("bb_env_flags", sensors::EnvFlags)
        .sensor("bb_internal_state", sensors::InternalState)
        .sensor("bb_neighbors", sensors::Neighbours::default())
        .sensor("bb_food_detection", sensors::FoodDetection::default())
        .sensor(
            "bb_pheromone_gradient",
            sensors::PheromoneGradient::new("trail"),
        )
}

/// The default trigger set under the `formic-plugins/triggers` origin.
pub fn core_triggers() -> PluginManifest {
    PluginManifest::new("formic-plugins/triggers")
        .trigger("social_hungry", triggers::SocialHungry)
        .trigger("not_social_hungry", triggers::Not(triggers::SocialHungry))
        .trigger("individual_hungry", triggers::IndividualHungry)
        .trigger(
            "not_individual_hungry",
            triggers::Not(triggers::IndividualHungry),
        )
        .trigger("in_nest", triggers::InNest)
        .trigger("not_in_nest", triggers::Not(triggers::InNest))
        .trigger("at_entry", triggers::AtEntry)
        .trigger("not_at_entry", triggers::Not(triggers::AtEntry))
        .trigger("food_detected", triggers::FoodDetected)
        .trigger("hungry_neighbor_found", triggers::HungryNeighbourFound)
        .trigger("bb_true", triggers::BbTrue)
        .trigger("bb_false", triggers::BbFalse)
}

/// The default step set under the `formic-plugins/steps` origin.
pub fn basic_steps() -> PluginManifest {
    PluginManifest::new("formic-plugins/steps")
        .step("do_nothing", steps::DoNothing)
        .step("random_move", steps::RandomMove)
        .step("move_to_food", steps::MoveToFood)
        .step("collect_food", steps::CollectFood)
        .step("return_to_nest", steps::ReturnToNest)
        .step("feed_hungry_neighbor", steps::FeedHungryNeighbour)
        .step("deposit_trail", steps::DepositTrail)
        .step("example_wait", formic_plugin::WireStep(steps::example_wait_raw))
}

/// Install all reference manifests into `registry`.
pub fn install_defaults(registry: &mut PluginRegistry) -> Result<(), RegistryError> {
    registry.install(core_sensors())?;
    registry.install(core_triggers())?;
    registry.install(basic_steps())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_manifests_install_without_collisions() {
        let mut registry = PluginRegistry::new();
        install_defaults(&mut registry).unwrap();
        assert!(registry.get_sensor("bb_basic_state").is_some());
        assert!(registry.get_trigger("not_in_nest").is_some());
        assert!(registry.get_step("random_move").is_some());
        assert_eq!(registry.sensor_names().count(), 6);
        assert_eq!(registry.trigger_names().count(), 12);
        assert_eq!(registry.step_names().count(), 8);
    }
}
