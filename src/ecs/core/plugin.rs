use bevy::prelude::*;
use crate::ecs::core::components::*;
use crate::ecs::core::resources::*;

pub struct CorePlugin {
    pub config: GameConfig,
}

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone())
            .init_resource::<ActorRegistry>()
            .init_resource::<ActorIdAllocator>()
            .configure_sets(FixedUpdate, (
                SimulationSet::Clock,
                SimulationSet::Input,
                SimulationSet::Ai,
                SimulationSet::Commands,
                SimulationSet::Advance,
                SimulationSet::Dispatch,
                SimulationSet::Network,
            ).chain())
            .add_systems(FixedUpdate, register_new_actors_system.in_set(SimulationSet::Clock));
    }
}

/// System: Index freshly spawned actors so commands can address them by id
pub fn register_new_actors_system(
    mut registry: ResMut<ActorRegistry>,
    query: Query<(Entity, &Actor), Added<Actor>>,
) {
    for (entity, actor) in query.iter() {
        registry.register_actor(actor.id, entity);
    }
}
