//! Death bookkeeping.

use horde_ecs::Health;
use horde_event::EventData;
use horde_tick::{System, SystemContext, phase};

/// Sweeps depleted entities at the end of the gameplay phase: publishes a
/// Death event (while the entity is still alive, so listeners can read its
/// components) and then despawns it.
#[derive(Debug, Default)]
pub struct HealthSweep;

impl System for HealthSweep {
    fn name(&self) -> &'static str {
        "health-sweep"
    }

    fn priority(&self) -> i32 {
        phase::GAMEPLAY
    }

    fn update(&mut self, ctx: &mut SystemContext<'_>, _dt_ms: f32) -> eyre::Result<()> {
        // Query results are plain ids; despawning while walking them is
        // safe because every access revalidates liveness.
        for entity in ctx.world.query().with_value::<Health>().run() {
            let depleted = ctx
                .world
                .get_as::<Health>(entity)
                .is_some_and(Health::is_depleted);
            if !depleted {
                continue;
            }
            ctx.events
                .publish_with(ctx.world, EventData::Death { entity }, Some(entity));
            if ctx.world.despawn(entity) {
                tracing::debug!(%entity, "depleted entity removed");
            }
        }
        Ok(())
    }
}
