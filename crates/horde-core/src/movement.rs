//! Velocity integration.

use horde_ecs::{Position, Velocity};
use horde_tick::{System, SystemContext, phase};

/// Integrates `Position += Velocity * dt` for every entity carrying both.
///
/// Runs just before the collision pass so resolution sees this frame's
/// positions. A zero `dt` frame leaves every position untouched.
#[derive(Debug, Default)]
pub struct Movement;

impl System for Movement {
    fn name(&self) -> &'static str {
        "movement"
    }

    fn priority(&self) -> i32 {
        phase::PHYSICS - 10
    }

    fn update(&mut self, ctx: &mut SystemContext<'_>, dt_ms: f32) -> eyre::Result<()> {
        let dt_s = dt_ms / 1000.0;
        for entity in ctx
            .world
            .query()
            .with_value::<Position>()
            .with_value::<Velocity>()
            .run()
        {
            let Some(&velocity) = ctx.world.get_as::<Velocity>(entity) else {
                continue;
            };
            if let Some(position) = ctx.world.get_as_mut::<Position>(entity) {
                position.x += velocity.dx * dt_s;
                position.y += velocity.dy * dt_s;
            }
        }
        Ok(())
    }
}
