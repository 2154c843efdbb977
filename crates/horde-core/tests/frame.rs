//! Whole-frame scenarios across the entity store, bus, scheduler, and
//! collision pass.

use std::cell::RefCell;
use std::rc::Rc;

use horde_core::prelude::*;
use horde_ecs::ComponentKind;
use horde_event::EventData;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

type Log = Rc<RefCell<Vec<&'static str>>>;

struct Recorder {
    name: &'static str,
    priority: i32,
    log: Log,
}

impl System for Recorder {
    fn name(&self) -> &'static str {
        self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn update(&mut self, _ctx: &mut SystemContext<'_>, _dt_ms: f32) -> eyre::Result<()> {
        self.log.borrow_mut().push(self.name);
        Ok(())
    }
}

fn spawn_circle(sim: &mut Simulation, x: f32, y: f32, radius: f32, layer: Layer) -> Entity {
    let world = sim.world_mut();
    let entity = world.spawn();
    world.insert(entity, Position::new(x, y));
    world.insert(entity, Collider::new(radius, layer));
    entity
}

#[test]
fn test_frame_runs_phases_in_order() {
    init_tracing();
    let mut sim = Simulation::new();
    let log: Log = Log::default();

    // Registered in scrambled order; the frame must still run by phase.
    for (name, priority) in [
        ("present", phase::PRESENT),
        ("input", phase::INPUT),
        ("gameplay", phase::GAMEPLAY),
        ("physics", phase::PHYSICS),
        ("ai", phase::AI),
    ] {
        sim.register_system(Box::new(Recorder {
            name,
            priority,
            log: Rc::clone(&log),
        }))
        .unwrap();
    }
    sim.start();
    sim.tick(16.0);

    assert_eq!(
        *log.borrow(),
        vec!["input", "ai", "physics", "gameplay", "present"]
    );
}

#[test]
fn test_collision_event_drives_damage_through_the_bus() {
    init_tracing();
    let mut sim = Simulation::new();
    sim.register_system(Box::new(BroadPhase::default())).unwrap();

    let actor = spawn_circle(&mut sim, 0.0, 0.0, 10.0, Layer::Actor);
    sim.world_mut().insert(actor, Health::full(10.0));
    let hazard = spawn_circle(&mut sim, 15.0, 0.0, 10.0, Layer::Hazard);

    // Collision listener re-publishes as Damage; the Damage listener is
    // what actually touches the store. Exercises nested dispatch inside a
    // system's update.
    let pair = LayerPair::new(Layer::Actor, Layer::Hazard);
    sim.events()
        .subscribe(EventKind::Collision(pair), 0, |world, bus, event| {
            let EventData::Collision(contact) = event.data else {
                eyre::bail!("collision kind carried a foreign payload");
            };
            let target = if contact.layer_a == Layer::Actor {
                contact.a
            } else {
                contact.b
            };
            bus.publish_with(world, EventData::Damage { target, amount: 4.0 }, Some(target));
            Ok(())
        });
    sim.events().subscribe(EventKind::Damage, 0, |world, _, event| {
        let EventData::Damage { target, amount } = event.data else {
            eyre::bail!("damage kind carried a foreign payload");
        };
        if let Some(health) = world.get_as_mut::<Health>(target) {
            health.current -= amount;
        }
        Ok(())
    });

    sim.start();
    sim.tick(16.0);

    let health = sim.world().get_as::<Health>(actor).unwrap();
    assert_eq!(health.current, 6.0);

    // Resolution pushed the pair apart symmetrically.
    let actor_pos = sim.world().get_as::<Position>(actor).unwrap();
    let hazard_pos = sim.world().get_as::<Position>(hazard).unwrap();
    assert_eq!(actor_pos.x, -2.5);
    assert_eq!(hazard_pos.x, 17.5);

    assert_eq!(sim.metrics().pairs_overlapping, 1);
    assert_eq!(sim.metrics().events_published, 2);
}

#[test]
fn test_zero_dt_frame_runs_every_unit_but_moves_nothing() {
    init_tracing();
    let mut sim = Simulation::new();
    sim.register_system(Box::new(Movement)).unwrap();

    let mover = {
        let world = sim.world_mut();
        let entity = world.spawn();
        world.insert(entity, Position::new(5.0, 5.0));
        world.insert(entity, Velocity::new(1000.0, 1000.0));
        entity
    };

    sim.start();
    sim.tick(0.0);

    assert_eq!(sim.metrics().frames, 1);
    assert_eq!(
        *sim.world().get_as::<Position>(mover).unwrap(),
        Position::new(5.0, 5.0)
    );
}

#[test]
fn test_lethal_collision_despawns_within_one_frame() {
    init_tracing();
    let mut sim = Simulation::new();
    sim.register_system(Box::new(Movement)).unwrap();
    sim.register_system(Box::new(BroadPhase::default())).unwrap();
    sim.register_system(Box::new(HealthSweep)).unwrap();

    let actor = spawn_circle(&mut sim, 0.0, 0.0, 10.0, Layer::Actor);
    sim.world_mut().insert(actor, Health::full(3.0));
    spawn_circle(&mut sim, 15.0, 0.0, 10.0, Layer::Hazard);

    let pair = LayerPair::new(Layer::Actor, Layer::Hazard);
    sim.events()
        .subscribe(EventKind::Collision(pair), 0, |world, _, event| {
            let EventData::Collision(contact) = event.data else {
                return Ok(());
            };
            let target = if contact.layer_a == Layer::Actor {
                contact.a
            } else {
                contact.b
            };
            if let Some(health) = world.get_as_mut::<Health>(target) {
                health.current -= 5.0;
            }
            Ok(())
        });

    let deaths: Rc<RefCell<Vec<Entity>>> = Rc::default();
    {
        let deaths = Rc::clone(&deaths);
        sim.events().subscribe(EventKind::Death, 0, move |_, _, event| {
            if let EventData::Death { entity } = event.data {
                deaths.borrow_mut().push(entity);
            }
            Ok(())
        });
    }

    sim.start();
    // PHYSICS damages, GAMEPLAY sweeps: one frame is enough.
    sim.tick(16.0);

    assert_eq!(*deaths.borrow(), vec![actor]);
    assert!(!sim.world().is_alive(actor));
}

#[test]
fn test_despawn_during_query_walk_leaves_stale_ids_inert() {
    init_tracing();
    let mut sim = Simulation::new();

    struct Reaper;
    impl System for Reaper {
        fn name(&self) -> &'static str {
            "reaper"
        }

        fn priority(&self) -> i32 {
            phase::GAMEPLAY
        }

        fn update(&mut self, ctx: &mut SystemContext<'_>, _dt_ms: f32) -> eyre::Result<()> {
            // Despawn every other entity while still walking the results;
            // the rest of the walk must see the stale ids as absent.
            let mut seen_alive = 0usize;
            for (i, entity) in ctx
                .world
                .query()
                .with(ComponentKind::Position)
                .run()
                .into_iter()
                .enumerate()
            {
                if i % 2 == 0 {
                    ctx.world.despawn(entity);
                } else if ctx.world.get_as::<Position>(entity).is_some() {
                    seen_alive += 1;
                }
            }
            if seen_alive != 5 {
                eyre::bail!("expected 5 survivors mid-walk, saw {seen_alive}");
            }
            Ok(())
        }
    }

    for i in 0..10 {
        let world = sim.world_mut();
        let entity = world.spawn();
        world.insert(entity, Position::new(i as f32, 0.0));
    }

    sim.register_system(Box::new(Reaper)).unwrap();
    sim.start();
    sim.tick(16.0);

    assert_eq!(sim.metrics().system_faults, 0);
    assert_eq!(sim.world().len(), 5);
}

#[test]
fn test_frame_collision_count_matches_brute_force() {
    init_tracing();
    let mut rng = StdRng::seed_from_u64(0x57A7_1C);
    let mut sim = Simulation::new();
    sim.register_system(Box::new(BroadPhase::default())).unwrap();

    let mut circles = Vec::new();
    for _ in 0..50 {
        let x = rng.gen_range(0.0..400.0);
        let y = rng.gen_range(0.0..400.0);
        let radius = rng.gen_range(5.0..15.0);
        spawn_circle(&mut sim, x, y, radius, Layer::Actor);
        circles.push((x, y, radius));
    }

    let mut expected = 0usize;
    for i in 0..circles.len() {
        for j in (i + 1)..circles.len() {
            let (ax, ay, ar) = circles[i];
            let (bx, by, br) = circles[j];
            if (bx - ax).hypot(by - ay) < ar + br {
                expected += 1;
            }
        }
    }

    sim.start();
    sim.tick(16.0);

    let emitted = sim
        .events()
        .history()
        .iter()
        .filter(|event| matches!(event.data, EventData::Collision(_)))
        .count();
    assert_eq!(emitted, expected);
    assert_eq!(sim.metrics().pairs_overlapping as usize, expected);
}
