use mobreducer::{
    classify::EntityKind,
    clock::ManualClock,
    config::MobConfig,
    keys::BlockPos,
    listener::{EntityListener, SpawnDecision},
    sim::SimWorld,
};

fn listener(clock: &ManualClock) -> EntityListener<SimWorld> {
    let mut config = MobConfig::default();
    config.monster.idle_age = 5;
    config.monster.player_chunk_radius = 1;
    EntityListener::new(config, Box::new(clock.clone())).expect("valid config")
}

/// A zombie spawned in chunk (w,0,0) at t=0, with one sweep at t=4000.
fn idle_zombie_setup(player: Option<BlockPos>) -> (ManualClock, EntityListener<SimWorld>, SimWorld) {
    let clock = ManualClock::new(0);
    let mut listener = listener(&clock);
    let mut world = SimWorld::new();
    world.add_world("w", None);
    if let Some(at) = player {
        world.add_player("w", "alex", at);
    }
    let zombie = world.spawn_mob("w", EntityKind::Zombie, BlockPos::new(3, 64, 7));
    let view = world.view(zombie).unwrap();
    assert_eq!(listener.on_creature_spawn(&mut world, &view), SpawnDecision::Allowed);
    listener.on_spawned(&mut world, &view);

    clock.set(4_000);
    let stats = listener.sweep(&mut world);
    assert_eq!(stats.purged, 0);
    assert_eq!(stats.examined, 1);
    assert_eq!(world.mob_count(), 1);
    (clock, listener, world)
}

#[test]
fn idle_monster_is_purged_after_idle_age() {
    let (clock, mut listener, mut world) = idle_zombie_setup(None);

    clock.set(6_000);
    let stats = listener.sweep(&mut world);
    assert_eq!(stats.purged, 1);
    assert_eq!(world.mob_count(), 0);
    assert_eq!(listener.manager().tracked_entities(), 0);
}

#[test]
fn player_in_adjacent_chunk_keeps_idle_monster() {
    // block (16,16) is chunk (1,1)
    let (clock, mut listener, mut world) = idle_zombie_setup(Some(BlockPos::new(16, 64, 16)));

    clock.set(6_000);
    let stats = listener.sweep(&mut world);
    assert_eq!(stats.purged, 0);
    assert_eq!(stats.refreshed, 1);
    assert_eq!(world.mob_count(), 1);
}

#[test]
fn sweep_reports_and_resets_spawn_counter() {
    let (clock, mut listener, mut world) = idle_zombie_setup(None);
    assert_eq!(listener.manager().spawn_counter(), 0);

    for (kind, x) in [(EntityKind::Cow, 0), (EntityKind::Pig, 4)] {
        let mob = world.spawn_mob("w", kind, BlockPos::new(x, 64, 0));
        let view = world.view(mob).unwrap();
        assert_eq!(listener.on_creature_spawn(&mut world, &view), SpawnDecision::Allowed);
        listener.on_spawned(&mut world, &view);
    }

    clock.set(5_000);
    let stats = listener.sweep(&mut world);
    assert_eq!(stats.spawned_since_last, 2);
    assert_eq!(listener.manager().spawn_counter(), 0);
}

#[test]
fn sweep_drops_records_of_dead_entities() {
    let clock = ManualClock::new(0);
    let mut listener = listener(&clock);
    let mut world = SimWorld::new();
    world.add_world("w", None);
    let cow = world.spawn_mob("w", EntityKind::Cow, BlockPos::new(0, 64, 0));
    let view = world.view(cow).unwrap();
    listener.on_creature_spawn(&mut world, &view);
    assert_eq!(listener.manager().tracked_entities(), 1);

    world.kill(cow);
    let stats = listener.sweep(&mut world);
    assert_eq!(stats.invalid, 1);
    assert_eq!(listener.manager().tracked_entities(), 0);
}

#[test]
fn sweep_follows_moved_entities() {
    let clock = ManualClock::new(0);
    let mut listener = listener(&clock);
    let mut world = SimWorld::new();
    world.add_world("w", None);
    world.add_player("w", "alex", BlockPos::new(0, 64, 0));
    let pig = world.spawn_mob("w", EntityKind::Pig, BlockPos::new(0, 64, 0));
    let view = world.view(pig).unwrap();
    listener.on_creature_spawn(&mut world, &view);

    world.mob_mut(pig).unwrap().block = BlockPos::new(40, 64, -20);
    listener.sweep(&mut world);

    let record = listener.manager().record(view.id).unwrap();
    assert_eq!(record.current_chunk().to_string(), "w,2,-2");
    assert_eq!(record.spawn_chunk().to_string(), "w,0,0");
}

#[test]
fn sweep_covers_every_world_and_skips_unloaded_chunks() {
    let clock = ManualClock::new(0);
    let mut listener = listener(&clock);
    let mut world = SimWorld::new();
    world.add_world("overworld", Some(2));
    world.add_world("nether", None);
    world.add_player("overworld", "alex", BlockPos::new(0, 64, 0));
    world.spawn_mob("overworld", EntityKind::Zombie, BlockPos::new(40, 64, 0));
    world.spawn_mob("overworld", EntityKind::Zombie, BlockPos::new(400, 64, 0));
    world.spawn_mob("nether", EntityKind::Ghast, BlockPos::new(0, 90, 0));

    clock.set(1_000);
    listener.sweep(&mut world);
    clock.set(10_000);
    let stats = listener.sweep(&mut world);

    // the far zombie is unloaded and never seen
    assert_eq!(stats.examined, 2);
    assert_eq!(stats.purged, 2);
    assert_eq!(world.mob_count(), 1);
}
