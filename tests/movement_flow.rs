//! Headless runs of the full simulation, one `FixedUpdate` per game tick.

use bevy::prelude::*;
use glam::{IVec2, IVec3};

use movement_sync_server::SimulationPlugins;
use movement_sync_server::ecs::core::*;
use movement_sync_server::ecs::plugins::ai::Desire;
use movement_sync_server::ecs::plugins::geodata::GridGeodata;
use movement_sync_server::ecs::plugins::input::{InputCommand, InputCommandEvent};
use movement_sync_server::ecs::plugins::movement::{AiEvent, AiNotification, MoveRequestEvent, Movement};
use movement_sync_server::ecs::plugins::network::{NetworkUpdates, ServerPacket};
use movement_sync_server::ecs::plugins::player::{Player, PlayerSpawnEvent};
use movement_sync_server::ecs::plugins::scheduler::GameTimeController;

#[derive(Resource, Default)]
struct Notifications(Vec<(u64, AiNotification)>);

fn collect_notifications(
    mut reader: EventReader<AiNotification>,
    clock: Res<GameTimeController>,
    mut seen: ResMut<Notifications>,
) {
    let tick = clock.game_ticks();
    seen.0.extend(reader.read().map(|notification| (tick, *notification)));
}

fn test_config() -> GameConfig {
    let mut config = GameConfig::default();
    config.world.origin = IVec2::ZERO;
    config.world.spawn_min = IVec2::ZERO;
    config.world.spawn_max = IVec2::ZERO;
    config.player.speed = 100.0;
    config.player.collision_radius = 0.0;
    config
}

/// A wall along x = 160..176 from y = -400 to y = 400.
fn walled_config() -> GameConfig {
    let mut config = test_config();
    config.geodata.obstacles.push(RectConfig {
        min: IVec2::new(160, -400),
        max: IVec2::new(175, 400),
    });
    config
}

fn build_app(config: GameConfig) -> App {
    let mut app = App::new();
    app.add_plugins(SimulationPlugins::new(config))
        .init_resource::<Notifications>()
        .add_systems(FixedUpdate, collect_notifications.in_set(SimulationSet::Network));
    app.world_mut().run_schedule(Startup);
    app
}

fn run_ticks(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        app.world_mut().run_schedule(FixedUpdate);
    }
}

fn run_until_stopped(app: &mut App, entity: Entity, max_ticks: usize) -> usize {
    for tick in 1..=max_ticks {
        run_ticks(app, 1);
        if !is_moving(app, entity) {
            return tick;
        }
    }
    panic!("still moving after {max_ticks} ticks");
}

fn spawn_actor(app: &mut App, id: u32, kind: ActorKind, position: IVec3) -> Entity {
    let stats = MoveStats {
        speed: 100.0,
        collision_radius: 0.0,
        can_fly: false,
    };
    let entity = app
        .world_mut()
        .spawn(ActorBundle::new(Actor::new(ActorId(id), kind, position, stats)))
        .id();
    app.world_mut().resource_mut::<ActorRegistry>().register_actor(ActorId(id), entity);
    entity
}

fn spawn_player(app: &mut App, id: u32, position: IVec3) -> Entity {
    let entity = spawn_actor(app, id, ActorKind::Player, position);
    app.world_mut().entity_mut(entity).insert(Player {
        id: ActorId(id),
        view_distance: 3000.0,
    });
    entity
}

fn position(app: &App, entity: Entity) -> IVec3 {
    app.world().get::<Actor>(entity).unwrap().position
}

fn is_moving(app: &App, entity: Entity) -> bool {
    app.world().get::<Movement>(entity).unwrap().is_moving()
}

fn request_move(app: &mut App, id: u32, target: IVec3, offset: i32) {
    app.world_mut().send_event(MoveRequestEvent {
        actor: ActorId(id),
        target,
        offset,
    });
}

fn notifications_for(app: &App, id: u32) -> Vec<(u64, AiEvent)> {
    app.world()
        .resource::<Notifications>()
        .0
        .iter()
        .filter(|(_, notification)| notification.actor == ActorId(id))
        .map(|(tick, notification)| (*tick, notification.event))
        .collect()
}

fn packets_for(app: &App, id: u32) -> Vec<ServerPacket> {
    app.world().resource::<NetworkUpdates>().messages_for(ActorId(id)).to_vec()
}

#[test]
fn straight_move_takes_ten_seconds() {
    let mut app = build_app(test_config());
    let walker = spawn_player(&mut app, 1, IVec3::ZERO);

    request_move(&mut app, 1, IVec3::new(1000, 0, 0), 0);
    // The move is issued in tick 1 and covers ground from tick 2 on.
    run_ticks(&mut app, 51);
    let halfway = position(&app, walker);
    assert!((halfway.x - 500).abs() <= 1, "at {halfway:?}");
    assert_eq!(halfway.y, 0);

    let ticks = run_until_stopped(&mut app, walker, 100);
    assert_eq!(position(&app, walker), IVec3::new(1000, 0, 0));
    assert!(51 + ticks <= 1 + 102, "arrived after {} ticks", 51 + ticks);
    assert!(!app.world().resource::<GameTimeController>().is_registered(ActorId(1)));

    let events = notifications_for(&app, 1);
    // Progress check two seconds in, then the arrival.
    assert_eq!(events.first(), Some(&(21, AiEvent::ArrivedRevalidate)));
    assert_eq!(events.last().map(|(_, event)| *event), Some(AiEvent::Arrived));
}

#[test]
fn blocked_straight_line_is_walked_around() {
    let config = walled_config();
    let grid = GridGeodata::from_config(&config.world, &config.geodata);
    let mut app = build_app(config);
    let walker = spawn_player(&mut app, 1, IVec3::ZERO);
    let target = IVec3::new(400, 0, 0);

    request_move(&mut app, 1, target, 0);
    run_ticks(&mut app, 1);
    let record = app.world().get::<Movement>(walker).unwrap().record().cloned().unwrap();
    assert!(record.is_path_following());
    assert_eq!(record.path_index, 0);
    assert_eq!(record.destination, record.path.as_ref().unwrap()[0]);

    let mut visited = Vec::new();
    for _ in 0..300 {
        run_ticks(&mut app, 1);
        visited.push(position(&app, walker));
        if !is_moving(&app, walker) {
            break;
        }
    }
    assert_eq!(position(&app, walker), target);
    assert!(visited.iter().all(|p| grid.is_walkable(p.x, p.y)), "walked through the wall");

    // Every new leg is announced to the walker itself.
    let legs = packets_for(&app, 1)
        .iter()
        .filter(|packet| matches!(packet, ServerPacket::MoveToLocation { .. }))
        .count();
    assert!(legs >= 3, "only {legs} move packets");
}

#[test]
fn long_player_move_halts_at_an_obstacle() {
    let mut app = build_app(walled_config());
    let walker = spawn_player(&mut app, 1, IVec3::ZERO);
    app.world_mut().entity_mut(walker).insert(Desire::MoveTo);

    // Far clicks are trusted without validation; the per-tick probe catches the wall.
    request_move(&mut app, 1, IVec3::new(5000, 0, 0), 0);
    run_until_stopped(&mut app, walker, 100);

    let stopped_at = position(&app, walker);
    assert!(stopped_at.x >= 100 && stopped_at.x < 160, "stopped at {stopped_at:?}");
    assert!(notifications_for(&app, 1).iter().any(|(_, event)| *event == AiEvent::Stopped));
    assert_eq!(*app.world().get::<Desire>(walker).unwrap(), Desire::Idle);
    assert!(packets_for(&app, 1).iter().any(|packet| matches!(
        packet,
        ServerPacket::StopMove { position, .. } if *position == stopped_at
    )));
}

#[test]
fn superseded_move_drops_its_progress_check() {
    let mut app = build_app(test_config());
    let walker = spawn_actor(&mut app, 10_000, ActorKind::Npc, IVec3::ZERO);

    request_move(&mut app, 10_000, IVec3::new(1000, 0, 0), 0);
    run_ticks(&mut app, 5);
    request_move(&mut app, 10_000, IVec3::new(0, 1000, 0), 0);
    run_ticks(&mut app, 25);

    let checks: Vec<u64> = notifications_for(&app, 10_000)
        .into_iter()
        .filter(|(_, event)| *event == AiEvent::ArrivedRevalidate)
        .map(|(tick, _)| tick)
        .collect();
    // Armed at tick 6 for tick 26; the one from tick 1 went stale.
    assert_eq!(checks, vec![26]);
    assert!(is_moving(&app, walker));
}

#[test]
fn observers_in_view_hear_about_moves_and_stops() {
    let mut app = build_app(test_config());
    app.world_mut().send_event(PlayerSpawnEvent { player_id: ActorId(1) });
    run_ticks(&mut app, 1);
    spawn_player(&mut app, 2, IVec3::new(500, 0, 0));
    spawn_player(&mut app, 3, IVec3::new(10_000, 0, 0));

    app.world_mut().send_event(InputCommandEvent {
        player_id: ActorId(1),
        command: InputCommand::move_to(IVec3::new(300, 0, 0)),
    });
    run_ticks(&mut app, 5);
    app.world_mut().send_event(InputCommandEvent {
        player_id: ActorId(1),
        command: InputCommand::Stop,
    });
    run_ticks(&mut app, 1);

    let mover = app.world().resource::<ActorRegistry>().get_entity(ActorId(1)).unwrap();
    assert!(!is_moving(&app, mover));
    let stopped_at = position(&app, mover);
    let started = ServerPacket::MoveToLocation {
        actor: ActorId(1),
        origin: IVec3::ZERO,
        destination: IVec3::new(300, 0, 0),
    };
    let stopped = ServerPacket::StopMove {
        actor: ActorId(1),
        position: stopped_at,
        heading: 0,
    };

    assert!(packets_for(&app, 1).contains(&started));
    assert!(!packets_for(&app, 1).contains(&stopped));
    assert!(packets_for(&app, 2).contains(&started));
    assert!(packets_for(&app, 2).contains(&stopped));
    assert!(packets_for(&app, 3).is_empty());
}

#[test]
fn attack_approach_stops_inside_melee_range() {
    let mut app = build_app(test_config());
    let attacker = spawn_player(&mut app, 1, IVec3::ZERO);
    spawn_actor(&mut app, 10_000, ActorKind::Monster, IVec3::new(500, 0, 0));

    app.world_mut().send_event(InputCommandEvent {
        player_id: ActorId(1),
        command: InputCommand::Attack { target: ActorId(10_000) },
    });
    run_ticks(&mut app, 1);
    run_until_stopped(&mut app, attacker, 100);

    let gap = 500 - position(&app, attacker).x;
    assert!((30..=40).contains(&gap), "stopped {gap} units short");
    assert_eq!(
        *app.world().get::<Desire>(attacker).unwrap(),
        Desire::Attack { target: ActorId(10_000) }
    );
}

#[test]
fn refused_player_moves_are_reported_to_the_client() {
    let mut config = test_config();
    // A closed box around (400, 0): no path leads inside.
    for (min, max) in [
        (IVec2::new(320, -80), IVec2::new(335, 80)),
        (IVec2::new(464, -80), IVec2::new(479, 80)),
        (IVec2::new(320, -80), IVec2::new(479, -65)),
        (IVec2::new(320, 64), IVec2::new(479, 79)),
    ] {
        config.geodata.obstacles.push(RectConfig { min, max });
    }
    let mut app = build_app(config);
    let walker = spawn_player(&mut app, 1, IVec3::ZERO);

    request_move(&mut app, 1, IVec3::new(400, 0, 0), 0);
    run_ticks(&mut app, 1);

    assert!(!is_moving(&app, walker));
    assert!(packets_for(&app, 1).iter().any(|packet| matches!(packet, ServerPacket::ActionFailed { .. })));
}

#[test]
fn configured_npcs_wander_near_home() {
    let mut config = test_config();
    config.npcs.push(NpcSpawnConfig {
        kind: ActorKind::Npc,
        position: IVec3::new(1000, 1000, 0),
        speed: 80.0,
        collision_radius: 0.0,
        can_fly: false,
        wander_radius: 200,
    });
    let mut app = build_app(config);
    let npc = app.world().resource::<ActorRegistry>().get_entity(ActorId(FIRST_NPC_ID)).unwrap();

    run_ticks(&mut app, 1);
    assert!(is_moving(&app, npc));
    let destination = app.world().get::<Movement>(npc).unwrap().destination_or(IVec3::ZERO);
    let offset = destination - IVec3::new(1000, 1000, 0);
    assert!(offset.x.abs() <= 200 && offset.y.abs() <= 200, "wandered to {destination:?}");
    assert_eq!(*app.world().get::<Desire>(npc).unwrap(), Desire::MoveTo);
}
