//! Performance benchmarks for the simulation and the relay bookkeeping

use client::simulation::{reduce, GameAction, Simulation};
use rand::rngs::StdRng;
use rand::SeedableRng;
use relay::registry::RoomRegistry;
use relay::router::Router;
use shared::framing::{decode_packet, encode_frame};
use shared::{Direction, GameState, GameStatus, InputAction, Packet, Player};
use std::time::Instant;

fn four_player_simulation() -> Simulation<StdRng> {
    let mut sim = Simulation::with_rng(StdRng::seed_from_u64(1));
    sim.sync_roster((0..4).map(|seat| Player::new(format!("p{seat}"), seat)).collect());
    sim.start();
    sim
}

/// Benchmarks full simulation ticks with every paddle moving
#[test]
fn benchmark_simulation_ticks() {
    let mut sim = four_player_simulation();
    sim.set_input("p0", Direction::Up, InputAction::Press);
    sim.set_input("p1", Direction::Down, InputAction::Press);
    sim.set_input("p2", Direction::Left, InputAction::Press);
    sim.set_input("p3", Direction::Right, InputAction::Press);

    let iterations = 100_000;
    let start = Instant::now();

    let mut advanced = 0;
    for _ in 0..iterations {
        if sim.step() {
            advanced += 1;
        }
    }

    let duration = start.elapsed();
    println!(
        "Simulation: {} ticks ({} advanced) in {:?} ({:.2} ns/tick)",
        iterations,
        advanced,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    assert!(advanced > 0);
    // A 60 Hz host needs far less than this
    assert!(duration.as_millis() < 5000);
}

/// Benchmarks the ball update alone
#[test]
fn benchmark_ball_update() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut state = GameState::new();
    for seat in 0..4 {
        state.add_player(&Player::new(format!("p{seat}"), seat));
    }
    reduce(&mut state, GameAction::StartGame, &mut rng);
    assert_eq!(state.status, GameStatus::Playing);

    let iterations = 200_000;
    let start = Instant::now();

    for _ in 0..iterations {
        reduce(&mut state, GameAction::UpdateGame, &mut rng);
        if client::simulation::exit_side(&state).is_some() {
            reduce(&mut state, GameAction::ResetRound, &mut rng);
        }
    }

    let duration = start.elapsed();
    println!(
        "Ball update: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    assert!(duration.as_millis() < 5000);
}

/// Benchmarks room creation and filling
#[test]
fn benchmark_registry_create_and_join() {
    let mut registry = RoomRegistry::with_rng(StdRng::seed_from_u64(3));

    let rooms = 2_000;
    let start = Instant::now();

    let mut connection = 0;
    for i in 0..rooms {
        connection += 1;
        let code = registry
            .create_room(connection, format!("host_{i}"))
            .unwrap();
        for p in 0..4 {
            connection += 1;
            registry
                .join_room(&code, &format!("p{i}_{p}"), connection)
                .unwrap();
        }
    }

    let duration = start.elapsed();
    println!(
        "Registry: {} rooms with 4 players each in {:?}",
        rooms, duration
    );

    assert_eq!(registry.len(), rooms);
    assert!(duration.as_millis() < 5000);
}

/// Benchmarks input forwarding through the router
#[test]
fn benchmark_input_routing() {
    let mut router = Router::with_registry(RoomRegistry::with_rng(StdRng::seed_from_u64(4)));
    let code = match &router.handle_packet(
        1,
        Packet::CreateRoom {
            host_id: "host".into(),
        },
    )[..]
    {
        [delivery] => match &delivery.packet {
            Packet::RoomCreated { code } => code.to_string(),
            other => panic!("unexpected {other:?}"),
        },
        other => panic!("unexpected {other:?}"),
    };

    let iterations = 100_000;
    let start = Instant::now();

    for i in 0..iterations {
        let deliveries = router.handle_packet(
            2,
            Packet::Input {
                room_code: code.clone(),
                player_id: "p".into(),
                direction: Direction::Up,
                action: if i % 2 == 0 {
                    InputAction::Press
                } else {
                    InputAction::Release
                },
            },
        );
        assert_eq!(deliveries.len(), 1);
    }

    let duration = start.elapsed();
    println!(
        "Input routing: {} packets in {:?} ({:.2} ns/packet)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    assert!(duration.as_millis() < 5000);
}

/// Benchmarks framing a four player snapshot
#[test]
fn benchmark_snapshot_framing() {
    let sim = four_player_simulation();
    let packet = Packet::GameStateUpdate {
        room_code: "1234".into(),
        tick: 42,
        game_state: sim.state().clone(),
    };

    let payload_len = bincode::serialized_size(&packet).unwrap() as usize;

    let iterations = 20_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let frame = encode_frame(&packet).unwrap();
        assert_eq!(frame.len(), 4 + payload_len);
        let decoded = decode_packet(&frame[4..]).unwrap();
        assert!(matches!(decoded, Packet::GameStateUpdate { tick: 42, .. }));
    }

    let duration = start.elapsed();
    println!(
        "Snapshot framing: {} round trips in {:?}",
        iterations, duration
    );

    assert!(duration.as_millis() < 5000);
}
