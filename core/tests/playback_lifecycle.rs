//! Clock, termination and clamping behaviour of a full play cycle.

use taxi_playback_core::{
    clock::PlaybackPhase,
    config::PlaybackConfig,
    controller::PlaybackController,
    event::PlaybackEvent,
    result::{PathEntity, Position, SimulationResult},
    scheduler::ManualScheduler,
};
use std::time::Duration;

fn straight_path(len: usize, row: f64) -> Vec<Position> {
    (0..len).map(|i| Position::new(row, i as f64)).collect()
}

fn two_taxi_result() -> SimulationResult {
    SimulationResult::new(vec![
        PathEntity::new(1, straight_path(3, 0.0)),
        PathEntity::new(2, straight_path(5, 1.0)),
    ])
}

fn loaded(result: SimulationResult) -> PlaybackController<ManualScheduler> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut controller = PlaybackController::manual(PlaybackConfig::default());
    controller.load(result).expect("load");
    controller
}

#[test]
fn max_tick_is_longest_path_minus_one() {
    let controller = loaded(two_taxi_result());
    assert_eq!(controller.max_tick(), Some(4));
    assert_eq!(controller.current_tick(), 0);
    assert!(!controller.is_playing());
}

#[test]
fn unequal_paths_clamp_and_finish_on_the_longest() {
    let mut controller = loaded(two_taxi_result());
    controller.start().unwrap();
    assert_eq!(controller.phase(), PlaybackPhase::Playing);

    controller.advance_ticks(2);
    let frame = controller.current_frame().unwrap();
    assert_eq!(frame.tick, 2);
    assert_eq!(frame.position_of(1), Some(Position::new(0.0, 2.0)));
    assert_eq!(frame.position_of(2), Some(Position::new(1.0, 2.0)));
    assert!(frame.entities[0].exhausted);
    assert!(!frame.entities[1].exhausted);
    assert!(controller.is_playing());

    let events = controller.advance_ticks(2);
    assert_eq!(
        events,
        vec![
            PlaybackEvent::TickAdvanced { tick: 3 },
            PlaybackEvent::TickAdvanced { tick: 4 },
            PlaybackEvent::PlaybackFinished { tick: 4 },
        ]
    );
    let frame = controller.current_frame().unwrap();
    assert_eq!(frame.position_of(1), Some(Position::new(0.0, 2.0)));
    assert_eq!(frame.position_of(2), Some(Position::new(1.0, 4.0)));
    assert_eq!(controller.phase(), PlaybackPhase::Idle);
    assert!(controller.scheduler().armed_cycles().is_empty());
}

#[test]
fn full_cycle_shows_max_tick_plus_one_frames() {
    let mut controller = loaded(two_taxi_result());
    let frames = controller.replay_all().unwrap();

    assert_eq!(frames.len(), 5);
    let ticks: Vec<_> = frames.iter().map(|f| f.tick).collect();
    assert_eq!(ticks, vec![0, 1, 2, 3, 4]);
    assert!(!controller.is_playing());

    // Nothing further happens however long the clock keeps running.
    assert!(controller.advance_time(Duration::from_secs(60)).is_empty());
    assert_eq!(controller.current_tick(), 4);
}

#[test]
fn clamped_position_holds_for_every_tick_past_the_end() {
    let mut controller = loaded(two_taxi_result());
    for frame in controller.replay_all().unwrap() {
        let expected = Position::new(0.0, frame.tick.min(2) as f64);
        assert_eq!(frame.position_of(1), Some(expected), "tick {}", frame.tick);
    }
}

#[test]
fn ticks_wait_for_the_configured_interval() {
    let config = PlaybackConfig { tick_interval_ms: 250, ..PlaybackConfig::default() };
    let mut controller = PlaybackController::manual(config);
    controller.load(two_taxi_result()).unwrap();
    controller.start().unwrap();

    assert!(controller.advance_time(Duration::from_millis(249)).is_empty());
    assert_eq!(controller.current_tick(), 0);
    controller.advance_time(Duration::from_millis(1));
    assert_eq!(controller.current_tick(), 1);
}

#[test]
fn start_then_immediate_stop_keeps_first_frame() {
    let path = vec![
        Position::new(0.0, 0.0),
        Position::new(0.0, 1.0),
        Position::new(1.0, 1.0),
    ];
    let mut controller = loaded(SimulationResult::single(PathEntity::new(1, path)));

    controller.start().unwrap();
    let events = controller.stop();
    assert_eq!(events, vec![PlaybackEvent::PlaybackStopped { tick: 0 }]);

    controller.advance_time(Duration::from_secs(10));
    assert_eq!(controller.current_tick(), 0);
    assert_eq!(
        controller.current_frame().unwrap().position_of(1),
        Some(Position::new(0.0, 0.0))
    );
}

#[test]
fn stop_is_idempotent_and_keeps_the_tick() {
    let mut controller = loaded(two_taxi_result());
    controller.start().unwrap();
    controller.advance_ticks(3);

    assert_eq!(controller.stop().len(), 1);
    assert!(controller.stop().is_empty());
    assert_eq!(controller.current_tick(), 3);
    assert_eq!(controller.phase(), PlaybackPhase::Idle);
}

#[test]
fn double_start_keeps_a_single_timer() {
    let mut controller = loaded(two_taxi_result());
    let first = controller.start().unwrap();
    assert_eq!(first.len(), 1);
    controller.advance_ticks(1);

    assert!(controller.start().unwrap().is_empty());
    assert_eq!(controller.scheduler().armed_cycles().len(), 1);
    // The second start did not rewind the running cycle.
    assert_eq!(controller.current_tick(), 1);

    controller.advance_ticks(1);
    assert_eq!(controller.current_tick(), 2);
}

#[test]
fn restart_after_finish_rewinds_with_a_new_cycle() {
    let mut controller = loaded(two_taxi_result());
    controller.start().unwrap();
    let first_cycle = controller.active_cycle().unwrap();
    controller.advance_ticks(4);
    assert!(!controller.is_playing());
    assert_eq!(controller.current_tick(), 4);

    controller.start().unwrap();
    let second_cycle = controller.active_cycle().unwrap();
    assert_ne!(first_cycle, second_cycle);
    assert_eq!(controller.current_tick(), 0);
    assert_eq!(controller.scheduler().armed_cycles(), vec![second_cycle]);
}

#[test]
fn single_position_paths_finish_without_ticking() {
    let result = SimulationResult::new(vec![
        PathEntity::new(1, straight_path(1, 0.0)),
        PathEntity::new(2, straight_path(1, 3.0)),
    ]);
    let mut controller = loaded(result);

    let events = controller.start().unwrap();
    assert!(matches!(events[0], PlaybackEvent::PlaybackStarted { max_tick: 0, .. }));
    assert_eq!(events[1], PlaybackEvent::PlaybackFinished { tick: 0 });
    assert!(!controller.is_playing());
    assert!(controller.scheduler().armed_cycles().is_empty());
    assert_eq!(
        controller.current_frame().unwrap().position_of(2),
        Some(Position::new(3.0, 0.0))
    );
}
