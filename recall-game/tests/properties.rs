use std::hash::Hasher;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use recall_game::{
    Difficulty, GameConfig, InputEvent, Notification, NotificationLog, Phase,
    ProgressionController, Symbol,
};
use twox_hash::XxHash64;

type Ctrl = ProgressionController<NotificationLog>;

/// Plays a session with a seeded, occasionally wrong, occasionally
/// hint-happy player until game over or `max_events` inputs.
fn fuzz_session(seed: u64, difficulty: Difficulty, max_events: usize) -> Ctrl {
    let cfg = GameConfig::default().with_difficulty(difficulty);
    let mut ctrl = ProgressionController::new(cfg, seed, NotificationLog::new()).unwrap();
    let mut player = SmallRng::seed_from_u64(seed ^ 0xA5A5);
    ctrl.start();
    for _ in 0..max_events {
        ctrl.advance(player.gen_range(0..700));
        let phase_before = ctrl.session().phase();
        let lives_before = ctrl.session().lives();
        let score_before = ctrl.session().score();
        let level_before = ctrl.session().level();
        let sequence_before = ctrl.session().sequence().clone();

        let event = match player.gen_range(0..20) {
            0 => InputEvent::HintRequested,
            1 => InputEvent::RepeatPlaybackRequested,
            2 => InputEvent::SymbolSubmitted(Symbol::Orange),
            _ => {
                let next = ctrl
                    .session()
                    .sequence()
                    .get(ctrl.session().player_input().len())
                    .unwrap_or(Symbol::Red);
                InputEvent::SymbolSubmitted(next)
            }
        };
        let applied = ctrl.handle(event).applied();
        let session = ctrl.session();

        assert!(session.lives() <= lives_before);
        assert!(session.lives() >= lives_before.saturating_sub(1));
        assert!(session.level() >= level_before);
        assert!(session.player_input().is_prefix_of(session.sequence()));
        if phase_before == Phase::AwaitingInput && session.phase() == Phase::AwaitingInput {
            assert_eq!(session.sequence(), &sequence_before);
        }
        if !phase_before.accepts_input() && matches!(event, InputEvent::SymbolSubmitted(_)) {
            assert!(!applied);
            assert_eq!(session.score(), score_before);
        }
        if session.lives() == 0 {
            assert_eq!(session.phase(), Phase::GameOver);
            break;
        }
    }
    ctrl
}

#[test]
fn invariants_hold_across_seeds() {
    for seed in 0..40_u64 {
        for difficulty in Difficulty::ALL {
            let ctrl = fuzz_session(seed, difficulty, 400);
            let session = ctrl.session();
            let alphabet = &ctrl.config().tier(difficulty).symbols;
            assert!(
                session
                    .sequence()
                    .as_slice()
                    .iter()
                    .all(|symbol| alphabet.contains(symbol))
            );
            let expected_len = ctrl.config().lengths().for_level(session.level());
            if !session.sequence().is_empty() {
                assert_eq!(session.sequence().len(), expected_len);
            }
            assert!(session.sequence().len() <= ctrl.config().max_sequence_length);
        }
    }
}

#[test]
fn every_reveal_is_followed_by_unreveal() {
    for seed in 0..10_u64 {
        let ctrl = fuzz_session(seed, Difficulty::Medium, 200);
        let mut open = false;
        for event in ctrl.sink().events() {
            match event {
                Notification::Reveal { .. } => {
                    assert!(!open, "two symbols lit at once (seed {seed})");
                    open = true;
                }
                Notification::UnrevealAll => open = false,
                _ => {}
            }
        }
    }
}

#[test]
fn phase_notifications_never_repeat() {
    let ctrl = fuzz_session(7, Difficulty::Easy, 300);
    let phases = ctrl.sink().phases();
    for pair in phases.windows(2) {
        assert_ne!(pair[0], pair[1]);
    }
}

fn digest(ctrl: &Ctrl) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    let json = serde_json::to_string(ctrl.sink().events()).unwrap();
    hasher.write(json.as_bytes());
    hasher.finish()
}

#[test]
fn equal_seeds_replay_identically() {
    for seed in [1_u64, 0xC0FFEE, u64::MAX] {
        let a = fuzz_session(seed, Difficulty::Hard, 300);
        let b = fuzz_session(seed, Difficulty::Hard, 300);
        assert_eq!(digest(&a), digest(&b));
        assert_eq!(a.session(), b.session());
    }
}

#[test]
fn different_seeds_generate_different_sequences() {
    let sequences: Vec<Vec<Symbol>> = (0..8_u64)
        .map(|seed| {
            let mut ctrl = ProgressionController::new(
                GameConfig::default().with_difficulty(Difficulty::Hard),
                seed,
                (),
            )
            .unwrap();
            ctrl.start();
            ctrl.session().sequence().as_slice().to_vec()
        })
        .collect();
    let distinct = sequences
        .iter()
        .enumerate()
        .filter(|(i, seq)| !sequences[..*i].contains(seq))
        .count();
    assert!(distinct > 1);
}

#[test]
fn level_never_exceeds_length_cap() {
    let cfg = GameConfig {
        level_up_every_n_rounds: 1,
        ..GameConfig::default()
    };
    let mut ctrl = ProgressionController::new(cfg, 5, ()).unwrap();
    ctrl.start();
    for _ in 0..15 {
        ctrl.run_until_idle(512);
        for symbol in ctrl.session().sequence().as_slice().to_vec() {
            ctrl.submit(symbol);
        }
        assert_eq!(ctrl.session().phase(), Phase::RoundComplete);
    }
    ctrl.run_until_idle(512);
    assert!(ctrl.session().level() >= 15);
    assert_eq!(ctrl.session().sequence().len(), 12);
    assert_eq!(ctrl.session().highest_level(), ctrl.session().level());
}
