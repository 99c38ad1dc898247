use recall_game::{
    Difficulty, GameConfig, Notification, NotificationLog, Phase, ProgressionController,
    RoundResult, Symbol,
};

type Ctrl = ProgressionController<NotificationLog>;

fn easy(seed: u64) -> Ctrl {
    ProgressionController::new(GameConfig::default(), seed, NotificationLog::new()).unwrap()
}

fn play_until_input(ctrl: &mut Ctrl) {
    ctrl.run_until_idle(256);
    assert_eq!(ctrl.session().phase(), Phase::AwaitingInput);
}

fn target(ctrl: &Ctrl) -> Vec<Symbol> {
    ctrl.session().sequence().as_slice().to_vec()
}

fn wrong_symbol(ctrl: &Ctrl) -> Symbol {
    let expected = ctrl
        .session()
        .sequence()
        .get(ctrl.session().player_input().len())
        .unwrap();
    ctrl.config()
        .tier(ctrl.session().difficulty())
        .symbols
        .iter()
        .copied()
        .find(|symbol| *symbol != expected)
        .unwrap()
}

fn complete_round(ctrl: &mut Ctrl) {
    for symbol in target(ctrl) {
        assert!(ctrl.submit(symbol).applied());
    }
    assert_eq!(ctrl.session().phase(), Phase::RoundComplete);
}

#[test]
fn easy_first_round_scores_forty() {
    let mut ctrl = easy(0x5EED);
    ctrl.start();
    play_until_input(&mut ctrl);
    assert_eq!(ctrl.session().sequence().len(), 4);

    complete_round(&mut ctrl);
    assert_eq!(ctrl.session().score(), 40);
    assert_eq!(ctrl.session().lives(), 3);
    assert_eq!(ctrl.session().round(), 2);

    let summary = ctrl.sink().events().iter().find_map(|event| match event {
        Notification::RoundSummary { outcome } => Some(outcome.clone()),
        _ => None,
    });
    let outcome = summary.unwrap();
    assert_eq!(outcome.round, 1);
    assert_eq!(outcome.points, 40);
    assert_eq!(outcome.result, RoundResult::Success);
    assert!(!outcome.leveled_up);
}

#[test]
fn first_mismatch_costs_a_life_and_clears_input() {
    let mut ctrl = easy(42);
    ctrl.start();
    play_until_input(&mut ctrl);

    let first = ctrl.session().sequence().get(0).unwrap();
    ctrl.submit(first);
    let wrong = wrong_symbol(&ctrl);
    ctrl.submit(wrong);

    assert_eq!(ctrl.session().lives(), 2);
    assert!(ctrl.session().player_input().is_empty());
    assert_eq!(ctrl.session().phase(), Phase::AwaitingInput);
    assert_eq!(ctrl.session().round(), 1);
    assert_eq!(ctrl.session().mistakes(), 1);
    assert!(
        ctrl.sink()
            .events()
            .contains(&Notification::LivesChanged { lives: 2 })
    );
}

#[test]
fn mismatch_at_any_position_keeps_the_sequence() {
    let mut ctrl = easy(1234);
    ctrl.start();
    play_until_input(&mut ctrl);
    let before = ctrl.session().sequence().clone();

    for position in 0..2 {
        for symbol in before.as_slice().iter().take(position) {
            ctrl.submit(*symbol);
        }
        let wrong = wrong_symbol(&ctrl);
        assert!(ctrl.submit(wrong).applied());
        assert_eq!(ctrl.session().sequence(), &before);
        assert_eq!(ctrl.session().phase(), Phase::AwaitingInput);
    }
    assert_eq!(ctrl.session().lives(), 1);

    complete_round(&mut ctrl);
    assert_eq!(ctrl.session().round(), 2);
}

#[test]
fn last_life_ends_the_game() {
    let mut ctrl = easy(9);
    ctrl.start();
    play_until_input(&mut ctrl);
    for _ in 0..3 {
        let wrong = wrong_symbol(&ctrl);
        ctrl.submit(wrong);
    }
    assert_eq!(ctrl.session().lives(), 0);
    assert_eq!(ctrl.session().phase(), Phase::GameOver);
    assert_eq!(ctrl.pending_timers(), 0);

    let summary = ctrl.sink().game_over().unwrap();
    assert_eq!(summary.final_score, 0);
    assert_eq!(summary.mistakes, 3);
    assert_eq!(summary.rounds_played, 1);

    // GameOver is terminal; only restart leaves it.
    assert!(!ctrl.submit(Symbol::Red).applied());
    assert!(!ctrl.start().applied());
    assert!(ctrl.restart().applied());
    assert_eq!(ctrl.session().phase(), Phase::Idle);
    assert_eq!(ctrl.session().lives(), 3);
}

#[test]
fn two_hints_cost_ten_points() {
    let mut ctrl = easy(1234);
    ctrl.start();
    play_until_input(&mut ctrl);
    complete_round(&mut ctrl);
    play_until_input(&mut ctrl);
    assert_eq!(ctrl.session().round(), 2);
    let before = ctrl.session().score();

    let first = ctrl.request_hint().unwrap();
    assert_eq!(Some(first), ctrl.session().sequence().get(0));
    // Hint does not consume input, so the same position is hinted again.
    assert_eq!(ctrl.request_hint(), Some(first));
    assert_eq!(ctrl.session().score(), before - 10);

    let len = ctrl.session().sequence().len();
    complete_round(&mut ctrl);
    let gained = recall_game::scoring::score_round(len, 1.0);
    assert_eq!(ctrl.session().score(), before - 10 + gained);
    assert_eq!(ctrl.session().hints_used_total(), 2);
}

#[test]
fn hint_never_drives_score_negative() {
    let mut ctrl = easy(3);
    ctrl.start();
    play_until_input(&mut ctrl);
    assert!(ctrl.request_hint().is_some());
    assert_eq!(ctrl.session().score(), 0);
}

#[test]
fn input_during_presentation_is_ignored() {
    let mut ctrl = easy(77);
    ctrl.start();
    ctrl.advance(500);
    assert_eq!(ctrl.session().phase(), Phase::Presenting);
    let first = ctrl.session().sequence().get(0).unwrap();
    assert!(!ctrl.submit(first).applied());
    assert!(ctrl.session().player_input().is_empty());
    assert!(ctrl.request_hint().is_none());
    assert_eq!(ctrl.session().lives(), 3);
}

#[test]
fn hard_tier_applies_multiplier() {
    let cfg = GameConfig::default().with_difficulty(Difficulty::Hard);
    let mut ctrl = ProgressionController::new(cfg, 88, NotificationLog::new()).unwrap();
    ctrl.start();
    play_until_input(&mut ctrl);
    let len = ctrl.session().sequence().len();
    complete_round(&mut ctrl);
    assert_eq!(ctrl.session().score(), recall_game::scoring::score_round(len, 2.0));
    assert_eq!(ctrl.session().score(), 80);
}

#[test]
fn next_round_starts_after_feedback_pause() {
    let mut ctrl = easy(64);
    ctrl.start();
    play_until_input(&mut ctrl);
    complete_round(&mut ctrl);
    ctrl.advance(1499);
    assert_eq!(ctrl.session().phase(), Phase::RoundComplete);
    ctrl.advance(1);
    assert_eq!(ctrl.session().phase(), Phase::Presenting);
    assert!(ctrl.session().player_input().is_empty());
    assert_eq!(ctrl.session().hints_used_this_round(), 0);
}

#[test]
fn restart_during_feedback_cancels_next_round() {
    let mut ctrl = easy(65);
    ctrl.start();
    play_until_input(&mut ctrl);
    complete_round(&mut ctrl);
    ctrl.restart();
    ctrl.advance(10_000);
    assert_eq!(ctrl.session().phase(), Phase::Idle);
    assert_eq!(ctrl.session().score(), 0);
    assert_eq!(ctrl.session().round(), 1);
}
