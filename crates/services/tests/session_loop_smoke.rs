use quiz_core::model::{Choice, Exercise, ExerciseId, SessionSettings};
use quiz_core::time::fixed_clock;
use services::{SessionLoopService, TickOutcome};

#[test]
fn session_loop_plays_to_completion() {
    let exercises: Vec<Exercise> = (1..=3)
        .map(|id| {
            Exercise::multiple_choice(
                ExerciseId::new(id),
                format!("Q{id}"),
                &[Choice::correct("yes"), Choice::incorrect("no")],
            )
        })
        .collect();

    let loop_svc = SessionLoopService::new(SessionSettings::default(), fixed_clock());
    let mut session = loop_svc.start_session(exercises).unwrap();

    let mut ticks = 0;
    while !session.is_complete() {
        if session.snapshot().is_some_and(|s| s.result.is_none()) {
            session.submit_answer([0]).unwrap();
        }
        let _ = session.tick();
        ticks += 1;
        assert!(ticks < 100, "session never completed");
    }

    // Three reveal windows of five seconds, answers submitted instantly.
    assert_eq!(ticks, 15);
    let report = session.report().expect("completed session has a report");
    assert_eq!(report.results.len(), 3);
    assert_eq!(report.summary.percentage, 100);
    assert_eq!(session.tick(), TickOutcome::Idle);
}
