//! Scenario tests against the driver doubles.
//!
//! All tests run on paused virtual time, so the scenario's multi-second
//! settle pauses and timeouts elapse instantly and deterministically.

use agencyflow_e2e::scenario::{self, SUCCESS_TEXT, ScenarioConfig};
use agencyflow_e2e::testing::{MockAction, MockEngine, MockState};
use agencyflow_e2e::{Result, ScenarioError};

fn fill(locator: &str, value: &str) -> MockAction {
    MockAction::Fill {
        locator: locator.to_string(),
        value: value.to_string(),
    }
}

fn click(locator: &str) -> MockAction {
    MockAction::Click {
        locator: locator.to_string(),
    }
}

fn login_attempt() -> Vec<MockAction> {
    vec![
        fill("form input[type=email]", "teste@teste.com"),
        fill("form input[type=password]", "teste123"),
        click("form button[type=submit]"),
    ]
}

async fn run_with(state_setup: impl FnOnce(&MockState)) -> (Result<()>, std::sync::Arc<MockState>) {
    let engine = MockEngine::new();
    let state = engine.state();
    state_setup(&state);
    let outcome = scenario::run(Box::new(engine), &ScenarioConfig::default()).await;
    (outcome, state)
}

#[tokio::test(start_paused = true)]
async fn completes_the_scripted_sign_up_flow() {
    let (outcome, state) = run_with(|state| state.set_text_visible(SUCCESS_TEXT)).await;
    outcome.expect("scenario should pass when the token banner is visible");

    let mut expected = vec![
        MockAction::Goto {
            url: "http://localhost:3000".to_string(),
        },
        MockAction::DomReady,
    ];
    expected.extend(login_attempt());
    expected.extend(login_attempt());
    expected.push(click("a[href='/signup']"));
    expected.push(fill("form input[type=text]", "Agency Owner"));
    expected.push(fill("form input[type=email]", "teste@teste.com"));
    expected.push(fill("form input[type=password]", "teste123"));
    expected.push(fill("form input[type=password] (match #1)", "teste123"));
    expected.push(click("form button[type=submit]"));
    expected.push(MockAction::VisibilityProbe {
        text: SUCCESS_TEXT.to_string(),
    });

    assert_eq!(state.actions(), expected);
    assert_eq!(state.context_closes(), 1);
    assert_eq!(state.browser_closes(), 1);
    assert_eq!(state.engine_stops(), 1);
}

#[tokio::test(start_paused = true)]
async fn login_is_submitted_twice_before_account_creation() {
    let (outcome, state) = run_with(|state| state.set_text_visible(SUCCESS_TEXT)).await;
    outcome.unwrap();

    let actions = state.actions();
    let link_pos = actions
        .iter()
        .position(|a| *a == click("a[href='/signup']"))
        .expect("create-account link should be clicked");
    let submits_before_link = actions[..link_pos]
        .iter()
        .filter(|a| **a == click("form button[type=submit]"))
        .count();
    assert_eq!(submits_before_link, 2);
}

#[tokio::test(start_paused = true)]
async fn every_fill_and_click_is_preceded_by_the_settle_delay() {
    let (outcome, state) = run_with(|state| state.set_text_visible(SUCCESS_TEXT)).await;
    outcome.unwrap();

    let settle = ScenarioConfig::default().settle_delay;
    let timed = state.timed_actions();
    let mut paced = 0;
    for (i, (action, at)) in timed.iter().enumerate() {
        if matches!(action, MockAction::Fill { .. } | MockAction::Click { .. }) {
            // The first recorded action is the navigation, so every
            // fill/click has a predecessor to measure against.
            let (_, prev_at) = &timed[i - 1];
            let gap = at.duration_since(*prev_at);
            assert!(
                gap >= settle,
                "{action:?} ran only {gap:?} after its predecessor"
            );
            paced += 1;
        }
    }
    // Two login attempts plus the account-creation form.
    assert_eq!(paced, 12);
}

#[tokio::test(start_paused = true)]
async fn stuck_frame_does_not_abort_the_run() {
    let (outcome, state) = run_with(|state| {
        state.add_frame("chat-widget", false);
        state.add_frame("billing", true);
        state.set_text_visible(SUCCESS_TEXT);
    })
    .await;
    outcome.expect("a frame that never reaches DOM-ready must be tolerated");

    let actions = state.actions();
    assert!(actions.contains(&MockAction::FrameReady {
        frame: "chat-widget".to_string()
    }));
    assert!(!actions.iter().any(|a| matches!(
        a,
        MockAction::FrameReady { frame } if frame == "billing"
    )));
    // The run still reached the login step.
    assert!(actions.contains(&fill("form input[type=email]", "teste@teste.com")));
}

#[tokio::test(start_paused = true)]
async fn wedged_page_action_times_out_instead_of_hanging() {
    let (outcome, state) = run_with(|state| state.set_hang_page_actions()).await;

    match outcome {
        Err(ScenarioError::Timeout { ms, action }) => {
            assert_eq!(ms, 5000);
            assert_eq!(action, "fill login email");
        }
        other => panic!("expected action timeout, got {other:?}"),
    }
    assert_eq!(state.context_closes(), 1);
    assert_eq!(state.browser_closes(), 1);
    assert_eq!(state.engine_stops(), 1);
}

#[tokio::test(start_paused = true)]
async fn navigation_must_commit_within_its_bound() {
    let (outcome, state) = run_with(|state| state.set_hang_navigation()).await;

    match outcome {
        Err(ScenarioError::Timeout { ms, action }) => {
            assert_eq!(ms, 10_000);
            assert_eq!(action, "navigation to commit");
        }
        other => panic!("expected navigation timeout, got {other:?}"),
    }
    assert_eq!(state.context_closes(), 1);
    assert_eq!(state.browser_closes(), 1);
    assert_eq!(state.engine_stops(), 1);
}

#[tokio::test(start_paused = true)]
async fn missing_success_text_fails_with_the_business_expectation() {
    let (outcome, state) = run_with(|_| {}).await;

    match outcome {
        Err(err @ ScenarioError::Assertion { .. }) => {
            assert!(err.is_assertion());
            assert!(
                err.to_string()
                    .contains("agency owner could not create a new agency profile")
            );
        }
        other => panic!("expected assertion failure, got {other:?}"),
    }
    // The window is polled more than once before giving up.
    let probes = state
        .actions()
        .iter()
        .filter(|a| matches!(a, MockAction::VisibilityProbe { .. }))
        .count();
    assert!(probes > 1);
    assert_eq!(state.context_closes(), 1);
    assert_eq!(state.browser_closes(), 1);
    assert_eq!(state.engine_stops(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_acquisition_releases_what_was_acquired() {
    let (outcome, state) = run_with(|state| state.set_fail_context_open()).await;

    assert!(outcome.is_err());
    assert_eq!(state.context_closes(), 0, "context never opened");
    assert_eq!(state.browser_closes(), 1);
    assert_eq!(state.engine_stops(), 1);
    assert!(state.actions().is_empty(), "no page action should have run");
}
