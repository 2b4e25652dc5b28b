use super::*;
use crate::remote::types::{DegradeReason, Operation, RejectReason};
use crate::remote::ProcessingRequest;
use crate::status::Severity;
use crate::test_helpers::{Harness, MockRemote};

const COPY: ActionCopy = ActionCopy {
    pending: "Working...",
    done: "Done!",
    simulated: "Work simulated",
    login_required: "Please log in.",
    invalid_input: "Bad input.",
};

fn passthrough() -> Processed {
    Processed::Image("data:original".into())
}

async fn run(h: &Harness, slot: &ActionSlot, status: &StatusSlot) -> ActionReport<Processed> {
    let (ticket, token) = match h.ctx.begin_remote::<Processed>(slot, status, &COPY).await {
        Ok(pair) => pair,
        Err(report) => return report,
    };
    let request = ProcessingRequest::image(Operation::RemoveBg, "data:original", None);
    let outcome = h.ctx.remote.send(&request, &token).await;
    h.ctx.finish_remote(ticket, status, &COPY, outcome, passthrough)
}

#[test]
fn slot_refuses_second_begin_while_pending() {
    let slot = ActionSlot::new("test");
    let ticket = slot.begin(1).unwrap();
    assert_eq!(slot.state(), ActionState::Pending);
    assert!(slot.begin(1).is_none());
    ticket.settle(ActionState::Rendered);
    assert_eq!(slot.state(), ActionState::Rendered);
    assert!(slot.begin(1).is_some());
}

#[test]
fn dropped_ticket_leaves_slot_rejected() {
    let slot = ActionSlot::new("test");
    drop(slot.begin(0).unwrap());
    assert_eq!(slot.state(), ActionState::Rejected);
}

#[test]
fn reject_now_does_not_disturb_pending() {
    let slot = ActionSlot::new("test");
    let _ticket = slot.begin(0).unwrap();
    slot.reject_now();
    assert_eq!(slot.state(), ActionState::Pending);
}

#[tokio::test]
async fn unauthenticated_issues_no_call() {
    let h = Harness::new(MockRemote::new(vec![]));
    let slot = ActionSlot::new("test");
    let status = StatusSlot::new();

    let report = run(&h, &slot, &status).await;
    assert_eq!(h.remote.call_count(), 0);
    assert_eq!(report.state, ActionState::Rejected);
    assert_eq!(report.status.severity, Severity::Error);
    assert!(report.data.is_none());
    assert_eq!(status.current().unwrap().text, "Please log in.");
}

#[tokio::test]
async fn degraded_call_renders_mock() {
    let h = Harness::new(MockRemote::new(vec![ProcessingOutcome::degraded(
        DegradeReason::ServiceUnreachable,
        "refused",
    )]))
    .signed_in();
    let slot = ActionSlot::new("test");
    let status = StatusSlot::new();

    let report = run(&h, &slot, &status).await;
    assert!(report.rendered());
    assert_eq!(report.data, Some(passthrough()));
    assert_eq!(report.status.severity, Severity::Success);
    assert!(report.status.text.contains("simulated"));
}

#[tokio::test]
async fn server_rejection_is_error() {
    let h = Harness::new(MockRemote::new(vec![ProcessingOutcome::rejected(RejectReason::InvalidInput)])).signed_in();
    let slot = ActionSlot::new("test");
    let status = StatusSlot::new();

    let report = run(&h, &slot, &status).await;
    assert_eq!(report.state, ActionState::Rejected);
    assert_eq!(report.status.text, "Bad input.");
}

#[tokio::test]
async fn sign_out_while_pending_drops_result() {
    let session = std::sync::Arc::new(crate::session::LocalSessionProvider::new());
    let hook_session = session.clone();
    let remote = MockRemote::new(vec![ProcessingOutcome::Success {
        data: Processed::Image("data:fresh".into()),
        server_note: None,
    }])
    .with_hook(move || hook_session.sign_out());
    let mut h = Harness::new(remote);
    session.sign_in_anonymously();
    h.ctx.session = session;

    let slot = ActionSlot::new("test");
    let status = StatusSlot::new();
    let report = run(&h, &slot, &status).await;

    assert_eq!(h.remote.call_count(), 1);
    assert_eq!(report.state, ActionState::Rejected);
    assert!(report.data.is_none());
    assert_eq!(slot.state(), ActionState::Rejected);
}
