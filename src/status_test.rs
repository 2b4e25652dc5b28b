use super::*;

const TTL: Duration = Duration::from_secs(5);

#[test]
fn posted_message_visible_before_ttl() {
    let slot = StatusSlot::new();
    let now = Instant::now();
    slot.post_at(StatusMessage::success("saved", TTL), now);

    let msg = slot.current_at(now + Duration::from_secs(4)).unwrap();
    assert_eq!(msg.text, "saved");
    assert_eq!(msg.severity, Severity::Success);
}

#[test]
fn message_clears_after_ttl() {
    let slot = StatusSlot::new();
    let now = Instant::now();
    slot.post_at(StatusMessage::error("boom", TTL), now);

    assert!(slot.current_at(now + TTL).is_none());
    // Stays cleared even if asked about an earlier instant afterwards.
    assert!(slot.current_at(now).is_none());
}

#[test]
fn newer_message_replaces_older() {
    let slot = StatusSlot::new();
    let now = Instant::now();
    slot.post_at(StatusMessage::info("working", TTL), now);
    slot.post_at(StatusMessage::warning("degraded", TTL), now + Duration::from_secs(1));

    let msg = slot.current_at(now + Duration::from_secs(2)).unwrap();
    assert_eq!(msg.severity, Severity::Warning);
}

#[test]
fn severity_serializes_lowercase() {
    let json = serde_json::to_string(&Severity::Warning).unwrap();
    assert_eq!(json, "\"warning\"");
    assert_eq!(Severity::Error.to_string(), "error");
}
