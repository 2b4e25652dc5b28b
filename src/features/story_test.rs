use super::*;
use crate::features::ActionState;
use crate::prefs::Preferences;
use crate::remote::types::{
    AUX_CRAFT_CATEGORY, AUX_LANGUAGE, AUX_REGION, DegradeReason, Operation, Payload,
};
use crate::status::Severity;
use crate::test_helpers::{FakeDevices, Harness, MockRemote};

fn recorded(h: &Harness) -> StoryWeaver {
    let weaver = StoryWeaver::new(h.ctx.clone());
    weaver.start_recording();
    weaver.stop_recording();
    weaver
}

fn story_success(text: &str) -> ProcessingOutcome {
    ProcessingOutcome::Success {
        data: Processed::Story {
            story: text.into(),
            cultural_context: CulturalContext::new("south_india", "pottery", "coastal"),
        },
        server_note: None,
    }
}

#[test]
fn recording_acquires_and_releases_microphone() {
    let h = Harness::new(MockRemote::new(vec![]));
    let weaver = StoryWeaver::new(h.ctx.clone());

    assert_eq!(weaver.start_recording().text, "Recording started... Speak now!");
    assert!(weaver.is_recording());
    assert_eq!(weaver.start_recording().severity, Severity::Info);
    assert_eq!(h.devices.opens(), 1);

    weaver.stop_recording();
    assert!(!weaver.is_recording());
    assert!(weaver.has_audio());
    assert_eq!(h.devices.stops(), 1);
}

#[test]
fn denied_microphone_reports_error() {
    let h = Harness::build(MockRemote::new(vec![]), FakeDevices::denying(), Preferences::default());
    let weaver = StoryWeaver::new(h.ctx.clone());
    let status = weaver.start_recording();
    assert_eq!(status.severity, Severity::Error);
    assert_eq!(status.text, "Error accessing microphone. Please check permissions.");
    assert!(!weaver.is_recording());
}

#[tokio::test]
async fn generate_without_audio_is_refused() {
    let h = Harness::new(MockRemote::new(vec![])).signed_in();
    let weaver = StoryWeaver::new(h.ctx.clone());
    let report = weaver.generate_story().await;
    assert_eq!(report.state, ActionState::Rejected);
    assert_eq!(report.status.text, "No audio recorded. Please record first.");
    assert_eq!(h.remote.call_count(), 0);
}

#[tokio::test]
async fn generate_requires_session() {
    let h = Harness::new(MockRemote::new(vec![]));
    let weaver = recorded(&h);
    let report = weaver.generate_story().await;
    assert_eq!(report.status.severity, Severity::Error);
    assert_eq!(report.status.text, "Please log in to use the story generation feature.");
    assert_eq!(h.remote.call_count(), 0);
}

#[tokio::test]
async fn transcribes_then_generates_with_preferences() {
    let prefs = Preferences {
        locale: Some("hi".into()),
        region: Some("south_india".into()),
        craft: Some("pottery".into()),
        ..Preferences::default()
    };
    let remote = MockRemote::new(vec![
        ProcessingOutcome::Success { data: Processed::Transcription("मैं कुम्हार हूँ".into()), server_note: None },
        story_success("A potter's tale."),
    ]);
    let h = Harness::build(remote, FakeDevices::new(), prefs).signed_in();
    let weaver = recorded(&h);

    let report = weaver.generate_story().await;
    assert!(report.rendered());
    assert_eq!(report.status.text, "Story generated successfully!");
    let story = report.data.unwrap();
    assert_eq!(story.transcription, "मैं कुम्हार हूँ");
    assert_eq!(story.story, "A potter's tale.");
    assert_eq!(weaver.story(), Some(story));

    let calls = h.remote.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].operation(), Operation::Transcribe);
    assert!(matches!(calls[0].payload(), Payload::Bytes { mime, .. } if mime == "audio/wav"));
    assert_eq!(calls[0].aux(AUX_LANGUAGE), Some("hi"));
    assert_eq!(calls[1].operation(), Operation::GenerateStory);
    assert_eq!(calls[1].aux(AUX_REGION), Some("south_india"));
    assert_eq!(calls[1].aux(AUX_CRAFT_CATEGORY), Some("pottery"));
}

#[tokio::test]
async fn transport_error_uses_language_transcription() {
    let prefs = Preferences { locale: Some("te".into()), ..Preferences::default() };
    let remote = MockRemote::new(vec![
        ProcessingOutcome::degraded(DegradeReason::NetworkFailure, "connection reset"),
        story_success("ok"),
    ]);
    let h = Harness::build(remote, FakeDevices::new(), prefs).signed_in();
    let weaver = recorded(&h);

    let report = weaver.generate_story().await;
    let expected = mock::transcription("te");
    assert_eq!(report.data.unwrap().transcription, expected);
    assert_eq!(h.remote.calls()[1].payload(), &Payload::Text(expected));
}

#[tokio::test]
async fn unknown_language_transcription_falls_back_to_english() {
    let prefs = Preferences { locale: Some("gon".into()), ..Preferences::default() };
    let remote = MockRemote::new(vec![
        ProcessingOutcome::degraded(DegradeReason::ServiceUnreachable, "refused"),
        story_success("ok"),
    ]);
    let h = Harness::build(remote, FakeDevices::new(), prefs).signed_in();
    let weaver = recorded(&h);

    let report = weaver.generate_story().await;
    assert_eq!(report.data.unwrap().transcription, mock::transcription("en"));
}

#[tokio::test]
async fn failed_story_call_uses_sample_story() {
    let h = Harness::new(MockRemote::new(vec![])).signed_in();
    let weaver = recorded(&h);

    let report = weaver.generate_story().await;
    assert!(report.rendered());
    assert_eq!(report.status.severity, Severity::Success);
    assert!(report.status.text.contains("simulated"));
    let story = report.data.unwrap();
    assert!(mock::MOCK_STORIES.contains(&story.story.as_str()));
    assert_eq!(story.cultural_context, mock::story_context());
}

#[tokio::test]
async fn sign_out_between_calls_skips_story_request() {
    let session = std::sync::Arc::new(crate::session::LocalSessionProvider::new());
    let hook = session.clone();
    let remote = MockRemote::new(vec![]).with_hook(move || hook.sign_out());
    let mut h = Harness::new(remote);
    session.sign_in_anonymously();
    h.ctx.session = session;
    let weaver = recorded(&h);

    let report = weaver.generate_story().await;
    assert_eq!(h.remote.call_count(), 1);
    assert_eq!(report.state, ActionState::Rejected);
    assert!(weaver.story().is_none());
}

#[tokio::test]
async fn regenerate_while_pending_is_ignored_even_after_new_recording() {
    let gate = std::sync::Arc::new(tokio::sync::Notify::new());
    let h = Harness::new(MockRemote::gated(vec![], gate.clone())).signed_in();
    let weaver = recorded(&h);

    let (first, second) = tokio::join!(weaver.generate_story(), async {
        while h.remote.call_count() < 1 {
            tokio::task::yield_now().await;
        }
        weaver.start_recording();
        let second = weaver.generate_story().await;
        gate.notify_one();
        while h.remote.call_count() < 2 {
            tokio::task::yield_now().await;
        }
        gate.notify_one();
        second
    });

    assert_eq!(second.state, ActionState::Pending);
    assert_eq!(second.status.severity, Severity::Info);
    assert!(second.status.text.contains("already in progress"));
    assert!(first.rendered());
    assert_eq!(h.remote.call_count(), 2);
    assert!(weaver.is_recording());
}

#[tokio::test]
async fn save_story_names_file_by_timestamp() {
    let h = Harness::new(MockRemote::new(vec![])).signed_in();
    let weaver = recorded(&h);
    assert_eq!(weaver.save_story().unwrap_err().text, "No story to save.");

    weaver.generate_story().await;
    let file = weaver.save_story().unwrap();
    assert!(file.filename.starts_with("story_"));
    assert!(file.filename.ends_with(".txt"));
    assert_eq!(Some(file.contents), weaver.story().map(|s| s.story));
}
