use super::*;
use serde_json::json;

#[test]
fn image_endpoints_share_process_path() {
    assert_eq!(endpoint_path(Operation::RemoveBg), PROCESS_IMAGE_PATH);
    assert_eq!(endpoint_path(Operation::Enhance), PROCESS_IMAGE_PATH);
    assert_eq!(endpoint_path(Operation::GenerateMockup), PROCESS_IMAGE_PATH);
    assert_eq!(endpoint_path(Operation::Translate), "/api/v1/translate");
}

#[test]
fn parse_remove_bg_result() {
    let body = json!({ "result": { "processed_image": "data:image/png;base64,AAA" } }).to_string();
    let (data, note) = parse_response(Operation::RemoveBg, &body).unwrap();
    assert_eq!(data, Processed::Image("data:image/png;base64,AAA".into()));
    assert!(note.is_none());
}

#[test]
fn parse_enhance_requires_enhanced_image() {
    let body = json!({ "result": { "processed_image": "x" } }).to_string();
    let err = parse_response(Operation::Enhance, &body).unwrap_err();
    assert!(matches!(err, WireError::MissingField("result.enhanced_image")));
}

#[test]
fn parse_image_note_prefers_result_level() {
    let body = json!({
        "result": { "processed_image": "x", "note": "AI service temporarily unavailable, using simulation" },
        "note": "AI service currently unreachable"
    })
    .to_string();
    let (_, note) = parse_response(Operation::RemoveBg, &body).unwrap();
    assert!(note.unwrap().contains("temporarily unavailable"));
}

#[test]
fn parse_mockup_falls_back_to_envelope_note() {
    let body = json!({
        "result": { "mockup_description": "Studio shot on linen" },
        "note": "AI service currently unreachable, using offline simulation"
    })
    .to_string();
    let (data, note) = parse_response(Operation::GenerateMockup, &body).unwrap();
    assert_eq!(data, Processed::MockupDescription("Studio shot on linen".into()));
    assert!(note.unwrap().contains("currently unreachable"));
}

#[test]
fn parse_story_with_context() {
    let body = json!({
        "story": "A weaver in Jaipur...",
        "cultural_context": { "region": "rajasthan", "craft_category": "textiles" }
    })
    .to_string();
    let (data, _) = parse_response(Operation::GenerateStory, &body).unwrap();
    let Processed::Story { story, cultural_context } = data else {
        panic!("expected story");
    };
    assert!(story.starts_with("A weaver"));
    assert_eq!(cultural_context.region.as_deref(), Some("rajasthan"));
    assert!(cultural_context.cultural_background.is_none());
}

#[test]
fn parse_story_missing_story_is_error() {
    let err = parse_response(Operation::GenerateStory, "{}").unwrap_err();
    assert!(matches!(err, WireError::Parse(_)));
}

#[test]
fn parse_empty_transcription_uses_placeholder() {
    let body = json!({ "transcription": "" }).to_string();
    let (data, _) = parse_response(Operation::Transcribe, &body).unwrap();
    assert_eq!(data, Processed::Transcription(EMPTY_TRANSCRIPTION.into()));
}

#[test]
fn parse_translation_requires_text() {
    let err = parse_response(Operation::Translate, "{}").unwrap_err();
    assert!(matches!(err, WireError::MissingField("translated_text")));

    let err = parse_response(Operation::Translate, r#"{"translated_text":"  "}"#).unwrap_err();
    assert!(matches!(err, WireError::MissingField("translated_text")));

    let (data, _) = parse_response(Operation::Translate, r#"{"translated_text":"Hola"}"#).unwrap();
    assert_eq!(data, Processed::Translation("Hola".into()));
}

#[test]
fn parse_invalid_json() {
    let err = parse_response(Operation::RemoveBg, "<html>502</html>").unwrap_err();
    assert!(matches!(err, WireError::Parse(_)));
}

#[test]
fn story_body_serializes_context_and_nullable_artisan() {
    let ctx = CulturalContext::new("north_india", "textiles", "traditional_craftsmanship");
    let request = ProcessingRequest::story("I weave shawls", "hi", None, &ctx);
    let body = StoryBody::from_request(&request, "I weave shawls");
    let value = serde_json::to_value(&body).unwrap();
    assert_eq!(value["language"], "hi");
    assert!(value["artisan_id"].is_null());
    assert_eq!(value["cultural_context"]["craft_category"], "textiles");
}

#[test]
fn translate_body_defaults_context() {
    let request = ProcessingRequest::new(
        Operation::Translate,
        super::super::types::Payload::Text("Hello".into()),
        std::collections::BTreeMap::new(),
    );
    let body = TranslateBody::from_request(&request, "Hello");
    assert_eq!(body.context, "general");
    assert_eq!(body.source_language, "en");
}
