//! End-to-end identification through the public API with the fixed backend.

use fishlens_core::config::ClassifierBackend;
use fishlens_core::{
    ClassificationEntry, Config, ConfidenceTier, FishLens, IdentifyError, ImageInput, Session,
    SessionEffect, SessionEvent, SessionState,
};

const JPEG_HEADER: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];

fn fixed_config(entries: Vec<ClassificationEntry>) -> Config {
    let mut config = Config::default();
    config.classifier.backend = ClassifierBackend::Fixed;
    config.classifier.fixed.entries = entries;
    config
}

fn jpeg(source: &str) -> ImageInput {
    ImageInput::from_bytes(JPEG_HEADER.to_vec(), source)
}

#[tokio::test]
async fn test_tiger_shark_scenario() {
    let lens = FishLens::new(fixed_config(vec![
        ClassificationEntry::new("tiger shark", 0.92),
        ClassificationEntry::new("beach towel", 0.05),
    ]))
    .await
    .unwrap();

    let result = lens.identify(&jpeg("shark.jpg")).await.unwrap();
    assert!(!result.no_fish_detected);
    assert_eq!(result.records.len(), 2);

    let shark = &result.records[0];
    assert_eq!(shark.genus.as_deref(), Some("tiger"));
    assert_eq!(shark.species.as_deref(), Some("tiger shark"));
    assert_eq!(shark.common_name.as_deref(), Some("tiger shark"));
    assert_eq!(shark.tier(), ConfidenceTier::High);

    let towel = &result.records[1];
    assert!(towel.species.is_none());
    assert_eq!(towel.tier(), ConfidenceTier::Low);
}

#[tokio::test]
async fn test_unsorted_backend_output_is_ranked_then_truncated() {
    let mut config = fixed_config(vec![
        ClassificationEntry::new("rock", 0.1),
        ClassificationEntry::new("cod", 0.5),
        ClassificationEntry::new("kelp", 0.2),
        ClassificationEntry::new("brown trout", 0.6),
    ]);
    config.interpreter.top_k = 2;
    let lens = FishLens::new(config).await.unwrap();

    let result = lens.identify(&jpeg("mixed.jpg")).await.unwrap();
    let labels: Vec<_> = result.records.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["brown trout", "cod"]);
    assert_eq!(result.records[1].genus.as_deref(), Some("cod"));
    assert_eq!(result.records[1].species.as_deref(), Some("cod"));
}

#[tokio::test]
async fn test_umbrella_reports_no_fish() {
    let lens = FishLens::new(fixed_config(vec![ClassificationEntry::new("umbrella", 0.99)]))
        .await
        .unwrap();
    let result = lens.identify(&jpeg("beach.jpg")).await.unwrap();
    assert!(result.no_fish_detected);
    assert_eq!(result.fish().count(), 0);
}

#[tokio::test]
async fn test_data_uri_input() {
    let lens = FishLens::new(fixed_config(vec![ClassificationEntry::new("tuna", 0.8)]))
        .await
        .unwrap();
    let image = ImageInput::from_data_uri("data:image/jpeg;base64,/9j/4A==").unwrap();
    let result = lens.identify(&image).await.unwrap();
    assert_eq!(result.source, "data-uri");
    assert!(!result.no_fish_detected);
}

#[tokio::test]
async fn test_identify_path_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catch.jpg");
    std::fs::write(&path, JPEG_HEADER).unwrap();

    let lens = FishLens::new(fixed_config(vec![ClassificationEntry::new("salmon", 0.5)]))
        .await
        .unwrap();
    let result = lens.identify_path(&path).await.unwrap();
    assert_eq!(result.records[0].tier(), ConfidenceTier::Medium);
}

#[tokio::test]
async fn test_text_file_is_invalid_input() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.jpg");
    std::fs::write(&path, "not an image").unwrap();

    let lens = FishLens::new(fixed_config(vec![])).await.unwrap();
    let err = lens.identify_path(&path).await.unwrap_err();
    assert!(matches!(err, IdentifyError::InvalidInput { .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_onnx_without_model_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.general.model_dir = dir.path().to_path_buf();

    let err = FishLens::new(config).await.err().unwrap();
    assert!(err.to_string().contains("models download"));
}

/// Drive a session the way a front end would, swapping images mid-flight.
#[tokio::test]
async fn test_session_discards_stale_result() {
    let lens = FishLens::new(fixed_config(vec![ClassificationEntry::new("bass", 0.75)]))
        .await
        .unwrap();
    let mut session = Session::new();

    session.handle(SessionEvent::ImageChosen(jpeg("first.jpg")));
    let stale = session.handle(SessionEvent::AnalyzeRequested);

    session.handle(SessionEvent::ImageChosen(jpeg("second.jpg")));
    let fresh = session.handle(SessionEvent::AnalyzeRequested);

    // Resolve in reverse order: the fresh request lands first.
    for effects in [fresh, stale] {
        for SessionEffect::StartAnalysis { request_id, image } in effects {
            let event = match lens.identify_request(request_id, &image).await {
                Ok(identification) => SessionEvent::ClassifierResolved {
                    request_id,
                    identification,
                },
                Err(error) => SessionEvent::ClassifierFailed { request_id, error },
            };
            session.handle(event);
        }
    }

    match session.state() {
        SessionState::Results {
            image,
            identification,
        } => {
            assert_eq!(image.source, "second.jpg");
            assert_eq!(identification.source, "second.jpg");
        }
        other => panic!("unexpected state {}", other.name()),
    }
}
