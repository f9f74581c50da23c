use audiomatch_core::types::NO_SPEECH_TEXT;
use audiomatch_core::WavAudio;
use audiomatch_engine::scripted::{ScriptedOutcome, ScriptedRecognizer};
use audiomatch_server::{router, AppState, AudioMatchService};
use std::sync::Arc;
use std::time::Duration;

async fn spawn_app(recognizer: ScriptedRecognizer) -> (String, tempfile::TempDir) {
    spawn_app_with_limit(recognizer, 25 * 1024 * 1024).await
}

async fn spawn_app_with_limit(
    recognizer: ScriptedRecognizer,
    max_upload_bytes: usize,
) -> (String, tempfile::TempDir) {
    let scratch = tempfile::tempdir().unwrap();
    let service = AudioMatchService::new(
        scratch.path().to_path_buf(),
        Arc::new(recognizer),
        "ar-EG".to_string(),
        Duration::from_secs(5),
    )
    .unwrap();
    let state = AppState {
        service: Arc::new(service),
        engine_name: "scripted".to_string(),
    };
    let app = router(state, max_upload_bytes);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), scratch)
}

fn wav_bytes() -> Vec<u8> {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.wav");
    let audio = WavAudio {
        samples: vec![64; 1600],
        sample_rate: 16000,
    };
    audiomatch_audio::write_wav(&path, &audio).unwrap();
    std::fs::read(&path).unwrap()
}

fn assert_scratch_empty(scratch: &tempfile::TempDir) {
    let leftover: Vec<_> = std::fs::read_dir(scratch.path()).unwrap().collect();
    assert!(leftover.is_empty(), "temp files left behind: {leftover:?}");
}

fn upload_form(filename: Option<&str>, expected_text: Option<&str>) -> reqwest::multipart::Form {
    let mut part = reqwest::multipart::Part::bytes(wav_bytes());
    if let Some(name) = filename {
        part = part.file_name(name.to_string());
    }
    let mut form = reqwest::multipart::Form::new().part("file", part);
    if let Some(expected) = expected_text {
        form = form.text("expected_text", expected.to_string());
    }
    form
}

#[tokio::test]
async fn test_process_audio_success() {
    let (base, scratch) = spawn_app(ScriptedRecognizer::with_transcript("مرحبا")).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/process_audio/"))
        .multipart(upload_form(Some("hello.wav"), Some("مرحبا")))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["recognized_text"], "مرحبا");
    assert_eq!(body["expected_text"], "مرحبا");
    assert_eq!(body["match"], true);
    assert_scratch_empty(&scratch);
}

#[tokio::test]
async fn test_process_audio_trailing_space_still_matches() {
    let (base, scratch) = spawn_app(ScriptedRecognizer::with_transcript("مرحبا")).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/process_audio/"))
        .multipart(upload_form(Some("hello.wav"), Some("مرحبا  ")))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["match"], true);
    assert_eq!(body["expected_text"], "مرحبا  ");
    assert_scratch_empty(&scratch);
}

#[tokio::test]
async fn test_process_audio_mismatch() {
    let (base, _scratch) = spawn_app(ScriptedRecognizer::with_transcript("صباح الخير")).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/process_audio/"))
        .multipart(upload_form(Some("hello.wav"), Some("مرحبا")))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["match"], false);
}

#[tokio::test]
async fn test_process_audio_no_speech_sentinel() {
    let (base, scratch) =
        spawn_app(ScriptedRecognizer::with_outcome(ScriptedOutcome::NoSpeech)).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/process_audio/"))
        .multipart(upload_form(Some("noise.mp3"), Some("مرحبا")))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["recognized_text"], NO_SPEECH_TEXT);
    assert_eq!(body["match"], false);
    assert_scratch_empty(&scratch);
}

#[tokio::test]
async fn test_process_audio_missing_filename_is_400() {
    let (base, scratch) = spawn_app(ScriptedRecognizer::with_transcript("x")).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/process_audio/"))
        .multipart(upload_form(None, Some("x")))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "No file uploaded");
    assert_scratch_empty(&scratch);
}

#[tokio::test]
async fn test_process_audio_missing_expected_text_is_400() {
    let (base, scratch) = spawn_app(ScriptedRecognizer::with_transcript("x")).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/process_audio/"))
        .multipart(upload_form(Some("hello.wav"), None))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    assert_scratch_empty(&scratch);
}

#[tokio::test]
async fn test_process_audio_missing_file_part_is_400() {
    let (base, scratch) = spawn_app(ScriptedRecognizer::with_transcript("x")).await;

    let form = reqwest::multipart::Form::new().text("expected_text", "x");
    let response = reqwest::Client::new()
        .post(format!("{base}/process_audio/"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    assert_scratch_empty(&scratch);
}

#[tokio::test]
async fn test_process_audio_save_failure_is_500() {
    let (base, scratch) = spawn_app(ScriptedRecognizer::with_transcript("x")).await;

    // Replace the scratch dir with a plain file so persisting the upload fails.
    std::fs::remove_dir_all(scratch.path()).unwrap();
    std::fs::write(scratch.path(), b"").unwrap();

    let response = reqwest::Client::new()
        .post(format!("{base}/process_audio/"))
        .multipart(upload_form(Some("hello.wav"), Some("x")))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["detail"].as_str().is_some_and(|d| !d.is_empty()));
    // Nothing was persisted: the scratch path is still the plain file.
    assert!(scratch.path().is_file());
}

#[tokio::test]
async fn test_process_audio_oversize_upload_rejected() {
    let (base, scratch) =
        spawn_app_with_limit(ScriptedRecognizer::with_transcript("x"), 1024).await;

    // wav_bytes() is ~3 KiB, over the 1 KiB cap.
    let response = reqwest::Client::new()
        .post(format!("{base}/process_audio/"))
        .multipart(upload_form(Some("hello.wav"), Some("x")))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 413);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "uploaded file too large");
    assert_scratch_empty(&scratch);
}

#[tokio::test]
async fn test_healthz_reports_engine() {
    let (base, _scratch) = spawn_app(ScriptedRecognizer::with_transcript("x")).await;

    let response = reqwest::get(format!("{base}/healthz")).await.unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["engine"], "scripted");
}
