/*
    End-to-end pipeline tests against a local stub of the hosted
    services. The stub records which endpoints were called so the
    tests can assert what a cycle did and, as importantly, what it
    never touched.
*/

use axum::body::Bytes;
use axum::extract::{Host, Path as UrlPath, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use npcforge::args::Args;
use npcforge::pipeline::{run_cycle, CycleError, CycleRunner};
use npcforge::status::StatusHandle;
use npcforge::{archive, http_client};
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tokio::time::Duration;

const SHEET: &str = "Name: Seraphine Duskwhisper\n\
Race & Class: Half-Elf Ranger\n\
Personality: Wry and watchful\n\
Quirks: Collects tavern spoons\n\
Backstory: Raised by wolves near Neverwinter, she tracks poachers for coin.\n\
Ideal: Freedom\n\
Bond: Her wolf companion\n\
Flaw: Distrusts nobility";

#[derive(Clone)]
struct Stub {
    hits: Arc<Mutex<Vec<String>>>,
    captions: Arc<Mutex<Vec<String>>>,
    fail_llm: bool,
    llm_delay_ms: u64,
}

impl Stub {
    fn hit(&self, name: &str) {
        self.hits.lock().unwrap().push(name.to_string());
    }

    fn hit_names(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }
}

async fn chat(State(stub): State<Stub>) -> (StatusCode, Json<serde_json::Value>) {
    stub.hit("chat");
    if stub.llm_delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(stub.llm_delay_ms)).await;
    }
    if stub.fail_llm {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "simulated outage"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"choices": [{"message": {"content": SHEET}}]})),
    )
}

async fn images(Host(host): Host, State(stub): State<Stub>) -> Json<serde_json::Value> {
    stub.hit("images");
    Json(json!({"data": [{"url": format!("http://{}/image.png", host)}]}))
}

async fn image_png(State(stub): State<Stub>) -> Vec<u8> {
    stub.hit("download");
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::new(4, 4));
    let mut cursor = std::io::Cursor::new(Vec::new());
    img.write_to(&mut cursor, image::ImageOutputFormat::Png)
        .unwrap();
    cursor.into_inner()
}

async fn photos(
    UrlPath(_page): UrlPath<String>,
    State(stub): State<Stub>,
    _body: Bytes,
) -> Json<serde_json::Value> {
    stub.hit("photos");
    Json(json!({"id": "111", "post_id": "987_654"}))
}

async fn feed(
    UrlPath(_page): UrlPath<String>,
    State(stub): State<Stub>,
    Form(form): Form<HashMap<String, String>>,
) -> Json<serde_json::Value> {
    stub.hit("feed");
    if let Some(message) = form.get("message") {
        stub.captions.lock().unwrap().push(message.clone());
    }
    Json(json!({"id": "fb-post-1"}))
}

async fn comments(
    UrlPath(_post): UrlPath<String>,
    State(stub): State<Stub>,
    Form(_form): Form<HashMap<String, String>>,
) -> Json<serde_json::Value> {
    stub.hit("comments");
    Json(json!({"id": "comment-1"}))
}

async fn drive_upload(State(stub): State<Stub>, _body: Bytes) -> Json<serde_json::Value> {
    stub.hit("drive");
    Json(json!({"id": "drv-1", "webViewLink": "https://drive.example/view/drv-1"}))
}

async fn hook(State(stub): State<Stub>, Json(_payload): Json<serde_json::Value>) -> StatusCode {
    stub.hit("webhook");
    StatusCode::OK
}

async fn start_stub(fail_llm: bool, llm_delay_ms: u64) -> (String, Stub) {
    let stub = Stub {
        hits: Arc::new(Mutex::new(Vec::new())),
        captions: Arc::new(Mutex::new(Vec::new())),
        fail_llm,
        llm_delay_ms,
    };

    let app = Router::new()
        .route("/v1/chat/completions", post(chat))
        .route("/v1/images/generations", post(images))
        .route("/image.png", get(image_png))
        .route("/v19.0/:id/photos", post(photos))
        .route("/v19.0/:id/feed", post(feed))
        .route("/v19.0/:id/comments", post(comments))
        .route("/upload/drive/v3/files", post(drive_upload))
        .route("/hook", post(hook))
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), stub)
}

fn base_args(host: &str, dir: &Path) -> Args {
    Args {
        system_prompt: "You are a creative Dungeons & Dragons NPC generator.".to_string(),
        character_prompt: "Generate a creative NPC.".to_string(),
        llm_host: host.to_string(),
        llm_model: "gpt-4".to_string(),
        temperature: 0.9,
        max_tokens: 800,
        openai_api_key: Some("test-key".to_string()),
        image_host: host.to_string(),
        image_model: "dall-e-3".to_string(),
        image_size: "1024x1024".to_string(),
        skip_image: true,
        video: false,
        video_fps: 12,
        video_timeout_secs: 120,
        backstory_max_words: 60,
        elevenlabs_api_key: None,
        elevenlabs_voice_id: "Rachel".to_string(),
        elevenlabs_host: host.to_string(),
        google_tts_token: None,
        google_tts_host: host.to_string(),
        tts_voice: "en-GB-Wavenet-B".to_string(),
        tts_language: "en-GB".to_string(),
        tts_speaking_rate: 0.92,
        tts_pitch: 2.0,
        fb_page_id: None,
        fb_access_token: None,
        graph_host: host.to_string(),
        hashtags: "#DnD #TTRPG".to_string(),
        subscribe_link: None,
        drive_token: None,
        drive_folder_id: None,
        drive_host: host.to_string(),
        webhook_url: None,
        archive_file: dir.join("archive.txt").to_string_lossy().to_string(),
        artifact_dir: dir.join("artifacts").to_string_lossy().to_string(),
        schedule: String::new(),
        tick_secs: 30,
        http_timeout_secs: 10,
        bind_address: "127.0.0.1:0".to_string(),
        loglevel: "info".to_string(),
    }
}

#[tokio::test]
async fn text_only_cycle_archives_once_and_touches_nothing_else() {
    let (host, stub) = start_stub(false, 0).await;
    let dir = tempfile::tempdir().unwrap();
    let args = base_args(&host, dir.path());

    let client = http_client(10).unwrap();
    let status = StatusHandle::new();
    let running = AtomicBool::new(true);

    let report = run_cycle(&args, &client, &status, &running).await.unwrap();

    assert!(report.archived);
    assert_eq!(report.facebook_post_id, None);
    assert_eq!(report.drive_link, None);
    assert!(!report.webhook_delivered);
    assert_eq!(report.race, "Half-Elf");
    assert_eq!(report.class, "Ranger");

    let entries = archive::read_recent(Path::new(&args.archive_file), 10);
    assert_eq!(entries.len(), 1);
    assert!(entries[0].contains("Seraphine Duskwhisper"));

    // Only the generator was called; no image, social or storage
    // traffic happened.
    assert_eq!(stub.hit_names(), vec!["chat"]);
}

#[tokio::test]
async fn caption_carries_sheet_verbatim_with_hashtag_suffix() {
    let (host, stub) = start_stub(false, 0).await;
    let dir = tempfile::tempdir().unwrap();
    let mut args = base_args(&host, dir.path());
    args.fb_page_id = Some("page-1".to_string());
    args.fb_access_token = Some("fb-token".to_string());

    let client = http_client(10).unwrap();
    let status = StatusHandle::new();
    let running = AtomicBool::new(true);

    let report = run_cycle(&args, &client, &status, &running).await.unwrap();

    assert_eq!(report.facebook_post_id.as_deref(), Some("fb-post-1"));
    assert_eq!(report.comment_id.as_deref(), Some("comment-1"));

    let captions = stub.captions.lock().unwrap().clone();
    assert_eq!(captions.len(), 1);
    assert!(captions[0].contains(SHEET));
    assert!(captions[0].ends_with("#DnD #TTRPG"));

    let hits = stub.hit_names();
    assert!(hits.contains(&"feed".to_string()));
    assert!(hits.contains(&"comments".to_string()));
}

#[tokio::test]
async fn full_cycle_publishes_portrait_to_all_sinks() {
    let (host, stub) = start_stub(false, 0).await;
    let dir = tempfile::tempdir().unwrap();
    let mut args = base_args(&host, dir.path());
    args.skip_image = false;
    args.fb_page_id = Some("page-1".to_string());
    args.fb_access_token = Some("fb-token".to_string());
    args.drive_token = Some("drive-token".to_string());
    args.drive_folder_id = Some("folder-1".to_string());
    args.webhook_url = Some(format!("{}/hook", host));

    let client = http_client(10).unwrap();
    let status = StatusHandle::new();
    let running = AtomicBool::new(true);

    let report = run_cycle(&args, &client, &status, &running).await.unwrap();

    assert_eq!(report.facebook_post_id.as_deref(), Some("987_654"));
    assert_eq!(
        report.drive_link.as_deref(),
        Some("https://drive.example/view/drv-1")
    );
    assert!(report.webhook_delivered);
    assert!(report.archived);

    let hits = stub.hit_names();
    assert!(hits.contains(&"images".to_string()));
    assert!(hits.contains(&"download".to_string()));
    assert!(hits.contains(&"photos".to_string()));
    assert!(hits.contains(&"drive".to_string()));
    assert!(hits.contains(&"webhook".to_string()));

    // Per-cycle scratch artifacts are removed once the cycle ends.
    let leftovers: Vec<_> = std::fs::read_dir(&args.artifact_dir)
        .map(|rd| rd.collect())
        .unwrap_or_default();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn generation_failure_aborts_before_any_downstream_call() {
    let (host, stub) = start_stub(true, 0).await;
    let dir = tempfile::tempdir().unwrap();
    let mut args = base_args(&host, dir.path());
    args.skip_image = false;
    args.fb_page_id = Some("page-1".to_string());
    args.fb_access_token = Some("fb-token".to_string());

    let client = http_client(10).unwrap();
    let status = StatusHandle::new();
    let running = AtomicBool::new(true);

    let err = run_cycle(&args, &client, &status, &running)
        .await
        .unwrap_err();
    assert!(matches!(err, CycleError::Generation(_)));

    // Nothing downstream ran and nothing was archived.
    assert_eq!(stub.hit_names(), vec!["chat"]);
    assert!(archive::read_recent(Path::new(&args.archive_file), 10).is_empty());
}

#[tokio::test]
async fn second_trigger_is_rejected_while_a_cycle_runs() {
    let (host, _stub) = start_stub(false, 300).await;
    let dir = tempfile::tempdir().unwrap();
    let args = base_args(&host, dir.path());
    let archive_file = args.archive_file.clone();

    let running = Arc::new(AtomicBool::new(true));
    let runner = Arc::new(CycleRunner::new(args, StatusHandle::new(), running).unwrap());

    assert!(runner.try_start());
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(runner.is_busy());
    assert!(!runner.try_start(), "second trigger must report busy");

    for _ in 0..200 {
        if !runner.is_busy() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(!runner.is_busy(), "cycle did not finish in time");

    // Exactly one cycle executed.
    let status = runner.status.snapshot().await;
    assert_eq!(status.cycles_completed, 1);
    assert_eq!(status.cycles_failed, 0);
    assert_eq!(
        archive::read_recent(Path::new(&archive_file), 10).len(),
        1
    );
}
