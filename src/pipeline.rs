/*
    Content generation and publishing pipeline.

    One cycle runs the strict sequence: generate sheet -> extract
    fields -> render portrait -> (narrate -> assemble video) ->
    publish to sinks -> record. Every step has its own failure
    policy; sinks are independent of each other.
*/

use crate::args::Args;
use crate::openai_api::{Message, OpenAIRequest};
use crate::status::{CycleStage, StatusHandle};
use crate::{
    archive, character, clip_words, elevenlabs_tts, facebook, gdrive, google_tts, openai_api,
    openai_image, video, webhook, ApiError,
};
use chrono::Local;
use log::{debug, error, info, warn};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use uuid::Uuid;

#[derive(Debug)]
pub enum CycleError {
    Generation(String),
    Audio(String),
    Video(String),
    Artifact(String),
    Cancelled,
}

impl std::fmt::Display for CycleError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            CycleError::Generation(msg) => write!(f, "character generation failed: {}", msg),
            CycleError::Audio(msg) => write!(f, "narration synthesis failed: {}", msg),
            CycleError::Video(msg) => write!(f, "video assembly failed: {}", msg),
            CycleError::Artifact(msg) => write!(f, "artifact handling failed: {}", msg),
            CycleError::Cancelled => write!(f, "cycle cancelled by shutdown"),
        }
    }
}

impl std::error::Error for CycleError {}

/// What one finished cycle produced. Sinks that were skipped or
/// failed stay None; their failure never aborts the cycle.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub character: String,
    pub race: String,
    pub class: String,
    pub facebook_post_id: Option<String>,
    pub comment_id: Option<String>,
    pub drive_link: Option<String>,
    pub webhook_delivered: bool,
    pub archived: bool,
}

impl CycleReport {
    pub fn summary(&self) -> String {
        format!(
            "{} {} | post={} drive={} webhook={} archived={}",
            self.race,
            self.class,
            self.facebook_post_id.as_deref().unwrap_or("-"),
            self.drive_link.as_deref().unwrap_or("-"),
            if self.webhook_delivered { "yes" } else { "no" },
            if self.archived { "yes" } else { "no" },
        )
    }
}

/// Per-cycle scratch directory under the artifact dir. Unique name
/// per cycle so overlapping cycles can never collide on artifact
/// paths; removed when the cycle ends, success or not.
struct Scratch {
    dir: PathBuf,
}

impl Scratch {
    fn create(base: &str, cycle_id: &str) -> Result<Self, CycleError> {
        let dir = Path::new(base).join(cycle_id);
        std::fs::create_dir_all(&dir)
            .map_err(|e| CycleError::Artifact(format!("creating {}: {}", dir.display(), e)))?;
        Ok(Scratch { dir })
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

fn check_running(running: &AtomicBool) -> Result<(), CycleError> {
    if running.load(Ordering::SeqCst) {
        Ok(())
    } else {
        Err(CycleError::Cancelled)
    }
}

/// Run one complete content cycle.
pub async fn run_cycle(
    args: &Args,
    client: &Client,
    status: &StatusHandle,
    running: &AtomicBool,
) -> Result<CycleReport, CycleError> {
    let cycle_id = Uuid::new_v4().simple().to_string();
    info!("Cycle {} starting", cycle_id);

    let api_key = args
        .openai_api_key
        .clone()
        .ok_or_else(|| CycleError::Generation("OPENAI_API_KEY is not configured".to_string()))?;

    check_running(running)?;
    status.set_stage(CycleStage::Generating).await;
    let messages = vec![
        Message {
            role: "system".to_string(),
            content: args.system_prompt.clone(),
        },
        Message {
            role: "user".to_string(),
            content: args.character_prompt.clone(),
        },
    ];
    let request = OpenAIRequest {
        model: &args.llm_model,
        messages: &messages,
        temperature: args.temperature,
        max_tokens: args.max_tokens,
    };
    let sheet = openai_api::completion(client, &args.llm_host, &api_key, request)
        .await
        .map_err(|e| CycleError::Generation(e.to_string()))?;
    debug!("Cycle {} sheet:\n{}", cycle_id, sheet);

    check_running(running)?;
    status.set_stage(CycleStage::Extracting).await;
    let (race, class) = character::extract_race_and_class(&sheet);
    info!("Cycle {} rolled a {} {}", cycle_id, race, class);

    let scratch = Scratch::create(&args.artifact_dir, &cycle_id)?;

    let mut image_url: Option<String> = None;
    let mut portrait: Option<PathBuf> = None;
    if args.skip_image {
        debug!("Portrait step disabled");
    } else {
        check_running(running)?;
        status.set_stage(CycleStage::ImageRendering).await;
        match render_portrait(args, client, &api_key, &race, &class, &scratch).await {
            Ok((url, path)) => {
                image_url = Some(url);
                portrait = Some(path);
            }
            Err(e) => warn!(
                "Cycle {}: portrait failed, continuing text-only: {}",
                cycle_id, e
            ),
        }
    }

    let mut reel: Option<PathBuf> = None;
    if args.video {
        if let Some(portrait_path) = &portrait {
            check_running(running)?;
            status.set_stage(CycleStage::AudioRendering).await;
            if let Some(audio_path) = narration_audio(args, client, &sheet, &scratch).await? {
                check_running(running)?;
                status.set_stage(CycleStage::VideoAssembling).await;
                let output = scratch.path("reel.mp4");
                video::assemble(
                    portrait_path,
                    &audio_path,
                    &output,
                    args.video_fps,
                    args.video_timeout_secs,
                )
                .await
                .map_err(|e| CycleError::Video(e.to_string()))?;
                reel = Some(output);
            }
        } else {
            warn!(
                "Cycle {}: video requested but no portrait available, skipping",
                cycle_id
            );
        }
    }

    check_running(running)?;
    status.set_stage(CycleStage::Publishing).await;
    let caption = character::build_caption(&sheet, &args.hashtags);
    let mut report = CycleReport {
        character: sheet.clone(),
        race,
        class,
        ..Default::default()
    };

    match (&args.fb_page_id, &args.fb_access_token) {
        (Some(page_id), Some(token)) => {
            let posted = match &portrait {
                Some(path) => {
                    facebook::post_photo(client, &args.graph_host, page_id, token, &caption, path)
                        .await
                }
                None => {
                    facebook::post_feed(client, &args.graph_host, page_id, token, &caption).await
                }
            };
            match posted {
                Ok(post_id) => {
                    info!("Cycle {} posted to Facebook as {}", cycle_id, post_id);
                    let comment = character::trivia_comment(args.subscribe_link.as_deref());
                    match facebook::post_comment(client, &args.graph_host, &post_id, token, &comment)
                        .await
                    {
                        Ok(comment_id) => report.comment_id = Some(comment_id),
                        Err(e) => warn!("Follow-up comment failed: {}", e),
                    }
                    report.facebook_post_id = Some(post_id);
                }
                Err(e) => warn!("Facebook publish failed: {}", e),
            }
        }
        (None, None) => debug!("Facebook not configured, skipping social publish"),
        _ => warn!("Facebook credentials incomplete, skipping social publish"),
    }

    match (&args.drive_token, &args.drive_folder_id) {
        (Some(token), Some(folder)) => {
            let upload_target = reel
                .as_deref()
                .map(|p| (p, "video/mp4"))
                .or(portrait.as_deref().map(|p| (p, "image/png")));
            match upload_target {
                Some((path, mime)) => {
                    match gdrive::upload(client, &args.drive_host, token, folder, path, mime).await
                    {
                        Ok(file) => {
                            info!("Cycle {} uploaded artifact to Drive: {}", cycle_id, file.link());
                            report.drive_link = Some(file.link());
                        }
                        Err(e) => warn!("Drive upload failed: {}", e),
                    }
                }
                None => debug!("No artifact to upload to Drive"),
            }
        }
        (None, None) => debug!("Drive not configured, skipping storage upload"),
        _ => warn!("Drive credentials incomplete, skipping storage upload"),
    }

    if let Some(url) = &args.webhook_url {
        let payload = webhook::Payload {
            caption: &caption,
            image_url: image_url.as_deref(),
        };
        match webhook::send(client, url, &payload).await {
            Ok(()) => report.webhook_delivered = true,
            Err(e) => warn!("Webhook forward failed: {}", e),
        }
    }

    status.set_stage(CycleStage::Recording).await;
    let record = archive::PostRecord {
        timestamp: Local::now(),
        text: sheet,
        post_id: report.facebook_post_id.clone(),
        drive_link: report.drive_link.clone(),
    };
    match archive::append(Path::new(&args.archive_file), &record) {
        Ok(()) => report.archived = true,
        // The publish already happened; a failed append must not
        // discard it.
        Err(e) => warn!("Archive append failed: {}", e),
    }

    info!("Cycle {} finished: {}", cycle_id, report.summary());
    Ok(report)
}

/// Portrait step: one attempt with the character prompt, one retry
/// with the generic fallback prompt, then the cycle degrades to a
/// text-only publish.
async fn render_portrait(
    args: &Args,
    client: &Client,
    api_key: &str,
    race: &str,
    class: &str,
    scratch: &Scratch,
) -> Result<(String, PathBuf), ApiError> {
    let prompt = character::build_image_prompt(race, class);
    let url = match openai_image::generate(
        client,
        &args.image_host,
        api_key,
        &args.image_model,
        &prompt,
        &args.image_size,
    )
    .await
    {
        Ok(url) => url,
        Err(e) => {
            warn!(
                "Portrait generation failed, retrying with fallback prompt: {}",
                e
            );
            openai_image::generate(
                client,
                &args.image_host,
                api_key,
                &args.image_model,
                character::FALLBACK_IMAGE_PROMPT,
                &args.image_size,
            )
            .await?
        }
    };

    let path = scratch.path("portrait.png");
    openai_image::download(client, &url, &path).await?;
    Ok((url, path))
}

/// Narration step: clip the backstory to the configured word budget
/// and synthesize it with whichever TTS vendor has credentials,
/// ElevenLabs first. No vendor configured means no narration, which
/// skips the video step.
async fn narration_audio(
    args: &Args,
    client: &Client,
    sheet: &str,
    scratch: &Scratch,
) -> Result<Option<PathBuf>, CycleError> {
    let narration = character::extract_field(sheet, "backstory").unwrap_or_else(|| sheet.to_string());
    let narration = clip_words(&narration, args.backstory_max_words);
    if narration.is_empty() {
        return Ok(None);
    }

    let audio = if let Some(key) = &args.elevenlabs_api_key {
        elevenlabs_tts::tts(
            client,
            &args.elevenlabs_host,
            key,
            &args.elevenlabs_voice_id,
            elevenlabs_tts::Request::new(&narration),
        )
        .await
        .map_err(|e| CycleError::Audio(e.to_string()))?
    } else if let Some(token) = &args.google_tts_token {
        google_tts::tts(
            client,
            &args.google_tts_host,
            token,
            google_tts::Request::new(
                &narration,
                &args.tts_language,
                &args.tts_voice,
                args.tts_pitch,
                args.tts_speaking_rate,
            ),
        )
        .await
        .map_err(|e| CycleError::Audio(e.to_string()))?
    } else {
        warn!("No TTS credentials configured, skipping narration and video");
        return Ok(None);
    };

    let path = scratch.path("narration.mp3");
    std::fs::write(&path, &audio)
        .map_err(|e| CycleError::Artifact(format!("writing {}: {}", path.display(), e)))?;
    Ok(Some(path))
}

/// Owns the shared pieces of the bot and enforces at-most-one
/// concurrent cycle through a single-permit semaphore. Both the
/// scheduler and the manual trigger go through `try_start`.
pub struct CycleRunner {
    args: Args,
    client: Client,
    pub status: StatusHandle,
    running: Arc<AtomicBool>,
    gate: Arc<Semaphore>,
}

impl CycleRunner {
    pub fn new(
        args: Args,
        status: StatusHandle,
        running: Arc<AtomicBool>,
    ) -> Result<Self, ApiError> {
        let client = crate::http_client(args.http_timeout_secs)?;
        Ok(CycleRunner {
            args,
            client,
            status,
            running,
            gate: Arc::new(Semaphore::new(1)),
        })
    }

    pub fn args(&self) -> &Args {
        &self.args
    }

    /// Launch a cycle on its own task, fire-and-forget. Returns false
    /// without starting anything when a cycle is already mid-flight.
    pub fn try_start(self: &Arc<Self>) -> bool {
        let permit = match self.gate.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => return false,
        };
        let runner = Arc::clone(self);
        tokio::spawn(async move {
            let _permit = permit;
            runner.run_once().await;
        });
        true
    }

    pub fn is_busy(&self) -> bool {
        self.gate.available_permits() == 0
    }

    async fn run_once(&self) {
        let started = Local::now();
        match run_cycle(&self.args, &self.client, &self.status, &self.running).await {
            Ok(report) => {
                self.status.record_success(started, report.summary()).await;
            }
            Err(e) => {
                error!("Cycle aborted: {}", e);
                self.status.record_failure(started, e.to_string()).await;
            }
        }
    }
}
