/*
Video assembly: one still portrait plus a narration track becomes a
short MP4 through an ffmpeg subprocess. The encode is the only
CPU-bound step in a cycle and runs under a hard timeout so a hung
encoder cannot wedge the scheduler.
*/

use anyhow::{bail, Context, Result};
use log::{debug, warn};
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::time::Duration;

/// Encode `image` + `audio` into `output`. The video length follows
/// the audio track (`-shortest` with a looped still input).
pub async fn assemble(
    image: &Path,
    audio: &Path,
    output: &Path,
    fps: u32,
    timeout_secs: u64,
) -> Result<()> {
    let args: Vec<String> = vec![
        "-y".to_string(),
        "-v".to_string(),
        "error".to_string(),
        "-loop".to_string(),
        "1".to_string(),
        "-i".to_string(),
        image.to_string_lossy().into_owned(),
        "-i".to_string(),
        audio.to_string_lossy().into_owned(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-tune".to_string(),
        "stillimage".to_string(),
        "-preset".to_string(),
        "ultrafast".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-r".to_string(),
        fps.to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        "192k".to_string(),
        "-shortest".to_string(),
        output.to_string_lossy().into_owned(),
    ];

    debug!("Running ffmpeg {}", args.join(" "));

    let mut child = Command::new("ffmpeg")
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .context("spawning ffmpeg, is it installed?")?;

    let stderr = child
        .stderr
        .take()
        .context("ffmpeg stderr not captured")?;
    let stderr_task = tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        let mut collected = Vec::new();
        while let Ok(Some(line)) = lines.next_line().await {
            collected.push(line);
        }
        collected.join("\n")
    });

    let status = match tokio::time::timeout(Duration::from_secs(timeout_secs), child.wait()).await
    {
        Ok(result) => result.context("waiting for ffmpeg")?,
        Err(_) => {
            warn!("ffmpeg timed out after {}s, killing encoder", timeout_secs);
            let _ = child.kill().await;
            bail!("video encode timed out after {}s", timeout_secs);
        }
    };

    let stderr_output = stderr_task.await.unwrap_or_default();
    if !status.success() {
        bail!(
            "ffmpeg exited with {}: {}",
            status.code().unwrap_or(-1),
            stderr_output
        );
    }

    debug!("Video written to {}", output.display());
    Ok(())
}
