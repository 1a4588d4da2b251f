//! ffmpeg / ffprobe implementation of [`MediaEncoder`].
//!
//! Mux command line:
//!
//! ```text
//! ffmpeg -hide_banner -y -i <video> -i <narration.wav>
//!        -vf subtitles=<narration.srt>
//!        -c:v libx264 -c:a aac
//!        -map 0:v:0 -map 1:a:0 -shortest <output>
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use super::encoder::{MediaEncoder, MuxError, MuxRequest, ProbeError, TranscodeError};
use super::process::{locate_tool, run_tool};
use crate::config::MediaConfig;

/// Runs the `ffmpeg` and `ffprobe` binaries.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    ffmpeg_path: PathBuf,
    ffprobe_path: PathBuf,
    video_codec: String,
    audio_codec: String,
}

impl FfmpegEncoder {
    /// Locate the binaries (config override → `PATH` → bare name).
    pub fn from_config(config: &MediaConfig) -> Self {
        Self {
            ffmpeg_path: locate_tool(config.ffmpeg_path.as_deref(), "ffmpeg"),
            ffprobe_path: locate_tool(config.ffprobe_path.as_deref(), "ffprobe"),
            video_codec: config.video_codec.clone(),
            audio_codec: config.audio_codec.clone(),
        }
    }

    /// Specify a custom ffmpeg binary.
    #[must_use]
    pub fn with_ffmpeg_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ffmpeg_path = path.into();
        self
    }

    /// Specify a custom ffprobe binary.
    #[must_use]
    pub fn with_ffprobe_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ffprobe_path = path.into();
        self
    }

    pub fn ffmpeg_path(&self) -> &Path {
        &self.ffmpeg_path
    }

    /// Build the mux argument list.
    pub fn mux_args(&self, request: &MuxRequest<'_>) -> Vec<OsString> {
        let mut filter = OsString::from("subtitles=");
        filter.push(escape_filter_value(&request.subtitles.to_string_lossy()));

        let mut args: Vec<OsString> = vec!["-hide_banner".into(), "-y".into()];
        args.push("-i".into());
        args.push(request.video.into());
        args.push("-i".into());
        args.push(request.audio.into());
        args.push("-vf".into());
        args.push(filter);
        args.extend(
            [
                "-c:v",
                self.video_codec.as_str(),
                "-c:a",
                self.audio_codec.as_str(),
                "-map",
                "0:v:0",
                "-map",
                "1:a:0",
                "-shortest",
            ]
            .iter()
            .map(OsString::from),
        );
        args.push(request.output.into());
        args
    }
}

#[async_trait]
impl MediaEncoder for FfmpegEncoder {
    async fn probe_duration(&self, video: &Path) -> Result<f64, ProbeError> {
        let args: Vec<OsString> = vec![
            "-v".into(),
            "error".into(),
            "-show_entries".into(),
            "format=duration".into(),
            "-print_format".into(),
            "json".into(),
            video.into(),
        ];

        let output = run_tool(&self.ffprobe_path, &args).await?;
        if !output.success {
            return Err(ProbeError::Failed {
                code: output.code,
                diagnostics: output.diagnostics(),
            });
        }

        parse_probe_duration(&String::from_utf8_lossy(&output.stdout))
    }

    async fn transcode_to_wav(&self, input: &Path, output: &Path) -> Result<(), TranscodeError> {
        let args: Vec<OsString> = vec![
            "-hide_banner".into(),
            "-y".into(),
            "-i".into(),
            input.into(),
            "-vn".into(),
            "-ac".into(),
            "1".into(),
            "-c:a".into(),
            "pcm_s16le".into(),
            output.into(),
        ];

        let result = run_tool(&self.ffmpeg_path, &args).await?;
        if !result.success {
            return Err(TranscodeError::Failed {
                code: result.code,
                diagnostics: result.diagnostics(),
            });
        }
        Ok(())
    }

    async fn mux(&self, request: &MuxRequest<'_>) -> Result<(), MuxError> {
        let args = self.mux_args(request);
        let result = run_tool(&self.ffmpeg_path, &args).await?;

        if !result.success {
            let diagnostics = result.diagnostics();
            log::error!("media: encoder failed ({:?}):\n{diagnostics}", result.code);
            return Err(MuxError::EncoderFailed {
                code: result.code,
                diagnostics,
            });
        }

        if !request.output.is_file() {
            return Err(MuxError::MissingOutput(request.output.to_path_buf()));
        }

        log::info!("media: muxed {}", request.output.display());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ProbeReport {
    format: Option<ProbeFormat>,
}

#[derive(Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Pull `format.duration` out of `ffprobe -print_format json` output.
pub fn parse_probe_duration(json: &str) -> Result<f64, ProbeError> {
    let report: ProbeReport =
        serde_json::from_str(json).map_err(|e| ProbeError::Parse(e.to_string()))?;

    let raw = report
        .format
        .and_then(|f| f.duration)
        .ok_or(ProbeError::MissingDuration)?;

    raw.trim()
        .parse::<f64>()
        .map_err(|e| ProbeError::Parse(format!("duration {raw:?}: {e}")))
}

/// Escape a value for use inside an ffmpeg filtergraph.
///
/// Two levels apply: the filter option value (`\ ' :`) and then the graph
/// itself (`\ ' [ ] , ;`).
pub fn escape_filter_value(value: &str) -> String {
    fn escape(input: &str, special: &[char]) -> String {
        let mut out = String::with_capacity(input.len());
        for c in input.chars() {
            if special.contains(&c) {
                out.push('\\');
            }
            out.push(c);
        }
        out
    }

    let option_level = escape(value, &['\\', '\'', ':']);
    escape(&option_level, &['\\', '\'', '[', ']', ',', ';'])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
