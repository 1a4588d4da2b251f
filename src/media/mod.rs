//! External media toolkit: probing, transcoding and the final mux.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              MediaEncoder (trait)            │
//! │                                              │
//! │   probe_duration ── ffprobe -print_format json
//! │   transcode_to_wav ─ ffmpeg … -ac 1 pcm_s16le│
//! │   mux ────────────── ffmpeg … -shortest      │
//! └──────────────────────┬───────────────────────┘
//!                        ▼
//!              run_tool (kill_on_drop)
//! ```

pub mod encoder;
pub mod ffmpeg;
pub mod process;

pub use encoder::{MediaEncoder, MuxError, MuxRequest, ProbeError, TranscodeError, VideoAsset};
pub use ffmpeg::{escape_filter_value, parse_probe_duration, FfmpegEncoder};
pub use process::{locate_tool, run_tool, ToolError, ToolOutput};
