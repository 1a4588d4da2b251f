//! doc-narrator: turn a document into a narrated, subtitled video.

pub mod audio;
pub mod config;
pub mod content;
pub mod media;
pub mod pipeline;
pub mod stt;
pub mod subtitle;
pub mod tts;
