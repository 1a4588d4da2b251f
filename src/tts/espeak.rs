//! Offline synthesis through `espeak-ng`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::synthesizer::{SpeechSynthesizer, SynthesisError, NARRATION_WAV};
use crate::config::TtsConfig;
use crate::media::{locate_tool, run_tool};

const TEXT_FILE: &str = "narration.txt";

/// Runs `espeak-ng -v <voice> -s <wpm> -w narration.wav -f narration.txt`.
///
/// The text goes through a file rather than argv so long documents do not hit
/// the platform's argument length limit.
#[derive(Debug, Clone)]
pub struct EspeakSynthesizer {
    program: PathBuf,
    voice: Option<String>,
    words_per_minute: u32,
}

impl EspeakSynthesizer {
    pub fn from_config(config: &TtsConfig) -> Self {
        Self {
            program: locate_tool(config.espeak_path.as_deref(), "espeak-ng"),
            voice: config.voice.clone(),
            words_per_minute: config.words_per_minute,
        }
    }

    #[must_use]
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Argument list for one run. The configured voice overrides `language`.
    pub fn args(&self, language: &str, text_file: &Path, wav: &Path) -> Vec<OsString> {
        let voice = self.voice.as_deref().unwrap_or(language);
        let mut args: Vec<OsString> = vec!["-v".into(), voice.into()];
        if self.words_per_minute > 0 {
            args.push("-s".into());
            args.push(self.words_per_minute.to_string().into());
        }
        args.push("-w".into());
        args.push(wav.into());
        args.push("-f".into());
        args.push(text_file.into());
        args
    }
}

#[async_trait]
impl SpeechSynthesizer for EspeakSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        language: &str,
        dir: &Path,
    ) -> Result<PathBuf, SynthesisError> {
        let text_file = dir.join(TEXT_FILE);
        tokio::fs::write(&text_file, text)
            .await
            .map_err(|source| SynthesisError::Io {
                path: text_file.clone(),
                source,
            })?;

        let wav = dir.join(NARRATION_WAV);
        let output = run_tool(&self.program, &self.args(language, &text_file, &wav)).await?;
        if !output.success {
            return Err(SynthesisError::Failed {
                code: output.code,
                diagnostics: output.diagnostics(),
            });
        }

        log::info!("tts: espeak-ng wrote {}", wav.display());
        Ok(wav)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_use_language_as_voice() {
        let synth = EspeakSynthesizer::from_config(&TtsConfig::default());
        let args: Vec<String> = synth
            .args("de", Path::new("/j/narration.txt"), Path::new("/j/narration.wav"))
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "-v",
                "de",
                "-s",
                "160",
                "-w",
                "/j/narration.wav",
                "-f",
                "/j/narration.txt"
            ]
        );
    }

    #[test]
    fn configured_voice_overrides_language() {
        let config = TtsConfig {
            voice: Some("en-us+f3".into()),
            words_per_minute: 0,
            ..TtsConfig::default()
        };
        let args = EspeakSynthesizer::from_config(&config).args(
            "en",
            Path::new("t.txt"),
            Path::new("w.wav"),
        );
        assert_eq!(args[1], "en-us+f3");
        assert!(!args.iter().any(|a| a == "-s"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_synthesizer_reports_diagnostics() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-espeak");
        std::fs::write(&script, "#!/bin/sh\necho 'unknown voice: xx' >&2\nexit 1\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let synth = EspeakSynthesizer::from_config(&TtsConfig::default()).with_program(&script);
        match synth.synthesize("hello", "xx", dir.path()).await {
            Err(SynthesisError::Failed { code, diagnostics }) => {
                assert_eq!(code, Some(1));
                assert_eq!(diagnostics, "unknown voice: xx\n");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
        assert_eq!(
            std::fs::read_to_string(dir.path().join(TEXT_FILE)).unwrap(),
            "hello"
        );
    }
}
