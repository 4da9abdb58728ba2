use parking_lot::Mutex;
use serde::Serialize;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use tracing::debug;

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct SpeakResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SpeakResult {
    fn ok() -> Self {
        Self { ok: true, message: None }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: Some(message.into()),
        }
    }
}

pub trait SpeechEngine: Send + Sync {
    fn is_available(&self) -> bool;
    /// Stops whatever is currently being spoken.
    fn cancel(&self);
    fn speak(&self, text: &str) -> Result<(), String>;
}

/// Speaks `text`, superseding any utterance still in flight. Never fails
/// past this point; problems come back as a readable message.
pub fn speak(engine: &dyn SpeechEngine, text: &str) -> SpeakResult {
    if !engine.is_available() {
        return SpeakResult::failed("TTS not supported on this system.");
    }
    let clean = text.trim();
    if clean.is_empty() {
        return SpeakResult::failed("Nothing to speak.");
    }
    engine.cancel();
    match engine.speak(clean) {
        Ok(()) => SpeakResult::ok(),
        Err(reason) if reason.is_empty() => SpeakResult::failed("Speech failed."),
        Err(reason) => SpeakResult::failed(format!("Speech failed ({reason}).")),
    }
}

/// No speech support.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSpeech;

impl SpeechEngine for SilentSpeech {
    fn is_available(&self) -> bool {
        false
    }

    fn cancel(&self) {}

    fn speak(&self, _text: &str) -> Result<(), String> {
        Err("no speech engine".to_string())
    }
}

/// Speaks through an external program such as `espeak-ng -v ar <text>`.
pub struct CommandSpeech {
    program: String,
    args: Vec<String>,
    current: Mutex<Option<Child>>,
}

impl CommandSpeech {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            current: Mutex::new(None),
        }
    }

    pub fn arabic_espeak() -> Self {
        Self::new("espeak-ng", vec!["-v".to_string(), "ar".to_string()])
    }

    fn resolve(&self) -> Option<PathBuf> {
        let direct = PathBuf::from(&self.program);
        if direct.components().count() > 1 {
            return direct.is_file().then_some(direct);
        }
        let path = std::env::var_os("PATH")?;
        std::env::split_paths(&path)
            .map(|dir| dir.join(&self.program))
            .find(|candidate| candidate.is_file())
    }
}

impl SpeechEngine for CommandSpeech {
    fn is_available(&self) -> bool {
        self.resolve().is_some()
    }

    fn cancel(&self) {
        if let Some(mut child) = self.current.lock().take() {
            if let Ok(None) = child.try_wait() {
                debug!(pid = child.id(), "cancelling utterance");
                let _ = child.kill();
            }
            let _ = child.wait();
        }
    }

    fn speak(&self, text: &str) -> Result<(), String> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| e.kind().to_string())?;
        *self.current.lock() = Some(child);
        Ok(())
    }
}

impl Drop for CommandSpeech {
    fn drop(&mut self) {
        if let Some(mut child) = self.current.get_mut().take() {
            let _ = child.wait();
        }
    }
}
