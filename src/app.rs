use tokio::task::JoinHandle;

use crate::config::Config;
use crate::gemini::{CompletionError, GeminiClient, GenerationConfig, DEFAULT_MODEL};
use crate::markup;
use crate::session::{Session, TurnPlan};
use crate::speech::{Recognizer, Synthesizer};
use crate::theme::ThemeMode;

/// Shown as the assistant reply when no API credential is configured.
pub const MISSING_KEY_NOTICE: &str = "<p>No Gemini API key is configured. \
Set <strong>GEMINI_API_KEY</strong> or add it to the config file, then try again.</p>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modal {
    About,
    Privacy,
    Terms,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub session: Session,

    // Input state
    pub input: String,
    pub input_cursor: usize, // cursor position in input, in chars

    // Chat viewport
    pub chat_scroll: u16,
    pub chat_height: u16, // inner height of chat area for scroll calculations
    pub chat_width: u16,  // inner width of chat area for wrap calculations

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // UI-local state
    pub theme: ThemeMode,
    pub active_modal: Option<Modal>,
    pub status: Option<String>,

    // Remote completion
    pub client: Option<GeminiClient>,
    pub generation: GenerationConfig,
    pub reply_task: Option<JoinHandle<Result<String, CompletionError>>>,

    // Speech I/O (both optional)
    pub synthesizer: Option<Synthesizer>,
    pub recognizer: Option<Recognizer>,
    pub listening: bool,
    pub listen_task: Option<JoinHandle<anyhow::Result<String>>>,
}

impl App {
    pub fn new(
        config: &Config,
        model_override: Option<String>,
        theme_override: Option<ThemeMode>,
    ) -> Self {
        let model = model_override
            .or_else(|| config.model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let client = config
            .resolve_api_key()
            .map(|key| GeminiClient::with_model(&key, &model));
        if client.is_none() {
            tracing::warn!("no Gemini API key configured");
        }

        let theme = theme_override
            .or_else(|| config.theme_mode())
            .unwrap_or_default();

        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            session: Session::with_greeting(),

            input: String::new(),
            input_cursor: 0,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            animation_frame: 0,

            theme,
            active_modal: None,
            status: None,

            client,
            generation: GenerationConfig::default(),
            reply_task: None,

            synthesizer: Synthesizer::detect(config),
            recognizer: Recognizer::detect(config),
            listening: false,
            listen_task: None,
        }
    }

    /// Submit one message through the session controller. Gated on the
    /// pending flag so a second submission during an in-flight call is
    /// ignored; the controller itself does not enforce this.
    pub fn submit(&mut self, text: &str) {
        if self.session.is_pending() || self.reply_task.is_some() {
            return;
        }

        match self.session.begin_turn(text) {
            None => {}
            Some(TurnPlan::Refused) => {
                self.scroll_chat_to_bottom();
            }
            Some(TurnPlan::Forward(request)) => {
                self.scroll_chat_to_bottom();
                match &self.client {
                    Some(client) => {
                        let client = client.clone();
                        let generation = self.generation;
                        self.reply_task = Some(tokio::spawn(async move {
                            client.complete(&request, &generation).await
                        }));
                    }
                    None => {
                        self.session.resolve_turn_with_notice(MISSING_KEY_NOTICE);
                    }
                }
            }
        }
    }

    /// Reap finished background tasks. Called on every tick.
    pub async fn poll_tasks(&mut self) {
        if self.reply_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.reply_task.take() {
                let outcome = match task.await {
                    Ok(outcome) => outcome,
                    Err(err) => Err(CompletionError::Aborted(err.to_string())),
                };
                self.session.resolve_turn(outcome);
                self.scroll_chat_to_bottom();
            }
        }

        if self.listen_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.listen_task.take() {
                self.listening = false;
                match task.await {
                    Ok(Ok(transcript)) if !transcript.is_empty() => {
                        self.status = None;
                        self.submit(&transcript);
                    }
                    Ok(Ok(_)) => self.set_status("No speech detected"),
                    Ok(Err(err)) => {
                        tracing::warn!(error = %err, "transcription failed");
                        self.set_status("Voice input failed");
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "listen task aborted");
                        self.set_status("Voice input failed");
                    }
                }
            }
        }
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        if let Err(err) = Config::save_theme(self.theme) {
            tracing::warn!(error = %err, "failed to persist theme preference");
        }
    }

    /// Start capturing one spoken message. Disabled with a notice when no
    /// transcriber is available; an in-flight capture cannot be cancelled.
    pub fn toggle_voice_input(&mut self) {
        if self.listening {
            return;
        }
        match &self.recognizer {
            None => self.set_status("Voice input isn't available on this system"),
            Some(recognizer) => {
                let recognizer = recognizer.clone();
                self.listening = true;
                self.set_status("Listening...");
                self.listen_task = Some(tokio::spawn(async move { recognizer.listen().await }));
            }
        }
    }

    /// Speak the most recent assistant reply, if speech output is available.
    pub fn speak_last_reply(&mut self) {
        match &self.synthesizer {
            None => self.set_status("Speech output isn't available on this system"),
            Some(synthesizer) => {
                if let Some(text) = self.session.last_assistant_text() {
                    synthesizer.speak(text);
                }
            }
        }
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.is_pending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Scroll the chat so the newest message (or the thinking indicator) is
    /// visible. Line counts are estimated from wrapped plain text, matching
    /// how the paragraph widget wraps.
    pub fn scroll_chat_to_bottom(&mut self) {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;
        for message in self.session.messages() {
            total_lines += 1; // label line
            let plain = markup::strip_markup(&message.text);
            for line in plain.lines() {
                let char_count = line.chars().count();
                total_lines += ((char_count / wrap_width) + 1) as u16;
            }
            total_lines += 2; // timestamp line + blank line after message
        }

        if self.session.is_pending() {
            total_lines += 2; // label + "Thinking..."
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        if total_lines > visible_height {
            self.chat_scroll = total_lines.saturating_sub(visible_height);
        } else {
            self.chat_scroll = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Origin, REFUSAL_MESSAGE};

    fn test_app() -> App {
        App::new(&Config::new(), None, None)
    }

    #[tokio::test]
    async fn refused_submission_stays_idle() {
        let mut app = test_app();
        app.submit("what is the price of this laptop");
        assert!(!app.session.is_pending());
        assert!(app.reply_task.is_none());
        assert_eq!(app.session.last_assistant_text(), Some(REFUSAL_MESSAGE));
    }

    #[tokio::test]
    async fn missing_key_resolves_with_notice() {
        let mut app = test_app();
        app.client = None;
        app.submit("I've been feeling anxious lately");
        assert!(!app.session.is_pending());
        assert_eq!(app.session.last_assistant_text(), Some(MISSING_KEY_NOTICE));
    }

    #[tokio::test]
    async fn submission_is_gated_while_pending() {
        let mut app = test_app();
        app.client = Some(GeminiClient::new("test-key"));
        app.submit("I had a rough day");
        assert!(app.session.is_pending());
        let count = app.session.messages().len();

        app.submit("another message while pending");
        assert_eq!(app.session.messages().len(), count);

        if let Some(task) = app.reply_task.take() {
            task.abort();
        }
    }

    #[tokio::test]
    async fn empty_submission_is_a_no_op() {
        let mut app = test_app();
        let count = app.session.messages().len();
        app.submit("   ");
        assert_eq!(app.session.messages().len(), count);
        assert!(!app.session.is_pending());
    }

    #[test]
    fn greeting_is_seeded() {
        let app = test_app();
        assert_eq!(app.session.messages().len(), 1);
        assert_eq!(app.session.messages()[0].origin, Origin::Assistant);
    }
}
