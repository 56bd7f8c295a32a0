use anyhow::{bail, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use mindmate::app::App;
use mindmate::config::Config;
use mindmate::gemini::{GeminiClient, GenerationConfig, DEFAULT_MODEL};
use mindmate::markup;
use mindmate::session::{Session, TurnPlan};
use mindmate::theme::ThemeMode;
use mindmate::tui::{self, EventHandler, Tui};
use mindmate::{handler, ui};

#[derive(Parser)]
#[command(name = "mindmate")]
#[command(about = "Emotional support chat companion for your terminal, powered by Gemini")]
struct Cli {
    /// Gemini model to use
    #[arg(long)]
    model: Option<String>,

    /// Start with this theme instead of the saved preference (light or dark)
    #[arg(long, value_parser = parse_theme)]
    theme: Option<ThemeMode>,

    /// Ask one question and print the reply without entering the TUI
    #[arg(long)]
    ask: Option<String>,

    /// Write logs to this file instead of the default location
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn parse_theme(value: &str) -> Result<ThemeMode, String> {
    ThemeMode::from_str(value)
        .ok_or_else(|| format!("unknown theme '{value}' (expected light or dark)"))
}

/// Logs go to a file; stdout and stderr belong to the TUI.
fn init_tracing(log_file: Option<PathBuf>) -> Result<()> {
    let path = match log_file {
        Some(path) => path,
        None => dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mindmate")
            .join("mindmate.log"),
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::File::options().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.log_file.clone())?;

    let config = Config::load().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "failed to load config, using defaults");
        Config::new()
    });

    if let Some(question) = cli.ask.as_deref() {
        return run_one_shot(&config, cli.model, question).await;
    }

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let mut app = App::new(&config, cli.model, cli.theme);

    let result = run(&mut app, &mut terminal, &mut events).await;
    tui::restore()?;
    result
}

async fn run(app: &mut App, terminal: &mut Tui, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;
        match events.next().await {
            Some(event) => handler::handle(app, event).await?,
            None => break,
        }
    }
    Ok(())
}

/// One full turn through the pipeline without the TUI: filter, prompt,
/// remote call, and the same refusal/fallback handling.
async fn run_one_shot(config: &Config, model: Option<String>, question: &str) -> Result<()> {
    let mut session = Session::new();

    match session.begin_turn(question) {
        None => bail!("nothing to ask"),
        Some(TurnPlan::Refused) => {}
        Some(TurnPlan::Forward(request)) => {
            let Some(api_key) = config.resolve_api_key() else {
                bail!("no Gemini API key configured; set GEMINI_API_KEY");
            };
            let model = model
                .or_else(|| config.model.clone())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string());
            let client = GeminiClient::with_model(&api_key, &model);
            let outcome = client.complete(&request, &GenerationConfig::default()).await;
            session.resolve_turn(outcome);
        }
    }

    if let Some(reply) = session.last_assistant_text() {
        println!("{}", markup::strip_markup(reply));
    }
    Ok(())
}
