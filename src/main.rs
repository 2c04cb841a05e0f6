use std::{
    fs,
    io::{self, stdin},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use anyhow::Context;
use chrono::Utc;
use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use crossterm::{
    event::{
        DisableBracketedPaste, DisableFocusChange, EnableBracketedPaste, EnableFocusChange,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use judgeterm::{
    api::{HttpJudgeClient, JudgeApi},
    app::App,
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    editor::{Language, Theme},
    effects::Effects,
    journal::{format_entry, SubmissionJournal},
    poller::StatusPoller,
    runtime::{CrosstermEventSource, FixedTicker, JudgeEventSource, Runner, Ticker},
    ui,
};

const TICK_RATE_MS: u64 = 100;
const LOG_FILTER_ENV: &str = "JUDGETERM_LOG";

/// terminal code editor that submits to an online judge
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal code editor for timed judge problems: write a solution, submit it, and watch the verdict arrive."
)]
pub struct Cli {
    #[clap(subcommand)]
    command: Option<Commands>,

    /// problem to solve and submit against
    #[clap(short = 'p', long)]
    problem_id: Option<String>,

    /// judge server base url
    #[clap(short = 'u', long)]
    base_url: Option<String>,

    /// initial submission language
    #[clap(short = 'l', long, value_enum)]
    language: Option<Language>,

    /// editor colour theme
    #[clap(short = 't', long, value_enum)]
    theme: Option<Theme>,

    /// session cookie sent with every request
    #[clap(long, env = "JUDGETERM_SESSION", hide_env_values = true)]
    session: Option<String>,

    /// preload the editor with the contents of a file
    #[clap(short = 'f', long)]
    file: Option<PathBuf>,

    /// persist the merged settings as the new defaults
    #[clap(long)]
    save_config: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Commands {
    /// list recent submissions and their verdicts
    History {
        /// number of submissions to show
        #[clap(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },
}

impl Cli {
    /// Flags given on the command line win over the stored config.
    fn apply_to(&self, config: &mut Config) {
        if let Some(url) = &self.base_url {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(language) = self.language {
            config.default_language = language;
        }
        if let Some(theme) = self.theme {
            config.theme = theme;
        }
        if let Some(session) = &self.session {
            config.session_cookie = Some(session.clone());
        }
    }
}

fn init_logging() -> Option<WorkerGuard> {
    let log_dir = AppDirs::log_dir()?;
    fs::create_dir_all(&log_dir).ok()?;

    let file_appender = tracing_appender::rolling::never(&log_dir, "judgeterm.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(writer)
        .try_init()
        .ok()?;
    Some(guard)
}

fn print_history(limit: usize) -> anyhow::Result<()> {
    let journal = SubmissionJournal::open_default().context("failed to open submission journal")?;
    let entries = journal
        .recent(limit)
        .context("failed to read submission journal")?;

    if entries.is_empty() {
        println!("No submissions recorded yet.");
        return Ok(());
    }

    let now = Utc::now();
    for entry in &entries {
        println!("{}", format_entry(entry, now));
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging();

    let store = FileConfigStore::new();
    let mut config = store.load();
    cli.apply_to(&mut config);
    if cli.save_config {
        store
            .save(&config)
            .with_context(|| format!("failed to write {}", store.path().display()))?;
    }

    if let Some(Commands::History { limit }) = cli.command {
        return print_history(limit);
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let Some(problem_id) = cli.problem_id.clone() else {
        let mut cmd = Cli::command();
        cmd.error(
            ErrorKind::MissingRequiredArgument,
            "--problem-id is required to open the editor",
        )
        .exit();
    };

    let initial_text = cli
        .file
        .as_ref()
        .map(|path| {
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
        })
        .transpose()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let api: Arc<dyn JudgeApi> = Arc::new(
        HttpJudgeClient::new(config.base_url.clone())
            .with_timeout(config.request_timeout())
            .with_session(config.session_cookie.clone()),
    );

    let journal = match SubmissionJournal::open_default() {
        Ok(journal) => Some(journal),
        Err(err) => {
            tracing::warn!(error = %err, "submission journal unavailable");
            None
        }
    };

    let mut app = App::new(problem_id, &config).with_journal(journal);
    if let Some(text) = initial_text {
        app.editor.set_text(&text);
    }

    enable_raw_mode().context("failed to enable raw mode")?;

    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableFocusChange,
        EnableBracketedPaste
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let poller = StatusPoller::new(config.poll_interval()).with_timeout(config.poll_timeout());
    let effects = Effects::new(runtime.handle().clone(), api, runner.sender(), poller);

    let result = start_tui(&mut terminal, &mut app, &runner, &effects);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        DisableFocusChange,
        LeaveAlternateScreen,
    )?;
    terminal.show_cursor()?;

    runtime.shutdown_timeout(Duration::from_millis(500));
    tracing::info!("session ended");

    result
}

fn start_tui<B: Backend, E: JudgeEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
    effects: &Effects,
) -> anyhow::Result<()> {
    if let Some(command) = app.start() {
        effects.dispatch(command);
    }
    terminal.draw(|f| ui::draw(app, f))?;

    while !app.should_quit() {
        let event = runner.step();
        if let Some(command) = app.on_event(event) {
            effects.dispatch(command);
        }
        terminal.draw(|f| ui::draw(app, f))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["judgeterm"]);

        assert_eq!(cli.command, None);
        assert_eq!(cli.problem_id, None);
        assert_eq!(cli.base_url, None);
        assert_eq!(cli.language, None);
        assert_eq!(cli.theme, None);
        assert_eq!(cli.file, None);
        assert!(!cli.save_config);
    }

    #[test]
    fn test_cli_problem_and_server() {
        let cli = Cli::parse_from(["judgeterm", "-p", "two-sum", "-u", "http://judge:8080"]);
        assert_eq!(cli.problem_id.as_deref(), Some("two-sum"));
        assert_eq!(cli.base_url.as_deref(), Some("http://judge:8080"));

        let cli = Cli::parse_from(["judgeterm", "--problem-id", "42"]);
        assert_eq!(cli.problem_id.as_deref(), Some("42"));
    }

    #[test]
    fn test_cli_language_and_theme() {
        let cli = Cli::parse_from(["judgeterm", "-l", "cpp", "-t", "hc-black"]);
        assert_eq!(cli.language, Some(Language::Cpp));
        assert_eq!(cli.theme, Some(Theme::HcBlack));

        let cli = Cli::parse_from(["judgeterm", "--language", "typescript", "--theme", "vs"]);
        assert_eq!(cli.language, Some(Language::Typescript));
        assert_eq!(cli.theme, Some(Theme::Vs));
    }

    #[test]
    fn test_cli_rejects_unknown_language() {
        assert!(Cli::try_parse_from(["judgeterm", "-l", "cobol"]).is_err());
    }

    #[test]
    fn test_cli_history_subcommand() {
        let cli = Cli::parse_from(["judgeterm", "history"]);
        assert_eq!(cli.command, Some(Commands::History { limit: 20 }));

        let cli = Cli::parse_from(["judgeterm", "history", "-n", "5"]);
        assert_eq!(cli.command, Some(Commands::History { limit: 5 }));
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "judgeterm",
            "-u",
            "http://judge:8080/",
            "-l",
            "java",
            "-t",
            "vs",
            "--session",
            "abc",
        ]);
        let mut config = Config::default();
        cli.apply_to(&mut config);

        assert_eq!(config.base_url, "http://judge:8080");
        assert_eq!(config.default_language, Language::Java);
        assert_eq!(config.theme, Theme::Vs);
        assert_eq!(config.session_cookie.as_deref(), Some("abc"));
        assert_eq!(config.poll_interval_ms, 2000);
    }

    #[test]
    fn test_cli_leaves_config_alone_without_flags() {
        let cli = Cli::parse_from(["judgeterm", "--save-config"]);
        let mut config = Config {
            base_url: "http://stored".into(),
            ..Config::default()
        };
        cli.apply_to(&mut config);
        assert!(cli.save_config);
        assert_eq!(config.base_url, "http://stored");
        assert_eq!(config.default_language, Language::Python);
    }
}
