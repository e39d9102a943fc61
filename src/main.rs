use std::io::{self, stdout, Stdout};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use crossbeam_channel::{Receiver, TryRecvError};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::runtime::Runtime;

use maestro::app::{LogicThread, StateChannel};
use maestro::config::Config;
use maestro::orchestration::{execute as run_orchestration, is_blank, OrchestrationDefinition, RunLog};
use maestro::provider::Provider;
use maestro::render::RenderState;
use maestro::store::OrchestrationStore;
use maestro::{mlog, ui, Error, Result};

const FRAME_DURATION: Duration = Duration::from_micros(16_666); // 60fps

/// Maestro - define, save and run multi-step LLM prompt orchestrations
#[derive(Parser, Debug)]
#[command(name = "maestro")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    \
    GOOGLE_API_KEY    Credential for Gemini\n    \
    OPENAI_API_KEY    Credential for OpenAI ChatGPT\n    \
    MAESTRO_DEBUG=1   Enable debug logging (alternative to --debug)")]
pub struct Cli {
    /// Enable debug logging (writes to ~/.maestro/maestro.log)
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Orchestration store file (overrides config)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Provider to run with (overrides config)
    #[arg(long, value_enum, global = true)]
    pub provider: Option<Provider>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List saved orchestration names
    List,

    /// Print a saved orchestration definition
    Show {
        name: String,
    },

    /// Execute an orchestration without the TUI
    Run {
        /// Saved orchestration to run
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        name: Option<String>,

        /// Run a definition file instead of a saved orchestration
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    maestro::log::init(cli.debug);

    let config = Config::load()?;
    let store = OrchestrationStore::new(
        cli.store
            .clone()
            .unwrap_or_else(|| config.effective_store_path()),
    );
    let provider = cli.provider.unwrap_or_else(|| config.effective_provider());

    match cli.command {
        Some(Command::List) => return run_list(&store),
        Some(Command::Show { name }) => return run_show(&store, &name),
        Some(Command::Run { name, file }) => {
            return run_headless(&store, &config, provider, name, file);
        }
        None => {}
    }

    if cli.debug {
        mlog!("maestro starting (debug mode enabled)");
    } else {
        mlog!("maestro starting");
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let (state_tx, state_rx) = crossbeam_channel::bounded::<RenderState>(1);
    let state = StateChannel {
        tx: state_tx,
        rx: state_rx.clone(),
    };

    let shutdown_clone = shutdown.clone();
    let logic_handle =
        thread::spawn(move || LogicThread::run(config, store, provider, state, shutdown_clone));

    let mut terminal = setup_terminal()?;
    let result = render_loop(&mut terminal, state_rx, &shutdown);

    shutdown.store(true, Ordering::SeqCst);
    let logic_result = logic_handle
        .join()
        .map_err(|_| Error::TaskJoin("logic thread panicked".to_string()))?;
    restore_terminal(&mut terminal)?;
    result.and(logic_result)
}

fn run_list(store: &OrchestrationStore) -> Result<()> {
    let load = store.load();
    if let Some(err) = load.error {
        return Err(err);
    }
    for name in load.orchestrations.keys() {
        println!("{}", name);
    }
    Ok(())
}

fn run_show(store: &OrchestrationStore, name: &str) -> Result<()> {
    let load = store.load();
    if let Some(err) = load.error {
        return Err(err);
    }
    let definition = load
        .orchestrations
        .get(name)
        .ok_or_else(|| Error::OrchestrationNotFound(name.to_string()))?;
    println!("{}", serde_json::to_string_pretty(definition)?);
    Ok(())
}

/// Run one orchestration, streaming the run log to stdout.
fn run_headless(
    store: &OrchestrationStore,
    config: &Config,
    provider: Provider,
    name: Option<String>,
    file: Option<PathBuf>,
) -> Result<()> {
    let document = match (name, file) {
        (_, Some(path)) => {
            let text = std::fs::read_to_string(&path)?;
            serde_json::from_str(&text).map_err(Error::DefinitionParse)?
        }
        (Some(name), None) => {
            let load = store.load();
            if let Some(err) = load.error {
                return Err(err);
            }
            load.orchestrations
                .get(&name)
                .cloned()
                .ok_or(Error::OrchestrationNotFound(name))?
        }
        (None, None) => return Err(Error::EmptyDefinition),
    };

    if is_blank(&document) {
        return Err(Error::EmptyDefinition);
    }
    let definition = OrchestrationDefinition::from_value(&document)?;
    mlog!(
        "Headless run orchestration={:?} provider={}",
        definition.display_name(),
        provider
    );

    let mut log = RunLog::with_observer(|entry| println!("{}", entry.line()));
    let result = Runtime::new()?.block_on(run_orchestration(&definition, provider, config, &mut log))?;

    println!();
    println!("{}", result.to_pretty());
    Ok(())
}

fn render_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state_rx: Receiver<RenderState>,
    shutdown: &AtomicBool,
) -> Result<()> {
    let mut state = RenderState::default();
    let mut last_version = 0;
    let mut last_frame = Instant::now();
    let mut dirty = true;

    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        match state_rx.try_recv() {
            Ok(new_state) => {
                dirty = dirty || new_state.version != last_version;
                state = new_state;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => break,
        }

        if last_frame.elapsed() < FRAME_DURATION {
            thread::sleep(Duration::from_micros(500));
            continue;
        }
        last_frame = Instant::now();

        if dirty {
            terminal.draw(|f| ui::draw(f, &state))?;
            last_version = state.version;
            dirty = false;
        }
    }

    Ok(())
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.hide_cursor()?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    terminal.show_cursor()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}
