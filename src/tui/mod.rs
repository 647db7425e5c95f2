mod help;
mod input;
mod state;
mod views;

use crate::cli::Cli;
use crate::model::Locale;
use crate::orchestrator::{self, Intent, Snapshot, UiCommand};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use input::Action;
use ratatui::{backend::CrosstermBackend, Terminal};
use state::UiState;
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub async fn run(args: Cli) -> Result<()> {
    let (snap_tx, snap_rx) = mpsc::unbounded_channel::<Snapshot>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    let controller = crate::cli::build_controller(&args)?.with_observer(snap_tx);

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    let locale = args.locale;
    let ui_handle = std::thread::spawn(move || run_threaded(locale, snap_rx, cmd_tx));

    let res = orchestrator::run_controller(controller, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

fn send(state: &mut UiState, cmd_tx: &UnboundedSender<UiCommand>, intent: Intent) {
    state.record(&intent);
    let _ = cmd_tx.send(UiCommand::Intent(intent));
}

/// Run the TUI loop on a dedicated thread.
fn run_threaded(
    locale: Locale,
    mut snap_rx: UnboundedReceiver<Snapshot>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let mut state = UiState::new(locale);
    send(&mut state, &cmd_tx, Intent::Restore);

    let tick_rate = Duration::from_millis(50);
    let mut last_tick = Instant::now();
    let mut dirty = true;

    let res = loop {
        while let Ok(snap) = snap_rx.try_recv() {
            state.apply_snapshot(snap);
            dirty = true;
        }

        if dirty && last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| views::draw(f.area(), f, &state)).ok();
            last_tick = Instant::now();
            dirty = false;
        }

        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                dirty = true;
                match input::handle_key(&mut state, k) {
                    Action::Quit => {
                        let _ = cmd_tx.send(UiCommand::Quit);
                        break Ok(());
                    }
                    Action::Send(intent) => send(&mut state, &cmd_tx, intent),
                    Action::None => {}
                }
            } else {
                dirty = true;
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}
