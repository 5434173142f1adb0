mod api;
mod app;
mod config;
mod store;
mod ui;

use std::fs::File;
use std::io;
use std::time::Duration;

use anyhow::Context;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{self, UnboundedSender};
use tui::backend::{Backend, CrosstermBackend};
use tui::Terminal;

use crate::api::{ClientResult, HttpTaskApi, TaskApi};
use crate::app::App;
use crate::config::ClientConfig;
use crate::store::{Pending, Reply, TaskStore};

fn init_logging(config: &ClientConfig) -> anyhow::Result<()> {
    let Some(path) = &config.log_file else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

type Settled = (Pending, ClientResult<Reply>);

/// Sends the request on the runtime. The reply comes back through `replies`
/// and is settled by the draw loop, which keeps drawing meanwhile.
fn dispatch<A>(runtime: &Runtime, api: A, pending: Pending, replies: UnboundedSender<Settled>)
where
    A: TaskApi + 'static,
{
    runtime.spawn(async move {
        let result = pending.send(&api).await;
        if replies.send((pending, result)).is_err() {
            log::warn!("reply arrived after shutdown");
        }
    });
}

fn run_app<B: Backend, A: TaskApi + Clone + 'static>(
    terminal: &mut Terminal<B>,
    app: &mut App<A>,
    runtime: &Runtime,
) -> anyhow::Result<()> {
    let (replies, mut settled) = mpsc::unbounded_channel::<Settled>();

    while !app.should_quit() {
        while let Ok((pending, result)) = settled.try_recv() {
            app.complete(pending, result);
        }
        terminal.draw(|f| ui::draw(f, app))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if let Some(pending) = app.on_key(key) {
                let api = app.store().api().clone();
                dispatch(runtime, api, pending, replies.clone());
            }
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let config = ClientConfig::from_env();
    init_logging(&config)?;

    let runtime = Runtime::new()?;
    let api = HttpTaskApi::new(&config.api_url)?;
    let mut app = App::new(TaskStore::new(api));
    runtime.block_on(app.load());
    log::info!("connected to {}", config.api_url);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app, &runtime);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
