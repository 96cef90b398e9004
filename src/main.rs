//! fedportal - terminal admin console and site tooling for a sports federation.
//!
//! Without a subcommand it starts the dashboard TUI. The other subcommands
//! generate the public sitemap and robots file, list content, or forget a
//! stored session.

mod api;
mod app;
mod config;
mod content;
mod error;
mod events;
mod form;
mod logging;
mod site;
mod table;
mod tasks;
mod ui;

use std::io::{self, Stdout};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

use crate::api::{DataClient, IdentityClient};
use crate::app::{App, Command};
use crate::config::{Backend, Config};
use crate::content::Category;
use crate::events::EventHandler;
use crate::site::RouteList;
use crate::table::{value_text, TableView};
use crate::tasks::{create_task_channel, TaskSpawner};

#[derive(Parser)]
#[command(name = "fedportal")]
#[command(about = "Federation dashboard and site tooling", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file to use instead of the default location.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug-level logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the dashboard (default).
    Tui {
        /// Backend name from the config file.
        #[arg(long)]
        backend: Option<String>,
    },
    /// Write the XML sitemap.
    Sitemap {
        /// Output file; stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Content directory; overrides the config.
        #[arg(long)]
        content_dir: Option<PathBuf>,
    },
    /// Write the robots file.
    Robots {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List content entries of a category.
    Content {
        category: String,
        /// Case-insensitive filter over all fields.
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        content_dir: Option<PathBuf>,
    },
    /// Forget the stored session of a backend.
    Logout {
        #[arg(long)]
        backend: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("warning: logging disabled: {e}");
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("failed to load configuration")?;

    let result = match cli.command.unwrap_or(Commands::Tui { backend: None }) {
        Commands::Tui { backend } => run_tui(&config, backend.as_deref()).await,
        Commands::Sitemap { out, content_dir } => {
            let routes = load_routes(&config, content_dir)?;
            write_output(out, &site::sitemap(&config.settings.site_url, &routes))
        }
        Commands::Robots { out } => {
            let routes = RouteList::from_content(&[]);
            write_output(out, &site::robots(&config.settings.site_url, &routes))
        }
        Commands::Content {
            category,
            search,
            content_dir,
        } => print_content(&config, &category, &search, content_dir),
        Commands::Logout { backend } => {
            let backend = config.resolve_backend(backend.as_deref())?;
            api::auth::delete_refresh_token(&backend.name)?;
            println!("Signed out of {}", backend.name);
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Command failed");
    }
    logging::shutdown();
    result
}

fn load_routes(config: &Config, content_dir: Option<PathBuf>) -> anyhow::Result<RouteList> {
    let dir = content_dir.unwrap_or_else(|| config.settings.content_dir.clone());
    let entries = content::load_all(&dir)
        .with_context(|| format!("failed to load content from {}", dir.display()))?;
    Ok(RouteList::from_content(&entries))
}

fn write_output(out: Option<PathBuf>, text: &str) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            std::fs::write(&path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "Wrote file");
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn print_content(
    config: &Config,
    category: &str,
    search: &str,
    content_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let category = Category::parse(category)
        .with_context(|| format!("unknown category '{category}', expected news or competitions"))?;
    let dir = content_dir.unwrap_or_else(|| config.settings.content_dir.clone());
    let entries = content::load_category(&dir, category)?;

    let records = entries.iter().map(|e| e.as_record()).collect();
    let columns = ["slug", "title", "date"];
    let mut view = TableView::new(entries.len().max(1)).with_columns(columns);
    view.set_records(records);
    view.set_search(search);

    if view.is_empty() {
        println!("{}", table::EMPTY_PLACEHOLDER);
        return Ok(());
    }
    println!("{}", columns.join("\t"));
    for record in view.visible() {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| record.get(*c).map(value_text).unwrap_or_default())
            .collect();
        println!("{}", cells.join("\t"));
    }
    Ok(())
}

/// Restores the terminal when dropped, including on early return.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Network clients and the task spawner used to run app commands.
struct Runner {
    backend: Backend,
    data: DataClient,
    identity: IdentityClient,
    spawner: TaskSpawner,
    content_dir: PathBuf,
}

impl Runner {
    fn run(&self, app: &mut App, command: Command) {
        let name = self.backend.name.clone();
        match command {
            Command::SignIn { email, password } => {
                self.spawner.spawn_sign_in(&self.identity, name, email, password)
            }
            Command::RestoreSession => self.spawner.spawn_restore_session(&self.identity, name),
            Command::Refresh { refresh_token } => {
                self.spawner.spawn_refresh(&self.identity, name, refresh_token)
            }
            Command::Fetch { table, session } => self.spawner.spawn_fetch(&self.data, &session, table),
            Command::Submit { form, session } => {
                let mut data = self.data.clone();
                if let Some(session) = &session {
                    data.set_access_token(Some(session.access_token().to_string()));
                }
                self.spawner.spawn_submit(form, &data, &self.identity, session)
            }
            Command::ChangeRole {
                user_id,
                role,
                session,
            } => self
                .spawner
                .spawn_change_role(&self.data, &session, user_id, role),
            Command::Delete { table, id, session } => {
                self.spawner.spawn_delete(&self.data, &session, table, id)
            }
            Command::SignOut { session } => self.spawner.spawn_sign_out(&self.identity, session, name),
            Command::LoadContent => match content::load_all(&self.content_dir) {
                Ok(entries) => app.show_content(entries),
                Err(e) => app.handle_error(&e.into()),
            },
            Command::OpenUrl(url) => {
                info!(url = %url, "Opening in browser");
                if let Err(e) = open::that(&url) {
                    warn!(error = %e, "Could not open browser");
                    app.handle_error(&error::AppError::Io(e));
                }
            }
        }
    }
}

async fn run_tui(config: &Config, backend_name: Option<&str>) -> anyhow::Result<()> {
    let backend = config
        .resolve_backend(backend_name)
        .context("no backend configured; add a [[backends]] entry to the config file")?
        .clone();
    let timeout = config.settings.request_timeout_secs;

    let (mut rx, spawner) = create_task_channel();
    let runner = Runner {
        data: DataClient::new(&backend, timeout)?,
        identity: IdentityClient::new(&backend, timeout)?,
        backend,
        spawner,
        content_dir: config.settings.content_dir.clone(),
    };

    let mut app = App::new(config.settings.clone(), &runner.backend);
    let events = EventHandler::new();
    let mut guard = TerminalGuard::new()?;

    info!(backend = %runner.backend.name, "Dashboard started");
    while !app.should_quit() {
        for command in app.take_commands() {
            runner.run(&mut app, command);
        }

        guard.terminal.draw(|frame| app.view(frame))?;

        let event = events.next()?;
        app.update(event);

        while let Ok(message) = rx.try_recv() {
            app.handle_api_message(message);
        }
    }

    Ok(())
}
