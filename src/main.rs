use std::error::Error;
use std::time::Duration;

use clap::Parser;
use crossterm::ExecutableCommand;
use crossterm::event::{self, Event};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

mod api;
mod app;
mod assignments;
mod auth;
mod dates;
mod diff;
mod hours;
mod models;
mod storage;
mod timesheet;
mod ui;

use app::App;
use dates::{WeekRange, parse_week_input};

#[derive(Parser)]
#[command(name = "timedesk", about = "Terminal admin client for time tracking and billing")]
struct Cli {
    /// Backend base URL (also TIMEDESK_SERVER or the config file)
    #[arg(long)]
    server: Option<String>,

    /// Open at the week containing this date (YYYY-MM-DD)
    #[arg(long)]
    week: Option<String>,

    /// Discard the stored token and prompt for a new one
    #[arg(long)]
    login: bool,
}

const DEFAULT_SERVER: &str = "http://localhost:8080";

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let server_url = cli
        .server
        .clone()
        .or_else(storage::read_server_url)
        .unwrap_or_else(|| DEFAULT_SERVER.to_string());
    if cli.server.is_some() {
        storage::write_server_url(&server_url)?;
    }

    let week = match cli.week.as_deref() {
        Some(value) => parse_week_input(value).map_err(|message| -> Box<dyn Error> {
            message.into()
        })?,
        None => WeekRange::current(),
    };

    let mut stdout = std::io::stdout();
    enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = App::new(server_url, week, cli.login);

    loop {
        terminal.draw(|frame| ui::draw(frame, &mut app))?;

        if app.needs_refresh {
            app.refresh_data();
        }

        if app.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(120))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key_event(key);
            }
        }
    }

    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}
