//! Timebot Admin
//!
//! Interactive terminal dashboard for the appointment scheduler.

use anyhow::Context;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use timebot_admin::views::chat::TYPING;
use timebot_admin::views::{
    ActionOutcome, AuthMode, FormField, LoginOutcome, ProfileField, QuickAction, ResetOutcome,
    TerminalPrompter,
};
use timebot_admin::{logging, ApiClient, App, Config, FileStorage, Route, Screen, SessionContext};

#[derive(Parser)]
#[command(name = "timebot-admin")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Appointment Scheduler admin dashboard")]
struct Args {
    /// Config file (default: search the standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to open first
    #[arg(default_value = "/admin/home")]
    path: String,
}

const HELP: &str = "\
Anywhere:      :home  :profile  :appointments  :bot  :open <path>  :logout  :help  :quit
Login:         email <v>  password  name <v>  phone <v>  toggle  submit
Dashboard:     <number> to follow a shortcut, focus <n> to highlight a feature
Profile:       edit  set <field> <value>  save  cancel  reload
Appointments:  view <id>  close  cancel <id>  reschedule <id>  refresh
AI Bot:        type a message, or /new  /cancel  /reschedule";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    logging::init(&config.logging)?;

    tracing::info!("Timebot Admin v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("API base URL: {}", config.api.base_url);

    let storage = FileStorage::new(config.storage.resolved_path());
    let session = SessionContext::new(Arc::new(storage));
    let api = ApiClient::new(&config.api).context("Failed to build HTTP client")?;

    let mut app = App::new(session, Arc::new(api), config.ui.clone());
    app.navigate(&args.path).await;

    loop {
        if let Screen::Home(home) = app.screen_mut() {
            home.carousel_mut().tick(Instant::now());
        }
        println!();
        println!("{}", app);
        println!();

        let Some(line) = read_line("›")? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix(':') {
            if !global_command(&mut app, command).await? {
                break;
            }
            continue;
        }

        screen_command(&mut app, line).await?;
    }

    tracing::info!("Dashboard closed");
    Ok(())
}

/// Returns false when the dashboard should exit
async fn global_command(app: &mut App, command: &str) -> anyhow::Result<bool> {
    let (word, rest) = split(command);
    match word {
        "quit" | "q" => return Ok(false),
        "help" => println!("{}", HELP),
        "home" => {
            app.go(Route::Home).await;
        }
        "profile" => {
            app.go(Route::Profile).await;
        }
        "appointments" => {
            app.go(Route::Appointments).await;
        }
        "bot" => {
            app.go(Route::Bot).await;
        }
        "open" => {
            let navigation = app.navigate(rest).await;
            if navigation.is_redirect() {
                println!("Redirected to {}", navigation.route());
            }
        }
        "logout" => {
            app.nav_mut().request_logout();
            println!("{}", app.nav());
            let confirmed = read_line("Yes, Logout? [y/N]")?
                .map(|a| matches!(a.trim().to_lowercase().as_str(), "y" | "yes"))
                .unwrap_or(false);
            if confirmed {
                app.logout().await?;
            } else {
                app.nav_mut().cancel_logout();
            }
        }
        other => println!("Unknown command ':{}'. Try :help", other),
    }
    Ok(true)
}

async fn screen_command(app: &mut App, line: &str) -> anyhow::Result<()> {
    let api = app.api();
    let prompter = TerminalPrompter;
    let (word, rest) = split(line);

    let mut redirect = None;
    match app.screen_mut() {
        Screen::Login(view) => match word {
            "email" => view.set_field(FormField::Email, rest),
            "name" => view.set_field(FormField::Name, rest),
            "phone" => view.set_field(FormField::Phone, rest),
            "password" => {
                let value = read_line("Password:")?.unwrap_or_default();
                view.set_field(FormField::Password, value);
                if view.mode() == AuthMode::Register {
                    let confirm = read_line("Confirm Password:")?.unwrap_or_default();
                    view.set_field(FormField::ConfirmPassword, confirm);
                }
            }
            "toggle" => view.toggle_mode(),
            "submit" => {
                if let LoginOutcome::Authenticated(pending) = view.submit(api.as_ref()).await {
                    println!("{}", view);
                    tokio::time::sleep(pending.after).await;
                    redirect = Some(pending.route);
                }
            }
            _ => println!("{}", HELP),
        },

        Screen::Home(view) => match word {
            "focus" => {
                let index = rest.parse::<usize>().unwrap_or(0);
                if !view.carousel_mut().focus(index.saturating_sub(1), Instant::now()) {
                    println!("No such feature");
                }
            }
            number => match number.parse::<usize>().ok().and_then(|n| view.shortcut(n)) {
                Some(route) => redirect = Some(route),
                None => println!("{}", HELP),
            },
        },

        Screen::Profile(view) => match word {
            "edit" => {
                if let Err(e) = view.begin_edit() {
                    println!("{}", e);
                }
            }
            "set" => {
                let (key, value) = split(rest);
                match ProfileField::from_key(key) {
                    Some(field) => {
                        if let Err(e) = view.set_field(field, value) {
                            println!("{}", e);
                        }
                    }
                    None => println!("Unknown field '{}'", key),
                }
            }
            "save" => {
                if let Err(e) = view.save(api.as_ref()).await {
                    println!("{}", e);
                }
            }
            "cancel" => view.cancel_edit(),
            "reload" => view.load(api.as_ref()).await,
            _ => println!("{}", HELP),
        },

        Screen::Appointments(view) => match word {
            "view" => {
                if !view.open_details(rest) {
                    println!("Appointment {} not found", rest);
                }
            }
            "close" => view.close_details(),
            "refresh" => view.refresh(api.as_ref()).await,
            "cancel" => match view.cancel(api.as_ref(), &prompter, rest).await {
                Ok(ActionOutcome::Applied) => println!("Appointment cancelled successfully."),
                Ok(ActionOutcome::Declined) => {}
                Err(e) => println!("{}", e),
            },
            "reschedule" => match view.reschedule(api.as_ref(), &prompter, rest).await {
                Ok(ActionOutcome::Applied) => println!("Appointment rescheduled successfully."),
                Ok(ActionOutcome::Declined) => {}
                Err(e) => println!("{}", e),
            },
            _ => println!("{}", HELP),
        },

        Screen::Bot(view) => {
            let text = match line {
                "/new" => {
                    if let ResetOutcome::Failed(e) = view.new_chat(api.as_ref()).await {
                        println!("Assistant reset failed: {}", e);
                    }
                    return Ok(());
                }
                "/cancel" => QuickAction::Cancel.message(),
                "/reschedule" => QuickAction::Reschedule.message(),
                text => text,
            };
            match view.begin_send(text) {
                Ok(request) => {
                    println!("{}", TYPING);
                    view.finish_send(api.as_ref(), request).await;
                }
                Err(e) => println!("{}", e),
            }
        }
    }

    if let Some(route) = redirect {
        app.go(route).await;
    }
    Ok(())
}

fn split(input: &str) -> (&str, &str) {
    match input.trim().split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input.trim(), ""),
    }
}

fn read_line(prompt: &str) -> io::Result<Option<String>> {
    let mut stdout = io::stdout();
    write!(stdout, "{} ", prompt)?;
    stdout.flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}
