//! Timebot CLI
//!
//! One-shot commands against the scheduler backend:
//! - Log in, register, log out
//! - Show and edit the admin profile
//! - List, cancel and reschedule appointments
//! - Talk to the assistant

use anyhow::{bail, Context};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use timebot_admin::api::Appointment;
use timebot_admin::config::generate_default_config;
use timebot_admin::router::resolve;
use timebot_admin::session::Sender;
use timebot_admin::views::appointments::{format_schedule, status_of};
use timebot_admin::views::profile::{info_rows, stats};
use timebot_admin::views::{
    ActionOutcome, AppointmentsView, ChatView, FormField, ListState, LoginOutcome,
    LoginView, NavShell, PresetPrompter, ProfileField, ProfileState, ProfileView, Prompter,
    ResetOutcome, ScriptedPrompter, TerminalPrompter,
};
use timebot_admin::{logging, ApiClient, Config, FileStorage, Route, SessionContext};

#[derive(Parser)]
#[command(name = "timebot-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Appointment Scheduler admin tools")]
#[command(long_about = "Manage your appointment-scheduler admin account from the command line.\nLog in once; the session is kept in the storage file for later commands.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Scheduler API base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Session storage file
    #[arg(long, global = true)]
    pub storage: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in with email and password
    Login {
        #[arg(short, long)]
        email: String,
        /// Password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Create an admin account
    Register {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(long)]
        phone: String,
        /// Password (prompted twice when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Clear the stored session
    Logout {
        /// Skip the confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Show the logged-in admin
    Whoami,

    /// Profile commands
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// Appointment commands
    #[command(subcommand)]
    Appointments(AppointmentCommand),

    /// Assistant commands
    #[command(subcommand)]
    Chat(ChatCommand),

    /// Show where a dashboard path leads for the current session
    Route {
        /// Path such as /admin/profile
        path: String,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ProfileCommand {
    /// Show the profile
    Show,
    /// Change one field and save the whole profile
    Set {
        /// Field, e.g. name, phone, famousFor, workingDays, breakTime
        field: String,
        value: String,
    },
}

#[derive(Subcommand)]
pub enum AppointmentCommand {
    /// List appointments
    List,
    /// Cancel an appointment
    Cancel {
        id: String,
        /// Skip the confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Move an appointment
    Reschedule {
        id: String,
        /// New date, YYYY-MM-DD (prompted when omitted)
        #[arg(short, long)]
        date: Option<String>,
        /// New time, HH:MM 24-hour (prompted when omitted)
        #[arg(short, long)]
        time: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ChatCommand {
    /// Send a message and print the reply
    Send {
        /// Message words
        #[arg(required = true)]
        message: Vec<String>,
    },
    /// Start a new conversation
    New,
    /// Print the stored transcript
    History,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(path) = &cli.storage {
        config.storage.path = path.to_string_lossy().into_owned();
    }
    logging::init(&config.logging)?;

    let storage = FileStorage::new(config.storage.resolved_path());
    let session = SessionContext::new(Arc::new(storage));
    let api = ApiClient::new(&config.api).context("Failed to build HTTP client")?;

    match cli.command {
        Commands::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => ask("Password:")?,
            };
            let mut view = LoginView::new(session.clone(), config.ui.clone());
            view.set_field(FormField::Email, email);
            view.set_field(FormField::Password, password);
            finish_login(&mut view, &api).await?;
        }

        Commands::Register {
            name,
            email,
            phone,
            password,
        } => {
            let (password, confirm) = match password {
                Some(p) => (p.clone(), p),
                None => (ask("Password:")?, ask("Confirm Password:")?),
            };
            let mut view = LoginView::new(session.clone(), config.ui.clone());
            view.toggle_mode();
            view.set_field(FormField::Name, name);
            view.set_field(FormField::Email, email);
            view.set_field(FormField::Phone, phone);
            view.set_field(FormField::Password, password);
            view.set_field(FormField::ConfirmPassword, confirm);
            finish_login(&mut view, &api).await?;
        }

        Commands::Logout { yes } => {
            let mut nav = NavShell::new(session.clone(), Route::Home);
            nav.request_logout();
            if yes || TerminalPrompter.confirm("Are you sure you want to logout?") {
                nav.confirm_logout()?;
                println!("Logged out.");
            } else {
                nav.cancel_logout();
            }
        }

        Commands::Whoami => match session.sessions().read() {
            Some(current) => {
                if cli.format == "json" {
                    println!("{}", serde_json::to_string_pretty(&current.admin)?);
                } else {
                    println!("Name:     {}", current.admin.display_name());
                    println!(
                        "Email:    {}",
                        current.admin.email.as_deref().unwrap_or("-")
                    );
                    println!("Admin ID: {}", current.admin_id.as_deref().unwrap_or("-"));
                    println!(
                        "Token:    {}",
                        if current.token.is_some() { "stored" } else { "none" }
                    );
                }
            }
            None => not_logged_in(),
        },

        Commands::Profile(command) => {
            require_session(&session);
            let mut view = ProfileView::new(session.clone(), config.ui.clone());
            view.load(&api).await;
            if view.state() == &ProfileState::Missing {
                eprintln!("No profile found");
                std::process::exit(1);
            }

            match command {
                ProfileCommand::Show => {
                    let Some(profile) = view.profile() else {
                        return Ok(());
                    };
                    if cli.format == "json" {
                        println!("{}", serde_json::to_string_pretty(profile)?);
                    } else {
                        for (label, value) in info_rows(profile) {
                            println!("{:<16} {}", format!("{}:", label), value);
                        }
                        println!();
                        for (label, value) in stats(profile) {
                            println!("{:<16} {}", format!("{}:", label), value);
                        }
                    }
                }
                ProfileCommand::Set { field, value } => {
                    let Some(field) = ProfileField::from_key(&field) else {
                        let known: Vec<&str> = ProfileField::ALL.iter().map(|f| f.key()).collect();
                        bail!("Unknown field '{}'. Editable fields: {}", field, known.join(", "));
                    };
                    view.begin_edit()?;
                    view.set_field(field, value)?;
                    match view.save(&api).await {
                        Ok(()) => println!("Profile updated successfully!"),
                        Err(e) => {
                            eprintln!("{}", e);
                            std::process::exit(1);
                        }
                    }
                }
            }
        }

        Commands::Appointments(command) => {
            require_session(&session);
            let mut view = AppointmentsView::new(session.clone());
            view.load(&api).await;
            if let ListState::Failed(message) = view.state() {
                eprintln!("{}", message);
                std::process::exit(1);
            }

            match command {
                AppointmentCommand::List => {
                    if cli.format == "json" {
                        println!("{}", serde_json::to_string_pretty(view.appointments())?);
                    } else {
                        print_appointments(view.appointments());
                    }
                }
                AppointmentCommand::Cancel { id, yes } => {
                    let prompter: Box<dyn Prompter> = if yes {
                        Box::new(ScriptedPrompter::accepting())
                    } else {
                        Box::new(TerminalPrompter)
                    };
                    report(view.cancel(&api, prompter.as_ref(), &id).await, "cancelled");
                }
                AppointmentCommand::Reschedule { id, date, time } => {
                    let prompter = PresetPrompter::new([date, time], TerminalPrompter);
                    report(view.reschedule(&api, &prompter, &id).await, "rescheduled");
                }
            }
        }

        Commands::Chat(command) => {
            let mut view = ChatView::new(session.clone());
            match command {
                ChatCommand::Send { message } => {
                    view.set_input(message.join(" "));
                    match view.submit_input(&api).await {
                        Ok(reply) => println!("{}", reply.text),
                        Err(e) => {
                            eprintln!("{}", e);
                            std::process::exit(1);
                        }
                    }
                }
                ChatCommand::New => match view.new_chat(&api).await {
                    ResetOutcome::Confirmed => println!("Started a new chat."),
                    ResetOutcome::Skipped => {
                        println!("Started a new chat (not logged in; assistant session untouched).")
                    }
                    ResetOutcome::Failed(e) => {
                        println!("Started a new chat locally; assistant reset failed: {}", e)
                    }
                },
                ChatCommand::History => {
                    if cli.format == "json" {
                        println!("{}", serde_json::to_string_pretty(view.transcript())?);
                    } else {
                        for message in view.transcript().messages() {
                            let who = match message.sender {
                                Sender::Admin => "You",
                                Sender::Assistant => "Bot",
                            };
                            println!(
                                "{}  {:<3}  {}",
                                message.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                                who,
                                message.text
                            );
                        }
                    }
                }
            }
        }

        Commands::Route { path } => {
            let navigation = resolve(&path, session.is_authenticated());
            if navigation.is_redirect() {
                println!("{} -> redirect to {}", path, navigation.route());
            } else {
                println!("{} -> {}", path, navigation.route());
            }
        }

        Commands::Config { output } => {
            let config = generate_default_config();

            if let Some(path) = output {
                std::fs::write(&path, &config)?;
                println!("Config written to {:?}", path);
            } else {
                println!("{}", config);
            }
        }
    }

    Ok(())
}

async fn finish_login(view: &mut LoginView, api: &ApiClient) -> anyhow::Result<()> {
    match view.submit(api).await {
        LoginOutcome::Authenticated(_) => {
            if let Some(note) = view.notification() {
                println!("{}", note.message);
            }
            Ok(())
        }
        LoginOutcome::Invalid => {
            for (field, message) in view.errors() {
                eprintln!("{}: {}", field.placeholder(), message);
            }
            std::process::exit(1);
        }
        LoginOutcome::Failed(message) => bail!(message),
        LoginOutcome::Busy => bail!("A submission is already in progress"),
    }
}

fn report<E: std::fmt::Display>(result: Result<ActionOutcome, E>, verb: &str) {
    match result {
        Ok(ActionOutcome::Applied) => println!("Appointment {} successfully.", verb),
        Ok(ActionOutcome::Declined) => println!("Nothing changed."),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn print_appointments(appointments: &[Appointment]) {
    if appointments.is_empty() {
        println!("No appointments available.");
        return;
    }

    println!(
        "{:<26} {:<20} {:<12} {:<14} {:<12} {}",
        "ID", "Client", "Date", "Time", "Status", "Purpose"
    );
    println!("{}", "-".repeat(100));

    for apt in appointments {
        let schedule = format_schedule(&apt.start_time, apt.end_time.as_ref(), &Local);
        println!(
            "{:<26} {:<20} {:<12} {:<14} {:<12} {}",
            apt.id,
            apt.user.name.as_deref().unwrap_or("-"),
            schedule.date,
            schedule.time,
            status_of(apt).badge(),
            apt.purpose.as_deref().unwrap_or("")
        );
    }
}

fn ask(question: &str) -> anyhow::Result<String> {
    TerminalPrompter
        .prompt(question)
        .context("No input provided")
}

fn require_session(session: &SessionContext) {
    if !session.is_authenticated() {
        not_logged_in();
    }
}

fn not_logged_in() -> ! {
    eprintln!("Not logged in. Run: timebot-cli login --email <email>");
    std::process::exit(1);
}
