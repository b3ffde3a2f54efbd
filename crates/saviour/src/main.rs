//! `saviour` - CLI for the donor registry
//!
//! This binary opens the local store, hydrates the donor registry and runs a
//! single command against it.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::rc::Rc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::warn;

use saviour::app::{ActionPayload, App, Notice, NoticeKind, Page, Route, SharedStore};
use saviour::auth::{UserProfile, PROFILE_UPDATED, SIGNUP_SUCCESS};
use saviour::cli::{
    AuthCommand, Cli, Command, ConfigCommand, DonorsCommand, ExploreCommand, ListCommand,
    OutputFormat, RegisterCommand,
};
use saviour::donor::BloodGroup;
use saviour::explore;
use saviour::registry::{registration_cities, registration_coordinates, Registration};
use saviour::render::{self, View};
use saviour::storage::{MemoryStore, SqliteStore};
use saviour::{init_logging, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("could not load configuration")?;

    if let Command::Config(config_cmd) = cli.command {
        return handle_config(&config, config_cmd);
    }

    let (store, sqlite) = open_store(&config);
    let mut app = App::new(config, store);

    match cli.command {
        Command::Donors(cmd) => handle_donors(&mut app, cmd),
        Command::Map { json } => handle_route(&mut app, Route::MapView, json),
        Command::Dashboard { json } => handle_route(&mut app, Route::Dashboard, json),
        Command::Stats { json } => handle_stats(&app, sqlite.as_deref(), json),
        Command::Navigate { route } => handle_navigate(&mut app, route),
        Command::Auth(cmd) => handle_auth(&app, cmd),
        Command::Explore(cmd) => handle_explore(&mut app, &cmd),
        Command::Config(_) => Ok(()),
    }
}

/// Open the configured database, falling back to memory if that fails.
///
/// The second value is the `SQLite` store when it opened, for statistics.
fn open_store(config: &Config) -> (SharedStore, Option<Rc<SqliteStore>>) {
    let path = config.database_path();
    match SqliteStore::open(&path) {
        Ok(store) => {
            let store = Rc::new(store);
            (Rc::clone(&store) as SharedStore, Some(store))
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not open database, changes will not be saved");
            (Rc::new(MemoryStore::new()), None)
        }
    }
}

fn print_notice(notice: &Notice) {
    match notice.kind {
        NoticeKind::Error => eprintln!("{}", notice.text),
        NoticeKind::Success | NoticeKind::Info => println!("{}", notice.text),
    }
}

fn print_page(page: &Page, json: bool) -> Result<()> {
    match page {
        Page::Donors(html) => print!("{html}"),
        Page::Donate => {
            println!("Register with: saviour donors register --name NAME --group GROUP --city CITY");
        }
        Page::Map(view) if !json => {
            println!(
                "Map centered on {:.4}, {:.4} at zoom {}",
                view.center.0, view.center.1, view.zoom
            );
            for marker in &view.markers {
                println!("{:>14}  {:>9.4} {:>9.4}", marker.id, marker.lat, marker.lng);
            }
            println!("{} markers", view.markers.len());
        }
        Page::Dashboard(board) if !json => {
            println!("Total donors: {}", board.total_donors);
            println!();
            println!("[Blood groups]");
            for group in &board.groups {
                println!("  {:<8} {}", group.group, group.count);
            }
            println!();
            println!("[New donors]");
            for (label, value) in board.activity.labels.iter().zip(&board.activity.values) {
                println!("  {label:<8} {value}");
            }
        }
        Page::Map(_) | Page::Dashboard(_) => {
            println!("{}", serde_json::to_string_pretty(page)?);
        }
    }
    Ok(())
}

fn handle_donors(app: &mut App, cmd: DonorsCommand) -> Result<()> {
    match cmd {
        DonorsCommand::List(list) => handle_list(app, &list),
        DonorsCommand::Feed { format } => {
            let limit = app.config().registry.demo_target;
            let donors = app.registry().donors().iter().take(limit);
            match format {
                OutputFormat::Html => print!("{}", app.render_feed()),
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&donors.collect::<Vec<_>>())?);
                }
                OutputFormat::Plain => donors.for_each(|d| println!("{}", render::summary_line(d))),
            }
            Ok(())
        }
        DonorsCommand::Register(form) => handle_register(app, form),
        DonorsCommand::Contact { id } => {
            let payload = ActionPayload {
                id: Some(id),
                ..ActionPayload::default()
            };
            let outcome = app.dispatch("contact", &payload)?;
            outcome.notice.iter().for_each(print_notice);
            Ok(())
        }
        DonorsCommand::Show { id, json } => {
            let donor = app.donor(id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(donor)?);
            } else {
                println!("Id:             {}", donor.id);
                println!("Name:           {}", donor.display_name());
                println!("Blood group:    {}", donor.display_group());
                println!("City:           {}", donor.display_city());
                println!(
                    "Last donation:  {}",
                    donor.last_donation.as_deref().unwrap_or("-")
                );
                if let Some((lat, lng)) = donor.coordinates() {
                    println!("Location:       {lat:.4}, {lng:.4}");
                }
            }
            Ok(())
        }
    }
}

fn handle_list(app: &mut App, cmd: &ListCommand) -> Result<()> {
    let query = if cmd.saved {
        match app.apply_saved_search() {
            Some((query, _)) => query,
            None => {
                eprintln!("No saved search.");
                return Ok(());
            }
        }
    } else {
        cmd.query.clone()
    };

    let found = app.registry().search(&query);
    match cmd.format {
        OutputFormat::Plain => {
            for donor in &found {
                println!("{}", render::summary_line(donor));
            }
            eprintln!("{} of {} donors", found.len(), app.registry().len());
        }
        OutputFormat::Html => {
            let view = View::from(cmd.view);
            for donor in found {
                println!("{}", render::render_donor(donor, view));
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&found)?),
    }
    Ok(())
}

fn handle_register(app: &mut App, form: RegisterCommand) -> Result<()> {
    // Normalise the group code; anything unparseable is left to form validation
    let group = form
        .group
        .parse::<BloodGroup>()
        .map_or(form.group, |g| g.code().to_string());

    if !form.city.trim().is_empty() && registration_coordinates(&form.city).is_none() {
        let known: Vec<_> = registration_cities().collect();
        eprintln!(
            "Unknown city '{}', placing the donor near Dhaka. Known cities: {}",
            form.city.trim(),
            known.join(", ")
        );
    }

    let payload = ActionPayload {
        registration: Registration {
            name: form.name,
            group,
            city: form.city,
        },
        ..ActionPayload::default()
    };
    let outcome = app.dispatch("register", &payload)?;
    if let Some(notice) = &outcome.notice {
        if notice.kind == NoticeKind::Error {
            bail!("{}", notice.text);
        }
        print_notice(notice);
    }
    if let Some(donor) = app.registry().donors().first() {
        println!("{}", render::summary_line(donor));
    }
    Ok(())
}

fn handle_route(app: &mut App, route: Route, json: bool) -> Result<()> {
    let page = app.navigate(route);
    print_page(&page, json)
}

fn handle_navigate(app: &mut App, route: String) -> Result<()> {
    let payload = ActionPayload {
        route,
        ..ActionPayload::default()
    };
    let outcome = app.dispatch("navigate", &payload)?;
    eprintln!("Route: {}", app.route());
    if let Some(page) = &outcome.page {
        print_page(page, false)?;
    }
    Ok(())
}

fn handle_stats(app: &App, sqlite: Option<&SqliteStore>, json: bool) -> Result<()> {
    let storage = sqlite.map(SqliteStore::stats).transpose()?;
    let requests = app.pending_requests();

    if json {
        let stats = serde_json::json!({
            "total_donors": app.registry().len(),
            "pending_requests": requests,
            "logged_in": app.auth().is_logged_in(),
            "location": app.store().location(),
            "stored_keys": storage.as_ref().map(|s| s.total_keys),
            "stored_bytes": storage.as_ref().map(|s| s.total_value_bytes),
            "database_bytes": storage.as_ref().map(|s| s.db_size_bytes),
        });
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("saviour stats");
        println!("-------------");
        println!("Total donors:      {}", app.registry().len());
        println!("Pending requests:  {requests}");
        println!("Logged in:         {}", app.auth().is_logged_in());
        println!("Storage:           {}", app.store().location());
        if let Some(stats) = storage {
            println!("Stored keys:       {}", stats.total_keys);
            println!("Stored bytes:      {}", stats.total_value_bytes);
            println!("Database size:     {} bytes", stats.db_size_bytes);
        }
    }
    Ok(())
}

fn handle_auth(app: &App, cmd: AuthCommand) -> Result<()> {
    let auth = app.auth();
    match cmd {
        AuthCommand::Signup {
            profile,
            password,
            confirm,
        } => {
            let profile = UserProfile {
                pass: password,
                ..profile.apply_to(UserProfile::default())
            };
            let user = auth.signup(profile, &confirm)?;
            println!("{SIGNUP_SUCCESS}");
            println!("Log in with: saviour auth login {} --password ...", user.email);
        }
        AuthCommand::Login { username, password } => {
            let user = auth.login(&username, &password)?;
            println!("Logged in as {}", user.name);
        }
        AuthCommand::Logout => {
            auth.logout();
            println!("Logged out.");
        }
        AuthCommand::Profile { json } => {
            let profile = auth.profile();
            if json {
                println!("{}", serde_json::to_string_pretty(&profile)?);
            } else {
                println!("Name:     {}", profile.name);
                println!("Gender:   {}", profile.gender);
                println!("Blood:    {}", profile.blood);
                println!("Phone:    {}", profile.phone);
                println!("City:     {}", profile.city);
                println!("Area:     {}", profile.area);
                println!("Email:    {}", profile.email);
                println!("Donor:    {}", if profile.isdonor { "yes" } else { "no" });
            }
        }
        AuthCommand::UpdateProfile { profile, password } => {
            let mut updated = profile.apply_to(auth.profile());
            if let Some(password) = password {
                updated.pass = password;
            }
            auth.update_profile(&updated);
            println!("{PROFILE_UPDATED}");
        }
        AuthCommand::Recover { email } => {
            println!("{}", auth.recover(&email)?);
        }
    }
    Ok(())
}

fn handle_explore(app: &mut App, cmd: &ExploreCommand) -> Result<()> {
    match cmd {
        ExploreCommand::SavedSearch => match app.apply_saved_search() {
            Some((query, _)) => println!("{query}"),
            None => eprintln!("No saved search."),
        },
        ExploreCommand::Requests => println!("{}", app.pending_requests()),
        ExploreCommand::Directory { query, format } => {
            let found = explore::search_directory(query);
            match format {
                OutputFormat::Plain => {
                    for (index, entry) in &found {
                        println!(
                            "{index:>2}  {:<22} {:<4} {}, {}  (last {})",
                            entry.name, entry.bg, entry.area, entry.city, entry.last
                        );
                    }
                }
                OutputFormat::Html => {
                    for (index, entry) in &found {
                        println!("{}", explore::render_entry(*index, entry));
                    }
                }
                OutputFormat::Json => {
                    let entries: Vec<_> = found.iter().map(|(_, entry)| entry).collect();
                    println!("{}", serde_json::to_string_pretty(&entries)?);
                }
            }
        }
        ExploreCommand::Ask { index, message } => {
            println!("{}", explore::ask(*index, message)?);
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Donors key:         {}", config.storage.donors_key);
                println!("  User key:           {}", config.storage.user_key);
                println!("  Session key:        {}", config.storage.session_key);
                println!("  Filters key:        {}", config.storage.filters_key);
                println!("  Requests key:       {}", config.storage.requests_key);
                println!();
                println!("[Registry]");
                println!("  Demo target:        {}", config.registry.demo_target);
                println!("  Seed placement:     {:?}", config.registry.seed_placement);
                match config.registry.demo_seed {
                    Some(seed) => println!("  Demo seed:          {seed}"),
                    None => println!("  Demo seed:          random"),
                }
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
