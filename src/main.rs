// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Context, Result};
use club_registry::{export_csv, telemetry, validate, Club, Config, Registration, RegistrationStore};
use std::env;
use std::path::Path;

const USAGE: &str = "\
Usage: club-registry [COMMAND]

Commands:
  register <name> <email> <club>   Validate and store a registration
  list                             Print every registration
  search <query>                   Print registrations matching <query>
  export <file.csv>                Write every registration to a CSV file
  clubs                            Print the clubs that can be joined
  (none)                           Open the terminal browser";

fn main() -> Result<()> {
    telemetry::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let config = Config::from_env().context("Failed to load configuration")?;

    match args.first().map(String::as_str) {
        None => run_ui_mode(&config),
        Some("register") => run_register(&config, &args[1..]),
        Some("list") => run_search(&config, ""),
        Some("search") => run_search(&config, &args[1..].join(" ")),
        Some("export") => match args.get(1) {
            Some(out) => run_export(&config, Path::new(out)),
            None => bail!("export needs an output path\n\n{}", USAGE),
        },
        Some("clubs") => {
            for club in Club::ALL {
                println!("{:<12} {}", club.id(), club.label());
            }
            Ok(())
        }
        Some("help") | Some("--help") | Some("-h") => {
            println!("{}", USAGE);
            Ok(())
        }
        Some(other) => bail!("unknown command: {}\n\n{}", other, USAGE),
    }
}

fn run_register(config: &Config, args: &[String]) -> Result<()> {
    let [name, email, club] = args else {
        bail!("register takes exactly three arguments\n\n{}", USAGE);
    };

    let new = match validate(name, email, club) {
        Ok(new) => new,
        Err(errors) => {
            eprintln!("❌ Registration rejected:");
            for error in &errors {
                eprintln!("   - {}", error);
            }
            std::process::exit(2);
        }
    };

    let mut store = RegistrationStore::open(&config.data_file);
    let stored = store
        .append(new)
        .context("Failed to save registration")?
        .clone();

    println!("✓ Registered #{}: {}", store.len(), describe(&stored));
    Ok(())
}

fn run_search(config: &Config, query: &str) -> Result<()> {
    let store = RegistrationStore::open(&config.data_file);
    let hits = store.search_numbered(query);

    if hits.is_empty() {
        println!("No registrations found.");
        return Ok(());
    }

    for (id, registration) in hits {
        println!("#{:<4} {}", id, describe(registration));
    }
    Ok(())
}

fn run_export(config: &Config, out: &Path) -> Result<()> {
    let store = RegistrationStore::open(&config.data_file);
    export_csv(store.all(), out)?;
    println!("✓ Exported {} registrations to {:?}", store.len(), out);
    Ok(())
}

fn describe(registration: &Registration) -> String {
    format!(
        "{} <{}> {} ({})",
        registration.name,
        registration.email,
        registration.club.label(),
        registration.date_string()
    )
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &Config) -> Result<()> {
    let store = RegistrationStore::open(&config.data_file);
    let mut app = ui::App::new(store);
    ui::run_ui(&mut app)?;
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &Config) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or run a command, see: club-registry help");
    std::process::exit(1);
}
