use albumtree::configuration::{create_config, ConfigFolder};
use albumtree::startup::{list_favourites, run};
use clap::{Arg, Command};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Command::new("albumtree")
        .about("📷 Browse users, albums and photos, and keep your favourites 📷")
        .subcommand(
            Command::new("run")
                .about("🚀 Open the catalog browser in this terminal")
                .arg(
                    Arg::new("route")
                        .long("route")
                        .value_name("FRAGMENT")
                        .help("Page to open first: catalog, favourites or anything else for home"),
                ),
        )
        .subcommand(Command::new("favourites").about("⭐ Print the photos you starred"))
        .subcommand(
            Command::new("config").about("🛠️ Create or update configuration file for albumtree"),
        )
        .get_matches();

    let cfg_folder = ConfigFolder::new()?;

    match args.subcommand() {
        Some(("run", sub)) => {
            println!("\x1b[1m\x1b[34mStarting albumtree...\x1b[0m");
            run(cfg_folder, sub.get_one::<String>("route").cloned()).await
        }
        Some(("favourites", _)) => list_favourites(cfg_folder),
        Some(("config", _)) => {
            println!("\x1b[1m\x1b[34mConfiguring albumtree...\x1b[0m");
            create_config(cfg_folder).map_err(|e| anyhow::anyhow!(e.to_string()))
        }
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn print_usage() {
    println!("\x1b[1m\x1b[31mInvalid command!\x1b[0m\n");
    println!("📖 Available Commands:");
    println!("  \x1b[1m\x1b[32malbumtree run\x1b[0m        - 🚀 Browse the catalog");
    println!("  \x1b[1m\x1b[32malbumtree favourites\x1b[0m - ⭐ List favourite photos");
    println!("  \x1b[1m\x1b[32malbumtree config\x1b[0m     - 🛠️  Create or update configuration file");
    println!("\x1b[33mAdd --route favourites to 'run' to open your favourites directly.\x1b[0m\n");
}
