use config::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

#[derive(Deserialize)]
pub struct Settings {
    pub api_settings: ApiSettings,
    #[serde(default)]
    pub display_settings: DisplaySettings,
}

#[derive(Deserialize)]
pub struct ApiSettings {
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl ApiSettings {
    pub fn new(url: &str, request_timeout_secs: u64) -> Self {
        Self {
            api_base_url: url.to_string(),
            request_timeout_secs,
        }
    }
}

#[derive(Deserialize)]
pub struct DisplaySettings {
    /// Fragment shown when a session starts, e.g. `catalog`.
    #[serde(default)]
    pub start_route: String,
    /// Labels longer than this many characters are shortened; 0 keeps them whole.
    #[serde(default = "default_max_label_width")]
    pub max_label_width: usize,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            start_route: String::new(),
            max_label_width: default_max_label_width(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_max_label_width() -> usize {
    60
}

pub fn get_configuration(cfg_file: &str) -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::new(cfg_file, config::FileFormat::Yaml))
        .build()?;

    settings.try_deserialize::<Settings>()
}

pub struct ConfigFolder {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
    pub favourites_db: PathBuf,
}

impl ConfigFolder {
    pub fn new() -> io::Result<Self> {
        let home_dir = env::var("HOME").map_err(|_| {
            io::Error::new(io::ErrorKind::NotFound, "HOME environment variable is not set")
        })?;

        Ok(Self::in_home(Path::new(&home_dir)))
    }

    pub fn in_home(home_dir: &Path) -> Self {
        Self {
            config_dir: get_config_dir_name(home_dir),
            config_file: get_config_file_name(home_dir),
            favourites_db: get_favourites_db_name(home_dir),
        }
    }
}

fn get_config_dir_name(home_dir: &Path) -> PathBuf {
    home_dir.join(".albumtree")
}

fn get_config_file_name(home_dir: &Path) -> PathBuf {
    home_dir.join(".albumtree").join("config.yaml")
}

fn get_favourites_db_name(home_dir: &Path) -> PathBuf {
    home_dir.join(".albumtree").join("favourites_db")
}

pub fn create_config(cfg_folder: ConfigFolder) -> Result<(), Box<dyn std::error::Error>> {
    println!("\x1b[1m\x1b[32mCreating configuration...\x1b[0m");
    let config_dir = &cfg_folder.config_dir;

    if config_dir.exists() && !confirm_overwrite()? {
        println!("\x1b[33mOperation cancelled.\x1b[0m");
        return Ok(());
    }

    write_config_files(&cfg_folder)?;

    println!("\x1b[32mConfiguration folder created at:");
    println!("  -> ~/.albumtree");
    println!("Configuration file created at:");
    println!("  -> ~/.albumtree/config.yaml");
    println!("Favourites database folder created at:");
    println!("  -> ~/.albumtree/favourites_db");
    println!("\x1b[0mEdit the configuration file to point at a different API if needed.");

    Ok(())
}

fn write_config_files(cfg_folder: &ConfigFolder) -> io::Result<()> {
    fs::create_dir_all(&cfg_folder.config_dir)?;
    fs::create_dir_all(&cfg_folder.favourites_db)?;

    let config_content = include_str!("config_template.yaml");
    fs::write(&cfg_folder.config_file, config_content)
}

fn confirm_overwrite() -> Result<bool, io::Error> {
    println!("\x1b[31mThe configuration folder already exists.");
    println!("Do you want to overwrite the configuration file? Favourites are kept. (y/N)\x1b[0m");

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    if input.trim().to_lowercase() == "y" {
        Ok(true)
    } else {
        Ok(false)
    }
}
