/// # Entry Points of the Catalog Browser
///
/// `run` opens an interactive session on the catalog; `list_favourites` prints
/// the favourites page once.
///
/// # Steps of a session:
/// 1. Loads the configuration
/// 2. Opens the local favourites database
/// 3. Connects the HTTP data source
/// 4. Renders the start page and hands control to the terminal session
///
use crate::catalog::FavouritesView;
use crate::configuration::{self, ConfigFolder, Settings};
use crate::dom::render::render_text;
use crate::dom::RenderTarget;
use crate::{api_client, foundation::database, page, session};
use anyhow::Context;
use std::rc::Rc;

pub async fn run(cfg_folder: ConfigFolder, route: Option<String>) -> anyhow::Result<()> {
    if !config_exists(&cfg_folder) {
        return Ok(());
    }

    let (settings, favourites) = load(&cfg_folder)?;
    let source = api_client::HttpDataSource::new(&settings.api_settings)
        .context("Unable to build the HTTP client")?;

    let target = RenderTarget::new();
    let controller = page::PageController::new(target.clone(), Rc::new(source), favourites);
    let start_fragment = route.unwrap_or(settings.display_settings.start_route);

    println!("\x1b[1m\x1b[34mOpening {}...\x1b[0m", settings.api_settings.api_base_url);
    let local = tokio::task::LocalSet::new();
    let result = local
        .run_until(session::run_session(
            controller,
            target.clone(),
            &start_fragment,
            settings.display_settings.max_label_width,
        ))
        .await;
    target.clear();
    result
}

pub fn list_favourites(cfg_folder: ConfigFolder) -> anyhow::Result<()> {
    if !config_exists(&cfg_folder) {
        return Ok(());
    }

    let (settings, favourites) = load(&cfg_folder)?;
    let target = RenderTarget::new();
    let view = FavouritesView::mount(&target, target.root(), &favourites);

    if view.photos().is_empty() {
        println!("\x1b[33mNo favourites yet. Star a photo in 'albumtree run' first.\x1b[0m");
    } else {
        print!(
            "{}",
            render_text(&target, settings.display_settings.max_label_width)
        );
    }
    Ok(())
}

fn config_exists(cfg_folder: &ConfigFolder) -> bool {
    if !cfg_folder.config_dir.exists() || !cfg_folder.config_file.exists() {
        eprintln!(
            "\x1b[1m\x1b[31mConfiguration folder or config.yaml not found. Please run 'albumtree config' first.\x1b[0m"
        );
        return false;
    }
    true
}

fn load(cfg_folder: &ConfigFolder) -> anyhow::Result<(Settings, database::Favourites)> {
    let config_file = cfg_folder
        .config_file
        .to_str()
        .context("Failed to convert the configuration path to a string")?;
    let settings = configuration::get_configuration(config_file)
        .context("Unable to parse configuration file")?;

    let db_path = cfg_folder
        .favourites_db
        .to_str()
        .context("Failed to convert the database path to a string")?;
    let store = database::open_favourites_store(db_path)
        .with_context(|| format!("Unable to open the favourites database at {}", db_path))?;

    Ok((settings, database::Favourites::new(Rc::new(store))))
}
