use crate::{
    code::{execute::ProcessExecutor, sandbox::ExecutionSandbox},
    commands::listener::CommandListener,
    config::{Config, ConfigLoadError},
    deck::{Deck, position::PositionStore},
    manifest::Manifest,
    presenter::{Presenter, PresenterOptions},
    render::draw::{TerminalDrawer, TerminalDrawerOptions},
    slide::{Slide, func::FunctionRegistry},
    terminal::printer::Terminal,
};
use directories::ProjectDirs;
use std::{
    env, io,
    path::{Path, PathBuf},
    rc::Rc,
};

/// How a presentation is launched.
pub struct LaunchOptions {
    /// The path to the presentation manifest.
    pub manifest: PathBuf,

    /// Start at the slide the last run ended on.
    pub resume: bool,

    /// Show the footer.
    pub show_footer: bool,
}

const CONFIG_ENV: &str = "LIVEDECK_CONFIG";

/// The directory the config file lives in.
fn config_directory() -> Option<PathBuf> {
    match env::var("XDG_CONFIG_HOME") {
        Ok(path) => Some(Path::new(&path).join("livedeck")),
        Err(_) => ProjectDirs::from("", "", "livedeck").map(|dirs| dirs.config_dir().to_path_buf()),
    }
}

/// Load the config, falling back to the defaults if there's none.
pub fn load_config(path: Option<PathBuf>) -> Result<Config, ConfigLoadError> {
    let Some(path) = path.or_else(|| config_directory().map(|dir| dir.join("config.yaml"))) else {
        return Ok(Config::default());
    };
    match Config::load(&path) {
        Ok(config) => {
            tracing::info!("loaded config from {}", path.display());
            Ok(config)
        }
        Err(ConfigLoadError::NotFound) => Ok(Config::default()),
        Err(e) => Err(e),
    }
}

/// The directory slide sources and snippets are relative to.
fn base_directory(manifest: &Path) -> PathBuf {
    match manifest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn check_languages(deck: &Deck, sandbox: &ExecutionSandbox) {
    for (index, slide) in deck.slides().enumerate() {
        let Slide::Code(slide) = slide else {
            continue;
        };
        if !sandbox.is_execution_supported(slide.language()) {
            tracing::warn!("slide {index} contains {} code which can't be executed", slide.language());
        }
    }
}

/// Load a presentation and present it until the user exits.
pub fn launch(options: LaunchOptions) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(env::var_os(CONFIG_ENV).map(PathBuf::from))?;
    let base_dir = base_directory(&options.manifest);
    tracing::info!("loading presentation from {}", options.manifest.display());

    let store = PositionStore::new(config.defaults.position_file);
    let manifest = Manifest::load(&options.manifest)?;
    let mut deck = manifest.build_deck(&base_dir, &FunctionRegistry::default(), Some(store))?;
    if options.resume {
        deck.resume();
    }

    let executor = ProcessExecutor::new(config.snippet.custom, base_dir)?;
    let sandbox = ExecutionSandbox::new(Rc::new(executor), config.snippet.command_output);
    check_languages(&deck, &sandbox);
    let mut commands = CommandListener::new(config.bindings)?;
    let presenter_options = PresenterOptions {
        theme: config.defaults.theme,
        editor: config.defaults.editor,
        hints: commands.footer_hints(),
    };

    let drawer_options =
        TerminalDrawerOptions { max_columns: config.defaults.max_columns, show_footer: options.show_footer };
    let drawer = TerminalDrawer::new(Terminal::new(io::stdout())?, drawer_options);
    Presenter::new(deck, sandbox, drawer, presenter_options).present(&mut commands)?;
    Ok(())
}
