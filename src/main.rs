mod api;
mod config;
mod store;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use canvas::consts::{EXPORT_CANVAS_HEIGHT_PX, EXPORT_CANVAS_WIDTH_PX};
use canvas::engine::{Action, DesignerConfig, EngineCore};
use canvas::export;
use canvas::geom::CanvasRect;
use canvas::persist::{Persistence, StoreError};
use canvas::registry::Variable;

use api::{ApiClient, ApiError, Gallery};
use config::{API_KEY_VAR, API_PATH_VAR, ApiConfig, ConfigError};
use store::FileStore;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("store: {0}")]
    Store(#[from] StoreError),
    #[error("I/O error on {path}: {source}")]
    Io { path: String, source: std::io::Error },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "certdesk", about = "Certificate designer CLI: assets, variables, export and save")]
struct Cli {
    /// Directory holding the persisted design (one file per key).
    #[arg(long, env = "CERT_STORE_DIR", default_value = ".certdesk")]
    store_dir: PathBuf,

    #[arg(long, env = "CERT_API_PATH")]
    api_path: Option<String>,

    #[arg(long, env = "CERT_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the stored design as a standalone HTML document.
    Export {
        /// Output file; stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Substitute a `#{name}` marker, as `name=value`. Repeatable.
        #[arg(long = "var", value_parser = parse_var)]
        vars: Vec<(String, String)>,
    },
    /// Export the stored design and save it to the service as a template.
    Save {
        #[arg(long)]
        title: String,
    },
    /// Upload an image and register it in the gallery.
    Upload {
        path: PathBuf,
        /// Register as a background template instead of a photo.
        #[arg(long, default_value_t = false)]
        background: bool,
    },
    /// Fetch the image gallery and mirror it locally.
    Images,
    /// Fetch the variable list and mirror it locally.
    Variables,
    /// Create a variable on the service.
    AddVariable { name: String },
    /// Edit the stored design.
    Design(DesignCommand),
}

#[derive(Args, Debug)]
struct DesignCommand {
    #[arg(long, default_value_t = f64::from(EXPORT_CANVAS_WIDTH_PX))]
    width: f64,
    #[arg(long, default_value_t = f64::from(EXPORT_CANVAS_HEIGHT_PX))]
    height: f64,
    #[command(subcommand)]
    command: DesignSubcommand,
}

#[derive(Subcommand, Debug)]
enum DesignSubcommand {
    /// Print the stored elements as JSON.
    Show,
    /// Set the background to an uploaded template.
    Template { file: String },
    /// Remove the background.
    ClearTemplate,
    /// Add a default text field.
    AddText,
    /// Add an uploaded photo centred on the canvas.
    AddPhoto { file: String },
    /// Add a `#{name}` variable field at a canvas position.
    AddVariable {
        name: String,
        #[arg(long, default_value_t = 0.0)]
        x: f64,
        #[arg(long, default_value_t = 0.0)]
        y: f64,
    },
    /// Remove every element.
    Clear,
}

/// Parse a `name=value` pair.
fn parse_var(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got `{raw}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty variable name in `{raw}`"));
    }
    Ok((name.to_string(), value.to_string()))
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    if let Err(err) = dotenv {
        if !err.not_found() {
            warn!(error = %err, ".env could not be loaded");
        }
    }

    let cli = Cli::parse();
    let store_dir = cli.store_dir.clone();

    match cli.command {
        Command::Export { ref out, ref vars } => {
            let html = export_html(&store_dir, &vars.iter().cloned().collect());
            match out {
                Some(path) => {
                    write_file(path, &html)?;
                    info!(path = %path.display(), bytes = html.len(), "certificate exported");
                }
                None => print!("{html}"),
            }
            Ok(())
        }
        Command::Save { ref title } => {
            let client = api_client(&cli)?;
            let html = export_html(&store_dir, &HashMap::new());
            client.save_template(title, &html).await?;
            println!("saved \"{}\"", title.trim());
            Ok(())
        }
        Command::Upload { ref path, background } => {
            let client = api_client(&cli)?;
            let stored = client.upload(path).await?;
            client.register_image(&stored, background).await?;
            let mut gallery = Gallery::default();
            if background {
                gallery.templates.push(stored.clone());
            } else {
                gallery.photos.push(stored.clone());
            }
            mirror_gallery(&store_dir, &gallery)?;
            println!("{stored}");
            Ok(())
        }
        Command::Images => {
            let client = api_client(&cli)?;
            let gallery = client.images().await?;
            let added = mirror_gallery(&store_dir, &gallery)?;
            info!(added, "gallery mirrored");
            print_json(&serde_json::json!({ "templates": gallery.templates, "photos": gallery.photos }))
        }
        Command::Variables => {
            let client = api_client(&cli)?;
            let variables = client.variables().await?;
            sync_variables(&store_dir, variables.clone())?;
            print_json(&variables)
        }
        Command::AddVariable { ref name } => {
            let client = api_client(&cli)?;
            client.add_variable(name.trim()).await?;
            let variables = client.variables().await?;
            sync_variables(&store_dir, variables)?;
            Ok(())
        }
        Command::Design(ref design) => run_design(&store_dir, cli.api_path.as_deref(), design),
    }
}

fn api_client(cli: &Cli) -> Result<ApiClient, CliError> {
    let config = ApiConfig::from_lookup(|key| match key {
        API_PATH_VAR => cli.api_path.clone(),
        API_KEY_VAR => cli.api_key.clone(),
        _ => std::env::var(key).ok(),
    })?;
    Ok(ApiClient::new(config)?)
}

fn open(store_dir: &Path) -> Persistence {
    Persistence::new(FileStore::new(store_dir))
}

/// Merge `gallery` into the locally mirrored registry. Returns how many
/// entries were new.
fn mirror_gallery(store_dir: &Path, gallery: &Gallery) -> Result<usize, CliError> {
    let mut persistence = open(store_dir);
    let mut registry = persistence.load_registry();
    let templates = gallery.templates.iter().filter(|t| registry.add_template(t.as_str())).count();
    let photos = gallery.photos.iter().filter(|p| registry.add_photo(p.as_str())).count();
    persistence.save_registry(&registry)?;
    Ok(templates + photos)
}

fn sync_variables(store_dir: &Path, variables: Vec<Variable>) -> Result<(), CliError> {
    let mut persistence = open(store_dir);
    let mut registry = persistence.load_registry();
    registry.set_variables(variables);
    persistence.save_registry(&registry)?;
    Ok(())
}

fn export_html(store_dir: &Path, vars: &HashMap<String, String>) -> String {
    let persistence = open(store_dir);
    let elements = persistence.load_elements();
    let template = persistence.load_template();
    export::certificate_html(&elements, template.as_deref(), vars)
}

fn write_file(path: &Path, contents: &str) -> Result<(), CliError> {
    std::fs::write(path, contents).map_err(|source| CliError::Io { path: path.display().to_string(), source })
}

fn print_json(value: &impl serde::Serialize) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Apply one design edit through the engine so persistence mirrors it the
/// same way the browser does. A failed write is an error here: the store
/// directory is the only copy of the design.
fn run_design(store_dir: &Path, api_path: Option<&str>, design: &DesignCommand) -> Result<(), CliError> {
    let bounds = CanvasRect::sized(design.width, design.height);
    let config = match &design.command {
        DesignSubcommand::Show => return print_json(&open(store_dir).load_elements()),
        DesignSubcommand::Template { .. } | DesignSubcommand::AddPhoto { .. } => {
            DesignerConfig::new(api_path.ok_or(ConfigError::Missing { var: API_PATH_VAR })?)
        }
        _ => DesignerConfig::default(),
    };
    let mut core = EngineCore::with_persistence(config, open(store_dir));

    let action = match &design.command {
        DesignSubcommand::Show => Action::None,
        DesignSubcommand::Template { file } => {
            let url = core.config.asset_url(file);
            core.set_template(Some(url))
        }
        DesignSubcommand::ClearTemplate => core.set_template(None),
        DesignSubcommand::AddText => core.add_text(),
        DesignSubcommand::AddPhoto { file } => core.add_photo(bounds, file),
        DesignSubcommand::AddVariable { name, x, y } => {
            let at = canvas::geom::Point::new(*x, *y);
            core.drop_item(bounds, at, canvas::engine::DropPayload::Variable(name.trim().to_string()))
        }
        DesignSubcommand::Clear => core.clear(),
    };
    if let Some(err) = core.take_persist_error() {
        return Err(CliError::Store(err));
    }
    report(&action)
}

fn report(action: &Action) -> Result<(), CliError> {
    match action {
        Action::ElementAdded { index, element } => {
            println!("added #{index} {}", element.id);
            print_json(element)
        }
        Action::TemplateChanged(Some(url)) => {
            println!("template {url}");
            Ok(())
        }
        Action::TemplateChanged(None) => {
            println!("template cleared");
            Ok(())
        }
        Action::ElementsCleared => {
            println!("cleared");
            Ok(())
        }
        other => {
            println!("{other:?}");
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
