use clap::{Parser, Subcommand};
use draftpad::config::{self, Config};
use draftpad::persistence::{self, PersistError};
use draftpad::richtext::html;
use draftpad::richtext::raw;
use draftpad::richtext::structured_document::BlockType;
use draftpad::richtext::style_map::StyleMap;
use draftpad::session::EditorSession;
use draftpad::storage::FileStore;
use std::path::PathBuf;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(name = "draftpad")]
#[command(about = "Inspect and edit the saved draftpad document", long_about = None)]
struct Args {
    /// Store file (default: platform data directory)
    #[arg(long, value_name = "PATH")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the document's blocks as plain text
    Show,
    /// Print the stored raw JSON
    Raw,
    /// Export the document as HTML
    Html,
    /// Type text into the end of the document, autoformat included, and save
    Type {
        /// Text to type; "\n" splits blocks
        text: String,
    },
    /// Delete the saved document
    Clear,
}

fn cmd_show(store: &FileStore) -> Result<(), PersistError> {
    let document = persistence::load_document(store)?;
    for block in document.blocks() {
        match block.block_type {
            BlockType::Unstyled => println!("{}", block.to_plain_text()),
            other => println!("[{}] {}", other.name(), block.to_plain_text()),
        }
    }
    Ok(())
}

fn cmd_raw(store: &FileStore) -> Result<(), PersistError> {
    let document = persistence::load_document(store)?;
    let json = serde_json::to_string_pretty(&raw::convert_to_raw(&document))
        .map_err(PersistError::Encode)?;
    println!("{json}");
    Ok(())
}

fn cmd_html(store: &FileStore) -> Result<(), PersistError> {
    let document = persistence::load_document(store)?;
    println!("{}", html::to_html(&document, &StyleMap::default()));
    Ok(())
}

fn cmd_type(store: FileStore, text: &str) -> Result<(), PersistError> {
    let mut session = EditorSession::open(Box::new(store))?;
    let end = session.editor().document().end_position();
    session.editor_mut().set_cursor(end);
    session.type_text(&text.replace("\\n", "\n"));
    session.save()
}

fn cmd_clear(mut store: FileStore) -> Result<(), PersistError> {
    persistence::clear_document(&mut store)
}

fn main() {
    let args = Args::parse();

    let (config, config_err) = Config::load_user_config();
    config::init_logging(config.log_filter.as_deref());
    if let Some(err) = config_err {
        warn!(%err, "using default settings");
    }

    let Some(path) = args.store.or_else(|| config.resolved_store_path()) else {
        eprintln!("Error: no store path given and no data directory available");
        std::process::exit(1);
    };
    let store = FileStore::new(path);

    let result = match args.command {
        Commands::Show => cmd_show(&store),
        Commands::Raw => cmd_raw(&store),
        Commands::Html => cmd_html(&store),
        Commands::Type { text } => cmd_type(store, &text),
        Commands::Clear => cmd_clear(store),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
