use chrono::Local;
use clap::Parser;
use draftpad::config::{self, Config};
use draftpad::fltk_editor::FltkEditor;
use draftpad::richtext::rich_display::RichDisplay;
use draftpad::session::EditorSession;
use draftpad::statusbar::StatusBar;
use draftpad::storage::{FileStore, KeyValueStore, MemoryStore};
use draftpad::theme::Theme;
use draftpad::window_state::{self, WindowGeometry};
use fltk::{prelude::*, *};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;
use tracing::{error, info, warn};

const TITLE_HEIGHT: i32 = 40;
const STATUS_HEIGHT: i32 = 25;

#[derive(Parser, Debug)]
#[command(name = "draftpad-gui")]
#[command(about = "A small rich text editor with autoformat shortcuts", long_about = None)]
struct Args {
    /// Store file to load from and save to (default: platform data directory)
    #[arg(long, value_name = "PATH")]
    store: Option<PathBuf>,
}

fn open_store(path: Option<PathBuf>) -> Box<dyn KeyValueStore> {
    match path {
        Some(path) => {
            let store = FileStore::new(path);
            info!(path = %store.path().display(), "using file store");
            Box::new(store)
        }
        None => {
            warn!("no data directory available, saves only last for this run");
            Box::new(MemoryStore::new())
        }
    }
}

fn main() {
    let args = Args::parse();

    let (config, config_err) = Config::load_user_config();
    config::init_logging(config.log_filter.as_deref());
    if let Some(err) = config_err {
        warn!(%err, "using default settings");
    }

    let store = open_store(args.store.or_else(|| config.resolved_store_path()));
    let session = match EditorSession::open(store) {
        Ok(session) => Rc::new(RefCell::new(session)),
        Err(err) => {
            error!(%err, "failed to load saved document");
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };

    let app = app::App::default();

    let state_path = window_state::state_file_path();
    let geometry = state_path
        .as_deref()
        .and_then(window_state::load_state)
        .unwrap_or_default();

    let mut wind = window::Window::new(
        geometry.x,
        geometry.y,
        geometry.width,
        geometry.height,
        "Draftpad",
    );
    wind.begin();

    let mut title = frame::Frame::new(0, 0, geometry.width, TITLE_HEIGHT, "Demo Editor");
    title.set_label_font(enums::Font::HelveticaBold);
    title.set_label_size(18);
    title.set_align(enums::Align::Left | enums::Align::Inside);

    let mut display = RichDisplay::new(0, 0, 0, 0);
    display.set_theme(Theme::with_font_size(config.font_size));
    let mut editor = FltkEditor::new(
        0,
        TITLE_HEIGHT,
        geometry.width,
        geometry.height - TITLE_HEIGHT - STATUS_HEIGHT,
        session.clone(),
        display,
    );
    editor
        .group
        .set_color(enums::Color::from_rgb(255, 255, 245));

    let statusbar = Rc::new(RefCell::new(StatusBar::new(
        0,
        geometry.height - STATUS_HEIGHT,
        geometry.width,
        STATUS_HEIGHT,
    )));

    wind.end();
    wind.resizable(&editor.group);
    wind.show();
    editor.group.take_focus().ok();

    let save: Rc<dyn Fn()> = Rc::new({
        let session = session.clone();
        let statusbar = statusbar.clone();
        move || {
            let result = session.borrow_mut().save();
            let status = match result {
                Ok(()) => session.borrow().status_text(Local::now()),
                Err(err) => {
                    error!(%err, "save failed");
                    format!("save failed: {err}")
                }
            };
            statusbar.borrow_mut().set_status(&status);
        }
    });

    editor.set_save_callback(Some(Box::new({
        let save = save.clone();
        move || save()
    })));
    statusbar.borrow_mut().on_save({
        let save = save.clone();
        let mut editor_group = editor.group.clone();
        move |_| {
            save();
            editor_group.take_focus().ok();
        }
    });

    editor.set_change_callback(Some(Box::new({
        let session = session.clone();
        let statusbar = statusbar.clone();
        move || {
            let status = session.borrow().status_text(Local::now());
            statusbar.borrow_mut().set_status(&status);
        }
    })));

    // Keep the status bar in place below the editor
    wind.resize_callback({
        let statusbar = statusbar.clone();
        let mut title = title.clone();
        let mut editor_group = editor.group.clone();
        move |_, _, _, w, h| {
            title.resize(0, 0, w, TITLE_HEIGHT);
            editor_group.resize(0, TITLE_HEIGHT, w, h - TITLE_HEIGHT - STATUS_HEIGHT);
            statusbar
                .borrow_mut()
                .resize(0, h - STATUS_HEIGHT, w, STATUS_HEIGHT);
        }
    });

    wind.set_callback(move |w| {
        if app::event() == enums::Event::Close {
            if let Some(path) = &state_path {
                let geometry = WindowGeometry {
                    x: w.x(),
                    y: w.y(),
                    width: w.w(),
                    height: w.h(),
                };
                if let Err(err) = window_state::save_state(path, &geometry) {
                    warn!(%err, "failed to save window state");
                }
            }
            w.hide();
        }
    });

    // Blink the caret and age the "saved ... ago" text
    {
        let start = Instant::now();
        let session = session.clone();
        let statusbar = statusbar.clone();
        let mut last_status = String::new();
        app::add_timeout3(0.1, move |handle| {
            editor.tick(start.elapsed().as_millis() as u64);

            let status = session.borrow().status_text(Local::now());
            if status != last_status {
                statusbar.borrow_mut().set_status(&status);
                last_status = status;
            }
            app::repeat_timeout3(0.1, handle);
        });
    }

    if let Err(err) = app.run() {
        error!(%err, "event loop failed");
        std::process::exit(1);
    }
}
