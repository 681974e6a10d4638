#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use eframe_photo::{EditorConfig, PhotoApp};

/// Reads the config named by `PHOTO_EDITOR_CONFIG`, falling back to defaults.
#[cfg(not(target_arch = "wasm32"))]
fn load_config() -> EditorConfig {
    let Ok(path) = std::env::var("PHOTO_EDITOR_CONFIG") else {
        return EditorConfig::default();
    };
    match EditorConfig::load(&path) {
        Ok(config) => config,
        Err(err) => {
            log::warn!("Ignoring config {}: {}", path, err);
            EditorConfig::default()
        }
    }
}

// When compiling natively:
#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let config = load_config();
    let startup_image = std::env::args().nth(1);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([640.0, 400.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Photo Editor",
        native_options,
        Box::new(move |cc| {
            let mut app = PhotoApp::new(cc, config);
            if let Some(path) = startup_image {
                match eframe_photo::ImageFile::from_path(std::path::Path::new(&path)) {
                    Ok(file) => app.load_image(file),
                    Err(err) => log::error!("Failed to read {}: {}", path, err),
                }
            }
            Ok(Box::new(app))
        }),
    )
}

// When compiling to web using trunk:
#[cfg(target_arch = "wasm32")]
fn main() {
    use eframe::wasm_bindgen::JsCast as _;

    // Redirect `log` message to `console.log` and friends:
    eframe::WebLogger::init(log::LevelFilter::Debug).ok();

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async {
        let document = web_sys::window()
            .expect("No window")
            .document()
            .expect("No document");

        let canvas = document
            .get_element_by_id("the_canvas_id")
            .expect("Failed to find the_canvas_id")
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .expect("the_canvas_id was not a HtmlCanvasElement");

        let start_result = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| Ok(Box::new(PhotoApp::new(cc, EditorConfig::default())))),
            )
            .await;

        if let Err(e) = start_result {
            log::error!("Failed to start eframe: {e:?}");
        }
    });
}
