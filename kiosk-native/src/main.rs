//! StripBooth kiosk - GTK4 + GStreamer front end for the strip booth.

use std::sync::Arc;

use libadwaita as adw;
use libadwaita::prelude::*;

use stripbooth::app::AppContext;
use stripbooth::config::Settings;
use stripbooth::ui::MainWindow;

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting StripBooth");

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Invalid settings, using defaults: {}", e);
            Settings::default()
        }
    };

    // Create tokio runtime for export encoding
    let runtime = Arc::new(
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .expect("Failed to create tokio runtime"),
    );

    let app = adw::Application::builder()
        .application_id("com.stripbooth.kiosk")
        .build();

    app.connect_activate(move |app| {
        let (ctx, mut rx) = match AppContext::new(runtime.clone(), &settings) {
            Ok(pair) => pair,
            Err(e) => {
                log::error!("Failed to start camera: {}", e);
                app.quit();
                return;
            }
        };

        let main_window = MainWindow::new(app, ctx);

        // Poll the tokio channel from the GTK main loop
        let window = main_window.clone();
        glib::timeout_add_local(std::time::Duration::from_millis(16), move || {
            while let Ok(msg) = rx.try_recv() {
                window.handle_message(msg);
            }
            glib::ControlFlow::Continue
        });

        main_window.window.present();
    });

    app.run();

    log::info!("StripBooth shutting down");
}
