//! Fieldwork Mobile Application
//!
//! Android shell entrypoint for the Dioxus mobile app.

#[cfg(target_os = "android")]
mod app;
#[cfg(any(target_os = "android", test))]
mod attachments;
#[cfg(any(target_os = "android", test))]
mod config;
#[cfg(any(target_os = "android", test))]
mod navigation;
#[cfg(any(target_os = "android", test))]
mod paths;
#[cfg(any(target_os = "android", test))]
mod preview;
#[cfg(any(target_os = "android", test))]
mod secret_store;
#[cfg(target_os = "android")]
mod ui;
#[cfg(target_os = "android")]
mod views;

#[cfg(target_os = "android")]
fn main() {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "fieldwork=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting Fieldwork mobile shell...");
    dioxus::LaunchBuilder::mobile().launch(app::App);
}

#[cfg(not(target_os = "android"))]
fn main() {
    println!(
        "fieldwork-mobile is intended for Android targets. Try: cargo build -p fieldwork-mobile --target aarch64-linux-android"
    );
}
