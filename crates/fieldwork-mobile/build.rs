use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

use serde::Serialize;

#[derive(Debug, Default, Serialize)]
struct MobileBuildConfig {
    api_base_url: Option<String>,
    allowed_creators: Vec<String>,
}

fn main() {
    println!("cargo:rerun-if-env-changed=FIELDWORK_API_BASE_URL");
    println!("cargo:rerun-if-env-changed=FIELDWORK_ALLOWED_CREATORS");

    if let Err(error) = write_mobile_build_config() {
        println!("cargo:warning=failed to generate mobile build config: {error}");
        // The crate include_str!s this file, so an empty config must exist.
        if let Some(out_dir) = env::var_os("OUT_DIR").map(PathBuf::from) {
            let _ = fs::write(out_dir.join("mobile-build-config.json"), "{}");
        }
    }
}

fn write_mobile_build_config() -> io::Result<()> {
    load_workspace_dotenv();

    let out_dir = env::var_os("OUT_DIR")
        .map(PathBuf::from)
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "OUT_DIR is not set"))?;
    fs::create_dir_all(&out_dir)?;

    let config = MobileBuildConfig {
        api_base_url: env_var_trimmed("FIELDWORK_API_BASE_URL"),
        allowed_creators: env_var_trimmed("FIELDWORK_ALLOWED_CREATORS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
    };

    let content = serde_json::to_string_pretty(&config)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error.to_string()))?;
    fs::write(out_dir.join("mobile-build-config.json"), content)?;
    Ok(())
}

fn load_workspace_dotenv() {
    let manifest_dir =
        env::var_os("CARGO_MANIFEST_DIR").map_or_else(|| PathBuf::from("."), PathBuf::from);
    let dotenv = manifest_dir.join("..").join("..").join(".env");
    if dotenv.exists() {
        println!("cargo:rerun-if-changed={}", dotenv.display());
        let _ = dotenvy::from_path(dotenv);
    }
}

fn env_var_trimmed(name: &str) -> Option<String> {
    let value = env::var(name).ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
