use fieldwork_core::config::normalize_api_base_url;
use fieldwork_core::util::normalize_text_option;

use crate::cli::ConfigCommands;
use crate::commands::common::GlobalArgs;
use crate::config_profiles::{parse_allowed_creators, CliProfile, CliProfilesConfig};
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, global: GlobalArgs<'_>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            api_base_url,
            allowed_creators,
            no_activate,
        } => {
            let mut config = CliProfilesConfig::load()?;
            let profile_name = config.resolve_profile_name(global.profile);
            let profile = config.profile_mut_or_default(&profile_name);
            update_profile(profile, api_base_url, allowed_creators.as_deref())?;
            if !no_activate {
                config.active_profile = Some(profile_name.clone());
            }

            let path = config.save()?;
            println!(
                "Profile '{}' initialized at {}",
                profile_name,
                path.display()
            );
            println!(
                "Run `fieldwork auth login --username <name> --password <password>` to sign in."
            );
            Ok(())
        }
        ConfigCommands::Show => {
            let config = CliProfilesConfig::load()?;
            let profile_name = config.resolve_profile_name(global.profile);
            let profile = config.profile(&profile_name).cloned().unwrap_or_default();
            let resolved = profile.client_config(global.api_url.map(str::to_string))?;

            println!("Profile:          {profile_name}");
            println!("API base URL:     {}", resolved.api_base_url);
            println!("Request timeout:  {}s", resolved.request_timeout_secs);
            if resolved.allowed_creators.is_empty() {
                println!("Allowed creators: (anyone)");
            } else {
                println!("Allowed creators: {}", resolved.allowed_creators.join(", "));
            }
            Ok(())
        }
    }
}

/// Applies `config init` flags to a profile, validating the base URL.
pub fn update_profile(
    profile: &mut CliProfile,
    api_base_url: Option<String>,
    allowed_creators: Option<&str>,
) -> Result<(), CliError> {
    if let Some(url) = normalize_text_option(api_base_url) {
        profile.api_base_url = Some(normalize_api_base_url(&url)?);
    }
    if let Some(raw) = allowed_creators {
        profile.allowed_creators = parse_allowed_creators(raw);
    }
    Ok(())
}
