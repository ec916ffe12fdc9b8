use fieldwork_core::SessionPersistence;

use crate::auth::ProfileSessionStore;
use crate::cli::AuthCommands;
use crate::commands::common::{Context, GlobalArgs};
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

pub async fn run_auth(command: AuthCommands, global: GlobalArgs<'_>) -> Result<(), CliError> {
    match command {
        AuthCommands::Login { username, password } => {
            let context = Context::open(global)?;
            let session = context.api.login(&username, &password).await?;
            println!(
                "Signed in profile '{}' as {}",
                context.profile_name,
                session.display_name()
            );
            if let Some(role) = session.role.as_deref() {
                println!("Role: {role}");
            }
            Ok(())
        }
        AuthCommands::Whoami => {
            let (context, session) = Context::signed_in(global)?;
            let user = context.api.me().await?;
            let username = user
                .username
                .as_deref()
                .unwrap_or_else(|| session.display_name());
            match user.role.as_deref().or(session.role.as_deref()) {
                Some(role) => println!(
                    "Profile '{}' is signed in as {username} ({role})",
                    context.profile_name
                ),
                None => println!(
                    "Profile '{}' is signed in as {username}",
                    context.profile_name
                ),
            }
            Ok(())
        }
        AuthCommands::Logout => {
            let config = CliProfilesConfig::load()?;
            let profile_name = config.resolve_profile_name(global.profile);
            ProfileSessionStore::new(&profile_name).clear_session()?;
            println!("Signed out profile '{profile_name}'");
            Ok(())
        }
    }
}
