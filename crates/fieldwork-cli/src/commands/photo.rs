use fieldwork_core::files::photo_upload_name;
use fieldwork_core::util::unix_timestamp_millis;

use crate::cli::PhotoCommands;
use crate::commands::common::{parse_work_order_id, read_photo, Context, GlobalArgs};
use crate::commands::strokes::StrokeScript;
use crate::error::CliError;

pub async fn run_photo(command: PhotoCommands, global: GlobalArgs<'_>) -> Result<(), CliError> {
    match command {
        PhotoCommands::Add { id, paths } => {
            let id = parse_work_order_id(&id)?;
            let timestamp = unix_timestamp_millis();
            let photos = paths
                .iter()
                .enumerate()
                .map(|(index, path)| read_photo(path, &photo_upload_name(timestamp, index)))
                .collect::<Result<Vec<_>, _>>()?;

            let (context, _) = Context::signed_in(global)?;
            context.api.upload_photos(id, &photos).await?;
            println!("Uploaded {} photo(s) to work order #{id}", photos.len());
            Ok(())
        }
        PhotoCommands::Delete { id, key } => {
            let id = parse_work_order_id(&id)?;
            let (context, _) = Context::signed_in(global)?;
            context.api.delete_attachment(id, &key).await?;
            println!("Deleted {} from work order #{id}", key.trim());
            Ok(())
        }
        PhotoCommands::Sketch {
            id,
            strokes,
            output,
        } => {
            let id = parse_work_order_id(&id)?;
            let upload = StrokeScript::load(&strokes)?.render_sketch().export_upload()?;
            if let Some(output) = output {
                std::fs::write(&output, &upload.bytes)?;
                println!("{}", output.display());
                return Ok(());
            }

            let (context, _) = Context::signed_in(global)?;
            context
                .api
                .upload_photos(id, std::slice::from_ref(&upload))
                .await?;
            println!("Uploaded {} to work order #{id}", upload.file_name);
            Ok(())
        }
    }
}
