use crate::commands::common::{parse_work_order_id, Context, GlobalArgs};
use crate::error::CliError;

pub async fn run_note(id: &str, text: &[String], global: GlobalArgs<'_>) -> Result<(), CliError> {
    let id = parse_work_order_id(id)?;
    let text = text.join(" ");
    let (context, _) = Context::signed_in(global)?;
    let notes = context.api.add_note(id, &text).await?;

    println!("Added note to work order #{id} ({} total)", notes.len());
    if let Some(latest) = notes.first() {
        let header = latest.header();
        if !header.is_empty() {
            println!("  {header}");
        }
        println!("    {}", latest.text);
    }
    Ok(())
}
