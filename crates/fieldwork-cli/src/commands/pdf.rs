use std::path::Path;

use fieldwork_core::annotate::{layout_pages, AnnotationSession, LayoutBounds, PageLayout};
use fieldwork_core::files::{pdf_upload_name, CacheDir, UploadFile};
use fieldwork_core::util::unix_timestamp_millis;
use fieldwork_core::{WorkOrder, WorkOrderId};

use crate::cli::PdfCommands;
use crate::commands::common::{parse_work_order_id, read_pdf, Context, GlobalArgs};
use crate::commands::strokes::StrokeScript;
use crate::error::CliError;

pub async fn run_pdf(command: PdfCommands, global: GlobalArgs<'_>) -> Result<(), CliError> {
    match command {
        PdfCommands::Download { id, output } => run_download(&id, output.as_deref(), global).await,
        PdfCommands::Attach { id, path } => run_attach(&id, &path, global).await,
        PdfCommands::Layout { path, viewer } => {
            let bounds = if viewer {
                LayoutBounds::VIEWER
            } else {
                LayoutBounds::ANNOTATOR
            };
            for line in format_layout_lines(&layout_pages(&std::fs::read(&path)?, bounds)?) {
                println!("{line}");
            }
            Ok(())
        }
        PdfCommands::Annotate {
            id,
            strokes,
            input,
            output,
        } => {
            let script = StrokeScript::load(&strokes)?;
            match (input, output, id) {
                (Some(input), Some(output), _) => {
                    let flattened = annotate_bytes(std::fs::read(&input)?, &script)?;
                    std::fs::write(&output, flattened.bytes)?;
                    println!(
                        "Wrote {} ({} inked page(s))",
                        output.display(),
                        flattened.inked_pages
                    );
                    Ok(())
                }
                (input, output, Some(id)) => {
                    run_annotate_order(&id, &script, input.as_deref(), output.as_deref(), global)
                        .await
                }
                (_, _, None) => Err(CliError::InvalidArgument(
                    "Pass a work order ID, or both --input and --output".to_string(),
                )),
            }
        }
    }
}

pub fn format_layout_lines(layouts: &[PageLayout]) -> Vec<String> {
    layouts
        .iter()
        .map(|page| {
            format!(
                "page {:>3}: {:.0}x{:.0} pt  rotate {:>3}  canvas {}x{} px  scale {:.3}",
                page.index + 1,
                page.width_pt,
                page.height_pt,
                page.rotation,
                page.canvas_width,
                page.canvas_height,
                page.scale
            )
        })
        .collect()
}

#[derive(Debug)]
pub struct Flattened {
    pub bytes: Vec<u8>,
    pub inked_pages: usize,
}

/// Opens `pdf`, replays `script`, and flattens the ink.
pub fn annotate_bytes(pdf: Vec<u8>, script: &StrokeScript) -> Result<Flattened, CliError> {
    let mut session = AnnotationSession::open(pdf)?;
    script.apply_to_session(&mut session)?;
    let inked_pages = session.inked_pages().len();
    Ok(Flattened {
        bytes: session.flatten()?,
        inked_pages,
    })
}

async fn fetch_order_pdf(
    context: &Context,
    id: WorkOrderId,
) -> Result<(WorkOrder, Vec<u8>), CliError> {
    let order = context.api.get_work_order(id).await?;
    let key = order
        .pdf_key()
        .ok_or_else(|| CliError::NoPdf(id.to_string()))?
        .to_string();
    let bytes = context.api.download_file(&key).await?;
    Ok((order, bytes))
}

async fn run_download(
    id: &str,
    output: Option<&Path>,
    global: GlobalArgs<'_>,
) -> Result<(), CliError> {
    let id = parse_work_order_id(id)?;
    let (context, _) = Context::signed_in(global)?;
    let (_, bytes) = fetch_order_pdf(&context, id).await?;

    let path = if let Some(path) = output {
        std::fs::write(path, &bytes)?;
        path.to_path_buf()
    } else {
        let cache = CacheDir::platform_default()?;
        let path = cache.preview_pdf_path(id);
        cache.write(&path, &bytes)?;
        path
    };
    println!("{}", path.display());
    Ok(())
}

async fn run_attach(id: &str, path: &Path, global: GlobalArgs<'_>) -> Result<(), CliError> {
    let id = parse_work_order_id(id)?;
    let pdf = read_pdf(path)?;
    let upload = UploadFile::pdf(pdf_upload_name(unix_timestamp_millis()), pdf.bytes)?;
    let (context, _) = Context::signed_in(global)?;
    context.api.replace_pdf(id, &upload).await?;
    println!("Attached {} to work order #{id}", path.display());
    Ok(())
}

async fn run_annotate_order(
    id: &str,
    script: &StrokeScript,
    input: Option<&Path>,
    output: Option<&Path>,
    global: GlobalArgs<'_>,
) -> Result<(), CliError> {
    let id = parse_work_order_id(id)?;
    let (context, _) = Context::signed_in(global)?;
    let cache = CacheDir::platform_default()?;

    let (order, source) = if let Some(input) = input {
        (context.api.get_work_order(id).await?, std::fs::read(input)?)
    } else {
        let (order, bytes) = fetch_order_pdf(&context, id).await?;
        cache.write(&cache.annotation_source_path(id), &bytes)?;
        (order, bytes)
    };

    let flattened = annotate_bytes(source, script)?;
    if flattened.inked_pages == 0 {
        println!("No ink on any page; nothing to save.");
        return Ok(());
    }

    if let Some(output) = output {
        std::fs::write(output, &flattened.bytes)?;
        println!("{}", output.display());
        return Ok(());
    }

    let signed_path = cache.signed_pdf_path(unix_timestamp_millis());
    cache.write(&signed_path, &flattened.bytes)?;
    let upload = UploadFile::pdf(order.signed_pdf_file_name(), flattened.bytes)?;
    context.api.replace_pdf(id, &upload).await?;
    println!(
        "Uploaded {} ({} inked page(s)) to work order #{id}",
        upload.file_name, flattened.inked_pages
    );
    Ok(())
}
