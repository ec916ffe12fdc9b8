use fieldwork_core::files::{pdf_upload_name, photo_upload_name, UploadFile};
use fieldwork_core::forms::{FormSubmission, WorkOrderForm};
use fieldwork_core::util::unix_timestamp_millis;
use fieldwork_core::WorkOrderStatus;

use crate::cli::{FileArgs, FormArgs};
use crate::commands::common::{parse_work_order_id, read_pdf, read_photo, Context, GlobalArgs};
use crate::error::CliError;

/// Overlays the given flags on `form`; omitted flags keep the form's values.
pub fn apply_form_args(form: &mut WorkOrderForm, args: &FormArgs) -> Result<(), CliError> {
    let text_fields = [
        (&mut form.po_number, &args.po),
        (&mut form.customer, &args.customer),
        (&mut form.site_location, &args.site),
        (&mut form.billing_address, &args.billing),
        (&mut form.problem_description, &args.problem),
    ];
    for (field, value) in text_fields {
        if let Some(value) = value {
            value.trim().clone_into(field);
        }
    }
    if let Some(status) = args.status.as_deref() {
        form.status = status
            .parse::<WorkOrderStatus>()
            .map_err(CliError::InvalidArgument)?;
    }
    Ok(())
}

/// Reads the attachment flags into upload parts named the way the app names them.
pub fn collect_files(args: &FileArgs, timestamp_ms: i64) -> Result<Vec<UploadFile>, CliError> {
    let mut files = Vec::with_capacity(args.photos.len() + 1);
    for (index, path) in args.photos.iter().enumerate() {
        files.push(read_photo(path, &photo_upload_name(timestamp_ms, index))?);
    }
    if let Some(path) = args.pdf.as_deref() {
        let pdf = read_pdf(path)?;
        files.push(UploadFile::pdf(pdf_upload_name(timestamp_ms), pdf.bytes)?);
    }
    Ok(files)
}

pub async fn run_create(
    fields: &FormArgs,
    files: &FileArgs,
    global: GlobalArgs<'_>,
) -> Result<(), CliError> {
    let mut form = WorkOrderForm::for_create();
    apply_form_args(&mut form, fields)?;
    form.validate()?;

    let (context, session) = Context::signed_in(global)?;
    if !context
        .api
        .config()
        .may_create_work_orders(session.username.as_deref())
    {
        return Err(CliError::NotAllowed(format!(
            "{} is not allowed to create work orders.",
            session.display_name()
        )));
    }

    let submission = FormSubmission::new(form, collect_files(files, unix_timestamp_millis())?)?;
    context.api.create_work_order(&submission).await?;
    println!("Created work order for {}", submission.form.customer);
    Ok(())
}

pub async fn run_edit(
    id: &str,
    fields: &FormArgs,
    files: &FileArgs,
    global: GlobalArgs<'_>,
) -> Result<(), CliError> {
    let id = parse_work_order_id(id)?;
    let (context, _) = Context::signed_in(global)?;
    let order = context.api.get_work_order(id).await?;

    let mut form = WorkOrderForm::from_work_order(&order);
    apply_form_args(&mut form, fields)?;
    let submission = FormSubmission::new(form, collect_files(files, unix_timestamp_millis())?)?;
    context.api.edit_work_order(id, &submission).await?;
    println!("Saved work order #{id}");
    Ok(())
}
