use std::io::Cursor;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use fieldwork_core::calendar::CalendarMarks;
use fieldwork_core::config::ClientConfig;
use fieldwork_core::files::UploadField;
use fieldwork_core::filters::StatusFilter;
use fieldwork_core::forms::WorkOrderForm;
use fieldwork_core::{Note, WorkOrder, WorkOrderId, WorkOrderStatus};
use lopdf::{dictionary, Document, Object, Stream};
use pretty_assertions::assert_eq;

use crate::cli::{CompletionShell, FileArgs, FormArgs};
use crate::commands::calendar::{parse_month, render_calendar, render_month};
use crate::commands::common::{
    format_work_order_lines, parse_day, parse_work_order_id, truncate, work_order_to_list_item,
};
use crate::commands::completions::render_completions;
use crate::commands::config::update_profile;
use crate::commands::form::{apply_form_args, collect_files};
use crate::commands::list::parse_status_filter;
use crate::commands::pdf::annotate_bytes;
use crate::commands::show::render_work_order;
use crate::commands::strokes::{StrokeScript, ToolName};
use crate::config_profiles::CliProfile;
use crate::error::CliError;

fn order(id: i64) -> WorkOrder {
    WorkOrder {
        id: WorkOrderId::new(id),
        po_number: format!("PO-{id}"),
        customer: "Harbor Seafood".to_string(),
        site_location: "12 Harbor Rd, Portland ME".to_string(),
        billing_address: "PO Box 9, Portland ME".to_string(),
        problem_description: "Ice machine leaking".to_string(),
        status: WorkOrderStatus::Scheduled,
        scheduled_date: None,
        photo_path: None,
        pdf_path: None,
        notes: Vec::new(),
    }
}

fn local(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Local
        .with_ymd_and_hms(year, month, day, hour, 0, 0)
        .earliest()
        .expect("valid local time")
        .with_timezone(&Utc)
}

fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn blank_pdf(pages: usize) -> Vec<u8> {
    let mut document = Document::with_version("1.5");
    let pages_id = document.new_object_id();
    let mut kids: Vec<Object> = Vec::new();
    for _ in 0..pages {
        let content_id = document.add_object(Stream::new(dictionary! {}, b"0 0 m 10 10 l S".to_vec()));
        let page_id = document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {},
        });
        kids.push(page_id.into());
    }
    let count = kids.len() as i64;
    document.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    document.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    document.save_to(&mut bytes).expect("save pdf");
    bytes
}

#[test]
fn status_filter_accepts_all_today_and_statuses() {
    assert_eq!(parse_status_filter("all").unwrap(), StatusFilter::All);
    assert_eq!(parse_status_filter(" Today ").unwrap(), StatusFilter::Today);
    assert_eq!(
        parse_status_filter("waiting on parts").unwrap(),
        StatusFilter::Status(WorkOrderStatus::WaitingOnParts)
    );

    let error = parse_status_filter("Lost").unwrap_err();
    assert!(error.to_string().contains("Needs to be Scheduled"));
}

#[test]
fn work_order_ids_must_be_numeric() {
    assert_eq!(parse_work_order_id(" 42 ").unwrap(), WorkOrderId::new(42));
    assert!(matches!(
        parse_work_order_id("abc"),
        Err(CliError::InvalidWorkOrderId(raw)) if raw == "abc"
    ));
}

#[test]
fn days_and_months_parse_strictly() {
    assert_eq!(parse_day("2025-03-09").unwrap(), day(2025, 3, 9));
    assert!(parse_day("03/09/2025").is_err());

    assert_eq!(parse_month("2025-03").unwrap(), (2025, 3));
    assert!(parse_month("2025-13").is_err());
    assert!(parse_month("March").is_err());
}

#[test]
fn truncate_collapses_whitespace_and_adds_ellipsis() {
    assert_eq!(truncate("  short\n text ", 20), "short text");
    assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
}

#[test]
fn month_view_marks_scheduled_days_and_selection() {
    let mut orders = Vec::new();
    for id in 1..=5 {
        orders.push(WorkOrder {
            scheduled_date: Some(local(2025, 3, 12, 8 + id as u32)),
            ..order(id)
        });
    }
    let marks = CalendarMarks::build(&orders, day(2025, 3, 4), &Local);
    let lines = render_month(2025, 3, &marks);

    assert_eq!(lines[0], "March 2025");
    assert!(lines[1].starts_with(" Sun"));
    assert!(lines.iter().any(|line| line.contains("12***")));
    assert!(!lines.iter().any(|line| line.contains("12****")));
    assert!(lines.iter().any(|line| line.contains("[ 4   ]")));
}

#[test]
fn calendar_lists_orders_for_selected_day() {
    let orders = vec![
        WorkOrder {
            scheduled_date: Some(local(2025, 3, 12, 15)),
            ..order(7)
        },
        WorkOrder {
            scheduled_date: Some(local(2025, 3, 12, 9)),
            ..order(3)
        },
        WorkOrder {
            scheduled_date: Some(local(2025, 3, 13, 9)),
            ..order(9)
        },
    ];

    let lines = render_calendar(&orders, day(2025, 3, 12), None);
    let heading = lines
        .iter()
        .position(|line| line == "Work orders on 2025-03-12")
        .expect("day heading");
    let listed = &lines[heading + 1..];
    assert_eq!(listed.len(), 2);
    assert!(listed[0].starts_with("  #3"));
    assert!(listed[1].starts_with("  #7"));

    let empty = render_calendar(&orders, day(2025, 3, 20), Some((2025, 3)));
    assert_eq!(empty.last().map(String::as_str), Some("  None scheduled."));
}

#[test]
fn list_lines_show_po_placeholder_and_schedule() {
    let unscheduled = WorkOrder {
        po_number: "   ".to_string(),
        ..order(5)
    };
    let scheduled = WorkOrder {
        scheduled_date: Some(local(2025, 6, 1, 10)),
        ..order(6)
    };

    let lines = format_work_order_lines(&[unscheduled, scheduled]);
    assert!(lines[0].starts_with("#5      N/A"));
    assert!(lines[0].ends_with("Not Scheduled"));
    assert!(lines[1].ends_with("2025-06-01 10:00"));
}

#[test]
fn list_item_json_uses_camel_case() {
    let item = work_order_to_list_item(&order(11));
    let json = serde_json::to_value(&item).unwrap();
    assert_eq!(json["id"], 11);
    assert_eq!(json["poNumber"], "PO-11");
    assert_eq!(json["status"], "Scheduled");
    assert!(json["scheduled"].is_null());
}

#[test]
fn detail_view_lists_attachments_and_newest_note_first() {
    let detail = WorkOrder {
        photo_path: Some("a.jpg, b.jpg".to_string()),
        pdf_path: Some("form.pdf".to_string()),
        notes: vec![
            Note {
                text: "Ordered gasket".to_string(),
                by: Some("sam".to_string()),
                created_at: Some(Utc.with_ymd_and_hms(2025, 1, 2, 9, 0, 0).unwrap()),
            },
            Note {
                text: "Replaced gasket".to_string(),
                by: Some("sam".to_string()),
                created_at: Some(Utc.with_ymd_and_hms(2025, 1, 9, 9, 0, 0).unwrap()),
            },
        ],
        ..order(12)
    };

    let lines = render_work_order(&detail, |key| Some(format!("https://files.test/{key}")));
    assert_eq!(lines[0], "Work Order #12");
    assert!(lines.contains(&"Photos (2)".to_string()));
    assert!(lines.contains(&"  a.jpg  https://files.test/a.jpg".to_string()));
    assert!(lines.contains(&"PDF: form.pdf  https://files.test/form.pdf".to_string()));

    let newest = lines.iter().position(|line| line.contains("Replaced")).unwrap();
    let oldest = lines.iter().position(|line| line.contains("Ordered")).unwrap();
    assert!(newest < oldest);
}

#[test]
fn detail_view_without_attachments() {
    let lines = render_work_order(&order(1), |_| None);
    assert!(lines.contains(&"Photos (0)".to_string()));
    assert!(lines.contains(&"PDF: none".to_string()));
    assert!(lines.contains(&"Notes (0)".to_string()));
}

#[test]
fn form_flags_overlay_only_given_fields() {
    let mut form = WorkOrderForm::from_work_order(&order(4));
    let args = FormArgs {
        customer: Some("  Bay Market ".to_string()),
        status: Some("completed".to_string()),
        ..FormArgs::default()
    };
    apply_form_args(&mut form, &args).unwrap();

    assert_eq!(form.customer, "Bay Market");
    assert_eq!(form.po_number, "PO-4");
    assert_eq!(form.problem_description, "Ice machine leaking");
    assert_eq!(form.status, WorkOrderStatus::Completed);
}

#[test]
fn form_flags_reject_unknown_status() {
    let mut form = WorkOrderForm::for_create();
    let args = FormArgs {
        status: Some("Lost".to_string()),
        ..FormArgs::default()
    };
    assert!(matches!(
        apply_form_args(&mut form, &args),
        Err(CliError::InvalidArgument(_))
    ));
    assert_eq!(form.status, WorkOrderStatus::PartsIn);
}

#[test]
fn collected_files_use_upload_names() {
    let dir = tempfile::tempdir().unwrap();
    let photo_path = dir.path().join("IMG_0001.png");
    let mut png = Cursor::new(Vec::new());
    image::RgbImage::from_pixel(8, 8, image::Rgb([200, 10, 10]))
        .write_to(&mut png, image::ImageFormat::Png)
        .unwrap();
    std::fs::write(&photo_path, png.into_inner()).unwrap();
    let pdf_path = dir.path().join("quote.pdf");
    std::fs::write(&pdf_path, blank_pdf(1)).unwrap();

    let files = collect_files(
        &FileArgs {
            photos: vec![photo_path],
            pdf: Some(pdf_path),
        },
        1_700_000_000_000,
    )
    .unwrap();

    assert_eq!(files.len(), 2);
    assert_eq!(files[0].field, UploadField::Photo);
    assert_eq!(files[0].file_name, "photo-1700000000000-0.jpg");
    assert_eq!(files[0].mime_type, "image/jpeg");
    assert_eq!(files[1].field, UploadField::Pdf);
    assert_eq!(files[1].file_name, "workorder-1700000000000.pdf");
}

#[test]
fn stroke_scripts_accept_bare_and_wrapped_forms() {
    let bare = StrokeScript::parse(r#"[{"points": [[1, 2], [3, 4]]}]"#).unwrap();
    assert_eq!(bare.strokes.len(), 1);
    assert_eq!(bare.strokes[0].page, 1);
    assert_eq!(bare.strokes[0].tool, ToolName::Pen);
    assert_eq!(bare.width, None);

    let wrapped = StrokeScript::parse(
        r#"{"width": 300, "height": 200,
            "strokes": [{"page": 2, "tool": "eraser", "points": [[0, 0]]}]}"#,
    )
    .unwrap();
    assert_eq!(wrapped.width, Some(300));
    assert_eq!(wrapped.strokes[0].page, 2);
    assert_eq!(wrapped.strokes[0].tool, ToolName::Eraser);
}

#[test]
fn stroke_scripts_reject_page_zero_and_bad_json() {
    assert!(StrokeScript::parse(r#"[{"page": 0, "points": []}]"#).is_err());
    assert!(StrokeScript::parse("{not json").is_err());
}

#[test]
fn sketch_uses_script_size() {
    let script = StrokeScript::parse(
        r#"{"width": 120, "height": 80, "strokes": [{"points": [[10, 10], [100, 60]]}]}"#,
    )
    .unwrap();
    let pad = script.render_sketch();
    assert_eq!(pad.canvas().dimensions(), (120, 80));
    assert!(!pad.is_blank());
}

#[test]
fn sketch_scripts_reject_oversized_canvases() {
    let error = StrokeScript::parse(r#"{"width": 100000, "height": 80, "strokes": []}"#).unwrap_err();
    assert!(error.to_string().contains("at most 4096"));

    let edge = StrokeScript::parse(r#"{"width": 4096, "height": 4096, "strokes": []}"#).unwrap();
    assert_eq!(edge.width, Some(4096));
}

#[test]
fn annotating_flattens_inked_pages_only() {
    let source = blank_pdf(2);
    let script = StrokeScript::parse(
        r#"[{"page": 2, "points": [[20, 20], [200, 200]]}]"#,
    )
    .unwrap();

    let flattened = annotate_bytes(source.clone(), &script).unwrap();
    assert_eq!(flattened.inked_pages, 1);
    assert_ne!(flattened.bytes, source);

    let document = Document::load_mem(&flattened.bytes).unwrap();
    assert_eq!(document.get_pages().len(), 2);
}

#[test]
fn annotating_without_ink_keeps_bytes() {
    let source = blank_pdf(1);
    let flattened = annotate_bytes(source.clone(), &StrokeScript::default()).unwrap();
    assert_eq!(flattened.inked_pages, 0);
    assert_eq!(flattened.bytes, source);
}

#[test]
fn annotating_a_missing_page_fails() {
    let script = StrokeScript::parse(r#"[{"page": 3, "points": [[1, 1]]}]"#).unwrap();
    assert!(annotate_bytes(blank_pdf(1), &script).is_err());
}

#[test]
fn config_init_validates_base_url() {
    let mut profile = CliProfile::default();
    update_profile(
        &mut profile,
        Some("https://orders.example.com/".to_string()),
        Some("alex, sam"),
    )
    .unwrap();
    assert_eq!(
        profile.api_base_url.as_deref(),
        Some("https://orders.example.com")
    );
    assert_eq!(profile.allowed_creators, vec!["alex", "sam"]);

    assert!(update_profile(&mut profile, Some("orders.example.com".to_string()), None).is_err());
    assert_eq!(
        profile.api_base_url.as_deref(),
        Some("https://orders.example.com")
    );
}

#[test]
fn creator_gate_follows_profile() {
    let config = ClientConfig {
        allowed_creators: vec!["alex".to_string()],
        ..ClientConfig::new("https://orders.example.com").unwrap()
    };
    assert!(config.may_create_work_orders(Some("alex")));
    assert!(!config.may_create_work_orders(Some("sam")));
}

#[test]
fn completions_are_generated_for_each_shell() {
    let bash = String::from_utf8(render_completions(CompletionShell::Bash)).unwrap();
    assert!(bash.contains("_fieldwork"));
    let fish = String::from_utf8(render_completions(CompletionShell::Fish)).unwrap();
    assert!(fish.contains("complete -c fieldwork"));
    assert!(!render_completions(CompletionShell::PowerShell).is_empty());
}
