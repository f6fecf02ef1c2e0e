use docx_rs::{Docx, Paragraph, Run, Table, TableCell, TableRow};
use extract::{ExtractError, ExtractionConfig, ExtractionService, FieldSet, StrategyKind, Upload};
use ingest::{DOCX_MIME, TextOrder};
use std::io::Cursor;

fn para(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text))
}

fn docx_upload(docx: Docx) -> Upload<Cursor<Vec<u8>>> {
    let mut buf = Cursor::new(Vec::new());
    docx.build().pack(&mut buf).unwrap();
    Upload::new(
        "contract.docx",
        Some(DOCX_MIME.to_string()),
        Cursor::new(buf.into_inner()),
    )
}

fn contract() -> Docx {
    let requisites = Table::new(vec![TableRow::new(vec![
        TableCell::new().add_paragraph(para("Supplier: Baltic Wood Agency Ltd")),
        TableCell::new().add_paragraph(para("Buyer: {buyer_name}")),
    ])]);

    Docx::new()
        .add_paragraph(para("CONTRACT No. {contract_number} dated {contract_date}"))
        .add_paragraph(para(
            "Baltic Wood Agency Ltd, hereinafter the Supplier, and {buyer_name}, hereinafter the Buyer, have agreed as follows.",
        ))
        .add_paragraph(para("ООО «Северная Лесная Компания», именуемое Покупатель, от 15 января 2024 г."))
        .add_table(requisites)
}

#[test]
fn placeholders_from_docx_are_unique() {
    let service = ExtractionService::load(&ExtractionConfig::default()).unwrap();
    let mut upload = docx_upload(contract());

    let fields = service.extract_dynamic_fields(&mut upload).unwrap();

    assert_eq!(fields, vec!["contract_number", "contract_date", "buyer_name"]);
    assert_eq!(upload.reader.position(), 0);
}

#[test]
fn organizations_from_docx() {
    let service = ExtractionService::load(&ExtractionConfig::default()).unwrap();
    let mut upload = docx_upload(contract());

    let report = service.extract_organizations(&mut upload).unwrap();
    let names: Vec<&str> = report.organizations.iter().map(|o| o.name.as_str()).collect();

    assert_eq!(names, vec!["Baltic Wood Agency Ltd", "ООО «Северная Лесная Компания»"]);
    assert_eq!(report.organizations[0].role, "Supplier");
    assert_eq!(report.organizations[1].role, "Покупатель");
    assert_eq!(report.dates, vec!["15 января 2024"]);
    assert_eq!(upload.reader.position(), 0);
}

#[test]
fn upload_can_be_read_twice() {
    let service = ExtractionService::load(&ExtractionConfig::default()).unwrap();
    let mut upload = docx_upload(contract());

    let first = service.extract(StrategyKind::Placeholders, &mut upload).unwrap();
    let second = service.extract(StrategyKind::Placeholders, &mut upload).unwrap();
    assert_eq!(first, second);
    assert!(matches!(first, FieldSet::Placeholders { .. }));
}

#[test]
fn document_order_interleaves_tables() {
    let config = ExtractionConfig {
        text_order: TextOrder::Document,
        ..Default::default()
    };
    let service = ExtractionService::load(&config).unwrap();

    let docx = Docx::new()
        .add_paragraph(para("{first}"))
        .add_table(Table::new(vec![TableRow::new(vec![
            TableCell::new().add_paragraph(para("{second}")),
        ])]))
        .add_paragraph(para("{third}"));

    let fields = service.extract_dynamic_fields(&mut docx_upload(docx)).unwrap();
    assert_eq!(fields, vec!["first", "second", "third"]);
}

#[test]
fn corrupt_docx_is_rejected_without_partial_output() {
    let service = ExtractionService::load(&ExtractionConfig::default()).unwrap();
    let mut bytes = docx_upload(contract()).reader.into_inner();
    bytes.truncate(bytes.len() / 2);

    let mut upload = Upload::new("contract.docx", None, Cursor::new(bytes));
    let err = service.extract_dynamic_fields(&mut upload).unwrap_err();

    assert!(matches!(err, ExtractError::DocumentParse(_)));
    assert!(err.is_client_error());
    assert_eq!(upload.reader.position(), 0);
}
