// src/services/pdf.rs

use crate::{
    db,
    errors::{AppError, AppResult},
    models::Receipt,
    state::AppState,
};
use async_trait::async_trait;
use printpdf::{BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point};
use std::{io::BufWriter, path::PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Receipt,
    SalarySlip,
}

impl DocumentKind {
    fn title(self) -> &'static str {
        match self {
            DocumentKind::Receipt => "PAYMENT RECEIPT",
            DocumentKind::SalarySlip => "SALARY SLIP",
        }
    }
}

/// Everything printed on one page.
#[derive(Debug, Clone)]
pub struct ReceiptDocument {
    pub kind: DocumentKind,
    pub gym_name: String,
    pub receipt: Receipt,
    /// Label / value rows printed under the header.
    pub details: Vec<(String, String)>,
}

/// Turns a receipt into a stored artifact and returns where it landed.
#[async_trait]
pub trait ReceiptRenderer: Send + Sync {
    async fn render(&self, document: ReceiptDocument) -> AppResult<PathBuf>;
}

/// Writes A4 PDFs into a single directory.
pub struct PdfReceiptRenderer {
    dir: PathBuf,
}

impl PdfReceiptRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ReceiptRenderer for PdfReceiptRenderer {
    async fn render(&self, document: ReceiptDocument) -> AppResult<PathBuf> {
        let path = self.dir.join(receipt_file_name(&document.receipt));
        let bytes = tokio::task::spawn_blocking(move || render_pdf(&document))
            .await
            .map_err(|e| AppError::Internal(format!("PDF task failed: {e}")))??;

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }
}

/// Render and record the PDF for a freshly committed receipt.
///
/// Failures are logged and swallowed: the money is already on the books.
pub async fn store_receipt_pdf(
    state: &AppState,
    receipt: &mut Receipt,
    kind: DocumentKind,
    details: Vec<(String, String)>,
) {
    let document = ReceiptDocument {
        kind,
        gym_name: state.config.gym_name.clone(),
        receipt: receipt.clone(),
        details,
    };

    let path = match state.renderer.render(document).await {
        Ok(path) => path.to_string_lossy().into_owned(),
        Err(e) => {
            warn!("PDF for receipt {} not generated: {}", receipt.receipt_number, e);
            return;
        }
    };

    match db::receipts::set_pdf_path(&state.db, receipt.id, &path).await {
        Ok(()) => {
            info!("Receipt {} saved to {}", receipt.receipt_number, path);
            receipt.pdf_path = Some(path);
        }
        Err(e) => warn!("PDF path for receipt {} not stored: {}", receipt.receipt_number, e),
    }
}

/// `<receipt_number>_<payer>.pdf`, with a version suffix once superseded.
pub fn receipt_file_name(receipt: &Receipt) -> String {
    let payer = sanitize_filename(&receipt.payer_name);
    if receipt.version_number > 1 {
        format!("{}-v{}_{}.pdf", receipt.receipt_number, receipt.version_number, payer)
    } else {
        format!("{}_{}.pdf", receipt.receipt_number, payer)
    }
}

/// Keeps `[A-Za-z0-9-_]`, everything else becomes `_`.
pub fn sanitize_filename(input: &str) -> String {
    let out: String = input
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect();
    if out.is_empty() { "receipt".to_string() } else { out }
}

// ─── Layout ───────────────────────────────────────────────────────────────────

fn push_text(layer: &PdfLayerReference, font: &IndirectFontRef, text: &str, size: f32, x: f32, y: f32) {
    layer.use_text(text, size, Mm(x), Mm(y), font);
}

fn divider(layer: &PdfLayerReference, y: f32) {
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(15.0), Mm(y)), false),
            (Point::new(Mm(195.0), Mm(y)), false),
        ],
        is_closed: false,
    });
}

fn render_pdf(document: &ReceiptDocument) -> AppResult<Vec<u8>> {
    let receipt = &document.receipt;
    let (doc, page, layer) = PdfDocument::new(
        format!("{} {}", document.kind.title(), receipt.receipt_number),
        Mm(210.0),
        Mm(297.0),
        "Layer 1",
    );
    let layer = doc.get_page(page).get_layer(layer);
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| AppError::Pdf(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| AppError::Pdf(e.to_string()))?;

    push_text(&layer, &bold, &document.gym_name, 18.0, 15.0, 280.0);
    push_text(&layer, &bold, document.kind.title(), 14.0, 130.0, 280.0);
    push_text(&layer, &font, &receipt.receipt_number, 11.0, 130.0, 273.0);
    push_text(
        &layer,
        &font,
        &receipt.created_at.format("%d %b %Y %H:%M").to_string(),
        10.0,
        130.0,
        267.0,
    );
    if receipt.version_number > 1 {
        push_text(
            &layer,
            &font,
            &format!("Revision {}", receipt.version_number),
            10.0,
            130.0,
            261.0,
        );
    }
    divider(&layer, 255.0);

    let mut y = 245.0;
    push_text(&layer, &font, "Received from", 10.0, 15.0, y);
    push_text(&layer, &bold, &receipt.payer_name, 11.0, 70.0, y);
    y -= 8.0;

    for (label, value) in &document.details {
        push_text(&layer, &font, label, 10.0, 15.0, y);
        push_text(&layer, &font, value, 10.0, 70.0, y);
        y -= 7.0;
    }

    y -= 4.0;
    divider(&layer, y);
    y -= 10.0;

    push_text(&layer, &font, "Payment type", 10.0, 15.0, y);
    push_text(&layer, &font, &receipt.payment_type, 10.0, 70.0, y);
    let amounts = [
        ("Amount", receipt.amount),
        ("Paid", receipt.amount_paid),
        ("Balance due", receipt.due_amount),
    ];
    for (label, amount) in amounts {
        push_text(&layer, &bold, label, 11.0, 120.0, y);
        push_text(&layer, &font, &amount.to_string(), 11.0, 165.0, y);
        y -= 7.0;
    }

    if let Some(notes) = &receipt.notes {
        y -= 6.0;
        push_text(&layer, &font, &format!("Notes: {notes}"), 9.0, 15.0, y);
    }

    push_text(&layer, &font, "This is a computer generated document.", 8.0, 15.0, 12.0);

    let mut writer = BufWriter::new(Vec::<u8>::new());
    doc.save(&mut writer).map_err(|e| AppError::Pdf(e.to_string()))?;
    writer
        .into_inner()
        .map_err(|e| AppError::Pdf(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, ReceiptCategory, TransactionType};
    use chrono::Utc;
    use uuid::Uuid;

    fn receipt(payer: &str, version_number: i64) -> Receipt {
        Receipt {
            id: Uuid::new_v4(),
            receipt_number: "RCP-000042".to_string(),
            member_id: None,
            staff_id: None,
            payer_name: payer.to_string(),
            term: 1,
            amount: Money::from_major(1900),
            amount_paid: Money::from_major(1000),
            due_amount: Money::from_major(900),
            payment_type: "cash".to_string(),
            receipt_category: Some(ReceiptCategory::Member),
            transaction_type: TransactionType::Payment,
            notes: Some("first instalment".to_string()),
            created_by: None,
            pdf_path: None,
            original_receipt_id: None,
            version_number,
            is_current_version: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(sanitize_filename("Ravi Kumar"), "Ravi_Kumar");
        assert_eq!(sanitize_filename("O'Brien/../x"), "O_Brien____x");
        assert_eq!(sanitize_filename("   "), "receipt");
        assert_eq!(receipt_file_name(&receipt("Asha Rao", 1)), "RCP-000042_Asha_Rao.pdf");
        assert_eq!(receipt_file_name(&receipt("Asha Rao", 2)), "RCP-000042-v2_Asha_Rao.pdf");
    }

    #[tokio::test]
    async fn renders_a_pdf_file() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = PdfReceiptRenderer::new(dir.path().join("receipts"));

        let path = renderer
            .render(ReceiptDocument {
                kind: DocumentKind::Receipt,
                gym_name: "Iron Temple".to_string(),
                receipt: receipt("Asha Rao", 1),
                details: vec![("Member ID".to_string(), "M0001".to_string())],
            })
            .await
            .unwrap();

        assert!(path.ends_with("RCP-000042_Asha_Rao.pdf"));
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
