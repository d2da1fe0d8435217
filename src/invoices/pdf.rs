//! Single-page invoice PDF: one Helvetica text block on US Letter.

use printpdf::{BuiltinFont, Mm, PdfDocument};

const PAGE_WIDTH: Mm = Mm(215.9);
const PAGE_HEIGHT: Mm = Mm(279.4);
const MARGIN: f32 = 25.4;
const FONT_SIZE: f32 = 12.0;
const LEADING: f32 = 6.35;

/// Render `lines` top to bottom on one page. Blank lines keep their spacing.
pub fn render(title: &str, lines: &[String]) -> Result<Vec<u8>, printpdf::Error> {
    let (doc, page, layer) = PdfDocument::new(title, PAGE_WIDTH, PAGE_HEIGHT, "Invoice");
    let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let canvas = doc.get_page(page).get_layer(layer);

    let mut y = PAGE_HEIGHT.0 - MARGIN;
    for line in lines {
        if !line.is_empty() {
            canvas.use_text(line.as_str(), FONT_SIZE, Mm(MARGIN), Mm(y), &font);
        }
        y -= LEADING;
    }

    doc.save_to_bytes()
}
