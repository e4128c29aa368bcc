//! Single-column A4 text reports set in the built-in Helvetica.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const MARGIN_LEFT: f32 = 20.0;
const TITLE_Y: f32 = 280.0;
const FIRST_LINE_Y: f32 = 270.0;
const LEADING: f32 = 5.6;
const TITLE_SIZE: f32 = 14.0;
const FONT_SIZE: f32 = 10.0;
pub(crate) const LINES_PER_PAGE: usize = 46;

/// Splits `lines` into page-sized chunks. An empty report still gets one
/// page for its title.
pub(crate) fn paginate(lines: &[String]) -> Vec<&[String]> {
    if lines.is_empty() {
        return vec![lines];
    }
    lines.chunks(LINES_PER_PAGE).collect()
}

/// Renders `title` in bold on the first page followed by `lines`, one per
/// row, breaking onto new pages as needed.
pub fn render_pdf(
    title: &str,
    lines: &[String],
) -> Result<Vec<u8>, printpdf::Error> {
    let (doc, first_page, first_layer) = PdfDocument::new(title, PAGE_WIDTH, PAGE_HEIGHT, "Text");
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    for (index, chunk) in paginate(lines).into_iter().enumerate() {
        let layer = if index == 0 {
            let layer = doc.get_page(first_page).get_layer(first_layer);
            layer.use_text(title, TITLE_SIZE, Mm(MARGIN_LEFT), Mm(TITLE_Y), &bold);
            layer
        } else {
            let (page, layer) = doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, "Text");
            doc.get_page(page).get_layer(layer)
        };
        write_lines(&layer, chunk, &regular);
    }

    doc.save_to_bytes()
}

fn write_lines(
    layer: &PdfLayerReference,
    lines: &[String],
    font: &IndirectFontRef,
) {
    for (row, line) in lines.iter().enumerate() {
        let y = FIRST_LINE_Y - LEADING * row as f32;
        layer.use_text(line.as_str(), FONT_SIZE, Mm(MARGIN_LEFT), Mm(y), font);
    }
}
