//! Certificate PDF rendering.
//!
//! A single landscape A4 page with a fixed layout. Text is centered using an
//! average glyph width for the built-in Helvetica faces, which is close enough
//! for the short strings printed here.

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rgb,
};

use learnershub_core::CertificateData;

const PAGE_WIDTH_MM: f32 = 297.0;
const PAGE_HEIGHT_MM: f32 = 210.0;
const PT_TO_MM: f32 = 0.3528;
const AVG_GLYPH_EM: f32 = 0.52;

/// Rendering failure.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Input is missing a required field.
    #[error("invalid certificate: {0}")]
    Invalid(String),

    /// The PDF writer failed.
    #[error("pdf rendering failed: {0}")]
    Render(String),
}

/// Render a certificate to PDF bytes.
///
/// # Errors
///
/// Returns `DocumentError::Invalid` when the student or course name is blank,
/// and `DocumentError::Render` if the PDF writer fails.
pub fn render_certificate(data: &CertificateData) -> Result<Vec<u8>, DocumentError> {
    data.validate()
        .map_err(|e| DocumentError::Invalid(e.to_string()))?;

    let (doc, page, layer) = PdfDocument::new(
        format!("Certificate - {}", data.course_name),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Certificate",
    );
    let layer = doc.get_page(page).get_layer(layer);

    let regular = builtin(&doc, BuiltinFont::Helvetica)?;
    let bold = builtin(&doc, BuiltinFont::HelveticaBold)?;
    let italic = builtin(&doc, BuiltinFont::HelveticaOblique)?;

    // Double border.
    layer.set_outline_color(rgb(0.18, 0.31, 0.59));
    layer.set_outline_thickness(3.0);
    layer.add_line(rectangle(10.0));
    layer.set_outline_thickness(1.0);
    layer.add_line(rectangle(15.0));

    layer.set_fill_color(rgb(0.18, 0.31, 0.59));
    centered(&layer, "CERTIFICATE OF COMPLETION", 32.0, 165.0, &bold);

    layer.set_fill_color(rgb(0.2, 0.2, 0.2));
    centered(&layer, "This is to certify that", 16.0, 140.0, &italic);

    layer.set_fill_color(rgb(0.0, 0.0, 0.0));
    centered(&layer, &data.student_name, 28.0, 122.0, &bold);

    layer.set_fill_color(rgb(0.2, 0.2, 0.2));
    centered(&layer, "has successfully completed the course", 16.0, 104.0, &regular);

    layer.set_fill_color(rgb(0.18, 0.31, 0.59));
    centered(&layer, &data.course_name, 22.0, 88.0, &bold);

    layer.set_fill_color(rgb(0.2, 0.2, 0.2));
    let details = format!(
        "Duration: {}    Grade: {}    Date: {}",
        data.duration,
        data.grade,
        data.completion_date.format("%B %-d, %Y")
    );
    centered(&layer, &details, 13.0, 70.0, &regular);

    // Signature blocks.
    layer.set_outline_thickness(0.75);
    for (x, title) in [(60.0, "Instructor"), (PAGE_WIDTH_MM - 60.0, "Director")] {
        layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x - 35.0), Mm(45.0)), false),
                (Point::new(Mm(x + 35.0), Mm(45.0)), false),
            ],
            is_closed: false,
        });
        text_at(&layer, title, 12.0, x, 38.0, &regular);
    }

    centered(&layer, "Learners Hub", 11.0, 25.0, &italic);

    doc.save_to_bytes()
        .map_err(|e| DocumentError::Render(e.to_string()))
}

fn builtin(
    doc: &printpdf::PdfDocumentReference,
    font: BuiltinFont,
) -> Result<IndirectFontRef, DocumentError> {
    doc.add_builtin_font(font)
        .map_err(|e| DocumentError::Render(e.to_string()))
}

fn rgb(r: f32, g: f32, b: f32) -> Color {
    Color::Rgb(Rgb::new(r, g, b, None))
}

fn rectangle(inset: f32) -> Line {
    let (left, bottom) = (inset, inset);
    let (right, top) = (PAGE_WIDTH_MM - inset, PAGE_HEIGHT_MM - inset);
    Line {
        points: vec![
            (Point::new(Mm(left), Mm(bottom)), false),
            (Point::new(Mm(right), Mm(bottom)), false),
            (Point::new(Mm(right), Mm(top)), false),
            (Point::new(Mm(left), Mm(top)), false),
        ],
        is_closed: true,
    }
}

#[allow(clippy::cast_precision_loss)]
fn text_width_mm(text: &str, size_pt: f32) -> f32 {
    text.chars().count() as f32 * size_pt * AVG_GLYPH_EM * PT_TO_MM
}

fn centered(layer: &PdfLayerReference, text: &str, size_pt: f32, y: f32, font: &IndirectFontRef) {
    text_at(layer, text, size_pt, PAGE_WIDTH_MM / 2.0, y, font);
}

fn text_at(
    layer: &PdfLayerReference,
    text: &str,
    size_pt: f32,
    center_x: f32,
    y: f32,
    font: &IndirectFontRef,
) {
    let x = (center_x - text_width_mm(text, size_pt) / 2.0).max(18.0);
    layer.use_text(text, size_pt, Mm(x), Mm(y), font);
}
