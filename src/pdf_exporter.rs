use html2text::from_read;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};
use std::path::PathBuf;

use crate::error::ExportError;
use crate::view::ViewState;

pub const PROGRESS_LABEL: &str = "⌛ Generating PDF...";
pub const EXPORT_FAILED: &str = "Failed to generate PDF. Please try again.";

const POINTS_PER_INCH: f32 = 72.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PageFormat {
    A4,
    Letter,
}

impl PageFormat {
    /// Width and height in inches, portrait.
    pub fn size_in(&self) -> (f32, f32) {
        match self {
            PageFormat::A4 => (8.27, 11.69),
            PageFormat::Letter => (8.5, 11.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageType {
    Jpeg,
    Png,
}

/// Everything the rendering capability is configured with.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfOptions {
    /// Inches: top, right, bottom, left.
    pub margin: [f32; 4],
    pub filename: String,
    pub image_type: ImageType,
    pub image_quality: f32,
    /// Rasterization scale; higher is sharper.
    pub scale: f32,
    pub format: PageFormat,
    pub orientation: Orientation,
}

impl PdfOptions {
    pub fn for_title(title: &str) -> Self {
        Self {
            margin: [0.5, 0.5, 0.5, 0.5],
            filename: pdf_filename(title),
            image_type: ImageType::Jpeg,
            image_quality: 0.98,
            scale: 2.0,
            format: PageFormat::A4,
            orientation: Orientation::Portrait,
        }
    }

    /// Page width and height in points, honoring the orientation.
    pub fn page_size_pt(&self) -> (f32, f32) {
        let (w, h) = self.format.size_in();
        let (w, h) = match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        };
        (w * POINTS_PER_INCH, h * POINTS_PER_INCH)
    }
}

/// Every character outside `[A-Za-z0-9]` becomes `_`.
pub fn pdf_filename(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{stem}.pdf")
}

/// Turns captured markup into PDF bytes.
pub trait PdfRenderer: Send + Sync {
    fn render(&self, markup: &str, options: &PdfOptions) -> Result<Vec<u8>, ExportError>;
}

/// Lays the document out as wrapped Helvetica text on as many pages as needed.
#[derive(Debug, Clone)]
pub struct LopdfRenderer {
    pub font_size: f32,
    pub leading: f32,
}

impl Default for LopdfRenderer {
    fn default() -> Self {
        Self {
            font_size: 11.0,
            leading: 14.0,
        }
    }
}

impl LopdfRenderer {
    fn layout_lines(&self, markup: &str, options: &PdfOptions) -> Result<Vec<String>, ExportError> {
        let (width, _) = options.page_size_pt();
        let [_, right, _, left] = options.margin;
        let usable = width - (left + right) * POINTS_PER_INCH;
        // Helvetica averages roughly half an em per glyph.
        let columns = ((usable / (self.font_size * 0.5)) as usize).max(20);

        let text = from_read(markup.as_bytes(), columns)?;
        let mut lines: Vec<String> = text.lines().map(|l| l.to_string()).collect();
        if lines.is_empty() {
            lines.push(String::new());
        }
        Ok(lines)
    }
}

impl PdfRenderer for LopdfRenderer {
    fn render(&self, markup: &str, options: &PdfOptions) -> Result<Vec<u8>, ExportError> {
        let lines = self.layout_lines(markup, options)?;
        let (width, height) = options.page_size_pt();
        let [top, _, bottom, left] = options.margin.map(|m| m * POINTS_PER_INCH);
        let lines_per_page =
            (((height - top - bottom) / self.leading).floor() as usize).max(1);

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for chunk in lines.chunks(lines_per_page) {
            let mut operations = vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), self.font_size.into()]),
                Operation::new("TL", vec![self.leading.into()]),
                Operation::new("Td", vec![left.into(), (height - top - self.font_size).into()]),
            ];
            for line in chunk {
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::String(to_latin1(line), StringFormat::Literal)],
                ));
                operations.push(Operation::new("T*", vec![]));
            }
            operations.push(Operation::new("ET", vec![]));

            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut out = Vec::new();
        doc.save_to(&mut out)?;
        Ok(out)
    }
}

/// Standard fonts only cover Latin-1; anything else prints as `?`.
fn to_latin1(line: &str) -> Vec<u8> {
    line.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedPdf {
    pub path: PathBuf,
    pub filename: String,
    pub size: usize,
}

pub struct PdfExporter {
    renderer: Box<dyn PdfRenderer>,
    export_dir: PathBuf,
}

impl PdfExporter {
    pub fn new(renderer: Box<dyn PdfRenderer>, export_dir: impl Into<PathBuf>) -> Self {
        Self {
            renderer,
            export_dir: export_dir.into(),
        }
    }

    pub fn with_lopdf(export_dir: impl Into<PathBuf>) -> Self {
        Self::new(Box::new(LopdfRenderer::default()), export_dir)
    }

    /// Exports the open modal at `index`.
    ///
    /// The download button shows a progress label and stays disabled for the
    /// duration; it gets its original label back and the staging container is
    /// removed whether or not rendering succeeded.
    pub fn export(&self, view: &mut ViewState, index: usize) -> Result<ExportedPdf, ExportError> {
        let modal = view
            .modals
            .get_mut(index)
            .ok_or(ExportError::NoSuchModal(index))?;

        let original_label = std::mem::replace(&mut modal.download.label, PROGRESS_LABEL.to_string());
        modal.download.disabled = true;
        let title = modal.title.clone();
        let staged = view.staging.stage(modal.content_html.clone());

        let result = self.render_and_save(&title, view.staging.get(staged).unwrap_or_default());

        view.staging.remove(staged);
        if let Some(modal) = view.modals.get_mut(index) {
            modal.download.label = original_label;
            modal.download.disabled = false;
        }

        match &result {
            Ok(pdf) => log::info!("exported {:?} ({} bytes)", pdf.path, pdf.size),
            Err(e) => {
                log::error!("PDF generation failed: {:#}", e);
                view.alert(EXPORT_FAILED);
            }
        }
        result
    }

    fn render_and_save(&self, title: &str, markup: &str) -> Result<ExportedPdf, ExportError> {
        let options = PdfOptions::for_title(title);
        let bytes = self.renderer.render(markup, &options)?;
        std::fs::create_dir_all(&self.export_dir)?;
        let path = self.export_dir.join(&options.filename);
        std::fs::write(&path, &bytes)?;
        Ok(ExportedPdf {
            path,
            filename: options.filename,
            size: bytes.len(),
        })
    }
}
