//! Songbook assembly - turning a layout plan into the output PDF
//!
//! This module orchestrates the full arrangement:
//! 1. Validate detected pieces against the source document
//! 2. Plan the page order (blanks ahead of recto-opening two-page pieces)
//! 3. Deep-copy source pages and insert blanks, following the plan
//! 4. Finalize the output page tree and catalog

mod copy;
mod io;

pub use io::{load_multiple_pdfs, load_pdf, merge_pdfs, save_pdf};

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::plan::plan_layout;
use crate::types::*;
use copy::{PageCopier, first_page_media_box};

/// Arrange a merged songbook so every two-page piece opens on a verso.
///
/// Validates `pieces`, plans the page order, and materializes the plan in
/// one call. The source document is left untouched.
pub async fn arrange(source: &Document, pieces: &[Piece]) -> Result<Document> {
    let source = source.clone();
    let pieces = pieces.to_vec();

    tokio::task::spawn_blocking(move || arrange_sync(&source, &pieces)).await?
}

fn arrange_sync(source: &Document, pieces: &[Piece]) -> Result<Document> {
    let total_pages = source.get_pages().len() as u32;
    let plan = plan_layout(total_pages, pieces)?;
    log::debug!(
        "planned {} output pages for {} source pages",
        plan.len(),
        total_pages
    );
    assemble_plan_sync(source, &plan)
}

/// Materialize an explicit layout plan into a new document.
///
/// This is the export path for plans the user has edited after review.
/// Every `Source` slot must name an existing page; blanks are sized to the
/// source's first page.
pub async fn assemble_plan(source: &Document, plan: &[PageSlot]) -> Result<Document> {
    let source = source.clone();
    let plan = plan.to_vec();

    tokio::task::spawn_blocking(move || assemble_plan_sync(&source, &plan)).await?
}

fn assemble_plan_sync(source: &Document, plan: &[PageSlot]) -> Result<Document> {
    let pages = source.get_pages();
    let total_pages = pages.len() as u32;
    let blank_media_box = first_page_media_box(source);

    let mut output = Document::with_version("1.7");
    let pages_tree_id = output.new_object_id();
    let mut copier = PageCopier::new();
    let mut page_refs = Vec::with_capacity(plan.len());

    for slot in plan {
        let page_id = match slot {
            PageSlot::Source { page } => {
                let source_id = *pages.get(page).ok_or(LayoutError::PageOutOfRange {
                    page: *page,
                    total_pages,
                })?;
                copier.copy_page(&mut output, source, source_id, pages_tree_id)?
            }
            PageSlot::Blank { .. } => {
                create_blank_page(&mut output, &blank_media_box, pages_tree_id)
            }
        };
        page_refs.push(Object::Reference(page_id));
    }

    finalize_document(&mut output, pages_tree_id, page_refs);
    Ok(output)
}

/// Create a blank page with the given media box
fn create_blank_page(doc: &mut Document, media_box: &[Object], parent_id: ObjectId) -> ObjectId {
    let content_id = doc.add_object(Stream::new(Dictionary::new(), Vec::new()));

    let mut page_dict = Dictionary::new();
    page_dict.set("Type", Object::Name(b"Page".to_vec()));
    page_dict.set("Parent", Object::Reference(parent_id));
    page_dict.set("MediaBox", Object::Array(media_box.to_vec()));
    page_dict.set("Contents", Object::Reference(content_id));
    page_dict.set("Resources", Object::Dictionary(Dictionary::new()));

    doc.add_object(page_dict)
}

/// Create pages tree and catalog, finalize document structure
pub(crate) fn finalize_document(
    output: &mut Document,
    pages_tree_id: ObjectId,
    page_refs: Vec<Object>,
) {
    let count = page_refs.len() as i64;
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(page_refs)),
        ("Count", Object::Integer(count)),
    ]);
    output
        .objects
        .insert(pages_tree_id, Object::Dictionary(pages_dict));

    let catalog_id = output.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_tree_id)),
    ]));

    output.trailer.set("Root", catalog_id);
}
