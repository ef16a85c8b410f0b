//! Document I/O for songbook assembly

use std::path::Path;

use lopdf::{Document, Object};

use crate::types::*;

use super::copy::PageCopier;
use super::finalize_document;

/// Load a single PDF document
pub async fn load_pdf(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::fs::read(&path).await?;
    let doc = tokio::task::spawn_blocking(move || Document::load_mem(&bytes)).await??;
    Ok(doc)
}

/// Load multiple PDF documents
pub async fn load_multiple_pdfs(paths: &[impl AsRef<Path>]) -> Result<Vec<Document>> {
    let mut documents = Vec::new();
    for path in paths {
        documents.push(load_pdf(path).await?);
    }
    Ok(documents)
}

/// Save a document
pub async fn save_pdf(mut doc: Document, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::task::spawn_blocking(move || {
        let mut writer = Vec::new();
        doc.save_to(&mut writer)?;
        Ok::<_, LayoutError>(writer)
    })
    .await??;
    tokio::fs::write(&path, bytes).await?;
    Ok(())
}

/// Merge multiple documents into one, pages in input order.
///
/// Fails with `NoPages` when the inputs hold no pages at all.
pub async fn merge_pdfs(documents: Vec<Document>) -> Result<Document> {
    tokio::task::spawn_blocking(move || merge_documents(&documents)).await?
}

pub(crate) fn merge_documents(documents: &[Document]) -> Result<Document> {
    let mut output = Document::with_version("1.7");
    let pages_tree_id = output.new_object_id();
    let mut page_refs = Vec::new();

    for source in documents {
        // One copier per source: object ids from different documents collide
        let mut copier = PageCopier::new();
        for (_number, page_id) in source.get_pages() {
            let new_id = copier.copy_page(&mut output, source, page_id, pages_tree_id)?;
            page_refs.push(Object::Reference(new_id));
        }
    }

    if page_refs.is_empty() {
        return Err(LayoutError::NoPages);
    }

    log::debug!(
        "merged {} documents into {} pages",
        documents.len(),
        page_refs.len()
    );
    finalize_document(&mut output, pages_tree_id, page_refs);
    Ok(output)
}
