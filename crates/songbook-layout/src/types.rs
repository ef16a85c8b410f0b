use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("No pages in input documents")]
    NoPages,
    #[error("piece '{title}' has invalid page range {start_page}-{end_page} (document has {total_pages} pages)")]
    InvalidPieceRange {
        title: String,
        start_page: u32,
        end_page: u32,
        total_pages: u32,
    },
    #[error("pieces '{first}' and '{second}' both claim page {page}")]
    OverlappingPieces {
        first: String,
        second: String,
        page: u32,
    },
    #[error("plan references page {page} but the document has {total_pages} pages")]
    PageOutOfRange { page: u32, total_pages: u32 },
}

pub type Result<T> = std::result::Result<T, LayoutError>;

/// A detected musical work spanning consecutive pages of the merged source.
///
/// Page numbers are 1-indexed. The serde field names (`startPage`,
/// `endPage`) match the classifier's wire format.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Piece {
    /// Title as reported by the classifier; carried through, never interpreted
    pub title: String,
    /// First page of the piece
    pub start_page: u32,
    /// Last page of the piece, inclusive
    pub end_page: u32,
}

impl Piece {
    pub fn new(title: impl Into<String>, start_page: u32, end_page: u32) -> Self {
        Self {
            title: title.into(),
            start_page,
            end_page,
        }
    }

    /// Number of pages the piece spans (valid ranges only)
    pub fn page_count(&self) -> u32 {
        self.end_page - self.start_page + 1
    }

    /// Whether this piece covers exactly two pages and so must start on a verso
    pub fn is_two_page(&self) -> bool {
        self.end_page == self.start_page + 1
    }
}

/// One position in a layout plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")
)]
pub enum PageSlot {
    /// A page copied from the merged source document
    Source {
        /// 1-indexed page number in the source
        page: u32,
    },
    /// An inserted blank page, shifting the parity of everything after it
    Blank {
        /// Source page this blank was inserted ahead of
        before_page: u32,
    },
}

impl PageSlot {
    /// Stable token identifying this slot across plan edits
    pub fn identity(&self) -> String {
        match self {
            PageSlot::Source { page } => format!("page-{page}"),
            PageSlot::Blank { before_page } => format!("blank-before-{before_page}"),
        }
    }

    pub fn source_page(&self) -> Option<u32> {
        match self {
            PageSlot::Source { page } => Some(*page),
            PageSlot::Blank { .. } => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, PageSlot::Blank { .. })
    }
}

/// Which side of an open spread a plan position lands on.
///
/// The cover sits alone on the right of the first spread, so even 0-indexed
/// positions are recto pages and odd positions are verso pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSide {
    /// Left-hand page of a spread
    Verso,
    /// Right-hand page of a spread
    Recto,
}

impl PageSide {
    pub fn of_position(position: usize) -> Self {
        if position % 2 == 1 {
            PageSide::Verso
        } else {
            PageSide::Recto
        }
    }
}

/// A pair of facing pages as seen in the bound, open songbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spread {
    /// Left-hand slot; `None` only on the cover spread
    pub verso: Option<PageSlot>,
    /// Right-hand slot; `None` when the plan ends on a verso
    pub recto: Option<PageSlot>,
}

/// Statistics about a computed layout
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutStatistics {
    /// Total number of source pages
    pub source_pages: usize,
    /// Number of two-page pieces driving placement
    pub two_page_pieces: usize,
    /// Number of blank pages inserted to keep piece starts on verso pages
    pub blank_pages_added: usize,
    /// Output page count (source pages plus blanks)
    pub output_pages: usize,
    /// Number of spreads when viewed cover-first
    pub spreads: usize,
}
