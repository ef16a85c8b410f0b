//! Layout planning
//!
//! Computes the output page order for the paginated songbook. The one rule
//! with teeth: a piece spanning exactly two pages must open on a verso
//! (left-hand) page so that both of its pages face each other on a single
//! spread. Blank pages are inserted only where a two-page piece would
//! otherwise open on a recto.
//!
//! Plan positions are 0-indexed. The bound book opens with the cover alone
//! on the right of the first spread, so position 0 is a recto and odd
//! positions are versos.

use std::collections::BTreeMap;

use crate::types::{LayoutError, PageSide, PageSlot, Piece, Result};

// =============================================================================
// Piece Index
// =============================================================================

/// Lookup of two-page pieces keyed by their start page.
///
/// Only pieces spanning exactly two pages take part in placement; every
/// other page flows through the planner in source order.
#[derive(Debug, Clone, Default)]
pub struct PieceIndex {
    by_start: BTreeMap<u32, Piece>,
}

impl PieceIndex {
    /// Build the index from the classifier's piece list.
    ///
    /// Pieces that do not span exactly two pages are ignored. Should two
    /// two-page pieces share a start page, the later entry wins; that input
    /// is rejected by [`validate_pieces`] anyway, so it only matters for
    /// callers that skip validation.
    pub fn build(pieces: &[Piece]) -> Self {
        let by_start = pieces
            .iter()
            .filter(|piece| piece.is_two_page())
            .map(|piece| (piece.start_page, piece.clone()))
            .collect();
        Self { by_start }
    }

    /// The two-page piece opening at `start_page`, if any
    pub fn two_page_piece_at(&self, start_page: u32) -> Option<&Piece> {
        self.by_start.get(&start_page)
    }

    pub fn len(&self) -> usize {
        self.by_start.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_start.is_empty()
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Check every detected piece against the document before planning.
///
/// Rejects ranges outside `1..=total_pages`, inverted ranges, and pieces
/// claiming overlapping pages. Runs over all pieces regardless of span, so
/// bad classifier output is caught even when it would not affect placement.
pub fn validate_pieces(total_pages: u32, pieces: &[Piece]) -> Result<()> {
    for piece in pieces {
        if piece.start_page == 0
            || piece.start_page > piece.end_page
            || piece.end_page > total_pages
        {
            return Err(LayoutError::InvalidPieceRange {
                title: piece.title.clone(),
                start_page: piece.start_page,
                end_page: piece.end_page,
                total_pages,
            });
        }
    }

    // Sort by range so the reported pair is deterministic
    let mut ordered: Vec<&Piece> = pieces.iter().collect();
    ordered.sort_by_key(|piece| (piece.start_page, piece.end_page));
    for pair in ordered.windows(2) {
        if pair[1].start_page <= pair[0].end_page {
            return Err(LayoutError::OverlappingPieces {
                first: pair[0].title.clone(),
                second: pair[1].title.clone(),
                page: pair[1].start_page,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Planning
// =============================================================================

/// Compute the output page order for the whole document.
///
/// Single forward pass over source pages `1..=total_pages`, skipping pages
/// already placed. When a page opens a two-page piece and the next free
/// position is a recto, one blank is pushed first so the piece opens on a
/// verso and completes on the facing recto. Every source page appears
/// exactly once, in increasing order; blanks are the only additions.
///
/// Run [`validate_pieces`] first (or use [`plan_layout`]): an index built
/// from an unvalidated piece list ending on the document's last page would
/// yield a slot for a page that does not exist, which only surfaces at
/// materialization as `PageOutOfRange`.
pub fn plan_pages(total_pages: u32, index: &PieceIndex) -> Vec<PageSlot> {
    let mut plan: Vec<PageSlot> = Vec::with_capacity(total_pages as usize + index.len());
    let mut consumed = vec![false; total_pages as usize + 2];

    for page in 1..=total_pages {
        if consumed[page as usize] {
            continue;
        }

        if index.two_page_piece_at(page).is_some() {
            if PageSide::of_position(plan.len()) == PageSide::Recto {
                plan.push(PageSlot::Blank { before_page: page });
            }
            plan.push(PageSlot::Source { page });
            plan.push(PageSlot::Source { page: page + 1 });
            consumed[page as usize] = true;
            consumed[page as usize + 1] = true;
        } else {
            plan.push(PageSlot::Source { page });
            consumed[page as usize] = true;
        }
    }

    plan
}

/// Validate, index, and plan in one step.
///
/// `total_pages = 0` with no pieces is valid and yields an empty plan.
pub fn plan_layout(total_pages: u32, pieces: &[Piece]) -> Result<Vec<PageSlot>> {
    validate_pieces(total_pages, pieces)?;
    let index = PieceIndex::build(pieces);
    Ok(plan_pages(total_pages, &index))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn two_page(title: &str, start: u32) -> Piece {
        Piece::new(title, start, start + 1)
    }

    #[test]
    fn test_index_keeps_only_two_page_pieces() {
        let pieces = vec![
            Piece::new("Single", 1, 1),
            Piece::new("Pair", 2, 3),
            Piece::new("Long", 4, 7),
        ];
        let index = PieceIndex::build(&pieces);

        assert_eq!(index.len(), 1);
        assert!(index.two_page_piece_at(2).is_some());
        assert!(index.two_page_piece_at(1).is_none());
        assert!(index.two_page_piece_at(4).is_none());
    }

    #[test]
    fn test_index_duplicate_start_last_wins() {
        let pieces = vec![two_page("First", 3), two_page("Second", 3)];
        let index = PieceIndex::build(&pieces);

        assert_eq!(index.len(), 1);
        assert_eq!(index.two_page_piece_at(3).unwrap().title, "Second");
    }

    #[test]
    fn test_index_empty_input() {
        let index = PieceIndex::build(&[]);
        assert!(index.is_empty());
    }

    #[test]
    fn test_plan_no_pieces_passes_pages_through() {
        let plan = plan_pages(5, &PieceIndex::build(&[]));

        assert_eq!(
            plan,
            vec![
                PageSlot::Source { page: 1 },
                PageSlot::Source { page: 2 },
                PageSlot::Source { page: 3 },
                PageSlot::Source { page: 4 },
                PageSlot::Source { page: 5 },
            ]
        );
    }

    #[test]
    fn test_plan_piece_on_first_page_gets_blank() {
        // The first position is a recto, so a piece opening there needs a
        // blank pushed ahead of it.
        let index = PieceIndex::build(&[two_page("Opener", 1)]);
        let plan = plan_pages(4, &index);

        assert_eq!(
            plan,
            vec![
                PageSlot::Blank { before_page: 1 },
                PageSlot::Source { page: 1 },
                PageSlot::Source { page: 2 },
                PageSlot::Source { page: 3 },
                PageSlot::Source { page: 4 },
            ]
        );
    }

    #[test]
    fn test_plan_piece_already_on_verso_needs_no_blank() {
        // Page 1 lands on the recto cover position, leaving page 2 on a
        // verso; the piece fits without padding.
        let index = PieceIndex::build(&[two_page("Second", 2)]);
        let plan = plan_pages(4, &index);

        assert_eq!(
            plan,
            vec![
                PageSlot::Source { page: 1 },
                PageSlot::Source { page: 2 },
                PageSlot::Source { page: 3 },
                PageSlot::Source { page: 4 },
            ]
        );
    }

    #[test]
    fn test_plan_two_pieces_both_need_blanks() {
        let index = PieceIndex::build(&[two_page("One", 1), two_page("Two", 4)]);
        let plan = plan_pages(6, &index);

        assert_eq!(
            plan,
            vec![
                PageSlot::Blank { before_page: 1 },
                PageSlot::Source { page: 1 },
                PageSlot::Source { page: 2 },
                PageSlot::Source { page: 3 },
                PageSlot::Blank { before_page: 4 },
                PageSlot::Source { page: 4 },
                PageSlot::Source { page: 5 },
                PageSlot::Source { page: 6 },
            ]
        );
        assert_eq!(plan.len(), 8);
    }

    #[test]
    fn test_plan_empty_document() {
        let plan = plan_pages(0, &PieceIndex::build(&[]));
        assert!(plan.is_empty());
    }

    #[test]
    fn test_plan_every_source_page_once_in_order() {
        let pieces = vec![two_page("A", 2), two_page("B", 6), Piece::new("C", 9, 11)];
        let plan = plan_pages(12, &PieceIndex::build(&pieces));

        let source_pages: Vec<u32> = plan.iter().filter_map(|slot| slot.source_page()).collect();
        assert_eq!(source_pages, (1..=12).collect::<Vec<u32>>());
    }

    #[test]
    fn test_plan_two_page_pieces_start_on_verso() {
        let pieces = vec![two_page("A", 1), two_page("B", 3), two_page("C", 7)];
        let index = PieceIndex::build(&pieces);
        let plan = plan_pages(9, &index);

        for piece in &pieces {
            let position = plan
                .iter()
                .position(|slot| slot.source_page() == Some(piece.start_page))
                .unwrap();
            assert_eq!(
                PageSide::of_position(position),
                PageSide::Verso,
                "piece '{}' opens at position {position}",
                piece.title
            );
            // The second page sits on the facing recto
            assert_eq!(plan[position + 1].source_page(), Some(piece.end_page));
        }
    }

    #[test]
    fn test_plan_blanks_only_directly_before_pieces() {
        let pieces = vec![two_page("A", 1), two_page("B", 4), two_page("C", 8)];
        let index = PieceIndex::build(&pieces);
        let plan = plan_pages(10, &index);

        for (position, slot) in plan.iter().enumerate() {
            if let PageSlot::Blank { before_page } = slot {
                assert_eq!(plan[position + 1].source_page(), Some(*before_page));
                assert!(index.two_page_piece_at(*before_page).is_some());
            }
        }
        let blanks = plan.iter().filter(|slot| slot.is_blank()).count();
        assert!(blanks <= pieces.len());
    }

    #[test]
    fn test_plan_longer_pieces_never_trigger_blanks() {
        let pieces = vec![Piece::new("Suite", 1, 3), Piece::new("Hymn", 4, 4)];
        let plan = plan_pages(5, &PieceIndex::build(&pieces));

        assert!(plan.iter().all(|slot| !slot.is_blank()));
        assert_eq!(plan.len(), 5);
    }

    #[test]
    fn test_plan_is_deterministic() {
        let pieces = vec![two_page("A", 2), two_page("B", 5)];
        let index = PieceIndex::build(&pieces);

        assert_eq!(plan_pages(8, &index), plan_pages(8, &index));
    }

    #[test]
    fn test_validate_rejects_zero_start() {
        let err = validate_pieces(5, &[Piece::new("Bad", 0, 1)]).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidPieceRange { .. }));
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let err = validate_pieces(5, &[Piece::new("Bad", 4, 2)]).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidPieceRange { .. }));
    }

    #[test]
    fn test_validate_rejects_end_past_document() {
        let err = validate_pieces(5, &[two_page("Last", 5)]).unwrap_err();
        match err {
            LayoutError::InvalidPieceRange {
                end_page,
                total_pages,
                ..
            } => {
                assert_eq!(end_page, 6);
                assert_eq!(total_pages, 5);
            }
            other => panic!("Expected InvalidPieceRange, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_overlap() {
        let pieces = vec![Piece::new("Wide", 1, 4), two_page("Inside", 3)];
        let err = validate_pieces(6, &pieces).unwrap_err();
        match err {
            LayoutError::OverlappingPieces {
                first,
                second,
                page,
            } => {
                assert_eq!(first, "Wide");
                assert_eq!(second, "Inside");
                assert_eq!(page, 3);
            }
            other => panic!("Expected OverlappingPieces, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_accepts_adjacent_ranges() {
        let pieces = vec![two_page("A", 1), two_page("B", 3), Piece::new("C", 5, 5)];
        assert!(validate_pieces(5, &pieces).is_ok());
    }

    #[test]
    fn test_plan_layout_validates_first() {
        let result = plan_layout(3, &[two_page("Overhang", 3)]);
        assert!(matches!(
            result,
            Err(LayoutError::InvalidPieceRange { .. })
        ));

        let plan = plan_layout(3, &[two_page("Fits", 2)]).unwrap();
        assert_eq!(plan.len(), 3);
    }

    #[test]
    fn test_plan_layout_empty_document_is_valid() {
        assert_eq!(plan_layout(0, &[]).unwrap(), Vec::new());
    }
}
