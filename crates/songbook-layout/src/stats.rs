use crate::types::*;

/// Calculate statistics for a computed layout
pub fn calculate_statistics(plan: &[PageSlot], pieces: &[Piece]) -> LayoutStatistics {
    let blank_pages_added = plan.iter().filter(|slot| slot.is_blank()).count();
    let source_pages = plan.len() - blank_pages_added;
    let two_page_pieces = pieces.iter().filter(|piece| piece.is_two_page()).count();

    // Cover-first viewing: one empty position ahead of the plan
    let spreads = if plan.is_empty() {
        0
    } else {
        (plan.len() + 1).div_ceil(2)
    };

    LayoutStatistics {
        source_pages,
        two_page_pieces,
        blank_pages_added,
        output_pages: plan.len(),
        spreads,
    }
}
