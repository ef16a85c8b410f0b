use songbook_layout::*;

fn two_page(title: &str, start: u32) -> Piece {
    Piece::new(title, start, start + 1)
}

#[test]
fn test_layout_workflow_produces_reviewable_spreads() {
    let pieces = vec![
        two_page("Kyrie", 1),
        Piece::new("Gloria", 3, 3),
        two_page("Credo", 5),
    ];

    let plan = plan_layout(7, &pieces).unwrap();
    let spreads = group_spreads(&plan);
    let stats = calculate_statistics(&plan, &pieces);

    assert_eq!(stats.source_pages, 7);
    assert_eq!(stats.two_page_pieces, 2);
    assert_eq!(stats.output_pages, plan.len());
    assert_eq!(stats.spreads, spreads.len());

    // Every two-page piece faces itself across a single spread
    for piece in pieces.iter().filter(|piece| piece.is_two_page()) {
        let spread = spreads
            .iter()
            .find(|spread| {
                spread.verso.and_then(|slot| slot.source_page()) == Some(piece.start_page)
            })
            .unwrap_or_else(|| panic!("piece '{}' does not open a spread", piece.title));
        assert_eq!(
            spread.recto.and_then(|slot| slot.source_page()),
            Some(piece.end_page)
        );
    }
}

#[test]
fn test_blank_count_matches_statistics() {
    let pieces = vec![two_page("One", 1), two_page("Two", 4)];
    let plan = plan_layout(6, &pieces).unwrap();
    let stats = calculate_statistics(&plan, &pieces);

    assert_eq!(stats.blank_pages_added, 2);
    assert_eq!(stats.output_pages, 8);
    assert_eq!(
        plan.iter().filter(|slot| slot.is_blank()).count(),
        stats.blank_pages_added
    );
}

#[test]
fn test_validation_errors_carry_piece_details() {
    let result = plan_layout(4, &[Piece::new("Magnificat", 3, 6)]);
    match result {
        Err(LayoutError::InvalidPieceRange {
            title,
            start_page,
            end_page,
            total_pages,
        }) => {
            assert_eq!(title, "Magnificat");
            assert_eq!(start_page, 3);
            assert_eq!(end_page, 6);
            assert_eq!(total_pages, 4);
        }
        other => panic!("Expected InvalidPieceRange, got {other:?}"),
    }
}

#[test]
fn test_slot_identities_are_stable_and_unique() {
    let pieces = vec![two_page("A", 1), two_page("B", 4)];
    let plan = plan_layout(6, &pieces).unwrap();

    let identities: Vec<String> = plan.iter().map(|slot| slot.identity()).collect();
    let mut deduped = identities.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), identities.len());

    // Identities survive replanning
    let replanned = plan_layout(6, &pieces).unwrap();
    let replanned_identities: Vec<String> =
        replanned.iter().map(|slot| slot.identity()).collect();
    assert_eq!(identities, replanned_identities);
}

#[cfg(feature = "serde")]
mod serde_round_trips {
    use super::*;

    #[test]
    fn test_pieces_parse_from_classifier_json() {
        let json = r#"[
            {"title": "Ave Maria", "startPage": 1, "endPage": 2},
            {"title": "Stille Nacht", "startPage": 3, "endPage": 3}
        ]"#;

        let pieces: Vec<Piece> = serde_json::from_str(json).unwrap();
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0], Piece::new("Ave Maria", 1, 2));
        assert!(pieces[0].is_two_page());
        assert_eq!(pieces[1].page_count(), 1);
    }

    #[test]
    fn test_piece_serializes_camel_case() {
        let value = serde_json::to_value(Piece::new("Ave Maria", 1, 2)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"title": "Ave Maria", "startPage": 1, "endPage": 2})
        );
    }

    #[test]
    fn test_plan_round_trips_through_json() {
        let pieces = vec![two_page("A", 1)];
        let plan = plan_layout(3, &pieces).unwrap();

        let json = serde_json::to_string(&plan).unwrap();
        let restored: Vec<PageSlot> = serde_json::from_str(&json).unwrap();
        assert_eq!(plan, restored);
    }

    #[test]
    fn test_slot_json_shape_is_edit_friendly() {
        let source = serde_json::to_value(PageSlot::Source { page: 3 }).unwrap();
        assert_eq!(source, serde_json::json!({"kind": "source", "page": 3}));

        let blank = serde_json::to_value(PageSlot::Blank { before_page: 4 }).unwrap();
        assert_eq!(
            blank,
            serde_json::json!({"kind": "blank", "beforePage": 4})
        );
    }
}
