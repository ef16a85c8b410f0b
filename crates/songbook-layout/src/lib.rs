pub mod assemble;
mod plan;
mod spread;
mod stats;
mod types;

pub use assemble::{arrange, assemble_plan, load_multiple_pdfs, load_pdf, merge_pdfs, save_pdf};
pub use plan::{PieceIndex, plan_layout, plan_pages, validate_pieces};
pub use spread::group_spreads;
pub use stats::calculate_statistics;
pub use types::*;
