//! Editor core: a growable character store, an incrementally maintained
//! line-break index, and the edit protocol that keeps the two consistent
//! one keystroke at a time.

pub mod cursor;
pub mod enums;
pub mod errors;
pub mod line_index;
pub mod text;
pub mod text_store;
