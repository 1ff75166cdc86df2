//! Persistence for pipeline outputs.
//!
//! ## Directory Structure
//!
//! ```text
//! parser/output/
//! ├── catalogItems.jsonl    # one validated record per line
//! └── parse.log             # validation failures + final stats line
//! output/icons/
//! └── {orderInSection}.{ext}
//! ```

pub mod assets;
pub mod jsonl;

// Re-export for convenience
pub use assets::AssetStore;
pub use jsonl::{JsonlWriter, non_blank_lines, write_text_lines};
