//! # folio-core: Page model for Folio
//!
//! Domain types shared by the persistence layer and request handlers:
//!
//! - [`node`]: rich-text content tree and editor-JSON conversion
//! - [`extract`]: content tree → normalized search string
//! - [`page`]: page, revision and hierarchy records

pub mod extract;
pub mod node;
pub mod page;

pub use extract::{extract_text, search_text};
pub use node::Node;
pub use page::{
    now_micros, Identity, Notebook, PageRecord, Revision, RevisionSummary, Section,
    INITIAL_VERSION,
};
