//! Infrastructure layer: file-system persistence for config documents.
//!
//! The accessor in `application` only talks to the [`store::JsonStore`]
//! trait.  [`store::FsJsonStore`] is the production implementation; tests
//! substitute recording or failing stores through the same seam.

pub mod store;
