//! Flutter bridge crate for the kyusei core.
//!
//! Generated FRB glue binds against the sync functions in `api`.

pub mod api;
