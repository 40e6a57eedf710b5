//! Shared helpers.

pub mod html;
pub mod mime;
pub mod origin;
pub mod path;
