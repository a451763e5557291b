//! Display-list renderer for pagemark.
//!
//! Turns annotation state into flat lists of screen-space draw commands.
//! No surface or GPU dependency; hosts interpret `DrawCmd` however they
//! draw (canvas, GPU, SVG export).

mod display_list;

pub use display_list::{page_display_list, preview_display_list, DrawCmd, HANDLE_SIZE};
