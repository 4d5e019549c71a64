//! Result classification and the text views built on it.

pub mod classify;
pub mod detail;
pub mod render;

pub use detail::open_detail;
pub use render::result_view;
