//! Demo pages.
//!
//! Each page is a [`crate::render::Component`] implementing
//! [`crate::app::Page`], optionally with a server-side prefetch hook.

pub mod index;

pub use index::IndexPage;
