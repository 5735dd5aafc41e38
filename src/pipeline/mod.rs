//! Pipeline stages for PDF dark-mode conversion.
//!
//! Each submodule implements exactly one transformation step, so each is
//! testable on its own and none of them knows which PDF engine is in use.
//!
//! ## Data Flow
//!
//! ```text
//! pages ──▶ render ──▶ theme ──▶ assemble ──▶ overlay ──▶ serialize
//! (spec)    (raster)   (invert)  (new page)   (tint)     (compact)
//! ```
//!
//! 1. [`pages`]    — expand the page spec into zero-based indices
//! 2. [`render`]   — rasterise one source page at a fixed scale
//! 3. [`theme`]    — invert (or pass through) the pixels in place
//! 4. [`assemble`] — append a page of the source's physical size and place
//!    the raster on it
//! 5. [`overlay`]  — optionally wash the finished page with a warm tint
//!
//! [`crate::convert`] drives these stages and owns the fail-soft boundary.

pub mod assemble;
pub mod overlay;
pub mod pages;
pub mod render;
pub mod theme;
