//! Text shaping and outlining.
//!
//! Text is shaped with `rustybuzz`, so ligatures, kerning and Arabic
//! joining forms work. Shaped glyphs are converted to vector paths with
//! `ttf-parser` and filled like any other path.
//!
//! Only a single line of text is supported. Mixed-direction text is split
//! into bidi runs and laid out in visual order.

pub mod casing;
pub mod font;
pub mod shape;

pub use casing::normalize;
pub use font::{Font, FontStore};
pub use shape::ShapedText;
