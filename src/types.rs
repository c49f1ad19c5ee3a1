/// Determines how to fill paths with self-intersections.
///
/// Glyph outlines rely on winding direction for their counters,
/// so text is filled with `NonZero`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum FillRule {
    EvenOdd,
    #[default]
    NonZero,
}
