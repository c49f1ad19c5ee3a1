use glam::Vec2;

use crate::rect::Rectangle;

/// An outline made of line segments and Bezier curves, in logical pixels.
///
/// Text is converted to a single `Path` before it is filled, so a
/// path may hold many contours, one per glyph outline.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    pub fn builder() -> PathBuilder {
        PathBuilder::default()
    }

    pub fn segments(&self) -> impl Iterator<Item = PathSegment> + '_ {
        self.segments.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// The box around every point of the path, including curve control
    /// points. `None` for an empty path.
    pub fn bounds(&self) -> Option<Rectangle> {
        let mut points = self.segments().flat_map(PathSegment::points);
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Rectangle::new(min, max - min))
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PathSegment {
    MoveTo(Vec2),
    LineTo(Vec2),
    QuadTo {
        control: Vec2,
        end: Vec2,
    },
    CubicTo {
        control1: Vec2,
        control2: Vec2,
        end: Vec2,
    },
    Close,
}

impl PathSegment {
    /// Points the segment passes through or is pulled toward.
    fn points(self) -> impl Iterator<Item = Vec2> {
        let (points, count) = match self {
            PathSegment::MoveTo(p) | PathSegment::LineTo(p) => ([p, p, p], 1),
            PathSegment::QuadTo { control, end } => ([control, end, end], 2),
            PathSegment::CubicTo {
                control1,
                control2,
                end,
            } => ([control1, control2, end], 3),
            PathSegment::Close => ([Vec2::ZERO; 3], 0),
        };
        points.into_iter().take(count)
    }
}

/// Builds a [`Path`], either by chaining or, for callback-driven
/// producers like glyph outliners, through [`push_segment`](Self::push_segment).
#[derive(Debug, Default)]
pub struct PathBuilder {
    segments: Vec<PathSegment>,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new contour at `point`.
    pub fn move_to(mut self, point: Vec2) -> Self {
        self.push_segment(PathSegment::MoveTo(point));
        self
    }

    pub fn line_to(mut self, point: Vec2) -> Self {
        self.push_segment(PathSegment::LineTo(point));
        self
    }

    pub fn quad_to(mut self, control: Vec2, end: Vec2) -> Self {
        self.push_segment(PathSegment::QuadTo { control, end });
        self
    }

    pub fn cubic_to(mut self, control1: Vec2, control2: Vec2, end: Vec2) -> Self {
        self.push_segment(PathSegment::CubicTo {
            control1,
            control2,
            end,
        });
        self
    }

    /// Closes the current contour and builds the path.
    pub fn close(mut self) -> Path {
        self.push_segment(PathSegment::Close);
        self.build()
    }

    pub fn build(self) -> Path {
        Path {
            segments: self.segments,
        }
    }

    pub fn push_segment(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }
}
