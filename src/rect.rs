use glam::Vec2;

/// An axis-aligned rectangle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rectangle {
    position: Vec2,
    size: Vec2,
}

impl Rectangle {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self { position, size }
    }

    /// A rectangle at the origin with the given size.
    pub fn from_size(size: Vec2) -> Self {
        Self::new(Vec2::ZERO, size)
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn height(&self) -> f32 {
        self.size.y
    }
}
