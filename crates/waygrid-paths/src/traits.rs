use waygrid_core::Point;

/// Walkability as seen by neighbour expansion.
pub trait NavGrid {
    /// Whether an agent may stand on `p`. Out-of-bounds points are never
    /// walkable.
    fn is_walkable(&self, p: Point) -> bool;
}
