use glam::DVec3;
use std::collections::VecDeque;

/// A trail point with its age-based opacity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub position: DVec3,
    /// 1.0 for the newest point, fading toward the buffer's floor for the oldest.
    pub opacity: f64,
}

/// Bounded, insertion-ordered history of world-space tip positions.
///
/// Once full, every push evicts the single oldest point.
pub struct TrailBuffer {
    points: VecDeque<DVec3>,
    capacity: usize,
    min_opacity: f64,
}

impl TrailBuffer {
    pub fn new(capacity: usize, min_opacity: f64) -> Self {
        Self {
            points: VecDeque::new(),
            capacity,
            min_opacity,
        }
    }

    /// Append a point, dropping the oldest one if that exceeds capacity.
    pub fn push(&mut self, point: DVec3) {
        self.points.push_back(point);
        if self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    /// Points oldest to newest, with opacity linearly spaced from the floor to 1.0.
    pub fn snapshot_with_opacity(&self) -> Vec<TrailPoint> {
        let n = self.points.len();
        self.points
            .iter()
            .enumerate()
            .map(|(i, &position)| TrailPoint {
                position,
                opacity: self.opacity_at(i, n),
            })
            .collect()
    }

    fn opacity_at(&self, index: usize, len: usize) -> f64 {
        if len <= 1 {
            return 1.0;
        }
        // Measured from the newest end so the newest point is exactly 1.0.
        let age = (len - 1 - index) as f64 / (len - 1) as f64;
        1.0 - (1.0 - self.min_opacity) * age
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(i: usize) -> DVec3 {
        DVec3::new(i as f64, 0.0, 0.0)
    }

    #[test]
    fn empty_snapshot() {
        let trail = TrailBuffer::new(200, 0.05);
        assert!(trail.snapshot_with_opacity().is_empty());
        assert!(trail.is_empty());
    }

    #[test]
    fn single_point_is_opaque() {
        let mut trail = TrailBuffer::new(200, 0.05);
        trail.push(point(7));
        let snapshot = trail.snapshot_with_opacity();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].opacity, 1.0);
    }

    #[test]
    fn overflow_evicts_oldest_and_keeps_order() {
        let mut trail = TrailBuffer::new(200, 0.05);
        for i in 0..250 {
            trail.push(point(i));
            assert!(trail.len() <= trail.capacity());
        }

        let snapshot = trail.snapshot_with_opacity();
        assert_eq!(snapshot.len(), 200);
        // Points 0..50 were evicted.
        for (offset, p) in snapshot.iter().enumerate() {
            assert_eq!(p.position, point(50 + offset));
        }
        let last = snapshot.last().unwrap();
        assert_eq!(last.position, point(249));
        assert_eq!(last.opacity, 1.0);
        assert!((snapshot[0].opacity - 0.05).abs() < 1e-12);
    }

    #[test]
    fn opacity_increases_linearly() {
        let mut trail = TrailBuffer::new(10, 0.2);
        for i in 0..5 {
            trail.push(point(i));
        }
        let opacities: Vec<f64> = trail
            .snapshot_with_opacity()
            .iter()
            .map(|p| p.opacity)
            .collect();
        let expected = [0.2, 0.4, 0.6, 0.8, 1.0];
        for (got, want) in opacities.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "{got} != {want}");
        }
    }

    #[test]
    fn capacity_one_keeps_only_latest() {
        let mut trail = TrailBuffer::new(1, 0.05);
        trail.push(point(1));
        trail.push(point(2));
        assert_eq!(trail.len(), 1);
        assert_eq!(trail.snapshot_with_opacity()[0].position, point(2));
    }

    #[test]
    fn huge_capacity_allocates_lazily() {
        let mut trail = TrailBuffer::new(usize::MAX, 0.05);
        assert_eq!(trail.capacity(), usize::MAX);
        for i in 0..3 {
            trail.push(point(i));
        }
        assert_eq!(trail.len(), 3);
        assert_eq!(trail.snapshot_with_opacity()[2].opacity, 1.0);
    }
}
