/// A closed interval on the audio timeline, in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeSpan {
    pub start: f64,
    pub end: f64,
}

impl TimeSpan {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// A span is usable only when it covers a positive stretch of time.
    pub fn is_valid(&self) -> bool {
        self.end > self.start
    }

    /// Intersection with another span, or `None` when they don't overlap.
    pub fn overlap(&self, other: &TimeSpan) -> Option<TimeSpan> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if end > start {
            Some(TimeSpan::new(start, end))
        } else {
            None
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_duration() {
        let s = TimeSpan::new(1.0, 3.5);
        assert_relative_eq!(s.duration(), 2.5);
    }

    #[test]
    fn test_validity() {
        assert!(TimeSpan::new(0.0, 0.1).is_valid());
        assert!(!TimeSpan::new(1.0, 1.0).is_valid());
        assert!(!TimeSpan::new(2.0, 1.0).is_valid());
    }

    #[test]
    fn test_overlap_partial() {
        let a = TimeSpan::new(0.0, 2.0);
        let b = TimeSpan::new(1.0, 3.0);
        let o = a.overlap(&b).unwrap();
        assert_relative_eq!(o.start, 1.0);
        assert_relative_eq!(o.end, 2.0);
    }

    #[test]
    fn test_overlap_contained() {
        let a = TimeSpan::new(0.0, 10.0);
        let b = TimeSpan::new(2.0, 3.0);
        let o = a.overlap(&b).unwrap();
        assert_relative_eq!(o.duration(), 1.0);
    }

    #[test]
    fn test_overlap_disjoint_is_none() {
        let a = TimeSpan::new(0.0, 1.0);
        let b = TimeSpan::new(1.0, 2.0);
        assert!(a.overlap(&b).is_none());
    }
}
