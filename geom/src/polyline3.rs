use crate::Vec3;
use serde::{Deserialize, Serialize};

/// An ordered list of at least one point forming a broken line
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolyLine3 {
    points: Vec<Vec3>,
    l: f32,
}

impl PolyLine3 {
    /// # Panics
    /// If the vec is empty
    pub fn new(x: Vec<Vec3>) -> Self {
        if x.is_empty() {
            panic!("Vec must have at least one point")
        }
        Self {
            l: length(&x),
            points: x,
        }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.l
    }

    /// Cumulative length at each point, starts at 0 and ends at length()
    pub fn cumulative_lengths(&self) -> Vec<f32> {
        let mut acc = 0.0;
        let mut v = Vec::with_capacity(self.points.len());
        v.push(0.0);
        for w in self.points.windows(2) {
            acc += (w[1] - w[0]).mag();
            v.push(acc);
        }
        v
    }

    /// Fraction of the point list reached after walking `l` from the start:
    /// 0 at the first point, 1 at the last. Clamped to [0, 1].
    pub fn param_at_length(&self, l: f32) -> f32 {
        if l <= 0.0 || self.l <= 0.0 {
            return 0.0;
        }
        if l >= self.l {
            return 1.0;
        }
        let table = self.cumulative_lengths();
        let n = (table.len() - 1) as f32;
        for (i, w) in table.windows(2).enumerate() {
            if l <= w[1] {
                let span = w[1] - w[0];
                let local = if span > 0.0 { (l - w[0]) / span } else { 0.0 };
                return (i as f32 + local) / n;
            }
        }
        1.0
    }
}

fn length(points: &[Vec3]) -> f32 {
    points.windows(2).map(|w| (w[1] - w[0]).mag()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec3;

    #[test]
    fn along() {
        let p = PolyLine3::new(vec![
            vec3(0.0, 0.0, 0.0),
            vec3(10.0, 0.0, 0.0),
            vec3(10.0, 30.0, 0.0),
        ]);
        assert_eq!(p.length(), 40.0);
        assert_eq!(p.cumulative_lengths(), vec![0.0, 10.0, 40.0]);
        assert_eq!(p.param_at_length(5.0), 0.25);
        assert_eq!(p.param_at_length(25.0), 0.75);
        assert_eq!(p.param_at_length(-1.0), 0.0);
        assert_eq!(p.param_at_length(50.0), 1.0);
    }

    #[test]
    fn single_point() {
        let p = PolyLine3::new(vec![vec3(1.0, 2.0, 3.0)]);
        assert_eq!(p.length(), 0.0);
        assert_eq!(p.param_at_length(1.0), 0.0);
    }
}
