//! Stateless pseudo-random numbers derived from hashing the inputs.
//! The same inputs always give the same outputs, which keeps regenerated geometry stable.

// A single iteration of Bob Jenkins' One-At-A-Time hashing algorithm.
fn hash(mut x: u32) -> u32 {
    x = x.wrapping_add(x << 10u32);
    x ^= x >> 6u32;
    x = x.wrapping_add(x << 3u32);
    x ^= x >> 11u32;
    x = x.wrapping_add(x << 15u32);
    x
}

fn hash2(x: u32, y: u32) -> u32 {
    hash(x ^ hash(y))
}

// Construct a float with half-open range [0:1] using low 23 bits.
fn float_construct(mut m: u32) -> f32 {
    const IEEE_MANTISSA: u32 = 0x007FFFFFu32;
    const IEEE_ONE: u32 = 0x3F800000u32;

    m &= IEEE_MANTISSA;
    m |= IEEE_ONE;

    f32::from_bits(m) - 1.0
}

/// Pseudo-random value in half-open range [0:1] for a pair of integers.
pub fn rand2u(x: u32, y: u32) -> f32 {
    float_construct(hash2(x, y))
}

/// A tiny deterministic stream seeded by an integer, each call consumes one slot.
#[derive(Copy, Clone, Debug)]
pub struct RandStream {
    seed: u32,
    i: u32,
}

impl RandStream {
    pub fn new(seed: u64) -> Self {
        Self {
            seed: (seed as u32) ^ hash((seed >> 32) as u32),
            i: 0,
        }
    }

    /// Value in [0:1)
    pub fn next_f32(&mut self) -> f32 {
        self.i = self.i.wrapping_add(1);
        rand2u(self.seed, self.i)
    }

    /// Value in [min:max], returns min if the range is empty
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        let v = self.next_f32();
        if max <= min {
            return min;
        }
        min + (max - min) * v
    }

    /// True with the given probability in percent
    pub fn chance(&mut self, percent: u32) -> bool {
        percent >= 100 || self.next_f32() * 100.0 < percent as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_is_deterministic() {
        let mut a = RandStream::new(42);
        let mut b = RandStream::new(42);
        for _ in 0..10 {
            assert_eq!(a.next_f32(), b.next_f32());
        }
    }

    #[test]
    fn range_is_bounded() {
        let mut a = RandStream::new(7);
        for _ in 0..100 {
            let v = a.range(-2.0, 3.0);
            assert!((-2.0..=3.0).contains(&v));
        }
        assert_eq!(a.range(1.0, 1.0), 1.0);
        assert!(rand2u(1, 2) < 1.0);
    }
}
