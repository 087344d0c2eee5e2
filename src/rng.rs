/// Small multiplicative generator. Only frightened wandering draws from it,
/// so a fixed seed replays the same erratic moves every round.
#[derive(Clone, Debug)]
pub struct Rng {
    seed: u32,
}

const MULTIPLIER: u32 = 65_537;
const MODULUS: u32 = 3_571;

impl Rng {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    fn next_raw(&mut self) -> u32 {
        self.seed = ((self.seed as u64 * MULTIPLIER as u64) % MODULUS as u64) as u32;
        self.seed
    }

    /// Integer in the closed range `[min, max]`.
    pub fn int(&mut self, min: i32, max: i32) -> i32 {
        let raw = self.next_raw();
        if max <= min {
            return min;
        }
        let span = (max - min + 1) as u32;
        min + (raw % span) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::Rng;

    #[test]
    fn reference_seed_yields_known_sequence() {
        let mut rng = Rng::new(13);
        let drawn: Vec<i32> = (0..6).map(|_| rng.int(0, 3)).collect();
        assert_eq!(drawn, vec![3, 3, 0, 3, 1, 3]);
        assert_eq!(rng.seed, 2083);
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Rng::new(77);
        let mut b = Rng::new(77);
        for _ in 0..50 {
            assert_eq!(a.int(-5, 9), b.int(-5, 9));
        }
    }

    #[test]
    fn values_stay_within_closed_range() {
        let mut rng = Rng::new(1234);
        for _ in 0..200 {
            let value = rng.int(2, 6);
            assert!((2..=6).contains(&value));
        }
        assert_eq!(rng.int(4, 4), 4);
        assert_eq!(rng.int(9, 1), 9);
    }
}
