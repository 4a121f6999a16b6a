/// Running min/mean/max of one key, in tenths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statistic {
    pub min: i64,
    pub max: i64,
    pub total: i64,
    pub count: u64,
}

impl Statistic {
    pub fn new(value: i64) -> Self {
        Self {
            min: value,
            max: value,
            total: value,
            count: 1,
        }
    }

    #[inline]
    pub fn observe(&mut self, value: i64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.total += value;
        self.count += 1;
    }

    /// Folds `other` into `self`. Commutative and associative.
    #[inline]
    pub fn merge(&mut self, other: &Statistic) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.total += other.total;
        self.count += other.count;
    }

    /// `total / count` rounded to the nearest tenth, ties to even.
    pub fn mean_tenths(&self) -> i64 {
        let count = self.count as i64;
        let quotient = self.total.div_euclid(count);
        let twice_rem = self.total.rem_euclid(count) * 2;

        if twice_rem > count || (twice_rem == count && quotient % 2 != 0) {
            quotient + 1
        } else {
            quotient
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat_of(values: &[i64]) -> Statistic {
        let mut stat = Statistic::new(values[0]);
        for value in &values[1..] {
            stat.observe(*value);
        }
        stat
    }

    #[test]
    fn observe_tracks_extremes() {
        let stat = stat_of(&[120, -35, 52]);
        assert_eq!(stat.min, -35);
        assert_eq!(stat.max, 120);
        assert_eq!(stat.total, 137);
        assert_eq!(stat.count, 3);
    }

    #[test]
    fn merge_matches_single_pass() {
        let mut left = stat_of(&[10, 20]);
        let right = stat_of(&[-5, 40, 7]);
        left.merge(&right);
        assert_eq!(left, stat_of(&[10, 20, -5, 40, 7]));
    }

    #[test]
    fn mean_rounds_half_to_even() {
        // 4.25 -> 4.2
        assert_eq!(stat_of(&[120, -35]).mean_tenths(), 42);
        // -4.25 -> -4.2
        assert_eq!(stat_of(&[-120, 35]).mean_tenths(), -42);
        // 4.35 -> 4.4
        assert_eq!(stat_of(&[40, 47]).mean_tenths(), 44);
        // 1.0333 -> 1.0
        assert_eq!(stat_of(&[10, 10, 11]).mean_tenths(), 10);
        // 1.0667 -> 1.1
        assert_eq!(stat_of(&[10, 11, 11]).mean_tenths(), 11);
        // -0.0333 -> 0.0
        assert_eq!(stat_of(&[-1, 0, 0]).mean_tenths(), 0);
    }
}
