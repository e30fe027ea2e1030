use crate::RAM_SIZE;
use crate::Score;
use crate::console::Memory;
use crate::rng::Rng;
use std::fmt::Display;
use std::fmt::Formatter;

/// an ordered tuple of distinct RAM indices, read as a lexicographic
/// preorder over memories: m precedes m' iff m's projection through the
/// tuple is lexicographically smaller. the tuple IS the identity; two
/// objectives with the same indices are the same objective.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Objective(Vec<usize>);

impl Objective {
    pub fn new(indices: Vec<usize>) -> Self {
        assert!(!indices.is_empty(), "empty objective");
        assert!(indices.iter().all(|&i| i < RAM_SIZE), "index out of ram");
        let mut seen = vec![false; RAM_SIZE];
        for &i in indices.iter() {
            assert!(!seen[i], "duplicate index {}", i);
            seen[i] = true;
        }
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn projection(&self, memory: &Memory) -> Vec<u8> {
        memory.projection(&self.0)
    }

    /// strict lexicographic comparison through the tuple
    pub fn less(&self, a: &Memory, b: &Memory) -> bool {
        for &i in self.0.iter() {
            if a[i] < b[i] {
                return true;
            }
            if a[i] > b[i] {
                return false;
            }
        }
        false
    }

    /// radix-2 discounted lexicographic delta. walk the tuple from its
    /// last index toward its first, halving as we go, so a change in a
    /// higher-order byte outweighs everything after it without making
    /// the result purely ordinal. lands in about [-255, 255].
    pub fn delta(&self, a: &Memory, b: &Memory) -> Score {
        let mut v = 0.0;
        for &i in self.0.iter().rev() {
            v = (v + b[i] as Score - a[i] as Score) / 2.0;
        }
        v
    }

    /// propose a tuple whose lexicographic value is (as far as possible)
    /// monotonically non-decreasing across the referenced frames of a
    /// trajectory. greedy randomized construction: at each level the
    /// eligible indices are those that never decrease across any
    /// still-tied adjacent pair of frames, and that strictly rise across
    /// at least one; pick uniformly among them, keep only the pairs the
    /// pick leaves tied, repeat until nothing strictly rises.
    pub fn enumerate(trajectory: &[Memory], frames: &[usize], rng: &mut Rng) -> Option<Self> {
        let mut pairs = frames
            .windows(2)
            .map(|w| (w[0], w[1]))
            .collect::<Vec<(usize, usize)>>();
        let mut used = vec![false; RAM_SIZE];
        let mut chosen = Vec::new();
        while !pairs.is_empty() {
            let mut rising = Vec::new();
            'index: for i in 0..RAM_SIZE {
                if used[i] {
                    continue;
                }
                let mut rises = false;
                for &(s, t) in pairs.iter() {
                    match trajectory[s][i].cmp(&trajectory[t][i]) {
                        std::cmp::Ordering::Greater => continue 'index,
                        std::cmp::Ordering::Less => rises = true,
                        std::cmp::Ordering::Equal => {}
                    }
                }
                if rises {
                    rising.push(i);
                }
            }
            if rising.is_empty() {
                break;
            }
            let pick = rising[rng.random_below(rising.len())];
            used[pick] = true;
            chosen.push(pick);
            pairs.retain(|&(s, t)| trajectory[s][pick] == trajectory[t][pick]);
        }
        match chosen.is_empty() {
            true => None,
            false => Some(Self(chosen)),
        }
    }
}

impl Display for Objective {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let indices = self
            .0
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<String>>()
            .join(" ");
        write!(f, "[{}]", indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RAM_SIZE;

    fn memory(cells: &[(usize, u8)]) -> Memory {
        let mut bytes = [0u8; RAM_SIZE];
        for &(i, v) in cells {
            bytes[i] = v;
        }
        Memory::from(&bytes[..])
    }

    #[test]
    fn delta_discounts_by_radix() {
        let objective = Objective::new(vec![0, 1]);
        let a = memory(&[(0, 10), (1, 20)]);
        let b = memory(&[(0, 10), (1, 24)]);
        assert_eq!(objective.delta(&a, &b), 1.0);
        assert_eq!(objective.delta(&b, &a), -1.0);
    }

    #[test]
    fn delta_of_identical_memories_is_zero() {
        let objective = Objective::new(vec![3, 1, 4]);
        let a = memory(&[(3, 7), (1, 9)]);
        assert_eq!(objective.delta(&a, &a), 0.0);
    }

    #[test]
    fn less_is_strict_lexicographic() {
        let objective = Objective::new(vec![0, 1]);
        let a = memory(&[(0, 1), (1, 200)]);
        let b = memory(&[(0, 2), (1, 0)]);
        assert!(objective.less(&a, &b));
        assert!(!objective.less(&b, &a));
        assert!(!objective.less(&a, &a));
    }

    #[test]
    #[should_panic]
    fn duplicate_indices_abort() {
        let _ = Objective::new(vec![1, 2, 1]);
    }

    #[test]
    fn enumerate_finds_the_rising_cell() {
        let trajectory = (0..8u8)
            .map(|t| memory(&[(100, t), (200, 7 - t)]))
            .collect::<Vec<Memory>>();
        let frames = (0..8).collect::<Vec<usize>>();
        let mut rng = Rng::seeded("enumerate");
        let objective = Objective::enumerate(&trajectory, &frames, &mut rng).unwrap();
        assert!(objective.indices().contains(&100));
        assert!(!objective.indices().contains(&200));
    }

    #[test]
    fn enumerate_rejects_all_falling() {
        let trajectory = (0..8u8).map(|t| memory(&[(0, 200 - t)])).collect::<Vec<Memory>>();
        let frames = (0..8).collect::<Vec<usize>>();
        let mut rng = Rng::seeded("falling");
        assert!(Objective::enumerate(&trajectory, &frames, &mut rng).is_none());
    }
}
