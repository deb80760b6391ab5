//! Digit-trie predecessor index
//!
//! Answers "greatest inserted key ≤ probe" over non-zero `u128` keys in time
//! proportional to the number of decimal digits of the probe, independent of
//! how many keys are stored. Keys are bucketed by digit count; inside a bucket
//! they form a radix-10 trie walked most significant digit first.
//!
//! Every interior node carries a branch marker: the largest child digit ever
//! taken below it. Following markers from a node reaches the largest key in
//! its subtree without visiting siblings. Keys are normally inserted in
//! increasing order, where overwriting the marker would suffice; the marker
//! keeps the maximum instead so out-of-order inserts stay correct.
//!
//! `0` is the "no predecessor" sentinel and is never stored.

/// Decimal digits of `u128::MAX`.
pub const MAX_DIGITS: usize = 39;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeId(usize);

#[derive(Debug, Clone, Default)]
struct TrieNode {
    children: [Option<NodeId>; 10],
    /// Largest child digit taken below this node
    marker: Option<u8>,
}

/// Most-significant-first decimal digits of a key.
struct Digits {
    buf: [u8; MAX_DIGITS],
    len: usize,
}

impl Digits {
    fn of(key: u128) -> Self {
        let mut buf = [0u8; MAX_DIGITS];
        let mut len = 0;
        let mut rest = key;
        loop {
            buf[len] = (rest % 10) as u8;
            len += 1;
            rest /= 10;
            if rest == 0 {
                break;
            }
        }
        buf[..len].reverse();
        Self { buf, len }
    }

    fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

/// Sparse predecessor structure over non-zero integer keys.
#[derive(Debug, Clone)]
pub struct PredecessorIndex {
    /// Node arena; handles are positions in this vector
    nodes: Vec<TrieNode>,
    /// One trie root per key width in digits
    roots: [Option<NodeId>; MAX_DIGITS + 1],
    len: usize,
    max_key: u128,
}

impl PredecessorIndex {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            roots: [None; MAX_DIGITS + 1],
            len: 0,
            max_key: 0,
        }
    }

    /// Record `key`. Returns `false` for the `0` sentinel or an existing key.
    pub fn insert(&mut self, key: u128) -> bool {
        if key == 0 {
            return false;
        }
        let digits = Digits::of(key);
        let mut node = match self.roots[digits.len] {
            Some(root) => root,
            None => {
                let root = self.alloc();
                self.roots[digits.len] = Some(root);
                root
            }
        };

        let mut created = false;
        for &digit in digits.as_slice() {
            let slot = usize::from(digit);
            let entry = &mut self.nodes[node.0];
            entry.marker = Some(entry.marker.map_or(digit, |marker| marker.max(digit)));
            node = match entry.children[slot] {
                Some(child) => child,
                None => {
                    let child = self.alloc();
                    self.nodes[node.0].children[slot] = Some(child);
                    created = true;
                    child
                }
            };
        }

        if created {
            self.len += 1;
            self.max_key = self.max_key.max(key);
        }
        created
    }

    /// Greatest inserted key ≤ `probe`, or `0` when there is none.
    pub fn predecessor(&self, probe: u128) -> u128 {
        if self.len == 0 || probe == 0 {
            return 0;
        }
        if probe >= self.max_key {
            return self.max_key;
        }

        let digits = Digits::of(probe);
        if let Some(root) = self.roots[digits.len] {
            if let Some(found) = self.floor_in(root, digits.as_slice()) {
                return found;
            }
        }
        // Every shorter key is smaller than the probe; take the widest one.
        (1..digits.len)
            .rev()
            .find_map(|width| self.roots[width].map(|root| self.max_in(root, 0, width)))
            .unwrap_or(0)
    }

    /// Whether `key` was inserted.
    pub fn contains(&self, key: u128) -> bool {
        key != 0 && self.predecessor(key) == key
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Largest inserted key, `0` when empty.
    pub fn max_key(&self) -> u128 {
        self.max_key
    }

    fn alloc(&mut self) -> NodeId {
        self.nodes.push(TrieNode::default());
        NodeId(self.nodes.len() - 1)
    }

    /// Floor of `digits` inside one width bucket.
    fn floor_in(&self, root: NodeId, digits: &[u8]) -> Option<u128> {
        let mut node = root;
        let mut prefix = 0u128;
        // Deepest branch smaller than the probe seen on the way down:
        // (child, value of the path to it, digits still below it)
        let mut fallback: Option<(NodeId, u128, usize)> = None;

        for (depth, &digit) in digits.iter().enumerate() {
            let entry = &self.nodes[node.0];
            let below = digits.len() - depth - 1;
            let Some(marker) = entry.marker else {
                break;
            };

            if marker < digit {
                // Nothing here continues past the probe; the marker branch is the floor.
                if let Some(child) = entry.children[usize::from(marker)] {
                    return Some(self.max_in(child, prefix * 10 + u128::from(marker), below));
                }
            }

            if let Some((smaller, child)) = (0..digit)
                .rev()
                .find_map(|d| entry.children[usize::from(d)].map(|child| (d, child)))
            {
                fallback = Some((child, prefix * 10 + u128::from(smaller), below));
            }

            match entry.children[usize::from(digit)] {
                Some(child) => {
                    node = child;
                    prefix = prefix * 10 + u128::from(digit);
                }
                None => {
                    return fallback.map(|(child, value, rest)| self.max_in(child, value, rest));
                }
            }

            if below == 0 {
                return Some(prefix);
            }
        }

        fallback.map(|(child, value, rest)| self.max_in(child, value, rest))
    }

    /// Largest key below `node`, following branch markers for `below` digits.
    fn max_in(&self, node: NodeId, prefix: u128, below: usize) -> u128 {
        let mut node = node;
        let mut value = prefix;
        for _ in 0..below {
            let entry = &self.nodes[node.0];
            let Some(marker) = entry.marker else {
                break;
            };
            value = value * 10 + u128::from(marker);
            match entry.children[usize::from(marker)] {
                Some(child) => node = child,
                None => break,
            }
        }
        value
    }
}

impl Default for PredecessorIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn index_of(keys: &[u128]) -> PredecessorIndex {
        let mut index = PredecessorIndex::new();
        for &key in keys {
            index.insert(key);
        }
        index
    }

    #[test]
    fn test_empty_index_returns_sentinel() {
        let index = PredecessorIndex::new();
        assert_eq!(index.predecessor(0), 0);
        assert_eq!(index.predecessor(42), 0);
        assert!(index.is_empty());
    }

    #[test]
    fn test_exact_and_between() {
        let index = index_of(&[100, 300, 450]);
        assert_eq!(index.predecessor(99), 0);
        assert_eq!(index.predecessor(100), 100);
        assert_eq!(index.predecessor(299), 100);
        assert_eq!(index.predecessor(300), 300);
        assert_eq!(index.predecessor(449), 300);
        assert_eq!(index.predecessor(10_000), 450);
    }

    #[test]
    fn test_missing_digit_with_larger_marker() {
        // Probe 25 wants branch 2 under the root, which holds 1 and 3.
        let index = index_of(&[15, 30, 31]);
        assert_eq!(index.predecessor(25), 15);
        assert_eq!(index.predecessor(30), 30);
        assert_eq!(index.predecessor(29), 15);
    }

    #[test]
    fn test_backtracks_to_shallower_fallback() {
        // Path 2-5 exists but only with digits above the probe's.
        let index = index_of(&[199, 257, 258]);
        assert_eq!(index.predecessor(253), 199);
        assert_eq!(index.predecessor(257), 257);
    }

    #[test]
    fn test_crosses_width_buckets() {
        let index = index_of(&[7, 42, 1_000]);
        assert_eq!(index.predecessor(999), 42);
        assert_eq!(index.predecessor(41), 7);
        assert_eq!(index.predecessor(6), 0);
        assert_eq!(index.predecessor(100), 42);
    }

    #[test]
    fn test_insert_rejects_zero_and_duplicates() {
        let mut index = PredecessorIndex::new();
        assert!(!index.insert(0));
        assert!(index.insert(5));
        assert!(!index.insert(5));
        assert_eq!(index.len(), 1);
        assert!(index.contains(5));
        assert!(!index.contains(4));
    }

    #[test]
    fn test_out_of_order_inserts() {
        let index = index_of(&[3, 1, 2]);
        assert_eq!(index.predecessor(1), 1);
        assert_eq!(index.predecessor(2), 2);
        assert_eq!(index.max_key(), 3);
    }

    #[test]
    fn test_extreme_keys() {
        let index = index_of(&[1, u128::MAX - 1]);
        assert_eq!(index.predecessor(u128::MAX), u128::MAX - 1);
        assert_eq!(index.predecessor(u128::MAX - 2), 1);
    }

    fn brute_force(keys: &BTreeSet<u128>, probe: u128) -> u128 {
        keys.range(..=probe).next_back().copied().unwrap_or(0)
    }

    proptest! {
        #[test]
        fn fuzz_increasing_inserts_match_brute_force(
            steps in prop::collection::vec(1u128..5_000, 1..60),
            probes in prop::collection::vec(0u128..400_000, 1..40),
        ) {
            let mut index = PredecessorIndex::new();
            let mut keys = BTreeSet::new();
            let mut key = 0u128;
            for step in steps {
                key += step;
                index.insert(key);
                keys.insert(key);
            }
            for probe in probes {
                prop_assert_eq!(index.predecessor(probe), brute_force(&keys, probe));
            }
        }

        #[test]
        fn fuzz_arbitrary_inserts_match_brute_force(
            inserted in prop::collection::vec(1u128..1_000_000, 1..60),
            probes in prop::collection::vec(0u128..1_200_000, 1..40),
        ) {
            let index = index_of(&inserted);
            let keys: BTreeSet<u128> = inserted.into_iter().collect();
            prop_assert_eq!(index.len(), keys.len());
            for probe in probes {
                prop_assert_eq!(index.predecessor(probe), brute_force(&keys, probe));
            }
        }
    }
}
