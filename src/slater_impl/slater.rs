//! Word-backed bitmask representation of Slater determinants

use std::cmp::Ordering;
use std::fmt;

const WORD_BITS: usize = 64;
const ALPHA_MASK: u64 = 0x5555_5555_5555_5555;

/// Occupation bitmask of a Slater determinant
///
/// Words are little-endian and trailing zero words are always trimmed, so two
/// determinants with the same occupations compare and hash equal.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct SlaterDeterminant {
    words: Vec<u64>,
}

impl SlaterDeterminant {
    /// Determinant with no occupied spin-orbitals
    pub fn empty() -> Self {
        Self { words: Vec::new() }
    }

    pub fn from_bits(bits: u128) -> Self {
        let mut sd = Self {
            words: vec![bits as u64, (bits >> WORD_BITS) as u64],
        };
        sd.trim();
        sd
    }

    /// Build a determinant from spin-orbital indices. Repeated indices give `None`.
    pub fn from_spin_orbitals(indices: &[usize]) -> Option<Self> {
        Self::empty().add_orbs(indices)
    }

    /// Build a closed-shell determinant from spatial orbital indices
    pub fn from_pairs(pairs: &[usize]) -> Option<Self> {
        Self::empty().add_pairs(pairs)
    }

    /// Closed-shell ground state with the lowest `npairs` spatial orbitals doubly occupied
    pub fn ground(npairs: usize) -> Self {
        let mut sd = Self::empty();
        for i in 0..2 * npairs {
            sd.set(i);
        }
        sd
    }

    pub fn is_occupied(&self, index: usize) -> bool {
        let (word, bit) = (index / WORD_BITS, index % WORD_BITS);
        self.words
            .get(word)
            .map_or(false, |w| (w >> bit) & 1 == 1)
    }

    /// True if both spin-orbitals of spatial orbital `pair` are occupied
    pub fn is_pair_occupied(&self, pair: usize) -> bool {
        self.is_occupied(2 * pair) && self.is_occupied(2 * pair + 1)
    }

    pub fn count_electrons(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Occupied spin-orbital indices in ascending order
    pub fn occupied_indices(&self) -> Vec<usize> {
        let mut indices = Vec::with_capacity(self.count_electrons());
        for (w, &word) in self.words.iter().enumerate() {
            let mut bits = word;
            while bits != 0 {
                let bit = bits.trailing_zeros() as usize;
                indices.push(w * WORD_BITS + bit);
                bits &= bits - 1;
            }
        }
        indices
    }

    /// Doubly occupied spatial orbitals in ascending order
    pub fn occupied_pairs(&self) -> Vec<usize> {
        self.occupied_indices()
            .into_iter()
            .filter(|&i| i % 2 == 0 && self.is_occupied(i + 1))
            .map(|i| i / 2)
            .collect()
    }

    /// True if every occupied spatial orbital holds both an alpha and a beta electron
    pub fn is_closed_shell(&self) -> bool {
        self.words
            .iter()
            .all(|&w| (w & ALPHA_MASK) == ((w >> 1) & ALPHA_MASK))
    }

    pub fn highest_set_bit(&self) -> Option<usize> {
        let last = self.words.last()?;
        Some((self.words.len() - 1) * WORD_BITS + (WORD_BITS - 1 - last.leading_zeros() as usize))
    }

    /// Sign picked up by a creation or annihilation operator acting on `index`
    ///
    /// Equal to (-1) raised to the number of occupied spin-orbitals below `index`.
    pub fn creation_annihilation_sign(&self, index: usize) -> f64 {
        let (word, bit) = (index / WORD_BITS, index % WORD_BITS);
        let mut below: u32 = self
            .words
            .iter()
            .take(word)
            .map(|w| w.count_ones())
            .sum();
        if let Some(w) = self.words.get(word) {
            below += (w & ((1u64 << bit) - 1)).count_ones();
        }
        if below % 2 == 0 {
            1.0
        } else {
            -1.0
        }
    }

    /// Remove electrons from the given spin-orbitals
    ///
    /// Returns `None` if any orbital is empty at the time it is removed, which also
    /// covers repeated indices.
    pub fn remove_orbs(&self, indices: &[usize]) -> Option<Self> {
        let mut sd = self.clone();
        for &i in indices {
            if !sd.is_occupied(i) {
                return None;
            }
            sd.clear(i);
        }
        sd.trim();
        Some(sd)
    }

    /// Add electrons to the given spin-orbitals
    ///
    /// Returns `None` if any orbital is already occupied when it is added.
    pub fn add_orbs(&self, indices: &[usize]) -> Option<Self> {
        let mut sd = self.clone();
        for &i in indices {
            if sd.is_occupied(i) {
                return None;
            }
            sd.set(i);
        }
        Some(sd)
    }

    /// Move one electron from spin-orbital `from` to spin-orbital `to`
    pub fn excite(&self, from: usize, to: usize) -> Option<Self> {
        self.remove_orbs(&[from])?.add_orbs(&[to])
    }

    /// Remove both electrons from each spatial orbital in `pairs`
    pub fn remove_pairs(&self, pairs: &[usize]) -> Option<Self> {
        let mut sd = self.clone();
        for &p in pairs {
            if !sd.is_pair_occupied(p) {
                return None;
            }
            sd.clear(2 * p);
            sd.clear(2 * p + 1);
        }
        sd.trim();
        Some(sd)
    }

    /// Fill both spin-orbitals of each spatial orbital in `pairs`
    pub fn add_pairs(&self, pairs: &[usize]) -> Option<Self> {
        let mut sd = self.clone();
        for &p in pairs {
            if sd.is_occupied(2 * p) || sd.is_occupied(2 * p + 1) {
                return None;
            }
            sd.set(2 * p);
            sd.set(2 * p + 1);
        }
        Some(sd)
    }

    pub fn excite_pairs(&self, from: &[usize], to: &[usize]) -> Option<Self> {
        self.remove_pairs(from)?.add_pairs(to)
    }

    /// Move an electron pair from spatial orbital `from` to spatial orbital `to`
    pub fn excite_pair(&self, from: usize, to: usize) -> Option<Self> {
        self.excite_pairs(&[from], &[to])
    }

    fn set(&mut self, index: usize) {
        let (word, bit) = (index / WORD_BITS, index % WORD_BITS);
        if self.words.len() <= word {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1u64 << bit;
    }

    fn clear(&mut self, index: usize) {
        let (word, bit) = (index / WORD_BITS, index % WORD_BITS);
        if let Some(w) = self.words.get_mut(word) {
            *w &= !(1u64 << bit);
        }
    }

    fn trim(&mut self) {
        while self.words.last() == Some(&0) {
            self.words.pop();
        }
    }
}

impl Ord for SlaterDeterminant {
    /// Numeric order of the underlying bitmask
    fn cmp(&self, other: &Self) -> Ordering {
        self.words
            .len()
            .cmp(&other.words.len())
            .then_with(|| self.words.iter().rev().cmp(other.words.iter().rev()))
    }
}

impl PartialOrd for SlaterDeterminant {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Binary for SlaterDeterminant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut words = self.words.iter().rev();
        match words.next() {
            None => f.pad_integral(true, "0b", "0"),
            Some(high) => {
                let mut digits = format!("{:b}", high);
                for w in words {
                    digits.push_str(&format!("{:064b}", w));
                }
                f.pad_integral(true, "0b", &digits)
            }
        }
    }
}

impl fmt::Display for SlaterDeterminant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#b}", self)
    }
}

impl fmt::Debug for SlaterDeterminant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlaterDeterminant({:#b})", self)
    }
}
