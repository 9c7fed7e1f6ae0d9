use std::collections::HashMap;
use std::ops::Index;

/// Measurement channel → reference channel, in insertion order.
///
/// Pairs are applied in this order, so a chain such as `A → B` followed by
/// `B → C` corrects `A` against the uncorrected `B`. Inserting a measurement
/// that is already present replaces its reference in place.
#[derive(Debug, Clone, Default)]
pub struct CorrectionPairs {
    pairs: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl CorrectionPairs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, measurement: impl Into<String>, reference: impl Into<String>) {
        let measurement = measurement.into();
        let reference = reference.into();
        match self.index.get(&measurement) {
            Some(&i) => self.pairs[i].1 = reference,
            None => {
                self.index.insert(measurement.clone(), self.pairs.len());
                self.pairs.push((measurement, reference));
            }
        }
    }

    pub fn get(&self, measurement: &str) -> Option<&str> {
        self.index
            .get(measurement)
            .map(|&i| self.pairs[i].1.as_str())
    }

    pub fn contains_key(&self, measurement: &str) -> bool {
        self.index.contains_key(measurement)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(m, _)| m.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(m, r)| (m.as_str(), r.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Same pairs in the same order.
impl PartialEq for CorrectionPairs {
    fn eq(&self, other: &Self) -> bool {
        self.pairs == other.pairs
    }
}

impl Eq for CorrectionPairs {}

impl Index<&str> for CorrectionPairs {
    type Output = String;

    fn index(&self, measurement: &str) -> &String {
        match self.index.get(measurement) {
            Some(&i) => &self.pairs[i].1,
            None => panic!("no correction pair for '{measurement}'"),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for CorrectionPairs
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut pairs = Self::new();
        for (m, r) in iter {
            pairs.insert(m, r);
        }
        pairs
    }
}

impl<'a> IntoIterator for &'a CorrectionPairs {
    type Item = (&'a str, &'a str);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, (String, String)>,
        fn(&'a (String, String)) -> (&'a str, &'a str),
    >;

    fn into_iter(self) -> Self::IntoIter {
        let as_refs: fn(&'a (String, String)) -> (&'a str, &'a str) =
            |(m, r)| (m.as_str(), r.as_str());
        self.pairs.iter().map(as_refs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order() {
        let pairs: CorrectionPairs = [("SDREF", "PCYL1"), ("PSAUG", "SDREF")].into_iter().collect();
        assert_eq!(
            pairs.iter().collect::<Vec<_>>(),
            [("SDREF", "PCYL1"), ("PSAUG", "SDREF")]
        );
        assert_eq!(pairs["PSAUG"], "SDREF");
    }

    #[test]
    fn repeated_measurement_replaces_in_place() {
        let pairs: CorrectionPairs = [("A", "R1"), ("B", "R2"), ("A", "R3")].into_iter().collect();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs.iter().collect::<Vec<_>>(), [("A", "R3"), ("B", "R2")]);
        assert!(pairs.contains_key("B"));
        assert!(pairs.get("C").is_none());
    }

    #[test]
    fn equality_is_order_sensitive() {
        let a: CorrectionPairs = [("A", "R"), ("B", "R")].into_iter().collect();
        let b: CorrectionPairs = [("B", "R"), ("A", "R")].into_iter().collect();
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }
}
