use std::fmt;

/// Ordered, duplicate-free set of capability names.
///
/// Insertion order is kept so `CAP LS` lists capabilities the way they were
/// configured.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CapabilitySet {
    names: Vec<String>,
}

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// `true` when every name is present.
    pub fn contains_all<'a, I>(&self, names: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        names.into_iter().all(|name| self.contains(name))
    }

    /// Add names, skipping ones already present.
    pub fn extend<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref();
            if !name.is_empty() && !self.contains(name) {
                self.names.push(name.to_string());
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

/// Space-joined, as sent in `CAP LS` and `CAP LIST`.
impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_order_and_drops_duplicates() {
        let set: CapabilitySet = ["b", "a", "b", ""].into_iter().collect();
        assert_eq!(set.to_string(), "b a");
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn contains_all_rejects_partial() {
        let set: CapabilitySet = ["a", "b"].into_iter().collect();
        assert!(set.contains_all(["a", "b"]));
        assert!(!set.contains_all(["a", "c"]));
    }
}
