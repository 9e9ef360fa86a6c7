use rand::Rng;

/// Ordered list of the resource IDs one virtual user created, per kind.
///
/// An ID enters on a successful create response and leaves only once a
/// delete attempt for it reached a terminal status.
#[derive(Debug, Default)]
pub struct Registry {
    ids: Vec<String>,
}

impl Registry {
    pub fn push(&mut self, id: String) {
        self.ids.push(id);
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.ids.get(index).map(String::as_str)
    }

    /// Pick a random member, if any.
    pub fn random(&self, rng: &mut impl Rng) -> Option<String> {
        if self.ids.is_empty() {
            return None;
        }
        let index = rng.random_range(0..self.ids.len());
        Some(self.ids[index].clone())
    }

    /// Remove `id` if present; at most one entry leaves.
    pub fn remove(&mut self, id: &str) -> bool {
        match self.ids.iter().position(|known| known == id) {
            Some(index) => {
                self.ids.remove(index);
                true
            }
            None => false,
        }
    }

    /// Replace the tracked IDs wholesale (leftover-sweep adoption).
    pub fn adopt(&mut self, ids: Vec<String>) {
        self.ids = ids;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng as _, rngs::SmallRng};

    #[test]
    fn remove_drops_at_most_one_entry() {
        let mut registry = Registry::default();
        registry.push("a".to_owned());
        registry.push("b".to_owned());
        registry.push("a".to_owned());

        assert!(registry.remove("a"));
        assert_eq!(registry.len(), 2);
        assert!(registry.remove("a"));
        assert_eq!(registry.len(), 1);
        assert!(!registry.remove("a"));
        assert_eq!(registry.get(0), Some("b"));
    }

    #[test]
    fn random_is_none_on_empty_and_a_member_otherwise() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut registry = Registry::default();
        assert!(registry.random(&mut rng).is_none());

        registry.push("only".to_owned());
        for _ in 0..16 {
            assert_eq!(registry.random(&mut rng).as_deref(), Some("only"));
        }
    }

    #[test]
    fn adopt_replaces_the_tracked_ids() {
        let mut registry = Registry::default();
        registry.push("stale".to_owned());
        registry.adopt(vec!["x".to_owned(), "y".to_owned()]);
        assert_eq!(registry.len(), 2);
        assert!(!registry.remove("stale"));
    }
}
