//! Namespace open/close tracking.
//!
//! Generators visit definitions in declaration order. Before each one the
//! tracker computes which namespace components must be closed (innermost
//! first) and which must be opened (outermost first) to move from the
//! current namespace to the definition's namespace.

use ironfbs_schema::Namespace;

/// Statements needed to move between two namespaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceTransition {
    /// Namespace before the move.
    pub from: Namespace,
    /// Namespace after the move.
    pub to: Namespace,
    /// Number of leading components shared by both.
    pub common: usize,
}

impl NamespaceTransition {
    /// Components to close, innermost first.
    pub fn closing(&self) -> impl Iterator<Item = &str> {
        self.from.components[self.common..]
            .iter()
            .rev()
            .map(String::as_str)
    }

    /// Components to open, outermost first.
    pub fn opening(&self) -> impl Iterator<Item = &str> {
        self.to.components[self.common..].iter().map(String::as_str)
    }

    /// Returns true when nothing needs to be closed or opened.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.common == self.from.components.len() && self.common == self.to.components.len()
    }
}

/// Tracks the namespace currently open in an output file.
#[derive(Debug, Clone, Default)]
pub struct NamespaceTracker {
    current: Namespace,
}

impl NamespaceTracker {
    /// Creates a tracker positioned at the root namespace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the namespace currently open.
    #[must_use]
    pub fn current(&self) -> &Namespace {
        &self.current
    }

    /// Moves to `target` and returns the statements required.
    pub fn transition_to(&mut self, target: &Namespace) -> NamespaceTransition {
        let common = self.current.common_prefix_len(target);
        let from = std::mem::replace(&mut self.current, target.clone());
        NamespaceTransition {
            from,
            to: target.clone(),
            common,
        }
    }

    /// Closes everything that is still open.
    pub fn finish(&mut self) -> NamespaceTransition {
        self.transition_to(&Namespace::root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_from_root() {
        let mut tracker = NamespaceTracker::new();
        let t = tracker.transition_to(&Namespace::from_dotted("MyGame.Example"));
        assert_eq!(t.closing().count(), 0);
        assert_eq!(t.opening().collect::<Vec<_>>(), vec!["MyGame", "Example"]);
        assert_eq!(tracker.current(), &Namespace::from_dotted("MyGame.Example"));
    }

    #[test]
    fn test_sibling_transition() {
        let mut tracker = NamespaceTracker::new();
        tracker.transition_to(&Namespace::from_dotted("MyGame.Example"));
        let t = tracker.transition_to(&Namespace::from_dotted("MyGame.Example2"));
        assert_eq!(t.common, 1);
        assert_eq!(t.closing().collect::<Vec<_>>(), vec!["Example"]);
        assert_eq!(t.opening().collect::<Vec<_>>(), vec!["Example2"]);
    }

    #[test]
    fn test_same_namespace_is_noop() {
        let mut tracker = NamespaceTracker::new();
        tracker.transition_to(&Namespace::from_dotted("A.B"));
        assert!(tracker.transition_to(&Namespace::from_dotted("A.B")).is_noop());
    }

    #[test]
    fn test_finish_closes_innermost_first() {
        let mut tracker = NamespaceTracker::new();
        tracker.transition_to(&Namespace::from_dotted("A.B.C"));
        let t = tracker.finish();
        assert_eq!(t.closing().collect::<Vec<_>>(), vec!["C", "B", "A"]);
        assert!(tracker.current().is_root());
    }

    #[test]
    fn test_balanced_over_interleaved_sequence() {
        let sequence = ["A.B", "A", "C.D.E", "A.B", "", "C", "C.D"];
        let mut tracker = NamespaceTracker::new();
        let mut stack: Vec<String> = Vec::new();
        let apply = |t: &NamespaceTransition, stack: &mut Vec<String>| {
            for component in t.closing() {
                assert_eq!(stack.pop().as_deref(), Some(component), "close out of order");
            }
            for component in t.opening() {
                stack.push(component.to_string());
            }
        };
        for ns in sequence {
            let target = Namespace::from_dotted(ns);
            let t = tracker.transition_to(&target);
            apply(&t, &mut stack);
            assert_eq!(stack, target.components);
        }
        let t = tracker.finish();
        apply(&t, &mut stack);
        assert!(stack.is_empty());
    }
}
