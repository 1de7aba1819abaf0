use std::collections::BTreeSet;

/// Records which chips are built out of which, so a chip made (indirectly) out of itself
/// is caught before the parser recurses into it.
#[derive(Debug, Clone)]
pub struct Depends<T> {
    nodes: Vec<T>,
    /// `(dependent, dependency)`
    edges: Vec<(T, T)>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct CycleDetected;

impl<T: Eq + Clone + Ord> Default for Depends<T> {
    fn default() -> Self {
        Depends::new()
    }
}

impl<T: Eq + Clone + Ord> Depends<T> {
    pub fn new() -> Depends<T> {
        Depends {
            nodes: vec![],
            edges: vec![],
        }
    }

    pub fn add(&mut self, t: T) {
        if !self.nodes.contains(&t) {
            self.nodes.push(t);
        }
    }

    /// Records that `dependent` is built out of `dependency`.
    pub fn add_dependency(&mut self, dependent: T, dependency: T) {
        self.add(dependent.clone());
        self.add(dependency.clone());

        let edge = (dependent, dependency);
        if !self.edges.contains(&edge) {
            self.edges.push(edge);
        }
    }

    pub fn remove_dependency(&mut self, dependent: &T, dependency: &T) {
        self.edges.retain(|(s, t)| !(s == dependent && t == dependency));
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    fn remove(&mut self, t: &T) {
        self.nodes.retain(|node| node != t);
        self.edges.retain(|(s, d)| s != t && d != t);
    }

    /// Nodes that depend on nothing.
    fn roots(&self) -> Vec<T> {
        let mut roots: BTreeSet<T> = self.nodes.iter().cloned().collect();
        for (dependent, _dependency) in &self.edges {
            roots.remove(dependent);
        }
        roots.into_iter().collect()
    }

    /// Every node, each after everything it depends on.
    pub fn sort(&self) -> Result<Vec<T>, CycleDetected> {
        let mut remaining = self.clone();
        let mut results = vec![];

        while !remaining.nodes.is_empty() {
            let roots = remaining.roots();
            if roots.is_empty() {
                return Err(CycleDetected);
            }

            results.extend_from_slice(roots.as_slice());
            for root in roots {
                remaining.remove(&root);
            }
        }
        Ok(results)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sorted() {
        let mut depends = Depends::new();
        depends.add_dependency("CPU", "ALU");
        depends.add_dependency("CPU", "Register");
        depends.add_dependency("ALU", "Add16");
        depends.add_dependency("ALU", "Not16");
        depends.add_dependency("Register", "Bit");
        depends.add("Screen");

        let mut roots = depends.roots();
        roots.sort();
        assert_eq!(roots, vec!["Add16", "Bit", "Not16", "Screen"]);

        let sorted = depends.sort().unwrap();
        let position = |name: &str| sorted.iter().position(|x| *x == name).unwrap();
        assert!(position("Add16") < position("ALU"));
        assert!(position("Not16") < position("ALU"));
        assert!(position("Bit") < position("Register"));
        assert!(position("ALU") < position("CPU"));
        assert!(position("Register") < position("CPU"));
        assert_eq!(sorted.len(), 7);
    }

    #[test]
    fn cycle() {
        let mut depends = Depends::new();
        depends.add_dependency("A", "B");
        depends.add_dependency("B", "C");
        assert!(depends.sort().is_ok());

        depends.add_dependency("C", "A");
        assert_eq!(depends.sort(), Err(CycleDetected));

        depends.remove_dependency(&"C", &"A");
        assert!(depends.sort().is_ok());

        depends.add_dependency("D", "D");
        assert_eq!(depends.sort(), Err(CycleDetected));
    }
}
