use std::collections::HashMap;
use std::fmt;

/// Maps each identifier to the value most recently assigned to it. The table
/// lives for the whole session; nothing is ever deleted from it.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    values: HashMap<String, i64>,
    insertion_order: Vec<String>,
}

impl SymbolTable {
    pub fn resolve(&self, name: &str) -> Option<i64> {
        self.values.get(name).copied()
    }

    pub fn assign(&mut self, name: &str, value: i64) {
        if self.values.insert(name.to_string(), value).is_none() {
            self.insertion_order.push(name.to_string());
        }
    }

    /// The current bindings in first-insertion order. Re-assigning a name
    /// updates its value but keeps its original position.
    pub fn snapshot(&self) -> Vec<(String, i64)> {
        self.insertion_order
            .iter()
            .map(|name| (name.clone(), self.values[name]))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, name) in self.insertion_order.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", name, self.values[name])?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_only_assigned_names() {
        let mut table = SymbolTable::default();
        assert!(table.resolve("a").is_none());

        table.assign("a", 5);
        assert_eq!(table.resolve("a"), Some(5));
        assert!(table.resolve("A").is_none(), "names are case-sensitive");
    }

    #[test]
    fn reassignment_updates_value_but_not_order() {
        let mut table = SymbolTable::default();
        table.assign("a", 1);
        table.assign("b", 2);
        table.assign("a", 10);

        assert_eq!(table.len(), 2);
        assert_eq!(
            table.snapshot(),
            vec![("a".to_string(), 10), ("b".to_string(), 2)]
        );
    }

    #[test]
    fn display_lists_bindings_in_insertion_order() {
        let mut table = SymbolTable::default();
        assert_eq!(table.to_string(), "{}");

        table.assign("x", 5);
        table.assign("y", 6);
        assert_eq!(table.to_string(), "{x: 5, y: 6}");
    }
}
