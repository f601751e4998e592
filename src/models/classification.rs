//! Classification nomenclature (EMDN-style code forest)

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A node of the classification forest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClassificationNode {
    pub code: String,
    pub label: String,
    #[serde(default)]
    pub children: Vec<ClassificationNode>,
}

impl ClassificationNode {
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<ClassificationNode>) -> Self {
        self.children = children;
        self
    }
}

/// Flat row as stored: parent pointer plus sibling position
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClassificationRow {
    pub code: String,
    pub label: String,
    pub parent_code: Option<String>,
    pub position: i32,
}

/// Rebuild the forest from flat rows.
///
/// Rows whose parent is missing become roots. Siblings keep `position` order.
pub fn build_forest(mut rows: Vec<ClassificationRow>) -> Vec<ClassificationNode> {
    use std::collections::{HashMap, HashSet};

    rows.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.code.cmp(&b.code)));

    let known: HashSet<String> = rows.iter().map(|r| r.code.clone()).collect();
    let mut children_of: HashMap<String, Vec<ClassificationRow>> = HashMap::new();
    let mut roots = Vec::new();

    for row in rows {
        match row.parent_code.clone() {
            Some(parent) if known.contains(&parent) => {
                children_of.entry(parent).or_default().push(row)
            }
            _ => roots.push(row),
        }
    }

    fn attach(row: ClassificationRow, children_of: &mut HashMap<String, Vec<ClassificationRow>>) -> ClassificationNode {
        let children = children_of
            .remove(&row.code)
            .unwrap_or_default()
            .into_iter()
            .map(|child| attach(child, children_of))
            .collect();
        ClassificationNode {
            code: row.code,
            label: row.label,
            children,
        }
    }

    roots
        .into_iter()
        .map(|row| attach(row, &mut children_of))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: &str, parent: Option<&str>, position: i32) -> ClassificationRow {
        ClassificationRow {
            code: code.to_string(),
            label: format!("label {}", code),
            parent_code: parent.map(str::to_string),
            position,
        }
    }

    #[test]
    fn test_build_forest_nests_children_in_position_order() {
        let forest = build_forest(vec![
            row("Z12", Some("Z"), 1),
            row("Z", None, 0),
            row("Z11", Some("Z"), 0),
            row("A", None, 1),
            row("Z1101", Some("Z11"), 0),
        ]);

        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].code, "Z");
        assert_eq!(forest[0].children[0].code, "Z11");
        assert_eq!(forest[0].children[1].code, "Z12");
        assert_eq!(forest[0].children[0].children[0].code, "Z1101");
    }

    #[test]
    fn test_orphan_rows_become_roots() {
        let forest = build_forest(vec![row("B01", Some("B"), 0)]);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].code, "B01");
    }
}
