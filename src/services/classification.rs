//! Classification code resolution
//!
//! The forest is walked depth-first once to build a code index; later lookups
//! hit the index instead of re-scanning the whole nomenclature.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;

use crate::{error::AppResult, models::ClassificationNode, repository::EquipmentStore};

/// Depth-first, pre-order search over a forest. First match wins.
pub fn find_in_forest<'a>(forest: &'a [ClassificationNode], code: &str) -> Option<&'a ClassificationNode> {
    forest.iter().find_map(|node| find_in_subtree(node, code))
}

fn find_in_subtree<'a>(node: &'a ClassificationNode, code: &str) -> Option<&'a ClassificationNode> {
    if node.code == code {
        return Some(node);
    }
    node.children.iter().find_map(|child| find_in_subtree(child, code))
}

/// Code → path of child indices from the forest root, built in one traversal
#[derive(Debug, Default)]
pub struct ClassificationIndex {
    forest: Vec<ClassificationNode>,
    paths: HashMap<String, Vec<usize>>,
}

impl ClassificationIndex {
    pub fn build(forest: Vec<ClassificationNode>) -> Self {
        let mut paths = HashMap::new();
        let mut path = Vec::new();
        for (idx, root) in forest.iter().enumerate() {
            path.push(idx);
            index_subtree(root, &mut path, &mut paths);
            path.pop();
        }
        Self { forest, paths }
    }

    pub fn get(&self, code: &str) -> Option<&ClassificationNode> {
        let path = self.paths.get(code)?;
        let (first, rest) = path.split_first()?;
        let mut node = self.forest.get(*first)?;
        for idx in rest {
            node = node.children.get(*idx)?;
        }
        Some(node)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

fn index_subtree(node: &ClassificationNode, path: &mut Vec<usize>, paths: &mut HashMap<String, Vec<usize>>) {
    // pre-order with or_insert keeps the same winner as find_in_forest on duplicate codes
    paths.entry(node.code.clone()).or_insert_with(|| path.clone());
    for (idx, child) in node.children.iter().enumerate() {
        path.push(idx);
        index_subtree(child, path, paths);
        path.pop();
    }
}

/// Resolves classification codes against the forest held by the store
pub struct ClassificationResolver {
    store: Arc<dyn EquipmentStore>,
    index: RwLock<Option<Arc<ClassificationIndex>>>,
}

impl ClassificationResolver {
    pub fn new(store: Arc<dyn EquipmentStore>) -> Self {
        Self {
            store,
            index: RwLock::new(None),
        }
    }

    /// Resolve a code; `None` when no node carries it
    pub async fn resolve(&self, code: &str) -> AppResult<Option<ClassificationNode>> {
        if code.is_empty() {
            return Ok(None);
        }
        let index = self.index().await?;
        Ok(index.get(code).cloned())
    }

    /// Drop the cached index; the next lookup reloads the forest
    pub async fn reload(&self) {
        *self.index.write().await = None;
        tracing::info!("Classification index invalidated");
    }

    async fn index(&self) -> AppResult<Arc<ClassificationIndex>> {
        if let Some(index) = self.index.read().await.as_ref() {
            return Ok(index.clone());
        }

        let mut slot = self.index.write().await;
        if let Some(index) = slot.as_ref() {
            return Ok(index.clone());
        }
        let forest = self.store.classification_forest().await?;
        let index = Arc::new(ClassificationIndex::build(forest));
        tracing::info!("Classification index built with {} codes", index.len());
        *slot = Some(index.clone());
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryStore;

    fn forest() -> Vec<ClassificationNode> {
        vec![
            ClassificationNode::new("A", "Administration devices").with_children(vec![
                ClassificationNode::new("A01", "Needles").with_children(vec![
                    ClassificationNode::new("A0101", "Hypodermic needles").with_children(vec![
                        ClassificationNode::new("A010101", "Single-use needles"),
                    ]),
                ]),
            ]),
            ClassificationNode::new("Z", "Medical equipment").with_children(vec![
                ClassificationNode::new("Z11", "Diagnostic imaging"),
                ClassificationNode::new("Z12", "Surgical equipment"),
            ]),
        ]
    }

    #[test]
    fn test_find_in_forest_at_any_depth() {
        let forest = forest();
        assert_eq!(find_in_forest(&forest, "A").unwrap().label, "Administration devices");
        assert_eq!(find_in_forest(&forest, "A010101").unwrap().label, "Single-use needles");
        assert_eq!(find_in_forest(&forest, "Z12").unwrap().label, "Surgical equipment");
        assert!(find_in_forest(&forest, "B").is_none());
        assert!(find_in_forest(&forest, "a01").is_none());
    }

    #[test]
    fn test_index_agrees_with_traversal() {
        let forest = forest();
        let index = ClassificationIndex::build(forest.clone());
        assert_eq!(index.len(), 8);
        for code in ["A", "A01", "A0101", "A010101", "Z", "Z11", "Z12", "missing"] {
            assert_eq!(index.get(code), find_in_forest(&forest, code));
        }
    }

    #[test]
    fn test_first_match_wins_on_duplicate_codes() {
        let forest = vec![
            ClassificationNode::new("X", "first").with_children(vec![ClassificationNode::new("DUP", "deep")]),
            ClassificationNode::new("DUP", "shallow but later"),
        ];
        let index = ClassificationIndex::build(forest.clone());
        assert_eq!(index.get("DUP").unwrap().label, "deep");
        assert_eq!(find_in_forest(&forest, "DUP").unwrap().label, "deep");
    }

    #[tokio::test]
    async fn test_resolver_loads_forest_once() {
        let store = Arc::new(InMemoryStore::new().with_forest(forest()));
        let resolver = ClassificationResolver::new(store.clone());

        assert!(resolver.resolve("A0101").await.unwrap().is_some());
        assert!(resolver.resolve("Z11").await.unwrap().is_some());
        assert!(resolver.resolve("nope").await.unwrap().is_none());
        assert!(resolver.resolve("").await.unwrap().is_none());
        assert_eq!(store.forest_load_count(), 1);

        resolver.reload().await;
        assert!(resolver.resolve("Z").await.unwrap().is_some());
        assert_eq!(store.forest_load_count(), 2);
    }
}
