//! Tree navigation and learning-path extraction.
//!
//! Read-only traversals over the registry: rendering the topic tree,
//! linearizing it for list views, and walking the prerequisite graph.

use std::collections::HashSet;

use crate::registry::TopicTaxonomy;
use crate::types::{FlattenedTopic, LearningPath, TopicDefinition, TopicId, TopicTreeNode};

impl TopicTaxonomy {
    /// Build the topic tree, rooted at `root` or at every parentless topic.
    ///
    /// Nodes carry their depth relative to the traversal root and the id
    /// path from the root down. Siblings are ordered by id for stable
    /// rendering.
    pub fn get_tree(&self, root: Option<&TopicId>) -> Vec<TopicTreeNode> {
        let mut roots: Vec<&TopicDefinition> = match root {
            Some(id) => self.topics.get(id).into_iter().collect(),
            None => self.topics.values().filter(|t| t.parent_id.is_none()).collect(),
        };
        roots.sort_by(|a, b| a.id.cmp(&b.id));

        roots
            .into_iter()
            .map(|t| self.build_node(t, 0, &[]))
            .collect()
    }

    fn build_node(&self, topic: &TopicDefinition, depth: usize, prefix: &[TopicId]) -> TopicTreeNode {
        let mut path = prefix.to_vec();
        path.push(topic.id.clone());

        let mut child_ids = topic.child_ids.clone();
        child_ids.sort();

        let children = child_ids
            .iter()
            .filter_map(|c| self.topics.get(c))
            .map(|c| self.build_node(c, depth + 1, &path))
            .collect();

        TopicTreeNode {
            topic: topic.clone(),
            depth,
            path,
            children,
        }
    }

    /// Linearize the tree in pre-order with `is_last_child` flags, for
    /// indent-and-branch list rendering.
    pub fn get_flattened_topics(&self, root: Option<&TopicId>) -> Vec<FlattenedTopic> {
        let tree = self.get_tree(root);
        let mut rows = Vec::new();
        let last = tree.len().saturating_sub(1);
        for (i, node) in tree.iter().enumerate() {
            flatten_into(node, i == last, &mut rows);
        }
        rows
    }

    /// Transitive prerequisite closure of a topic.
    ///
    /// Depth-first with a visited set: the data model assumes the
    /// prerequisite graph is acyclic (and writes enforce it), but the
    /// guard keeps traversal terminating on any input. Dangling
    /// prerequisite ids are skipped. The target itself is not included.
    pub fn get_prerequisites(&self, id: &TopicId) -> Vec<TopicDefinition> {
        let mut visited = HashSet::new();
        visited.insert(id.clone());
        let mut out = Vec::new();
        if let Some(topic) = self.topics.get(id) {
            for prereq in &topic.prerequisites {
                self.collect_prerequisites(prereq, &mut visited, &mut out);
            }
        }
        out
    }

    fn collect_prerequisites(
        &self,
        id: &TopicId,
        visited: &mut HashSet<TopicId>,
        out: &mut Vec<TopicDefinition>,
    ) {
        if !visited.insert(id.clone()) {
            return;
        }
        if let Some(topic) = self.topics.get(id) {
            for prereq in &topic.prerequisites {
                self.collect_prerequisites(prereq, visited, out);
            }
            out.push(topic.clone());
        }
    }

    /// Ordered learning path toward a target topic.
    ///
    /// Prerequisites plus the target, sorted by ascending hierarchical
    /// depth (a proxy for difficulty ordering) with id as a stable
    /// tie-break, target always last. `estimated_minutes` stays `None`;
    /// aggregating resource time is the selector's job.
    pub fn get_learning_path(&self, id: &TopicId) -> Option<LearningPath> {
        let target = self.topics.get(id)?;

        let mut steps = self.get_prerequisites(id);
        steps.sort_by(|a, b| a.id.depth().cmp(&b.id.depth()).then_with(|| a.id.cmp(&b.id)));
        steps.push(target.clone());

        let difficulty_progression = steps.iter().map(|t| t.difficulty).collect();

        Some(LearningPath {
            topics: steps,
            difficulty_progression,
            estimated_minutes: None,
        })
    }
}

fn flatten_into(node: &TopicTreeNode, is_last_child: bool, out: &mut Vec<FlattenedTopic>) {
    out.push(FlattenedTopic {
        topic_id: node.topic.id.clone(),
        name: node.topic.name.clone(),
        depth: node.depth,
        is_last_child,
    });
    let last = node.children.len().saturating_sub(1);
    for (i, child) in node.children.iter().enumerate() {
        flatten_into(child, i == last, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CreateTopicInput, DifficultyLevel, TokenMatchPattern, TopicCategory};

    fn input(id: &str, parent: Option<&str>, prereqs: &[&str]) -> CreateTopicInput {
        CreateTopicInput {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            category: TopicCategory::Concept,
            parent_id: parent.map(|p| p.to_string()),
            difficulty: DifficultyLevel::Beginner,
            patterns: TokenMatchPattern::default(),
            aliases: vec![],
            related_topics: vec![],
            prerequisites: prereqs.iter().map(|p| p.to_string()).collect(),
            keywords: vec![],
        }
    }

    fn seed(registry: &mut TopicTaxonomy) {
        registry.create(input("language", None, &[])).unwrap();
        registry
            .create(input("language:rust", Some("language"), &[]))
            .unwrap();
        registry
            .create(input(
                "language:rust:ownership",
                Some("language:rust"),
                &["language:rust"],
            ))
            .unwrap();
        registry
            .create(input("language:rust:async", Some("language:rust"), &[]))
            .unwrap();
    }

    #[test]
    fn test_tree_depth_and_path() {
        let mut registry = TopicTaxonomy::new();
        seed(&mut registry);

        let tree = registry.get_tree(None);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].topic.id.as_str(), "language");
        assert_eq!(tree[0].depth, 0);

        let rust = &tree[0].children[0];
        assert_eq!(rust.depth, 1);
        assert_eq!(rust.children.len(), 2);

        let grandchild = &rust.children[0];
        assert_eq!(grandchild.depth, 2);
        assert_eq!(
            grandchild.path.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
            vec!["language", "language:rust", grandchild.topic.id.as_str()]
        );
    }

    #[test]
    fn test_subtree_root() {
        let mut registry = TopicTaxonomy::new();
        seed(&mut registry);

        let rust = TopicId::parse("language:rust").unwrap();
        let tree = registry.get_tree(Some(&rust));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].depth, 0);
        assert_eq!(tree[0].path, vec![rust]);
    }

    #[test]
    fn test_flattened_last_child_flags() {
        let mut registry = TopicTaxonomy::new();
        seed(&mut registry);

        let rows = registry.get_flattened_topics(None);
        assert_eq!(rows.len(), 4);
        assert!(rows[0].is_last_child); // sole root

        // Children of language:rust sort as :async then :ownership.
        let async_row = rows.iter().find(|r| r.topic_id.as_str() == "language:rust:async").unwrap();
        let ownership_row = rows
            .iter()
            .find(|r| r.topic_id.as_str() == "language:rust:ownership")
            .unwrap();
        assert!(!async_row.is_last_child);
        assert!(ownership_row.is_last_child);
        assert_eq!(ownership_row.depth, 2);
    }

    #[test]
    fn test_prerequisites_transitive() {
        let mut registry = TopicTaxonomy::new();
        registry.create(input("concept", None, &[])).unwrap();
        registry
            .create(input("concept:memory", Some("concept"), &[]))
            .unwrap();
        registry
            .create(input("concept:pointers", Some("concept"), &["concept:memory"]))
            .unwrap();
        registry
            .create(input(
                "concept:lifetimes",
                Some("concept"),
                &["concept:pointers"],
            ))
            .unwrap();

        let lifetimes = TopicId::parse("concept:lifetimes").unwrap();
        let prereqs = registry.get_prerequisites(&lifetimes);
        let ids: Vec<&str> = prereqs.iter().map(|t| t.id.as_str()).collect();
        assert!(ids.contains(&"concept:memory"));
        assert!(ids.contains(&"concept:pointers"));
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_learning_path_ordering() {
        let mut registry = TopicTaxonomy::new();
        seed(&mut registry);

        let ownership = TopicId::parse("language:rust:ownership").unwrap();
        let path = registry.get_learning_path(&ownership).unwrap();

        // Every prerequisite appears exactly once, depth never decreases,
        // target is last.
        let prereqs = registry.get_prerequisites(&ownership);
        for p in &prereqs {
            assert_eq!(path.topics.iter().filter(|t| t.id == p.id).count(), 1);
        }
        let depths: Vec<usize> = path.topics.iter().map(|t| t.id.depth()).collect();
        assert!(depths.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(path.topics.last().unwrap().id, ownership);
        assert_eq!(path.difficulty_progression.len(), path.topics.len());
        assert!(path.estimated_minutes.is_none());
    }

    #[test]
    fn test_learning_path_missing_topic() {
        let registry = TopicTaxonomy::new();
        let id = TopicId::parse("language").unwrap();
        assert!(registry.get_learning_path(&id).is_none());
    }
}
