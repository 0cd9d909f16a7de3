//! Terminal rendering of the taxonomy tree

use termtree::Tree;

use crate::domain::{Metrics, NodeKind, SquarifiedDocument, TreeNode};

pub trait TreeNodeConvert {
    fn to_tree_string(&self, clusters: bool) -> Tree<String>;
}

fn label(kind: NodeKind, name: &str, m: &Metrics) -> String {
    format!(
        "{} [{}] size={} keywords={} clusters={} kd={:.2} cpc={:.2}",
        name, kind, m.size, m.total_keywords, m.total_clusters, m.average_kd, m.average_cpc
    )
}

impl TreeNodeConvert for TreeNode {
    fn to_tree_string(&self, clusters: bool) -> Tree<String> {
        let leaves: Vec<_> = self
            .children()
            .iter()
            .filter(|c| clusters || c.kind() != NodeKind::Cluster)
            .map(|c| c.to_tree_string(clusters))
            .collect();

        Tree::new(label(self.kind(), self.name(), self.metrics())).with_leaves(leaves)
    }
}

impl TreeNodeConvert for SquarifiedDocument {
    fn to_tree_string(&self, clusters: bool) -> Tree<String> {
        let root = format!(
            "{} pillars, {} keywords",
            self.data.len(),
            self.total_keywords()
        );
        Tree::new(root).with_leaves(self.data.iter().map(|p| p.to_tree_string(clusters)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{aggregate, Branch, ClusterMetadata, ClusterNode, Hierarchy, Keyword};

    fn sample() -> TreeNode {
        let hierarchy = Hierarchy {
            pillar: "p".into(),
            parent: "q".into(),
            subtopic: None,
            cluster: "c".into(),
        };
        let leaf = ClusterNode::new(
            hierarchy,
            ClusterMetadata::empty(),
            vec![Keyword::new("a", 10, 20.0, 1.5)],
        );
        let parent = Branch::with_children("q", vec![TreeNode::Cluster(leaf)]);
        aggregate(TreeNode::Pillar(Branch::with_children(
            "p",
            vec![TreeNode::Parent(parent)],
        )))
    }

    #[test]
    fn given_tree_when_rendered_without_clusters_then_leaves_omitted() {
        let rendered = sample().to_tree_string(false).to_string();

        assert!(rendered.contains("p [pillar] size=10 keywords=1"));
        assert!(rendered.contains("q [parent]"));
        assert!(!rendered.contains("[cluster]"));
    }

    #[test]
    fn given_tree_when_rendered_with_clusters_then_leaves_shown() {
        let rendered = sample().to_tree_string(true).to_string();
        assert!(rendered.contains("c [cluster] size=10 keywords=1 clusters=1 kd=20.00 cpc=1.50"));
    }
}
