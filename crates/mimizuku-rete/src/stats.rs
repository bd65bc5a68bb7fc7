use serde::{Deserialize, Serialize};
use std::fmt;

/// Snapshot of network size and activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkStats {
    pub rules: usize,
    pub alpha_nodes: usize,
    pub beta_nodes: usize,
    pub terminal_nodes: usize,
    pub working_memory: usize,
    pub inferred: usize,
    pub left_memory: usize,
    pub right_memory: usize,
    pub firings: u64,
    /// Head patterns skipped because a variable stayed unbound
    pub discarded_heads: u64,
    pub minted_blanks: usize,
}

impl NetworkStats {
    pub fn nodes(&self) -> usize {
        self.alpha_nodes + self.beta_nodes
    }
}

impl fmt::Display for NetworkStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Network: {} rules, {} nodes, {} tokens in working memory, {} inferred tokens>",
            self.rules,
            self.nodes(),
            self.working_memory,
            self.inferred
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_summarises_counts() {
        let stats = NetworkStats {
            rules: 2,
            alpha_nodes: 3,
            beta_nodes: 4,
            working_memory: 10,
            inferred: 6,
            ..Default::default()
        };
        assert_eq!(
            stats.to_string(),
            "<Network: 2 rules, 7 nodes, 10 tokens in working memory, 6 inferred tokens>"
        );
    }
}
