//! Graphviz rendering of a compiled network

use std::fmt::Write;

use crate::network::Network;
use crate::node::{LeftInput, RightInput};

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

impl Network {
    /// Render alpha nodes, beta nodes and productions as a `digraph`
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph rete {\n  rankdir=TB;\n");

        for alpha in self.alpha_nodes() {
            let _ = writeln!(
                out,
                "  {} [shape=ellipse, label=\"{}\\n{}\"];",
                alpha.id,
                alpha.id,
                escape(&alpha.pattern.to_string())
            );
        }

        for beta in self.beta_nodes() {
            let kind = match &beta.right {
                RightInput::PassThrough => "pass".to_string(),
                RightInput::Alpha(_) => {
                    let vars: Vec<String> = beta.join_vars.iter().map(|v| v.to_string()).collect();
                    format!("join [{}]", vars.join(", "))
                }
                RightInput::Builtin(test) => format!("test {}", test.pattern),
            };
            let _ = writeln!(out, "  {} [shape=box, label=\"{}\\n{}\"];", beta.id, beta.id, escape(&kind));

            match beta.left {
                LeftInput::Alpha(alpha) => {
                    let _ = writeln!(out, "  {} -> {} [label=\"left\"];", alpha, beta.id);
                }
                LeftInput::Beta(parent) => {
                    let _ = writeln!(out, "  {} -> {} [label=\"left\"];", parent, beta.id);
                }
            }
            if let RightInput::Alpha(alpha) = beta.right {
                let _ = writeln!(out, "  {} -> {} [label=\"right\"];", alpha, beta.id);
            }
        }

        for production in self.productions() {
            let _ = writeln!(
                out,
                "  {} [shape=doubleoctagon, label=\"{}\"];",
                production.id,
                escape(&production.label)
            );
            if let Some(terminal) = production.terminal {
                let _ = writeln!(out, "  {} -> {};", terminal, production.id);
            }
        }

        out.push_str("}\n");
        out
    }
}
