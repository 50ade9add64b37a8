//! Dependency cycle detection
//!
//! Depth-first search with an explicit frame stack instead of recursion, so a
//! pathological graph cannot exhaust the call stack. A child that is still on
//! the stack closes a cycle, reported from its first occurrence on the current
//! path back to itself: `[A, B, C, A]`.
//!
//! Start nodes are tried in node order and already-visited nodes are never
//! restarted. Every graph with a cycle yields at least one report, but this is
//! not an enumeration of all elementary cycles: a cycle whose nodes were all
//! finished from an earlier start can go unreported.

use petgraph::graph::{DiGraph, NodeIndex};

struct Frame {
  node: NodeIndex,
  children: Vec<NodeIndex>,
  next: usize,
}

impl Frame {
  fn new<N, E>(graph: &DiGraph<N, E>, node: NodeIndex) -> Self {
    let mut children: Vec<NodeIndex> = graph.neighbors(node).collect();
    children.sort();
    children.dedup();
    Self { node, children, next: 0 }
  }
}

/// All cycles reachable through the DFS forest, in discovery order
pub fn find_cycles<N: AsRef<str>, E>(graph: &DiGraph<N, E>) -> Vec<Vec<String>> {
  let mut visited = vec![false; graph.node_count()];
  let mut on_stack = vec![false; graph.node_count()];
  let mut cycles = Vec::new();

  for start in graph.node_indices() {
    if visited[start.index()] {
      continue;
    }

    visited[start.index()] = true;
    on_stack[start.index()] = true;
    let mut stack = vec![Frame::new(graph, start)];

    while let Some(frame) = stack.last_mut() {
      let Some(&child) = frame.children.get(frame.next) else {
        on_stack[frame.node.index()] = false;
        stack.pop();
        continue;
      };
      frame.next += 1;

      if on_stack[child.index()] {
        if let Some(begin) = stack.iter().position(|f| f.node == child) {
          let mut cycle: Vec<String> = stack[begin..]
            .iter()
            .map(|f| graph[f.node].as_ref().to_string())
            .collect();
          cycle.push(graph[child].as_ref().to_string());
          cycles.push(cycle);
        }
      } else if !visited[child.index()] {
        visited[child.index()] = true;
        on_stack[child.index()] = true;
        stack.push(Frame::new(graph, child));
      }
    }
  }

  cycles
}
