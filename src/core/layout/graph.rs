//! Layer assignment: cycle breaking, longest-path layering and the dummy
//! vertices that turn every edge into a chain between adjacent layers.
use std::collections::VecDeque;

/// Height reserved for an edge passing through a layer.
pub(crate) const DUMMY_HEIGHT: f32 = 10.0;

#[derive(Debug, Clone)]
pub(crate) struct Vertex {
    pub layer: usize,
    pub width: f32,
    pub height: f32,
}

/// One input edge after layering.
#[derive(Debug, Clone)]
pub(crate) struct EdgeChain {
    /// Vertices from the upstream to the downstream end; for a reversed
    /// edge this runs from the edge's target to its source.
    pub vertices: Vec<usize>,
    pub reversed: bool,
    pub self_loop: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct LayeredGraph {
    /// Real vertices occupy `0..real_count`, dummies follow.
    pub vertices: Vec<Vertex>,
    pub real_count: usize,
    pub layers: Vec<Vec<usize>>,
    pub succ: Vec<Vec<usize>>,
    pub pred: Vec<Vec<usize>>,
    pub chains: Vec<EdgeChain>,
}

/// Flags edges that close a cycle, found by depth-first search started from
/// vertices without incoming edges first.
pub(crate) fn find_back_edges(n: usize, edges: &[(usize, usize)]) -> Vec<bool> {
    let mut out: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut indegree = vec![0usize; n];
    for (idx, &(u, v)) in edges.iter().enumerate() {
        if u != v {
            out[u].push(idx);
            indegree[v] += 1;
        }
    }

    let roots = (0..n)
        .filter(|&v| indegree[v] == 0)
        .chain((0..n).filter(|&v| indegree[v] > 0));

    // 0 = unvisited, 1 = on the DFS stack, 2 = done
    let mut state = vec![0u8; n];
    let mut back = vec![false; edges.len()];
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for root in roots {
        if state[root] != 0 {
            continue;
        }
        state[root] = 1;
        stack.push((root, 0));
        while let Some(top) = stack.last_mut() {
            let v = top.0;
            if let Some(&edge) = out[v].get(top.1) {
                top.1 += 1;
                let w = edges[edge].1;
                match state[w] {
                    0 => {
                        state[w] = 1;
                        stack.push((w, 0));
                    }
                    1 => back[edge] = true,
                    _ => {}
                }
            } else {
                state[v] = 2;
                stack.pop();
            }
        }
    }
    back
}

/// Longest-path layering of an acyclic edge list.
pub(crate) fn longest_path_layers(n: usize, dag: &[(usize, usize)]) -> Vec<usize> {
    let mut out: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut indegree = vec![0usize; n];
    for &(u, v) in dag {
        out[u].push(v);
        indegree[v] += 1;
    }

    let mut layer = vec![0usize; n];
    let mut queue: VecDeque<usize> = (0..n).filter(|&v| indegree[v] == 0).collect();
    while let Some(u) = queue.pop_front() {
        for &v in &out[u] {
            layer[v] = layer[v].max(layer[u] + 1);
            indegree[v] -= 1;
            if indegree[v] == 0 {
                queue.push_back(v);
            }
        }
    }
    layer
}

/// Build the layered graph for real vertices of the given footprint sizes.
pub(crate) fn build(sizes: &[(f32, f32)], edges: &[(usize, usize)]) -> LayeredGraph {
    let n = sizes.len();
    let back = find_back_edges(n, edges);

    let dag: Vec<(usize, usize)> = edges
        .iter()
        .zip(&back)
        .filter(|((u, v), _)| u != v)
        .map(|(&(u, v), &reversed)| if reversed { (v, u) } else { (u, v) })
        .collect();
    let layer_of = longest_path_layers(n, &dag);

    let mut vertices: Vec<Vertex> = sizes
        .iter()
        .zip(&layer_of)
        .map(|(&(width, height), &layer)| Vertex {
            layer,
            width,
            height,
        })
        .collect();
    let mut succ: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut pred: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut chains = Vec::with_capacity(edges.len());

    for (&(u, v), &reversed) in edges.iter().zip(&back) {
        if u == v {
            chains.push(EdgeChain {
                vertices: vec![u],
                reversed: false,
                self_loop: true,
            });
            continue;
        }

        let (a, b) = if reversed { (v, u) } else { (u, v) };
        let mut chain = vec![a];
        let mut prev = a;
        for layer in layer_of[a] + 1..layer_of[b] {
            let dummy = vertices.len();
            vertices.push(Vertex {
                layer,
                width: 0.0,
                height: DUMMY_HEIGHT,
            });
            succ.push(Vec::new());
            pred.push(Vec::new());
            succ[prev].push(dummy);
            pred[dummy].push(prev);
            chain.push(dummy);
            prev = dummy;
        }
        succ[prev].push(b);
        pred[b].push(prev);
        chain.push(b);

        chains.push(EdgeChain {
            vertices: chain,
            reversed,
            self_loop: false,
        });
    }

    let layer_count = vertices.iter().map(|v| v.layer + 1).max().unwrap_or(0);
    let mut layers = vec![Vec::new(); layer_count];
    for (idx, vertex) in vertices.iter().enumerate() {
        layers[vertex.layer].push(idx);
    }

    LayeredGraph {
        vertices,
        real_count: n,
        layers,
        succ,
        pred,
        chains,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn back_edges_close_cycles_only() {
        // 0 -> 1 -> 2 -> 1, 2 -> 3
        let edges = [(0, 1), (1, 2), (2, 1), (2, 3)];
        assert_eq!(find_back_edges(4, &edges), vec![false, false, true, false]);
    }

    #[test]
    fn cycle_without_sources_still_breaks() {
        let edges = [(0, 1), (1, 2), (2, 0)];
        let back = find_back_edges(3, &edges);
        assert_eq!(back.iter().filter(|&&b| b).count(), 1);
    }

    #[test]
    fn layers_follow_longest_path() {
        // 0 -> 1 -> 2, 0 -> 2
        let layers = longest_path_layers(3, &[(0, 1), (1, 2), (0, 2)]);
        assert_eq!(layers, vec![0, 1, 2]);
    }

    #[test]
    fn long_edges_get_dummy_chains() {
        let sizes = [(10.0, 10.0); 3];
        let graph = build(&sizes, &[(0, 1), (1, 2), (0, 2)]);
        assert_eq!(graph.real_count, 3);
        assert_eq!(graph.vertices.len(), 4);
        assert_eq!(graph.chains[2].vertices, vec![0, 3, 2]);
        assert_eq!(graph.vertices[3].layer, 1);
        assert_eq!(graph.layers, vec![vec![0], vec![1, 3], vec![2]]);
        assert_eq!(graph.succ[0], vec![1, 3]);
        assert_eq!(graph.pred[2], vec![1, 3]);
    }

    #[test]
    fn reversed_edges_run_downstream_in_the_chain() {
        let sizes = [(10.0, 10.0); 2];
        let graph = build(&sizes, &[(0, 1), (1, 0), (1, 1)]);
        assert!(!graph.chains[0].reversed);
        assert!(graph.chains[1].reversed);
        assert_eq!(graph.chains[1].vertices, vec![0, 1]);
        assert!(graph.chains[2].self_loop);
        assert_eq!(graph.layers, vec![vec![0], vec![1]]);
    }
}
