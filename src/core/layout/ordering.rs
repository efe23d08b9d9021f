//! Crossing reduction: alternating barycenter sweeps, keeping the best order seen.
use super::graph::LayeredGraph;

pub(crate) fn order_layers(graph: &LayeredGraph, sweeps: usize) -> Vec<Vec<usize>> {
    let mut layers = graph.layers.clone();
    let mut pos = vec![0usize; graph.vertices.len()];
    for layer in &layers {
        update_positions(layer, &mut pos);
    }

    let mut best = layers.clone();
    let mut best_crossings = total_crossings(&layers, &graph.succ, &pos);

    for sweep in 0..sweeps {
        if best_crossings == 0 || layers.len() < 2 {
            break;
        }
        if sweep % 2 == 0 {
            for l in 1..layers.len() {
                reorder(&mut layers[l], &graph.pred, &pos);
                update_positions(&layers[l], &mut pos);
            }
        } else {
            for l in (0..layers.len() - 1).rev() {
                reorder(&mut layers[l], &graph.succ, &pos);
                update_positions(&layers[l], &mut pos);
            }
        }

        let crossings = total_crossings(&layers, &graph.succ, &pos);
        if crossings < best_crossings {
            best = layers.clone();
            best_crossings = crossings;
        }
    }
    best
}

fn update_positions(layer: &[usize], pos: &mut [usize]) {
    for (idx, &v) in layer.iter().enumerate() {
        pos[v] = idx;
    }
}

/// Stable sort by the mean position of each vertex's neighbours in the
/// fixed layer; vertices without neighbours keep their current slot as key.
fn reorder(layer: &mut [usize], neighbours: &[Vec<usize>], pos: &[usize]) {
    let key = |v: usize| -> f32 {
        let adjacent = &neighbours[v];
        if adjacent.is_empty() {
            pos[v] as f32
        } else {
            adjacent.iter().map(|&n| pos[n] as f32).sum::<f32>() / adjacent.len() as f32
        }
    };
    let mut keyed: Vec<(f32, usize)> = layer.iter().map(|&v| (key(v), v)).collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    for (slot, (_, v)) in layer.iter_mut().zip(keyed) {
        *slot = v;
    }
}

pub(crate) fn total_crossings(layers: &[Vec<usize>], succ: &[Vec<usize>], pos: &[usize]) -> usize {
    layers
        .iter()
        .map(|layer| {
            let segments: Vec<(usize, usize)> = layer
                .iter()
                .flat_map(|&u| succ[u].iter().map(move |&v| (pos[u], pos[v])))
                .collect();
            count_crossings(&segments)
        })
        .sum()
}

/// Pairs of segments between two layers whose endpoints are in opposite order.
fn count_crossings(segments: &[(usize, usize)]) -> usize {
    let mut count = 0;
    for (i, a) in segments.iter().enumerate() {
        for b in &segments[i + 1..] {
            if (a.0 < b.0 && a.1 > b.1) || (a.0 > b.0 && a.1 < b.1) {
                count += 1;
            }
        }
    }
    count
}
