//! Coordinate assignment for the left-to-right layout.
//!
//! Layers become columns. Inside a column vertices keep their order and are
//! pulled towards the median of their neighbours in the adjacent column, then
//! packed so that no two footprints come closer than `node_gap`.
use super::graph::LayeredGraph;
use super::{LayoutConfig, Point};

/// Rounds of downward plus upward median alignment.
const ALIGN_ROUNDS: usize = 4;

pub(crate) struct Placement {
    /// Footprint center of every vertex, dummies included.
    pub centers: Vec<Point>,
    pub width: f32,
    pub height: f32,
}

pub(crate) fn assign_coordinates(
    graph: &LayeredGraph,
    layers: &[Vec<usize>],
    config: &LayoutConfig,
) -> Placement {
    let n = graph.vertices.len();
    let mut xs = vec![0.0f32; n];
    let mut ys = vec![0.0f32; n];

    let mut x = config.margin;
    for layer in layers {
        let column = layer
            .iter()
            .map(|&v| graph.vertices[v].width)
            .fold(0.0f32, f32::max);
        for &v in layer {
            xs[v] = x + column / 2.0;
        }
        x += column + config.rank_gap;
    }
    let width = if layers.is_empty() {
        2.0 * config.margin
    } else {
        x - config.rank_gap + config.margin
    };

    let heights: Vec<Vec<f32>> = layers
        .iter()
        .map(|layer| layer.iter().map(|&v| graph.vertices[v].height).collect())
        .collect();

    for (layer, sizes) in layers.iter().zip(&heights) {
        let stacked = pack(&vec![0.0; layer.len()], sizes, config.node_gap);
        for (&v, y) in layer.iter().zip(stacked) {
            ys[v] = y;
        }
    }

    for _ in 0..ALIGN_ROUNDS {
        for l in 1..layers.len() {
            align(&layers[l], &heights[l], &graph.pred, &mut ys, config.node_gap);
        }
        for l in (0..layers.len().saturating_sub(1)).rev() {
            align(&layers[l], &heights[l], &graph.succ, &mut ys, config.node_gap);
        }
    }

    let top = (0..n)
        .map(|v| ys[v] - graph.vertices[v].height / 2.0)
        .fold(f32::INFINITY, f32::min);
    let bottom = (0..n)
        .map(|v| ys[v] + graph.vertices[v].height / 2.0)
        .fold(f32::NEG_INFINITY, f32::max);
    let (shift, height) = if n == 0 {
        (0.0, 2.0 * config.margin)
    } else {
        (config.margin - top, bottom - top + 2.0 * config.margin)
    };

    let centers = xs
        .into_iter()
        .zip(ys)
        .map(|(x, y)| Point { x, y: y + shift })
        .collect();
    Placement {
        centers,
        width,
        height,
    }
}

fn align(layer: &[usize], sizes: &[f32], neighbours: &[Vec<usize>], ys: &mut [f32], gap: f32) {
    let desired: Vec<f32> = layer
        .iter()
        .map(|&v| median(neighbours[v].iter().map(|&n| ys[n]).collect()).unwrap_or(ys[v]))
        .collect();
    for (&v, y) in layer.iter().zip(pack(&desired, sizes, gap)) {
        ys[v] = y;
    }
}

fn median(mut values: Vec<f32>) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f32::total_cmp);
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    })
}

/// Closest positions (least squares) to `desired` that keep the given order
/// with at least `gap` between consecutive footprints of height `sizes`.
///
/// Subtracting each slot's minimum offset from the first turns this into an
/// isotonic regression, solved with pool-adjacent-violators.
pub(crate) fn pack(desired: &[f32], sizes: &[f32], gap: f32) -> Vec<f32> {
    let n = desired.len();
    let mut offsets = vec![0.0f32; n];
    for i in 1..n {
        offsets[i] = offsets[i - 1] + (sizes[i - 1] + sizes[i]) / 2.0 + gap;
    }

    // (start, len, sum of targets)
    let mut blocks: Vec<(usize, usize, f32)> = Vec::with_capacity(n);
    for i in 0..n {
        blocks.push((i, 1, desired[i] - offsets[i]));
        while blocks.len() >= 2 {
            let (_, len2, sum2) = blocks[blocks.len() - 1];
            let (start1, len1, sum1) = blocks[blocks.len() - 2];
            if sum1 / len1 as f32 <= sum2 / len2 as f32 {
                break;
            }
            blocks.truncate(blocks.len() - 2);
            blocks.push((start1, len1 + len2, sum1 + sum2));
        }
    }

    let mut out = vec![0.0f32; n];
    for (start, len, sum) in blocks {
        let z = sum / len as f32;
        for i in start..start + len {
            out[i] = z + offsets[i];
        }
    }
    out
}
