//! Weighted networks and node-level metrics
//!
//! Path-based metrics (closeness, betweenness) treat `1/weight` as the
//! length of an edge, so that strong ties are short.

use crate::common::*;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;

const EIGEN_MAX_ITER: usize = 1000;
const EIGEN_TOL: f64 = 1e-10;

/// A weighted network built from a dyadic rate matrix. Undirected
/// networks store each tie in both directions.
#[derive(Debug, Clone)]
pub struct WeightedGraph {
    directed: bool,
    adjacency: Mat,
    graph: DiGraph<(), f64>,
}

impl WeightedGraph {
    /// Build from an `n x n` matrix. Positive off-diagonal entries
    /// become ties; the upper triangle is used if undirected.
    pub fn from_matrix(weights: &Mat, directed: bool) -> Result<Self> {
        let nn = check_square("weights", weights)?;

        let mut adjacency = Mat::zeros(nn, nn);
        let mut graph = DiGraph::<(), f64>::with_capacity(nn, nn * (nn - 1));
        let nodes: Vec<NodeIndex> = (0..nn).map(|_| graph.add_node(())).collect();

        for j in 0..nn {
            for i in 0..nn {
                if i == j || (!directed && i > j) {
                    continue;
                }
                let w = weights[(i, j)];
                if !(w.is_finite() && w > 0.0) {
                    continue;
                }
                adjacency[(i, j)] = w;
                graph.add_edge(nodes[i], nodes[j], w);
                if !directed {
                    adjacency[(j, i)] = w;
                    graph.add_edge(nodes[j], nodes[i], w);
                }
            }
        }

        Ok(Self {
            directed,
            adjacency,
            graph,
        })
    }

    pub fn num_nodes(&self) -> usize {
        self.adjacency.nrows()
    }

    pub fn adjacency(&self) -> &Mat {
        &self.adjacency
    }

    /// Sum of incident tie weights (in + out if directed)
    pub fn strength(&self) -> DVec {
        let nn = self.num_nodes();
        if self.directed {
            DVec::from_fn(nn, |i, _| {
                self.adjacency.row(i).sum() + self.adjacency.column(i).sum()
            })
        } else {
            DVec::from_fn(nn, |i, _| self.adjacency.row(i).sum())
        }
    }

    /// Leading eigenvector of the weighted adjacency by power
    /// iteration, scaled to a maximum of 1. Directed ties count
    /// towards their target.
    pub fn eigenvector_centrality(&self) -> DVec {
        let nn = self.num_nodes();
        if self.adjacency.iter().all(|&w| w == 0.0) {
            return DVec::zeros(nn);
        }

        // x <- (A' + I) x has the same leading eigenvector as A'
        // but cannot oscillate on bipartite networks
        let mut xx = DVec::from_element(nn, 1.0);
        for _ in 0..EIGEN_MAX_ITER {
            let mut next = self.adjacency.tr_mul(&xx) + &xx;
            let scale = next.max();
            if scale <= 0.0 {
                return DVec::zeros(nn);
            }
            next /= scale;
            let delta = (&next - &xx).amax();
            xx = next;
            if delta < EIGEN_TOL {
                break;
            }
        }

        // remove the identity shift on isolated nodes
        let mut ret = self.adjacency.tr_mul(&xx);
        let scale = ret.max();
        if scale > 0.0 {
            ret /= scale;
        }
        ret
    }

    /// Shortest-path lengths from `source` to every reachable node
    fn distances_from(&self, source: usize) -> Vec<Option<f64>> {
        let dist = petgraph::algo::dijkstra(&self.graph, NodeIndex::new(source), None, |e| {
            1.0 / *e.weight()
        });
        let mut ret = vec![None; self.num_nodes()];
        for (node, d) in dist {
            ret[node.index()] = Some(d);
        }
        ret
    }

    /// Inverse of the summed distance to all reachable nodes; 0 for
    /// nodes that reach nobody
    pub fn closeness(&self) -> DVec {
        let nn = self.num_nodes();
        DVec::from_iterator(
            nn,
            (0..nn).map(|i| {
                let total: f64 = self
                    .distances_from(i)
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .filter_map(|(_, d)| *d)
                    .sum();
                if total > 0.0 {
                    1.0 / total
                } else {
                    0.0
                }
            }),
        )
    }

    /// Brandes' betweenness with weighted shortest paths. Each
    /// unordered pair is counted once in undirected networks.
    pub fn betweenness(&self) -> DVec {
        let nn = self.num_nodes();
        let mut ret = DVec::zeros(nn);

        for s in 0..nn {
            let mut dist = vec![f64::INFINITY; nn];
            let mut sigma = vec![0.0_f64; nn];
            let mut preds: Vec<Vec<usize>> = vec![vec![]; nn];
            let mut order: Vec<usize> = Vec::with_capacity(nn);
            let mut done = vec![false; nn];
            let mut heap = BinaryHeap::new();

            dist[s] = 0.0;
            sigma[s] = 1.0;
            heap.push(Frontier(0.0, s));

            while let Some(Frontier(d, v)) = heap.pop() {
                if done[v] || d > dist[v] {
                    continue;
                }
                done[v] = true;
                order.push(v);

                for edge in self.graph.edges(NodeIndex::new(v)) {
                    let w = edge.target().index();
                    if done[w] {
                        continue;
                    }
                    let alt = d + 1.0 / *edge.weight();
                    if same_length(alt, dist[w]) {
                        sigma[w] += sigma[v];
                        preds[w].push(v);
                    } else if alt < dist[w] {
                        dist[w] = alt;
                        sigma[w] = sigma[v];
                        preds[w].clear();
                        preds[w].push(v);
                        heap.push(Frontier(alt, w));
                    }
                }
            }

            let mut delta = vec![0.0_f64; nn];
            for &w in order.iter().rev() {
                for &v in preds[w].iter() {
                    delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
                }
                if w != s {
                    ret[w] += delta[w];
                }
            }
        }

        if !self.directed {
            ret /= 2.0;
        }
        ret
    }
}

fn same_length(a: f64, b: f64) -> bool {
    b.is_finite() && (a - b).abs() <= 1e-10 * a.abs().max(b.abs()).max(1.0)
}

/// Min-heap entry of Dijkstra's search
struct Frontier(f64, usize);

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .0
            .total_cmp(&self.0)
            .then_with(|| other.1.cmp(&self.1))
    }
}

/// A caller-supplied node metric
pub type MetricFn = dyn Fn(&WeightedGraph) -> DVec + Send + Sync;

/// Node-level network metric used as the regression predictor
#[derive(Clone)]
pub enum NodeMetric {
    Strength,
    Eigenvector,
    Closeness,
    Betweenness,
    Custom(Arc<MetricFn>),
}

impl NodeMetric {
    /// Wrap a closure as a custom metric
    pub fn custom<F>(func: F) -> Self
    where
        F: Fn(&WeightedGraph) -> DVec + Send + Sync + 'static,
    {
        NodeMetric::Custom(Arc::new(func))
    }

    /// Evaluate the metric on every node of `graph`
    pub fn compute(&self, graph: &WeightedGraph) -> Result<DVec> {
        let ret = match self {
            NodeMetric::Strength => graph.strength(),
            NodeMetric::Eigenvector => graph.eigenvector_centrality(),
            NodeMetric::Closeness => graph.closeness(),
            NodeMetric::Betweenness => graph.betweenness(),
            NodeMetric::Custom(func) => func(graph),
        };
        if ret.len() != graph.num_nodes() {
            return Err(MungError::invalid(
                "metric",
                format!(
                    "returned {} values for {} nodes",
                    ret.len(),
                    graph.num_nodes()
                ),
            ));
        }
        Ok(ret)
    }
}

impl std::fmt::Debug for NodeMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeMetric::Strength => write!(f, "Strength"),
            NodeMetric::Eigenvector => write!(f, "Eigenvector"),
            NodeMetric::Closeness => write!(f, "Closeness"),
            NodeMetric::Betweenness => write!(f, "Betweenness"),
            NodeMetric::Custom(_) => write!(f, "Custom"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// path 0 - 1 - 2 with unit weights and an isolated node 3
    fn path_graph() -> WeightedGraph {
        let mut ww = Mat::zeros(4, 4);
        ww[(0, 1)] = 1.0;
        ww[(1, 2)] = 1.0;
        WeightedGraph::from_matrix(&ww, false).unwrap()
    }

    #[test]
    fn strength_of_path() {
        let ss = path_graph().strength();
        assert_eq!(ss.as_slice(), &[1.0, 2.0, 1.0, 0.0]);
    }

    #[test]
    fn betweenness_of_path() {
        let bb = path_graph().betweenness();
        assert_abs_diff_eq!(bb[0], 0.0);
        assert_abs_diff_eq!(bb[1], 1.0);
        assert_abs_diff_eq!(bb[2], 0.0);
        assert_abs_diff_eq!(bb[3], 0.0);
    }

    #[test]
    fn closeness_of_path() {
        let cc = path_graph().closeness();
        assert_abs_diff_eq!(cc[0], 1.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(cc[1], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(cc[3], 0.0);
    }

    #[test]
    fn eigenvector_of_star() {
        let mut ww = Mat::zeros(4, 4);
        for j in 1..4 {
            ww[(0, j)] = 2.0;
        }
        let ee = WeightedGraph::from_matrix(&ww, false)
            .unwrap()
            .eigenvector_centrality();
        assert_abs_diff_eq!(ee[0], 1.0, epsilon = 1e-8);
        for j in 1..4 {
            assert_abs_diff_eq!(ee[j], 1.0 / 3f64.sqrt(), epsilon = 1e-6);
        }
    }

    #[test]
    fn directed_strength_counts_in_and_out() {
        let mut ww = Mat::zeros(3, 3);
        ww[(0, 1)] = 2.0;
        ww[(1, 0)] = 0.5;
        ww[(2, 1)] = 1.0;
        let gg = WeightedGraph::from_matrix(&ww, true).unwrap();
        assert_eq!(gg.strength().as_slice(), &[2.5, 3.5, 1.0]);
    }

    #[test]
    fn empty_graph_is_all_zero() {
        let gg = WeightedGraph::from_matrix(&Mat::zeros(3, 3), false).unwrap();
        for metric in [
            NodeMetric::Strength,
            NodeMetric::Eigenvector,
            NodeMetric::Closeness,
            NodeMetric::Betweenness,
        ] {
            let vv = metric.compute(&gg).unwrap();
            assert!(vv.iter().all(|&x| x == 0.0), "{:?}", metric);
        }
    }

    #[test]
    fn custom_metric_must_match_node_count() {
        let gg = path_graph();
        let bad = NodeMetric::custom(|_| DVec::zeros(2));
        assert!(bad.compute(&gg).is_err());
        let degree = NodeMetric::custom(|g| {
            DVec::from_fn(g.num_nodes(), |i, _| {
                g.adjacency().row(i).iter().filter(|&&w| w > 0.0).count() as f64
            })
        });
        assert_eq!(degree.compute(&gg).unwrap().as_slice(), &[1.0, 2.0, 1.0, 0.0]);
    }
}
