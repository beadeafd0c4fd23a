//! Segment feature aggregation and speaker clustering

use ndarray::{s, Array1, Array2, Axis};
use tracing::debug;

use crate::audio::time::TimeIndex;
use crate::config::ClusterConfig;
use crate::error::{ClusterError, Result};
use crate::transcript::Segment;

/// One aggregated feature vector per segment: the column-wise mean of the
/// feature rows whose frames fall inside the segment.
///
/// Segments whose rounded frame range is empty or out of bounds get the
/// zero vector. This never fails, and an empty segment list yields an
/// empty result.
pub fn aggregate_segment_features(
    features: &Array2<f32>,
    segments: &[Segment],
    grid: TimeIndex,
) -> Vec<Array1<f32>> {
    let frame_count = features.nrows();
    let dim = features.ncols();

    segments
        .iter()
        .map(|segment| {
            let start_idx = grid.seconds_to_frame(segment.start);
            let end_idx = grid.seconds_to_frame(segment.end);

            if start_idx < end_idx && end_idx <= frame_count {
                features
                    .slice(s![start_idx..end_idx, ..])
                    .mean_axis(Axis(0))
                    .unwrap_or_else(|| Array1::zeros(dim))
            } else {
                // Degenerate index range: explicit fallback, not an error
                Array1::zeros(dim)
            }
        })
        .collect()
}

/// Bottom-up hierarchical clustering with average linkage over Euclidean
/// distance.
///
/// Merge order is deterministic: the closest active pair wins, ties
/// broken by lowest index pair. Cluster ids are remapped by order of
/// first appearance, so the first segment always belongs to cluster 0.
pub struct AgglomerativeClusterer {
    num_speakers: usize,
}

impl AgglomerativeClusterer {
    pub fn new(config: &ClusterConfig) -> Self {
        Self {
            num_speakers: config.num_speakers,
        }
    }

    /// Partition `vectors` into `min(num_speakers, len)` clusters and
    /// return a label per vector, each in `[0, k)`.
    pub fn cluster(&self, vectors: &[Array1<f32>]) -> Result<Vec<usize>> {
        let n = vectors.len();
        if n == 0 {
            return Ok(Vec::new());
        }

        if vectors
            .iter()
            .any(|v| v.iter().any(|x| !x.is_finite()))
        {
            return Err(ClusterError::DegenerateFeatures.into());
        }

        let k = self.num_speakers.min(n).max(1);
        debug!("Clustering {} vectors into {} speakers", n, k);

        // Pairwise Euclidean distances; updated in place as clusters merge
        // (Lance-Williams average-linkage update).
        let mut dist = vec![vec![0.0f32; n]; n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = euclidean(&vectors[i], &vectors[j]);
                dist[i][j] = d;
                dist[j][i] = d;
            }
        }

        let mut active = vec![true; n];
        let mut size = vec![1usize; n];
        let mut members: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();
        let mut remaining = n;

        while remaining > k {
            let (a, b) = closest_pair(&dist, &active)
                .ok_or_else(|| ClusterError::Numerical("no active pair to merge".to_string()))?;

            for m in 0..n {
                if m == a || m == b || !active[m] {
                    continue;
                }
                let merged = (size[a] as f32 * dist[a][m] + size[b] as f32 * dist[b][m])
                    / (size[a] + size[b]) as f32;
                dist[a][m] = merged;
                dist[m][a] = merged;
            }

            let moved = std::mem::take(&mut members[b]);
            members[a].extend(moved);
            size[a] += size[b];
            active[b] = false;
            remaining -= 1;
        }

        // Raw cluster ids, then remap by first appearance for stable
        // display order.
        let mut raw = vec![0usize; n];
        for (cid, cluster) in members
            .iter()
            .enumerate()
            .filter(|(i, _)| active[*i])
            .map(|(_, c)| c)
            .enumerate()
        {
            for &m in cluster {
                raw[m] = cid;
            }
        }

        let mut relabel = vec![usize::MAX; k];
        let mut next = 0;
        let labels = raw
            .iter()
            .map(|&r| {
                if relabel[r] == usize::MAX {
                    relabel[r] = next;
                    next += 1;
                }
                relabel[r]
            })
            .collect();

        Ok(labels)
    }
}

/// Attach speaker labels to segments from cluster assignments.
///
/// A segment without a matching label (count mismatch) keeps an unset
/// speaker, which renders as `UNKNOWN SPEAKER`.
pub fn assign_speakers(segments: &mut [Segment], labels: &[usize]) {
    for (i, segment) in segments.iter_mut().enumerate() {
        segment.speaker = labels.get(i).map(|&id| speaker_label(id));
    }
}

/// Display label for a raw cluster id: `SPEAKER {id + 1}`
pub fn speaker_label(id: usize) -> String {
    format!("SPEAKER {}", id + 1)
}

fn euclidean(a: &Array1<f32>, b: &Array1<f32>) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

fn closest_pair(dist: &[Vec<f32>], active: &[bool]) -> Option<(usize, usize)> {
    let n = active.len();
    let mut best: Option<(usize, usize)> = None;
    let mut best_d = f32::INFINITY;

    for i in 0..n {
        if !active[i] {
            continue;
        }
        for j in (i + 1)..n {
            if !active[j] {
                continue;
            }
            if dist[i][j] < best_d {
                best_d = dist[i][j];
                best = Some((i, j));
            }
        }
    }

    best
}
