use crate::algo::similarity::SimilarityMatrix;

/// Single-linkage agglomerative clustering cut at `threshold`.
///
/// Starts from one singleton per item and sweeps all pairs of live clusters
/// in ascending index order, merging cluster `j` into cluster `i` whenever the
/// most similar cross pair reaches `threshold`. Sweeps repeat until one
/// completes without a merge.
///
/// Returns the surviving clusters ordered by their smallest member, each
/// sorted ascending. Every index `0..n` appears in exactly one cluster.
pub fn single_linkage(similarities: &SimilarityMatrix, threshold: f64) -> Vec<Vec<usize>> {
    let n = similarities.len();
    let mut clusters: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();

    let mut passes = 0;
    let mut merged = true;
    while merged {
        merged = false;
        passes += 1;
        for i in 0..n {
            if clusters[i].is_empty() {
                continue;
            }
            for j in (i + 1)..n {
                if clusters[j].is_empty() {
                    continue;
                }
                let link = max_link(similarities, &clusters[i], &clusters[j]);
                if link >= threshold {
                    tracing::trace!(into = i, from = j, link, "merge");
                    let moved = std::mem::take(&mut clusters[j]);
                    clusters[i].extend(moved);
                    merged = true;
                }
            }
        }
    }

    let result: Vec<Vec<usize>> = clusters
        .into_iter()
        .filter(|c| !c.is_empty())
        .map(|mut c| {
            c.sort_unstable();
            c
        })
        .collect();

    tracing::debug!(items = n, clusters = result.len(), passes, "single-linkage clustering");
    result
}

/// Highest similarity between any member of `a` and any member of `b`.
fn max_link(similarities: &SimilarityMatrix, a: &[usize], b: &[usize]) -> f64 {
    a.iter()
        .flat_map(|&x| b.iter().map(move |&y| similarities.get(x, y)))
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: Vec<Vec<f64>>) -> SimilarityMatrix {
        SimilarityMatrix::from_rows(rows).unwrap()
    }

    /// 5 items: a chain 0–1–2 linked at 0.6/0.5, a pair 3–4 at 0.3.
    fn chain() -> SimilarityMatrix {
        matrix(vec![
            vec![1.0, 0.6, 0.1, 0.0, 0.0],
            vec![0.6, 1.0, 0.5, 0.0, 0.0],
            vec![0.1, 0.5, 1.0, 0.0, 0.05],
            vec![0.0, 0.0, 0.0, 1.0, 0.3],
            vec![0.0, 0.0, 0.05, 0.3, 1.0],
        ])
    }

    fn clustered_items(clusters: &[Vec<usize>]) -> usize {
        clusters.iter().filter(|c| c.len() > 1).map(Vec::len).sum()
    }

    #[test]
    fn chains_through_closest_members() {
        // 0 and 2 are only 0.1 apart but join through 1.
        let clusters = single_linkage(&chain(), 0.25);
        assert_eq!(clusters, vec![vec![0, 1, 2], vec![3, 4]]);
    }

    #[test]
    fn threshold_is_inclusive() {
        let clusters = single_linkage(&chain(), 0.3);
        assert_eq!(clusters, vec![vec![0, 1, 2], vec![3, 4]]);
        let clusters = single_linkage(&chain(), 0.31);
        assert_eq!(clusters, vec![vec![0, 1, 2], vec![3], vec![4]]);
    }

    #[test]
    fn high_threshold_keeps_singletons() {
        let clusters = single_linkage(&chain(), 0.9);
        assert_eq!(clusters, vec![vec![0], vec![1], vec![2], vec![3], vec![4]]);
    }

    #[test]
    fn low_threshold_merges_connected_components() {
        let clusters = single_linkage(&chain(), 0.05);
        assert_eq!(clusters, vec![vec![0, 1, 2, 3, 4]]);
    }

    #[test]
    fn later_link_requires_another_pass() {
        // 0–2 only connect through 3, which is visited after 2 in the first sweep.
        let m = matrix(vec![
            vec![1.0, 0.0, 0.0, 0.9],
            vec![0.0, 1.0, 0.0, 0.0],
            vec![0.0, 0.0, 1.0, 0.9],
            vec![0.9, 0.0, 0.9, 1.0],
        ]);
        assert_eq!(single_linkage(&m, 0.5), vec![vec![0, 2, 3], vec![1]]);
    }

    #[test]
    fn partition_of_all_indices() {
        let clusters = single_linkage(&chain(), 0.25);
        let mut all: Vec<usize> = clusters.concat();
        all.sort_unstable();
        assert_eq!(all, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn raising_threshold_never_clusters_more() {
        let m = chain();
        let mut previous = usize::MAX;
        for step in 1..=20 {
            let threshold = step as f64 * 0.05;
            let count = clustered_items(&single_linkage(&m, threshold));
            assert!(count <= previous, "threshold {threshold}: {count} > {previous}");
            previous = count;
        }
    }

    #[test]
    fn empty_and_single() {
        assert!(single_linkage(&matrix(vec![]), 0.2).is_empty());
        assert_eq!(single_linkage(&matrix(vec![vec![1.0]]), 0.2), vec![vec![0]]);
    }
}
