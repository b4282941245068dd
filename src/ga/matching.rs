//! Minimum-weight full bipartite matching.
//!
//! Shortest-augmenting-path Hungarian algorithm on a sparse rectangular
//! graph. Every row (skill-unit slot) must be matched to a distinct column
//! (resource); columns may stay unmatched. Missing edges are simply absent
//! from the search rather than modelled as large costs, so an unsaturable
//! row is detected exactly.
//!
//! # Complexity
//! O(n² · m) for n rows and m columns.
//!
//! # Reference
//! Kuhn (1955), "The Hungarian method for the assignment problem";
//! Jonker & Volgenant (1987), "A shortest augmenting path algorithm for
//! dense and sparse linear assignment problems"

const INF: i64 = i64::MAX;

/// Finds a row-saturating matching of minimum total weight.
///
/// `rows[i]` lists `(column, weight)` edges of row `i`; columns are
/// `0..n_cols`. Returns the matched column of every row, or `None` when no
/// matching covers all rows.
pub fn min_weight_full_matching(rows: &[Vec<(usize, i64)>], n_cols: usize) -> Option<Vec<usize>> {
    let n = rows.len();
    if n == 0 {
        return Some(Vec::new());
    }
    if n > n_cols {
        return None;
    }

    // 1-indexed potentials; column 0 is the virtual source.
    let mut u = vec![0i64; n + 1];
    let mut v = vec![0i64; n_cols + 1];
    // row_of[j] = row matched to column j (0 = free)
    let mut row_of = vec![0usize; n_cols + 1];
    let mut way = vec![0usize; n_cols + 1];

    for i in 1..=n {
        row_of[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![INF; n_cols + 1];
        let mut used = vec![false; n_cols + 1];

        loop {
            used[j0] = true;
            let i0 = row_of[j0];
            for &(col, w) in &rows[i0 - 1] {
                let j = col + 1;
                if used[j] {
                    continue;
                }
                let reduced = w - u[i0] - v[j];
                if reduced < minv[j] {
                    minv[j] = reduced;
                    way[j] = j0;
                }
            }

            let mut delta = INF;
            let mut j1 = 0usize;
            for j in 1..=n_cols {
                if !used[j] && minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }
            if delta == INF {
                return None;
            }

            for j in 0..=n_cols {
                if used[j] {
                    u[row_of[j]] += delta;
                    v[j] -= delta;
                } else if minv[j] != INF {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if row_of[j0] == 0 {
                break;
            }
        }

        // Flip the augmenting path.
        loop {
            let j1 = way[j0];
            row_of[j0] = row_of[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0usize; n];
    for j in 1..=n_cols {
        if row_of[j] != 0 {
            assignment[row_of[j] - 1] = j - 1;
        }
    }
    Some(assignment)
}
