use std::cmp::Ordering;
use std::collections::HashMap;

/// A sweep result row that can be ranked: a grouping symbol plus the
/// performance figure the backend ordered the list by.
pub trait Rankable {
    fn symbol(&self) -> &str;
    fn ranking_figure(&self) -> Option<f64>;
}

/// First N rows of the backend-ordered list. The backend sends results
/// pre-sorted by the ranking figure, so this is a plain slice.
pub fn top_overall<T: Clone>(results: &[T], n: usize) -> Vec<T> {
    results.iter().take(n).cloned().collect()
}

/// Top N rows per distinct symbol, re-merged and re-sorted descending by the
/// ranking figure so the cross-group list reads globally.
///
/// Within each group the backend ordering is trusted (first N are taken, no
/// re-sort). Ties in the final ordering break by symbol ascending, then by
/// original index, so output is deterministic.
pub fn top_per_symbol<T: Rankable + Clone>(results: &[T], n: usize) -> Vec<T> {
    let mut taken_per_group: HashMap<&str, usize> = HashMap::new();
    let mut kept: Vec<(usize, &T)> = Vec::new();

    for (index, entry) in results.iter().enumerate() {
        let taken = taken_per_group.entry(entry.symbol()).or_insert(0);
        if *taken < n {
            *taken += 1;
            kept.push((index, entry));
        }
    }

    rank_descending(&mut kept);
    kept.into_iter().map(|(_, entry)| entry.clone()).collect()
}

/// Descending by ranking figure (absent figures rank as 0), then symbol
/// ascending, then original index.
fn rank_descending<T: Rankable>(entries: &mut [(usize, &T)]) {
    entries.sort_by(|(left_index, left), (right_index, right)| {
        let left_figure = left.ranking_figure().unwrap_or(0.0);
        let right_figure = right.ranking_figure().unwrap_or(0.0);
        right_figure
            .partial_cmp(&left_figure)
            .unwrap_or(Ordering::Equal)
            .then_with(|| left.symbol().cmp(right.symbol()))
            .then_with(|| left_index.cmp(right_index))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        symbol: String,
        total_return: Option<f64>,
    }

    impl Row {
        fn new(symbol: &str, total_return: f64) -> Self {
            Self {
                symbol: symbol.to_string(),
                total_return: Some(total_return),
            }
        }
    }

    impl Rankable for Row {
        fn symbol(&self) -> &str {
            &self.symbol
        }

        fn ranking_figure(&self) -> Option<f64> {
            self.total_return
        }
    }

    #[test]
    fn top_one_per_symbol_re_sorts_descending() {
        // Backend order: per-symbol descending, AAPL rows first.
        let results = vec![
            Row::new("AAPL", 10.0),
            Row::new("AAPL", 8.0),
            Row::new("AAPL", 5.0),
            Row::new("MSFT", 20.0),
            Row::new("MSFT", 3.0),
        ];

        let top = top_per_symbol(&results, 1);
        assert_eq!(top, vec![Row::new("MSFT", 20.0), Row::new("AAPL", 10.0)]);
    }

    #[test]
    fn per_group_slice_trusts_backend_order() {
        let results = vec![
            Row::new("AAPL", 10.0),
            Row::new("AAPL", 8.0),
            Row::new("MSFT", 9.0),
            Row::new("AAPL", 5.0),
        ];

        let top = top_per_symbol(&results, 2);
        assert_eq!(
            top,
            vec![
                Row::new("AAPL", 10.0),
                Row::new("MSFT", 9.0),
                Row::new("AAPL", 8.0),
            ]
        );
    }

    #[test]
    fn ties_break_by_symbol_then_original_index() {
        let results = vec![
            Row::new("MSFT", 7.0),
            Row::new("AAPL", 7.0),
            Row::new("AAPL", 7.0),
        ];

        let top = top_per_symbol(&results, 2);
        assert_eq!(top[0].symbol, "AAPL");
        assert_eq!(top[1].symbol, "AAPL");
        assert_eq!(top[2].symbol, "MSFT");
    }

    #[test]
    fn absent_figure_ranks_as_zero() {
        let results = vec![
            Row {
                symbol: "AAPL".to_string(),
                total_return: None,
            },
            Row::new("MSFT", -5.0),
            Row::new("NVDA", 2.0),
        ];

        let top = top_per_symbol(&results, 1);
        assert_eq!(top[0].symbol, "NVDA");
        assert_eq!(top[1].symbol, "AAPL");
        assert_eq!(top[2].symbol, "MSFT");
    }

    #[test]
    fn top_overall_slices_the_head() {
        let results = vec![
            Row::new("AAPL", 10.0),
            Row::new("MSFT", 9.0),
            Row::new("NVDA", 8.0),
        ];

        let top = top_overall(&results, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].symbol, "AAPL");
    }
}
