use std::cmp::Ordering;

/// A row that can appear on an admin list screen: a stable unique key plus
/// the text fields the search box matches against.
pub trait Listable {
    fn key(&self) -> i64;
    fn search_fields(&self) -> Vec<String>;
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn from_request(raw: Option<&str>) -> Self {
        match raw {
            Some("desc") => SortDirection::Descending,
            _ => SortDirection::Ascending,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Keep only rows where the query is a case-insensitive substring of at least
/// one searchable field. An empty or whitespace query keeps everything.
pub fn filter_rows<T: Listable + Clone>(rows: &[T], query: &str) -> Vec<T> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return rows.to_vec();
    }
    rows.iter()
        .filter(|row| {
            row.search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

/// Order rows by the value `sort_key` extracts. Rows comparing equal fall
/// back to the unique key so the result is deterministic regardless of the
/// caller's input order.
pub fn sort_rows<T, K, F>(rows: &mut [T], sort_key: F, direction: SortDirection)
where
    T: Listable,
    K: Ord,
    F: Fn(&T) -> K,
{
    rows.sort_by(|a, b| {
        let ordering = sort_key(a).cmp(&sort_key(b));
        let ordering = match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        };
        if ordering == Ordering::Equal {
            a.key().cmp(&b.key())
        } else {
            ordering
        }
    });
}

/// Filter then sort in one pass, the shape every index screen uses.
pub fn apply<T, K, F>(rows: &[T], query: &str, sort_key: F, direction: SortDirection) -> Vec<T>
where
    T: Listable + Clone,
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut rows = filter_rows(rows, query);
    sort_rows(&mut rows, sort_key, direction);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Row {
        id: i64,
        title: String,
        order: i32,
    }

    impl Listable for Row {
        fn key(&self) -> i64 {
            self.id
        }

        fn search_fields(&self) -> Vec<String> {
            vec![self.title.clone()]
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                id: 1,
                title: "Juara Lomba Debat".into(),
                order: 2,
            },
            Row {
                id: 2,
                title: "Medali Emas Renang".into(),
                order: 1,
            },
            Row {
                id: 3,
                title: "Juara Festival Film".into(),
                order: 2,
            },
        ]
    }

    #[test]
    fn empty_query_keeps_everything() {
        let all = rows();
        assert_eq!(filter_rows(&all, "").len(), 3);
        assert_eq!(filter_rows(&all, "   ").len(), 3);
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let all = rows();
        let hits = filter_rows(&all, "juara");
        assert_eq!(hits.len(), 2);
        let hits = filter_rows(&all, "EMAS");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 2);
        assert!(filter_rows(&all, "tidak ada").is_empty());
    }

    #[test]
    fn sort_ties_break_on_key() {
        let mut all = rows();
        sort_rows(&mut all, |row| row.order, SortDirection::Ascending);
        let ids: Vec<_> = all.iter().map(|row| row.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn descending_reverses_ascending() {
        let ascending = apply(&rows(), "", |row| row.id, SortDirection::Ascending);
        let descending = apply(&rows(), "", |row| row.id, SortDirection::Descending);
        let mut reversed: Vec<_> = ascending.iter().map(|row| row.id).collect();
        reversed.reverse();
        let got: Vec<_> = descending.iter().map(|row| row.id).collect();
        assert_eq!(got, reversed);
    }

    #[test]
    fn direction_parses_from_request() {
        assert_eq!(
            SortDirection::from_request(Some("desc")),
            SortDirection::Descending
        );
        assert_eq!(
            SortDirection::from_request(Some("asc")),
            SortDirection::Ascending
        );
        assert_eq!(SortDirection::from_request(None), SortDirection::Ascending);
    }
}
