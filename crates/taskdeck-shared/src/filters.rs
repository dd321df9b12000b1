use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Search requests fire only once the query reaches this length.
pub const SEARCH_MIN_LEN: usize = 2;

/// Quiet period before a search keystroke becomes a request.
pub const SEARCH_DEBOUNCE_MS: u32 = 300;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
    Today,
    Overdue,
    Pinned,
    Shared,
}

impl StatusFilter {
    pub fn all() -> [Self; 7] {
        [
            Self::All,
            Self::Active,
            Self::Completed,
            Self::Today,
            Self::Overdue,
            Self::Pinned,
            Self::Shared,
        ]
    }

    pub fn as_key(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Today => "today",
            Self::Overdue => "overdue",
            Self::Pinned => "pinned",
            Self::Shared => "shared",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Active => "Active",
            Self::Completed => "Completed",
            Self::Today => "Today",
            Self::Overdue => "Overdue",
            Self::Pinned => "Pinned",
            Self::Shared => "Shared",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "all" => Some(Self::All),
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            "today" => Some(Self::Today),
            "overdue" => Some(Self::Overdue),
            "pinned" => Some(Self::Pinned),
            "shared" => Some(Self::Shared),
            _ => None,
        }
    }

    /// Query parameter this filter contributes, if any.
    fn query_pair(self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::All => None,
            Self::Active => Some(("completed", "false")),
            Self::Completed => Some(("completed", "true")),
            Self::Today => Some(("due_date", "today")),
            Self::Overdue => Some(("due_date", "overdue")),
            Self::Pinned => Some(("is_pinned", "true")),
            Self::Shared => Some(("is_shared", "true")),
        }
    }
}

/// The combined category/status/search state the list view holds. The
/// backend does the actual filtering; this only builds the parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub category: Option<Uuid>,
    pub status: StatusFilter,
    pub search: Option<String>,
}

impl TaskQuery {
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if let Some(category) = self.category {
            pairs.push(("category", category.to_string()));
        }

        // A live search replaces the status filter but keeps the
        // category filter, matching the list endpoint's contract.
        if let Some(search) = self.search.as_deref() {
            pairs.push(("search", search.to_string()));
            return pairs;
        }

        if let Some((key, value)) = self.status.query_pair() {
            pairs.push((key, value.to_string()));
        }

        pairs
    }
}

/// True when the trimmed query is long enough to hit the backend.
pub fn search_ready(query: &str) -> bool {
    query.trim().len() >= SEARCH_MIN_LEN
}

/// Ticket counter behind the search debounce: every keystroke arms a new
/// ticket, and only the ticket that is still current once the quiet
/// period elapses may fire its request.
#[derive(Debug, Default)]
pub struct DebounceSeq {
    current: u64,
}

impl DebounceSeq {
    pub fn arm(&mut self) -> u64 {
        self.current = self.current.wrapping_add(1);
        self.current
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.current == ticket
    }
}

#[cfg(test)]
mod filter_tests {
    use super::*;

    #[test]
    fn all_filter_adds_no_status_parameter() {
        let query = TaskQuery::default();
        assert!(query.to_query_pairs().is_empty());
    }

    #[test]
    fn every_status_filter_maps_to_its_parameter() {
        let expect = [
            (StatusFilter::Active, Some(("completed", "false"))),
            (StatusFilter::Completed, Some(("completed", "true"))),
            (StatusFilter::Today, Some(("due_date", "today"))),
            (StatusFilter::Overdue, Some(("due_date", "overdue"))),
            (StatusFilter::Pinned, Some(("is_pinned", "true"))),
            (StatusFilter::Shared, Some(("is_shared", "true"))),
            (StatusFilter::All, None),
        ];

        for (status, pair) in expect {
            let query = TaskQuery {
                status,
                ..TaskQuery::default()
            };
            let pairs = query.to_query_pairs();
            match pair {
                Some((key, value)) => {
                    assert_eq!(pairs, vec![(key, value.to_string())], "{status:?}");
                }
                None => assert!(pairs.is_empty(), "{status:?}"),
            }
        }
    }

    #[test]
    fn category_and_status_combine() {
        let id = Uuid::new_v4();
        let query = TaskQuery {
            category: Some(id),
            status: StatusFilter::Overdue,
            search: None,
        };
        assert_eq!(
            query.to_query_pairs(),
            vec![
                ("category", id.to_string()),
                ("due_date", "overdue".to_string()),
            ]
        );
    }

    #[test]
    fn search_keeps_category_but_drops_status() {
        let id = Uuid::new_v4();
        let query = TaskQuery {
            category: Some(id),
            status: StatusFilter::Completed,
            search: Some("milk".to_string()),
        };
        assert_eq!(
            query.to_query_pairs(),
            vec![
                ("category", id.to_string()),
                ("search", "milk".to_string()),
            ]
        );
    }

    #[test]
    fn short_queries_are_not_search_ready() {
        assert!(!search_ready(""));
        assert!(!search_ready("a"));
        assert!(!search_ready(" a "));
        assert!(search_ready("ab"));
        assert!(search_ready("  ab  "));
    }

    #[test]
    fn only_the_last_armed_ticket_fires() {
        let mut seq = DebounceSeq::default();

        // Five keystrokes inside one quiet window arm five tickets.
        let tickets: Vec<u64> = (0..5).map(|_| seq.arm()).collect();

        let fired: Vec<u64> = tickets
            .iter()
            .copied()
            .filter(|ticket| seq.is_current(*ticket))
            .collect();
        assert_eq!(fired, vec![tickets[4]]);
    }

    #[test]
    fn status_filter_keys_round_trip() {
        for status in StatusFilter::all() {
            assert_eq!(StatusFilter::from_key(status.as_key()), Some(status));
        }
        assert_eq!(StatusFilter::from_key("archived"), None);
    }
}
