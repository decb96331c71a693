use std::cmp::Ordering;
use std::fmt::{Debug, Formatter};

use itertools::Itertools;

use crate::common::{get_field, Fields, PATH_SEPARATOR};
use crate::errors::FirehoseResult;
use crate::filter::{total_order, Filter};
use crate::store::{Database, Snapshot};

/// Specifies the direction for ordering query results.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortOrder {
    /// Smallest value first
    Ascending,
    /// Largest value first
    Descending,
}

/// What a query runs over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryTarget {
    /// The direct children of one collection path, e.g. `users/1/posts`.
    Collection(String),
    /// Every collection with this id, at any depth.
    Group(String),
}

impl QueryTarget {
    /// Returns `true` if the document at `doc_path` is in scope.
    pub fn contains(&self, doc_path: &str) -> bool {
        let parent = match doc_path.rsplit_once(PATH_SEPARATOR) {
            Some((parent, _)) => parent,
            None => return false,
        };
        match self {
            QueryTarget::Collection(path) => parent == path,
            QueryTarget::Group(collection_id) => {
                let id = parent.rsplit(PATH_SEPARATOR).next().unwrap_or(parent);
                id == collection_id
            }
        }
    }
}

/// A predicate query over a collection or a collection group.
///
/// Queries are values: each builder call returns a new query. All filters
/// must match (they are combined with AND).
///
/// ```rust,ignore
/// let recent = posts
///     .query()
///     .filter(field("published").eq(true))
///     .order_by("created_at", SortOrder::Descending)
///     .limit(20)
///     .get()
///     .await?;
/// ```
#[derive(Clone)]
pub struct Query {
    db: Database,
    target: QueryTarget,
    filters: Vec<Filter>,
    order_by: Vec<(String, SortOrder)>,
    limit: Option<usize>,
}

impl Query {
    pub(crate) fn new(db: Database, target: QueryTarget) -> Self {
        Query {
            db,
            target,
            filters: Vec::new(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Orders results by `field_path`. Documents without the field are left
    /// out of an ordered query.
    pub fn order_by(mut self, field_path: &str, order: SortOrder) -> Self {
        self.order_by.push((field_path.to_string(), order));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn target(&self) -> &QueryTarget {
        &self.target
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn ordering(&self) -> &[(String, SortOrder)] {
        &self.order_by
    }

    pub fn max_results(&self) -> Option<usize> {
        self.limit
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Evaluates the filters and ordering fields against stored `data`.
    pub fn matches(&self, data: &Fields) -> FirehoseResult<bool> {
        for filter in &self.filters {
            if !filter.apply(data)? {
                return Ok(false);
            }
        }
        Ok(self
            .order_by
            .iter()
            .all(|(field, _)| get_field(data, field).is_some()))
    }

    /// Narrows `candidates` to the result of this query.
    ///
    /// Candidates are expected in the store's natural order. They are checked
    /// against the target, filtered, ordered and truncated to the limit.
    pub fn evaluate<I>(&self, candidates: I) -> FirehoseResult<Vec<Snapshot>>
    where
        I: IntoIterator<Item = Snapshot>,
    {
        let mut results = Vec::new();
        for snapshot in candidates {
            if !self.target.contains(snapshot.locator().path()) {
                continue;
            }
            let matched = match snapshot.data() {
                Some(data) => self.matches(data)?,
                None => false,
            };
            if matched {
                results.push(snapshot);
            }
        }

        if !self.order_by.is_empty() {
            // stable, so ties keep natural order
            results.sort_by(|a, b| self.compare(a, b));
        }
        if let Some(limit) = self.limit {
            results.truncate(limit);
        }
        Ok(results)
    }

    /// Runs the query against the database's store.
    pub async fn get(&self) -> FirehoseResult<Vec<Snapshot>> {
        log::debug!("Running query {:?}", self);
        self.db.store().query(self).await
    }

    fn compare(&self, a: &Snapshot, b: &Snapshot) -> Ordering {
        for (field, order) in &self.order_by {
            let ordering = match (a.get(field), b.get(field)) {
                (Some(x), Some(y)) => total_order(x, y),
                _ => Ordering::Equal,
            };
            let ordering = match order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

impl Debug for Query {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Query({:?}", self.target)?;
        if !self.filters.is_empty() {
            write!(f, " where {}", self.filters.iter().join(" && "))?;
        }
        if !self.order_by.is_empty() {
            let ordering = self
                .order_by
                .iter()
                .map(|(field, order)| format!("{} {:?}", field, order))
                .join(", ");
            write!(f, " order by {}", ordering)?;
        }
        if let Some(limit) = self.limit {
            write!(f, " limit {}", limit)?;
        }
        write!(f, ")")
    }
}
