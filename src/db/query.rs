//! Table-generic read/delete helpers and the dynamic WHERE builder.
//!
//! Table and column names passed here are crate constants; only values are bound.

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use super::page::{Page, PageRequest};
use super::patch::DbPatchable;
use crate::error::EmporiumError;

/// A value bound into a filter clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Bind {
    Int(i64),
    Real(f64),
    Text(String),
    Bool(bool),
}

impl From<i64> for Bind {
    fn from(v: i64) -> Self {
        Bind::Int(v)
    }
}

impl From<f64> for Bind {
    fn from(v: f64) -> Self {
        Bind::Real(v)
    }
}

impl From<String> for Bind {
    fn from(v: String) -> Self {
        Bind::Text(v)
    }
}

impl From<&str> for Bind {
    fn from(v: &str) -> Self {
        Bind::Text(v.to_string())
    }
}

impl From<bool> for Bind {
    fn from(v: bool) -> Self {
        Bind::Bool(v)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Cond {
    Cmp {
        column: &'static str,
        op: &'static str,
        value: Bind,
    },
    Contains {
        column: &'static str,
        needle: String,
    },
}

/// Conjunction of conditions; empty means "all rows".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conds: Vec<Cond>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(self, column: &'static str, value: impl Into<Bind>) -> Self {
        self.cmp(column, "=", value)
    }

    pub fn cmp(mut self, column: &'static str, op: &'static str, value: impl Into<Bind>) -> Self {
        self.conds.push(Cond::Cmp {
            column,
            op,
            value: value.into(),
        });
        self
    }

    /// `eq` when `value` is present.
    pub fn eq_opt<V: Into<Bind>>(self, column: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.eq(column, v),
            None => self,
        }
    }

    pub fn cmp_opt<V: Into<Bind>>(
        self,
        column: &'static str,
        op: &'static str,
        value: Option<V>,
    ) -> Self {
        match value {
            Some(v) => self.cmp(column, op, v),
            None => self,
        }
    }

    /// Substring match against a column holding `fold_case` text.
    ///
    /// The needle is folded in Rust, since SQLite's `LOWER` only folds ASCII.
    /// `%` and `_` are literal.
    pub fn contains_folded(mut self, column: &'static str, needle: &str) -> Self {
        self.conds.push(Cond::Contains {
            column,
            needle: escape_like(&fold_case(needle)),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conds.is_empty()
    }

    pub(crate) fn push_to<'q>(&self, qb: &mut QueryBuilder<'q, Sqlite>) {
        for (i, cond) in self.conds.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            match cond {
                Cond::Cmp { column, op, value } => {
                    qb.push(format!("{column} {op} "));
                    push_bind(qb, value.clone());
                }
                Cond::Contains { column, needle } => {
                    qb.push(format!("{column} LIKE '%' || "));
                    qb.push_bind(needle.clone());
                    qb.push(" || '%' ESCAPE '\\'");
                }
            }
        }
    }
}

fn push_bind<'q>(qb: &mut QueryBuilder<'q, Sqlite>, value: Bind) {
    match value {
        Bind::Int(v) => qb.push_bind(v),
        Bind::Real(v) => qb.push_bind(v),
        Bind::Text(v) => qb.push_bind(v),
        Bind::Bool(v) => qb.push_bind(v),
    };
}

/// Unicode lowercase used for stored search keys and search needles.
pub fn fold_case(raw: &str) -> String {
    raw.to_lowercase()
}

/// Escapes LIKE wildcards with `\`.
pub fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub(crate) async fn count(
    pool: &SqlitePool,
    table: &'static str,
    filter: &Filter,
) -> Result<i64, EmporiumError> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT COUNT(*) FROM {table}"));
    filter.push_to(&mut qb);
    Ok(qb.build_query_scalar::<i64>().fetch_one(pool).await?)
}

/// Counts matches, checks the page bounds, then fetches the window ordered by id.
pub(crate) async fn fetch_page<T>(
    pool: &SqlitePool,
    table: &'static str,
    filter: &Filter,
    req: PageRequest,
) -> Result<Page<T>, EmporiumError>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    let total_posts = count(pool, table, filter).await?;
    let Some((limit, offset)) = req.window(total_posts)? else {
        return Ok(Page::empty(req.per_page));
    };

    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT * FROM {table}"));
    filter.push_to(&mut qb);
    qb.push(" ORDER BY id LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind(offset);

    let items = qb.build_query_as::<T>().fetch_all(pool).await?;
    Ok(Page {
        items,
        total_pages: req.total_pages(total_posts),
        page: req.page,
        total_posts,
        per_page: req.per_page,
    })
}

pub(crate) async fn fetch_all<T>(
    pool: &SqlitePool,
    table: &'static str,
    filter: &Filter,
) -> Result<Vec<T>, EmporiumError>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT * FROM {table}"));
    filter.push_to(&mut qb);
    qb.push(" ORDER BY id");
    Ok(qb.build_query_as::<T>().fetch_all(pool).await?)
}

pub(crate) async fn fetch_by_id<T>(
    pool: &SqlitePool,
    table: &'static str,
    id: i64,
) -> Result<Option<T>, EmporiumError>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    let sql = format!("SELECT * FROM {table} WHERE id = ?");
    Ok(sqlx::query_as::<_, T>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

pub(crate) async fn exists(
    pool: &SqlitePool,
    table: &'static str,
    id: i64,
) -> Result<bool, EmporiumError> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?)");
    Ok(sqlx::query_scalar::<_, bool>(&sql)
        .bind(id)
        .fetch_one(pool)
        .await?)
}

pub(crate) async fn delete_by_id(
    pool: &SqlitePool,
    table: &'static str,
    id: i64,
) -> Result<u64, EmporiumError> {
    let sql = format!("DELETE FROM {table} WHERE id = ?");
    Ok(sqlx::query(&sql)
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected())
}

/// Applies `patch` and reads the row back; `None` when the id does not exist.
pub(crate) async fn patch_and_fetch<P, T>(
    pool: &SqlitePool,
    table: &'static str,
    id: i64,
    patch: &P,
) -> Result<Option<T>, EmporiumError>
where
    P: DbPatchable + Sync,
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    if patch.apply_patch(pool, table, id).await? == 0 {
        return Ok(None);
    }
    fetch_by_id(pool, table, id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("shoe"), "shoe");
    }

    #[test]
    fn filter_renders_conjunction_with_placeholders() {
        let filter = Filter::new()
            .eq("category", 3_i64)
            .cmp_opt("newprice", ">=", Some(10.0))
            .cmp_opt::<f64>("newprice", "<=", None);

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM products");
        filter.push_to(&mut qb);
        assert_eq!(
            qb.sql(),
            "SELECT * FROM products WHERE category = ? AND newprice >= ?"
        );
    }

    #[test]
    fn contains_folded_binds_a_folded_needle() {
        let filter = Filter::new().contains_folded("search_text", "ÉCLAIR_50%");
        assert_eq!(
            filter.conds,
            vec![Cond::Contains {
                column: "search_text",
                needle: "éclair\\_50\\%".to_string(),
            }]
        );

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM products");
        filter.push_to(&mut qb);
        assert_eq!(
            qb.sql(),
            "SELECT * FROM products WHERE search_text LIKE '%' || ? || '%' ESCAPE '\\'"
        );
    }

    #[test]
    fn fold_case_handles_non_ascii() {
        assert_eq!(fold_case("ÉCLAIR Straße ΣΟΦΙΑ"), "éclair straße σοφια");
    }
}
