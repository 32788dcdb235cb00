//! Joined select queries over member -> team.
//!
//! # Responsibility
//! - Render the member/team join, the `MemberTeamView` projection, ordering
//!   and offset/limit into parameterized SQL.
//! - Run content, count and combined content+count statements.
//!
//! # Invariants
//! - Count statements never carry `ORDER BY`, `LIMIT` or `OFFSET`.
//! - Every rendered sort term names `NULLS FIRST` or `NULLS LAST`.
//! - Bind order is: predicate values, then limit, then offset.

use crate::model::sort::{Direction, NullPlacement, OrderField, OrderSpec, Sort};
use crate::model::view::{MemberTeamView, TeamAgeStats};
use crate::query::predicate::Predicate;
use crate::repo::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};

/// Column list of the `MemberTeamView` projection.
const MEMBER_TEAM_PROJECTION: &str = "m.id AS member_id,
    m.username AS username,
    m.age AS age,
    t.id AS team_id,
    t.name AS team_name";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// Keeps members without a team; team columns are `NULL`.
    Left,
    /// Drops members without a team.
    Inner,
}

/// `member m` joined to `team t` on the owning foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinedSource {
    kind: JoinKind,
}

impl JoinedSource {
    pub fn left() -> Self {
        Self {
            kind: JoinKind::Left,
        }
    }

    pub fn inner() -> Self {
        Self {
            kind: JoinKind::Inner,
        }
    }

    pub fn kind(&self) -> JoinKind {
        self.kind
    }

    fn from_sql(&self) -> &'static str {
        match self.kind {
            JoinKind::Left => "member m LEFT JOIN team t ON t.id = m.team_id",
            JoinKind::Inner => "member m INNER JOIN team t ON t.id = m.team_id",
        }
    }

    /// Source used for counting under `predicate`.
    ///
    /// A left join along a many-to-one key cannot change the member row
    /// count, so it is dropped when no condition reads team columns.
    fn count_from_sql(&self, predicate: &Predicate) -> &'static str {
        match self.kind {
            JoinKind::Left if !predicate.references_team() => "member m",
            _ => self.from_sql(),
        }
    }
}

/// Builder for one projection query against a borrowed connection.
#[derive(Debug, Clone)]
pub struct SelectQuery<'conn> {
    conn: &'conn Connection,
    source: JoinedSource,
    predicate: Predicate,
    sort: Sort,
    offset: u64,
    limit: Option<u64>,
}

impl<'conn> SelectQuery<'conn> {
    pub fn new(conn: &'conn Connection, source: JoinedSource, predicate: Predicate) -> Self {
        Self {
            conn,
            source,
            predicate,
            sort: Sort::unsorted(),
            offset: 0,
            limit: None,
        }
    }

    pub fn order_by(self, sort: Sort) -> Self {
        Self { sort, ..self }
    }

    pub fn offset(self, offset: u64) -> Self {
        Self { offset, ..self }
    }

    pub fn limit(self, limit: u64) -> Self {
        Self {
            limit: Some(limit),
            ..self
        }
    }

    /// Ordered, offset/limited content statement.
    pub fn content_sql(&self) -> String {
        format!(
            "SELECT {MEMBER_TEAM_PROJECTION} FROM {} WHERE {}{}{}",
            self.source.from_sql(),
            self.predicate.where_sql(),
            order_by_sql(&self.sort),
            self.window_sql(),
        )
    }

    /// Unordered count statement under the same predicate.
    pub fn count_sql(&self) -> String {
        format!(
            "SELECT COUNT(*) FROM {} WHERE {}",
            self.source.count_from_sql(&self.predicate),
            self.predicate.where_sql(),
        )
    }

    /// Single statement returning the page rows plus the total.
    ///
    /// The total comes from an unordered aggregate over the filtered set; the
    /// outer left join keeps one row even when the page itself is empty.
    pub fn content_with_total_sql(&self) -> String {
        let order = order_by_sql(&self.sort);
        format!(
            "WITH filtered AS (
                SELECT {MEMBER_TEAM_PROJECTION} FROM {} WHERE {}
            )
            SELECT
                counted.total_count AS total_count,
                page.member_id AS member_id,
                page.username AS username,
                page.age AS age,
                page.team_id AS team_id,
                page.team_name AS team_name
            FROM (SELECT COUNT(*) AS total_count FROM filtered) AS counted
            LEFT JOIN (SELECT * FROM filtered{order}{}) AS page ON 1 = 1{order}",
            self.source.from_sql(),
            self.predicate.where_sql(),
            self.window_sql(),
        )
    }

    /// Runs the content statement.
    pub fn fetch(&self) -> RepoResult<Vec<MemberTeamView>> {
        let mut binds = self.predicate.bind_values();
        binds.extend(self.window_binds()?);

        let mut stmt = self.conn.prepare(&self.content_sql())?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut views = Vec::new();
        while let Some(row) = rows.next()? {
            views.push(parse_member_team_row(row)?);
        }
        Ok(views)
    }

    /// Runs the count statement; ordering and window are ignored.
    pub fn fetch_count(&self) -> RepoResult<u64> {
        let total: i64 = self.conn.query_row(
            &self.count_sql(),
            params_from_iter(self.predicate.bind_values()),
            |row| row.get(0),
        )?;
        count_from_sql_value(total)
    }

    /// Runs the combined statement and returns `(content, total)`.
    pub fn fetch_with_total(&self) -> RepoResult<(Vec<MemberTeamView>, u64)> {
        let mut binds = self.predicate.bind_values();
        binds.extend(self.window_binds()?);

        let mut stmt = self.conn.prepare(&self.content_with_total_sql())?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut total = 0;
        let mut views = Vec::new();
        while let Some(row) = rows.next()? {
            total = count_from_sql_value(row.get("total_count")?)?;
            if row.get::<_, Option<i64>>("member_id")?.is_some() {
                views.push(parse_member_team_row(row)?);
            }
        }
        Ok((views, total))
    }

    fn window_sql(&self) -> &'static str {
        match (self.limit, self.offset) {
            (Some(_), 0) => " LIMIT ?",
            (Some(_), _) => " LIMIT ? OFFSET ?",
            (None, 0) => "",
            (None, _) => " LIMIT -1 OFFSET ?",
        }
    }

    fn window_binds(&self) -> RepoResult<Vec<Value>> {
        let mut binds = Vec::new();
        if let Some(limit) = self.limit {
            binds.push(Value::Integer(to_sql_integer("limit", limit)?));
        }
        if self.offset > 0 {
            binds.push(Value::Integer(to_sql_integer("offset", self.offset)?));
        }
        Ok(binds)
    }
}

/// Per-team age aggregate for members matching `predicate`.
///
/// Uses an inner join, so members without a team are excluded. Rows are
/// ordered by team name, then team id.
pub fn team_age_stats(conn: &Connection, predicate: &Predicate) -> RepoResult<Vec<TeamAgeStats>> {
    let sql = format!(
        "SELECT
            t.id AS team_id,
            t.name AS team_name,
            COUNT(m.id) AS member_count,
            AVG(m.age) AS average_age,
            MIN(m.age) AS min_age,
            MAX(m.age) AS max_age
         FROM {}
         WHERE {}
         GROUP BY t.id, t.name
         ORDER BY t.name ASC, t.id ASC",
        JoinedSource::inner().from_sql(),
        predicate.where_sql(),
    );

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(predicate.bind_values()))?;
    let mut stats = Vec::new();
    while let Some(row) = rows.next()? {
        stats.push(TeamAgeStats {
            team_id: row.get("team_id")?,
            team_name: row.get("team_name")?,
            member_count: count_from_sql_value(row.get("member_count")?)?,
            average_age: row.get("average_age")?,
            min_age: row.get("min_age")?,
            max_age: row.get("max_age")?,
        });
    }
    Ok(stats)
}

pub(crate) fn parse_member_team_row(row: &Row<'_>) -> RepoResult<MemberTeamView> {
    let team_id: Option<i64> = row.get("team_id")?;
    let team_name: Option<String> = row.get("team_name")?;
    if team_id.is_some() != team_name.is_some() {
        return Err(RepoError::InvalidData(format!(
            "team id/name mismatch for member row (team_id present: {})",
            team_id.is_some()
        )));
    }

    Ok(MemberTeamView {
        member_id: row.get("member_id")?,
        username: row.get("username")?,
        age: row.get("age")?,
        team_id,
        team_name,
    })
}

fn order_by_sql(sort: &Sort) -> String {
    if sort.is_unsorted() {
        return String::new();
    }
    let terms = sort.terms().iter().map(order_term_sql).collect::<Vec<_>>();
    format!(" ORDER BY {}", terms.join(", "))
}

fn order_term_sql(spec: &OrderSpec) -> String {
    let column = match spec.field {
        OrderField::MemberId => "member_id",
        OrderField::Username => "username",
        OrderField::Age => "age",
        OrderField::TeamId => "team_id",
        OrderField::TeamName => "team_name",
    };
    let direction = match spec.direction {
        Direction::Asc => "ASC",
        Direction::Desc => "DESC",
    };
    let nulls = match spec.nulls {
        NullPlacement::First => "NULLS FIRST",
        NullPlacement::Last => "NULLS LAST",
    };
    format!("{column} {direction} {nulls}")
}

fn to_sql_integer(name: &str, value: u64) -> RepoResult<i64> {
    i64::try_from(value)
        .map_err(|_| RepoError::InvalidArgument(format!("{name} {value} exceeds storage range")))
}

fn count_from_sql_value(value: i64) -> RepoResult<u64> {
    u64::try_from(value).map_err(|_| RepoError::InvalidData(format!("negative row count {value}")))
}
