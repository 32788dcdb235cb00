//! Member/team repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Create and read `Team`/`Member` records and reassign teams.
//! - Run filtered searches, paged searches and aggregates over the
//!   member -> team join.
//! - Run predicate-scoped bulk updates/deletes.
//!
//! # Invariants
//! - Every search-style operation scopes through one `Predicate` built from
//!   the caller's `SearchCondition`.
//! - `change_team` writes only `member.team_id`; the team side is derived.
//! - Bulk operations bypass any caller-side cache. After `update_where` or
//!   `delete_where` the caller must reload cached members before reading
//!   them again in the same unit of work.

use crate::db::with_write_scope;
use crate::model::condition::SearchCondition;
use crate::model::member::{
    validate_team_name, Member, MemberId, NewMember, Team, TeamId, TeamMemberIndex,
};
use crate::model::page::{PageRequest, PageResult, PageStrategy};
use crate::model::sort::Sort;
use crate::model::view::{MemberTeamView, TeamAgeStats};
use crate::query::mutate::{execute_delete, execute_update, Mutation};
use crate::query::paginate::{paginate, with_total};
use crate::query::predicate::Predicate;
use crate::query::select::{team_age_stats, JoinedSource, SelectQuery};
use crate::repo::{EntityRef, RepoError, RepoResult};
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::time::Instant;

const REQUIRED_TABLES: [&str; 2] = ["team", "member"];

/// Caller-facing roster operations.
pub trait MemberRepository {
    fn create_team(&self, name: &str) -> RepoResult<TeamId>;
    fn get_team(&self, id: TeamId) -> RepoResult<Option<Team>>;
    fn create_member(&self, member: &NewMember) -> RepoResult<MemberId>;
    fn get_member(&self, id: MemberId) -> RepoResult<Option<Member>>;
    /// Moves a member to `team`, or out of any team with `None`.
    fn change_team(&self, member_id: MemberId, team: Option<TeamId>) -> RepoResult<()>;
    /// Builds the member-id index of one team from `member.team_id`.
    fn team_member_index(&self, team_id: TeamId) -> RepoResult<TeamMemberIndex>;

    /// Unpaged, unordered search over the member -> team left join.
    fn search(&self, condition: &SearchCondition) -> RepoResult<Vec<MemberTeamView>>;
    /// Paged search; `strategy` decides how the total is obtained.
    fn search_page(
        &self,
        condition: &SearchCondition,
        request: &PageRequest,
        strategy: PageStrategy,
    ) -> RepoResult<PageResult<MemberTeamView>>;
    /// Single-result search: `Ok(None)` on no match, `NonUniqueResult` on many.
    fn fetch_one(&self, condition: &SearchCondition) -> RepoResult<Option<MemberTeamView>>;
    /// First row of the search under `sort`.
    fn fetch_first(
        &self,
        condition: &SearchCondition,
        sort: &Sort,
    ) -> RepoResult<Option<MemberTeamView>>;
    fn count(&self, condition: &SearchCondition) -> RepoResult<u64>;
    /// Age aggregates per team for matching members that have a team.
    fn team_age_stats(&self, condition: &SearchCondition) -> RepoResult<Vec<TeamAgeStats>>;

    /// Applies `mutation` to every matching member; returns affected rows.
    fn update_where(&self, condition: &SearchCondition, mutation: &Mutation) -> RepoResult<u64>;
    /// Deletes every matching member; returns affected rows.
    fn delete_where(&self, condition: &SearchCondition) -> RepoResult<u64>;
}

/// SQLite-backed roster repository bound to one unit of work.
pub struct SqliteMemberRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMemberRepository<'conn> {
    /// Binds the repository to a bootstrapped connection.
    ///
    /// # Errors
    /// - `MissingRequiredTable` when the roster schema is absent.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        for table in REQUIRED_TABLES {
            if !table_exists(conn, table)? {
                return Err(RepoError::MissingRequiredTable(table));
            }
        }
        Ok(Self { conn })
    }

    fn select(&self, condition: &SearchCondition) -> SelectQuery<'conn> {
        SelectQuery::new(
            self.conn,
            JoinedSource::left(),
            Predicate::from_search(condition),
        )
    }
}

impl MemberRepository for SqliteMemberRepository<'_> {
    fn create_team(&self, name: &str) -> RepoResult<TeamId> {
        validate_team_name(name)?;
        self.conn
            .execute("INSERT INTO team (name) VALUES (?1);", [name])?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_team(&self, id: TeamId) -> RepoResult<Option<Team>> {
        let team = self
            .conn
            .query_row(
                "SELECT id, name FROM team WHERE id = ?1;",
                [id],
                |row| {
                    Ok(Team {
                        id: row.get("id")?,
                        name: row.get("name")?,
                    })
                },
            )
            .optional()?;
        Ok(team)
    }

    fn create_member(&self, member: &NewMember) -> RepoResult<MemberId> {
        member.validate()?;

        with_write_scope(self.conn, |conn| {
            if let Some(team_id) = member.team_ref {
                ensure_team_exists(conn, team_id)?;
            }
            conn.execute(
                "INSERT INTO member (username, age, team_id) VALUES (?1, ?2, ?3);",
                params![member.username.as_deref(), member.age, member.team_ref],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    fn get_member(&self, id: MemberId) -> RepoResult<Option<Member>> {
        let member = self
            .conn
            .query_row(
                "SELECT id, username, age, team_id FROM member WHERE id = ?1;",
                [id],
                |row| {
                    Ok(Member {
                        id: row.get("id")?,
                        username: row.get("username")?,
                        age: row.get("age")?,
                        team_ref: row.get("team_id")?,
                    })
                },
            )
            .optional()?;
        Ok(member)
    }

    fn change_team(&self, member_id: MemberId, team: Option<TeamId>) -> RepoResult<()> {
        with_write_scope(self.conn, |conn| {
            if let Some(team_id) = team {
                ensure_team_exists(conn, team_id)?;
            }
            let changed = conn.execute(
                "UPDATE member SET team_id = ?1 WHERE id = ?2;",
                params![team, member_id],
            )?;
            if changed == 0 {
                return Err(RepoError::NotFound(EntityRef::Member(member_id)));
            }
            Ok(())
        })?;

        info!(
            "event=change_team module=repo status=ok member_id={member_id} team_id={}",
            team.map_or_else(|| "none".to_string(), |id| id.to_string())
        );
        Ok(())
    }

    fn team_member_index(&self, team_id: TeamId) -> RepoResult<TeamMemberIndex> {
        ensure_team_exists(self.conn, team_id)?;

        let mut stmt = self
            .conn
            .prepare("SELECT id FROM member WHERE team_id = ?1 ORDER BY id ASC;")?;
        let member_ids = stmt
            .query_map([team_id], |row| row.get::<_, MemberId>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TeamMemberIndex {
            team_id,
            member_ids,
        })
    }

    fn search(&self, condition: &SearchCondition) -> RepoResult<Vec<MemberTeamView>> {
        let started_at = Instant::now();
        let views = self.select(condition).fetch()?;
        debug!(
            "event=search module=repo status=ok rows={} duration_ms={}",
            views.len(),
            started_at.elapsed().as_millis()
        );
        Ok(views)
    }

    fn search_page(
        &self,
        condition: &SearchCondition,
        request: &PageRequest,
        strategy: PageStrategy,
    ) -> RepoResult<PageResult<MemberTeamView>> {
        let started_at = Instant::now();
        let query = self
            .select(condition)
            .order_by(request.sort().with_tie_breaker())
            .offset(request.offset())
            .limit(request.page_size());

        let page = match strategy {
            PageStrategy::Embedded => {
                let (content, total) = query.fetch_with_total()?;
                with_total(content, request, total)
            }
            PageStrategy::Separate => {
                let content = query.fetch()?;
                let total = query.fetch_count()?;
                with_total(content, request, total)
            }
            PageStrategy::Elided => {
                let content = query.fetch()?;
                paginate(content, request, || query.fetch_count())?
            }
        };

        let count_query = match (strategy, page.count_elided()) {
            (PageStrategy::Embedded, _) => "embedded",
            (_, true) => "elided",
            (_, false) => "issued",
        };
        debug!(
            "event=search_page module=repo status=ok strategy={} count_query={} page_index={} page_size={} rows={} duration_ms={}",
            strategy.as_str(),
            count_query,
            request.page_index(),
            request.page_size(),
            page.content.len(),
            started_at.elapsed().as_millis()
        );
        Ok(page)
    }

    fn fetch_one(&self, condition: &SearchCondition) -> RepoResult<Option<MemberTeamView>> {
        let mut views = self.select(condition).limit(2).fetch()?;
        if views.len() > 1 {
            return Err(RepoError::NonUniqueResult { found: views.len() });
        }
        Ok(views.pop())
    }

    fn fetch_first(
        &self,
        condition: &SearchCondition,
        sort: &Sort,
    ) -> RepoResult<Option<MemberTeamView>> {
        let views = self
            .select(condition)
            .order_by(sort.with_tie_breaker())
            .limit(1)
            .fetch()?;
        Ok(views.into_iter().next())
    }

    fn count(&self, condition: &SearchCondition) -> RepoResult<u64> {
        self.select(condition).fetch_count()
    }

    fn team_age_stats(&self, condition: &SearchCondition) -> RepoResult<Vec<TeamAgeStats>> {
        team_age_stats(self.conn, &Predicate::from_search(condition))
    }

    fn update_where(&self, condition: &SearchCondition, mutation: &Mutation) -> RepoResult<u64> {
        let started_at = Instant::now();
        let predicate = Predicate::from_search(condition);
        let affected = with_write_scope(self.conn, |conn| {
            execute_update(conn, &predicate, std::slice::from_ref(mutation))
        })?;
        info!(
            "event=bulk_update module=repo status=ok conditions={} affected={} duration_ms={}",
            predicate.conditions().len(),
            affected,
            started_at.elapsed().as_millis()
        );
        Ok(affected)
    }

    fn delete_where(&self, condition: &SearchCondition) -> RepoResult<u64> {
        let started_at = Instant::now();
        let predicate = Predicate::from_search(condition);
        let affected =
            with_write_scope(self.conn, |conn| execute_delete(conn, &predicate))?;
        info!(
            "event=bulk_delete module=repo status=ok conditions={} affected={} duration_ms={}",
            predicate.conditions().len(),
            affected,
            started_at.elapsed().as_millis()
        );
        Ok(affected)
    }
}

fn ensure_team_exists(conn: &Connection, team_id: TeamId) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM team WHERE id = ?1);",
        [team_id],
        |row| row.get(0),
    )?;
    if exists == 0 {
        return Err(RepoError::NotFound(EntityRef::Team(team_id)));
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
