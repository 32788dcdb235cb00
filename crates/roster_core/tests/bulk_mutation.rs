mod common;

use common::seed_roster;
use roster_core::db::{open_db_in_memory, DbError};
use roster_core::{
    MemberRepository, Mutation, NewMember, RepoError, SearchCondition, SqliteMemberRepository,
    ValidationError,
};

fn ages(repo: &SqliteMemberRepository<'_>) -> Vec<i32> {
    let mut ages: Vec<i32> = repo
        .search(&SearchCondition::all())
        .unwrap()
        .iter()
        .map(|view| view.age)
        .collect();
    ages.sort_unstable();
    ages
}

#[test]
fn update_where_renames_matching_members() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();
    let roster = seed_roster(&repo);

    let affected = repo
        .update_where(
            &SearchCondition::all().with_age_max(27),
            &Mutation::SetUsername(Some("withdrawn".to_string())),
        )
        .unwrap();
    assert_eq!(affected, 2);

    for id in &roster.members[..2] {
        let member = repo.get_member(*id).unwrap().unwrap();
        assert_eq!(member.username.as_deref(), Some("withdrawn"));
    }
    for id in &roster.members[2..] {
        let member = repo.get_member(*id).unwrap().unwrap();
        assert_ne!(member.username.as_deref(), Some("withdrawn"));
    }
}

#[test]
fn cached_member_stays_stale_until_reloaded() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();
    let roster = seed_roster(&repo);
    let cached = repo.get_member(roster.members[0]).unwrap().unwrap();

    repo.update_where(
        &SearchCondition::all().with_age_max(27),
        &Mutation::SetUsername(Some("withdrawn".to_string())),
    )
    .unwrap();

    assert_eq!(cached.username.as_deref(), Some("member1"));
    let reloaded = repo.get_member(roster.members[0]).unwrap().unwrap();
    assert_eq!(reloaded.username.as_deref(), Some("withdrawn"));
}

#[test]
fn arithmetic_updates_apply_to_every_matching_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();
    seed_roster(&repo);

    assert_eq!(
        repo.update_where(&SearchCondition::all(), &Mutation::AddAge(1))
            .unwrap(),
        4
    );
    assert_eq!(ages(&repo), vec![11, 21, 31, 41]);

    assert_eq!(
        repo.update_where(
            &SearchCondition::all().with_team_name("teamA"),
            &Mutation::MultiplyAge(2)
        )
        .unwrap(),
        2
    );
    assert_eq!(ages(&repo), vec![22, 31, 41, 42]);

    repo.update_where(
        &SearchCondition::all().with_username("member4"),
        &Mutation::SetAge(0),
    )
    .unwrap();
    assert_eq!(ages(&repo), vec![0, 22, 31, 42]);
}

#[test]
fn update_with_no_match_affects_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();
    seed_roster(&repo);

    let affected = repo
        .update_where(
            &SearchCondition::all().with_age_min(1000),
            &Mutation::SetAge(1),
        )
        .unwrap();
    assert_eq!(affected, 0);
    assert_eq!(ages(&repo), vec![10, 20, 30, 40]);
}

#[test]
fn check_violation_rolls_back_whole_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();
    seed_roster(&repo);

    let err = repo
        .update_where(&SearchCondition::all(), &Mutation::AddAge(-15))
        .unwrap_err();

    assert!(matches!(err, RepoError::Db(DbError::Sqlite(_))));
    assert_eq!(ages(&repo), vec![10, 20, 30, 40]);
    assert!(conn.is_autocommit());
}

#[test]
fn age_overflow_rolls_back_and_keeps_rows_readable() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();
    let roster = seed_roster(&repo);

    let err = repo
        .update_where(
            &SearchCondition::all().with_age_min(40),
            &Mutation::AddAge(i32::MAX),
        )
        .unwrap_err();
    assert!(matches!(err, RepoError::Db(DbError::Sqlite(_))));

    let err = repo
        .update_where(
            &SearchCondition::all().with_username("member3"),
            &Mutation::MultiplyAge(i32::MAX),
        )
        .unwrap_err();
    assert!(matches!(err, RepoError::Db(DbError::Sqlite(_))));

    assert_eq!(ages(&repo), vec![10, 20, 30, 40]);
    assert_eq!(repo.get_member(roster.members[3]).unwrap().unwrap().age, 40);
    assert!(conn.is_autocommit());
}

#[test]
fn invalid_assignment_is_rejected_before_sql() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();
    seed_roster(&repo);

    let err = repo
        .update_where(&SearchCondition::all(), &Mutation::SetAge(-1))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::NegativeAge(-1))
    ));

    let err = repo
        .update_where(
            &SearchCondition::all(),
            &Mutation::SetUsername(Some(" ".to_string())),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::BlankUsername)
    ));
}

#[test]
fn set_username_none_clears_usernames() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();
    let roster = seed_roster(&repo);

    repo.update_where(
        &SearchCondition::all().with_team_name("teamB"),
        &Mutation::SetUsername(None),
    )
    .unwrap();

    assert_eq!(
        repo.get_member(roster.members[3]).unwrap().unwrap().username,
        None
    );
    assert!(repo
        .get_member(roster.members[0])
        .unwrap()
        .unwrap()
        .username
        .is_some());
}

#[test]
fn delete_where_removes_matching_members() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();
    let roster = seed_roster(&repo);

    let deleted = repo
        .delete_where(&SearchCondition::all().with_age_min(30))
        .unwrap();

    assert_eq!(deleted, 2);
    assert_eq!(ages(&repo), vec![10, 20]);
    assert!(repo.get_member(roster.members[3]).unwrap().is_none());
    assert!(repo.team_member_index(roster.team_b).unwrap().is_empty());
}

#[test]
fn team_scoped_delete_keeps_other_teams_and_teamless_members() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();
    let roster = seed_roster(&repo);
    repo.create_member(&NewMember::new("loner", 50)).unwrap();

    let deleted = repo
        .delete_where(&SearchCondition::all().with_team_name("teamA"))
        .unwrap();

    assert_eq!(deleted, 2);
    assert_eq!(ages(&repo), vec![30, 40, 50]);
    assert!(repo.get_team(roster.team_a).unwrap().is_some());
}

#[test]
fn bulk_update_joins_caller_transaction() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();
    seed_roster(&repo);

    let tx = conn.unchecked_transaction().unwrap();
    let affected = repo
        .update_where(&SearchCondition::all(), &Mutation::SetAge(99))
        .unwrap();
    assert_eq!(affected, 4);
    assert_eq!(ages(&repo), vec![99, 99, 99, 99]);
    tx.rollback().unwrap();

    assert_eq!(ages(&repo), vec![10, 20, 30, 40]);
}

#[test]
fn bulk_delete_commits_with_caller_transaction() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMemberRepository::try_new(&conn).unwrap();
    seed_roster(&repo);

    let tx = conn.unchecked_transaction().unwrap();
    repo.delete_where(&SearchCondition::all().with_age_max(10))
        .unwrap();
    tx.commit().unwrap();

    assert_eq!(repo.count(&SearchCondition::all()).unwrap(), 3);
}
