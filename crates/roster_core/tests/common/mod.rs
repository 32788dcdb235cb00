#![allow(dead_code)]

use roster_core::{MemberId, MemberRepository, NewMember, SqliteMemberRepository, TeamId};

/// Ids of the four-member roster used across integration tests.
pub struct Roster {
    pub team_a: TeamId,
    pub team_b: TeamId,
    /// Ages 10, 20, 30, 40 in order.
    pub members: [MemberId; 4],
}

/// Seeds teamA = {member1 (10), member2 (20)}, teamB = {member3 (30), member4 (40)}.
pub fn seed_roster(repo: &SqliteMemberRepository<'_>) -> Roster {
    let team_a = repo.create_team("teamA").unwrap();
    let team_b = repo.create_team("teamB").unwrap();
    let members = [
        repo.create_member(&NewMember::new("member1", 10).in_team(team_a))
            .unwrap(),
        repo.create_member(&NewMember::new("member2", 20).in_team(team_a))
            .unwrap(),
        repo.create_member(&NewMember::new("member3", 30).in_team(team_b))
            .unwrap(),
        repo.create_member(&NewMember::new("member4", 40).in_team(team_b))
            .unwrap(),
    ];
    Roster {
        team_a,
        team_b,
        members,
    }
}
