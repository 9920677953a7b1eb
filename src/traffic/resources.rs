//! Fixed-stride resource ids the seeded backend hands each test user.
//!
//! The seed data gives every user 19 loops, groups users into teams of 10,
//! and gives every team 8 team loops, all numbered from 1 in user order.

/// Loops seeded per user: user 1 owns loops 1..=19, user 2 owns 20..=38, ...
pub const LOOPS_PER_USER: u64 = 19;
/// Users per team: users 1..=10 are team 1, 11..=20 team 2, ...
pub const USERS_PER_TEAM: u64 = 10;
/// Team loops seeded per team: team 1 owns 1..=8, team 2 owns 9..=16, ...
pub const TEAM_LOOPS_PER_TEAM: u64 = 8;
/// Parent slot `s` watches the student with id `s - 51`.
pub const PARENT_STUDENT_OFFSET: u64 = 51;
/// Student record every teacher session reads.
pub const TEACHER_CLASS_STUDENT_ID: u64 = 351;

/// Resource ids derived for one virtual user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceScope {
    pub user_no: u64,
    pub loop_id: u64,
    pub team_id: u64,
    pub team_loop_id: u64,
}

impl ResourceScope {
    /// Derives the scope for a session. The user number comes from a
    /// `user{n}@...` key; keys without one fall back to `slot + 1`.
    #[must_use]
    pub fn for_session(user_key: &str, slot: usize) -> Self {
        let user_no = parse_user_no(user_key).unwrap_or_else(|| slot_user_no(slot));
        Self::for_user(user_no)
    }

    #[must_use]
    pub const fn for_user(user_no: u64) -> Self {
        let team_id = team_id_for_user(user_no);
        Self {
            user_no,
            loop_id: first_loop_id_for_user(user_no),
            team_id,
            team_loop_id: first_team_loop_id_for_team(team_id),
        }
    }
}

/// Extracts `n` from keys like `user17@example.com` (case-insensitive).
#[must_use]
pub fn parse_user_no(user_key: &str) -> Option<u64> {
    let lower = user_key.to_ascii_lowercase();
    let mut rest = lower.as_str();
    while let Some(pos) = rest.find("user") {
        let after = rest.get(pos.saturating_add(4)..).unwrap_or_default();
        let digits_len = after
            .char_indices()
            .find(|(_, ch)| !ch.is_ascii_digit())
            .map_or(after.len(), |(idx, _)| idx);
        if digits_len > 0
            && let Some(digits) = after.get(..digits_len)
            && let Ok(value) = digits.parse::<u64>()
            && value > 0
        {
            return Some(value);
        }
        rest = after;
    }
    None
}

#[must_use]
pub const fn first_loop_id_for_user(user_no: u64) -> u64 {
    user_no
        .saturating_sub(1)
        .saturating_mul(LOOPS_PER_USER)
        .saturating_add(1)
}

#[must_use]
pub const fn team_id_for_user(user_no: u64) -> u64 {
    match user_no.saturating_sub(1).checked_div(USERS_PER_TEAM) {
        Some(team_index) => team_index.saturating_add(1),
        None => 1,
    }
}

#[must_use]
pub const fn first_team_loop_id_for_team(team_id: u64) -> u64 {
    team_id
        .saturating_sub(1)
        .saturating_mul(TEAM_LOOPS_PER_TEAM)
        .saturating_add(1)
}

/// Student id a parent in pool slot `slot` reads. `None` below the offset.
#[must_use]
pub fn parent_student_id(slot: usize) -> Option<u64> {
    u64::try_from(slot)
        .ok()
        .and_then(|slot| slot.checked_sub(PARENT_STUDENT_OFFSET))
}

fn slot_user_no(slot: usize) -> u64 {
    u64::try_from(slot).map_or(u64::MAX, |slot| slot.saturating_add(1))
}
