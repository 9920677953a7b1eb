//! Deterministic VU mapping: role, resource ids, request plan and checks.
mod check;
mod driver;
mod pacing;
mod plan;
mod resources;
mod role;


pub use check::{
    ALLOWED_RETURN_CODES, NO_RETURN_CODE, ResponseCheck, extract_return_code, is_known_return_code,
    metric_tag,
};
pub use driver::{Assignment, TrafficDriver, TrafficSettings};
pub use pacing::Pacing;
pub use plan::{CalendarQuery, PlanContext, RequestStep, build_plan};
pub use resources::{
    LOOPS_PER_USER, PARENT_STUDENT_OFFSET, ResourceScope, TEACHER_CLASS_STUDENT_ID,
    TEAM_LOOPS_PER_TEAM, USERS_PER_TEAM, first_loop_id_for_user, first_team_loop_id_for_team,
    parent_student_id, parse_user_no, team_id_for_user,
};
pub use role::{DEFAULT_STUDENT_END, DEFAULT_TEACHER_END, Role, RoleBands};
