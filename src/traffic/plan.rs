use reqwest::Method;

use crate::args::ScenarioKind;

use super::check::ResponseCheck;
use super::resources::{ResourceScope, TEACHER_CLASS_STUDENT_ID, parent_student_id};
use super::role::Role;

const API: &str = "rest-api/v1";
const STATUS_OK: u16 = 200;

/// Year/month sent to the calendar endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarQuery {
    pub year: i32,
    pub month: u32,
}

impl Default for CalendarQuery {
    fn default() -> Self {
        Self {
            year: 2026,
            month: 1,
        }
    }
}

/// One request of an iteration. `path` is relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestStep {
    pub name: String,
    pub method: Method,
    pub path: String,
    pub check: ResponseCheck,
}

impl RequestStep {
    fn get(name: impl Into<String>, path: String, check: ResponseCheck) -> Self {
        Self {
            name: name.into(),
            method: Method::GET,
            path,
            check,
        }
    }
}

/// Inputs for one virtual user's request plan.
#[derive(Debug, Clone, Copy)]
pub struct PlanContext<'ctx> {
    pub scenario: ScenarioKind,
    pub role: Role,
    pub slot: usize,
    pub scope: ResourceScope,
    pub calendar: CalendarQuery,
    /// Local date as `YYYY-MM-DD` for the daily loop list.
    pub today: &'ctx str,
}

/// Builds the ordered request plan for one iteration.
#[must_use]
pub fn build_plan(ctx: &PlanContext<'_>) -> Vec<RequestStep> {
    match ctx.scenario {
        ScenarioKind::Smoke => loop_plan(ctx),
        ScenarioKind::Stress => {
            let mut steps = loop_plan(ctx);
            steps.extend(team_plan(ctx));
            steps
        }
        ScenarioKind::Load => match ctx.role {
            Role::Student => student_plan(),
            Role::Teacher => teacher_plan(),
            Role::Parent => parent_plan(ctx.slot),
        },
        ScenarioKind::Demo => vec![RequestStep::get(
            "getMemberDetail",
            format!("{API}/member/detail"),
            ResponseCheck::None,
        )],
    }
}

fn status_ok() -> ResponseCheck {
    ResponseCheck::Status(STATUS_OK)
}

fn loop_plan(ctx: &PlanContext<'_>) -> Vec<RequestStep> {
    let loop_id = ctx.scope.loop_id;
    vec![
        RequestStep::get("getMyInfo", format!("{API}/member"), status_ok()),
        RequestStep::get(
            "getLoopCalendar",
            format!(
                "{API}/loops/calendar?year={}&month={}",
                ctx.calendar.year, ctx.calendar.month
            ),
            status_ok(),
        ),
        RequestStep::get(
            "getDailyLoops",
            format!("{API}/loops/date/{}", ctx.today),
            status_ok(),
        ),
        RequestStep::get(
            format!("getDetailLoop(loopId={loop_id})"),
            format!("{API}/loops/{loop_id}"),
            status_ok(),
        ),
        RequestStep::get("getLoopReport", format!("{API}/report"), status_ok()),
    ]
}

fn team_plan(ctx: &PlanContext<'_>) -> Vec<RequestStep> {
    let team_id = ctx.scope.team_id;
    let team_loop_id = ctx.scope.team_loop_id;
    vec![
        RequestStep::get("getMyTeams", format!("{API}/teams/my"), status_ok()),
        RequestStep::get(
            "getRecruitingTeams",
            format!("{API}/teams/recruiting"),
            status_ok(),
        ),
        RequestStep::get(
            format!("getTeamDetail(teamId={team_id})"),
            format!("{API}/teams/{team_id}"),
            status_ok(),
        ),
        RequestStep::get(
            format!("getTeamLoops(teamId={team_id})"),
            format!("{API}/teams/{team_id}/loops"),
            status_ok(),
        ),
        RequestStep::get(
            format!("getTeamLoopMyDetail(teamId={team_id}, teamLoopId={team_loop_id})"),
            format!("{API}/teams/{team_id}/loops/{team_loop_id}/my"),
            status_ok(),
        ),
        RequestStep::get(
            format!("getTeamLoopDetail(teamId={team_id}, teamLoopId={team_loop_id})"),
            format!("{API}/teams/{team_id}/loops/{team_loop_id}/all"),
            status_ok(),
        ),
        RequestStep::get(
            format!("getTeamLoopCalendar(teamId={team_id})"),
            format!(
                "{API}/teams/{team_id}/loops/calendar?year={}&month={}",
                ctx.calendar.year, ctx.calendar.month
            ),
            status_ok(),
        ),
    ]
}

fn known_code(path: String) -> RequestStep {
    RequestStep::get(path.clone(), path, ResponseCheck::KnownReturnCode)
}

fn student_plan() -> Vec<RequestStep> {
    vec![
        known_code(format!("{API}/member/detail")),
        known_code(format!("{API}/attendance/filter?year=1&semester=1")),
        known_code(format!("{API}/grade/filter?year=1&semester=1")),
        known_code(format!("{API}/feedback/filter?year=1&semester=1")),
        known_code(format!("{API}/notification")),
    ]
}

fn parent_plan(slot: usize) -> Vec<RequestStep> {
    let mut steps = Vec::with_capacity(6);
    if let Some(student_id) = parent_student_id(slot) {
        for area in ["attendance", "grade", "feedback", "counsel", "specialty"] {
            steps.push(known_code(format!(
                "{API}/{area}/filter/{student_id}?year=1&semester=1"
            )));
        }
    } else {
        tracing::debug!("Parent slot {} has no linked student id.", slot);
    }
    steps.push(known_code(format!("{API}/notification")));
    steps
}

fn teacher_plan() -> Vec<RequestStep> {
    let mut steps = Vec::with_capacity(6);
    steps.push(known_code(format!("{API}/member/students")));
    for area in ["attendance", "grade", "feedback", "counsel", "specialty"] {
        steps.push(known_code(format!(
            "{API}/{area}/filter/{TEACHER_CLASS_STUDENT_ID}?year=1&semester=2"
        )));
    }
    steps
}
