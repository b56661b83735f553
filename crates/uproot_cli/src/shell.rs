//! Line commands for the interactive shell.
//!
//! Ids may be typed in full or as any unique prefix of the UUID.

use clap::{Parser, Subcommand};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uproot_core::{
    core_version, logging_status, BranchLayout, ChallengeService, EntityKind, GoalNode,
    GoalRepository, GoalService, GrowthService, HabitService, SqliteChallengeRepository,
    SqliteGoalRepository, SqliteHabitRepository,
};
use uuid::Uuid;

const SHORT_ID_LEN: usize = 8;

pub type ShellResult<T> = Result<T, Box<dyn Error>>;

/// What the read loop does after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Shell-level input errors.
#[derive(Debug)]
pub enum ShellError {
    UnknownId { kind: EntityKind, input: String },
    AmbiguousId {
        kind: EntityKind,
        input: String,
        matches: usize,
    },
    Missing { kind: EntityKind, id: Uuid },
}

impl Display for ShellError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownId { kind, input } => write!(f, "no {kind} matches `{input}`"),
            Self::AmbiguousId {
                kind,
                input,
                matches,
            } => write!(f, "`{input}` matches {matches} {kind}s; type more of the id"),
            Self::Missing { kind, id } => write!(f, "{kind} not found: {id}"),
        }
    }
}

impl Error for ShellError {}

#[derive(Parser, Debug)]
#[command(name = "uproot", no_binary_name = true, disable_version_flag = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Daily habits (the trunk).
    #[command(subcommand, alias = "h")]
    Habit(HabitCommand),
    /// Goals and subgoals (the branches).
    #[command(subcommand, alias = "g")]
    Goal(GoalCommand),
    /// Tasks attached to goals (the leaves).
    #[command(subcommand, alias = "t")]
    Task(TaskCommand),
    /// Wellness challenges (the roots).
    #[command(subcommand, alias = "c")]
    Challenge(ChallengeCommand),
    /// Print the computed tree layout.
    Tree {
        #[arg(long)]
        json: bool,
    },
    /// Print version and logging state.
    Status,
    /// Leave the shell.
    #[command(alias = "exit")]
    Quit,
}

#[derive(Subcommand, Debug)]
enum HabitCommand {
    #[command(alias = "ls")]
    List,
    /// Titles may start with `-`; put `--` before one that starts with `-h`.
    Add {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        title: Vec<String>,
    },
    /// Toggle today's completion.
    Done { id: String },
    Rm { id: String },
}

#[derive(Subcommand, Debug)]
enum GoalCommand {
    #[command(alias = "ls")]
    List,
    Show {
        id: String,
    },
    /// `--parent` goes before the title; the title takes every word after it.
    Add {
        #[arg(long)]
        parent: Option<String>,
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        title: Vec<String>,
    },
    /// Reparent a goal; omit `--parent` to make it a root goal.
    Mv {
        id: String,
        #[arg(long)]
        parent: Option<String>,
    },
    /// Delete a goal with all its subgoals and tasks.
    Rm { id: String },
}

#[derive(Subcommand, Debug)]
enum TaskCommand {
    Add {
        goal: String,
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        title: Vec<String>,
    },
    /// Toggle completion.
    Done { id: String },
    Rm { id: String },
}

#[derive(Subcommand, Debug)]
enum ChallengeCommand {
    #[command(alias = "ls")]
    List,
    /// Draw a new challenge from the idea pool.
    Daily,
    Done { id: String },
    Rm { id: String },
}

/// Parses and runs one input line.
pub fn run_line(conn: &Connection, line: &str) -> ShellResult<Flow> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(Flow::Continue);
    }

    let parsed = match Line::try_parse_from(trimmed.split_whitespace()) {
        Ok(parsed) => parsed,
        Err(err) => {
            // Help output and usage errors are both rendered by clap.
            let _ = err.print();
            return Ok(Flow::Continue);
        }
    };

    match parsed.command {
        Command::Habit(command) => run_habit(conn, command)?,
        Command::Goal(command) => run_goal(conn, command)?,
        Command::Task(command) => run_task(conn, command)?,
        Command::Challenge(command) => run_challenge(conn, command)?,
        Command::Tree { json } => run_tree(conn, json)?,
        Command::Status => {
            println!("version {}", core_version());
            match logging_status() {
                Some(active) => println!("logging {} -> {}", active.level, active.dir.display()),
                None => println!("logging off"),
            }
        }
        Command::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

fn run_habit(conn: &Connection, command: HabitCommand) -> ShellResult<()> {
    let service = HabitService::new(SqliteHabitRepository::try_new(conn)?);
    match command {
        HabitCommand::List => {
            for habit in service.list_habits()? {
                println!(
                    "{}  {} {}  streak {}",
                    short_id(habit.id),
                    check(habit.completed),
                    habit.title,
                    habit.streak
                );
            }
        }
        HabitCommand::Add { title } => {
            let habit = service.add_habit(&title.join(" "))?;
            println!("Habit added: {}", short_id(habit.id));
        }
        HabitCommand::Done { id } => {
            let ids = service.list_habits()?.into_iter().map(|habit| habit.id);
            let id = resolve_id(EntityKind::Habit, &id, ids)?;
            let habit = service.complete_habit(id)?;
            if habit.completed {
                println!(
                    "Great job! You've maintained a {} day streak.",
                    habit.streak
                );
            } else {
                println!("Habit unmarked. Streak is back to {}.", habit.streak);
            }
        }
        HabitCommand::Rm { id } => {
            let ids = service.list_habits()?.into_iter().map(|habit| habit.id);
            let id = resolve_id(EntityKind::Habit, &id, ids)?;
            if !service.delete_habit(id)? {
                return Err(missing(EntityKind::Habit, id));
            }
            println!("Habit deleted.");
        }
    }
    Ok(())
}

fn run_goal(conn: &Connection, command: GoalCommand) -> ShellResult<()> {
    let service = GoalService::new(SqliteGoalRepository::try_new(conn)?);
    match command {
        GoalCommand::List => {
            for node in service.goal_forest()? {
                print_goal(&node, 0);
            }
        }
        GoalCommand::Show { id } => {
            let id = resolve_id(EntityKind::Goal, &id, goal_ids(&service)?)?;
            let node = service
                .get_goal(id)?
                .ok_or_else(|| missing(EntityKind::Goal, id))?;
            print_goal(&node, 0);
            println!(
                "{} goal(s), {} level(s) deep",
                node.goal_count(),
                node.depth() + 1
            );
        }
        GoalCommand::Add { parent, title } => {
            let parent_id = match parent {
                Some(parent) => Some(resolve_id(
                    EntityKind::Goal,
                    &parent,
                    goal_ids(&service)?,
                )?),
                None => None,
            };
            let goal = service.add_goal(&title.join(" "), parent_id)?;
            println!("Goal added: {}", short_id(goal.id));
        }
        GoalCommand::Mv { id, parent } => {
            let ids = goal_ids(&service)?;
            let id = resolve_id(EntityKind::Goal, &id, ids.iter().copied())?;
            let parent_id = match parent {
                Some(parent) => Some(resolve_id(EntityKind::Goal, &parent, ids)?),
                None => None,
            };
            service.move_goal(id, parent_id)?;
            println!("Goal moved.");
        }
        GoalCommand::Rm { id } => {
            let id = resolve_id(EntityKind::Goal, &id, goal_ids(&service)?)?;
            let removed = service.subtree_ids(id)?.len();
            if !service.delete_goal(id)? {
                return Err(missing(EntityKind::Goal, id));
            }
            println!("Goal deleted along with {} subgoal(s).", removed.saturating_sub(1));
        }
    }
    Ok(())
}

fn run_task(conn: &Connection, command: TaskCommand) -> ShellResult<()> {
    let service = GoalService::new(SqliteGoalRepository::try_new(conn)?);
    match command {
        TaskCommand::Add { goal, title } => {
            let goal_id = resolve_id(EntityKind::Goal, &goal, goal_ids(&service)?)?;
            let task = service.add_task(&title.join(" "), goal_id)?;
            println!("Task added: {}", short_id(task.id));
        }
        TaskCommand::Done { id } => {
            let id = resolve_id(EntityKind::Task, &id, task_ids(&service)?)?;
            let task = service.complete_task(id)?;
            let progress = service
                .list_goals()?
                .into_iter()
                .find(|goal| goal.id == task.goal_id)
                .map_or(0, |goal| goal.progress);
            println!(
                "Task {}. Goal progress is now {}%.",
                if task.completed { "completed" } else { "reopened" },
                progress
            );
        }
        TaskCommand::Rm { id } => {
            let id = resolve_id(EntityKind::Task, &id, task_ids(&service)?)?;
            if !service.delete_task(id)? {
                return Err(missing(EntityKind::Task, id));
            }
            println!("Task deleted.");
        }
    }
    Ok(())
}

fn run_challenge(conn: &Connection, command: ChallengeCommand) -> ShellResult<()> {
    let service = ChallengeService::new(SqliteChallengeRepository::try_new(conn)?);
    match command {
        ChallengeCommand::List => {
            for challenge in service.list_challenges()? {
                println!(
                    "{}  {} {}\n            {}",
                    short_id(challenge.id),
                    check(challenge.completed),
                    challenge.title,
                    challenge.description
                );
            }
        }
        ChallengeCommand::Daily => {
            let challenge = service.generate_daily_challenge()?;
            println!(
                "New challenge {}: {}",
                short_id(challenge.id),
                challenge.title
            );
        }
        ChallengeCommand::Done { id } => {
            let ids = service
                .list_challenges()?
                .into_iter()
                .map(|challenge| challenge.id);
            let id = resolve_id(EntityKind::Challenge, &id, ids)?;
            service.complete_challenge(id)?;
            println!("Great job! Your roots are growing stronger.");
        }
        ChallengeCommand::Rm { id } => {
            let ids = service
                .list_challenges()?
                .into_iter()
                .map(|challenge| challenge.id);
            let id = resolve_id(EntityKind::Challenge, &id, ids)?;
            if !service.delete_challenge(id)? {
                return Err(missing(EntityKind::Challenge, id));
            }
            println!("Challenge deleted.");
        }
    }
    Ok(())
}

fn run_tree(conn: &Connection, json: bool) -> ShellResult<()> {
    let layout = GrowthService::from_connection(conn)?.layout()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&layout)?);
        return Ok(());
    }

    println!(
        "trunk {:.0}x{:.0}, {} branch(es), {} root(s)",
        layout.trunk.width,
        layout.trunk.height,
        layout.branch_count(),
        layout.roots.len()
    );
    for branch in &layout.branches {
        print_branch(branch, 1);
    }
    let grown = layout.roots.iter().filter(|root| root.grown).count();
    println!("roots grown: {grown}/{}", layout.roots.len());
    Ok(())
}

fn goal_ids<R: GoalRepository>(service: &GoalService<R>) -> ShellResult<Vec<Uuid>> {
    Ok(service.list_goals()?.into_iter().map(|goal| goal.id).collect())
}

fn task_ids<R: GoalRepository>(service: &GoalService<R>) -> ShellResult<Vec<Uuid>> {
    Ok(service.list_tasks()?.into_iter().map(|task| task.id).collect())
}

fn print_goal(node: &GoalNode, depth: usize) {
    let indent = "  ".repeat(depth);
    println!(
        "{indent}{}  {} ({}%)",
        short_id(node.goal.id),
        node.goal.title,
        node.goal.progress
    );
    for task in &node.tasks {
        println!(
            "{indent}    {} {}  {}",
            check(task.completed),
            short_id(task.id),
            task.title
        );
    }
    for child in &node.subgoals {
        print_goal(child, depth + 1);
    }
}

fn print_branch(branch: &BranchLayout, depth: usize) {
    let grown = branch.leaves.iter().filter(|leaf| leaf.grown).count();
    let hidden = if branch.hidden_subgoals > 0 {
        format!(" (+{} deeper)", branch.hidden_subgoals)
    } else {
        String::new()
    };
    println!(
        "{}{:?} L{} {}  length {:.0} angle {:.1} leaves {}/{}{}",
        "  ".repeat(depth),
        branch.side,
        branch.level,
        short_id(branch.goal_id),
        branch.length,
        branch.angle,
        grown,
        branch.leaves.len(),
        hidden
    );
    for child in &branch.subgoals {
        print_branch(child, depth + 1);
    }
}

/// Resolves a full UUID or a unique prefix against `candidates`.
///
/// A well-formed UUID is returned as-is so the service reports a missing
/// record in its own terms.
fn resolve_id(
    kind: EntityKind,
    input: &str,
    candidates: impl IntoIterator<Item = Uuid>,
) -> Result<Uuid, ShellError> {
    if let Ok(id) = Uuid::parse_str(input) {
        return Ok(id);
    }

    let prefix = input.to_ascii_lowercase();
    let matches: Vec<Uuid> = candidates
        .into_iter()
        .filter(|id| id.to_string().starts_with(&prefix))
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(ShellError::UnknownId {
            kind,
            input: input.to_string(),
        }),
        _ => Err(ShellError::AmbiguousId {
            kind,
            input: input.to_string(),
            matches: matches.len(),
        }),
    }
}

fn missing(kind: EntityKind, id: Uuid) -> Box<dyn Error> {
    Box::new(ShellError::Missing { kind, id })
}

fn short_id(id: Uuid) -> String {
    id.to_string()[..SHORT_ID_LEN].to_string()
}

fn check(done: bool) -> &'static str {
    if done {
        "[x]"
    } else {
        "[ ]"
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve_id, run_line, Flow, ShellError};
    use uproot_core::db::open_db_in_memory;
    use uproot_core::{
        seed_demo_data, ChallengeService, EntityKind, GoalService, HabitService,
        SqliteChallengeRepository, SqliteGoalRepository, SqliteHabitRepository,
    };
    use uuid::Uuid;

    #[test]
    fn resolve_id_accepts_unique_prefix() {
        let a = Uuid::parse_str("aaaaaaaa-0000-4000-8000-000000000000").unwrap();
        let b = Uuid::parse_str("abbbbbbb-0000-4000-8000-000000000000").unwrap();

        assert_eq!(resolve_id(EntityKind::Goal, "AB", [a, b]).unwrap(), b);
        assert!(matches!(
            resolve_id(EntityKind::Goal, "a", [a, b]),
            Err(ShellError::AmbiguousId { matches: 2, .. })
        ));
        assert!(matches!(
            resolve_id(EntityKind::Goal, "c", [a, b]),
            Err(ShellError::UnknownId { .. })
        ));
    }

    #[test]
    fn resolve_id_passes_full_uuid_through() {
        let id = Uuid::new_v4();
        assert_eq!(
            resolve_id(EntityKind::Task, &id.to_string(), Vec::new()).unwrap(),
            id
        );
    }

    #[test]
    fn lines_drive_the_services() {
        let conn = open_db_in_memory().unwrap();

        assert_eq!(run_line(&conn, "").unwrap(), Flow::Continue);
        assert_eq!(run_line(&conn, "# comment").unwrap(), Flow::Continue);
        assert_eq!(run_line(&conn, "habit add Morning Walk").unwrap(), Flow::Continue);
        assert_eq!(run_line(&conn, "goal add Learn Rust").unwrap(), Flow::Continue);

        let habits = HabitService::new(SqliteHabitRepository::try_new(&conn).unwrap());
        let habit = habits.list_habits().unwrap().remove(0);
        assert_eq!(habit.title, "Morning Walk");

        run_line(&conn, &format!("habit done {}", &habit.id.to_string()[..6])).unwrap();
        assert_eq!(habits.list_habits().unwrap()[0].streak, 1);

        let goals = GoalService::new(SqliteGoalRepository::try_new(&conn).unwrap());
        let goal = goals.list_goals().unwrap().remove(0);
        run_line(&conn, &format!("task add {} Read the book", goal.id)).unwrap();
        let task = goals.list_tasks().unwrap().remove(0);
        run_line(&conn, &format!("task done {}", task.id)).unwrap();
        assert_eq!(goals.list_goals().unwrap()[0].progress, 100);

        run_line(&conn, &format!("goal rm {}", goal.id)).unwrap();
        assert!(goals.list_tasks().unwrap().is_empty());

        assert_eq!(run_line(&conn, "quit").unwrap(), Flow::Quit);
    }

    #[test]
    fn failed_commands_surface_errors_without_quitting() {
        let conn = open_db_in_memory().unwrap();
        seed_demo_data(&conn).unwrap();

        assert!(run_line(&conn, "habit done zzz").is_err());
        assert!(run_line(&conn, &format!("goal rm {}", Uuid::new_v4())).is_err());
        assert_eq!(run_line(&conn, "not-a-command").unwrap(), Flow::Continue);
        assert_eq!(run_line(&conn, "tree").unwrap(), Flow::Continue);
        assert_eq!(run_line(&conn, "tree --json").unwrap(), Flow::Continue);
    }

    #[test]
    fn titles_may_start_with_a_hyphen() {
        let conn = open_db_in_memory().unwrap();

        run_line(&conn, "habit add -10 pushups").unwrap();
        run_line(&conn, "goal add -- -h is not help").unwrap();

        let habits = HabitService::new(SqliteHabitRepository::try_new(&conn).unwrap());
        assert_eq!(habits.list_habits().unwrap()[0].title, "-10 pushups");
        let goals = GoalService::new(SqliteGoalRepository::try_new(&conn).unwrap());
        assert_eq!(goals.list_goals().unwrap()[0].title, "-h is not help");
    }

    #[test]
    fn goals_move_and_challenges_complete_through_the_shell() {
        let conn = open_db_in_memory().unwrap();
        let goals = GoalService::new(SqliteGoalRepository::try_new(&conn).unwrap());
        let parent = goals.add_goal("Write a Book", None).unwrap();
        let child = goals.add_goal("Outline", None).unwrap();

        run_line(
            &conn,
            &format!("goal mv {} --parent {}", &child.id.to_string()[..8], parent.id),
        )
        .unwrap();
        let forest = goals.goal_forest().unwrap();
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].subgoals[0].goal.id, child.id);

        assert!(run_line(&conn, &format!("goal mv {} --parent {}", parent.id, child.id)).is_err());

        run_line(&conn, &format!("goal mv {}", child.id)).unwrap();
        assert_eq!(goals.goal_forest().unwrap().len(), 2);

        run_line(&conn, "challenge daily").unwrap();
        let challenges =
            ChallengeService::new(SqliteChallengeRepository::try_new(&conn).unwrap());
        let daily = challenges.list_challenges().unwrap().remove(0);
        assert!(!daily.completed);

        run_line(&conn, &format!("challenge done {}", &daily.id.to_string()[..8])).unwrap();
        assert!(challenges.list_challenges().unwrap()[0].completed);
        assert!(run_line(&conn, &format!("challenge done {}", Uuid::new_v4())).is_err());
    }
}
