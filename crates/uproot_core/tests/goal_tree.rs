use rusqlite::Connection;
use uproot_core::db::open_db_in_memory;
use uproot_core::{
    Goal, GoalId, GoalRemoval, GoalRepository, GoalService, GoalServiceError, RepoError,
    RepoResult, SqliteGoalRepository, Task, TaskId, TaskTally,
};
use uuid::Uuid;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn service(conn: &Connection) -> GoalService<SqliteGoalRepository<'_>> {
    GoalService::new(SqliteGoalRepository::try_new(conn).unwrap())
}

#[test]
fn add_goal_starts_at_zero_progress_and_normalizes_title() {
    let conn = setup();
    let service = service(&conn);

    let goal = service.add_goal("  Learn   Spanish ", None).unwrap();
    assert_eq!(goal.title, "Learn Spanish");
    assert_eq!(goal.progress, 0);
    assert_eq!(goal.parent_id, None);

    let goals = service.list_goals().unwrap();
    assert_eq!(goals, vec![goal]);
}

#[test]
fn add_goal_rejects_blank_title() {
    let conn = setup();
    let service = service(&conn);

    let err = service.add_goal("   ", None).unwrap_err();
    assert!(matches!(err, GoalServiceError::InvalidTitle));
}

#[test]
fn add_goal_rejects_unknown_parent() {
    let conn = setup();
    let service = service(&conn);
    let unknown_parent = Uuid::new_v4();

    let err = service
        .add_goal("Orphan", Some(unknown_parent))
        .unwrap_err();
    assert!(matches!(
        err,
        GoalServiceError::ParentNotFound(parent_id) if parent_id == unknown_parent
    ));
    assert!(service.list_goals().unwrap().is_empty());
}

#[test]
fn forest_is_rebuilt_from_parent_links_in_creation_order() {
    let conn = setup();
    let service = service(&conn);

    let book = service.add_goal("Write a Book", None).unwrap();
    let fit = service.add_goal("Get Fit", None).unwrap();
    let outline = service.add_goal("Outline", Some(book.id)).unwrap();
    let chapters = service.add_goal("Chapters", Some(book.id)).unwrap();
    let chapter_one = service.add_goal("Chapter one", Some(chapters.id)).unwrap();

    let forest = service.goal_forest().unwrap();
    assert_eq!(forest.len(), 2);
    assert_eq!(forest[0].goal.id, book.id);
    assert_eq!(forest[1].goal.id, fit.id);
    assert_eq!(forest[0].subgoals.len(), 2);
    assert_eq!(forest[0].subgoals[0].goal.id, outline.id);
    assert_eq!(forest[0].subgoals[1].goal.id, chapters.id);
    assert_eq!(forest[0].subgoals[1].subgoals[0].goal.id, chapter_one.id);

    let subtree = service.get_goal(chapters.id).unwrap().unwrap();
    assert_eq!(subtree.goal_count(), 2);
    assert!(service.get_goal(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn task_changes_recompute_goal_progress() {
    let conn = setup();
    let service = service(&conn);
    let goal = service.add_goal("Get Fit", None).unwrap();

    let first = service.add_task("Research gym options", goal.id).unwrap();
    let second = service.add_task("Buy workout clothes", goal.id).unwrap();
    let third = service.add_task("Schedule first session", goal.id).unwrap();
    assert_eq!(progress_of(&service, goal.id), 0);

    let toggled = service.complete_task(first.id).unwrap();
    assert!(toggled.completed);
    assert_eq!(progress_of(&service, goal.id), 33);

    service.complete_task(second.id).unwrap();
    assert_eq!(progress_of(&service, goal.id), 67);

    assert!(service.delete_task(third.id).unwrap());
    assert_eq!(progress_of(&service, goal.id), 100);

    let untoggled = service.complete_task(first.id).unwrap();
    assert!(!untoggled.completed);
    assert_eq!(progress_of(&service, goal.id), 50);
}

#[test]
fn deleting_last_task_resets_progress_to_zero() {
    let conn = setup();
    let service = service(&conn);
    let goal = service.add_goal("Learn Spanish", None).unwrap();
    let task = service.add_task("Download learning app", goal.id).unwrap();
    service.complete_task(task.id).unwrap();
    assert_eq!(progress_of(&service, goal.id), 100);

    assert!(service.delete_task(task.id).unwrap());
    assert_eq!(progress_of(&service, goal.id), 0);
}

#[test]
fn progress_only_counts_direct_tasks() {
    let conn = setup();
    let service = service(&conn);
    let parent = service.add_goal("Parent", None).unwrap();
    let child = service.add_goal("Child", Some(parent.id)).unwrap();
    service.add_task("parent task", parent.id).unwrap();
    let child_task = service.add_task("child task", child.id).unwrap();

    service.complete_task(child_task.id).unwrap();
    assert_eq!(progress_of(&service, parent.id), 0);
    assert_eq!(progress_of(&service, child.id), 100);
}

#[test]
fn task_operations_report_missing_targets() {
    let conn = setup();
    let service = service(&conn);
    let missing = Uuid::new_v4();

    let err = service.add_task("x", missing).unwrap_err();
    assert!(matches!(err, GoalServiceError::GoalNotFound(id) if id == missing));

    let err = service.complete_task(missing).unwrap_err();
    assert!(matches!(err, GoalServiceError::TaskNotFound(id) if id == missing));

    assert!(!service.delete_task(missing).unwrap());
}

#[test]
fn delete_goal_removes_descendants_and_their_tasks_only() {
    let conn = setup();
    let service = service(&conn);

    let book = service.add_goal("Write a Book", None).unwrap();
    let reading = service.add_goal("Read 24 Books", Some(book.id)).unwrap();
    let list = service.add_goal("Reading list", Some(reading.id)).unwrap();
    let fit = service.add_goal("Get Fit", None).unwrap();

    service.add_task("Research topic", book.id).unwrap();
    service.add_task("Join book club", reading.id).unwrap();
    service.add_task("Pick classics", list.id).unwrap();
    let kept = service.add_task("Buy shoes", fit.id).unwrap();

    let subtree = service.subtree_ids(book.id).unwrap();
    assert_eq!(subtree.len(), 3);
    assert_eq!(subtree[0], book.id);
    assert!(subtree.contains(&reading.id));
    assert!(subtree.contains(&list.id));

    assert!(service.delete_goal(book.id).unwrap());

    let goals = service.list_goals().unwrap();
    assert_eq!(goals.len(), 1);
    assert_eq!(goals[0].id, fit.id);
    let tasks = service.list_tasks().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, kept.id);
}

#[test]
fn delete_subgoal_keeps_parent() {
    let conn = setup();
    let service = service(&conn);
    let parent = service.add_goal("Parent", None).unwrap();
    let child = service.add_goal("Child", Some(parent.id)).unwrap();

    assert!(service.delete_goal(child.id).unwrap());

    let forest = service.goal_forest().unwrap();
    assert_eq!(forest.len(), 1);
    assert!(forest[0].subgoals.is_empty());
}

#[test]
fn delete_unknown_goal_returns_false() {
    let conn = setup();
    let service = service(&conn);
    service.add_goal("Keep me", None).unwrap();

    assert!(!service.delete_goal(Uuid::new_v4()).unwrap());
    assert_eq!(service.list_goals().unwrap().len(), 1);
}

#[test]
fn move_goal_reparents_and_promotes_to_root() {
    let conn = setup();
    let service = service(&conn);
    let a = service.add_goal("A", None).unwrap();
    let b = service.add_goal("B", None).unwrap();

    service.move_goal(b.id, Some(a.id)).unwrap();
    let forest = service.goal_forest().unwrap();
    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0].subgoals[0].goal.id, b.id);

    service.move_goal(b.id, None).unwrap();
    assert_eq!(service.goal_forest().unwrap().len(), 2);
}

#[test]
fn move_goal_rejects_cycles() {
    let conn = setup();
    let service = service(&conn);
    let a = service.add_goal("A", None).unwrap();
    let b = service.add_goal("B", Some(a.id)).unwrap();
    let c = service.add_goal("C", Some(b.id)).unwrap();

    let err = service.move_goal(a.id, Some(c.id)).unwrap_err();
    assert!(matches!(
        err,
        GoalServiceError::CycleDetected { goal_id, parent_id }
            if goal_id == a.id && parent_id == c.id
    ));

    let err = service.move_goal(b.id, Some(b.id)).unwrap_err();
    assert!(matches!(err, GoalServiceError::CycleDetected { .. }));

    let err = service.move_goal(Uuid::new_v4(), None).unwrap_err();
    assert!(matches!(err, GoalServiceError::GoalNotFound(_)));
}

#[test]
fn repository_subtree_is_empty_for_unknown_goal() {
    let conn = setup();
    let repo = SqliteGoalRepository::try_new(&conn).unwrap();

    assert!(repo.subtree_goal_ids(Uuid::new_v4()).unwrap().is_empty());
    assert!(repo.delete_goal_subtree(Uuid::new_v4()).unwrap().is_empty());
}

#[test]
fn move_goal_rejects_unknown_parent() {
    let conn = setup();
    let service = service(&conn);
    let goal = service.add_goal("Get Fit", None).unwrap();
    let unknown_parent = Uuid::new_v4();

    let err = service.move_goal(goal.id, Some(unknown_parent)).unwrap_err();
    assert!(matches!(
        err,
        GoalServiceError::ParentNotFound(parent_id) if parent_id == unknown_parent
    ));
    assert!(service.get_goal(goal.id).unwrap().unwrap().goal.is_root());
}

#[test]
fn failed_progress_write_rolls_back_task_changes() {
    let conn = setup();
    let healthy = service(&conn);
    let goal = healthy.add_goal("Learn Spanish", None).unwrap();
    let task = healthy.add_task("Download learning app", goal.id).unwrap();

    let broken = GoalService::new(ProgressWriteFails(
        SqliteGoalRepository::try_new(&conn).unwrap(),
    ));

    assert!(broken.complete_task(task.id).is_err());
    assert!(broken.add_task("Practice daily", goal.id).is_err());
    assert!(broken.delete_task(task.id).is_err());

    let tasks = healthy.list_tasks().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, task.id);
    assert!(!tasks[0].completed);
    assert_eq!(progress_of(&healthy, goal.id), 0);

    // The connection is usable again once the failed unit has rolled back.
    healthy.complete_task(task.id).unwrap();
    assert_eq!(progress_of(&healthy, goal.id), 100);
}

/// Delegates to SQLite but refuses to store goal progress.
struct ProgressWriteFails<'conn>(SqliteGoalRepository<'conn>);

impl GoalRepository for ProgressWriteFails<'_> {
    fn create_goal(&self, goal: &Goal) -> RepoResult<()> {
        self.0.create_goal(goal)
    }
    fn get_goal(&self, id: GoalId) -> RepoResult<Option<Goal>> {
        self.0.get_goal(id)
    }
    fn list_goals(&self) -> RepoResult<Vec<Goal>> {
        self.0.list_goals()
    }
    fn set_goal_parent(&self, id: GoalId, parent_id: Option<GoalId>) -> RepoResult<()> {
        self.0.set_goal_parent(id, parent_id)
    }
    fn set_goal_progress(&self, _id: GoalId, _progress: u8) -> RepoResult<()> {
        Err(RepoError::InvalidData("progress column is read-only".to_string()))
    }
    fn subtree_goal_ids(&self, id: GoalId) -> RepoResult<Vec<GoalId>> {
        self.0.subtree_goal_ids(id)
    }
    fn delete_goal_subtree(&self, id: GoalId) -> RepoResult<GoalRemoval> {
        self.0.delete_goal_subtree(id)
    }
    fn create_task(&self, task: &Task) -> RepoResult<()> {
        self.0.create_task(task)
    }
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        self.0.get_task(id)
    }
    fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        self.0.list_tasks()
    }
    fn set_task_completed(&self, id: TaskId, completed: bool) -> RepoResult<()> {
        self.0.set_task_completed(id, completed)
    }
    fn delete_task(&self, id: TaskId) -> RepoResult<bool> {
        self.0.delete_task(id)
    }
    fn task_tally(&self, goal_id: GoalId) -> RepoResult<TaskTally> {
        self.0.task_tally(goal_id)
    }
    fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        E: From<RepoError>,
        F: FnOnce() -> Result<T, E>,
    {
        self.0.atomically(work)
    }
}

fn progress_of(service: &GoalService<SqliteGoalRepository<'_>>, id: Uuid) -> u8 {
    service
        .list_goals()
        .unwrap()
        .into_iter()
        .find(|goal| goal.id == id)
        .map(|goal| goal.progress)
        .unwrap()
}
