use uproot_core::db::open_db_in_memory;
use uproot_core::{
    seed_demo_data, GoalService, GrowthService, HabitService, Side, SqliteGoalRepository,
    SqliteHabitRepository,
};

#[test]
fn demo_seed_derives_progress_from_tasks() {
    let conn = open_db_in_memory().unwrap();
    let summary = seed_demo_data(&conn).unwrap();
    assert_eq!(summary.habits, 4);
    assert_eq!(summary.goals, 5);
    assert_eq!(summary.tasks, 14);
    assert_eq!(summary.challenges, 5);

    let snapshot = GrowthService::from_connection(&conn)
        .unwrap()
        .snapshot()
        .unwrap();
    assert_eq!(snapshot.goals.len(), 4);

    let book = &snapshot.goals[0];
    assert_eq!(book.goal.title, "Write a Book");
    assert_eq!(book.goal.progress, 33);
    assert_eq!(book.tasks.len(), 3);
    assert_eq!(book.subgoals.len(), 1);
    assert_eq!(book.subgoals[0].goal.title, "Read 24 Books This Year");
    assert_eq!(book.subgoals[0].goal.progress, 50);

    let progress: Vec<u8> = snapshot
        .goals
        .iter()
        .map(|node| node.goal.progress)
        .collect();
    assert_eq!(progress, vec![33, 67, 67, 33]);
}

#[test]
fn demo_layout_reflects_seeded_data() {
    let conn = open_db_in_memory().unwrap();
    seed_demo_data(&conn).unwrap();

    let layout = GrowthService::from_connection(&conn)
        .unwrap()
        .layout()
        .unwrap();

    // Streaks 5+3+7+1 and two completed habits.
    assert_eq!(layout.trunk.width, 84.0);
    assert_eq!(layout.trunk.height, 300.0);
    assert_eq!(layout.branches.len(), 4);
    assert_eq!(layout.branch_count(), 5);
    assert_eq!(layout.branches[0].side, Side::Left);
    assert_eq!(layout.branches[2].side, Side::Right);
    assert_eq!(layout.branches[0].subgoals.len(), 1);
    assert_eq!(layout.roots.len(), 5);
    assert_eq!(layout.roots.iter().filter(|root| root.grown).count(), 3);
}

#[test]
fn layout_tracks_store_changes() {
    let conn = open_db_in_memory().unwrap();
    let goals = GoalService::new(SqliteGoalRepository::try_new(&conn).unwrap());
    let habits = HabitService::new(SqliteHabitRepository::try_new(&conn).unwrap());
    let growth = GrowthService::from_connection(&conn).unwrap();

    let empty = growth.layout().unwrap();
    assert_eq!(empty.trunk.width, 20.0);
    assert_eq!(empty.trunk.height, 150.0);
    assert!(empty.branches.is_empty());

    let goal = goals.add_goal("Learn Spanish", None).unwrap();
    let task = goals.add_task("Complete first lesson", goal.id).unwrap();
    goals.complete_task(task.id).unwrap();
    let habit = habits.add_habit("Exercise").unwrap();
    habits.complete_habit(habit.id).unwrap();

    let layout = growth.layout().unwrap();
    assert_eq!(layout.trunk.width, 31.0);
    assert_eq!(layout.trunk.height, 195.0);
    assert_eq!(layout.branches[0].length, 140.0);
    assert!(layout.branches[0].leaves[0].grown);

    goals.delete_goal(goal.id).unwrap();
    assert!(growth.layout().unwrap().branches.is_empty());
}

#[test]
fn snapshot_serializes_nested_goals() {
    let conn = open_db_in_memory().unwrap();
    seed_demo_data(&conn).unwrap();
    let snapshot = GrowthService::from_connection(&conn)
        .unwrap()
        .snapshot()
        .unwrap();

    let json = serde_json::to_value(&snapshot).unwrap();
    let book = &json["goals"][0];
    assert_eq!(book["title"], "Write a Book");
    assert_eq!(book["progress"], 33);
    assert!(book["parent_id"].is_null());
    assert_eq!(book["subgoals"][0]["parent_id"], book["id"]);
    assert_eq!(book["tasks"].as_array().unwrap().len(), 3);
}
