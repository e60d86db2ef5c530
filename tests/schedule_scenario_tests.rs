use chrono::NaiveDate;
use workhand::assistant::{self, ToolOutcome};
use workhand::gesture::{DragController, DragMode};
use workhand::hierarchy::{cascade_delete, flatten, reparent};
use workhand::store::{JsonFileStore, MemoryStore, TaskStore, STORAGE_KEY};
use workhand::timeline::DAY_WIDTH;
use workhand::{Database, Level, ScheduleError, Status, Task};

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn foundation_plan() -> Database {
    let mut db = Database::default();
    let root = Task::new("Foundation", Level::Workphase, d("2024-01-01"), d("2024-01-10")).with_id("1");
    let mut child = Task::new("Excavation", Level::Mainwork, d("2024-01-03"), d("2024-01-05")).with_id("2");
    child.parent_id = Some("1".into());
    db.add(root).unwrap();
    db.add(child).unwrap();
    db
}

fn ids(tasks: &[&Task]) -> Vec<String> {
    tasks.iter().map(|t| t.id.clone()).collect()
}

#[test]
fn flatten_collapse_and_cascade_scenario() {
    let mut db = foundation_plan();
    assert_eq!(db.tasks[0].status, Status::InProgress);
    assert_eq!(ids(&flatten(&db.tasks, |_| true)), vec!["1", "2"]);

    db.toggle_expanded("1").unwrap();
    assert_eq!(ids(&flatten(&db.tasks, |_| true)), vec!["1"]);

    let removed = cascade_delete(&db.tasks, "1");
    let mut removed: Vec<String> = removed.into_iter().collect();
    removed.sort();
    assert_eq!(removed, vec!["1", "2"]);
}

#[test]
fn rejected_reparent_leaves_state_untouched() {
    let mut db = foundation_plan();
    let before = db.clone();

    let err = reparent(&db.tasks, "1", "2").unwrap_err();
    assert!(matches!(err, ScheduleError::CyclicReparent { .. }));
    assert!(err.is_structural());

    let err = db.reparent("1", "2").unwrap_err();
    assert!(err.is_structural());
    assert_eq!(db, before);
    assert_eq!(db.len(), 2);
    assert!(db.get("1").unwrap().parent_id.is_none());
}

#[test]
fn drag_commit_flows_through_update_path() {
    let mut db = foundation_plan();
    let mut gesture = DragController::new(DAY_WIDTH);
    let task = db.get("2").unwrap().clone();
    gesture.begin(&task, DragMode::ResizeEnd, 200.0);
    gesture.pointer_moved(200.0 + DAY_WIDTH);
    gesture.pointer_moved(200.0 + 3.0 * DAY_WIDTH);
    // nothing is stored until the pointer is released
    assert_eq!(db.get("2").unwrap().end_date, d("2024-01-05"));

    let commit = gesture.end().unwrap();
    db.set_dates(&commit.task_id, commit.range).unwrap();
    assert_eq!(db.get("2").unwrap().end_date, d("2024-01-08"));
    assert_eq!(db.get("2").unwrap().start_date, d("2024-01-03"));
}

#[test]
fn drag_released_at_origin_stores_nothing() {
    let store = MemoryStore::new();
    store.persist(&foundation_plan()).unwrap();
    let saved = store.raw();

    let mut db = store.load();
    let mut gesture = DragController::new(DAY_WIDTH);
    let task = db.get("2").unwrap().clone();
    gesture.begin(&task, DragMode::Move, 0.0);
    gesture.pointer_moved(2.0 * DAY_WIDTH);
    gesture.pointer_moved(0.0);
    if let Some(commit) = gesture.end() {
        db.set_dates(&commit.task_id, commit.range).unwrap();
        store.persist(&db).unwrap();
    }

    assert_eq!(store.raw(), saved);
    assert_eq!(store.load().get("2").unwrap().range(), task.range());
}

#[test]
fn assistant_operations_persist_through_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join(STORAGE_KEY));
    let mut db = store.load();
    assert!(db.is_empty());

    let outcome = assistant::dispatch(
        &mut db,
        "addTask",
        serde_json::json!({
            "name": "Plumbing",
            "level": "Workphase",
            "startDate": "2024-03-01",
            "endDate": "2024-03-20",
            "agency": "Acme Corp"
        }),
    );
    assert!(outcome.is_success(), "{outcome}");
    store.persist(&db).unwrap();

    let mut reloaded = store.load();
    assert_eq!(reloaded, db);
    let outcome = assistant::dispatch(
        &mut reloaded,
        "updateTask",
        serde_json::json!({"id": "plumb", "updates": {"status": "Delay", "delayReason": "Permit pending"}}),
    );
    assert_eq!(outcome, ToolOutcome::Updated { name: "Plumbing".into() });
    assert_eq!(reloaded.tasks[0].delay_reason.as_deref(), Some("Permit pending"));
    assert_eq!(reloaded.tasks[0].agency, "Acme Corp");
}

#[test]
fn reparent_across_trees_relevels_moved_subtree() {
    let mut db = foundation_plan();
    let framing = Task::new("Framing", Level::Workphase, d("2024-02-01"), d("2024-02-20")).with_id("3");
    let walls = Task::child_of(&framing, "Walls", d("2024-02-02"), d("2024-02-08")).with_id("4");
    db.add(framing).unwrap();
    db.add(walls).unwrap();

    db.reparent("3", "2").unwrap();
    assert_eq!(db.get("3").unwrap().level, Level::InWork);
    assert_eq!(db.get("4").unwrap().level, Level::Subwork);
    assert_eq!(ids(&db.visible("")), vec!["1", "2", "3", "4"]);

    db.reparent("4", "1").unwrap();
    assert_eq!(db.get("4").unwrap().level, Level::Mainwork);
    assert_eq!(ids(&db.visible("")), vec!["1", "2", "3", "4"]);
}
