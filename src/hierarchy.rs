//! Parent/child forest queries and structural edits.
//!
//! Every function here takes the task collection by reference and, when it
//! changes anything, returns a new collection. Nothing is mutated in place,
//! so a rejected edit leaves the caller's collection untouched.
//!
//! Traversals use explicit worklists over a `parent id -> child positions`
//! index built once per call, and track visited positions so that malformed
//! (cyclic) input still terminates.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use crate::error::{Result, ScheduleError};
use crate::fields::Level;
use crate::task::Task;

/// Map each parent id to the positions of its children, in collection order.
pub fn build_children_index(tasks: &[Task]) -> HashMap<&str, Vec<usize>> {
    let mut map: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, t) in tasks.iter().enumerate() {
        if let Some(p) = t.parent_id.as_deref() {
            map.entry(p).or_default().push(i);
        }
    }
    map
}

fn position_of(tasks: &[Task], id: &str) -> Option<usize> {
    tasks.iter().position(|t| t.id == id)
}

/// Depth-first, pre-order list of the tasks matching `filter`.
///
/// A matching task is a root when it has no parent or its parent did not
/// match. Children of a task are only visited when the task is expanded.
pub fn flatten<F>(tasks: &[Task], filter: F) -> Vec<&Task>
where
    F: Fn(&Task) -> bool,
{
    let matched: Vec<usize> = (0..tasks.len()).filter(|&i| filter(&tasks[i])).collect();
    let present: HashSet<&str> = matched.iter().map(|&i| tasks[i].id.as_str()).collect();

    let mut children: HashMap<&str, Vec<usize>> = HashMap::new();
    let mut roots = Vec::new();
    for &i in &matched {
        let task = &tasks[i];
        match task.parent_id.as_deref() {
            Some(p) if p != task.id && present.contains(p) => children.entry(p).or_default().push(i),
            _ => roots.push(i),
        }
    }

    let mut out = Vec::with_capacity(matched.len());
    let mut visited = vec![false; tasks.len()];
    let mut stack: Vec<usize> = roots.into_iter().rev().collect();
    while let Some(i) = stack.pop() {
        if visited[i] {
            continue;
        }
        visited[i] = true;
        let task = &tasks[i];
        out.push(task);
        if task.expanded() {
            if let Some(kids) = children.get(task.id.as_str()) {
                stack.extend(kids.iter().rev().copied());
            }
        }
    }
    out
}

/// Case-insensitive name substring predicate for `flatten`.
pub fn name_filter(query: &str) -> impl Fn(&Task) -> bool {
    let needle = query.to_lowercase();
    move |t: &Task| t.name.to_lowercase().contains(&needle)
}

/// Ids of every task reachable below `root_id`, breadth first, without duplicates.
pub fn descendant_ids<'a>(tasks: &'a [Task], root_id: &str) -> Vec<&'a str> {
    let index = build_children_index(tasks);
    let mut seen = vec![false; tasks.len()];
    let mut out = Vec::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    queue.push_back(root_id);
    while let Some(pid) = queue.pop_front() {
        let Some(kids) = index.get(pid) else { continue };
        for &k in kids {
            if !seen[k] {
                seen[k] = true;
                let id = tasks[k].id.as_str();
                out.push(id);
                queue.push_back(id);
            }
        }
    }
    out
}

/// True if `candidate_id` lies in the subtree below `ancestor_id`.
pub fn is_descendant(tasks: &[Task], ancestor_id: &str, candidate_id: &str) -> bool {
    descendant_ids(tasks, ancestor_id)
        .iter()
        .any(|id| *id == candidate_id)
}

/// Ids to remove when deleting `task_id`: the task and all of its descendants.
pub fn cascade_delete(tasks: &[Task], task_id: &str) -> HashSet<String> {
    let mut ids: HashSet<String> = descendant_ids(tasks, task_id)
        .into_iter()
        .map(str::to_string)
        .collect();
    ids.insert(task_id.to_string());
    ids
}

/// Move `task_id` under `new_parent_id`.
///
/// Rejected when the target is the task itself or lies inside the task's own
/// subtree. On success the task takes the level below its new parent and the
/// levels of its descendants are recomputed down the moved subtree.
pub fn reparent(tasks: &[Task], task_id: &str, new_parent_id: &str) -> Result<Vec<Task>> {
    if task_id == new_parent_id {
        return Err(ScheduleError::SelfParent(task_id.to_string()));
    }
    let pos = position_of(tasks, task_id)
        .ok_or_else(|| ScheduleError::TaskNotFound(task_id.to_string()))?;
    let parent_level = tasks
        .iter()
        .find(|t| t.id == new_parent_id)
        .map(|t| t.level)
        .ok_or_else(|| ScheduleError::TaskNotFound(new_parent_id.to_string()))?;
    if is_descendant(tasks, task_id, new_parent_id) {
        return Err(ScheduleError::CyclicReparent {
            task: task_id.to_string(),
            target: new_parent_id.to_string(),
        });
    }

    let mut next = tasks.to_vec();
    next[pos].parent_id = Some(new_parent_id.to_string());
    let level = parent_level.next();
    next[pos].level = level;
    relevel_subtree(&mut next, pos);
    debug!(task_id, parent_id = new_parent_id, %level, "Task reparented");
    Ok(next)
}

/// Make `task_id` a root Workphase, re-levelling its subtree.
pub fn detach(tasks: &[Task], task_id: &str) -> Result<Vec<Task>> {
    let pos = position_of(tasks, task_id)
        .ok_or_else(|| ScheduleError::TaskNotFound(task_id.to_string()))?;
    let mut next = tasks.to_vec();
    next[pos].parent_id = None;
    next[pos].level = Level::Workphase;
    relevel_subtree(&mut next, pos);
    debug!(task_id, "Task detached to root");
    Ok(next)
}

fn relevel_subtree(tasks: &mut [Task], root: usize) {
    let index: HashMap<String, Vec<usize>> = build_children_index(tasks)
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    let mut seen = vec![false; tasks.len()];
    seen[root] = true;
    let mut queue = VecDeque::from([root]);
    while let Some(pos) = queue.pop_front() {
        let child_level = tasks[pos].level.next();
        let kids = index.get(tasks[pos].id.as_str()).cloned().unwrap_or_default();
        for k in kids {
            if !seen[k] {
                seen[k] = true;
                tasks[k].level = child_level;
                queue.push_back(k);
            }
        }
    }
}

/// Parent chain of a task, nearest first.
pub fn ancestors<'a>(tasks: &'a [Task], task_id: &str) -> Vec<&'a Task> {
    let mut chain: Vec<&Task> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    seen.insert(task_id);
    let mut current = tasks.iter().find(|t| t.id == task_id);
    while let Some(pid) = current.and_then(|t| t.parent_id.as_deref()) {
        if !seen.insert(pid) {
            break; // cycle guard
        }
        current = tasks.iter().find(|t| t.id == pid);
        if let Some(parent) = current {
            chain.push(parent);
        }
    }
    chain
}

/// Number of ancestors present in the collection.
pub fn depth_of(tasks: &[Task], task_id: &str) -> usize {
    ancestors(tasks, task_id).len()
}

pub fn has_children(tasks: &[Task], task_id: &str) -> bool {
    tasks.iter().any(|t| t.parent_id.as_deref() == Some(task_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn task(id: &str, parent: Option<&str>, level: Level) -> Task {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut t = Task::new(format!("Task {id}"), level, day, day).with_id(id);
        t.parent_id = parent.map(str::to_string);
        t
    }

    fn ids(v: &[&Task]) -> Vec<String> {
        v.iter().map(|t| t.id.clone()).collect()
    }

    fn chain() -> Vec<Task> {
        vec![
            task("a", None, Level::Workphase),
            task("b", Some("a"), Level::Mainwork),
            task("c", Some("b"), Level::InWork),
            task("d", Some("c"), Level::Subwork),
            task("e", None, Level::Workphase),
        ]
    }

    #[test]
    fn test_flatten_preorder_by_collection_order() {
        let tasks = vec![
            task("r1", None, Level::Workphase),
            task("r2", None, Level::Workphase),
            task("c2", Some("r1"), Level::Mainwork),
            task("c1", Some("r1"), Level::Mainwork),
            task("g", Some("c2"), Level::InWork),
        ];
        let out = flatten(&tasks, |_| true);
        assert_eq!(ids(&out), vec!["r1", "c2", "g", "c1", "r2"]);
    }

    #[test]
    fn test_flatten_filtered_child_becomes_root() {
        let tasks = chain();
        let out = flatten(&tasks, |t| t.id != "b");
        assert_eq!(ids(&out), vec!["a", "c", "d", "e"]);
    }

    #[test]
    fn test_flatten_terminates_on_cycle() {
        let mut tasks = chain();
        tasks[0].parent_id = Some("d".into());
        let out = flatten(&tasks, |_| true);
        // a..d form a loop with no root; only e is reachable
        assert_eq!(ids(&out), vec!["e"]);

        let mut tasks = chain();
        tasks[0].parent_id = Some("a".into());
        let out = flatten(&tasks, |_| true);
        assert_eq!(ids(&out), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_name_filter_is_case_insensitive() {
        let f = name_filter("TASK B");
        assert!(f(&task("b", None, Level::Workphase)));
        assert!(!f(&task("c", None, Level::Workphase)));
    }

    #[test]
    fn test_is_descendant_direction() {
        let tasks = chain();
        assert!(is_descendant(&tasks, "a", "d"));
        assert!(!is_descendant(&tasks, "d", "a"));
        assert!(!is_descendant(&tasks, "a", "a"));
        assert!(!is_descendant(&tasks, "a", "e"));
    }

    #[test]
    fn test_reparent_rejects_self_and_cycles() {
        let tasks = chain();
        assert!(matches!(reparent(&tasks, "a", "a"), Err(ScheduleError::SelfParent(_))));
        assert!(matches!(
            reparent(&tasks, "a", "c"),
            Err(ScheduleError::CyclicReparent { .. })
        ));
        assert!(matches!(reparent(&tasks, "a", "zz"), Err(ScheduleError::TaskNotFound(_))));
    }

    #[test]
    fn test_reparent_relevels_subtree() {
        let tasks = chain();
        let next = reparent(&tasks, "b", "e").unwrap();
        let get = |id: &str| next.iter().find(|t| t.id == id).unwrap();
        assert_eq!(get("b").parent_id.as_deref(), Some("e"));
        assert_eq!(get("b").level, Level::Mainwork);

        let next = reparent(&tasks, "e", "d").unwrap();
        let e = next.iter().find(|t| t.id == "e").unwrap();
        assert_eq!(e.level, Level::Subwork);

        let next = reparent(&tasks, "c", "e").unwrap();
        let get = |id: &str| next.iter().find(|t| t.id == id).unwrap();
        assert_eq!(get("c").level, Level::Mainwork);
        assert_eq!(get("d").level, Level::InWork);
    }

    #[test]
    fn test_detach_makes_workphase_root() {
        let tasks = chain();
        let next = detach(&tasks, "c").unwrap();
        let get = |id: &str| next.iter().find(|t| t.id == id).unwrap();
        assert!(get("c").is_root());
        assert_eq!(get("c").level, Level::Workphase);
        assert_eq!(get("d").level, Level::Mainwork);
    }

    #[test]
    fn test_cascade_delete_collects_subtree_only() {
        let tasks = chain();
        let ids = cascade_delete(&tasks, "b");
        let expected: HashSet<String> = ["b", "c", "d"].iter().map(|s| s.to_string()).collect();
        assert_eq!(ids, expected);

        let leaf = cascade_delete(&tasks, "e");
        assert_eq!(leaf.len(), 1);
    }

    #[test]
    fn test_ancestors_and_depth() {
        let tasks = chain();
        assert_eq!(ids(&ancestors(&tasks, "d")), vec!["c", "b", "a"]);
        assert_eq!(depth_of(&tasks, "a"), 0);
        assert_eq!(depth_of(&tasks, "d"), 3);
        assert!(has_children(&tasks, "c"));
        assert!(!has_children(&tasks, "d"));
    }
}
