use crate::tasks::{
    error::QueueError,
    record::{TaskPriority, TaskRecord},
    scheduler::PriorityScheduler,
};

fn record(priority: TaskPriority) -> TaskRecord {
    TaskRecord::new("echo").priority(priority)
}

#[test]
fn ids_increase_from_zero() {
    let mut scheduler = PriorityScheduler::new();
    assert_eq!(scheduler.push(record(TaskPriority::Normal)), Ok(0));
    assert_eq!(scheduler.push(record(TaskPriority::Normal)), Ok(1));
    assert_eq!(scheduler.push(record(TaskPriority::Highest)), Ok(2));
    assert_eq!(scheduler.len(), 3);
}

#[test]
fn ids_not_reused_after_remove_or_clear() {
    let mut scheduler = PriorityScheduler::new();
    let first = scheduler.push(record(TaskPriority::Normal)).unwrap();
    assert!(scheduler.remove(first).is_some());
    assert_eq!(scheduler.push(record(TaskPriority::Normal)), Ok(1));

    scheduler.clear();
    assert!(scheduler.is_empty());
    assert_eq!(scheduler.push(record(TaskPriority::Normal)), Ok(2));
}

#[test]
fn default_starts_at_zero() {
    let mut scheduler = PriorityScheduler::default();
    assert_eq!(scheduler.push(record(TaskPriority::Lowest)), Ok(0));
}

#[test]
fn pops_by_rank() {
    let mut scheduler = PriorityScheduler::new();
    for priority in [
        TaskPriority::Lowest,
        TaskPriority::Normal,
        TaskPriority::Highest,
        TaskPriority::BelowNormal,
        TaskPriority::AboveNormal,
    ] {
        scheduler.push(record(priority)).unwrap();
    }

    let order: Vec<TaskPriority> = std::iter::from_fn(|| scheduler.pop())
        .map(|r| r.priority)
        .collect();
    assert_eq!(
        order,
        vec![
            TaskPriority::Highest,
            TaskPriority::AboveNormal,
            TaskPriority::Normal,
            TaskPriority::BelowNormal,
            TaskPriority::Lowest,
        ]
    );
}

#[test]
fn equal_rank_is_first_come_first_served() {
    let mut scheduler = PriorityScheduler::new();
    for _ in 0..10 {
        scheduler.push(record(TaskPriority::Normal)).unwrap();
    }
    scheduler.push(record(TaskPriority::Highest)).unwrap();

    let ids: Vec<u32> = std::iter::from_fn(|| scheduler.pop()).map(|r| r.id).collect();
    assert_eq!(ids, vec![10, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
}

#[test]
fn ids_lists_dequeue_order_without_popping() {
    let mut scheduler = PriorityScheduler::new();
    scheduler.push(record(TaskPriority::Normal)).unwrap();
    scheduler.push(record(TaskPriority::Highest)).unwrap();
    scheduler.push(record(TaskPriority::Normal)).unwrap();

    assert_eq!(scheduler.ids(), vec![1, 0, 2]);
    assert_eq!(scheduler.len(), 3);
}

#[test]
fn push_overwrites_outcome_fields() {
    let mut scheduler = PriorityScheduler::new();
    let mut submitted = record(TaskPriority::Normal);
    submitted.id = 42;
    submitted.exit_code = 9;
    submitted.succeeded = true;

    let id = scheduler.push(submitted).unwrap();
    let stored = scheduler.get(id).unwrap();
    assert_eq!(stored.id, 0);
    assert_eq!(stored.exit_code, 0);
    assert!(!stored.succeeded);
}

#[test]
fn remove_unknown_id() {
    let mut scheduler = PriorityScheduler::new();
    scheduler.push(record(TaskPriority::Normal)).unwrap();
    assert!(scheduler.remove(5).is_none());
    assert_eq!(scheduler.len(), 1);
}

#[test]
fn remove_keeps_heap_order() {
    let mut scheduler = PriorityScheduler::new();
    let low = scheduler.push(record(TaskPriority::Lowest)).unwrap();
    let high = scheduler.push(record(TaskPriority::Highest)).unwrap();
    let normal = scheduler.push(record(TaskPriority::Normal)).unwrap();

    assert_eq!(scheduler.remove(high).map(|r| r.id), Some(high));
    assert_eq!(scheduler.pop().map(|r| r.id), Some(normal));
    assert_eq!(scheduler.pop().map(|r| r.id), Some(low));
    assert!(scheduler.pop().is_none());
}

#[test]
fn exhausted_id_space() {
    let mut scheduler = PriorityScheduler::starting_at(u32::MAX);
    assert_eq!(scheduler.push(record(TaskPriority::Normal)), Ok(u32::MAX));
    match scheduler.push(record(TaskPriority::Normal)) {
        Err(QueueError::Internal(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(scheduler.len(), 1);
}
