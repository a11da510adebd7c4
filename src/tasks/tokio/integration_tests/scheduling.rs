use crate::tasks::{
    control::QueueControl,
    error::QueueError,
    record::TaskPriority,
    tokio::integration_tests::helper::{echo_task, exit_task, new_queue, wait_stopped},
};

#[tokio::test]
async fn highest_priority_runs_first() {
    let queue = new_queue("q1");
    let normal = queue.add_task(echo_task("hi")).unwrap();
    let highest = queue
        .add_task(echo_task("lo").priority(TaskPriority::Highest))
        .unwrap();
    assert_eq!((normal, highest), (0, 1));

    queue.start().unwrap();
    wait_stopped(&queue).await;

    assert_eq!(queue.list_finished().unwrap(), vec![1, 0]);
    match queue.list_pending() {
        Err(QueueError::Empty(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn drains_all_pending_tasks() {
    let queue = new_queue("drain");
    for i in 0..5 {
        queue.add_task(echo_task(&format!("task {}", i))).unwrap();
    }

    queue.start().unwrap();
    wait_stopped(&queue).await;

    assert_eq!(queue.list_finished().unwrap(), vec![0, 1, 2, 3, 4]);
    assert!(matches!(queue.list_pending(), Err(QueueError::Empty(_))));
    for id in 0..5 {
        let record = queue.finished_details(id).unwrap();
        assert!(record.succeeded, "task {} failed: {:?}", id, record);
        assert_eq!(record.exit_code, 0);
    }
}

#[tokio::test]
async fn mixed_priorities_complete_in_rank_order() {
    let queue = new_queue("ranks");
    queue.add_task(echo_task("low").priority(TaskPriority::Lowest)).unwrap();
    queue.add_task(echo_task("normal")).unwrap();
    queue.add_task(echo_task("above").priority(TaskPriority::AboveNormal)).unwrap();
    queue.add_task(echo_task("below").priority(TaskPriority::BelowNormal)).unwrap();
    queue.add_task(echo_task("normal 2")).unwrap();

    queue.start().unwrap();
    wait_stopped(&queue).await;

    assert_eq!(queue.list_finished().unwrap(), vec![2, 1, 4, 3, 0]);
}

#[tokio::test]
async fn records_exit_code() {
    let queue = new_queue("exit");
    let id = queue.add_task(exit_task(3)).unwrap();

    queue.start().unwrap();
    wait_stopped(&queue).await;

    let record = queue.finished_details(id).unwrap();
    assert_eq!(record.exit_code, 3);
    assert!(!record.succeeded);
}

#[tokio::test]
async fn spawn_failure_does_not_abort_queue() {
    let queue = new_queue("spawn_fail");
    let missing = queue
        .add_task(
            crate::tasks::record::TaskRecord::new("stq-definitely-missing-binary")
                .priority(TaskPriority::Highest),
        )
        .unwrap();
    let ok = queue.add_task(echo_task("still runs")).unwrap();

    queue.start().unwrap();
    wait_stopped(&queue).await;

    assert_eq!(queue.list_finished().unwrap(), vec![missing, ok]);
    let failed = queue.finished_details(missing).unwrap();
    assert!(!failed.succeeded);
    assert_eq!(failed.exit_code, -1);
    assert_eq!(failed.id, missing);
    assert_eq!(failed.exec_name, "stq-definitely-missing-binary");
    assert!(queue.finished_details(ok).unwrap().succeeded);
}

#[tokio::test]
async fn runs_in_work_dir() {
    let dir = std::env::temp_dir().join(format!("stq-workdir-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("marker.txt"), "x").unwrap();

    #[cfg(windows)]
    let record = crate::tasks::record::TaskRecord::new("cmd")
        .args(["/C", "if exist marker.txt (exit 0) else (exit 1)"]);
    #[cfg(unix)]
    let record = crate::tasks::record::TaskRecord::new("sh").args(["-c", "test -f marker.txt"]);

    let queue = new_queue("work_dir");
    let inside = queue
        .add_task(record.clone().work_dir(dir.to_string_lossy()))
        .unwrap();
    let missing_dir = queue
        .add_task(record.work_dir(dir.join("missing").to_string_lossy()))
        .unwrap();

    queue.start().unwrap();
    wait_stopped(&queue).await;

    assert!(queue.finished_details(inside).unwrap().succeeded);
    // A missing working directory is a spawn failure
    assert!(!queue.finished_details(missing_dir).unwrap().succeeded);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn queue_restarts_after_draining() {
    let queue = new_queue("restart");
    queue.add_task(echo_task("first")).unwrap();
    queue.start().unwrap();
    wait_stopped(&queue).await;

    queue.add_task(echo_task("second")).unwrap();
    queue.start().unwrap();
    wait_stopped(&queue).await;

    assert_eq!(queue.list_finished().unwrap(), vec![0, 1]);
}
