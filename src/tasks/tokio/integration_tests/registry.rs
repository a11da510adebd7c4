use crate::tasks::{
    config::QueueConfig,
    control::{QueueControl, QueueStatusInfo},
    error::QueueError,
    registry::QueueRegistry,
    state::QueueState,
    tokio::integration_tests::helper::{
        echo_task, init_tracing, sleep_task, test_config, wait_for_process, wait_stopped,
    },
};

fn new_registry() -> QueueRegistry {
    init_tracing();
    QueueRegistry::init(test_config()).unwrap()
}

#[tokio::test]
async fn delete_running_queue_stops_it() {
    let registry = new_registry();
    registry.create_queue("busy").unwrap();
    let queue = registry.get_queue("busy").unwrap();
    queue.add_task(sleep_task(30)).unwrap();
    queue.add_task(echo_task("never")).unwrap();

    queue.start().unwrap();
    wait_for_process(&queue).await;

    registry.delete_queue("busy").unwrap();
    match registry.get_queue("busy") {
        Err(QueueError::NotFound(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }

    wait_stopped(&queue).await;
    assert_eq!(queue.get_state(), QueueState::Idle);
    assert_eq!(queue.list_finished().unwrap(), vec![0]);
    assert!(matches!(queue.list_pending(), Err(QueueError::Empty(_))));
}

#[tokio::test]
async fn renamed_queue_keeps_running() {
    let registry = new_registry();
    registry.create_queue("before").unwrap();
    let queue = registry.get_queue("before").unwrap();
    queue.add_task(sleep_task(30)).unwrap();
    queue.start().unwrap();
    wait_for_process(&queue).await;

    registry.rename_queue("before", "after").unwrap();
    let renamed = registry.get_queue("after").unwrap();
    assert_eq!(renamed.get_state(), QueueState::Running);
    assert_eq!(renamed.get_name(), "after");

    renamed.stop().unwrap();
    wait_stopped(&renamed).await;
}

#[tokio::test]
async fn shutdown_stops_every_queue() {
    let registry = new_registry();
    let mut handles = Vec::new();
    for name in ["a", "b"] {
        registry.create_queue(name).unwrap();
        let queue = registry.get_queue(name).unwrap();
        queue.add_task(sleep_task(30)).unwrap();
        queue.start().unwrap();
        wait_for_process(&queue).await;
        handles.push(queue);
    }

    tokio::time::timeout(crate::tasks::tokio::integration_tests::helper::WAIT, registry.shutdown())
        .await
        .expect("shutdown did not finish");

    for queue in &handles {
        assert_eq!(queue.get_state(), QueueState::Idle);
        assert_eq!(queue.get_process_id(), None);
    }
    assert!(matches!(registry.list_queues(), Err(QueueError::Empty(_))));
}

#[tokio::test]
async fn example_scenario_through_registry() {
    let registry = QueueRegistry::init(QueueConfig::new().poll_interval_ms(50)).unwrap();
    registry.create_queue("q1").unwrap();
    let queue = registry.get_queue("q1").unwrap();

    assert_eq!(queue.add_task(echo_task("hi")).unwrap(), 0);
    assert_eq!(
        queue
            .add_task(echo_task("lo").priority(crate::tasks::record::TaskPriority::Highest))
            .unwrap(),
        1
    );
    queue.start().unwrap();
    wait_stopped(&queue).await;

    assert_eq!(registry.get_queue("q1").unwrap().list_finished().unwrap(), vec![1, 0]);
    assert!(matches!(queue.list_pending(), Err(QueueError::Empty(_))));
}
