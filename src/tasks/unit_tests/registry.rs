use std::sync::Arc;

use crate::tasks::{
    config::QueueConfig, control::QueueStatusInfo, error::QueueError, registry::QueueRegistry,
    state::QueueState,
};

fn new_registry() -> QueueRegistry {
    QueueRegistry::init(QueueConfig::new().poll_interval_ms(20)).unwrap()
}

#[test]
fn init_requires_runtime() {
    match QueueRegistry::init(QueueConfig::default()) {
        Err(QueueError::InvalidState(_)) => {}
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn init_rejects_invalid_config() {
    match QueueRegistry::init(QueueConfig::new().relay_capacity(0)) {
        Err(QueueError::InvalidConfiguration(_)) => {}
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }
}

#[test]
fn with_runtime_outside_async_context() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap();
    let registry = QueueRegistry::with_runtime(QueueConfig::default(), runtime.handle().clone())
        .unwrap();
    registry.create_queue("q1").unwrap();
    assert_eq!(registry.list_queues().unwrap(), vec!["q1".to_string()]);
    drop(registry);
}

#[tokio::test]
async fn create_and_list() {
    let registry = new_registry();
    match registry.list_queues() {
        Err(QueueError::Empty(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }

    registry.create_queue("b").unwrap();
    registry.create_queue("a").unwrap();
    assert_eq!(
        registry.list_queues().unwrap(),
        vec!["a".to_string(), "b".to_string()]
    );
}

#[tokio::test]
async fn create_duplicate() {
    let registry = new_registry();
    registry.create_queue("q1").unwrap();
    match registry.create_queue("q1") {
        Err(QueueError::AlreadyExists(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn get_returns_live_queue() {
    let registry = new_registry();
    registry.create_queue("q1").unwrap();

    let first = registry.get_queue("q1").unwrap();
    let second = registry.get_queue("q1").unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    first.add_task(crate::tasks::record::TaskRecord::new("a")).unwrap();
    assert_eq!(second.list_pending().unwrap(), vec![0]);

    match registry.get_queue("missing") {
        Err(QueueError::NotFound(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn rename_moves_queue() {
    let registry = new_registry();
    registry.create_queue("old").unwrap();
    let handle = registry.get_queue("old").unwrap();

    registry.rename_queue("old", "new").unwrap();
    assert!(matches!(registry.get_queue("old"), Err(QueueError::NotFound(_))));
    let renamed = registry.get_queue("new").unwrap();
    assert!(Arc::ptr_eq(&handle, &renamed));
    assert_eq!(renamed.get_name(), "new");
}

#[tokio::test]
async fn rename_to_existing_changes_nothing() {
    let registry = new_registry();
    registry.create_queue("src").unwrap();
    registry.create_queue("dst").unwrap();
    registry
        .get_queue("src")
        .unwrap()
        .add_task(crate::tasks::record::TaskRecord::new("a"))
        .unwrap();

    match registry.rename_queue("src", "dst") {
        Err(QueueError::AlreadyExists(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }

    let src = registry.get_queue("src").unwrap();
    assert_eq!(src.get_name(), "src");
    assert_eq!(src.list_pending().unwrap(), vec![0]);
    assert!(matches!(
        registry.get_queue("dst").unwrap().list_pending(),
        Err(QueueError::Empty(_))
    ));
}

#[tokio::test]
async fn rename_unknown() {
    let registry = new_registry();
    match registry.rename_queue("missing", "other") {
        Err(QueueError::NotFound(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn delete_idle_queue() {
    let registry = new_registry();
    registry.create_queue("q1").unwrap();
    let handle = registry.get_queue("q1").unwrap();

    registry.delete_queue("q1").unwrap();
    assert!(matches!(registry.get_queue("q1"), Err(QueueError::NotFound(_))));
    assert_eq!(handle.get_state(), QueueState::Idle);

    match registry.delete_queue("q1") {
        Err(QueueError::NotFound(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn shutdown_empties_registry() {
    let registry = new_registry();
    registry.create_queue("a").unwrap();
    registry.create_queue("b").unwrap();

    registry.shutdown().await;
    assert!(matches!(registry.list_queues(), Err(QueueError::Empty(_))));
}
