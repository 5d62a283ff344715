use rusqlite::params;

use pulse_heartbeat::{Category, EntityType};

use super::*;

fn heartbeat(entity: &str, time: f64) -> Heartbeat {
    Heartbeat {
        category: Category::Coding,
        entity: entity.to_string(),
        entity_type: EntityType::File,
        time,
        user_agent: "wakatime/0.1.0 (linux-5.0-x86_64) rust/1.82 plugin/0.0.1".to_string(),
        ..Default::default()
    }
}

fn temp_queue() -> (tempfile::TempDir, Queue) {
    let dir = tempfile::tempdir().unwrap();
    let queue = Queue::new(dir.path().join(QUEUE_FILE_NAME));
    (dir, queue)
}

#[test]
fn push_then_count() {
    let (_dir, queue) = temp_queue();

    queue
        .push_many(vec![heartbeat("a.go", 1.0), heartbeat("b.go", 2.0)])
        .unwrap();

    assert_eq!(queue.count().unwrap(), 2);
}

#[test]
fn pop_returns_fifo_prefix() {
    let (_dir, queue) = temp_queue();

    let pushed: Vec<_> = (0..5)
        .map(|i| heartbeat(&format!("file{i}.go"), i as f64))
        .collect();
    queue.push_many(pushed.clone()).unwrap();

    let first = queue.pop_many(3).unwrap();
    let entities: Vec<_> = first.iter().map(|h| h.entity.as_str()).collect();
    assert_eq!(entities, vec!["file0.go", "file1.go", "file2.go"]);

    let rest = queue.pop_many(10).unwrap();
    let entities: Vec<_> = rest.iter().map(|h| h.entity.as_str()).collect();
    assert_eq!(entities, vec!["file3.go", "file4.go"]);

    assert_eq!(queue.count().unwrap(), 0);
}

#[test]
fn fifo_survives_separate_pushes() {
    let (_dir, queue) = temp_queue();

    queue.push_many(vec![heartbeat("first.go", 1.0)]).unwrap();
    queue.push_many(vec![heartbeat("second.go", 2.0)]).unwrap();

    let popped = queue.pop_many(2).unwrap();
    assert_eq!(popped[0].entity, "first.go");
    assert_eq!(popped[1].entity, "second.go");
}

#[test]
fn pop_zero_is_noop() {
    let (_dir, queue) = temp_queue();
    queue.push_many(vec![heartbeat("a.go", 1.0)]).unwrap();

    assert!(queue.pop_many(0).unwrap().is_empty());
    assert_eq!(queue.count().unwrap(), 1);
}

#[test]
fn pop_on_empty_queue() {
    let (_dir, queue) = temp_queue();
    assert!(queue.pop_many(10).unwrap().is_empty());
    assert_eq!(queue.count().unwrap(), 0);
}

#[test]
fn roundtrips_all_fields_including_api_key() {
    let (_dir, queue) = temp_queue();

    let mut h = heartbeat("testdata/main.go", 1585598059.1);
    h.api_key = Some("00000000-0000-4000-8000-000000000001".to_string());
    h.branch = Some("main".to_string());
    h.project = Some("pulse".to_string());
    h.is_write = Some(true);
    h.line_number = Some(13);

    queue.push_many(vec![h.clone()]).unwrap();
    let popped = queue.pop_many(1).unwrap();

    assert_eq!(popped.len(), 1);
    assert_eq!(popped[0].api_key, h.api_key);
    assert_eq!(popped[0].branch, h.branch);
    assert_eq!(popped[0].project, h.project);
    assert_eq!(popped[0].time, h.time);
}

#[test]
fn local_context_is_not_persisted() {
    let (_dir, queue) = temp_queue();

    let mut h = heartbeat("testdata/main.go", 1585598059.1);
    h.local_file = Some("/tmp/copy.go".to_string());
    h.project_path = Some("/home/user/pulse".to_string());

    queue.push_many(vec![h]).unwrap();
    let popped = queue.pop_many(1).unwrap();

    assert!(popped[0].local_file.is_none());
    assert!(popped[0].project_path.is_none());
}

#[test]
fn poison_rows_are_skipped_and_deleted() {
    let (_dir, queue) = temp_queue();

    queue.push_many(vec![heartbeat("good.go", 2.0)]).unwrap();

    // inject an undecodable row that sorts before the good one
    let conn = rusqlite::Connection::open(queue.path()).unwrap();
    conn.execute(
        "INSERT INTO heartbeats (id, heartbeat) VALUES (?1, ?2)",
        params!["00000000000000000000-000000", "not json"],
    )
    .unwrap();
    drop(conn);

    let popped = queue.pop_many(1).unwrap();
    assert_eq!(popped.len(), 1);
    assert_eq!(popped[0].entity, "good.go");

    // the poison row is gone as well
    assert_eq!(queue.count().unwrap(), 0);
}

#[test]
fn queue_file_persists_across_handles() {
    let (_dir, queue) = temp_queue();
    queue.push_many(vec![heartbeat("a.go", 1.0)]).unwrap();

    let reopened = Queue::new(queue.path());
    assert_eq!(reopened.count().unwrap(), 1);
    assert_eq!(reopened.pop_many(1).unwrap()[0].entity, "a.go");
}
