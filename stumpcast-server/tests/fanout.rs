//! End-to-end delivery semantics: catch-up, fan-out, eviction, and cursor
//! accounting, driven through the same `Broadcaster` the WebSocket handler
//! uses, with plain channel receivers standing in for socket writer tasks.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use stumpcast_core::{CommentaryStore, ScoreDelta, ScoreState, SqliteCommentaryStore};
use stumpcast_server::broadcast::Broadcaster;
use stumpcast_server::infra::websocket::{Connection, ConnectionRegistry, CursorTracker};

struct Harness {
    store: Arc<SqliteCommentaryStore>,
    registry: Arc<ConnectionRegistry>,
    cursors: Arc<CursorTracker>,
    broadcaster: Broadcaster,
}

async fn harness() -> Harness {
    let store = SqliteCommentaryStore::in_memory().await.unwrap();
    store.init_schema().await.unwrap();
    let store = Arc::new(store);

    let cursors = Arc::new(CursorTracker::new());
    let registry = Arc::new(ConnectionRegistry::new(Arc::clone(&cursors)));
    let broadcaster = Broadcaster::new(
        store.clone(),
        Arc::clone(&registry),
        Arc::clone(&cursors),
    );

    Harness {
        store,
        registry,
        cursors,
        broadcaster,
    }
}

fn open_connection(registry: &ConnectionRegistry) -> (Arc<Connection>, mpsc::Receiver<String>) {
    let (tx, rx) = mpsc::channel(64);
    let connection = Arc::new(Connection::new(tx));
    registry.add(Arc::clone(&connection));
    (connection, rx)
}

async fn recv_line(rx: &mut mpsc::Receiver<String>) -> String {
    timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for delivery")
        .expect("connection channel closed")
}

#[tokio::test]
async fn fresh_connection_receives_full_backlog_in_order() {
    let h = harness().await;
    h.store
        .record("Four runs!", ScoreDelta::new(4, 0))
        .await
        .unwrap();
    h.store.record("OUT!", ScoreDelta::new(0, 1)).await.unwrap();

    let (connection, mut rx) = open_connection(&h.registry);
    h.broadcaster.deliver_pending(&connection).await;

    // Each item is shown with the score as of its own submission, not the
    // final score.
    assert_eq!(recv_line(&mut rx).await, "Score: 4/0<br>Four runs!");
    assert_eq!(recv_line(&mut rx).await, "Score: 4/1<br>OUT!");
    assert_eq!(
        h.store.score().await.unwrap(),
        ScoreState { runs: 4, wickets: 1 }
    );
}

#[tokio::test]
async fn catch_up_is_idempotent_once_delivered() {
    let h = harness().await;
    h.store.record("single", ScoreDelta::new(1, 0)).await.unwrap();
    h.store.record("dot", ScoreDelta::ZERO).await.unwrap();

    let (connection, mut rx) = open_connection(&h.registry);
    h.broadcaster.deliver_pending(&connection).await;
    h.broadcaster.deliver_pending(&connection).await;

    recv_line(&mut rx).await;
    recv_line(&mut rx).await;
    assert!(rx.try_recv().is_err(), "caught-up connection got a duplicate");

    let pending = h.broadcaster.resolve(connection.id).await.unwrap();
    assert!(pending.is_empty());
}

#[tokio::test]
async fn fan_out_reaches_every_connection_independently() {
    let h = harness().await;
    let (_conn_a, mut rx_a) = open_connection(&h.registry);
    let (_conn_b, mut rx_b) = open_connection(&h.registry);

    h.store
        .record("good length, defended", ScoreDelta::ZERO)
        .await
        .unwrap();
    h.broadcaster.fan_out();

    assert_eq!(recv_line(&mut rx_a).await, "Score: 0/0<br>good length, defended");
    assert_eq!(recv_line(&mut rx_b).await, "Score: 0/0<br>good length, defended");

    h.store
        .record("driven for two", ScoreDelta::new(2, 0))
        .await
        .unwrap();
    h.broadcaster.fan_out();

    assert_eq!(recv_line(&mut rx_a).await, "Score: 2/0<br>driven for two");
    assert_eq!(recv_line(&mut rx_b).await, "Score: 2/0<br>driven for two");
}

#[tokio::test]
async fn late_joiner_backfills_while_others_get_only_new_items() {
    let h = harness().await;
    let (conn_a, mut rx_a) = open_connection(&h.registry);
    h.broadcaster.deliver_pending(&conn_a).await;

    h.store.record("leg bye", ScoreDelta::new(1, 0)).await.unwrap();
    h.broadcaster.fan_out();
    assert_eq!(recv_line(&mut rx_a).await, "Score: 1/0<br>leg bye");

    let (conn_b, mut rx_b) = open_connection(&h.registry);
    h.broadcaster.deliver_pending(&conn_b).await;
    assert_eq!(recv_line(&mut rx_b).await, "Score: 1/0<br>leg bye");

    h.store.record("big appeal", ScoreDelta::ZERO).await.unwrap();
    h.broadcaster.fan_out();

    assert_eq!(recv_line(&mut rx_a).await, "Score: 1/0<br>big appeal");
    assert_eq!(recv_line(&mut rx_b).await, "Score: 1/0<br>big appeal");
    assert!(rx_a.try_recv().is_err(), "existing connection was re-sent history");
}

#[tokio::test]
async fn closed_connection_is_evicted_without_failing_others() {
    let h = harness().await;
    let (conn_a, rx_a) = open_connection(&h.registry);
    let (conn_b, mut rx_b) = open_connection(&h.registry);

    // Simulate the client vanishing mid-broadcast.
    drop(rx_a);

    h.store
        .record("chipped to mid-on", ScoreDelta::new(0, 1))
        .await
        .unwrap();
    h.broadcaster.deliver_pending(&conn_a).await;
    h.broadcaster.deliver_pending(&conn_b).await;

    assert!(!h.registry.contains(conn_a.id));
    assert_eq!(h.registry.len(), 1);
    assert_eq!(recv_line(&mut rx_b).await, "Score: 0/1<br>chipped to mid-on");

    // Later submissions keep flowing to the survivors.
    h.store.record("new batter in", ScoreDelta::ZERO).await.unwrap();
    h.broadcaster.fan_out();
    assert_eq!(recv_line(&mut rx_b).await, "Score: 0/1<br>new batter in");
}

#[tokio::test]
async fn concurrent_submissions_stay_ordered_per_connection() {
    let h = harness().await;
    let (_connection, mut rx) = open_connection(&h.registry);

    let submit_a = {
        let store = Arc::clone(&h.store);
        let broadcaster = h.broadcaster.clone();
        tokio::spawn(async move {
            store
                .record("boundary", ScoreDelta::new(4, 0))
                .await
                .unwrap();
            broadcaster.fan_out();
        })
    };
    let submit_b = {
        let store = Arc::clone(&h.store);
        let broadcaster = h.broadcaster.clone();
        tokio::spawn(async move {
            store.record("bowled him", ScoreDelta::new(0, 1)).await.unwrap();
            broadcaster.fan_out();
        })
    };
    submit_a.await.unwrap();
    submit_b.await.unwrap();

    // Whatever the interleaving, delivery follows store id order with no
    // duplicates and the score is the sum of both deltas.
    let items = h.store.list_since(0).await.unwrap();
    assert_eq!(items.len(), 2);
    assert!(items[0].id < items[1].id);

    let first = recv_line(&mut rx).await;
    let second = recv_line(&mut rx).await;
    assert_eq!(first, items[0].display_line());
    assert_eq!(second, items[1].display_line());
    assert!(rx.try_recv().is_err(), "connection received a duplicate item");

    assert_eq!(
        h.store.score().await.unwrap(),
        ScoreState { runs: 4, wickets: 1 }
    );
}

#[tokio::test]
async fn cursors_follow_confirmed_delivery() {
    let h = harness().await;
    let (connection, mut rx) = open_connection(&h.registry);

    let first = h.store.record("one", ScoreDelta::new(1, 0)).await.unwrap();
    let second = h.store.record("two", ScoreDelta::new(1, 0)).await.unwrap();
    assert_eq!(h.cursors.get(connection.id), 0);

    h.broadcaster.deliver_pending(&connection).await;
    recv_line(&mut rx).await;
    recv_line(&mut rx).await;

    assert!(first.id < second.id);
    assert_eq!(h.cursors.get(connection.id), second.id);

    h.registry.remove(connection.id);
    assert_eq!(h.cursors.get(connection.id), 0);
    assert!(h.cursors.is_empty());
}
