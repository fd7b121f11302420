mod common;

use common::{MockTransport, page_payload};
use kodegen_tools_instantsearch::search_events::*;
use kodegen_tools_instantsearch::{QueryState, RequestKind, SearchTransport, Searcher, SequenceNumber};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

async fn next_event(receiver: &mut tokio::sync::broadcast::Receiver<SearchEvent>) -> SearchEvent {
    match timeout(Duration::from_millis(500), receiver.recv()).await {
        Ok(Ok(event)) => event,
        Ok(Err(e)) => panic!("Failed to receive event: {e}"),
        Err(_) => panic!("Timeout waiting for event"),
    }
}

#[tokio::test]
async fn test_event_bus_creation() {
    let bus = SearchEventBus::new(100);
    assert_eq!(bus.subscriber_count(), 0);
    assert!(!bus.has_subscribers());
    assert_eq!(bus.config().capacity, 100);
}

#[tokio::test]
async fn test_publish_with_no_subscribers() {
    let bus = SearchEventBus::new(10);
    let result = bus.publish(SearchEvent::search_cancelled(SequenceNumber::new(1)));
    match result {
        Err(EventBusError::NoSubscribers) => {}
        other => panic!("Expected EventBusError::NoSubscribers, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_multiple_subscribers() {
    let bus = SearchEventBus::new(10);
    let mut receiver1 = bus.subscribe();
    let mut receiver2 = bus.subscribe();
    assert_eq!(bus.subscriber_count(), 2);

    let event = SearchEvent::search_started(SequenceNumber::new(4), RequestKind::NewSearch, QueryState::new("tv"));
    assert_eq!(bus.publish(event), Ok(2));

    for receiver in [&mut receiver1, &mut receiver2] {
        match next_event(receiver).await {
            SearchEvent::SearchStarted { sequence, query, .. } => {
                assert_eq!(sequence.get(), 4);
                assert_eq!(query.text(), "tv");
            }
            other => panic!("Unexpected event: {other:?}"),
        }
    }

    let snapshot = bus.metrics().snapshot();
    assert_eq!(snapshot.events_published, 1);
    assert_eq!(snapshot.peak_subscribers, 2);
}

#[tokio::test]
async fn test_filtered_receiver_skips_rejected_events() {
    let bus = SearchEventBus::new(10);
    let mut failures = bus.subscribe_filtered(|event| matches!(event, SearchEvent::SearchFailed { .. }));

    bus.publish(SearchEvent::search_cancelled(SequenceNumber::new(1))).expect("one subscriber");
    bus.publish(SearchEvent::search_failed(
        SequenceNumber::new(2),
        RequestKind::LoadMore,
        kodegen_tools_instantsearch::TransportError::Dropped,
    ))
    .expect("one subscriber");

    let received = timeout(Duration::from_millis(100), failures.recv())
        .await
        .expect("filtered event arrives")
        .expect("bus is open");
    assert_eq!(received.sequence(), Some(SequenceNumber::new(2)));
    assert!(matches!(failures.try_recv(), Ok(None)));
}

#[tokio::test]
async fn test_slow_subscriber_lags_in_drop_oldest_mode() {
    let bus = SearchEventBus::new(2);
    let mut receiver = bus.subscribe();
    for n in 1..=4 {
        bus.publish(SearchEvent::search_cancelled(SequenceNumber::new(n)))
            .expect("drop-oldest never refuses");
    }

    match receiver.recv().await {
        Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => assert_eq!(skipped, 2),
        other => panic!("Expected lag, got: {other:?}"),
    }
    assert_eq!(next_event(&mut receiver).await.sequence(), Some(SequenceNumber::new(3)));
}

#[tokio::test]
async fn test_wait_for_shutdown_after_signal_returns() {
    let bus = SearchEventBus::new(4);
    bus.shutdown();
    assert!(bus.is_shutdown());
    timeout(Duration::from_millis(100), bus.wait_for_shutdown())
        .await
        .expect("already signaled");
}

#[tokio::test]
async fn test_graceful_shutdown_announces_reason() {
    let bus = SearchEventBus::with_config(EventBusConfig {
        capacity: 4,
        drain_timeout: Duration::from_millis(10),
        ..Default::default()
    });
    let mut receiver = bus.subscribe();
    let waiter = bus.clone();
    let waiting = tokio::spawn(async move { waiter.wait_for_shutdown().await });
    tokio::task::yield_now().await;

    bus.shutdown_gracefully(ShutdownReason::Requested).await;

    match next_event(&mut receiver).await {
        SearchEvent::Shutdown { reason, .. } => assert_eq!(reason, ShutdownReason::Requested),
        other => panic!("Expected shutdown, got: {other:?}"),
    }
    timeout(Duration::from_millis(200), waiting)
        .await
        .expect("waiter released")
        .expect("waiter task completes");
}

#[tokio::test]
async fn test_searcher_publishes_lifecycle_then_shutdown() {
    let transport = MockTransport::new();
    let shared: Arc<dyn SearchTransport> = transport.clone();
    let bus = SearchEventBus::with_config(EventBusConfig {
        drain_timeout: Duration::from_millis(10),
        ..Default::default()
    });
    let mut receiver = bus.subscribe();
    let searcher = Searcher::builder(shared)
        .event_bus(bus.clone())
        .build()
        .expect("searcher builds");

    searcher.search_query("lamp");
    transport.resolve(0, Ok(page_payload(0, 2, 3)));

    match next_event(&mut receiver).await {
        SearchEvent::SearchStarted { sequence, kind, .. } => {
            assert_eq!(sequence.get(), 1);
            assert_eq!(kind, RequestKind::NewSearch);
        }
        other => panic!("Expected start, got: {other:?}"),
    }
    match next_event(&mut receiver).await {
        SearchEvent::SearchSucceeded { sequence, payload, .. } => {
            assert_eq!(sequence.get(), 1);
            assert_eq!(payload.hits.len(), 3);
        }
        other => panic!("Expected success, got: {other:?}"),
    }

    searcher.shutdown().await;
    match next_event(&mut receiver).await {
        SearchEvent::Shutdown { reason, .. } => assert_eq!(reason, ShutdownReason::SearcherClosed),
        other => panic!("Expected shutdown, got: {other:?}"),
    }
    assert!(bus.is_shutdown());
}

#[tokio::test]
async fn test_searcher_respects_reject_backpressure() {
    let transport = MockTransport::new();
    let shared: Arc<dyn SearchTransport> = transport.clone();
    let bus = SearchEventBus::with_config(EventBusConfig {
        capacity: 1,
        backpressure_mode: BackpressureMode::Reject,
        ..Default::default()
    });
    let mut receiver = bus.subscribe();
    let searcher = Searcher::builder(shared)
        .event_bus(bus.clone())
        .build()
        .expect("searcher builds");

    // The second search cancels the first; both of its events find the buffer full
    searcher.search();
    searcher.search();
    assert_eq!(searcher.pending_request_count(), 1);

    let snapshot = bus.metrics().snapshot();
    assert_eq!(snapshot.events_published, 1);
    assert_eq!(snapshot.events_rejected, 2);

    match receiver.try_recv() {
        Ok(SearchEvent::SearchStarted { sequence, .. }) => assert_eq!(sequence.get(), 1),
        other => panic!("Expected first start, got: {other:?}"),
    }
    assert!(matches!(
        receiver.try_recv(),
        Err(tokio::sync::broadcast::error::TryRecvError::Empty)
    ));
}

#[tokio::test]
async fn test_nothing_follows_shutdown_event() {
    let transport = MockTransport::new();
    let shared: Arc<dyn SearchTransport> = transport.clone();
    let bus = SearchEventBus::with_config(EventBusConfig {
        drain_timeout: Duration::from_millis(10),
        ..Default::default()
    });
    let mut receiver = bus.subscribe();
    let searcher = Searcher::builder(shared)
        .event_bus(bus.clone())
        .build()
        .expect("searcher builds");

    searcher.shutdown().await;
    searcher.search_query("late");
    assert!(matches!(
        bus.publish(SearchEvent::search_cancelled(SequenceNumber::new(99))),
        Err(EventBusError::Shutdown)
    ));

    match next_event(&mut receiver).await {
        SearchEvent::Shutdown { reason, .. } => assert_eq!(reason, ShutdownReason::SearcherClosed),
        other => panic!("Expected shutdown, got: {other:?}"),
    }
    assert!(matches!(
        receiver.try_recv(),
        Err(tokio::sync::broadcast::error::TryRecvError::Empty)
    ));
}
