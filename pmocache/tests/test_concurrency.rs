//! Premières ouvertures simultanées d'une même identité

mod common;

use common::ProbeSource;
use pmocache::{CacheOutcome, CachedSource, FillMode, FrameStore};
use pmosource::drain;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::time::Duration;

async fn race_two_opens(
    store: Arc<FrameStore>,
    make_source: impl Fn() -> ProbeSource,
    start: Arc<Barrier>,
) -> Vec<(Vec<pmosource::Frame>, Option<CacheOutcome>)> {
    let mut handles = Vec::new();
    for _ in 0..2 {
        let store = store.clone();
        let start = start.clone();
        let source = make_source();
        handles.push(tokio::task::spawn_blocking(move || {
            let mut cached = CachedSource::new(source, store);
            start.wait();
            let frames = drain(&mut cached).unwrap();
            (frames, cached.last_outcome())
        }));
    }

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }
    results
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unguarded_fill_can_drain_twice() {
    let store = FrameStore::shared(FillMode::Unguarded);
    let opens = Arc::new(AtomicUsize::new(0));
    // Les deux `open` internes doivent se rencontrer : cela n'arrive que si
    // les deux lectures ont manqué le cache.
    let inner_barrier = Arc::new(Barrier::new(2));

    let results = race_two_opens(
        store.clone(),
        || {
            ProbeSource::new("probe:race", 3)
                .sharing_counter(&opens)
                .with_barrier(inner_barrier.clone())
        },
        Arc::new(Barrier::new(2)),
    )
    .await;

    assert_eq!(opens.load(Ordering::SeqCst), 2);
    assert!(results
        .iter()
        .all(|(_, outcome)| *outcome == Some(CacheOutcome::Miss)));
    assert_eq!(results[0].0, results[1].0);

    // Une seule entrée survit, écrite deux fois
    assert_eq!(store.len(), 1);
    let stats = store.stats();
    assert_eq!(stats.misses, 2);
    assert_eq!(stats.fills, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_guarded_fill_drains_once() {
    let store = FrameStore::shared(FillMode::Guarded);
    let opens = Arc::new(AtomicUsize::new(0));

    let results = race_two_opens(
        store.clone(),
        || {
            ProbeSource::new("probe:race", 3)
                .sharing_counter(&opens)
                .with_open_delay(Duration::from_millis(100))
        },
        Arc::new(Barrier::new(2)),
    )
    .await;

    assert_eq!(opens.load(Ordering::SeqCst), 1);
    let misses = results
        .iter()
        .filter(|(_, outcome)| *outcome == Some(CacheOutcome::Miss))
        .count();
    assert_eq!(misses, 1);
    assert_eq!(results[0].0, results[1].0);
    assert_eq!(results[0].0.len(), 3);

    let stats = store.stats();
    assert_eq!(stats.fills, 1);
    assert_eq!(stats.hits, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_other_identities_are_not_blocked_by_a_fill() {
    let store = FrameStore::shared(FillMode::Guarded);

    let slow_store = store.clone();
    let slow = tokio::task::spawn_blocking(move || {
        let mut cached = CachedSource::new(
            ProbeSource::new("probe:slow", 2).with_open_delay(Duration::from_millis(300)),
            slow_store,
        );
        drain(&mut cached).unwrap()
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    let started = std::time::Instant::now();
    let mut fast = CachedSource::new(ProbeSource::new("probe:fast", 2), store.clone());
    drain(&mut fast).unwrap();
    assert!(started.elapsed() < Duration::from_millis(250));

    slow.await.unwrap();
    assert_eq!(store.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_waiter_fill_survives_a_failed_fill() {
    let store = FrameStore::shared(FillMode::Guarded);
    let healthy_opens = Arc::new(AtomicUsize::new(0));

    let failing_store = store.clone();
    let failing = tokio::task::spawn_blocking(move || {
        let mut cached = CachedSource::new(
            ProbeSource::new("probe:retry", 3)
                .with_open_delay(Duration::from_millis(200))
                .failing_after(0),
            failing_store,
        );
        drain(&mut cached).is_err()
    });

    // Le second lecteur arrive pendant le remplissage voué à l'échec
    tokio::time::sleep(Duration::from_millis(50)).await;
    let waiter_store = store.clone();
    let waiter_opens = healthy_opens.clone();
    let waiter = tokio::task::spawn_blocking(move || {
        let mut cached = CachedSource::new(
            ProbeSource::new("probe:retry", 3)
                .sharing_counter(&waiter_opens)
                .with_open_delay(Duration::from_millis(100)),
            waiter_store,
        );
        let frames = drain(&mut cached).unwrap();
        (frames.len(), cached.last_outcome())
    });

    assert!(failing.await.unwrap());
    let (frames, outcome) = waiter.await.unwrap();
    assert_eq!(frames, 3);
    assert_eq!(outcome, Some(CacheOutcome::Miss));
    assert!(store.contains("probe:retry"));

    let mut third = CachedSource::new(
        ProbeSource::new("probe:retry", 3).sharing_counter(&healthy_opens),
        store.clone(),
    );
    assert_eq!(drain(&mut third).unwrap().len(), 3);
    assert_eq!(third.last_outcome(), Some(CacheOutcome::Hit));
    assert_eq!(healthy_opens.load(Ordering::SeqCst), 1);
    assert_eq!(store.stats().fills, 1);
}
