//! Hot reload: new archives appear, old tables stay consistent.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use axum::http::StatusCode;
use tokio::sync::{broadcast, mpsc};

use pakserve::http::HttpServer;
use pakserve::lifecycle::{run_reload_loop, ReloadTrigger};

mod common;
use common::{get, write_pak};

#[tokio::test]
async fn reload_picks_up_new_archive() {
    let dir = tempfile::tempdir().unwrap();
    write_pak(&dir.path().join("pak0.pak"), &[("a.txt", b"a")]);
    let config = common::config(&[("^/", &[dir.path()])]);
    let coordinator = common::coordinator(&config);
    let router = HttpServer::new(common::engine(&config, Arc::clone(&coordinator))).router();

    assert_eq!(get(&router, "/b.txt").await.status, StatusCode::NOT_FOUND);

    write_pak(&dir.path().join("pak1.pak"), &[("b.txt", b"new")]);
    let stats = coordinator.reload().unwrap();
    assert_eq!(stats.generation, 2);
    assert_eq!(stats.archives, 2);

    let res = get(&router, "/b.txt").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, b"new");
}

#[tokio::test]
async fn reload_drops_removed_archive() {
    let dir = tempfile::tempdir().unwrap();
    write_pak(&dir.path().join("pak0.pak"), &[("a.txt", b"old")]);
    write_pak(&dir.path().join("pak1.pak"), &[("a.txt", b"fallback")]);
    let config = common::config(&[("^/", &[dir.path()])]);
    let coordinator = common::coordinator(&config);
    let router = HttpServer::new(common::engine(&config, Arc::clone(&coordinator))).router();

    assert_eq!(get(&router, "/a.txt").await.body, b"old");

    std::fs::remove_file(dir.path().join("pak0.pak")).unwrap();
    coordinator.reload().unwrap();
    assert_eq!(coordinator.snapshot().archive_count(), 1);
    assert_eq!(get(&router, "/a.txt").await.body, b"fallback");
}

#[tokio::test]
async fn trigger_channel_drives_reload() {
    let dir = tempfile::tempdir().unwrap();
    write_pak(&dir.path().join("pak0.pak"), &[("a.txt", b"a")]);
    let config = common::config(&[("^/", &[dir.path()])]);
    let coordinator = common::coordinator(&config);

    let (tx, rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    let task = tokio::spawn(run_reload_loop(
        Arc::clone(&coordinator),
        rx,
        Duration::from_millis(10),
        shutdown_rx,
    ));

    write_pak(&dir.path().join("pak1.pak"), &[("b.txt", b"b")]);
    tx.send(ReloadTrigger::Signal).unwrap();

    let mut waited = Duration::ZERO;
    while coordinator.generation() < 2 && waited < Duration::from_secs(5) {
        tokio::time::sleep(Duration::from_millis(10)).await;
        waited += Duration::from_millis(10);
    }
    assert_eq!(coordinator.generation(), 2);
    assert!(coordinator.resolve("/b.txt").is_ok());

    shutdown_tx.send(()).unwrap();
    task.await.unwrap().unwrap();
}

/// Store count a generation must show for the base route: the writer below
/// adds pak1 before every odd reload and removes it before every even one.
fn expected_base_stores(generation: u64) -> usize {
    if generation >= 2 && (generation - 2) % 2 == 0 {
        2
    } else {
        1
    }
}

#[test]
fn lookups_during_reloads_see_whole_tables() {
    let base = tempfile::tempdir().unwrap();
    let mods = tempfile::tempdir().unwrap();
    write_pak(&base.path().join("pak0.pak"), &[("a.txt", b"a")]);
    write_pak(&mods.path().join("pak0.pak"), &[("b.txt", b"b")]);
    let config = common::config(&[("^/", &[base.path()]), ("^/mod/", &[mods.path()])]);
    let coordinator = common::coordinator(&config);
    let stop = Arc::new(AtomicBool::new(false));
    let pak0 = base.path().join("pak0.pak");
    let pak1 = base.path().join("pak1.pak");

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let coordinator = Arc::clone(&coordinator);
            let stop = Arc::clone(&stop);
            let (pak0, pak1) = (pak0.clone(), pak1.clone());
            thread::spawn(move || {
                let mut last_generation = 0;
                let mut lookups = 0u64;
                loop {
                    let base_hit = coordinator.resolve("/a.txt").unwrap();
                    let generation = base_hit.generation;
                    assert!(generation >= last_generation);
                    last_generation = generation;

                    assert_eq!(base_hit.route, 0);
                    assert_eq!(
                        base_hit.stores.len(),
                        expected_base_stores(generation),
                        "generation {generation}"
                    );
                    assert_eq!(base_hit.stores[0].path(), pak0.as_path());
                    if let Some(second) = base_hit.stores.get(1) {
                        assert_eq!(second.path(), pak1.as_path());
                    }

                    let mod_hit = coordinator.resolve("/mod/b.txt").unwrap();
                    assert!(mod_hit.generation >= generation);
                    assert_eq!(mod_hit.route, 1);
                    assert_eq!(mod_hit.asset_path, "b.txt");
                    assert_eq!(mod_hit.stores.len(), 1);

                    lookups += 1;
                    if stop.load(Ordering::Relaxed) {
                        break;
                    }
                }
                lookups
            })
        })
        .collect();

    for round in 1..=50 {
        if round % 2 == 1 {
            write_pak(&pak1, &[("a.txt", b"override")]);
        } else {
            std::fs::remove_file(&pak1).unwrap();
        }
        coordinator.reload().unwrap();
    }
    stop.store(true, Ordering::Relaxed);

    for reader in readers {
        assert!(reader.join().unwrap() > 0);
    }
    assert_eq!(coordinator.generation(), 51);
    assert_eq!(coordinator.resolve("/a.txt").unwrap().stores.len(), 1);
}

#[test]
fn concurrent_reloads_are_serialized() {
    let dir = tempfile::tempdir().unwrap();
    write_pak(&dir.path().join("pak0.pak"), &[("a.txt", b"a")]);
    let config = common::config(&[("^/", &[dir.path()])]);
    let coordinator = common::coordinator(&config);

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let coordinator = Arc::clone(&coordinator);
            thread::spawn(move || {
                for _ in 0..5 {
                    coordinator.reload().unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    // every rebuild got its own generation
    assert_eq!(coordinator.generation(), 41);
    assert_eq!(coordinator.snapshot().generation(), 41);
}
