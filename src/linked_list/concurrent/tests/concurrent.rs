extern crate std;

use alloc::sync::Arc;
use core::sync::atomic::{AtomicUsize, Ordering};
use core::time::Duration;
use std::sync::{Barrier, mpsc};
use std::{thread, vec};

use crate::error::ListError;

use super::super::ConcurrentList;
use super::super::prelude::*;

const NUM_THREADS: usize = 8;
const ITEMS_PER_THREAD: usize = 500;

fn counting_list() -> (Arc<ConcurrentList<usize>>, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    let list = ConcurrentList::with_destructor(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (Arc::new(list), count)
}

fn chain_len<T: Send + Sync>(list: &ConcurrentList<T>) -> usize {
    let mut n = 0;
    list.map(|_| n += 1);
    n
}

#[test]
fn test_concurrency() {
    let (list, dropped) = counting_list();
    let mut handles = vec![];

    // Insertion phase
    for i in 0..NUM_THREADS {
        let list = Arc::clone(&list);
        handles.push(thread::spawn(move || {
            for j in 0..ITEMS_PER_THREAD {
                let key = i * ITEMS_PER_THREAD + j;
                if j % 2 == 0 {
                    list.insert_first(key).unwrap();
                } else {
                    // Index 1 only fails while the list is still empty.
                    list.insert_at(key, 1)
                        .or_else(|err| list.insert_first(err.into_value()))
                        .unwrap();
                }
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(list.len(), NUM_THREADS * ITEMS_PER_THREAD);
    assert_eq!(chain_len(&list), list.len());

    // In-place modification phase, each thread shifting its own range of positions
    let total = NUM_THREADS * ITEMS_PER_THREAD;
    handles = vec![];
    for i in 0..NUM_THREADS {
        let list = Arc::clone(&list);
        handles.push(thread::spawn(move || {
            for index in i * ITEMS_PER_THREAD..(i + 1) * ITEMS_PER_THREAD {
                let old = list.alter_at(index, |v| {
                    *v += total;
                    *v - total
                });
                assert!(old.unwrap() < total);
                assert!(list.view_at(index, |v| *v).unwrap() >= total);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    // Removal phase
    handles = vec![];
    for i in 0..NUM_THREADS {
        let list = Arc::clone(&list);
        handles.push(thread::spawn(move || {
            for j in 0..ITEMS_PER_THREAD {
                let key = i * ITEMS_PER_THREAD + j + total;
                list.remove_where(|v| *v == key).unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert!(list.is_empty());
    assert_eq!(chain_len(&list), 0);
    assert_eq!(dropped.load(Ordering::SeqCst), total);
}

#[test]
fn test_concurrent_remove_first_takes_each_once() {
    let (list, dropped) = counting_list();
    let total = NUM_THREADS * ITEMS_PER_THREAD;
    for key in 0..total {
        list.insert_first(key).unwrap();
    }

    let removed = Arc::new(AtomicUsize::new(0));
    let mut handles = vec![];
    for _ in 0..NUM_THREADS {
        let list = Arc::clone(&list);
        let removed = Arc::clone(&removed);
        handles.push(thread::spawn(move || {
            loop {
                match list.remove_first() {
                    Ok(_) => {
                        removed.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(ListError::InvalidIndex { index: 0 }) => break,
                    Err(e) => panic!("unexpected error: {e}"),
                }
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(removed.load(Ordering::SeqCst), total);
    assert_eq!(dropped.load(Ordering::SeqCst), total);
    assert!(list.is_empty());
}

#[test]
fn test_readers_during_tail_removal() {
    let (list, dropped) = counting_list();
    let total = 2_000;
    for key in 0..total {
        list.insert_last(key).unwrap();
    }

    let remover = {
        let list = Arc::clone(&list);
        thread::spawn(move || {
            while !list.is_empty() {
                let last = list.len().saturating_sub(1);
                let _ = list.remove_at(last);
            }
        })
    };

    let mut readers = vec![];
    for _ in 0..4 {
        let list = Arc::clone(&list);
        readers.push(thread::spawn(move || {
            let mut seen = 0;
            for index in (0..total).rev() {
                match list.get_at(index) {
                    // Values never move, they only disappear from the tail.
                    Ok(v) => {
                        assert_eq!(v, index);
                        seen += 1;
                    }
                    Err(ListError::InvalidIndex { index: i }) => assert_eq!(i, index),
                    Err(e) => panic!("unexpected error: {e}"),
                }
                if index % 250 != 0 {
                    continue;
                }
                let mut previous = None;
                list.map(|v| {
                    if let Some(p) = previous {
                        assert!(*v > p, "map visited {v} after {p}");
                    }
                    previous = Some(*v);
                });
            }
            seen
        }));
    }

    remover.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(dropped.load(Ordering::SeqCst), total);
    assert_eq!(chain_len(&list), 0);
}

#[test]
fn test_removal_not_blocked_by_parked_traversal() {
    let (list, dropped) = counting_list();
    for key in 0..100 {
        list.insert_last(key).unwrap();
    }

    let (parked_tx, parked_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let walker = {
        let list = Arc::clone(&list);
        thread::spawn(move || {
            let mut seen = 0;
            list.map(|v| {
                if *v == 0 {
                    parked_tx.send(()).unwrap();
                    release_rx.recv().unwrap();
                }
                seen += 1;
            });
            seen
        })
    };
    parked_rx.recv().unwrap();

    // The walker sits on node 0 until released. Removing further down must not wait for it.
    let (done_tx, done_rx) = mpsc::channel();
    let remover = {
        let list = Arc::clone(&list);
        thread::spawn(move || done_tx.send(list.remove_at(90)).unwrap())
    };
    let removed = done_rx.recv_timeout(Duration::from_secs(10));
    release_tx.send(()).unwrap();

    assert_eq!(removed, Ok(Ok(99)));
    assert_eq!(dropped.load(Ordering::SeqCst), 1);
    remover.join().unwrap();
    // The walk resumes on the live chain, without the removed value.
    assert_eq!(walker.join().unwrap(), 99);
}

#[test]
fn test_remove_where_rescans_when_match_moves() {
    let (list, dropped) = counting_list();
    for key in [1, 2, 3] {
        list.insert_last(key).unwrap();
    }

    let calls = AtomicUsize::new(0);
    let barrier = Barrier::new(2);
    let result = thread::scope(|s| {
        // Unlinks the predecessor of the match while the scan is standing on the match.
        let remover = s.spawn(|| {
            barrier.wait();
            list.remove_first()
        });
        let result = list.remove_where(|v| {
            let call = calls.fetch_add(1, Ordering::SeqCst);
            if *v == 2 && call == 1 {
                barrier.wait();
                while list.len() != 2 {
                    thread::yield_now();
                }
            }
            *v == 2
        });
        assert_eq!(remover.join().unwrap(), Ok(2));
        result
    });

    assert_eq!(result, Ok(1));
    // 1 and 2 on the first scan, 2 again after the rescan.
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(chain_len(&list), 1);
    assert_eq!(list.get_first(), Ok(3));
    assert_eq!(dropped.load(Ordering::SeqCst), 2);
}
