use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use eframe::egui::vec2;
use pag_explorer::layout::{LayoutConfig, NeighborSimilarity, RadialLayout, compute_radial_layout};
use pag_explorer::request::Loader;

const DEADLINE: Duration = Duration::from_secs(5);

fn neighborhood(focal: &str, neighbors: &[&str]) -> RadialLayout {
    let neighbors = neighbors
        .iter()
        .map(|id| NeighborSimilarity {
            id: id.to_string(),
            similarity: 0.5,
        })
        .collect::<Vec<_>>();
    compute_radial_layout(focal, &neighbors, vec2(800.0, 600.0), &LayoutConfig::default())
}

fn poll_until<T: Send + 'static>(
    loader: &mut Loader<T>,
    mut done: impl FnMut(&Loader<T>, Option<&T>) -> bool,
) -> Option<T> {
    let started = Instant::now();
    let mut last = None;
    while started.elapsed() < DEADLINE {
        if let Some(value) = loader.poll() {
            last = Some(value);
        }
        if done(loader, last.as_ref()) {
            break;
        }
        thread::sleep(Duration::from_millis(5));
    }
    last
}

#[test]
fn later_selection_wins_when_earlier_fetch_resolves_last() {
    let mut loader = Loader::<RadialLayout>::new("radial-layout");
    let (release_a, gate_a) = mpsc::channel::<()>();

    loader.request(move || {
        let _ = gate_a.recv();
        neighborhood("A", &["A1", "A2"])
    });
    loader.request(|| neighborhood("B", &["B1"]));

    let shown = poll_until(&mut loader, |_, shown| shown.is_some()).unwrap();
    assert_eq!(shown.focal.id, "B");
    assert!(!loader.is_pending());

    release_a.send(()).unwrap();
    let late = poll_until(&mut loader, |loader, _| loader.stale_dropped() == 1);

    assert!(late.is_none());
    assert_eq!(loader.stale_dropped(), 1);
}

#[test]
fn in_order_results_deliver_the_latest() {
    let mut loader = Loader::<u32>::new("counter");
    loader.request(|| 1);
    loader.request(|| 2);

    let shown = poll_until(&mut loader, |loader, shown| {
        shown == Some(&2) && loader.stale_dropped() == 1
    });
    assert_eq!(shown, Some(2));
}

#[test]
fn cancelled_request_never_delivers() {
    let mut loader = Loader::<u32>::new("cancelled");
    loader.request(|| 7);
    loader.cancel();

    let shown = poll_until(&mut loader, |loader, _| loader.stale_dropped() == 1);
    assert_eq!(shown, None);
    assert!(!loader.is_pending());
}
