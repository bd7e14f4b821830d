use super::*;

fn log_points(total: usize) -> Vec<usize> {
    (1..=total).filter(|&c| crosses_decile(c, total)).collect()
}

#[test]
fn deciles_fire_once_per_tenth() {
    assert_eq!(log_points(25), vec![3, 5, 8, 10, 13, 15, 18, 20, 23, 25]);
    assert_eq!(log_points(100), (1..=10).map(|d| d * 10).collect::<Vec<_>>());
}

#[test]
fn small_totals_log_every_patch() {
    assert_eq!(log_points(1), vec![1]);
    assert_eq!(log_points(3), vec![1, 2, 3]);
    assert_eq!(log_points(10), (1..=10).collect::<Vec<_>>());
}

#[test]
fn empty_or_unstarted_never_logs() {
    assert!(!crosses_decile(0, 0));
    assert!(!crosses_decile(0, 5));
    assert!(!crosses_decile(3, 0));
}

#[test]
fn handle_reports_counter_state() {
    let counter = Arc::new(ProgressCounter::default());
    let handle = ProgressHandle(Arc::clone(&counter));
    assert_eq!(handle.fraction(), 0.0);

    counter.reset(4);
    assert_eq!(counter.bump(), 1);
    assert_eq!(counter.bump(), 2);
    assert_eq!(handle.completed(), 2);
    assert_eq!(handle.total(), 4);
    assert_eq!(handle.fraction(), 0.5);

    let token = CancelToken::new();
    let clone = token.clone();
    clone.cancel();
    assert!(token.is_cancelled());
}
