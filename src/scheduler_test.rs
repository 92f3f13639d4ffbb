use super::*;

#[test]
fn first_request_schedules() {
    let mut s = FrameScheduler::new();
    assert!(s.request());
    assert!(s.is_pending());
}

#[test]
fn repeated_requests_are_deduplicated() {
    let mut s = FrameScheduler::new();
    assert!(s.request());
    assert!(!s.request());
    assert!(!s.request());
    assert!(s.take());
    assert!(!s.take());
}

#[test]
fn request_after_take_schedules_again() {
    let mut s = FrameScheduler::new();
    s.request();
    s.take();
    assert!(s.request());
}
