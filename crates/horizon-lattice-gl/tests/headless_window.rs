//! Window lifecycle tests against the in-memory backend.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use horizon_lattice_gl::{
    ContextKind, ContextRequest, CreateFlags, EventRouter, FrameInsets, HeadlessOptions,
    HeadlessWindow, NativeWindow, Window, WindowConfig, WindowEvent,
};

type TestWindow = Window<HeadlessWindow>;

fn create(width: u32, height: u32) -> TestWindow {
    Window::with_backend(&WindowConfig::new("headless").with_size(width, height)).unwrap()
}

fn counter() -> (Rc<Cell<u32>>, Rc<Cell<u32>>) {
    let count = Rc::new(Cell::new(0));
    (Rc::clone(&count), count)
}

#[test]
fn test_outer_size_covers_client_area() {
    for (width, height) in [(1, 1), (320, 240), (800, 600), (1920, 1080)] {
        let window = create(width, height);
        assert!(window.width() >= width);
        assert!(window.height() >= height);
        assert_eq!(window.client_size(), (width, height));
    }
}

#[test]
fn test_resize_keeps_top_left() {
    let mut window = create(800, 600);
    window.move_to(100, 100);
    window.resize(1024, 768);

    assert_eq!((window.x(), window.y()), (100, 100));
    assert_eq!(window.client_size(), (1024, 768));
}

#[test]
fn test_move_keeps_outer_size() {
    let mut window = create(800, 600);
    let (width, height) = (window.width(), window.height());
    window.move_to(300, 200);

    assert_eq!((window.x(), window.y()), (300, 200));
    assert_eq!((window.width(), window.height()), (width, height));
}

#[test]
fn test_swap_interval_applied_only_on_change() {
    let mut window = create(64, 64);

    for interval in [1, 1, 1, 0, 0, -1, 1] {
        window.swap_buffers(interval);
    }

    assert_eq!(window.native().swap_interval_calls(), &[1, 0, -1, 1]);
    assert_eq!(window.native().present_count(), 7);
    assert_eq!(window.swap_interval(), 1);
}

#[test]
fn test_swap_interval_applies_to_its_own_window() {
    let mut first = create(64, 64);
    let mut second = create(64, 64);
    // Creating a window leaves its context current.
    assert!(second.native().is_current());

    first.swap_buffers(1);
    assert!(first.native().is_current());
    assert_eq!(first.native().applied_swap_interval(), Some(1));
    assert_eq!(second.native().applied_swap_interval(), None);

    second.swap_buffers(-1);
    assert_eq!(first.native().applied_swap_interval(), Some(1));
    assert_eq!(second.native().applied_swap_interval(), Some(-1));
    assert_eq!(first.native().present_count(), 1);
    assert_eq!(second.native().present_count(), 1);
}

#[test]
fn test_make_current_selects_window() {
    let mut first = create(64, 64);
    let second = create(64, 64);
    assert!(!first.native().is_current());

    assert!(first.make_current());
    assert!(first.native().is_current());
    assert!(!second.native().is_current());
}

#[test]
fn test_on_close_fires_once_per_request() {
    let mut window = create(64, 64);
    let (calls, observed) = counter();
    window.set_on_close(Some(Box::new(move |_: &mut TestWindow| {
        calls.set(calls.get() + 1);
    })));

    assert!(window.native().inject(WindowEvent::CloseRequested));
    window.dequeue_events();
    assert_eq!(observed.get(), 1);

    window.dequeue_events();
    assert_eq!(observed.get(), 1);
}

#[test]
fn test_events_without_callbacks_are_dropped() {
    let mut window = create(64, 64);
    window.native().inject(WindowEvent::CloseRequested);
    window.move_to(5, 5);
    window.dequeue_events();

    assert_eq!(EventRouter::instance().pending(window.id()), 0);
    assert!(EventRouter::instance().contains(window.id()));
}

#[test]
fn test_move_and_resize_callbacks_in_order() {
    let mut window = create(200, 100);
    let log = Rc::new(RefCell::new(Vec::new()));

    let moves = Rc::clone(&log);
    window.set_on_move(Some(Box::new(move |w: &mut TestWindow| {
        moves.borrow_mut().push(format!("move {},{}", w.x(), w.y()));
    })));
    let resizes = Rc::clone(&log);
    window.set_on_resize(Some(Box::new(move |w: &mut TestWindow| {
        resizes.borrow_mut().push(format!("resize {:?}", w.client_size()));
    })));

    window.move_to(10, 20);
    window.resize(300, 150);
    window.dequeue_events();

    assert_eq!(
        *log.borrow(),
        vec!["move 10,20".to_string(), "resize (300, 150)".to_string()]
    );
}

#[test]
fn test_callback_can_move_its_window() {
    let mut window = create(200, 100);
    window.set_on_resize(Some(Box::new(|w: &mut TestWindow| w.move_to(0, 0))));
    let (calls, observed) = counter();
    window.set_on_move(Some(Box::new(move |_: &mut TestWindow| {
        calls.set(calls.get() + 1);
    })));

    window.resize(10, 10);
    window.dequeue_events();
    assert_eq!((window.x(), window.y()), (0, 0));
    assert_eq!(observed.get(), 0);

    // The move made from inside the callback is delivered next time.
    window.dequeue_events();
    assert_eq!(observed.get(), 1);
}

#[test]
fn test_callbacks_are_per_window() {
    let mut first = create(64, 64);
    let mut second = create(64, 64);
    assert_ne!(first.id(), second.id());

    let (calls, observed) = counter();
    first.set_on_close(Some(Box::new(move |_: &mut TestWindow| {
        calls.set(calls.get() + 1);
    })));

    second.native().inject(WindowEvent::CloseRequested);
    second.dequeue_events();
    first.dequeue_events();
    assert_eq!(observed.get(), 0);

    first.native().inject(WindowEvent::CloseRequested);
    second.dequeue_events();
    first.dequeue_events();
    assert_eq!(observed.get(), 1);
}

#[test]
fn test_close_from_callback_request() {
    let mut window = create(64, 64);
    window.set_on_close(Some(Box::new(|w: &mut TestWindow| w.set_user_data(true))));
    window.native().inject(WindowEvent::CloseRequested);
    window.dequeue_events();

    assert_eq!(window.user_data::<bool>(), Some(&true));
    let id = window.id();
    window.close();
    assert!(!EventRouter::instance().contains(id));
}

#[test]
fn test_repeated_create_close_releases_everything() {
    let before = HeadlessWindow::live_count();
    for _ in 0..100 {
        let window = create(32, 32);
        window.close();
    }
    for _ in 0..100 {
        let _dropped = create(32, 32);
    }
    assert_eq!(HeadlessWindow::live_count(), before);
}

#[test]
fn test_context_upgrade_and_fallback() {
    let config = WindowConfig::new("ctx").with_context(ContextRequest::new(4, 1));
    let upgraded = TestWindow::with_backend(&config).unwrap();
    assert_eq!(upgraded.context_kind(), ContextKind::Modern { major: 4, minor: 1 });

    let options = HeadlessOptions::default().with_accept_modern(false);
    let native = HeadlessWindow::create_with(&config, options).unwrap();
    let fallback = Window::from_native(native, CreateFlags::NONE);
    assert_eq!(fallback.context_kind(), ContextKind::Legacy);
}

#[test]
fn test_undecorated_window_has_equal_sizes() {
    let options = HeadlessOptions::default().with_insets(FrameInsets::NONE);
    let native =
        HeadlessWindow::create_with(&WindowConfig::new("bare").with_size(50, 40), options).unwrap();
    let window = Window::from_native(native, CreateFlags::NONE);

    assert_eq!((window.width(), window.height()), (50, 40));
    assert_eq!(window.native().outer_rect().width, 50);
}
