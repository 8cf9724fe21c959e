//! Capture -> recognition -> clipboard, with fake backends

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use textsnip_core::{LocalRect, Overlay, OverlayGeometry, OverlayInput, RegionSelector};
use textsnip_ocr::{INSTALL_HINT, OcrFailure};
use textsnip_types::{AppEvent, Bitmap, RecognitionMode, ScreenPoint, SelectionRect};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use super::fakes::{FakeLoader, FakeTesseract, bitmap, harness};
use crate::events::event_loop;
use crate::events::recognize::{handle_capture, recognize};
use crate::sink::{COPIED_TITLE, Delivery, NO_TEXT_MESSAGE};

/// Overlay spanning a single 1920x1080 monitor at the origin
#[derive(Default)]
struct ScreenOverlay {
    open: bool,
}

impl Overlay for ScreenOverlay {
    fn open(&mut self) -> anyhow::Result<OverlayGeometry> {
        self.open = true;
        Ok(OverlayGeometry::new(ScreenPoint::new(0, 0), 1.0))
    }

    fn draw_selection(&mut self, _rect: LocalRect) {}

    fn close(&mut self) {
        self.open = false;
    }
}

async fn wait_for<F: Fn() -> bool>(condition: F) {
    timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn drag_is_recognized_and_copied() {
    let h = harness(
        FakeTesseract::returning("Invoice #42\n"),
        FakeLoader::with_lines(Vec::new()),
        RecognitionMode::Standard,
    );
    let (event_tx, event_rx) = kanal::bounded_async(8);
    let cancel = CancellationToken::new();
    let loop_handle = tokio::spawn(event_loop(
        h.state.clone(),
        event_rx,
        h.sink.clone(),
        cancel.clone(),
    ));

    let grabbed = Arc::new(Mutex::new(Vec::new()));
    let grabber = {
        let grabbed = grabbed.clone();
        move |rect: SelectionRect| -> anyhow::Result<Bitmap> {
            grabbed.lock().unwrap().push(rect);
            Ok(bitmap(rect.width(), rect.height()))
        }
    };
    let mut selector = RegionSelector::new(ScreenOverlay::default(), grabber, 5, move |bitmap| {
        event_tx.try_send(AppEvent::Captured(bitmap)).unwrap();
    });

    assert!(selector.start_snip().is_none());
    assert!(selector.handle(OverlayInput::PointerDown { x: 100.0, y: 100.0 }).is_none());
    assert!(selector.handle(OverlayInput::PointerMove { x: 250.0, y: 70.0 }).is_none());
    let rect = selector
        .handle(OverlayInput::PointerUp { x: 300.0, y: 50.0 })
        .unwrap()
        .unwrap();

    assert_eq!((rect.x1(), rect.y1(), rect.x2(), rect.y2()), (100, 50, 300, 100));
    assert_eq!(*grabbed.lock().unwrap(), vec![rect]);
    assert!(!selector.overlay().open);

    let clipboard = h.clipboard.clone();
    wait_for(move || !clipboard.contents().is_empty()).await;
    assert_eq!(h.clipboard.contents(), vec!["Invoice #42".to_string()]);
    assert_eq!(
        h.notifier.infos(),
        vec![(COPIED_TITLE.to_string(), "Invoice #42".to_string())]
    );

    cancel.cancel();
    loop_handle.await.unwrap().unwrap();

    let status = h.state.status.snapshot().await;
    assert_eq!(status.capture_count, 1);
    assert_eq!(status.copied_count, 1);
}

#[tokio::test]
async fn tiny_drag_never_reaches_the_backend() {
    let tesseract = FakeTesseract::returning("unused");
    let calls = tesseract.calls.clone();
    let h = harness(
        tesseract,
        FakeLoader::with_lines(Vec::new()),
        RecognitionMode::Standard,
    );
    let (event_tx, event_rx) = kanal::bounded_async(8);
    let cancel = CancellationToken::new();
    let loop_handle = tokio::spawn(event_loop(
        h.state.clone(),
        event_rx,
        h.sink.clone(),
        cancel.clone(),
    ));

    let grabber = |rect: SelectionRect| -> anyhow::Result<Bitmap> { Ok(bitmap(rect.width(), rect.height())) };
    let mut selector = RegionSelector::new(ScreenOverlay::default(), grabber, 5, move |bitmap| {
        event_tx.try_send(AppEvent::Captured(bitmap)).unwrap();
    });

    selector.start_snip();
    selector.handle(OverlayInput::PointerDown { x: 10.0, y: 10.0 });
    let outcome = selector
        .handle(OverlayInput::PointerUp { x: 14.0, y: 300.0 })
        .unwrap();
    assert!(outcome.unwrap_err().is_silent());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(h.clipboard.contents().is_empty());
    assert!(h.notifier.infos().is_empty());

    cancel.cancel();
    loop_handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn missing_tesseract_shows_install_hint() {
    let h = harness(
        FakeTesseract::missing(),
        FakeLoader::with_lines(Vec::new()),
        RecognitionMode::Standard,
    );

    let delivery = handle_capture(
        h.state.clone(),
        bitmap(20, 20),
        RecognitionMode::Standard,
        h.sink.clone(),
    )
    .await;

    assert!(matches!(delivery, Delivery::Failed(_)));
    assert!(h.clipboard.contents().is_empty());
    let errors = h.notifier.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].1.contains(INSTALL_HINT));
}

#[tokio::test]
async fn advanced_lines_are_copied_joined() {
    let h = harness(
        FakeTesseract::missing(),
        FakeLoader::with_lines(vec!["Hello", "World"]),
        RecognitionMode::Advanced,
    );

    let delivery = handle_capture(
        h.state.clone(),
        bitmap(40, 40),
        RecognitionMode::Advanced,
        h.sink.clone(),
    )
    .await;

    assert_eq!(
        delivery,
        Delivery::Copied {
            preview: "Hello\nWorld".to_string()
        }
    );
    assert_eq!(h.clipboard.contents(), vec!["Hello\nWorld".to_string()]);
}

#[tokio::test]
async fn nothing_recognized_is_not_copied() {
    let h = harness(
        FakeTesseract::returning("  \n"),
        FakeLoader::with_lines(Vec::new()),
        RecognitionMode::Standard,
    );

    let delivery = handle_capture(
        h.state.clone(),
        bitmap(20, 20),
        RecognitionMode::Standard,
        h.sink.clone(),
    )
    .await;

    assert_eq!(delivery, Delivery::NothingFound);
    assert!(h.clipboard.contents().is_empty());
    assert_eq!(h.notifier.infos()[0].1, NO_TEXT_MESSAGE);
}

#[tokio::test]
async fn slow_recognition_times_out() {
    let h = harness(
        FakeTesseract::slow("late", Duration::from_millis(500)),
        FakeLoader::with_lines(Vec::new()),
        RecognitionMode::Standard,
    );

    let limit = Duration::from_millis(50);
    let start = std::time::Instant::now();
    let result = recognize(
        h.state.dispatcher.clone(),
        bitmap(8, 8),
        RecognitionMode::Standard,
        limit,
    )
    .await;

    assert_eq!(result, Err(OcrFailure::TimedOut(limit)));
    assert!(start.elapsed() < Duration::from_millis(400));
}

#[tokio::test]
async fn toggle_queued_after_capture_does_not_change_its_mode() {
    let h = harness(
        FakeTesseract::slow("from standard", Duration::from_millis(100)),
        FakeLoader::with_lines(vec!["from advanced"]),
        RecognitionMode::Standard,
    );
    let (event_tx, event_rx) = kanal::bounded_async(8);
    let cancel = CancellationToken::new();
    let loop_handle = tokio::spawn(event_loop(
        h.state.clone(),
        event_rx,
        h.sink.clone(),
        cancel.clone(),
    ));

    // Both events are queued before the loop gets to run
    event_tx.send(AppEvent::Captured(bitmap(8, 8))).await.unwrap();
    event_tx.send(AppEvent::ToggleMode).await.unwrap();

    let clipboard = h.clipboard.clone();
    wait_for(move || !clipboard.contents().is_empty()).await;
    assert_eq!(h.clipboard.contents(), vec!["from standard".to_string()]);
    assert_eq!(h.state.current_mode().await, RecognitionMode::Advanced);

    // The next capture picks up the toggled mode
    event_tx.send(AppEvent::Captured(bitmap(8, 8))).await.unwrap();
    let clipboard = h.clipboard.clone();
    wait_for(move || clipboard.contents().len() == 2).await;
    assert_eq!(h.clipboard.contents()[1], "from advanced");

    cancel.cancel();
    loop_handle.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_advanced_captures_load_model_once() {
    let mut loader = FakeLoader::with_lines(vec!["Total", "12.50"]);
    loader.delay = Duration::from_millis(100);
    let loads = loader.loads.clone();
    let h = harness(FakeTesseract::missing(), loader, RecognitionMode::Advanced);

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            tokio::spawn(handle_capture(
                h.state.clone(),
                bitmap(8, 8),
                RecognitionMode::Advanced,
                h.sink.clone(),
            ))
        })
        .collect();
    for task in tasks {
        assert!(matches!(task.await.unwrap(), Delivery::Copied { .. }));
    }

    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert_eq!(h.clipboard.contents().len(), 4);
    assert!(h.clipboard.contents().iter().all(|c| c == "Total\n12.50"));
}
