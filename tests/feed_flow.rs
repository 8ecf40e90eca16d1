use std::sync::Arc;
use std::sync::atomic::Ordering;

use imagefeed::error::FeedError;
use imagefeed::feed_state::FeedState;
use imagefeed::test_utils::{
    EchoClassifier, FixedClassifier, FlakyClassifier, StaticImageSource, jpeg_fixture, png_fixture,
};

#[tokio::test]
async fn fresh_state_has_no_latest() {
    let state = FeedState::from_parts(
        Arc::new(StaticImageSource::empty()),
        Arc::new(FixedClassifier::new("tabby", 0.9)),
    );
    assert!(state.latest().is_none());
}

#[tokio::test]
async fn empty_source_reports_no_images() {
    let classifier = Arc::new(FixedClassifier::new("tabby", 0.9));
    let state = FeedState::from_parts(Arc::new(StaticImageSource::empty()), classifier.clone());

    let err = state.trigger().await.unwrap_err();
    assert!(matches!(err, FeedError::NoImagesAvailable));
    assert!(state.latest().is_none());
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn non_image_files_are_filtered_out() {
    let source = StaticImageSource::new([
        ("notes.txt".to_string(), b"just text".to_vec()),
        ("readme.md".to_string(), b"# readme".to_vec()),
    ]);
    let state = FeedState::from_parts(
        Arc::new(source),
        Arc::new(FixedClassifier::new("tabby", 0.9)),
    );

    let err = state.trigger().await.unwrap_err();
    assert!(matches!(err, FeedError::NoImagesAvailable));
}

#[tokio::test]
async fn single_candidate_is_always_chosen() {
    let source = StaticImageSource::new([("cat.jpg".to_string(), jpeg_fixture(32, 32, [200, 30, 30]))]);
    let classifier = Arc::new(FixedClassifier::new("tabby", 0.9132));
    let state = FeedState::from_parts(Arc::new(source), classifier.clone());

    for _ in 0..5 {
        let result = state.trigger().await.unwrap();
        assert_eq!(result.class, "tabby");
        assert!(!result.class.is_empty());
        assert!((0.0..=1.0).contains(&result.confidence));
        assert_eq!(
            classifier.last_file_name.lock().unwrap().as_deref(),
            Some("cat.jpg")
        );
    }

    let latest = state.latest().unwrap();
    assert_eq!(latest.result.class, "tabby");
    assert_eq!(latest.result.confidence, 0.9132);
}

#[tokio::test]
async fn reads_are_idempotent() {
    let source = StaticImageSource::new([("cat.jpg".to_string(), jpeg_fixture(16, 16, [10, 10, 10]))]);
    let state = FeedState::from_parts(
        Arc::new(source),
        Arc::new(FixedClassifier::new("tabby", 0.5)),
    );
    state.trigger().await.unwrap();

    let first = state.latest().unwrap();
    let second = state.latest().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.result, second.result);
}

#[tokio::test]
async fn image_and_result_stay_paired() {
    // Red pixels belong to red.jpg, blue pixels to blue.png. The echo
    // classifier names the file it saw, so any torn publish shows up as a
    // color/class mismatch.
    let source = StaticImageSource::new([
        ("red.jpg".to_string(), jpeg_fixture(16, 16, [200, 30, 30])),
        ("blue.png".to_string(), png_fixture(16, 16, [30, 30, 200])),
    ]);
    let state = FeedState::from_parts(Arc::new(source), Arc::new(EchoClassifier));

    for _ in 0..10 {
        state.trigger().await.unwrap();
        let entry = state.latest().unwrap();

        let img = image::load_from_memory(&entry.image).unwrap().to_rgb8();
        let pixel = img.get_pixel(8, 8).0;
        match entry.result.class.as_str() {
            "red.jpg" => assert!(pixel[0] > pixel[2], "red image paired with {pixel:?}"),
            "blue.png" => assert!(pixel[2] > pixel[0], "blue image paired with {pixel:?}"),
            other => panic!("unexpected class {other}"),
        }
    }
}

#[tokio::test]
async fn failed_trigger_leaves_cache_unchanged() {
    let source = StaticImageSource::new([("cat.jpg".to_string(), jpeg_fixture(16, 16, [10, 10, 10]))]);
    let classifier = Arc::new(FlakyClassifier::new("tabby", 0.9));
    let state = FeedState::from_parts(Arc::new(source), classifier.clone());

    state.trigger().await.unwrap();
    let before = state.latest().unwrap();

    classifier.set_failing(true);
    let err = state.trigger().await.unwrap_err();
    assert!(matches!(err, FeedError::ClassificationFault(_)));

    let after = state.latest().unwrap();
    assert!(Arc::ptr_eq(&before, &after));
}

#[tokio::test]
async fn garbage_bytes_report_invalid_image() {
    let source = StaticImageSource::new([("bad.jpg".to_string(), b"not an image".to_vec())]);
    let classifier = Arc::new(FixedClassifier::new("tabby", 0.9));
    let state = FeedState::from_parts(Arc::new(source), classifier.clone());

    let err = state.trigger().await.unwrap_err();
    assert!(matches!(err, FeedError::InvalidImage));
    assert!(state.latest().is_none());
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn successful_trigger_replaces_previous_entry() {
    let source = StaticImageSource::new([("cat.jpg".to_string(), jpeg_fixture(16, 16, [10, 10, 10]))]);
    let state = FeedState::from_parts(Arc::new(source), Arc::new(EchoClassifier));

    state.trigger().await.unwrap();
    let first = state.latest().unwrap();
    state.trigger().await.unwrap();
    let second = state.latest().unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(second.result.class, "cat.jpg");
}
