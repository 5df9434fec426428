//! Integration tests for the `internal://` backend, driven through URLs.
//!
//! Each test builds its own router, so tests never share state.

use std::collections::BTreeSet;
use std::sync::Arc;

use rstest::rstest;
use urlfs::{FileReader, FsError, SchemeRouter};

const TESTDATA: &str = "This is some test data!";

/// Install a test subscriber so `RUST_LOG=urlfs=trace` shows router spans.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn repeated(times: usize) -> Vec<u8> {
    TESTDATA.repeat(times).into_bytes()
}

async fn read_all(reader: &dyn FileReader) -> Vec<u8> {
    let mut out = Vec::new();
    reader.read_to_end(&mut out).await.expect("read failed");
    out
}

#[tokio::test]
async fn write_file_and_read_back() {
    init_tracing();
    let (router, _) = SchemeRouter::with_internal();
    let url = "internal:///test/file/one";

    let output = router.open_writer(url).await.expect("open writer");
    for _ in 0..2 {
        let n = output.write(TESTDATA.as_bytes()).await.unwrap();
        assert_eq!(n, TESTDATA.len());
    }
    output.close().await.unwrap();

    let input = router.open_reader(url).await.expect("open reader");
    let mut contents = vec![0u8; 3 * TESTDATA.len()];
    let n = input.read(&mut contents).await.unwrap();
    assert_eq!(n, 2 * TESTDATA.len());
    assert_eq!(&contents[..n], repeated(2).as_slice());
    input.close().await.unwrap();

    router.remove(url).await.unwrap();
    let err = router.open_reader(url).await.err();
    assert_eq!(err, Some(FsError::not_found("/test/file/one")));
}

#[tokio::test]
async fn write_file_and_read_back_repeatedly() {
    let (router, _) = SchemeRouter::with_internal();
    let url = "internal:///test/file/two";

    // Every writer open truncates, so five rounds still leave two copies.
    for _ in 0..5 {
        let output = router.open_writer(url).await.unwrap();
        output.write(TESTDATA.as_bytes()).await.unwrap();
        output.write(TESTDATA.as_bytes()).await.unwrap();
        output.close().await.unwrap();
    }

    // Close rewinds, so each reader open starts from the beginning.
    for _ in 0..5 {
        let input = router.open_reader(url).await.unwrap();
        let mut contents = vec![0u8; 3 * TESTDATA.len()];
        let n = input.read(&mut contents).await.unwrap();
        assert_eq!(&contents[..n], repeated(2).as_slice());
        input.close().await.unwrap();
    }

    router.remove(url).await.unwrap();
}

#[tokio::test]
async fn append_file_and_read_back() {
    let (router, fs) = SchemeRouter::with_internal();
    let url = "internal:///test/file/three";

    for _ in 0..2 {
        let output = router.open_appender(url).await.unwrap();
        assert_eq!(
            output.write(TESTDATA.as_bytes()).await.unwrap(),
            TESTDATA.len()
        );
        output.close().await.unwrap();
    }

    let input = router.open_reader(url).await.unwrap();
    let mut contents = vec![0u8; 3 * TESTDATA.len()];
    let n = input.read(&mut contents).await.unwrap();
    assert_eq!(n, 2 * TESTDATA.len());
    assert_eq!(&contents[..n], repeated(2).as_slice());
    input.close().await.unwrap();

    let output = router.open_appender(url).await.unwrap();
    output.write(TESTDATA.as_bytes()).await.unwrap();
    output.close().await.unwrap();

    let input = router.open_reader(url).await.unwrap();
    let n = input.read(&mut contents).await.unwrap();
    assert_eq!(n, 3 * TESTDATA.len());
    assert_eq!(contents, repeated(3));
    assert_eq!(
        fs.open_reader("/test/file/three").unwrap().len(),
        3 * TESTDATA.len() as u64
    );
}

#[tokio::test]
async fn reader_without_close_resumes_at_cursor() {
    let (router, _) = SchemeRouter::with_internal();
    let url = "internal:///resume";
    let output = router.open_writer(url).await.unwrap();
    output.write(b"0123456789").await.unwrap();

    let first = router.open_reader(url).await.unwrap();
    first.seek(0).await.unwrap();
    let mut head = [0u8; 4];
    first.read(&mut head).await.unwrap();

    let second = router.open_reader(url).await.unwrap();
    assert_eq!(second.tell().await.unwrap(), 4);
    assert_eq!(read_all(second.as_ref()).await, b"456789");
    assert_eq!(
        first.read(&mut head).await,
        Err(FsError::EndOfStream)
    );
}

#[tokio::test]
async fn truncate_on_write() {
    let (router, _) = SchemeRouter::with_internal();
    let url = "internal:///t";

    router.open_writer(url).await.unwrap().write(b"X").await.unwrap();
    router.open_writer(url).await.unwrap().write(b"Y").await.unwrap();

    let input = router.open_reader(url).await.unwrap();
    assert_eq!(read_all(input.as_ref()).await, b"Y");
}

#[rstest]
#[case::one(1)]
#[case::three(3)]
#[case::ten(10)]
#[tokio::test]
async fn append_accumulates(#[case] times: usize) {
    let (router, _) = SchemeRouter::with_internal();
    let url = "internal:///acc";
    for _ in 0..times {
        let output = router.open_appender(url).await.unwrap();
        output.write(TESTDATA.as_bytes()).await.unwrap();
    }

    let input = router.open_reader(url).await.unwrap();
    input.seek(0).await.unwrap();
    assert_eq!(read_all(input.as_ref()).await, repeated(times));
}

#[tokio::test]
async fn remove_missing_is_ok() {
    let (router, _) = SchemeRouter::with_internal();
    router.remove("internal:///never/written").await.unwrap();
    router.remove("internal:///never/written").await.unwrap();
}

#[tokio::test]
async fn list_directory_contents() {
    let (router, _) = SchemeRouter::with_internal();
    for name in ["one1", "two2", "three3", "subdir/four4"] {
        let output = router
            .open_appender(&format!("internal:///test/dir/{name}"))
            .await
            .unwrap();
        output.close().await.unwrap();
    }

    let mut files = router.list_entries("internal:///test/dir").await.unwrap();
    files.sort();
    assert_eq!(files, vec!["one1", "subdir", "three3", "two2"]);
}

#[rstest]
#[case::forward(&["/d/a", "/d/b", "/d/sub/c"])]
#[case::reverse(&["/d/sub/c", "/d/b", "/d/a"])]
#[case::interleaved(&["/d/b", "/d/sub/c", "/d/a", "/d/sub/e"])]
#[tokio::test]
async fn listing_is_one_level_and_deduplicated(#[case] paths: &[&str]) {
    let (router, fs) = SchemeRouter::with_internal();
    for path in paths {
        fs.open_writer(path);
    }

    let mut names = router.list_entries("internal:///d").await.unwrap();
    names.sort();
    assert_eq!(names, vec!["a", "b", "sub"]);
}

#[rstest]
#[case::empty_dir("internal:///nothing/here", &[])]
#[case::exact_file("internal:///d/a", &[])]
#[case::trailing_slash("internal:///d/", &["a", "sub"])]
#[case::root("internal:///", &["d"])]
#[case::no_path("internal://", &["d"])]
#[tokio::test]
async fn listing_edge_cases(#[case] url: &str, #[case] expected: &[&str]) {
    let (router, fs) = SchemeRouter::with_internal();
    fs.open_writer("/d/a");
    fs.open_writer("/d/sub/c");

    let mut names = router.list_entries(url).await.unwrap();
    names.sort();
    assert_eq!(names, expected);
}

#[tokio::test]
async fn seek_and_skip_bounds() {
    let (router, _) = SchemeRouter::with_internal();
    let url = "internal:///bounds";
    router
        .open_writer(url)
        .await
        .unwrap()
        .write(b"abcd")
        .await
        .unwrap();

    let input = router.open_reader(url).await.unwrap();
    input.seek(2).await.unwrap();

    assert_eq!(
        input.seek(-1).await,
        Err(FsError::OutOfRange { offset: -1, len: 4 })
    );
    assert_eq!(
        input.seek(5).await,
        Err(FsError::OutOfRange { offset: 5, len: 4 })
    );
    assert!(matches!(input.skip(-1).await, Err(FsError::OutOfRange { .. })));
    assert!(matches!(input.skip(3).await, Err(FsError::OutOfRange { .. })));
    assert_eq!(input.tell().await.unwrap(), 2);

    input.skip(2).await.unwrap();
    let mut empty = [0u8; 0];
    assert_eq!(input.read(&mut empty).await, Err(FsError::EndOfStream));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_appends_do_not_interleave() {
    const TASKS: u8 = 16;
    const CHUNK: usize = 64;

    init_tracing();
    let (router, fs) = SchemeRouter::with_internal();
    let router = Arc::new(router);
    let url = "internal:///shared/log";

    let mut tasks = Vec::new();
    for i in 0..TASKS {
        let router = router.clone();
        tasks.push(tokio::spawn(async move {
            let output = router.open_appender(url).await.unwrap();
            output.write(&[i; CHUNK]).await.unwrap();

            // Separate keys opened at the same time must not collide.
            let own = format!("internal:///shared/own/{i}");
            router.open_writer(&own).await.unwrap().write(&[i]).await.unwrap();
            router.list_entries("internal:///shared").await.unwrap()
        }));
    }
    for task in tasks {
        let names = task.await.expect("task panicked");
        assert!(names.contains(&"log".to_string()), "{names:?}");
    }

    let contents = fs.open_reader("/shared/log").unwrap().contents();
    assert_eq!(contents.len(), TASKS as usize * CHUNK);
    let mut seen = BTreeSet::new();
    for chunk in contents.chunks(CHUNK) {
        assert!(chunk.iter().all(|&b| b == chunk[0]), "interleaved write");
        seen.insert(chunk[0]);
    }
    assert_eq!(seen, (0..TASKS).collect::<BTreeSet<_>>());

    let own = router.list_entries("internal:///shared/own").await.unwrap();
    assert_eq!(own.len(), TASKS as usize);
    for i in 0..TASKS {
        let reader = fs.open_reader(&format!("/shared/own/{i}")).unwrap();
        assert_eq!(reader.contents(), vec![i]);
    }
}

#[tokio::test]
async fn errors_convert_to_io() {
    let (router, _) = SchemeRouter::with_internal();
    let err: std::io::Error = router
        .open_reader("internal:///missing")
        .await
        .err()
        .expect("should fail")
        .into();
    assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
}
