//! 下载会话测试：状态机全流程、断点续传、元数据损坏恢复、重命名冲突与各类失败路径。
//!
//! 大部分用例使用内存中的 [`FakeServer`]，`downloads_over_http_with_reqwest` 经由 reqwest + mockito 走真实 HTTP。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use mockito::Matcher;
use tempfile::TempDir;

use crate::http::NetworkError;
use crate::metadata::{DownloadMetadata, MAX_URL_LEN, MetadataError, TRAILER_SIZE, encode_trailer};
use crate::session::{
    DownloadProgress, DownloadSession, FsOp, SessionError, SessionEvent, SessionState,
    read_work_file_metadata,
};
use crate::tests::{
    FakeServer, FlakyStorage, TEST_URL, drain_events, event_names, random_payload,
};

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn target(&self) -> PathBuf {
        self.dir.path().join("movie.mp4")
    }

    fn work_file(&self) -> PathBuf {
        self.dir.path().join("movie.mp4.mwd")
    }
}

fn session(server: &Arc<FakeServer>, destination: &Path) -> DownloadSession {
    DownloadSession::new(TEST_URL, destination).transport(server.clone())
}

fn progress_offsets(events: &[SessionEvent]) -> Vec<u64> {
    events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::Progress(p) => Some(p.bytes_done),
            _ => None,
        })
        .collect()
}

/// 第二次 GET 失败后留下 last_byte = 4 的工作文件
async fn interrupted_download(sandbox: &Sandbox, payload: &[u8]) {
    let server = FakeServer::new(payload.to_vec()).fail_get_at(1).into_arc();
    let err = session(&server, &sandbox.target())
        .block_size(4)
        .start()
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Network(_)));
}

#[tokio::test]
async fn ten_bytes_in_blocks_of_four() {
    let sandbox = Sandbox::new();
    let server = FakeServer::new(&b"0123456789"[..]).into_arc();

    let mut session = session(&server, &sandbox.target()).block_size(4);
    let mut events = session.subscribe();
    let state = session.state();
    let progress = session.progress();

    let outcome = session.start().await.unwrap();
    let events = drain_events(&mut events);

    assert_eq!(server.ranges(), vec![(0, 3), (4, 7), (8, 9)]);
    assert_eq!(progress_offsets(&events), vec![4, 8, 10]);
    assert_eq!(
        event_names(&events),
        vec![
            "start",
            "probed",
            "file_created",
            "file_loaded",
            "metadata_created",
            "download_begin",
            "progress",
            "progress",
            "progress",
            "download_end",
            "truncated",
            "renamed",
            "done",
        ]
    );

    assert_eq!(outcome.final_path, sandbox.target());
    assert_eq!(outcome.file_size, 10);
    assert_eq!(outcome.resumed_from, 0);
    assert_eq!(std::fs::read(sandbox.target()).unwrap(), b"0123456789");
    assert!(!sandbox.work_file().exists());

    assert_eq!(state.get_current(), Some(SessionState::Done));
    assert_eq!(
        progress.get_current(),
        Some(DownloadProgress {
            bytes_done: 10,
            total: 10,
            percent: 100,
        })
    );
}

#[tokio::test]
async fn events_carry_probe_and_metadata_details() {
    let sandbox = Sandbox::new();
    let server = FakeServer::new(&b"0123456789"[..]).into_arc();

    let mut session = session(&server, &sandbox.target()).block_size(4);
    let mut rx = session.subscribe();
    session.start().await.unwrap();
    let events = drain_events(&mut rx);

    assert!(events.contains(&SessionEvent::Start {
        url: TEST_URL.to_string(),
        work_file: sandbox.work_file(),
    }));
    assert!(events.iter().any(|e| matches!(
        e,
        SessionEvent::Probed(p) if p.file_size == 10 && p.accepts_ranges
    )));
    assert!(events.contains(&SessionEvent::MetadataCreated {
        corrupted_metadata: false,
        metadata: DownloadMetadata::fresh(TEST_URL, 10, 4),
    }));
    assert!(events.contains(&SessionEvent::DownloadBegin {
        file_size: 10,
        last_byte: 0,
    }));
    assert!(events.contains(&SessionEvent::Renamed {
        old_name: sandbox.work_file(),
        new_name: sandbox.target(),
    }));

    // 每个请求都带防缓存参数
    let urls = server.urls();
    assert_eq!(urls.len(), 4);
    assert!(urls.iter().all(|u| u.query_pairs().any(|(k, _)| k == "_")));
}

#[tokio::test]
async fn network_failure_leaves_resumable_work_file() {
    let sandbox = Sandbox::new();
    let server = FakeServer::new(&b"0123456789"[..]).fail_get_at(1).into_arc();

    let mut session = session(&server, &sandbox.target()).block_size(4);
    let mut rx = session.subscribe();
    let state = session.state();
    let err = session.start().await.unwrap_err();

    assert!(matches!(err, SessionError::Network(_)));
    let names = event_names(&drain_events(&mut rx));
    assert_eq!(&names[names.len() - 2..], ["request_error", "error"]);
    assert_eq!(state.get_current(), Some(SessionState::Error));

    let work_file = sandbox.work_file();
    assert_eq!(
        std::fs::metadata(&work_file).unwrap().len(),
        10 + TRAILER_SIZE as u64
    );
    let metadata = read_work_file_metadata(&work_file).await.unwrap();
    assert_eq!(metadata.last_byte, 4);
    assert_eq!(metadata.initial_size, 10);
    assert!(!metadata.done);
    assert!(!sandbox.target().exists());
}

#[tokio::test]
async fn resume_continues_from_last_checkpoint() {
    let sandbox = Sandbox::new();
    let payload = b"0123456789";
    interrupted_download(&sandbox, payload).await;

    let server = FakeServer::new(&payload[..]).into_arc();
    let storage = FlakyStorage::default();
    let writes = storage.write_log();

    let mut session = session(&server, &sandbox.target())
        .block_size(4)
        .storage(Arc::new(storage));
    let mut rx = session.subscribe();
    let outcome = session.start().await.unwrap();
    let events = drain_events(&mut rx);

    assert_eq!(outcome.resumed_from, 4);
    assert_eq!(server.ranges(), vec![(4, 7), (8, 9)]);
    assert_eq!(progress_offsets(&events), vec![8, 10]);
    assert!(events.contains(&SessionEvent::FileLoaded {
        path: sandbox.work_file(),
        size: 10 + TRAILER_SIZE as u64,
        already_existed: true,
    }));
    assert!(!event_names(&events).contains(&"metadata_created"));

    // [0, 4) 不会被重写
    assert!(writes.lock().unwrap().iter().all(|(offset, _)| *offset >= 4));
    assert_eq!(std::fs::read(sandbox.target()).unwrap(), payload);
}

#[tokio::test]
async fn resume_through_work_file_path() {
    let sandbox = Sandbox::new();
    let payload = random_payload(10);
    interrupted_download(&sandbox, &payload).await;

    let server = FakeServer::new(payload.clone()).into_arc();
    let outcome = session(&server, &sandbox.work_file()).start().await.unwrap();

    assert_eq!(outcome.final_path, sandbox.target());
    // 未显式配置时沿用记录的分块大小
    assert_eq!(server.ranges(), vec![(4, 7), (8, 9)]);
    assert_eq!(std::fs::read(sandbox.target()).unwrap(), payload);
}

#[tokio::test]
async fn configured_block_size_replaces_recorded_one() {
    let sandbox = Sandbox::new();
    let payload = random_payload(10);
    interrupted_download(&sandbox, &payload).await;

    let server = FakeServer::new(payload.clone()).into_arc();
    session(&server, &sandbox.target())
        .block_size(3)
        .start()
        .await
        .unwrap();

    assert_eq!(server.ranges(), vec![(4, 6), (7, 9)]);
    assert_eq!(std::fs::read(sandbox.target()).unwrap(), payload);
}

#[tokio::test]
async fn corrupted_trailer_restarts_from_zero() {
    let sandbox = Sandbox::new();
    std::fs::write(sandbox.work_file(), random_payload(3000)).unwrap();

    let payload = random_payload(10);
    let server = FakeServer::new(payload.clone()).into_arc();
    let mut session = session(&server, &sandbox.target()).block_size(4);
    let mut rx = session.subscribe();
    let outcome = session.start().await.unwrap();
    let events = drain_events(&mut rx);

    let names = event_names(&events);
    let corrupted = names.iter().position(|n| *n == "corrupted_metadata").unwrap();
    assert_eq!(names[corrupted + 1], "metadata_created");
    assert!(events.iter().any(|e| matches!(
        e,
        SessionEvent::MetadataCreated {
            corrupted_metadata: true,
            metadata,
        } if metadata.last_byte == 0
    )));

    assert_eq!(outcome.resumed_from, 0);
    assert_eq!(server.ranges(), vec![(0, 3), (4, 7), (8, 9)]);
    assert_eq!(std::fs::read(sandbox.target()).unwrap(), payload);
}

#[tokio::test]
async fn truncated_work_file_counts_as_corrupt() {
    let sandbox = Sandbox::new();
    std::fs::write(sandbox.work_file(), b"").unwrap();

    let server = FakeServer::new(&b"0123456789"[..]).into_arc();
    let mut session = session(&server, &sandbox.target());
    let mut rx = session.subscribe();
    session.start().await.unwrap();

    let events = drain_events(&mut rx);
    assert!(events.iter().any(|e| matches!(
        e,
        SessionEvent::CorruptedMetadata { reason } if !reason.is_empty()
    )));
    assert_eq!(std::fs::read(sandbox.target()).unwrap(), b"0123456789");
}

#[tokio::test]
async fn remote_size_change_restarts_download() {
    let sandbox = Sandbox::new();
    interrupted_download(&sandbox, b"0123456789").await;

    let payload = random_payload(12);
    let server = FakeServer::new(payload.clone()).into_arc();
    let mut session = session(&server, &sandbox.target()).block_size(4);
    let mut rx = session.subscribe();
    let outcome = session.start().await.unwrap();

    assert!(event_names(&drain_events(&mut rx)).contains(&"corrupted_metadata"));
    assert_eq!(outcome.resumed_from, 0);
    assert_eq!(outcome.file_size, 12);
    assert_eq!(std::fs::read(sandbox.target()).unwrap(), payload);
}

#[tokio::test]
async fn completed_trailer_only_needs_finalizing() {
    let sandbox = Sandbox::new();
    let payload = random_payload(10);
    let mut metadata = DownloadMetadata::fresh(TEST_URL, 10, 4);
    metadata.advance(10);
    let mut contents = payload.clone();
    contents.extend_from_slice(&encode_trailer(&metadata).unwrap());
    std::fs::write(sandbox.work_file(), contents).unwrap();

    let server = FakeServer::new(payload.clone()).into_arc();
    let outcome = session(&server, &sandbox.target()).start().await.unwrap();

    assert_eq!(server.get_count(), 0);
    assert_eq!(outcome.resumed_from, 10);
    assert_eq!(std::fs::read(sandbox.target()).unwrap(), payload);
}

#[tokio::test]
async fn name_collision_keeps_full_payload() {
    let sandbox = Sandbox::new();
    std::fs::write(sandbox.target(), b"old").unwrap();

    let payload = random_payload(1000);
    let server = FakeServer::new(payload.clone()).into_arc();
    let mut session = session(&server, &sandbox.target());
    let mut rx = session.subscribe();
    let err = session.start().await.unwrap_err();

    match err {
        SessionError::NameCollision { work_file, target } => {
            assert_eq!(work_file, sandbox.work_file());
            assert_eq!(target, sandbox.target());
        }
        other => panic!("unexpected error: {other:?}"),
    }
    let names = event_names(&drain_events(&mut rx));
    assert_eq!(
        &names[names.len() - 3..],
        ["truncated", "rename_error", "error"]
    );
    assert_eq!(std::fs::read(sandbox.work_file()).unwrap(), payload);
    assert_eq!(std::fs::read(sandbox.target()).unwrap(), b"old");
}

#[tokio::test]
async fn empty_remote_file_needs_no_get() {
    let sandbox = Sandbox::new();
    let server = FakeServer::new(Vec::new()).into_arc();

    let mut session = session(&server, &sandbox.target());
    let mut rx = session.subscribe();
    let outcome = session.start().await.unwrap();
    let events = drain_events(&mut rx);

    assert_eq!(server.get_count(), 0);
    assert_eq!(outcome.file_size, 0);
    assert!(progress_offsets(&events).is_empty());
    assert!(events.iter().any(|e| matches!(
        e,
        SessionEvent::MetadataCreated { metadata, .. } if metadata.done
    )));
    assert_eq!(std::fs::metadata(sandbox.target()).unwrap().len(), 0);
}

#[tokio::test]
async fn server_without_ranges_fails_before_touching_disk() {
    let sandbox = Sandbox::new();
    let server = FakeServer::new(&b"0123456789"[..]).without_ranges().into_arc();

    let err = session(&server, &sandbox.target())
        .block_size(4)
        .start()
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::RangeNotSupported));
    assert!(!sandbox.work_file().exists());
    assert_eq!(server.get_count(), 0);
}

#[tokio::test]
async fn server_without_ranges_works_for_single_block() {
    let sandbox = Sandbox::new();
    let payload = random_payload(10);
    let server = FakeServer::new(payload.clone()).without_ranges().into_arc();

    session(&server, &sandbox.target())
        .block_size(16)
        .start()
        .await
        .unwrap();

    assert_eq!(server.get_count(), 1);
    assert_eq!(std::fs::read(sandbox.target()).unwrap(), payload);
}

#[tokio::test]
async fn write_failure_is_filesystem_error() {
    let sandbox = Sandbox::new();
    let server = FakeServer::new(&b"0123456789"[..]).into_arc();

    // 第 0 次写入是初始元数据，第 1 次是第一个数据块
    let err = session(&server, &sandbox.target())
        .block_size(4)
        .storage(Arc::new(FlakyStorage::default().fail_write_at(1)))
        .start()
        .await
        .unwrap_err();

    match err {
        SessionError::FileSystem { op, path, .. } => {
            assert_eq!(op, FsOp::Write);
            assert_eq!(path, sandbox.work_file());
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(server.get_count(), 1);

    // 失败前的检查点仍然有效
    let metadata = read_work_file_metadata(sandbox.work_file()).await.unwrap();
    assert_eq!(metadata.last_byte, 0);
}

#[tokio::test]
async fn rename_failure_keeps_work_file() {
    let sandbox = Sandbox::new();
    let server = FakeServer::new(&b"0123456789"[..]).into_arc();

    let mut session = session(&server, &sandbox.target())
        .storage(Arc::new(FlakyStorage::default().fail_rename()));
    let mut rx = session.subscribe();
    let err = session.start().await.unwrap_err();

    assert!(matches!(
        err,
        SessionError::FileSystem {
            op: FsOp::Rename,
            ..
        }
    ));
    assert!(event_names(&drain_events(&mut rx)).contains(&"rename_error"));
    assert_eq!(std::fs::read(sandbox.work_file()).unwrap(), b"0123456789");
}

#[tokio::test]
async fn invalid_configuration_is_rejected_before_probing() {
    let sandbox = Sandbox::new();
    let server = FakeServer::new(&b"0123456789"[..]).into_arc();

    let err = session(&server, &sandbox.target())
        .block_size(0)
        .start()
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::InvalidConfig(_)));

    let long_url = format!("http://example.test/{}", "a".repeat(MAX_URL_LEN));
    let err = DownloadSession::new(long_url, sandbox.target())
        .transport(server.clone())
        .start()
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::MetadataEncode(MetadataError::UrlTooLong { .. })
    ));

    assert!(server.urls().is_empty());
}

#[tokio::test]
async fn event_closure_sees_every_event() {
    let sandbox = Sandbox::new();
    let server = FakeServer::new(&b"0123456789"[..]).into_arc();
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    session(&server, &sandbox.target())
        .block_size(4)
        .with_event_fn(move |event| sink.lock().unwrap().push(event.clone()))
        .start()
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.first(), Some(&SessionEvent::Start {
        url: TEST_URL.to_string(),
        work_file: sandbox.work_file(),
    }));
    assert_eq!(seen.last(), Some(&SessionEvent::Done));
    assert_eq!(progress_offsets(&seen), vec![4, 8, 10]);
}

#[tokio::test]
async fn state_watcher_reaches_done() {
    let sandbox = Sandbox::new();
    let server = FakeServer::new(random_payload(64)).into_arc();

    let session = session(&server, &sandbox.target()).block_size(8);
    let mut watcher = session.state().watch();
    let waiter = tokio::spawn(async move { watcher.wait_for(|s| s.is_terminal()).await });

    session.start().await.unwrap();
    assert_eq!(waiter.await.unwrap().unwrap(), SessionState::Done);
}

#[tokio::test]
async fn downloads_over_http_with_reqwest() {
    let sandbox = Sandbox::new();
    let mut server = mockito::Server::new_async().await;
    let path = || Matcher::Regex(r"^/movie\.mp4(\?.*)?$".to_string());

    let head = server
        .mock("HEAD", path())
        .match_header("range", "bytes=0-1")
        .with_status(206)
        .with_header("accept-ranges", "bytes")
        .with_header("content-range", "bytes 0-1/10")
        .create_async()
        .await;
    let mut blocks = Vec::new();
    for (range, body) in [("bytes=0-3", "0123"), ("bytes=4-7", "4567"), ("bytes=8-9", "89")] {
        blocks.push(
            server
                .mock("GET", path())
                .match_header("range", range)
                .match_query(Matcher::Regex(r"_=\d+\.\d+".to_string()))
                .with_status(206)
                .with_body(body)
                .create_async()
                .await,
        );
    }

    let url = format!("{}/movie.mp4", server.url());
    let outcome = DownloadSession::new(url, sandbox.target())
        .block_size(4)
        .start()
        .await
        .unwrap();

    head.assert_async().await;
    for block in &blocks {
        block.assert_async().await;
    }
    assert_eq!(outcome.file_size, 10);
    assert_eq!(std::fs::read(sandbox.target()).unwrap(), b"0123456789");
}

#[tokio::test]
async fn crash_before_checkpoint_refetches_only_that_block() {
    let sandbox = Sandbox::new();
    let payload = random_payload(10);
    let server = FakeServer::new(payload.clone()).into_arc();

    // 写入顺序：0 初始尾部块，1 块 0-3，2 检查点，3 块 4-7，4 检查点（失败）
    let err = session(&server, &sandbox.target())
        .block_size(4)
        .storage(Arc::new(FlakyStorage::default().fail_write_at(4)))
        .start()
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::FileSystem {
            op: FsOp::Write,
            ..
        }
    ));
    assert_eq!(server.ranges(), vec![(0, 3), (4, 7)]);

    let metadata = read_work_file_metadata(sandbox.work_file()).await.unwrap();
    assert_eq!(metadata.last_byte, 4);

    let server = FakeServer::new(payload.clone()).into_arc();
    let outcome = session(&server, &sandbox.target()).start().await.unwrap();
    assert_eq!(outcome.resumed_from, 4);
    assert_eq!(server.ranges(), vec![(4, 7), (8, 9)]);
    assert_eq!(std::fs::read(sandbox.target()).unwrap(), payload);
}

#[tokio::test]
async fn resume_without_ranges_fails_before_any_get() {
    let sandbox = Sandbox::new();
    let payload = random_payload(10);
    interrupted_download(&sandbox, &payload).await;

    let server = FakeServer::new(payload.clone()).without_ranges().into_arc();
    let err = session(&server, &sandbox.target())
        .start()
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::RangeNotSupported));
    assert_eq!(server.get_count(), 0);
    // 检查点保持不变，换用支持 Range 的服务器后仍可续传
    let metadata = read_work_file_metadata(sandbox.work_file()).await.unwrap();
    assert_eq!(metadata.last_byte, 4);
}

#[tokio::test]
async fn resume_without_ranges_uses_recorded_block_size() {
    let sandbox = Sandbox::new();
    // 记录的分块为 4，剩余 10 字节，一次请求拿不完
    let mut metadata = DownloadMetadata::fresh(TEST_URL, 10, 4);
    let mut contents = vec![0u8; 10];
    contents.extend_from_slice(&encode_trailer(&metadata).unwrap());
    std::fs::write(sandbox.work_file(), &contents).unwrap();

    let server = FakeServer::new(random_payload(10)).without_ranges().into_arc();
    let err = session(&server, &sandbox.target())
        .start()
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::RangeNotSupported));
    assert_eq!(server.get_count(), 0);

    // 显式放大分块后可以一次拿完
    metadata.block_size = 16;
    let mut contents = vec![0u8; 10];
    contents.extend_from_slice(&encode_trailer(&metadata).unwrap());
    std::fs::write(sandbox.work_file(), &contents).unwrap();

    let payload = random_payload(10);
    let server = FakeServer::new(payload.clone()).without_ranges().into_arc();
    session(&server, &sandbox.target()).start().await.unwrap();
    assert_eq!(server.get_count(), 1);
    assert_eq!(std::fs::read(sandbox.target()).unwrap(), payload);
}

#[tokio::test]
async fn absurd_remote_size_is_an_error() {
    let sandbox = Sandbox::new();
    let garbage = random_payload(3000);
    std::fs::write(sandbox.work_file(), &garbage).unwrap();

    let server = FakeServer::new(random_payload(10))
        .reported_size(u64::MAX)
        .into_arc();
    let err = session(&server, &sandbox.target())
        .start()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SessionError::Network(NetworkError::Protocol(_))
    ));
    assert_eq!(server.get_count(), 0);
    assert_eq!(std::fs::read(sandbox.work_file()).unwrap(), garbage);
}
