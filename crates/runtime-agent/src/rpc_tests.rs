use tempfile::TempDir;

use super::*;

#[tokio::test]
async fn fetch_content_returns_the_file_bytes() {
    let dir = TempDir::new().unwrap_or_else(|_| panic!("tempdir"));
    tokio::fs::write(dir.path().join("a.txt"), "hello").await.unwrap_or_else(|_| panic!("write"));
    let service = ContentServiceImpl { fs: Arc::new(FilesystemOperator::new(dir.path())) };

    let response = service.fetch_content(Request::new(FetchContentRequest { path: "a.txt".to_string() })).await.unwrap_or_else(|_| panic!("rpc"));

    assert_eq!(response.into_inner().content, b"hello");
}

#[tokio::test]
async fn fetch_content_of_a_missing_file_is_not_found() {
    let dir = TempDir::new().unwrap_or_else(|_| panic!("tempdir"));
    let service = ContentServiceImpl { fs: Arc::new(FilesystemOperator::new(dir.path())) };

    let err = service.fetch_content(Request::new(FetchContentRequest { path: "missing.txt".to_string() })).await.unwrap_err();

    assert_eq!(err.code(), tonic::Code::NotFound);
}
