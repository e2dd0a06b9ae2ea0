use lzwpack::io::{compress_async, decompress_async};
use std::io;
use tokio_util::compat::{TokioAsyncReadCompatExt, TokioAsyncWriteCompatExt};

#[tokio::test]
async fn roundtrip_through_duplex() {
    let data = b"En un lugar de La Mancha, de cuyo nombre no quiero acordarme. ".repeat(40);

    let (client, server) = tokio::io::duplex(1 << 20);
    let summary = compress_async(&data[..], client.compat_write(), 12).await.unwrap();
    assert_eq!(summary.input_size, data.len() as u64);

    let mut restored = vec![];
    let back = decompress_async(server.compat(), futures::io::Cursor::new(&mut restored))
        .await
        .unwrap();
    assert_eq!(restored, data);
    assert_eq!(back.code_count, summary.code_count);
}

#[tokio::test]
async fn rejects_foreign_data() {
    let mut sink = vec![];
    let input = &b"plain text, not compressed"[..];
    let err = decompress_async(input, futures::io::Cursor::new(&mut sink))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    assert!(sink.is_empty());
}
