use futures_util::StreamExt;

/// Why reading an HTTP response body stopped early.
#[derive(Debug)]
pub(crate) enum BodyError {
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Transport(reqwest::Error),
}

/// Streams the body of a successful response, refusing anything over `max_bytes`.
pub(crate) async fn read_limited(
    response: reqwest::Response,
    max_bytes: u64,
) -> Result<Vec<u8>, BodyError> {
    if let Some(content_len) = response.content_length() {
        if content_len > max_bytes {
            return Err(BodyError::TooLarge {
                max_bytes,
                actual: Some(content_len),
            });
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(BodyError::Transport)?;
        let next_len = bytes.len() as u64 + chunk.len() as u64;
        if next_len > max_bytes {
            return Err(BodyError::TooLarge {
                max_bytes,
                actual: Some(next_len),
            });
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}
