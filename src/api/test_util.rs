use axum::body;
use serde::de::DeserializeOwned;

/// Reads a whole response body and deserializes it as JSON into the requested type.
/// Panics (failing the test) if the body can't be read or doesn't match the type.
pub async fn deserialize_body<T: DeserializeOwned>(response_body: body::Body) -> T {
    let bytes = body::to_bytes(response_body, usize::MAX)
        .await
        .expect("Could not read data from response body!");

    serde_json::from_slice(&bytes).unwrap_or_else(|err| {
        panic!(
            "Could not parse body content into data structure! Error: {}, Received body: {:?}",
            err, bytes
        )
    })
}

/// Reads a whole response body, expecting it to be empty
pub async fn assert_empty_body(response_body: body::Body) {
    let bytes = body::to_bytes(response_body, usize::MAX)
        .await
        .expect("Could not read data from response body!");

    assert!(bytes.is_empty(), "Expected an empty body, got {:?}", bytes);
}
