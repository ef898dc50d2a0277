//! Wire-payload encoding for outbound batches.

use serde::Serialize;
use std::sync::Arc;

/// Encodes a batch into the HTTP body. An encoding failure drops the batch
/// before it reaches the transport.
pub type BodyEncoder = Arc<dyn Fn(&[String]) -> Result<Vec<u8>, serde_json::Error> + Send + Sync>;

/// The wire payload: a single JSON object with a `messages` array.
///
/// The field is an `Option` so an absent list serializes as
/// `{"messages":null}` rather than being omitted.
#[derive(Debug, Serialize)]
struct NotifyBody<'a> {
    messages: Option<&'a [String]>,
}

/// The default encoder: `{"messages":["..."]}`.
pub fn default_encoder() -> BodyEncoder {
    Arc::new(|messages| {
        serde_json::to_vec(&NotifyBody {
            messages: Some(messages),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_messages_array() {
        let encoder = default_encoder();
        let messages = vec!["a".to_string(), "b".to_string()];
        let body = encoder(&messages).unwrap();
        assert_eq!(body, br#"{"messages":["a","b"]}"#);
    }

    #[test]
    fn encodes_empty_list() {
        let encoder = default_encoder();
        let body = encoder(&[]).unwrap();
        assert_eq!(body, br#"{"messages":[]}"#);
    }

    #[test]
    fn absent_list_serializes_as_null() {
        let body = serde_json::to_vec(&NotifyBody { messages: None }).unwrap();
        assert_eq!(body, br#"{"messages":null}"#);
    }
}
