//! JSON snapshot codec for the canvas-state aggregate.
//!
//! The persisted document is a versioned envelope around `CanvasState`.
//! Readers treat anything unreadable — malformed JSON, missing fields,
//! an unknown version — as "no saved state", never as a fatal error.

use crate::model::CanvasState;
use serde::{Deserialize, Serialize};

/// Bump when the snapshot schema changes incompatibly.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Envelope {
    version: u32,
    state: CanvasState,
}

/// Serialize the aggregate to the persisted JSON document.
pub fn encode(state: &CanvasState) -> Result<String, serde_json::Error> {
    serde_json::to_string(&Envelope {
        version: SNAPSHOT_VERSION,
        state: state.clone(),
    })
}

/// Deserialize a persisted document. `None` if the JSON is malformed or
/// the schema version is unknown.
pub fn decode(json: &str) -> Option<CanvasState> {
    let envelope: Envelope = match serde_json::from_str(json) {
        Ok(e) => e,
        Err(err) => {
            log::warn!("unreadable snapshot: {err}");
            return None;
        }
    };
    if envelope.version != SNAPSHOT_VERSION {
        log::warn!(
            "unknown snapshot version {} (expected {SNAPSHOT_VERSION})",
            envelope.version
        );
        return None;
    }
    Some(envelope.state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::LayerId;
    use crate::model::{BackgroundImage, Layer};
    use pretty_assertions::assert_eq;

    #[test]
    fn encode_decode_roundtrip() {
        let state = CanvasState {
            background: Some(BackgroundImage {
                source: "data:image/png;base64,AAAA".into(),
                original_width: 1920,
                original_height: 1080,
            }),
            layers: vec![Layer::new_text(LayerId::intern("snap_a"), 1)],
            selected: Some(LayerId::intern("snap_a")),
            canvas_width: 960,
            canvas_height: 540,
            original_width: 1920,
            original_height: 1080,
        };

        let json = encode(&state).unwrap();
        let restored = decode(&json).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn malformed_json_decodes_to_none() {
        assert_eq!(decode("{not json"), None);
        assert_eq!(decode(r#"{"version":1}"#), None);
    }

    #[test]
    fn unknown_version_decodes_to_none() {
        let state = CanvasState::default();
        let json = encode(&state).unwrap().replace("\"version\":1", "\"version\":99");
        assert_eq!(decode(&json), None);
    }
}
