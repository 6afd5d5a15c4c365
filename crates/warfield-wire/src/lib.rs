//! JSON wire codec for warfield.
//!
//! Clients send `{"Type": <kind>, "Body": <body>}` objects, one per frame
//! or several in a JSON array. The server answers with grid, entity, tree,
//! chat, notice and ping frames; see [`outbound`] for their shapes.
//!
//! [`JsonCodec`] is the [`Codec`] the server binary plugs into the engine.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod inbound;
pub mod outbound;

use warfield_core::{Codec, DecodeError, Frame, Inbound, WorldSnapshot};

/// The JSON codec.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn decode(&self, frame: &str) -> Result<Vec<Inbound>, DecodeError> {
        inbound::decode(frame)
    }

    fn encode_snapshot(&self, snapshot: &WorldSnapshot) -> Vec<Frame> {
        vec![
            outbound::grid(snapshot),
            outbound::entities(snapshot),
            outbound::trees(snapshot),
        ]
    }

    fn encode_chat(&self, line: &str) -> Frame {
        outbound::chat(line)
    }

    fn encode_notice(&self, text: &str) -> Frame {
        outbound::notice(text)
    }

    fn encode_ping(&self) -> Frame {
        outbound::ping()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warfield_core::{Generation, PlayerAction, Position};

    #[test]
    fn snapshot_is_grid_entities_then_trees() {
        let snap = WorldSnapshot {
            generation: Generation(0),
            width: 1,
            height: 1,
            cells: vec![1],
            trees: vec![true],
            entities: Vec::new(),
        };
        let frames = JsonCodec.encode_snapshot(&snap);
        assert_eq!(frames.len(), 3);
        assert!(frames[0].starts_with(r#"{"GridState":"AQ==""#));
        assert!(frames[1].starts_with(r#"{"GameState""#));
        assert_eq!(&*frames[2], r#"{"Trees":"AQ=="}"#);
    }

    #[test]
    fn decodes_through_the_trait() {
        let codec: &dyn Codec = &JsonCodec;
        assert_eq!(
            codec.decode(r#"{"Type": "Move", "Body": [4, 5]}"#),
            Ok(vec![Inbound::Action(PlayerAction::Move {
                to: Position::new(4.0, 5.0)
            })])
        );
        assert_eq!(&*codec.encode_ping(), r#"{"Ping":null}"#);
    }
}
