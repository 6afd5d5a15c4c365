//! Encoding of server frames.
//!
//! | Frame     | Shape                                                               |
//! |-----------|---------------------------------------------------------------------|
//! | grid      | `{"GridState": <base64 cells>, "Width": w, "Height": h, "Generation": g}` |
//! | entities  | `{"GameState": {"<id>": {"Name": .., "Type": .., "Location": [x, y]}}}` |
//! | trees     | `{"Trees": <base64 bits>}`                                          |
//! | chat      | `{"Chat": "<name>: <text>"}`                                        |
//! | notice    | `{"Notice": "<text>"}`                                              |
//! | ping      | `{"Ping": null}`                                                    |
//!
//! Grid cells are the row-major cell bytes, standard base64 with padding.
//! Trees are the row-major layer packed eight cells per byte, least
//! significant bit first, in the same encoding. Entities appear in login
//! order.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::error;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use warfield_core::{Entity, Frame, WorldSnapshot};

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct GridFrame {
    grid_state: String,
    width: u32,
    height: u32,
    generation: u64,
}

#[derive(Serialize)]
enum Message<'a> {
    GameState(EntityTable<'a>),
    Trees(String),
    Chat(&'a str),
    Notice(&'a str),
    Ping(()),
}

/// Serializes as a JSON object keyed by entity id, in slice order.
struct EntityTable<'a>(&'a [Entity]);

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct EntityView<'a> {
    name: &'a str,
    #[serde(rename = "Type")]
    kind: &'static str,
    location: [f64; 2],
}

impl Serialize for EntityTable<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for e in self.0 {
            let view = EntityView {
                name: &e.name,
                kind: e.kind.as_str(),
                location: [e.position.x, e.position.y],
            };
            map.serialize_entry(&e.id.0, &view)?;
        }
        map.end()
    }
}

fn to_frame<T: Serialize>(value: &T) -> Frame {
    match serde_json::to_string(value) {
        Ok(json) => Frame::from(json),
        Err(e) => {
            error!("frame encoding failed: {e}");
            Frame::from("{}")
        }
    }
}

/// The field as a base64 grid frame.
pub fn grid(snapshot: &WorldSnapshot) -> Frame {
    to_frame(&GridFrame {
        grid_state: STANDARD.encode(&snapshot.cells),
        width: snapshot.width,
        height: snapshot.height,
        generation: snapshot.generation.0,
    })
}

/// The entity table frame.
pub fn entities(snapshot: &WorldSnapshot) -> Frame {
    to_frame(&Message::GameState(EntityTable(&snapshot.entities)))
}

/// The tree layer frame.
pub fn trees(snapshot: &WorldSnapshot) -> Frame {
    to_frame(&Message::Trees(STANDARD.encode(snapshot.tree_bits())))
}

/// A chat line, already prefixed with its sender.
pub fn chat(line: &str) -> Frame {
    to_frame(&Message::Chat(line))
}

/// A server notice.
pub fn notice(text: &str) -> Frame {
    to_frame(&Message::Notice(text))
}

/// The liveness ping.
pub fn ping() -> Frame {
    to_frame(&Message::Ping(()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use warfield_core::{EntityId, Generation, Position};

    fn snapshot() -> WorldSnapshot {
        let mut a = Entity::player(EntityId(5), "Amber");
        a.position = Position::new(1.5, 2.0);
        let b = Entity::player(EntityId(2), "Brisk");
        WorldSnapshot {
            generation: Generation(3),
            width: 2,
            height: 2,
            cells: vec![0, 1, 2, 20],
            trees: vec![true, false, false, true],
            entities: vec![a, b],
        }
    }

    #[test]
    fn grid_frame_shape() {
        assert_eq!(
            &*grid(&snapshot()),
            r#"{"GridState":"AAECFA==","Width":2,"Height":2,"Generation":3}"#
        );
    }

    #[test]
    fn entity_frame_keeps_login_order() {
        assert_eq!(
            &*entities(&snapshot()),
            concat!(
                r#"{"GameState":{"#,
                r#""5":{"Name":"Amber","Type":"Player","Location":[1.5,2.0]},"#,
                r#""2":{"Name":"Brisk","Type":"Player","Location":[0.0,0.0]}"#,
                r#"}}"#
            )
        );
    }

    #[test]
    fn tree_frame_packs_bits() {
        assert_eq!(&*trees(&snapshot()), r#"{"Trees":"CQ=="}"#);
        let bare = WorldSnapshot {
            trees: vec![false; 4],
            ..snapshot()
        };
        assert_eq!(&*trees(&bare), r#"{"Trees":"AA=="}"#);
    }

    #[test]
    fn empty_entity_table() {
        let snap = WorldSnapshot {
            entities: Vec::new(),
            ..snapshot()
        };
        assert_eq!(&*entities(&snap), r#"{"GameState":{}}"#);
    }

    #[test]
    fn text_frames_escape() {
        assert_eq!(&*chat(r#"Amber: "hi""#), r#"{"Chat":"Amber: \"hi\""}"#);
        assert_eq!(&*notice("Amber joined"), r#"{"Notice":"Amber joined"}"#);
        assert_eq!(&*ping(), r#"{"Ping":null}"#);
    }
}
