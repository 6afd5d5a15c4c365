//! Decoding of client frames.
//!
//! A frame holds one `{"Type": <kind>, "Body": <body>}` object or an array
//! of them. Kinds match case-insensitively:
//!
//! | Kind                   | Body              |
//! |------------------------|-------------------|
//! | `Move`                 | `[x, y]`          |
//! | `Chat`                 | `"text"`          |
//! | `Bomb`, `LaBomba`      | `[x, y]`          |
//! | `Edit`                 | `[x, y, value]`   |
//! | `ToggleTree`           | `[x, y, ...]`     |
//! | `Pong`                 | ignored           |
//!
//! Coordinates are JSON numbers; bomb, edit and tree targets are floored
//! to the containing cell. A tree toggle reads the first two numbers and
//! ignores the rest. One bad element rejects the whole frame.

use serde::Deserialize;
use serde_json::Value;
use warfield_core::{DecodeError, Inbound, PlayerAction, Position};

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "Type")]
    kind: String,
    #[serde(rename = "Body", default)]
    body: Value,
}

/// Decode one frame into the messages it carries.
pub fn decode(frame: &str) -> Result<Vec<Inbound>, DecodeError> {
    let frame = frame.trim();
    if frame.is_empty() {
        return Err(DecodeError::Empty);
    }
    let value: Value =
        serde_json::from_str(frame).map_err(|e| DecodeError::InvalidJson(e.to_string()))?;
    match value {
        Value::Array(items) => items.into_iter().map(decode_one).collect(),
        object @ Value::Object(_) => decode_one(object).map(|m| vec![m]),
        _ => Err(DecodeError::InvalidJson(
            "expected an object or an array of objects".into(),
        )),
    }
}

fn decode_one(value: Value) -> Result<Inbound, DecodeError> {
    let envelope: Envelope =
        serde_json::from_value(value).map_err(|e| DecodeError::InvalidJson(e.to_string()))?;
    let Envelope { kind, body } = envelope;
    match kind.to_ascii_lowercase().as_str() {
        "move" => {
            let [x, y] = numbers(&kind, &body)?;
            Ok(Inbound::Action(PlayerAction::Move {
                to: Position::new(x, y),
            }))
        }
        "chat" => match body {
            Value::String(text) => Ok(Inbound::Chat(text)),
            _ => Err(bad(&kind, "expected a string")),
        },
        "bomb" | "labomba" => {
            let [x, y] = numbers(&kind, &body)?;
            Ok(Inbound::Action(PlayerAction::Bomb {
                at: Position::new(x, y).cell(),
            }))
        }
        "edit" => {
            let [x, y, v] = numbers(&kind, &body)?;
            if v.fract() != 0.0 || !(0.0..=f64::from(u8::MAX)).contains(&v) {
                return Err(bad(&kind, "value must be an integer in 0..=255"));
            }
            Ok(Inbound::Action(PlayerAction::Edit {
                at: Position::new(x, y).cell(),
                value: v as u8,
            }))
        }
        "toggletree" => {
            let [x, y] = leading(&kind, &body)?;
            Ok(Inbound::Action(PlayerAction::ToggleTree {
                at: Position::new(x, y).cell(),
            }))
        }
        "pong" => Ok(Inbound::Pong),
        _ => Err(DecodeError::UnknownKind(kind)),
    }
}

/// Exactly `N` finite numbers.
fn numbers<const N: usize>(kind: &str, body: &Value) -> Result<[f64; N], DecodeError> {
    let items = body
        .as_array()
        .filter(|items| items.len() == N)
        .ok_or_else(|| bad(kind, &format!("expected an array of {N} numbers")))?;
    finite(kind, items)
}

/// The first `N` of at least `N` finite numbers.
fn leading<const N: usize>(kind: &str, body: &Value) -> Result<[f64; N], DecodeError> {
    let items = body
        .as_array()
        .filter(|items| items.len() >= N)
        .ok_or_else(|| bad(kind, &format!("expected at least {N} numbers")))?;
    finite(kind, &items[..N])
}

fn finite<const N: usize>(kind: &str, items: &[Value]) -> Result<[f64; N], DecodeError> {
    let mut out = [0.0; N];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = item
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| bad(kind, "coordinates must be numbers"))?;
    }
    Ok(out)
}

fn bad(kind: &str, reason: &str) -> DecodeError {
    DecodeError::BadBody {
        kind: kind.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use warfield_core::CellCoord;

    fn one(frame: &str) -> Inbound {
        let mut msgs = decode(frame).unwrap();
        assert_eq!(msgs.len(), 1, "{frame}");
        msgs.remove(0)
    }

    // ── Kinds ───────────────────────────────────────────────────

    #[test]
    fn move_takes_float_coordinates() {
        assert_eq!(
            one(r#"{"Type": "Move", "Body": [1.5, 2]}"#),
            Inbound::Action(PlayerAction::Move {
                to: Position::new(1.5, 2.0)
            })
        );
    }

    #[test]
    fn kinds_are_case_insensitive() {
        assert_eq!(
            one(r#"{"Type": "move", "Body": [0, 0]}"#),
            one(r#"{"Type": "MOVE", "Body": [0, 0]}"#)
        );
        assert_eq!(one(r#"{"Type": "pong"}"#), Inbound::Pong);
        assert_eq!(one(r#"{"Type": "Pong", "Body": null}"#), Inbound::Pong);
    }

    #[test]
    fn chat_body_is_text() {
        assert_eq!(
            one(r#"{"Type": "Chat", "Body": "hello there"}"#),
            Inbound::Chat("hello there".into())
        );
    }

    #[test]
    fn bomb_aliases_floor_to_cell() {
        let expected = Inbound::Action(PlayerAction::Bomb {
            at: CellCoord::new(3, 4),
        });
        assert_eq!(one(r#"{"Type": "Bomb", "Body": [3.9, 4.2]}"#), expected);
        assert_eq!(one(r#"{"Type": "LaBomba", "Body": [3, 4]}"#), expected);
    }

    #[test]
    fn edit_carries_value() {
        assert_eq!(
            one(r#"{"Type": "Edit", "Body": [1.7, 2, 20]}"#),
            Inbound::Action(PlayerAction::Edit {
                at: CellCoord::new(1, 2),
                value: 20,
            })
        );
        assert_eq!(
            decode(r#"{"Type": "ToggleCell", "Body": [1, 2, 20]}"#),
            Err(DecodeError::UnknownKind("ToggleCell".into()))
        );
    }

    #[test]
    fn toggle_tree_reads_the_first_two_numbers() {
        let expected = Inbound::Action(PlayerAction::ToggleTree {
            at: CellCoord::new(6, 0),
        });
        assert_eq!(one(r#"{"Type": "ToggleTree", "Body": [6.5, 0.2]}"#), expected);
        assert_eq!(one(r#"{"Type": "toggletree", "Body": [6, 0, 9]}"#), expected);
    }

    #[test]
    fn array_frame_yields_messages_in_order() {
        let msgs = decode(
            r#"[{"Type": "Move", "Body": [1, 1]}, {"Type": "Chat", "Body": "x"}, {"Type": "Pong"}]"#,
        )
        .unwrap();
        assert_eq!(msgs.len(), 3);
        assert_eq!(msgs[1], Inbound::Chat("x".into()));
        assert_eq!(msgs[2], Inbound::Pong);
        assert_eq!(decode("[]").unwrap(), vec![]);
    }

    // ── Rejections ──────────────────────────────────────────────

    #[test]
    fn empty_and_invalid_frames() {
        assert_eq!(decode("  "), Err(DecodeError::Empty));
        assert!(matches!(decode("{nope"), Err(DecodeError::InvalidJson(_))));
        assert!(matches!(decode("42"), Err(DecodeError::InvalidJson(_))));
        assert!(matches!(
            decode(r#"{"Body": [1, 2]}"#),
            Err(DecodeError::InvalidJson(_))
        ));
    }

    #[test]
    fn unknown_kind_keeps_its_spelling() {
        assert_eq!(
            decode(r#"{"Type": "Dance", "Body": 1}"#),
            Err(DecodeError::UnknownKind("Dance".into()))
        );
    }

    #[test]
    fn bad_bodies_are_rejected() {
        for frame in [
            r#"{"Type": "Move", "Body": [1]}"#,
            r#"{"Type": "Move", "Body": ["a", 2]}"#,
            r#"{"Type": "Move", "Body": {"X": 1, "Y": 2}}"#,
            r#"{"Type": "Chat", "Body": 7}"#,
            r#"{"Type": "Edit", "Body": [1, 2, 300]}"#,
            r#"{"Type": "Edit", "Body": [1, 2, 1.5]}"#,
            r#"{"Type": "Edit", "Body": [1, 2, -1]}"#,
            r#"{"Type": "ToggleTree", "Body": [1]}"#,
            r#"{"Type": "ToggleTree", "Body": [1, "b", 3]}"#,
        ] {
            assert!(
                matches!(decode(frame), Err(DecodeError::BadBody { .. })),
                "{frame}"
            );
        }
    }

    #[test]
    fn one_bad_element_rejects_the_array() {
        let frame = r#"[{"Type": "Pong"}, {"Type": "Dance"}]"#;
        assert_eq!(
            decode(frame),
            Err(DecodeError::UnknownKind("Dance".into()))
        );
    }

    proptest! {
        #[test]
        fn arbitrary_text_never_panics(frame in ".{0,64}") {
            let _ = decode(&frame);
        }
    }
}
