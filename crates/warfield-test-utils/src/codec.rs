//! A plain-text [`Codec`] for tests.
//!
//! Inbound frames are whitespace-separated words:
//!
//! ```text
//! move 1.5 2    bomb 3 4    edit 3 4 2    tree 3 4    chat hello there    pong
//! ```
//!
//! Outbound frames are `grid <generation> <w>x<h> <digits>`,
//! `entities <id>=<name>@<x>,<y> ...`, `trees <0/1 per cell>`,
//! `chat <line>`, `notice <text>` and `ping`. Cell values above 9 are
//! written as `*`.

use std::fmt::Write as _;

use warfield_core::{
    CellCoord, Codec, DecodeError, Frame, Inbound, PlayerAction, Position, WorldSnapshot,
};

/// Whitespace text codec. Stateless.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainCodec;

fn bad(kind: &str, reason: &str) -> DecodeError {
    DecodeError::BadBody {
        kind: kind.to_string(),
        reason: reason.to_string(),
    }
}

fn ints<const N: usize>(kind: &str, args: &[&str]) -> Result<[i32; N], DecodeError> {
    if args.len() != N {
        return Err(bad(kind, &format!("expected {N} integers")));
    }
    let mut out = [0; N];
    for (slot, arg) in out.iter_mut().zip(args) {
        *slot = arg.parse().map_err(|_| bad(kind, "not an integer"))?;
    }
    Ok(out)
}

impl Codec for PlainCodec {
    fn decode(&self, frame: &str) -> Result<Vec<Inbound>, DecodeError> {
        let frame = frame.trim();
        let mut words = frame.split_whitespace();
        let kind = words.next().ok_or(DecodeError::Empty)?;
        let args: Vec<&str> = words.collect();
        let msg = match kind {
            "move" => {
                if args.len() != 2 {
                    return Err(bad(kind, "expected x y"));
                }
                let x: f64 = args[0].parse().map_err(|_| bad(kind, "bad x"))?;
                let y: f64 = args[1].parse().map_err(|_| bad(kind, "bad y"))?;
                Inbound::Action(PlayerAction::Move {
                    to: Position::new(x, y),
                })
            }
            "bomb" => {
                let [x, y] = ints::<2>(kind, &args)?;
                Inbound::Action(PlayerAction::Bomb {
                    at: CellCoord::new(x, y),
                })
            }
            "edit" => {
                let [x, y, v] = ints::<3>(kind, &args)?;
                let value = u8::try_from(v).map_err(|_| bad(kind, "value out of range"))?;
                Inbound::Action(PlayerAction::Edit {
                    at: CellCoord::new(x, y),
                    value,
                })
            }
            "tree" => {
                let [x, y] = ints::<2>(kind, &args)?;
                Inbound::Action(PlayerAction::ToggleTree {
                    at: CellCoord::new(x, y),
                })
            }
            "chat" => Inbound::Chat(frame["chat".len()..].trim().to_string()),
            "pong" => Inbound::Pong,
            other => return Err(DecodeError::UnknownKind(other.to_string())),
        };
        Ok(vec![msg])
    }

    fn encode_snapshot(&self, snapshot: &WorldSnapshot) -> Vec<Frame> {
        let digits: String = snapshot
            .cells
            .iter()
            .map(|&v| char::from_digit(u32::from(v), 10).unwrap_or('*'))
            .collect();
        let grid = format!(
            "grid {} {}x{} {}",
            snapshot.generation, snapshot.width, snapshot.height, digits
        );
        let mut entities = String::from("entities");
        for e in &snapshot.entities {
            let _ = write!(
                entities,
                " {}={}@{},{}",
                e.id, e.name, e.position.x, e.position.y
            );
        }
        let trees: String = snapshot
            .trees
            .iter()
            .map(|&t| if t { '1' } else { '0' })
            .collect();
        vec![
            Frame::from(grid),
            Frame::from(entities),
            Frame::from(format!("trees {trees}")),
        ]
    }

    fn encode_chat(&self, line: &str) -> Frame {
        Frame::from(format!("chat {line}"))
    }

    fn encode_notice(&self, text: &str) -> Frame {
        Frame::from(format!("notice {text}"))
    }

    fn encode_ping(&self) -> Frame {
        Frame::from("ping")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warfield_core::{Entity, EntityId, Generation};

    #[test]
    fn decodes_each_kind() {
        let c = PlainCodec;
        assert_eq!(
            c.decode("move 1.5 2").unwrap(),
            vec![Inbound::Action(PlayerAction::Move {
                to: Position::new(1.5, 2.0)
            })]
        );
        assert_eq!(
            c.decode("edit 3 4 2").unwrap(),
            vec![Inbound::Action(PlayerAction::Edit {
                at: CellCoord::new(3, 4),
                value: 2
            })]
        );
        assert_eq!(c.decode("chat  hi there ").unwrap(), vec![Inbound::Chat("hi there".into())]);
        assert_eq!(c.decode("pong").unwrap(), vec![Inbound::Pong]);
        assert_eq!(
            c.decode("tree 0 5").unwrap(),
            vec![Inbound::Action(PlayerAction::ToggleTree {
                at: CellCoord::new(0, 5)
            })]
        );
    }

    #[test]
    fn rejects_garbage() {
        let c = PlainCodec;
        assert_eq!(c.decode("   "), Err(DecodeError::Empty));
        assert!(matches!(c.decode("dance"), Err(DecodeError::UnknownKind(_))));
        assert!(matches!(c.decode("bomb 1"), Err(DecodeError::BadBody { .. })));
        assert!(matches!(c.decode("edit 1 1 300"), Err(DecodeError::BadBody { .. })));
    }

    #[test]
    fn snapshot_frames() {
        let mut e = Entity::player(EntityId(3), "ann");
        e.position = Position::new(1.0, 2.5);
        let snap = WorldSnapshot {
            generation: Generation(4),
            width: 2,
            height: 2,
            cells: vec![0, 1, 5, 20],
            trees: vec![true, false, false, true],
            entities: vec![e],
        };
        let frames = PlainCodec.encode_snapshot(&snap);
        assert_eq!(&*frames[0], "grid 4 2x2 015*");
        assert_eq!(&*frames[1], "entities 3=ann@1,2.5");
        assert_eq!(&*frames[2], "trees 1001");
    }
}
