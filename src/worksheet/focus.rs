use crate::model::Block;

/// Focused block and, for blocks with rows, the focused row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Focus {
    pub index: usize,
    pub sub: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FocusChange {
    pub from: Option<Focus>,
    pub to: Option<Focus>,
}

impl FocusChange {
    /// True when the focused block changed, not just the row inside it.
    pub fn block_changed(&self) -> bool {
        self.from.map(|f| f.index) != self.to.map(|f| f.index)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

pub(super) fn clamp(blocks: &[Block], index: usize, sub: Option<usize>) -> Option<Focus> {
    if blocks.is_empty() {
        return None;
    }
    let index = index.min(blocks.len() - 1);
    let n = blocks[index].sub_count();
    let sub = if n == 0 {
        None
    } else {
        Some(sub.unwrap_or(0).min(n - 1))
    };
    Some(Focus { index, sub })
}

fn enter(blocks: &[Block], index: usize, direction: MoveDirection) -> Focus {
    let n = blocks[index].sub_count();
    let sub = match (n, direction) {
        (0, _) => None,
        (_, MoveDirection::Down) => Some(0),
        (n, MoveDirection::Up) => Some(n - 1),
    };
    Focus { index, sub }
}

pub(super) fn step(
    blocks: &[Block],
    current: Option<Focus>,
    direction: MoveDirection,
) -> Option<Focus> {
    if blocks.is_empty() {
        return None;
    }
    let Some(cur) = current else {
        let index = match direction {
            MoveDirection::Down => 0,
            MoveDirection::Up => blocks.len() - 1,
        };
        return Some(enter(blocks, index, direction));
    };

    let n = blocks.get(cur.index).map(|b| b.sub_count()).unwrap_or(0);
    match (direction, cur.sub) {
        (MoveDirection::Down, Some(j)) if j + 1 < n => {
            return Some(Focus {
                index: cur.index,
                sub: Some(j + 1),
            });
        }
        (MoveDirection::Up, Some(j)) if j > 0 => {
            return Some(Focus {
                index: cur.index,
                sub: Some(j - 1),
            });
        }
        _ => {}
    }

    match direction {
        MoveDirection::Down if cur.index + 1 < blocks.len() => {
            Some(enter(blocks, cur.index + 1, direction))
        }
        MoveDirection::Up if cur.index > 0 => Some(enter(blocks, cur.index - 1, direction)),
        _ => Some(cur),
    }
}
