//! Snake body and movement state machine
//!
//! Segments never track their own history. Each committed move rewrites the
//! old head as a neck piece, shifts every other segment into its predecessor's
//! slot, re-derives the tail and places a fresh head one cell ahead.

use serde::{Deserialize, Serialize};

use super::direction::Direction;
use super::grid::Cell;
use super::input::DirectionQueue;

/// Visual/topological shape of one body segment
///
/// Corners are named after the two neighbours they connect to. The order
/// matches the sprite sheet, see [`SegmentShape::sprite_index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentShape {
    HeadUp,
    HeadLeft,
    HeadDown,
    HeadRight,
    StraightUp,
    StraightLeft,
    StraightDown,
    StraightRight,
    TurnUpLeft,
    TurnUpRight,
    TurnDownLeft,
    TurnDownRight,
    TailUp,
    TailLeft,
    TailDown,
    TailRight,
}

impl SegmentShape {
    /// Head piece pointing along `facing`
    pub fn head(facing: Direction) -> Self {
        match facing {
            Direction::Left => SegmentShape::HeadLeft,
            Direction::Down => SegmentShape::HeadDown,
            Direction::Right => SegmentShape::HeadRight,
            Direction::Up | Direction::None => SegmentShape::HeadUp,
        }
    }

    /// Tail piece trailing a segment moving along `facing`
    pub fn tail(facing: Direction) -> Self {
        match facing {
            Direction::Up => SegmentShape::TailUp,
            Direction::Left => SegmentShape::TailLeft,
            Direction::Down => SegmentShape::TailDown,
            Direction::Right | Direction::None => SegmentShape::TailRight,
        }
    }

    /// Shape the old head takes when the snake turns from `old` to `new`
    pub fn neck(old: Direction, new: Direction) -> Self {
        use Direction::{Down, Left, Right, Up};
        match (old, new) {
            (Left, Up) => SegmentShape::TurnUpRight,
            (Right, Up) => SegmentShape::TurnUpLeft,
            (_, Up) => SegmentShape::StraightUp,

            (Left, Down) => SegmentShape::TurnDownRight,
            (Right, Down) => SegmentShape::TurnDownLeft,
            (_, Down) => SegmentShape::StraightDown,

            (Up, Left) => SegmentShape::TurnDownLeft,
            (Down, Left) => SegmentShape::TurnUpLeft,
            (_, Left) => SegmentShape::StraightLeft,

            (Up, Right) => SegmentShape::TurnDownRight,
            (Down, Right) => SegmentShape::TurnUpRight,
            (_, Right) => SegmentShape::StraightRight,

            (_, Direction::None) => SegmentShape::head(old),
        }
    }

    /// Head pieces; renderers draw these above the body layer
    pub fn is_head(&self) -> bool {
        matches!(
            self,
            SegmentShape::HeadUp | SegmentShape::HeadLeft | SegmentShape::HeadDown | SegmentShape::HeadRight
        )
    }

    /// Corner pieces, one per bend in the body
    pub fn is_corner(&self) -> bool {
        matches!(
            self,
            SegmentShape::TurnUpLeft
                | SegmentShape::TurnUpRight
                | SegmentShape::TurnDownLeft
                | SegmentShape::TurnDownRight
        )
    }

    /// Frame in a 16-frame snake sprite sheet, for renderers syncing segment sprites
    pub fn sprite_index(&self) -> u8 {
        *self as u8
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub cell: Cell,
    pub shape: SegmentShape,
    /// Travel direction; drives the shape of whatever follows this segment
    pub facing: Direction,
    /// False while a growth piece is still stacked on the cell ahead of it
    pub spawned: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snake {
    pub alive: bool,
    /// Head first
    pub body: Vec<Segment>,
    /// Committed heading
    pub heading: Direction,
    /// Turns buffered ahead of the committed heading
    pub queue: DirectionQueue,
    pub speed: f32,
    pub score: u32,
    min_speed: f32,
    max_speed: f32,
}

impl Snake {
    /// A snake standing upright on `head` with `length` stacked segments
    ///
    /// Only the head is spawned; the rest unfold over the first moves.
    pub fn new(head: Cell, length: usize, speed: f32, min_speed: f32, max_speed: f32) -> Self {
        let length = length.max(1);
        let mut body = Vec::with_capacity(length);
        for i in 0..length {
            let shape = if i == 0 {
                SegmentShape::HeadUp
            } else if i == length - 1 {
                SegmentShape::TailUp
            } else {
                SegmentShape::StraightUp
            };
            body.push(Segment {
                cell: head,
                shape,
                facing: Direction::Up,
                spawned: i == 0,
            });
        }

        Self {
            alive: true,
            body,
            heading: Direction::Up,
            queue: DirectionQueue::new(),
            speed: speed.clamp(min_speed, max_speed),
            score: 0,
            min_speed,
            max_speed,
        }
    }

    pub fn head(&self) -> Option<&Segment> {
        self.body.first()
    }

    pub fn head_cell(&self) -> Option<Cell> {
        self.head().map(|s| s.cell)
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Cells of every segment behind the head
    pub fn body_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.body.iter().skip(1).map(|s| s.cell)
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.body.iter().map(|s| s.cell)
    }

    /// Buffer a requested heading change
    pub fn offer_direction(&mut self, direction: Direction) {
        self.queue.offer(direction, self.heading);
    }

    /// Commit the next buffered turn and move one cell
    pub fn advance(&mut self) -> bool {
        self.heading = self.queue.commit(self.heading);
        self.pull(self.heading)
    }

    /// Move the head one cell toward `direction`, dragging the body along
    ///
    /// Returns false without touching anything on a reversal or an empty body.
    pub fn pull(&mut self, direction: Direction) -> bool {
        if direction == Direction::None {
            return false;
        }
        let Some(head) = self.body.first_mut() else {
            return false;
        };
        if head.facing.is_opposite(direction) {
            return false;
        }

        head.shape = SegmentShape::neck(head.facing, direction);
        self.shift_body();

        let head = &mut self.body[0];
        head.shape = SegmentShape::head(direction);
        head.facing = direction;
        head.cell = head.cell.step(direction);
        head.spawned = true;
        true
    }

    fn shift_body(&mut self) {
        for i in (1..self.body.len()).rev() {
            let ahead = self.body[i - 1].clone();
            let segment = &mut self.body[i];
            if segment.cell != ahead.cell {
                segment.spawned = true;
            }
            segment.cell = ahead.cell;
            segment.shape = ahead.shape;
            segment.facing = ahead.facing;
        }
        self.update_tail();
    }

    fn update_tail(&mut self) {
        let len = self.body.len();
        if len <= 1 {
            return;
        }
        let facing = self.body[len - 2].facing;
        self.body[len - 1].shape = SegmentShape::tail(facing);
    }

    /// Append an unspawned copy of the tail
    pub fn grow(&mut self) {
        let Some(tail) = self.body.last() else {
            return;
        };
        let mut piece = tail.clone();
        piece.spawned = false;
        self.body.push(piece);
    }

    pub fn increase_speed(&mut self, amount: f32) {
        self.speed = (self.speed + amount).clamp(self.min_speed, self.max_speed);
    }

    pub fn decrease_speed(&mut self, amount: f32) {
        self.speed = (self.speed - amount).clamp(self.min_speed, self.max_speed);
    }
}
