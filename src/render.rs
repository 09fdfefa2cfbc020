//! Draw-call seam
//!
//! The simulation never touches a GPU. It produces sprite blits (position in
//! pixels, orientation in degrees) and HUD text through [`Canvas`]; whatever
//! owns the window implements it. [`DrawList`] records the calls, which is
//! what the headless runner and the tests use.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Sprite handles known to the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sprite {
    Logo,
    Ball,
    Paddle,
    RedBrick,
    OrangeBrick,
    YellowBrick,
    /// Debris sheet variant (0..DEBRIS_VARIANTS)
    Debris(u8),
}

/// Something that can put sprites and text on screen
pub trait Canvas {
    /// Draw `sprite` centred at `pos` (pixels), rotated by `angle` degrees
    fn blit(&mut self, sprite: Sprite, pos: Vec2, angle: f32, scale: Vec2);

    /// Draw a line of HUD text with its baseline starting at `pos`
    fn text(&mut self, pos: Vec2, text: &str);
}

/// A single recorded draw call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    Sprite {
        sprite: Sprite,
        pos: Vec2,
        angle: f32,
        scale: Vec2,
    },
    Text {
        pos: Vec2,
        text: String,
    },
}

/// Recording canvas
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous frame
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Number of blits of the given sprite
    pub fn count(&self, wanted: Sprite) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Sprite { sprite, .. } if *sprite == wanted))
            .count()
    }

    /// All text lines drawn this frame
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            DrawCommand::Sprite { .. } => None,
        })
    }
}

impl Canvas for DrawList {
    fn blit(&mut self, sprite: Sprite, pos: Vec2, angle: f32, scale: Vec2) {
        self.commands.push(DrawCommand::Sprite {
            sprite,
            pos,
            angle,
            scale,
        });
    }

    fn text(&mut self, pos: Vec2, text: &str) {
        self.commands.push(DrawCommand::Text {
            pos,
            text: text.to_string(),
        });
    }
}
