//! # Brush
//!
//! How a stroke (or the ink of a text item) is drawn: color, base thickness, which tool made it.

use crate::color::Rgba;

#[derive(
    strum::AsRefStr,
    strum::EnumIter,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Debug,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum Tool {
    Pen,
    Eraser,
    Highlighter,
}

bitflags::bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
    pub struct BrushFlags : u8 {
        /// Each segment carries its own width, see [`crate::item::Stroke::widths`].
        const VARIABLE_WIDTH = 0b0000_0001;
        /// Stroke was drawn as a straight line.
        const RULER          = 0b0000_0010;
        /// Stroke is subject to shape recognition.
        const RECOGNIZER     = 0b0000_0100;
    }
}

/// Preset thickness steps.
#[derive(strum::AsRefStr, strum::EnumIter, Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Thickness {
    VeryFine,
    Fine,
    Medium,
    Thick,
    VeryThick,
}
impl Thickness {
    /// Thickness in document units (1/72 inch) of this step for the given tool.
    #[must_use]
    pub fn for_tool(self, tool: Tool) -> f64 {
        // pen: 0.15, 0.3, 0.5, 0.8, 2 mm. eraser and highlighter: 1, 3, 7 mm.
        const PEN: [f64; 5] = [0.42, 0.85, 1.41, 2.26, 5.67];
        const WIDE: [f64; 5] = [2.83, 2.83, 8.50, 19.84, 19.84];
        match tool {
            Tool::Pen => PEN[self as usize],
            Tool::Eraser | Tool::Highlighter => WIDE[self as usize],
        }
    }
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Brush {
    pub color: Rgba,
    /// Base thickness, in document units.
    pub thickness: f64,
    pub tool: Tool,
    pub flags: BrushFlags,
}
impl Brush {
    #[must_use]
    pub fn new(tool: Tool, color: Rgba, thickness: f64) -> Self {
        let color = if tool == Tool::Highlighter {
            color.with_alpha(Rgba::HIGHLIGHTER_ALPHA)
        } else {
            color
        };
        Self {
            color,
            thickness,
            tool,
            flags: BrushFlags::empty(),
        }
    }
    #[must_use]
    pub fn preset(tool: Tool, color: Rgba, thickness: Thickness) -> Self {
        Self::new(tool, color, thickness.for_tool(tool))
    }
    #[must_use]
    pub fn variable_width(&self) -> bool {
        self.flags.contains(BrushFlags::VARIABLE_WIDTH)
    }
}
impl Default for Brush {
    fn default() -> Self {
        Self::preset(Tool::Pen, Rgba::BLACK, Thickness::Medium)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn presets() {
        let pen = Brush::preset(Tool::Pen, Rgba::BLACK, Thickness::VeryFine);
        assert_eq!(pen.thickness, 0.42);
        assert!(!pen.variable_width());
        let eraser = Brush::preset(Tool::Eraser, Rgba::WHITE, Thickness::Thick);
        assert_eq!(eraser.thickness, 19.84);
    }
    #[test]
    fn highlighter_is_translucent() {
        let brush = Brush::new(Tool::Highlighter, Rgba(0xffff_00ff), 8.5);
        assert_eq!(brush.color.alpha(), Rgba::HIGHLIGHTER_ALPHA);
    }
}
