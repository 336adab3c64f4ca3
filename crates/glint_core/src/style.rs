//! Inline element styles
//!
//! Only the properties the effects drive are modeled. Numeric properties are
//! addressed through [`StyleProperty`] so the tween engine can read and write
//! them generically.

use std::fmt;

/// A numeric style property that can be animated
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StyleProperty {
    /// Visibility weight in `[0, 1]`
    Opacity,
    /// Vertical translation as a percentage of the element's own height
    TranslateY,
    /// Rotation around the x axis, in degrees
    RotationX,
}

impl StyleProperty {
    pub const ALL: [StyleProperty; 3] = [
        StyleProperty::Opacity,
        StyleProperty::TranslateY,
        StyleProperty::RotationX,
    ];

    /// Value an element has before anything writes the property
    pub fn initial_value(self) -> f32 {
        match self {
            StyleProperty::Opacity => 1.0,
            StyleProperty::TranslateY | StyleProperty::RotationX => 0.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StyleProperty::Opacity => "opacity",
            StyleProperty::TranslateY => "translate-y",
            StyleProperty::RotationX => "rotation-x",
        }
    }
}

impl fmt::Display for StyleProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Display {
    #[default]
    Inline,
    InlineBlock,
    Block,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cursor {
    #[default]
    Auto,
    Pointer,
}

/// Inline style of an element
#[derive(Clone, Debug, PartialEq)]
pub struct Style {
    opacity: f32,
    translate_y: f32,
    rotation_x: f32,
    pub display: Display,
    pub cursor: Cursor,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            opacity: StyleProperty::Opacity.initial_value(),
            translate_y: StyleProperty::TranslateY.initial_value(),
            rotation_x: StyleProperty::RotationX.initial_value(),
            display: Display::default(),
            cursor: Cursor::default(),
        }
    }
}

impl Style {
    pub fn get(&self, property: StyleProperty) -> f32 {
        match property {
            StyleProperty::Opacity => self.opacity,
            StyleProperty::TranslateY => self.translate_y,
            StyleProperty::RotationX => self.rotation_x,
        }
    }

    /// Write a numeric property. Opacity is clamped to `[0, 1]`.
    pub fn set(&mut self, property: StyleProperty, value: f32) {
        match property {
            StyleProperty::Opacity => self.opacity = value.clamp(0.0, 1.0),
            StyleProperty::TranslateY => self.translate_y = value,
            StyleProperty::RotationX => self.rotation_x = value,
        }
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// True when no translation or rotation is applied
    pub fn has_identity_transform(&self) -> bool {
        self.translate_y == 0.0 && self.rotation_x == 0.0
    }

    /// Drop any translation and rotation
    pub fn clear_transform(&mut self) {
        self.translate_y = 0.0;
        self.rotation_x = 0.0;
    }
}
