// magick/src/geometry/mod.rs
//! Geometry strings: `[<width>][x<height>][%][!|<|>|^|@][{+-}<x>{+-}<y>]`.
//!
//! Parsing produces a [`GeometrySpec`] with the modifier already decoded, so
//! nothing downstream looks at the raw characters again.

mod dimensions;
mod tiles;

pub use dimensions::{fit_scale, resize_ratio, resolve_dimensions, resolve_region};
pub use tiles::{Region, TileGrid};

use crate::core::{MagickError, Result};
use std::fmt;
use std::str::FromStr;

/// The single trailing modifier a geometry may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    /// `!`: use width and height literally.
    IgnoreAspect,
    /// `>`: never enlarge.
    ShrinkOnly,
    /// `<`: never reduce.
    GrowOnly,
    /// `^`: cover the box instead of fitting inside it.
    Fill,
    /// `@`: the numbers describe a total pixel area.
    Area,
}

impl Modifier {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '!' => Some(Modifier::IgnoreAspect),
            '>' => Some(Modifier::ShrinkOnly),
            '<' => Some(Modifier::GrowOnly),
            '^' => Some(Modifier::Fill),
            '@' => Some(Modifier::Area),
            _ => None,
        }
    }

    fn as_char(self) -> char {
        match self {
            Modifier::IgnoreAspect => '!',
            Modifier::ShrinkOnly => '>',
            Modifier::GrowOnly => '<',
            Modifier::Fill => '^',
            Modifier::Area => '@',
        }
    }
}

/// Flags a parsed geometry can be queried for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryFlag {
    Percent,
    IgnoreAspect,
    ShrinkOnly,
    GrowOnly,
    Fill,
    Area,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometrySpec {
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Placement offset, present only when the string carried `+x+y`.
    pub offset: Option<(i32, i32)>,
    /// `%` applies to the width.
    pub width_percent: bool,
    /// `%` applies to the height.
    pub height_percent: bool,
    pub modifier: Option<Modifier>,
}

impl GeometrySpec {
    pub fn has(&self, flag: GeometryFlag) -> bool {
        match flag {
            GeometryFlag::Percent => self.width_percent || self.height_percent,
            GeometryFlag::IgnoreAspect => self.modifier == Some(Modifier::IgnoreAspect),
            GeometryFlag::ShrinkOnly => self.modifier == Some(Modifier::ShrinkOnly),
            GeometryFlag::GrowOnly => self.modifier == Some(Modifier::GrowOnly),
            GeometryFlag::Fill => self.modifier == Some(Modifier::Fill),
            GeometryFlag::Area => self.modifier == Some(Modifier::Area),
        }
    }

    pub fn x_offset(&self) -> i32 {
        self.offset.map(|(x, _)| x).unwrap_or(0)
    }

    pub fn y_offset(&self) -> i32 {
        self.offset.map(|(_, y)| y).unwrap_or(0)
    }

    /// Percentage of the source width, when the width is relative.
    /// A lone percentage covers both axes.
    pub fn width_percentage(&self) -> Option<u32> {
        if !self.width_percent {
            return None;
        }
        self.width.or(self.height.filter(|_| self.height_percent))
    }

    /// Percentage of the source height, when the height is relative.
    pub fn height_percentage(&self) -> Option<u32> {
        if !self.height_percent {
            return None;
        }
        self.height.or(self.width.filter(|_| self.width_percent))
    }
}

impl FromStr for GeometrySpec {
    type Err = MagickError;

    fn from_str(s: &str) -> Result<Self> {
        parse_geometry(s)
    }
}

impl fmt::Display for GeometrySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(w) = self.width {
            write!(f, "{}", w)?;
            if self.width_percent && !self.height_percent {
                f.write_str("%")?;
            }
        }
        if let Some(h) = self.height {
            write!(f, "x{}", h)?;
        }
        if self.height_percent {
            f.write_str("%")?;
        }
        if let Some(m) = self.modifier {
            write!(f, "{}", m.as_char())?;
        }
        if let Some((x, y)) = self.offset {
            write!(f, "{:+}{:+}", x, y)?;
        }
        Ok(())
    }
}

/// Parse a geometry string such as `"100x100>"`, `"25%x100%"` or `"100x100!+10+10"`.
pub fn parse_geometry(input: &str) -> Result<GeometrySpec> {
    let mut cursor = Cursor::new(input.trim());

    let width = cursor.number()?;
    let mut width_percent = cursor.eat('%');
    let mut height_percent = false;

    let mut height = None;
    if cursor.eat('x') || cursor.eat('X') {
        height = cursor.number()?;
        // A `%` after the full `WxH` covers both axes.
        if cursor.eat('%') {
            width_percent = true;
            height_percent = true;
        }
    }

    // Zero means "unspecified".
    let width = width.filter(|&w| w > 0);
    let height = height.filter(|&h| h > 0);
    if width.is_none() && height.is_none() {
        return Err(MagickError::Parse(format!(
            "Geometry has no width or height: {:?}",
            input
        )));
    }
    if width_percent && height.is_none() {
        height_percent = true;
    }

    let mut modifier = None;
    if let Some(m) = cursor.peek().and_then(Modifier::from_char) {
        cursor.bump();
        modifier = Some(m);
        if cursor.peek().and_then(Modifier::from_char).is_some() {
            return Err(MagickError::Parse(format!(
                "Geometry has more than one modifier: {:?}",
                input
            )));
        }
    }

    let mut offset = None;
    if matches!(cursor.peek(), Some('+') | Some('-')) {
        let x = cursor.signed()?;
        if !matches!(cursor.peek(), Some('+') | Some('-')) {
            return Err(MagickError::Parse(format!(
                "Geometry offset is missing its y component: {:?}",
                input
            )));
        }
        let y = cursor.signed()?;
        offset = Some((x, y));
    }

    if let Some(rest) = cursor.remaining() {
        return Err(MagickError::Parse(format!(
            "Unexpected trailing characters {:?} in geometry {:?}",
            rest, input
        )));
    }

    let spec = GeometrySpec {
        width,
        height,
        offset,
        width_percent,
        height_percent,
        modifier,
    };
    log::debug!("Parsed geometry {:?} as {:?}", input, spec);
    Ok(spec)
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn digits(&mut self) -> &'a str {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.bump();
        }
        &self.input[start..self.pos]
    }

    fn number(&mut self) -> Result<Option<u32>> {
        let digits = self.digits();
        if digits.is_empty() {
            return Ok(None);
        }
        digits
            .parse::<u32>()
            .map(Some)
            .map_err(|_| MagickError::Parse(format!("Geometry value out of range: {}", digits)))
    }

    fn signed(&mut self) -> Result<i32> {
        let negative = match self.peek() {
            Some('-') => true,
            Some('+') => false,
            _ => return Err(MagickError::Parse("Expected '+' or '-' in offset".to_string())),
        };
        self.bump();

        let digits = self.digits();
        if digits.is_empty() {
            return Err(MagickError::Parse("Offset sign without digits".to_string()));
        }
        let value = digits
            .parse::<i32>()
            .map_err(|_| MagickError::Parse(format!("Offset out of range: {}", digits)))?;
        Ok(if negative { -value } else { value })
    }

    fn remaining(&self) -> Option<&'a str> {
        let rest = &self.input[self.pos..];
        if rest.is_empty() {
            None
        } else {
            Some(rest)
        }
    }
}
