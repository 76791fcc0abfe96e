//! Text module consumed by the playback interpreter.
//!
//! ```text
//! return {
//!   Width = 64,
//!   Height = 36,
//!   FPS = 15,
//!   Frames = {
//!     {r,g,b,r,g,b,...},
//!     {idx,r,g,b,...},
//!     {},
//!   }
//! }
//! ```
//!
//! Integers only, decimal, no separators. The layout is a compatibility contract and is
//! reproduced byte for byte.

use crate::codec::delta::EncodedFrame;
use crate::codec::grid::Grid;
use crate::codec::replay::GridReplay;
use crate::foundation::error::{DeltaGridError, DeltaGridResult};

/// Header fields of a module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ModuleHeader {
    /// Grid columns.
    pub width: u32,
    /// Grid rows.
    pub height: u32,
    /// Playback rate.
    pub fps: u32,
}

/// Serialize `frames` under `header`.
pub fn to_module_string(header: ModuleHeader, frames: &[EncodedFrame]) -> DeltaGridResult<String> {
    let approx_len = frames.iter().map(|f| f.values().len() * 4).sum::<usize>();
    let mut out = String::with_capacity(64 + approx_len);
    write_module(&mut out, header, frames)
        .map_err(|e| DeltaGridError::serialization(format!("module formatting failed: {e}")))?;
    Ok(out)
}

/// Stream the module text into `out`.
pub fn write_module(
    out: &mut impl std::fmt::Write,
    header: ModuleHeader,
    frames: &[EncodedFrame],
) -> std::fmt::Result {
    out.write_str("return {\n")?;
    writeln!(out, "  Width = {},", header.width)?;
    writeln!(out, "  Height = {},", header.height)?;
    writeln!(out, "  FPS = {},", header.fps)?;
    out.write_str("  Frames = {\n")?;
    for frame in frames {
        out.write_str("    {")?;
        for (i, v) in frame.values().iter().enumerate() {
            if i > 0 {
                out.write_char(',')?;
            }
            write!(out, "{v}")?;
        }
        out.write_str("},\n")?;
    }
    out.write_str("  }\n")?;
    out.write_str("}\n")
}

/// A module read back from text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoModule {
    /// Header fields.
    pub header: ModuleHeader,
    /// Flat frame lists in order; the first is the keyframe.
    pub frames: Vec<Vec<u32>>,
}

impl VideoModule {
    /// Frame lists as typed frames.
    pub fn encoded_frames(&self) -> Vec<EncodedFrame> {
        self.frames
            .iter()
            .enumerate()
            .map(|(i, v)| {
                if i == 0 {
                    EncodedFrame::Keyframe(v.clone())
                } else {
                    EncodedFrame::Delta(v.clone())
                }
            })
            .collect()
    }

    /// Reconstruct every frame's grid from an all-black start.
    pub fn replay(&self) -> DeltaGridResult<Vec<Grid>> {
        let mut replay = GridReplay::new(self.header.width, self.header.height);
        let mut out = Vec::with_capacity(self.frames.len());
        for (i, values) in self.frames.iter().enumerate() {
            out.push(replay.apply_values(i == 0, values)?.clone());
        }
        Ok(out)
    }

    /// Total cells written by delta frames.
    pub fn changed_cells(&self) -> usize {
        self.frames.iter().skip(1).map(|f| f.len() / 4).sum()
    }
}

/// Parse module text. Whitespace between tokens is not significant.
pub fn parse_module(text: &str) -> DeltaGridResult<VideoModule> {
    let mut p = Parser {
        src: text.as_bytes(),
        pos: 0,
    };
    p.keyword("return")?;
    p.punct(b'{')?;
    let width = p.field("Width")?;
    let height = p.field("Height")?;
    let fps = p.field("FPS")?;
    p.keyword("Frames")?;
    p.punct(b'=')?;
    p.punct(b'{')?;

    let mut frames = Vec::new();
    while p.peek() == Some(b'{') {
        p.punct(b'{')?;
        let mut values = Vec::new();
        if p.peek() != Some(b'}') {
            loop {
                values.push(p.int()?);
                if p.peek() == Some(b',') {
                    p.punct(b',')?;
                } else {
                    break;
                }
            }
        }
        p.punct(b'}')?;
        p.optional(b',');
        frames.push(values);
    }
    p.punct(b'}')?;
    p.optional(b',');
    p.punct(b'}')?;
    if p.peek().is_some() {
        return Err(p.error("trailing data after module"));
    }

    Ok(VideoModule {
        header: ModuleHeader { width, height, fps },
        frames,
    })
}

struct Parser<'a> {
    src: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn skip_ws(&mut self) {
        while self.pos < self.src.len() && self.src[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_ws();
        self.src.get(self.pos).copied()
    }

    fn error(&self, msg: &str) -> DeltaGridError {
        DeltaGridError::serialization(format!("{msg} at byte {}", self.pos))
    }

    fn punct(&mut self, c: u8) -> DeltaGridResult<()> {
        if self.peek() != Some(c) {
            return Err(self.error(&format!("expected '{}'", c as char)));
        }
        self.pos += 1;
        Ok(())
    }

    fn optional(&mut self, c: u8) {
        if self.peek() == Some(c) {
            self.pos += 1;
        }
    }

    fn keyword(&mut self, kw: &str) -> DeltaGridResult<()> {
        self.skip_ws();
        let end = self.pos + kw.len();
        if self.src.get(self.pos..end) != Some(kw.as_bytes()) {
            return Err(self.error(&format!("expected '{kw}'")));
        }
        self.pos = end;
        Ok(())
    }

    fn field(&mut self, name: &str) -> DeltaGridResult<u32> {
        self.keyword(name)?;
        self.punct(b'=')?;
        let v = self.int()?;
        self.punct(b',')?;
        Ok(v)
    }

    fn int(&mut self) -> DeltaGridResult<u32> {
        self.skip_ws();
        let start = self.pos;
        while self.pos < self.src.len() && self.src[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error("expected integer"));
        }
        std::str::from_utf8(&self.src[start..self.pos])
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .ok_or_else(|| self.error("integer out of range"))
    }
}

#[cfg(test)]
#[path = "../tests/unit/module.rs"]
mod tests;
