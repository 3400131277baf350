//! Fixed-stride instruction records
//!
//! Every drawing or state call is packed into one [`Instruction`]: an opcode,
//! the addressed context, six float payload slots and an optional text handle.
//! All opcodes share the same layout so a batch can be walked by
//! `index * STRIDE` without looking at the opcode first.
//!
//! Memory layout (`#[repr(C)]`, little-endian on every supported target):
//! - op: `u8`          (offset 0)
//! - pad: `u8`         (offset 1)
//! - ctx: `u16`        (offset 2)
//! - ctx2: `u16`       (offset 4) - reserved secondary context, always 0
//! - pad: `u16`        (offset 6)
//! - payload: `[f32; 6]` (offset 8)
//! - text: `u32`       (offset 32) - text pool handle, 0 = none
//!   Total: 36 bytes

use std::fmt;

use bytemuck::{Pod, Zeroable};

use crate::slots::ContextId;
use crate::text::TextHandle;

/// Size in bytes of one encoded instruction
pub const STRIDE: usize = 36;

const _: () = assert!(std::mem::size_of::<Instruction>() == STRIDE);

/// Number of float payload slots per instruction
pub const PAYLOAD_LEN: usize = 6;

/// Opcodes (values are part of the wire format)
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Op {
    SetFill = 0,
    SetStroke = 1,
    LineWidth = 2,
    FontSize = 3,
    GlobalAlpha = 4,
    LineCapRound = 5,
    LineJoinRound = 6,
    TextAlignCenter = 7,
    TextBaselineMiddle = 8,
    SetTransform = 9,
    Save = 10,
    Restore = 11,
    BeginPath = 12,
    MoveTo = 13,
    LineTo = 14,
    QuadCurveTo = 15,
    BezierCurveTo = 16,
    Arc = 17,
    Ellipse = 18,
    Rect = 19,
    RoundRect = 20,
    FillRect = 21,
    StrokeRect = 22,
    Fill = 23,
    Stroke = 24,
    Clip = 25,
    FillText = 26,
    StrokeText = 27,
    ClosePath = 28,
    TextAlignLeft = 29,
    TextAlignRight = 30,
}

impl Op {
    /// Every opcode in wire order
    pub const ALL: [Op; 31] = [
        Op::SetFill,
        Op::SetStroke,
        Op::LineWidth,
        Op::FontSize,
        Op::GlobalAlpha,
        Op::LineCapRound,
        Op::LineJoinRound,
        Op::TextAlignCenter,
        Op::TextBaselineMiddle,
        Op::SetTransform,
        Op::Save,
        Op::Restore,
        Op::BeginPath,
        Op::MoveTo,
        Op::LineTo,
        Op::QuadCurveTo,
        Op::BezierCurveTo,
        Op::Arc,
        Op::Ellipse,
        Op::Rect,
        Op::RoundRect,
        Op::FillRect,
        Op::StrokeRect,
        Op::Fill,
        Op::Stroke,
        Op::Clip,
        Op::FillText,
        Op::StrokeText,
        Op::ClosePath,
        Op::TextAlignLeft,
        Op::TextAlignRight,
    ];

    /// Decode a raw opcode byte. Unknown values yield `None`.
    pub fn from_u8(raw: u8) -> Option<Op> {
        Op::ALL.get(raw as usize).copied()
    }

    /// Whether this opcode carries a text handle
    pub fn is_text(self) -> bool {
        matches!(self, Op::FillText | Op::StrokeText)
    }

    pub fn name(self) -> &'static str {
        match self {
            Op::SetFill => "set_fill",
            Op::SetStroke => "set_stroke",
            Op::LineWidth => "line_width",
            Op::FontSize => "font_size",
            Op::GlobalAlpha => "global_alpha",
            Op::LineCapRound => "line_cap_round",
            Op::LineJoinRound => "line_join_round",
            Op::TextAlignCenter => "text_align_center",
            Op::TextBaselineMiddle => "text_baseline_middle",
            Op::SetTransform => "set_transform",
            Op::Save => "save",
            Op::Restore => "restore",
            Op::BeginPath => "begin_path",
            Op::MoveTo => "move_to",
            Op::LineTo => "line_to",
            Op::QuadCurveTo => "quad_curve_to",
            Op::BezierCurveTo => "bezier_curve_to",
            Op::Arc => "arc",
            Op::Ellipse => "ellipse",
            Op::Rect => "rect",
            Op::RoundRect => "round_rect",
            Op::FillRect => "fill_rect",
            Op::StrokeRect => "stroke_rect",
            Op::Fill => "fill",
            Op::Stroke => "stroke",
            Op::Clip => "clip",
            Op::FillText => "fill_text",
            Op::StrokeText => "stroke_text",
            Op::ClosePath => "close_path",
            Op::TextAlignLeft => "text_align_left",
            Op::TextAlignRight => "text_align_right",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for Op {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Op::from_u8(raw).ok_or(raw)
    }
}

/// One encoded drawing/state record
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Instruction {
    op: u8,
    _pad0: u8,
    ctx: u16,
    ctx2: u16,
    _pad1: u16,
    payload: [f32; PAYLOAD_LEN],
    text: u32,
}

impl Instruction {
    /// Zero-payload instruction
    pub fn new(op: Op, ctx: ContextId) -> Self {
        Self {
            op: op as u8,
            ctx: ctx.get(),
            ..Zeroable::zeroed()
        }
    }

    /// Instruction with up to six payload floats; missing slots are zero.
    /// Extra values past the sixth are ignored.
    pub fn with_payload(op: Op, ctx: ContextId, values: &[f32]) -> Self {
        let mut instruction = Self::new(op, ctx);
        for (slot, value) in instruction.payload.iter_mut().zip(values) {
            *slot = *value;
        }
        instruction
    }

    /// Text instruction referencing a string in the tape's text pool
    pub fn with_text(op: Op, ctx: ContextId, handle: TextHandle) -> Self {
        Self {
            text: handle.get(),
            ..Self::new(op, ctx)
        }
    }

    /// Build a record from a raw opcode byte, for exercising hosts with
    /// opcodes this build does not know
    pub fn from_raw(op: u8, ctx: ContextId, payload: [f32; PAYLOAD_LEN]) -> Self {
        Self {
            op,
            ctx: ctx.get(),
            payload,
            ..Zeroable::zeroed()
        }
    }

    /// Decoded opcode, `None` if the byte is not a known opcode
    pub fn op(&self) -> Option<Op> {
        Op::from_u8(self.op)
    }

    pub fn raw_op(&self) -> u8 {
        self.op
    }

    pub fn context(&self) -> ContextId {
        ContextId::new(self.ctx)
    }

    /// Reserved secondary context; always zero for now
    pub fn secondary_context(&self) -> ContextId {
        ContextId::new(self.ctx2)
    }

    pub fn payload(&self) -> &[f32; PAYLOAD_LEN] {
        &self.payload
    }

    pub fn text(&self) -> Option<TextHandle> {
        TextHandle::from_raw(self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_is_fixed_stride() {
        assert_eq!(std::mem::size_of::<Instruction>(), STRIDE);
        assert_eq!(std::mem::align_of::<Instruction>(), 4);
    }

    #[test]
    fn test_field_offsets() {
        let handle = TextHandle::from_raw(7).unwrap();
        let instr = Instruction::with_text(Op::FillText, ContextId::new(0x0102), handle);
        let bytes = bytemuck::bytes_of(&instr);

        assert_eq!(bytes[0], Op::FillText as u8);
        assert_eq!(u16::from_le_bytes([bytes[2], bytes[3]]), 0x0102);
        assert_eq!(u16::from_le_bytes([bytes[4], bytes[5]]), 0);
        assert_eq!(
            u32::from_le_bytes([bytes[32], bytes[33], bytes[34], bytes[35]]),
            7
        );
    }

    #[test]
    fn test_payload_zero_fill() {
        let instr = Instruction::with_payload(Op::MoveTo, ContextId::new(3), &[1.5, -2.0]);
        assert_eq!(instr.payload(), &[1.5, -2.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(instr.text(), None);
        assert_eq!(instr.secondary_context(), ContextId::PRIMARY);
        assert_eq!(instr.context(), ContextId::new(3));
    }

    #[test]
    fn test_payload_truncates_extra_values() {
        let instr = Instruction::with_payload(
            Op::SetTransform,
            ContextId::PRIMARY,
            &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0],
        );
        assert_eq!(instr.payload(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_opcode_values_are_stable() {
        for (i, op) in Op::ALL.iter().enumerate() {
            assert_eq!(*op as u8 as usize, i);
            assert_eq!(Op::from_u8(i as u8), Some(*op));
        }
        assert_eq!(Op::TextAlignRight as u8, 30);
        assert_eq!(Op::from_u8(31), None);
        assert_eq!(Op::try_from(200u8), Err(200));
    }

    #[test]
    fn test_unknown_opcode_record() {
        let instr = Instruction::from_raw(99, ContextId::new(1), [0.0; PAYLOAD_LEN]);
        assert_eq!(instr.op(), None);
        assert_eq!(instr.raw_op(), 99);
    }
}
