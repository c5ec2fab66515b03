//! Interpreter of a small PostScript-like language for 2-D vector graphics.
//!
//! A script is executed against a [`Surface`], the crate does no drawing by
//! itself, see `psview-render` for a raster surface.
mod definition;
mod graphics;
mod machine;
mod parser;
mod surface;

pub use definition::{collect, Body, Definitions, Program};
pub use graphics::{
    trans::{
        page_to_device, user_to_device, DeviceSpace, PageSpace, PageToDeviceSpace, UserSpace,
        UserToDeviceSpace, UserToPageSpace,
    },
    GraphicsState, GraphicsStateStack, Point, Rgba,
};
pub use machine::{
    interpret, Diagnostic, Machine, MachineError, MachineResult, OperandStack, Operator, Report,
    SessionOption, SessionOptionBuilder,
};
pub use parser::{parse_number, tokenize, Token, TokenKind, Tokens};
pub use surface::{Call, Recorder, Surface};
