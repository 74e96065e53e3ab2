//! Mesh coordination for block-lights.
//!
//! Provides the wire message codec, the radio seam, the discovery and
//! numbering protocol and colour dispatch.

mod coordinator;
mod dispatch;
// The Pod derive expands to unsafe impls
#[allow(unsafe_code)]
mod message;
mod radio;

pub use coordinator::{
    clear_all, clear_block, handle_reply, scan, set_block_number, update_block_number,
    ReplyOutcome, SwapOutcome,
};
pub use dispatch::{
    dispatch_colour, push_all, render_local, send_colour, DispatchOutcome, FailurePolicy,
    LED_COUNT,
};
pub use message::{Message, MessageType, MESSAGE_LEN};
pub use radio::{DeliveryResult, Radio};
