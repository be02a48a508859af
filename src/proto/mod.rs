//! Messages and wire format of the streaming transport
//!
//! ```text
//!   client                                   server
//!     │ {"type":"publish"}                      │
//!     │ {"type":"reading", ...} × n  ─────────► │ IngestSession
//!     │ <half-close>                            │
//!     │ ◄───────────────── {"type":"ack",...}   │
//!
//!     │ {"type":"subscribe", ...}  ───────────► │ SubscriberSession
//!     │ ◄───────────────── {"type":"subscribed"}│
//!     │ ◄───────────── {"type":"reading",...}…  │
//! ```

pub mod codec;
pub mod frame;
pub mod message;

pub use codec::{ClientCodec, JsonFrameCodec, ServerCodec, DEFAULT_MAX_FRAME_LENGTH};
pub use frame::{ClientFrame, ServerFrame};
pub use message::{unix_nanos, Ack, Pong, Reading, ReadingWithMeta, ServerMeta, Subscription};
