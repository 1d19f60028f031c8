// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ac-channel: the Live Channel. A per-session broadcast hub fed by a
//! tailer over `ac-content`, fanned out to WebSocket subscribers with
//! bounded per-subscriber queues, plus the inbox write path.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod envelope_stream;
pub mod hub;
pub mod inbox;
pub mod subscriber;
pub mod tailer;

pub use envelope_stream::{parse_tail_line, ParseError};
pub use hub::{ChannelHub, SessionChannel};
pub use inbox::write_inbox_message;
pub use subscriber::{spawn_subscriber, SubscriberMessage};
pub use tailer::run_tailer;
