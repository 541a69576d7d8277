// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request interception and observer fan-out
//!
//! Relays every eligible request and broadcasts a bounded summary of the
//! exchange to all registered observers.

mod exchange;
mod filter;
mod interceptor;
mod observer;
mod preview;
mod stats;
mod transport;

pub use exchange::{
    HeaderEntry, HeaderList, InterceptedExchange, RelayMessage, NETWORK_ERROR_STATUS,
    NETWORK_ERROR_STATUS_TEXT,
};
pub use filter::EligibilityFilter;
pub use interceptor::Interceptor;
pub use observer::{
    fan_out, CallbackObserver, ChannelObserver, FanOut, JsonLinesObserver, LogObserver, Observer,
    ObserverCallback, ObserverHub, ObserverId, ObserverRegistry, DEFAULT_QUEUE_CAPACITY,
};
pub use preview::{body_preview, is_text_eligible, truncate_text, TEXT_CONTENT_TYPES, TRUNCATION_MARKER};
pub use stats::{RelayStats, StatsReport};
pub use transport::Transport;
