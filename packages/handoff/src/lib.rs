//! Blocking primitives for handing work from one thread to another.
//!
//! - [`Gate`] is a manual-reset event: once [set](GateHandle::set), it stays set until
//!   [cleared](GateHandle::clear), and every thread waiting on it is released.
//! - [`BoundedChannel`] is a capacity-limited FIFO queue with backpressure, built on two gates.
//!
//! Both come as an owning handle plus cloneable shared handles ([`GateHandle`],
//! [`ChannelHandle`]). Dropping the owning handle tears the primitive down and releases every
//! thread still blocked on it with an [`AbandonedError`](error::AbandonedError).

#[macro_use]
extern crate tracing;

mod gate;
mod channel;
pub mod error;

pub use crate::{
    gate::api::*,
    channel::api::*,
};
