//! S-expression message protocol: frames in, events and responses out.

pub mod codec;
pub mod dispatch;
pub mod plist;
