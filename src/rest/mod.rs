/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

pub mod api;
pub mod client;
pub mod config;
pub mod correlation;
pub mod credential;
pub mod errors;
pub mod handshake;
pub mod invoker;
mod parsers;
pub mod people;
pub mod permission;
pub mod signing;

pub use api::*;
pub use client::*;
pub use config::*;
pub use correlation::*;
pub use credential::*;
pub use errors::*;
pub use handshake::*;
pub use invoker::*;
pub use people::*;
pub use permission::*;
