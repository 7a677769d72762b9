//! # rrc-uper: ASN.1 Unaligned PER codec for NR RRC
//!
//! Two ways to encode and decode 3GPP TS 38.331 messages with the UPER rules of
//! ITU-T X.691:
//!
//! - **Typed records** ([`rrc`]): hand-written Rust structs and enums that implement
//!   [`per::Pack`] / [`per::Unpack`] on top of the engine in [`per`].
//! - **Schema-driven** ([`codec`]): parse ASN.1 text with a PEST grammar ([`parser`]),
//!   resolve it ([`ast::ResolvedModule`]) and encode/decode [`Value`] trees.
//!
//! Both use the same primitives and produce the same bits.
//!
//! ## Engine
//!
//! - Bit cursors over caller buffers (`per::bits`), MSB first
//! - Constrained, semi-constrained, unconstrained and extensible integers
//! - Enumerations and choice indexes with extension markers
//! - Bit and octet strings, SEQUENCE OF, length determinants with fragmentation
//! - SEQUENCE presence bitmaps, extension additions as open types, unknown additions
//!   skipped by length
//!
//! ## Example schema
//!
//! ```text
//! RA-Prioritization ::= SEQUENCE {
//!     powerRampingStepHighPriority ENUMERATED {dB0, dB2, dB4, dB6},
//!     scalingFactorBI              ENUMERATED {zero, dot25, dot5, dot75} OPTIONAL,
//!     ...
//! }
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use rrc_uper::rrc::UlCcchMessage;
//!
//! let msg: UlCcchMessage = rrc_uper::per::decode(&[0x1d, 0xec, 0x89, 0xd0, 0x57, 0x66])?;
//! let bytes = rrc_uper::per::encode_to_vec(&msg)?;
//! # Ok::<(), rrc_uper::per::PerError>(())
//! ```

pub mod ast;
pub mod codec;
pub mod dump;
pub mod parser;
pub mod per;
pub mod rrc;
pub mod value;

pub use ast::{Module, ResolvedModule, SchemaError};
pub use codec::{Codec, CodecConfig, CodecError};
pub use parser::{parse, parse_file};
pub use per::{decode, encode_to_vec, pack, unpack, Pack, PerError, Unpack};
pub use value::Value;
