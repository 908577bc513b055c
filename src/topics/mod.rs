//! Topic addressing: normalization, wildcard patterns and subscription storage.
//!
//! This module groups the pure data structures behind the emitter:
//!
//! ## Contents
//! - [`pattern`]: topic splitting/normalization and the segment-wise matcher
//! - [`registry`]: ordered subscription records with group lifecycle
//!
//! ## Quick reference
//! Topics are compared by their sequence of non-empty `/`-separated segments,
//! never by raw string, so `/foo//bar/` and `foo/bar` address the same
//! channel. Patterns additionally allow `*` (exactly one segment) and a
//! terminal `**` (zero or more trailing segments).

pub(crate) mod pattern;
pub(crate) mod registry;
