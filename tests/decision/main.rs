//! Integration tests for Layer 2: Decision
//!
//! Tests for grammar iteration, lookahead computation, and decision tables.

mod iter;
mod properties;
mod table;
