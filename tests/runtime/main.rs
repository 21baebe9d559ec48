//! Integration tests for Layer 3: Runtime
//!
//! Tests for tokenizing, evaluating decisions against real input, and
//! decision table persistence.

mod evaluation;
mod persistence;
