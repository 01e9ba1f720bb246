//! Operator commands for the Genii trust ledger
//!
//! Each command writes its report to a caller-supplied writer so the binary
//! prints to stdout and tests capture into a buffer.

#![forbid(unsafe_code)]

pub mod commands;
