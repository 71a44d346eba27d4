//! `flipclock` - flip-style countdown to a fixed instant
//!
//! The [`countdown`] engine is clock-driven and display-agnostic; the
//! [`runtime`] hosts it on tokio, and the CLI renders it in a terminal or
//! on a virtual clock.

pub mod cli;
pub mod config;
pub mod countdown;
pub mod error;
pub mod observability;
pub mod runtime;
