//! CLI module for agentlab - command-line interface and subcommands.
//!
//! Provides the main entry point with subcommands for tool inspection,
//! agent chats, and the RAG pipeline.

pub mod commands;

pub use commands::Cli;
