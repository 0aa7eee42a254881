//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - tools / call: inspect and run MCP tools directly
//! - chat / demo: talk to the email agent
//! - weather / calc / joke: single-shot model demos
//! - ingest / ask: the RAG pipeline

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Agentlab - LLM function calling, MCP tools, agents, and RAG
#[derive(Parser, Debug)]
#[command(name = "agentlab")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List tools exposed by the connected MCP servers
    Tools,

    /// Call one tool directly, without the model
    Call {
        /// Tool name
        tool: String,

        /// Arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,
    },

    /// Send messages, in order, within one conversation with the email agent
    Chat {
        /// Messages to send
        #[arg(required = true)]
        messages: Vec<String>,
    },

    /// Run the scripted email-agent demo
    Demo,

    /// Ask about the weather (function calling with get_current_weather)
    Weather {
        /// Question for the model
        question: String,
    },

    /// Ask an arithmetic question (add and multiply tools)
    Calc {
        /// Question for the model
        question: String,
    },

    /// Have the model tell a joke on a topic
    Joke {
        /// Joke topic
        #[arg(short, long, default_value = "dogs")]
        topic: String,
    },

    /// Load, split, embed, and store a text file
    Ingest {
        /// Text file to ingest
        file: PathBuf,
    },

    /// Answer a question from the ingested documents
    Ask {
        /// Question to answer
        query: String,
    },
}
