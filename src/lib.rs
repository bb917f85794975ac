#![deny(missing_docs)]

//! Core library for the document summarizer.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Plain-text extractors for PDF, DOCX, and TXT documents.
pub mod extraction;
/// Structured logging and tracing setup.
pub mod logging;
/// Summarization pipeline orchestration.
pub mod processing;
/// Generative summarization provider clients.
pub mod summarization;
