// Search Service Binding
//
// Implements advisor-core's SearchEngine and ProductStore contracts over
// HTTP against the external hybrid-search service.

pub mod client;

pub use client::SearchServiceClient;
