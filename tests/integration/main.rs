//! End-to-end tests driving the library against canned odds payloads.

mod mock_provider;
mod pipeline;
