//! Integration and property tests for retwine live in `tests/`.
