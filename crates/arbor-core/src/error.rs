// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use thiserror::Error;

/// Errors surfaced by a search.
///
/// Configuration errors are reported at `search` entry before any task is
/// spawned. Callback failures and stack overflows are reported by the first
/// failing task; they stop the search cluster-wide and surface once the root
/// task has completed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchError {
    /// The requested skeleton/parameter combination is invalid.
    #[error("invalid search configuration: {0}")]
    Config(String),

    /// A user-supplied generator, objective or bound callback panicked.
    #[error("user callback failed: {0}")]
    Callback(String),

    /// A task's generator stack would exceed the configured hard limit.
    #[error("generator stack overflow: depth {depth} exceeds limit {limit}")]
    StackOverflow {
        /// Depth the search attempted to reach.
        depth: usize,
        /// The configured `max_stack_depth`.
        limit: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let config = SearchError::Config("unknown skeleton".to_string());
        assert_eq!(
            config.to_string(),
            "invalid search configuration: unknown skeleton"
        );

        let overflow = SearchError::StackOverflow {
            depth: 5001,
            limit: 5000,
        };
        assert_eq!(
            overflow.to_string(),
            "generator stack overflow: depth 5001 exceeds limit 5000"
        );
    }
}
