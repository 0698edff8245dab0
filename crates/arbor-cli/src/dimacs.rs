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

//! Minimal DIMACS clique-format reader: `p edge N M` followed by
//! `e u v` lines with 1-based vertex ids. Comments (`c`) are skipped.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DimacsError {
    #[error("missing `p edge` problem line")]
    MissingProblemLine,

    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },
}

/// An undirected graph read from a DIMACS file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimacsGraph {
    pub vertices: usize,
    /// 0-based endpoint pairs.
    pub edges: Vec<(usize, usize)>,
}

/// Parses DIMACS clique-format text.
pub fn parse(input: &str) -> Result<DimacsGraph, DimacsError> {
    let mut vertices = None;
    let mut edges = Vec::new();

    for (index, raw) in input.lines().enumerate() {
        let line = index + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with('c') {
            continue;
        }

        let mut fields = text.split_whitespace();
        match fields.next() {
            Some("p") => {
                let format = fields.next().unwrap_or_default();
                if format != "edge" && format != "col" {
                    return Err(DimacsError::Malformed {
                        line,
                        message: format!("unsupported problem format '{format}'"),
                    });
                }
                let count = fields
                    .next()
                    .and_then(|n| n.parse::<usize>().ok())
                    .ok_or_else(|| DimacsError::Malformed {
                        line,
                        message: "missing vertex count".to_string(),
                    })?;
                vertices = Some(count);
            }
            Some("e") => {
                let vertices = vertices.ok_or(DimacsError::MissingProblemLine)?;
                let mut endpoint = || {
                    fields
                        .next()
                        .and_then(|v| v.parse::<usize>().ok())
                        .ok_or_else(|| DimacsError::Malformed {
                            line,
                            message: "edge needs two vertex ids".to_string(),
                        })
                };
                let u = endpoint()?;
                let v = endpoint()?;
                if u == 0 || v == 0 || u > vertices || v > vertices {
                    return Err(DimacsError::Malformed {
                        line,
                        message: format!("edge ({u}, {v}) out of range"),
                    });
                }
                edges.push((u - 1, v - 1));
            }
            _ => {
                return Err(DimacsError::Malformed {
                    line,
                    message: format!("unrecognised line '{text}'"),
                });
            }
        }
    }

    let vertices = vertices.ok_or(DimacsError::MissingProblemLine)?;
    Ok(DimacsGraph { vertices, edges })
}
