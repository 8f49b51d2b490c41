//! DIMACS graph-instance reader.
//!
//! Accepts the standard coloring-benchmark format: `c` comment lines, one
//! `p edge <vertices> <edges>` problem line, and `e <u> <v>` edge lines with
//! 1-based endpoints. Vertices are mapped to dense 0-based ids.

use crate::error::{GraphError, GraphResult};
use crate::graph::{Graph, Vertex};
use std::path::Path;

/// Upper bound on instance size imposed by the `u16` color width: a complete
/// graph needs one color per vertex.
const MAX_VERTICES: usize = u16::MAX as usize - 1;

fn malformed(line: usize, message: impl Into<String>) -> GraphError {
    GraphError::Dimacs {
        line,
        message: message.into(),
    }
}

/// Parse a DIMACS instance from a string.
pub fn parse(input: &str) -> GraphResult<Graph> {
    let mut graph: Option<Graph> = None;
    let mut declared_vertices = 0usize;

    for (idx, raw) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        match fields.next() {
            Some("c") => continue,
            Some("p") => {
                if graph.is_some() {
                    return Err(malformed(line_no, "duplicate problem line"));
                }
                let format = fields
                    .next()
                    .ok_or_else(|| malformed(line_no, "problem line missing format"))?;
                if format != "edge" && format != "col" {
                    return Err(malformed(line_no, format!("unsupported format '{format}'")));
                }
                let n: usize = fields
                    .next()
                    .and_then(|s| s.parse().ok())
                    .ok_or_else(|| malformed(line_no, "problem line missing vertex count"))?;
                if n > MAX_VERTICES {
                    return Err(GraphError::TooManyVertices {
                        vertices: n,
                        max: MAX_VERTICES,
                    });
                }
                graph = Some(Graph::new(n));
                declared_vertices = n;
            }
            Some("e") => {
                let graph = graph
                    .as_mut()
                    .ok_or_else(|| malformed(line_no, "edge before problem line"))?;
                let u: usize = fields
                    .next()
                    .and_then(|s| s.parse().ok())
                    .ok_or_else(|| malformed(line_no, "edge line missing endpoint"))?;
                let v: usize = fields
                    .next()
                    .and_then(|s| s.parse().ok())
                    .ok_or_else(|| malformed(line_no, "edge line missing endpoint"))?;
                if u == 0 || v == 0 || u > declared_vertices || v > declared_vertices {
                    return Err(malformed(
                        line_no,
                        format!("endpoint out of range 1..={declared_vertices}"),
                    ));
                }
                if u != v {
                    // 1-based input, dense 0-based ids internally.
                    graph.link((u - 1) as Vertex, (v - 1) as Vertex);
                }
            }
            Some(other) => {
                return Err(malformed(line_no, format!("unknown line kind '{other}'")));
            }
            None => continue,
        }
    }

    graph.ok_or_else(|| malformed(input.lines().count(), "missing problem line"))
}

/// Read and parse a DIMACS instance from disk.
pub fn load(path: impl AsRef<Path>) -> GraphResult<Graph> {
    let text = std::fs::read_to_string(path)?;
    parse(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PETERSEN: &str = "\
c Petersen graph
p edge 10 15
e 1 2
e 2 3
e 3 4
e 4 5
e 5 1
e 1 6
e 2 7
e 3 8
e 4 9
e 5 10
e 6 8
e 8 10
e 10 7
e 7 9
e 9 6
";

    #[test]
    fn parses_petersen() {
        let g = parse(PETERSEN).unwrap();
        assert_eq!(g.num_vertices(), 10);
        assert_eq!(g.num_edges(), 15);
        for v in g.vertices() {
            assert_eq!(g.degree(v), 3);
        }
    }

    #[test]
    fn rejects_edge_before_problem_line() {
        assert!(matches!(
            parse("e 1 2\n"),
            Err(GraphError::Dimacs { line: 1, .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_endpoint() {
        let err = parse("p edge 3 1\ne 1 4\n").unwrap_err();
        assert!(matches!(err, GraphError::Dimacs { line: 2, .. }));
    }

    #[test]
    fn ignores_duplicate_edges_and_self_loops() {
        let g = parse("p edge 3 4\ne 1 2\ne 2 1\ne 3 3\ne 2 3\n").unwrap();
        assert_eq!(g.num_edges(), 2);
    }
}
