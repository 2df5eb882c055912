//! BENCH — netlist reader/writer.
//!
//! The BENCH grammar is the only external interface CIRC and DEC are
//! contractually bound to: `INPUT(name)`, `OUTPUT(name)`, and
//! `<name> = LUT 0xHEX ( in1, in2, ... )` lines, `#`-comments, blank lines.
//! Hex here must span exactly `2^k/4` (rounded up to a whole nibble) digits
//! for a `k`-fanin LUT — unlike [`crate::truth::hex_to_bits`]'s lenient
//! oversized-prefix truncation used by the `-f HEX` CLI flags, a BENCH file
//! with the wrong digit count is simply malformed.

use crate::circuit::{Circuit, CircuitError, NodeId};
use crate::truth;

/// Errors raised while reading or writing a BENCH netlist.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    /// A non-blank, non-comment line didn't match `INPUT`/`OUTPUT`/LUT grammar.
    #[error("line {line}: malformed BENCH line: {text:?}")]
    MalformedLine {
        /// 1-based source line number.
        line: usize,
        /// The offending (comment-stripped) line text.
        text: String,
    },
    /// A LUT line's hex field was missing the required `0x` prefix.
    #[error("line {line}: LUT hex must start with 0x")]
    MissingHexPrefix {
        /// 1-based source line number.
        line: usize,
    },
    /// A LUT line's hex field doesn't span exactly the fanin count's width.
    #[error("line {line}: LUT {name:?} hex has {digits} digits, need {expected} for {fanins} fanins")]
    WrongHexWidth {
        /// 1-based source line number.
        line: usize,
        /// The LUT's output name.
        name: String,
        /// Hex digits actually present (after the `0x` prefix).
        digits: usize,
        /// Hex digits required for `fanins`.
        expected: usize,
        /// Declared fanin count.
        fanins: usize,
    },
    /// The circuit model rejected a LUT declaration.
    #[error(transparent)]
    Circuit(#[from] CircuitError),
}

fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut cur = String::new();
    for c in line.chars() {
        if c.is_whitespace() || c == ',' || c == '(' || c == ')' || c == '=' {
            if !cur.is_empty() {
                tokens.push(std::mem::take(&mut cur));
            }
        } else {
            cur.push(c);
        }
    }
    if !cur.is_empty() {
        tokens.push(cur);
    }
    tokens
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Parses BENCH text into a [`Circuit`].
pub fn read_bench(text: &str) -> Result<Circuit, BenchError> {
    let mut circuit = Circuit::new();
    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_comment(raw_line);
        let tokens = tokenize(line);
        if tokens.is_empty() {
            continue;
        }
        match tokens[0].as_str() {
            "INPUT" => {
                let name = tokens.get(1).ok_or_else(|| BenchError::MalformedLine {
                    line: line_no,
                    text: line.to_string(),
                })?;
                circuit.create_pi(name);
            }
            "OUTPUT" => {
                let name = tokens.get(1).ok_or_else(|| BenchError::MalformedLine {
                    line: line_no,
                    text: line.to_string(),
                })?;
                circuit.create_po(name);
            }
            _ if tokens.len() >= 3 && tokens[1] == "LUT" => {
                let name = tokens[0].clone();
                let hex_field = &tokens[2];
                let hex = hex_field.strip_prefix("0x").ok_or(BenchError::MissingHexPrefix { line: line_no })?;
                let fanins: Vec<&str> = tokens[3..].iter().map(String::as_str).collect();
                let table_bits = 1usize << fanins.len();
                let expected_digits = (table_bits + 3) / 4;
                if hex.len() != expected_digits {
                    return Err(BenchError::WrongHexWidth {
                        line: line_no,
                        name,
                        digits: hex.len(),
                        expected: expected_digits,
                        fanins: fanins.len(),
                    });
                }
                circuit.create_node(hex, &fanins, &name)?;
            }
            _ => {
                return Err(BenchError::MalformedLine { line: line_no, text: line.to_string() });
            }
        }
    }
    Ok(circuit)
}

/// Renders a [`Circuit`] back to BENCH text: all `INPUT` lines, all `OUTPUT`
/// lines, a blank line, then one LUT line per internal node in topological
/// (ascending-level) order, children listed MSB-first.
pub fn write_bench(circuit: &mut Circuit) -> String {
    circuit.update_levels().expect("circuit must be acyclic by the time it reaches BENCH emission");
    let mut out = String::new();
    for &pi in circuit.inputs() {
        out.push_str("INPUT(");
        out.push_str(circuit.node(pi).name());
        out.push_str(")\n");
    }
    for &po in circuit.outputs() {
        out.push_str("OUTPUT(");
        out.push_str(circuit.node(po).name());
        out.push_str(")\n");
    }
    out.push('\n');

    let mut internal: Vec<NodeId> = circuit
        .nodes()
        .iter()
        .filter(|n| !n.is_pi())
        .map(|n| n.id())
        .collect();
    internal.sort_by_key(|&id| (circuit.node(id).level().unwrap_or(0), id));

    for id in internal {
        let node = circuit.node(id);
        let bits: Vec<bool> = (0..node.matrix().expect("non-PI node has a matrix").cols())
            .map(|c| node.matrix().unwrap().get(0, c) != 0)
            .collect();
        let hex = truth::bits_to_hex(&bits);
        out.push_str(node.name());
        out.push_str(" = LUT 0x");
        out.push_str(&hex);
        out.push_str(" ( ");
        let children: Vec<&str> = node.inputs().iter().rev().map(|e| circuit.node(e.target).name()).collect();
        out.push_str(&children.join(", "));
        out.push_str(" )\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const NETLIST: &str = "\
# a tiny AND-NOT netlist
INPUT(a)
INPUT(b)
OUTPUT(f)

g = LUT 0x8 ( a, b )
f = LUT 0x1 ( g )
";

    #[test]
    fn reads_inputs_outputs_and_luts() {
        let circuit = read_bench(NETLIST).unwrap();
        assert_eq!(circuit.inputs().len(), 2);
        assert_eq!(circuit.outputs().len(), 1);
        let f = circuit.nodes().iter().find(|n| n.name() == "f").unwrap();
        assert!(f.is_po());
        assert_eq!(f.tt_hex(), "1");
    }

    #[test]
    fn rejects_missing_hex_prefix() {
        let bad = "INPUT(a)\nINPUT(b)\ng = LUT 8 ( a, b )\n";
        assert!(matches!(read_bench(bad), Err(BenchError::MissingHexPrefix { .. })));
    }

    #[test]
    fn rejects_wrong_hex_width() {
        let bad = "INPUT(a)\nINPUT(b)\ng = LUT 0x80 ( a, b )\n";
        assert!(matches!(read_bench(bad), Err(BenchError::WrongHexWidth { .. })));
    }

    #[test]
    fn round_trips_through_write_bench() {
        let mut circuit = read_bench(NETLIST).unwrap();
        let rendered = write_bench(&mut circuit);
        let reread = read_bench(&rendered).unwrap();
        assert_eq!(reread.inputs().len(), circuit.inputs().len());
        assert_eq!(reread.outputs().len(), circuit.outputs().len());
        let f = reread.nodes().iter().find(|n| n.name() == "f").unwrap();
        assert_eq!(f.tt_hex(), "1");
    }
}
