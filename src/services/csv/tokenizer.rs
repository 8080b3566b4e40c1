//! Single left-to-right pass over raw CSV text. Comma delimiter, double-quote
//! escaping, CRLF/LF/CR terminators. Never fails: an unterminated quote is
//! closed by end of input.

use super::types::Row;

#[derive(Default)]
struct Accumulator {
    in_quotes: bool,
    current_value: String,
    current_line: Row,
    lines: Vec<Row>,
}

impl Accumulator {
    fn close_cell(&mut self) {
        let cell = self.current_value.trim().to_string();
        self.current_value.clear();
        self.current_line.push(cell);
    }

    fn close_line(&mut self) {
        self.close_cell();
        self.lines.push(std::mem::take(&mut self.current_line));
    }

    fn has_pending(&self) -> bool {
        !self.current_value.is_empty() || !self.current_line.is_empty()
    }
}

/// Splits `input` into logical lines of trimmed cells.
///
/// Lines are not padded to a common width. Lines whose cells are all empty
/// are dropped.
pub fn tokenize(input: &str) -> Vec<Row> {
    let mut acc = Accumulator::default();
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if !acc.in_quotes => acc.in_quotes = true,
            '"' => {
                if chars.peek() == Some(&'"') {
                    acc.current_value.push('"');
                    chars.next();
                } else {
                    acc.in_quotes = false;
                }
            }
            ',' if !acc.in_quotes => acc.close_cell(),
            '\r' if !acc.in_quotes => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                acc.close_line();
            }
            '\n' if !acc.in_quotes => acc.close_line(),
            _ => acc.current_value.push(ch),
        }
    }

    if acc.has_pending() {
        acc.close_line();
    }

    acc.lines
        .into_iter()
        .filter(|line| line.iter().any(|cell| !cell.is_empty()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_simple_lines() {
        let lines = tokenize("a,b,c\n1,2,3\n");
        assert_eq!(lines, vec![row(&["a", "b", "c"]), row(&["1", "2", "3"])]);
    }

    #[test]
    fn test_quoted_delimiter() {
        let lines = tokenize("a,\"b,c\",d\n1,2,3");
        assert_eq!(lines, vec![row(&["a", "b,c", "d"]), row(&["1", "2", "3"])]);
    }

    #[test]
    fn test_doubled_quote_escape() {
        let lines = tokenize("\"He said \"\"hi\"\"\",2");
        assert_eq!(lines, vec![row(&["He said \"hi\"", "2"])]);
    }

    #[test]
    fn test_embedded_newline_stays_in_cell() {
        let lines = tokenize("\"line1\nline2\",x");
        assert_eq!(lines, vec![row(&["line1\nline2", "x"])]);
    }

    #[test]
    fn test_embedded_crlf_is_literal() {
        let lines = tokenize("\"a\r\nb\",c\r\nd,e");
        assert_eq!(lines, vec![row(&["a\r\nb", "c"]), row(&["d", "e"])]);
    }

    #[test]
    fn test_line_endings_are_equivalent() {
        let lf = tokenize("a,b\n1,2\n");
        let crlf = tokenize("a,b\r\n1,2\r\n");
        let cr = tokenize("a,b\r1,2\r");
        assert_eq!(lf, crlf);
        assert_eq!(lf, cr);
    }

    #[test]
    fn test_cells_are_trimmed() {
        let lines = tokenize("  a , b  ,\t c\n");
        assert_eq!(lines, vec![row(&["a", "b", "c"])]);
    }

    #[test]
    fn test_blank_lines_dropped() {
        let lines = tokenize("a,b\n\n\n,\n  , \n1,2");
        assert_eq!(lines, vec![row(&["a", "b"]), row(&["1", "2"])]);
    }

    #[test]
    fn test_partially_empty_line_kept() {
        let lines = tokenize(",x,\n");
        assert_eq!(lines, vec![row(&["", "x", ""])]);
    }

    #[test]
    fn test_unterminated_quote_closes_at_eof() {
        let lines = tokenize("a,\"open cell\nstill open");
        assert_eq!(lines, vec![row(&["a", "open cell\nstill open"])]);
    }

    #[test]
    fn test_no_trailing_newline() {
        let lines = tokenize("x,y");
        assert_eq!(lines, vec![row(&["x", "y"])]);
    }

    #[test]
    fn test_empty_and_blank_inputs() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("\n\r\n\n").is_empty());
    }

    #[test]
    fn test_ragged_lines_kept_ragged() {
        let lines = tokenize("a,b\n1,2,3\n4");
        assert_eq!(lines[0].len(), 2);
        assert_eq!(lines[1].len(), 3);
        assert_eq!(lines[2].len(), 1);
    }
}
