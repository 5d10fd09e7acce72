//! Plain-text instance input and plan output.
//!
//! # Input
//!
//! ```text
//! n
//! k
//! area_1 ... area_n
//! m_1 neighbour ... neighbour      (one line per unit)
//! profit_j,1 ... profit_j,n        (one line per period)
//! amin
//! ```
//!
//! # Output
//!
//! ```text
//! total_profit
//! count unit ... unit              (one line per period)
//! count unit ... unit              (reserve)
//! ```

use crate::decode::HarvestPlan;
use crate::error::{HarvestError, Result};
use crate::model::Instance;
use std::fmt::Write;
use std::str::FromStr;

struct Lines<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        let mut lines: Vec<&str> = text.lines().collect();
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }
        Self { lines, pos: 0 }
    }

    /// Next line and its 1-based number.
    fn next(&mut self, what: &str) -> Result<(usize, &'a str)> {
        let line_no = self.pos + 1;
        let line = self.lines.get(self.pos).copied().ok_or_else(|| {
            HarvestError::malformed(line_no, format!("unexpected end of input, expected {what}"))
        })?;
        self.pos += 1;
        Ok((line_no, line))
    }

    fn scalar<T: FromStr>(&mut self, what: &str) -> Result<T> {
        let (line_no, line) = self.next(what)?;
        let mut values = tokens::<T>(line_no, line)?;
        if values.len() != 1 {
            return Err(HarvestError::malformed(
                line_no,
                format!("expected a single {what}, found {} tokens", values.len()),
            ));
        }
        Ok(values.remove(0))
    }

    fn row<T: FromStr>(&mut self, what: &str, len: usize) -> Result<Vec<T>> {
        let (line_no, line) = self.next(what)?;
        let values = tokens::<T>(line_no, line)?;
        if values.len() != len {
            return Err(HarvestError::malformed(
                line_no,
                format!("expected {len} {what}, found {}", values.len()),
            ));
        }
        Ok(values)
    }
}

fn tokens<T: FromStr>(line_no: usize, line: &str) -> Result<Vec<T>> {
    line.split_whitespace()
        .map(|tok| {
            tok.parse::<T>()
                .map_err(|_| HarvestError::malformed(line_no, format!("invalid integer '{tok}'")))
        })
        .collect()
}

/// Parses an instance from its text record.
///
/// # Examples
///
/// ```
/// use u_harvest::io::parse_instance;
///
/// let instance = parse_instance("2\n1\n3 4\n1 2\n1 1\n5 6\n0\n").unwrap();
/// assert_eq!(instance.unit_count(), 2);
/// assert!(instance.are_adjacent(1, 2));
/// ```
pub fn parse_instance(text: &str) -> Result<Instance> {
    let mut lines = Lines::new(text);
    let n: usize = lines.scalar("unit count")?;
    let k: usize = lines.scalar("period count")?;
    let areas: Vec<u64> = lines.row("areas", n)?;

    let mut neighbours = Vec::with_capacity(n);
    for _ in 0..n {
        let (line_no, line) = lines.next("adjacency list")?;
        let values = tokens::<usize>(line_no, line)?;
        let Some((&count, ids)) = values.split_first() else {
            return Err(HarvestError::malformed(line_no, "missing neighbour count"));
        };
        if ids.len() != count {
            return Err(HarvestError::malformed(
                line_no,
                format!("declared {count} neighbours, found {}", ids.len()),
            ));
        }
        neighbours.push(ids.to_vec());
    }

    let mut profits = Vec::with_capacity(k);
    for _ in 0..k {
        profits.push(lines.row::<i64>("profits", n)?);
    }
    let amin: u64 = lines.scalar("minimum reserve area")?;

    if lines.pos < lines.lines.len() {
        return Err(HarvestError::malformed(lines.pos + 1, "unexpected trailing data"));
    }

    Instance::new(areas, neighbours, profits, amin)
}

/// Formats a plan as its text record (newline-terminated).
pub fn format_plan(plan: &HarvestPlan) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", plan.total_profit);
    for units in plan.harvest.iter().chain(std::iter::once(&plan.reserve)) {
        let _ = write!(out, "{}", units.len());
        for u in units {
            let _ = write!(out, " {u}");
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "3\n2\n1 2 3\n1 2\n2 1 3\n1 2\n4 5 6\n1 1 1\n3\n";

    #[test]
    fn test_parse_sample() {
        let inst = parse_instance(SAMPLE).unwrap();
        assert_eq!(inst.unit_count(), 3);
        assert_eq!(inst.period_count(), 2);
        assert_eq!(inst.areas(), &[1, 2, 3]);
        assert_eq!(inst.neighbours(2), &[1, 3]);
        assert_eq!(inst.profit(1, 3), 6);
        assert_eq!(inst.min_reserve_area(), 3);
    }

    #[test]
    fn test_parse_tolerates_trailing_blank_lines() {
        let text = format!("{SAMPLE}\n\n");
        assert!(parse_instance(&text).is_ok());
    }

    #[test]
    fn test_parse_zero_periods() {
        let inst = parse_instance("1\n0\n5\n0\n0\n").unwrap();
        assert_eq!(inst.period_count(), 0);
        assert!(inst.neighbours(1).is_empty());
    }

    #[test]
    fn test_neighbour_count_mismatch() {
        let err = parse_instance("2\n1\n1 1\n2 2\n1 1\n1 1\n0\n").unwrap_err();
        assert!(matches!(err, HarvestError::MalformedInput { line: 4, .. }));
    }

    #[test]
    fn test_row_length_mismatch() {
        let err = parse_instance("2\n1\n1\n").unwrap_err();
        assert!(matches!(err, HarvestError::MalformedInput { line: 3, .. }));
    }

    #[test]
    fn test_non_integer_token() {
        let err = parse_instance("2\nx\n").unwrap_err();
        assert_eq!(err.to_string(), "malformed input at line 2: invalid integer 'x'");
    }

    #[test]
    fn test_truncated_and_trailing() {
        assert!(parse_instance("1\n1\n5\n0\n").is_err());
        let err = parse_instance("1\n0\n5\n0\n0\n7\n").unwrap_err();
        assert!(matches!(err, HarvestError::MalformedInput { line: 6, .. }));
    }

    #[test]
    fn test_format_plan() {
        let plan = HarvestPlan {
            total_profit: 11,
            harvest: vec![vec![1, 3], vec![]],
            reserve: vec![2],
        };
        assert_eq!(format_plan(&plan), "11\n2 1 3\n0\n1 2\n");
    }
}
