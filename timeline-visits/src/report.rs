//! Visit aggregation: chronological ordering and duplicate-free rendering.

use eyre::Result;

use crate::model::VisitMatch;

/// Sorts matches ascending by their start instant. The sort is stable, so
/// matches with equal instants keep their input order.
pub fn chronological(matches: Vec<VisitMatch>) -> Result<Vec<VisitMatch>> {
    let mut keyed = matches
        .into_iter()
        .map(|visit| Ok((visit.start_instant()?, visit)))
        .collect::<Result<Vec<_>>>()?;
    keyed.sort_by_key(|(instant, _)| *instant);
    Ok(keyed.into_iter().map(|(_, visit)| visit).collect())
}

/// Renders report lines, suppressing any line that is textually identical to
/// the one immediately before it. Identical lines further apart both stay.
pub fn render(matches: &[VisitMatch]) -> Vec<String> {
    let mut lines: Vec<String> = Vec::with_capacity(matches.len());
    for visit in matches {
        let line = visit.report_line();
        if lines.last().map(String::as_str) != Some(line.as_str()) {
            lines.push(line);
        }
    }
    lines
}
