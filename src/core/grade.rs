//! Edge grades from node elevations
//!
//! `grade = (elevation(v) - elevation(u)) / length`, rounded to three
//! decimals, plus its absolute value.

use log::debug;

use crate::core::graph::RoadGraph;

/// Grade stage of the pipeline
pub trait GradeCalculator {
    fn add_grades(&self, graph: &mut RoadGraph);
}

/// Default grade calculator
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeGrades;

impl GradeCalculator for EdgeGrades {
    fn add_grades(&self, graph: &mut RoadGraph) {
        let mut undefined = 0usize;

        graph.update_edges(|from, to, data| {
            let grade = match (from.elevation, to.elevation) {
                (Some(start), Some(end)) if data.length > 0.0 => {
                    Some(round_grade((end - start) / data.length))
                }
                _ => None,
            };
            if grade.is_none() {
                undefined += 1;
            }
            data.grade = grade;
            data.grade_abs = grade.map(f64::abs);
        });

        if undefined > 0 {
            debug!("{undefined} edges have no grade (missing elevation or zero length)");
        }
    }
}

fn round_grade(grade: f64) -> f64 {
    (grade * 1000.0).round() / 1000.0
}
