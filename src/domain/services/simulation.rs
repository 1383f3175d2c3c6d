//! "What-if" grades: override the latest attempt of some courses and see where
//! the cumulative average would land.

use crate::domain::model::{EnrollmentRecord, Grade, GradeOverride, SimulationOutcome};
use crate::domain::services::normalizer::normalize;
use crate::domain::services::progress::cumulative_average;

pub fn simulate(records: &[EnrollmentRecord], overrides: &[GradeOverride]) -> SimulationOutcome {
    let baseline = normalize(records).canonical;

    let mut projected_records = records.to_vec();
    let mut applied = Vec::new();
    let mut unapplied = Vec::new();

    for grade_override in overrides {
        let target = projected_records
            .iter_mut()
            .rev()
            .find(|r| r.course_name == grade_override.course_name);

        match target {
            Some(record) => {
                record.grade = Grade::Letter(grade_override.grade);
                applied.push(grade_override.clone());
            }
            None => {
                tracing::warn!(
                    "Simulation: '{}' is not in the enrollment history, override ignored",
                    grade_override.course_name
                );
                unapplied.push(grade_override.clone());
            }
        }
    }

    let projected = normalize(&projected_records).canonical;

    SimulationOutcome {
        baseline_average: cumulative_average(&baseline),
        projected_average: cumulative_average(&projected),
        baseline_credited_units: baseline.credited_units(),
        projected_credited_units: projected.credited_units(),
        applied,
        unapplied,
    }
}
