use crate::calibration::CalibrationPoint;

/// Looks `query` up in `points`, interpolating linearly between the
/// two breakpoints that bracket it.
///
/// Queries at or below the first input return the first output, and
/// queries at or above the last input return the last output. The
/// curve is never extrapolated.
///
/// `points` must be non-empty and sorted ascending by input. A `NaN`
/// query matches no segment and yields `NaN`.
pub fn interpolate(query: f32, points: &[CalibrationPoint]) -> f32 {
    let first = points[0];
    let last = points[points.len() - 1];

    if query <= first.input {
        return first.output;
    }
    if query >= last.input {
        return last.output;
    }

    points
        .windows(2)
        .find_map(|w| {
            let (p0, p1) = (w[0], w[1]);

            if query >= p0.input && query <= p1.input {
                Some(lerp(p0.input, p1.input, p0.output, p1.output, query))
            } else {
                None
            }
        })
        .unwrap_or(f32::NAN)
}

fn lerp(x0: f32, x1: f32, y0: f32, y1: f32, x: f32) -> f32 {
    if x1 == x0 {
        return y0;
    }

    y0 + (x - x0) * (y1 - y0) / (x1 - x0)
}
