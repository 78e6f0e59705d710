//! Visual equivalence of serialized plates, used to grade a solution
//! against a reference composition. Pure geometry: no grid, no surface.

use serde::Serialize;

use crate::error::RegistryError;
use crate::geometry;
use crate::kind::PlateKind;
use crate::plate::PlateId;
use crate::serialized::SerializedPlate;

/// Same type, same properties and the same look on the board.
///
/// Orientation-sensitive kinds must share the exact position. Reversible
/// kinds only need to cover the same absolute cells, so a resistor turned
/// half-way round onto the same two cells is the same resistor.
///
/// No grid is taken: footprints are computed from cell offsets alone, so
/// the outcome cannot depend on cell size, gaps or grid bounds.
pub fn compare_plates(a: &SerializedPlate, b: &SerializedPlate) -> Result<bool, RegistryError> {
    if a.kind != b.kind {
        return Ok(false);
    }
    let kind = PlateKind::from_alias(&a.kind)?;
    let props_a = kind.normalize_properties(&a.properties);
    let props_b = kind.normalize_properties(&b.properties);
    if props_a != props_b {
        return Ok(false);
    }
    if a.position == b.position {
        return Ok(true);
    }
    if !kind.is_reversible() {
        return Ok(false);
    }
    let (Ok(surface_a), Ok(surface_b)) = (kind.surface(&props_a), kind.surface(&props_b)) else {
        return Ok(false);
    };
    Ok(geometry::absolute_cells(a.position, &surface_a)
        == geometry::absolute_cells(b.position, &surface_b))
}

/// Outcome of pairing a solution with a reference composition.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MatchReport {
    /// (reference id, solution id) pairs judged equivalent.
    pub matched: Vec<(PlateId, PlateId)>,
    /// Reference plates without a counterpart in the solution.
    pub missing: Vec<SerializedPlate>,
    /// Solution plates without a counterpart in the reference.
    pub extra: Vec<SerializedPlate>,
}

impl MatchReport {
    pub fn is_exact(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }
}

/// Pair every reference plate with the first unused equivalent solution
/// plate. Ids play no part; students are free to build in any order.
pub fn match_compositions(
    reference: &[SerializedPlate],
    solution: &[SerializedPlate],
) -> Result<MatchReport, RegistryError> {
    let mut used = vec![false; solution.len()];
    let mut report = MatchReport::default();
    for r in reference {
        let mut hit = None;
        for (i, s) in solution.iter().enumerate() {
            if !used[i] && compare_plates(r, s)? {
                hit = Some(i);
                break;
            }
        }
        match hit {
            Some(i) => {
                used[i] = true;
                report.matched.push((r.id, solution[i].id));
            }
            None => report.missing.push(r.clone()),
        }
    }
    report.extra = solution
        .iter()
        .zip(&used)
        .filter(|&(_, &u)| !u)
        .map(|(s, _)| s.clone())
        .collect();
    Ok(report)
}
