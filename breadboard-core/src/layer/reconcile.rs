use super::{Phase, PlateLayer};
use crate::error::LayerResult;
use crate::kind::PlateKind;
use crate::plate::PlateId;
use crate::serialized::SerializedPlate;

impl PlateLayer {
    /// Bring the layer in line with `list`, keyed by plate id.
    ///
    /// New ids are added, known ids only take over the runtime state, and
    /// live plates missing from `list` are removed. A known id that now names
    /// another type is replaced. Returns whether the composition changed; the
    /// bulk change notification is emitted only in that case.
    pub fn set_plates(&mut self, list: &[SerializedPlate]) -> LayerResult<bool> {
        let mut kinds = Vec::with_capacity(list.len());
        for p in list {
            kinds.push(PlateKind::from_alias(&p.kind)?);
        }
        if self.phase != Phase::Idle {
            tracing::warn!(phase = ?self.phase, "reconciliation skipped during another operation");
            return Ok(false);
        }
        self.phase = Phase::Reconciling;
        let result = self.reconcile(list, &kinds);
        self.phase = Phase::Idle;

        let dirty = result?;
        if dirty {
            self.emit_composition();
        }
        Ok(dirty)
    }

    fn reconcile(&mut self, list: &[SerializedPlate], kinds: &[PlateKind]) -> LayerResult<bool> {
        self.clear_highlight();
        for p in self.plates.values_mut() {
            p.flags_mut().touched = false;
        }

        let mut dirty = false;
        for (entry, &kind) in list.iter().zip(kinds) {
            if let Some(p) = self.plates.get_mut(&entry.id)
                && p.kind() == kind
            {
                p.flags_mut().touched = true;
                let changed = entry.dynamic.as_ref().is_some_and(|state| p.merge_state(state));
                if changed {
                    self.redraw(entry.id, false);
                }
                continue;
            }
            // A plate of another type under this id is replaced, or swept
            // below if the replacement does not fit. Either way it changed.
            let replaced = self.plates.contains_key(&entry.id);
            let added = self.add_plate_serialized(entry)?;
            if let Some(id) = added
                && let Some(p) = self.plates.get_mut(&id)
            {
                p.flags_mut().touched = true;
            }
            dirty |= replaced || added.is_some();
        }

        let stale: Vec<PlateId> = self
            .plates
            .values()
            .filter(|p| !p.flags().touched)
            .map(|p| p.id())
            .collect();
        for id in stale {
            self.dispose(id);
            dirty = true;
        }
        tracing::debug!(dirty, plates = self.plates.len(), "reconciled");
        Ok(dirty)
    }
}
