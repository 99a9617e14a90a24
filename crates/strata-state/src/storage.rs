//! Per-field value storage.

/// Values of one field over the whole domain.
///
/// A dof-major multi-vector: `num_dofs` components, each holding one `f64`
/// per mesh entity. Component `d` occupies
/// `values[d * num_entities .. (d + 1) * num_entities]`.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldData {
    num_entities: usize,
    num_dofs: usize,
    values: Vec<f64>,
}

impl FieldData {
    /// Zero-filled storage for `num_entities` entities with `num_dofs` components.
    pub fn zeros(num_entities: usize, num_dofs: usize) -> Self {
        Self {
            num_entities,
            num_dofs,
            values: vec![0.0; num_entities * num_dofs],
        }
    }

    /// Build storage from dof-major values.
    ///
    /// Returns `None` if `values.len() != num_entities * num_dofs`.
    pub fn from_values(num_entities: usize, num_dofs: usize, values: Vec<f64>) -> Option<Self> {
        if values.len() != num_entities * num_dofs {
            return None;
        }
        Some(Self {
            num_entities,
            num_dofs,
            values,
        })
    }

    /// Number of mesh entities.
    pub fn num_entities(&self) -> usize {
        self.num_entities
    }

    /// Number of components.
    pub fn num_dofs(&self) -> usize {
        self.num_dofs
    }

    /// Whether `other` has the same entity and component counts.
    pub fn same_shape(&self, other: &FieldData) -> bool {
        self.num_entities == other.num_entities && self.num_dofs == other.num_dofs
    }

    /// All values, dof-major.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// All values, dof-major, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// One component, if `dof` is in range.
    pub fn component(&self, dof: usize) -> Option<&[f64]> {
        if dof >= self.num_dofs {
            return None;
        }
        let n = self.num_entities;
        Some(&self.values[dof * n..(dof + 1) * n])
    }

    /// One component, mutably, if `dof` is in range.
    pub fn component_mut(&mut self, dof: usize) -> Option<&mut [f64]> {
        if dof >= self.num_dofs {
            return None;
        }
        Some(self.column_mut(dof))
    }

    /// Component `dof`. Caller guarantees `dof < num_dofs`.
    pub(crate) fn column_mut(&mut self, dof: usize) -> &mut [f64] {
        let n = self.num_entities;
        &mut self.values[dof * n..(dof + 1) * n]
    }

    /// Value of component `dof` at `entity`, if both are in range.
    pub fn get(&self, entity: usize, dof: usize) -> Option<f64> {
        if entity >= self.num_entities || dof >= self.num_dofs {
            return None;
        }
        Some(self.values[dof * self.num_entities + entity])
    }

    /// Set every entity's component `d` to `per_dof[d]`.
    ///
    /// Caller guarantees `per_dof.len() == num_dofs`.
    pub(crate) fn fill_per_dof(&mut self, per_dof: &[f64]) {
        for (dof, &v) in per_dof.iter().enumerate() {
            self.column_mut(dof).fill(v);
        }
    }

    /// Like [`fill_per_dof`](Self::fill_per_dof), restricted to `entities`.
    pub(crate) fn fill_per_dof_on(&mut self, entities: &[usize], per_dof: &[f64]) {
        for (dof, &v) in per_dof.iter().enumerate() {
            let column = self.column_mut(dof);
            for &e in entities {
                column[e] = v;
            }
        }
    }

    /// Copy values from a same-shaped block. Caller checks the shape.
    pub(crate) fn copy_values_from(&mut self, other: &FieldData) {
        self.values.copy_from_slice(&other.values);
    }

    /// Largest absolute value across all components; `0.0` if empty.
    pub fn norm_inf(&self) -> f64 {
        self.values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_are_dof_major() {
        let data = FieldData::from_values(3, 2, vec![1.0, 2.0, 3.0, 10.0, 20.0, 30.0]).unwrap();
        assert_eq!(data.component(0), Some(&[1.0, 2.0, 3.0][..]));
        assert_eq!(data.component(1), Some(&[10.0, 20.0, 30.0][..]));
        assert_eq!(data.component(2), None);
        assert_eq!(data.get(2, 1), Some(30.0));
        assert_eq!(data.get(3, 0), None);
    }

    #[test]
    fn out_of_range_component_is_none() {
        let mut data = FieldData::zeros(2, 1);
        assert!(data.component_mut(1).is_none());
        data.component_mut(0).unwrap()[1] = 4.0;
        assert_eq!(data.as_slice(), &[0.0, 4.0]);
    }

    #[test]
    fn from_values_checks_length() {
        assert!(FieldData::from_values(3, 2, vec![0.0; 5]).is_none());
    }

    #[test]
    fn fill_on_subset_leaves_rest() {
        let mut data = FieldData::zeros(4, 2);
        data.fill_per_dof_on(&[1, 3], &[5.0, -1.0]);
        assert_eq!(data.as_slice(), &[0.0, 5.0, 0.0, 5.0, 0.0, -1.0, 0.0, -1.0]);
        assert_eq!(data.norm_inf(), 5.0);
    }
}
