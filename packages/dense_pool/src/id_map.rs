/// Two mutually inverse tables that map stable identifiers to storage indices and back.
///
/// Both tables always have the same length, equal to the capacity of the owning pool. For every
/// identifier `id` in `0..len()`, `indices_to_ids[ids_to_indices[id]] == id`, and vice versa.
/// Every mutation in this type preserves that bijection, which is what lets a pool relocate
/// items in storage without invalidating the identifiers it has handed out.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct IdMap {
    ids_to_indices: Vec<usize>,
    indices_to_ids: Vec<usize>,
}

impl IdMap {
    /// Creates an identity mapping of the given length (identifier `n` lives at index `n`).
    #[must_use]
    pub(crate) fn identity(len: usize) -> Self {
        Self {
            ids_to_indices: (0..len).collect(),
            indices_to_ids: (0..len).collect(),
        }
    }

    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.ids_to_indices.len()
    }

    #[must_use]
    pub(crate) fn ids_to_indices(&self) -> &[usize] {
        &self.ids_to_indices
    }

    #[must_use]
    pub(crate) fn indices_to_ids(&self) -> &[usize] {
        &self.indices_to_ids
    }

    /// The storage index currently occupied by `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is outside the mapping.
    #[must_use]
    #[inline]
    pub(crate) fn index_of(&self, id: usize) -> usize {
        *self
            .ids_to_indices
            .get(id)
            .expect("identifier is outside the range issued by this pool")
    }

    /// The identifier currently occupying storage index `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside the mapping.
    #[must_use]
    #[inline]
    pub(crate) fn id_at(&self, index: usize) -> usize {
        *self
            .indices_to_ids
            .get(index)
            .expect("storage index is outside the capacity of this pool")
    }

    /// Extends both tables to `new_len`, identity-mapping the appended entries.
    ///
    /// Existing entries are untouched. Because the existing identifiers `0..len()` already map
    /// onto the existing indices `0..len()`, the appended identifiers can only map onto the
    /// appended indices, so the identity suffix keeps the bijection intact.
    pub(crate) fn grow_to(&mut self, new_len: usize) {
        let old_len = self.len();
        debug_assert!(new_len >= old_len, "IdMap never shrinks");

        self.ids_to_indices.extend(old_len..new_len);
        self.indices_to_ids.extend(old_len..new_len);
    }

    /// Exchanges the identifiers that occupy storage indices `a` and `b`.
    ///
    /// This is the mapping half of a swap-remove: after the caller swaps the items at `a` and
    /// `b`, each identifier again resolves to its own item.
    #[expect(
        clippy::indexing_slicing,
        reason = "both indices come from the pool's own live range, which is within capacity"
    )]
    #[inline]
    pub(crate) fn swap_indices(&mut self, a: usize, b: usize) {
        let id_a = self.indices_to_ids[a];
        let id_b = self.indices_to_ids[b];

        self.indices_to_ids.swap(a, b);
        self.ids_to_indices[id_a] = b;
        self.ids_to_indices[id_b] = a;
    }

    /// Moves the identifier at `from` to `to` (where `from <= to`), shifting the identifiers in
    /// `from + 1..=to` down by one index each.
    ///
    /// This is the mapping half of an ordered removal: the caller performs the same rotation on
    /// the items so every survivor keeps its relative position.
    #[expect(
        clippy::indexing_slicing,
        reason = "both indices come from the pool's own live range, which is within capacity"
    )]
    pub(crate) fn rotate_to_back(&mut self, from: usize, to: usize) {
        debug_assert!(from <= to);

        self.indices_to_ids[from..=to].rotate_left(1);

        for index in from..=to {
            let id = self.indices_to_ids[index];
            self.ids_to_indices[id] = index;
        }
    }

    /// Verifies that the two tables are inverse permutations of each other.
    #[cfg_attr(test, mutants::skip)] // This is essentially test logic, mutation is meaningless.
    #[cfg(debug_assertions)]
    pub(crate) fn integrity_check(&self) {
        assert_eq!(self.ids_to_indices.len(), self.indices_to_ids.len());

        for (id, &index) in self.ids_to_indices.iter().enumerate() {
            assert_eq!(
                self.indices_to_ids.get(index).copied(),
                Some(id),
                "identifier {id} maps to index {index} which does not map back"
            );
        }

        for (index, &id) in self.indices_to_ids.iter().enumerate() {
            assert_eq!(
                self.ids_to_indices.get(id).copied(),
                Some(index),
                "index {index} maps to identifier {id} which does not map back"
            );
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::indexing_slicing,
    reason = "tests focus on succinct code and do not need to tick all the boxes"
)]
mod tests {
    use super::*;

    #[test]
    fn identity_maps_each_id_to_same_index() {
        let map = IdMap::identity(5);

        assert_eq!(map.len(), 5);
        assert_eq!(map.ids_to_indices(), &[0, 1, 2, 3, 4]);
        assert_eq!(map.indices_to_ids(), &[0, 1, 2, 3, 4]);
        #[cfg(debug_assertions)]
        map.integrity_check();
    }

    #[test]
    fn empty_identity_is_valid() {
        let map = IdMap::identity(0);

        assert_eq!(map.len(), 0);
        #[cfg(debug_assertions)]
        map.integrity_check();
    }

    #[test]
    fn swap_indices_exchanges_both_directions() {
        // Values       A B C D E F
        // remove C by pulling F into its slot:
        // Values       A B F D E _
        // IdsToIndices 0 1 5 3 4 2
        let mut map = IdMap::identity(6);
        map.swap_indices(2, 5);

        assert_eq!(map.ids_to_indices(), &[0, 1, 5, 3, 4, 2]);
        assert_eq!(map.indices_to_ids(), &[0, 1, 5, 3, 4, 2]);
        #[cfg(debug_assertions)]
        map.integrity_check();
    }

    #[test]
    fn swap_indices_with_itself_is_noop() {
        let mut map = IdMap::identity(3);
        map.swap_indices(1, 1);

        assert_eq!(map, IdMap::identity(3));
    }

    #[test]
    fn rotate_to_back_shifts_survivors_down() {
        let mut map = IdMap::identity(6);
        map.rotate_to_back(1, 4);

        assert_eq!(map.indices_to_ids(), &[0, 2, 3, 4, 1, 5]);
        assert_eq!(map.index_of(1), 4);
        assert_eq!(map.index_of(2), 1);
        assert_eq!(map.index_of(4), 3);
        #[cfg(debug_assertions)]
        map.integrity_check();
    }

    #[test]
    fn rotate_to_back_single_element_is_noop() {
        let mut map = IdMap::identity(4);
        map.rotate_to_back(2, 2);

        assert_eq!(map, IdMap::identity(4));
    }

    #[test]
    fn grow_preserves_existing_and_appends_identity() {
        let mut map = IdMap::identity(3);
        map.swap_indices(0, 2);
        map.grow_to(6);

        assert_eq!(map.len(), 6);
        assert_eq!(map.index_of(0), 2);
        assert_eq!(map.index_of(2), 0);
        assert_eq!(map.index_of(5), 5);
        assert_eq!(map.id_at(4), 4);
        #[cfg(debug_assertions)]
        map.integrity_check();
    }

    #[test]
    fn grow_to_same_len_is_noop() {
        let mut map = IdMap::identity(3);
        map.grow_to(3);

        assert_eq!(map, IdMap::identity(3));
    }

    #[test]
    #[should_panic]
    fn index_of_out_of_range_panics() {
        let map = IdMap::identity(2);
        _ = map.index_of(2);
    }

    #[test]
    #[should_panic]
    fn id_at_out_of_range_panics() {
        let map = IdMap::identity(2);
        _ = map.id_at(7);
    }
}
