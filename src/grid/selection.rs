use super::util::GridCoordinate;
use time::OffsetDateTime;

/// Selected cells in the order they were selected, each paired with the
/// instant that was selected
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SelectionSet(Vec<(GridCoordinate, OffsetDateTime)>);

impl SelectionSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, coordinate: GridCoordinate) -> bool {
        self.position(coordinate).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (GridCoordinate, OffsetDateTime)> {
        self.0.iter()
    }

    pub fn dates(&self) -> impl Iterator<Item = OffsetDateTime> + '_ {
        self.0.iter().map(|&(_, date)| date)
    }

    // Matching is by cell rather than by instant so that a deselection
    // issued with a different time of day still finds its entry.
    fn position(&self, coordinate: GridCoordinate) -> Option<usize> {
        self.0.iter().position(|&(c, _)| c == coordinate)
    }

    pub(super) fn insert(&mut self, coordinate: GridCoordinate, date: OffsetDateTime) {
        self.0.push((coordinate, date));
    }

    /// Removes the entry for `coordinate`, returning the instant it was
    /// selected with
    pub(super) fn remove(&mut self, coordinate: GridCoordinate) -> Option<OffsetDateTime> {
        let i = self.position(coordinate)?;
        Some(self.0.remove(i).1)
    }
}

impl<'a> IntoIterator for &'a SelectionSet {
    type Item = &'a (GridCoordinate, OffsetDateTime);
    type IntoIter = std::slice::Iter<'a, (GridCoordinate, OffsetDateTime)>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
