use std::cmp::Ordering;

use crate::ir::{MarriageRecord, PersonRecord};

/// Orders siblings (and spouses) before they are laid out left to right.
pub trait PersonSorter {
    fn compare(&self, a: &PersonRecord, b: &PersonRecord) -> Ordering;
}

impl<F> PersonSorter for F
where
    F: Fn(&PersonRecord, &PersonRecord) -> Ordering,
{
    fn compare(&self, a: &PersonRecord, b: &PersonRecord) -> Ordering {
        self(a, b)
    }
}

/// Unmarried persons first, then older before younger when both ages are
/// known; otherwise input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSorter;

impl PersonSorter for DefaultSorter {
    fn compare(&self, a: &PersonRecord, b: &PersonRecord) -> Ordering {
        let married = (!a.marriages.is_empty()).cmp(&!b.marriages.is_empty());
        if married != Ordering::Equal {
            return married;
        }
        match (a.age, b.age) {
            (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        }
    }
}

pub(super) fn sorted_persons<'a>(
    persons: &'a [PersonRecord],
    sorter: &dyn PersonSorter,
) -> Vec<&'a PersonRecord> {
    let mut items: Vec<&PersonRecord> = persons.iter().collect();
    stable_sort_by(&mut items, |a, b| sorter.compare(a, b));
    items
}

/// Marriages in spouse order, each paired with its index in the input.
pub(super) fn sorted_marriages<'a>(
    marriages: &'a [MarriageRecord],
    sorter: &dyn PersonSorter,
) -> Vec<(usize, &'a MarriageRecord)> {
    let mut items: Vec<(usize, &MarriageRecord)> = marriages.iter().enumerate().collect();
    stable_sort_by(&mut items, |(_, a), (_, b)| match (&a.spouse, &b.spouse) {
        (Some(a), Some(b)) => sorter.compare(a, b),
        _ => Ordering::Equal,
    });
    items
}

// Insertion sort: stable, and tolerant of comparators that are not total
// orders (the default one is not once ages are partially missing).
fn stable_sort_by<T, F>(items: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && compare(&items[j - 1], &items[j]) == Ordering::Greater {
            items.swap(j - 1, j);
            j -= 1;
        }
    }
}
