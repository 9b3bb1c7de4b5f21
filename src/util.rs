// Mutable borrows of two distinct elements of a slice.
pub fn get_both_indices<T>(vector: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    assert_ne!(i, j);
    assert!(i < vector.len());
    assert!(j < vector.len());
    if i < j {
        let (first, last) = vector.split_at_mut(j);
        (&mut first[i], &mut last[0])
    } else {
        let (first, last) = vector.split_at_mut(i);
        (&mut last[0], &mut first[j])
    }
}
