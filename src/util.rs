// Normalized key for an unordered pair of registry indices. The played-set
// and every rematch check go through this so (a,b) and (b,a) collide.
pub fn pair_key(a: usize, b: usize) -> (usize, usize) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_key_is_order_insensitive() {
        assert_eq!(pair_key(3, 7), pair_key(7, 3));
        assert_eq!(pair_key(5, 5), (5, 5));
    }
}
