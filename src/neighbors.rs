use crate::error::{Error, Result};

/// Makes site adjacency symmetric in one pass.
///
/// Independent cell computations can disagree by rounding: `a` may list `b` while
/// `b` misses `a`. For every recorded site neighbor `b` of `a`, `a` is appended to
/// `b`'s list when absent. Boundary markers (negative IDs) and self references are
/// left alone. Returns the number of entries added.
pub fn symmetrize(lists: &mut [Vec<i32>]) -> Result<usize> {
    let n = lists.len();
    let mut added = 0;

    for a in 0..n {
        // Entries appended to later rows are visited when those rows come up.
        let mut j = 0;
        while j < lists[a].len() {
            let b = lists[a][j];
            j += 1;
            if b < 0 {
                continue;
            }
            let b = b as usize;
            if b >= n {
                return Err(Error::fault(format!("site {} lists unknown neighbor {} ({} sites)", a, b, n)));
            }
            if b == a {
                continue;
            }
            let a_id = a as i32;
            if !lists[b].contains(&a_id) {
                lists[b].push(a_id);
                added += 1;
            }
        }
    }

    Ok(added)
}

/// Checks that every site neighbor relation is mutual.
pub fn is_symmetric(lists: &[Vec<i32>]) -> bool {
    lists.iter().enumerate().all(|(a, row)| {
        row.iter()
            .filter(|&&b| b >= 0 && b as usize != a)
            .all(|&b| lists.get(b as usize).is_some_and(|other| other.contains(&(a as i32))))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repairs_missing_back_links() {
        let mut lists = vec![vec![1, 2, -1], vec![-3], vec![0, -7]];
        assert!(!is_symmetric(&lists));
        let added = symmetrize(&mut lists).unwrap();
        assert_eq!(added, 1);
        assert_eq!(lists[1], vec![-3, 0]);
        assert!(is_symmetric(&lists));
    }

    #[test]
    fn test_appended_entries_are_visited() {
        // Row 1 adds itself to row 2, whose new entry is then checked in turn.
        let mut lists = vec![vec![], vec![2], vec![0]];
        symmetrize(&mut lists).unwrap();
        assert!(is_symmetric(&lists));
        assert_eq!(lists[0], vec![2]);
        assert_eq!(lists[2], vec![0, 1]);
    }

    #[test]
    fn test_duplicates_and_walls_untouched() {
        let mut lists = vec![vec![1, 1, -7], vec![0]];
        assert_eq!(symmetrize(&mut lists).unwrap(), 0);
        assert_eq!(lists, vec![vec![1, 1, -7], vec![0]]);
    }

    #[test]
    fn test_unknown_neighbor_is_fault() {
        let mut lists = vec![vec![3]];
        assert!(symmetrize(&mut lists).unwrap_err().is_internal_fault());
    }
}
