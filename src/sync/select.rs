//! Minimal volume selection for the configured directory prefixes.

use std::collections::BTreeSet;

use crate::archive::DirectoryTree;

/// Volume indices whose files fall under at least one prefix, ascending and
/// deduplicated.
///
/// Visits every tree entry exactly once. Entries for a volume that is
/// already required skip the prefix match; that shortcut cannot change
/// membership because insertion is the only effect of a match.
pub(crate) fn required_volumes(tree: &DirectoryTree, prefixes: &[String]) -> Vec<u16> {
    let mut required = BTreeSet::new();

    for (path, volume) in tree.iter() {
        if required.contains(&volume) {
            continue;
        }
        if prefixes.iter().any(|prefix| path.starts_with(prefix.as_str())) {
            required.insert(volume);
        }
    }

    required.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(entries: &[(&str, u16)]) -> DirectoryTree {
        entries
            .iter()
            .map(|&(path, volume)| (path.to_string(), volume))
            .collect()
    }

    fn prefixes(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn selects_volumes_under_a_prefix() {
        let tree = tree(&[
            ("scripts/items/a.txt", 2),
            ("scripts/items/b.txt", 2),
            ("sound/x.wav", 5),
        ]);
        assert_eq!(required_volumes(&tree, &prefixes(&["scripts/items"])), vec![2]);
    }

    #[test]
    fn empty_tree_selects_nothing() {
        assert_eq!(
            required_volumes(&DirectoryTree::new(), &prefixes(&["scripts"])),
            Vec::<u16>::new()
        );
    }

    #[test]
    fn empty_prefix_set_selects_nothing() {
        let tree = tree(&[("scripts/items/a.txt", 2)]);
        assert_eq!(required_volumes(&tree, &[]), Vec::<u16>::new());
    }

    #[test]
    fn output_is_sorted_and_deduplicated() {
        let tree = tree(&[
            ("scripts/a.txt", 9),
            ("scripts/b.txt", 1),
            ("scripts/c.txt", 4),
            ("scripts/d.txt", 1),
        ]);
        assert_eq!(required_volumes(&tree, &prefixes(&["scripts"])), vec![1, 4, 9]);
    }

    #[test]
    fn membership_is_independent_of_prefix_order() {
        let tree = tree(&[
            ("models/props/door.mdl", 3),
            ("scripts/items/a.txt", 2),
            ("sound/ui/click.wav", 7),
        ]);
        let forward = required_volumes(&tree, &prefixes(&["models", "scripts", "sound"]));
        let reverse = required_volumes(&tree, &prefixes(&["sound", "scripts", "models"]));
        assert_eq!(forward, vec![2, 3, 7]);
        assert_eq!(forward, reverse);
    }

    /// A later entry for an already-required volume must not unmark it, and
    /// a volume whose first prefix match is its last tree entry must still
    /// be selected.
    #[test]
    fn late_first_match_still_selects_the_volume() {
        let tree = tree(&[
            ("aaa/unrelated.bin", 6),
            ("scripts/items/a.txt", 2),
            ("zzz/also_on_vol_six.txt", 6),
        ]);
        assert_eq!(
            required_volumes(&tree, &prefixes(&["scripts", "zzz"])),
            vec![2, 6]
        );
    }

    #[test]
    fn unmatched_volumes_are_never_selected() {
        let tree = tree(&[
            ("scripts/items/a.txt", 2),
            ("sound/x.wav", 5),
            ("materials/y.vmt", 8),
        ]);
        let selected = required_volumes(&tree, &prefixes(&["scripts/items"]));
        assert!(!selected.contains(&5));
        assert!(!selected.contains(&8));
    }
}
