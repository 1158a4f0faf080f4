use crate::directions::DirectionSet;
use crate::lobe::LookupTable;
use log::warn;

/// Propagate lobe assignments to every unassigned direction.
///
/// Multi-source breadth-first search from all assigned directions at once:
/// each pass assigns the directions one graph step further out, so every
/// direction receives the lobe of a nearest assigned direction. When several
/// neighbours from the previous pass qualify, the lowest catalogue index wins.
pub fn dilate(dirs: &DirectionSet, lut: &mut LookupTable) {
    let mut assigned: Vec<bool> = lut.entries().iter().map(Option::is_some).collect();
    if !assigned.iter().any(|&a| a) {
        return;
    }
    let mut updates: Vec<(usize, Option<usize>)> = Vec::new();
    loop {
        updates.clear();
        for dir in 0..lut.len() {
            if assigned[dir] {
                continue;
            }
            // adjacency rows are sorted, so the first hit has the lowest index
            if let Some(&source) = dirs.adjacent(dir).iter().find(|&&nb| assigned[nb]) {
                updates.push((dir, lut.get(source)));
            }
        }
        if updates.is_empty() {
            break;
        }
        for &(dir, lobe) in &updates {
            lut.set(dir, lobe);
            assigned[dir] = true;
        }
    }
    let remaining = lut.unassigned_count();
    if remaining > 0 {
        warn!("lookup dilation left {remaining} directions unreachable from any lobe");
    }
}
