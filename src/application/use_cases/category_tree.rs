use crate::domain::reports::{CategoryBranch, CategoryLeaf, CategoryRow};

/// Nest category rows into level 1 -> 2 -> 3 -> leaves.
///
/// `rows` must be ordered by the first three levels, as the category query
/// returns them. Each branch's `span` is the number of leaves beneath it.
pub fn build_category_tree(rows: &[CategoryRow]) -> Vec<CategoryBranch> {
    let mut tree: Vec<CategoryBranch> = Vec::new();

    for row in rows {
        let [first, second, third, fourth] = &row.levels;

        let level1 = current_branch(&mut tree, first);
        level1.span += 1;
        let level2 = current_branch(&mut level1.children, second);
        level2.span += 1;
        let level3 = current_branch(&mut level2.children, third);
        level3.span += 1;

        level3.leaves.push(CategoryLeaf {
            label: fourth.clone(),
            total: row.total,
            unique_ids: row.unique_ids,
        });
    }

    tree
}

fn current_branch<'a>(
    branches: &'a mut Vec<CategoryBranch>,
    label: &Option<String>,
) -> &'a mut CategoryBranch {
    let starts_group = branches.last().map_or(true, |last| &last.label != label);
    if starts_group {
        branches.push(CategoryBranch::new(label.clone()));
    }
    let idx = branches.len() - 1;
    &mut branches[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(levels: [&str; 4], total: i64) -> CategoryRow {
        CategoryRow {
            levels: levels.map(|l| Some(l.to_string())),
            total,
            unique_ids: total,
        }
    }

    #[test]
    fn test_spans_count_leaves() {
        let rows = vec![
            row(["Arte", "Música", "Coro", "Infantil"], 4),
            row(["Ciencia", "Robótica", "Taller", "Básico"], 10),
            row(["Ciencia", "Robótica", "Taller", "Avanzado"], 3),
            row(["Ciencia", "Robótica", "Olimpiada", "Regional"], 2),
            row(["Ciencia", "Física", "Taller", "Básico"], 1),
        ];

        let tree = build_category_tree(&rows);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].span, 1);

        let ciencia = &tree[1];
        assert_eq!(ciencia.label.as_deref(), Some("Ciencia"));
        assert_eq!(ciencia.span, 4);
        assert_eq!(ciencia.children.len(), 2);
        assert_eq!(ciencia.children[0].span, 3);
        assert_eq!(ciencia.children[0].children[0].span, 2);
        assert_eq!(ciencia.children[0].children[0].leaves[1].label.as_deref(), Some("Avanzado"));
        assert_eq!(ciencia.children[1].span, 1);
    }

    #[test]
    fn test_null_levels_form_their_own_group() {
        let rows = vec![
            CategoryRow {
                levels: [None, None, None, None],
                total: 5,
                unique_ids: 5,
            },
            row(["Arte", "Música", "Coro", "Infantil"], 4),
        ];

        let tree = build_category_tree(&rows);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].label, None);
        assert_eq!(tree[0].children[0].children[0].leaves[0].total, 5);
    }

    #[test]
    fn test_empty_rows_give_empty_tree() {
        assert!(build_category_tree(&[]).is_empty());
    }
}
