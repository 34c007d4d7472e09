//! ASCII rendering of a parent/children graph, keyed by a chosen label.
//!
//! Generic over the id type so callers decide what a node is; the renderer
//! only needs a children accessor and a label accessor. Output puts the
//! parent above its children:
//!
//! ```text
//! tip
//! ├── a
//! │   └── b
//! └── c
//! ```

/// Render the tree rooted at `root` to a string, one node per line.
pub fn render_tree<Id, C, L>(root: Id, children: &C, label: &L) -> String
where
    Id: Copy,
    C: Fn(Id) -> Vec<Id>,
    L: Fn(Id) -> String,
{
    let mut out = String::new();
    out.push_str(&label(root));
    out.push('\n');
    let mut prefix_parts: Vec<bool> = Vec::new();
    render_children(root, children, label, &mut prefix_parts, &mut out);
    // Trim the trailing newline so the rendering embeds cleanly in help text.
    out.pop();
    out
}

fn render_children<Id, C, L>(
    node: Id,
    children: &C,
    label: &L,
    prefix_parts: &mut Vec<bool>,
    out: &mut String,
) where
    Id: Copy,
    C: Fn(Id) -> Vec<Id>,
    L: Fn(Id) -> String,
{
    let kids = children(node);
    let len = kids.len();
    for (idx, child) in kids.into_iter().enumerate() {
        let is_last = idx + 1 == len;
        for &has_more in prefix_parts.iter() {
            out.push_str(if has_more { "│   " } else { "    " });
        }
        out.push_str(if is_last { "└── " } else { "├── " });
        out.push_str(&label(child));
        out.push('\n');
        prefix_parts.push(!is_last);
        render_children(child, children, label, prefix_parts, out);
        prefix_parts.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Tiny fixture: adjacency list indexed by usize.
    fn kids_of(adj: &[Vec<usize>]) -> impl Fn(usize) -> Vec<usize> + '_ {
        move |id| adj[id].clone()
    }

    #[test]
    fn test_single_node() {
        let adj: Vec<Vec<usize>> = vec![vec![]];
        let out = render_tree(0, &kids_of(&adj), &|_| "tip".to_string());
        assert_eq!(out, "tip");
    }

    #[test]
    fn test_parent_above_children() {
        // 0 -> [1, 3], 1 -> [2]
        let adj: Vec<Vec<usize>> = vec![vec![1, 3], vec![2], vec![], vec![]];
        let names = ["tip", "a", "b", "c"];
        let out = render_tree(0, &kids_of(&adj), &|id: usize| names[id].to_string());
        assert_eq!(out, "tip\n├── a\n│   └── b\n└── c");
    }

    #[test]
    fn test_declared_order_preserved() {
        let adj: Vec<Vec<usize>> = vec![vec![2, 1], vec![], vec![]];
        let names = ["tip", "first", "second"];
        let out = render_tree(0, &kids_of(&adj), &|id: usize| names[id].to_string());
        let second_pos = out.find("second").unwrap();
        let first_pos = out.find("first").unwrap();
        assert!(second_pos < first_pos);
    }
}
